//! Render: projects a `CvData` into a template's visual tree.
//!
//! Every template shares one renderer and one editing wiring; they differ
//! only in layout data (`templates::Layout`).

pub mod dates;
pub mod handlers;
pub mod html;
pub mod labels;
pub mod templates;
pub mod tree;

use serde::Serialize;

use crate::document::session::EditController;
use crate::models::cv::{CvData, Language};
use crate::render::templates::TemplateKind;
use crate::render::tree::Node;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualTree {
    pub template: TemplateKind,
    pub language: Language,
    pub root: Node,
}

pub trait Renderer {
    fn render(&self, doc: &CvData, language: Language, edit: &dyn EditController) -> VisualTree;
}
