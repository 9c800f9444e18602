//! Export: stateless converters from a document snapshot to a downloadable
//! artifact. No converter writes back to the store.
//!
//! Text-based formats (markdown, latex, docx) linearize the document through
//! `outline`, which fixes section order and the empty-section rule. Raster
//! formats (png, jpeg, pdf) capture the rendered preview instead.

pub mod capture;
pub mod docx;
pub mod handlers;
pub mod latex;
pub mod markdown;
pub mod raster;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::document::session::ReadOnly;
use crate::export::raster::PreviewCapture;
use crate::models::cv::{CvData, Education, Entity, Experience, Language, Project, Section};
use crate::render::templates::{TemplateKind, TemplateRenderer};
use crate::render::{dates, html, Renderer};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CV preview element not found")]
    PreviewMissing,

    #[error("preview capture is unavailable: {0}")]
    CaptureUnavailable(String),

    #[error("preview capture failed: {0}")]
    Capture(String),

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("document packaging failed: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("document encoding failed: {0}")]
    Encode(String),

    #[error("I/O error while encoding: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Markdown,
    Latex,
    Docx,
    Png,
    Jpeg,
    Pdf,
}

impl ExportFormat {
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Markdown => "text/markdown; charset=utf-8",
            ExportFormat::Latex => "application/x-tex; charset=utf-8",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            ExportFormat::Png => "image/png",
            ExportFormat::Jpeg => "image/jpeg",
            ExportFormat::Pdf => "application/pdf",
        }
    }

    /// Whether the format is produced from the rendered preview rather than
    /// the raw document.
    pub fn is_raster(&self) -> bool {
        matches!(self, ExportFormat::Png | ExportFormat::Jpeg | ExportFormat::Pdf)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ExportFormat::Markdown => "markdown",
            ExportFormat::Latex => "latex",
            ExportFormat::Docx => "docx",
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpeg",
            ExportFormat::Pdf => "pdf",
        })
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md" | "markdown" => Ok(ExportFormat::Markdown),
            "tex" | "latex" => Ok(ExportFormat::Latex),
            "docx" | "word" => Ok(ExportFormat::Docx),
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(format!("unsupported export format '{other}'")),
        }
    }
}

/// Capture resolution for PDF export. PNG and JPEG always use `High`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    #[default]
    Standard,
    High,
}

impl Quality {
    pub fn scale(&self) -> f64 {
        match self {
            Quality::Standard => 2.0,
            Quality::High => 3.0,
        }
    }
}

/// A finished download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(format: ExportFormat, file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: format.content_type(),
            bytes,
        }
    }
}

/// Converts a document snapshot to `format`.
///
/// Raster formats render `template` read-only and capture it; PNG and JPEG
/// always capture at high quality, PDF honours `quality`.
pub async fn export(
    doc: &CvData,
    format: ExportFormat,
    language: Language,
    quality: Quality,
    template: TemplateKind,
    capture: &dyn PreviewCapture,
) -> Result<Artifact, ExportError> {
    let artifact = match format {
        ExportFormat::Markdown => Artifact::new(
            format,
            markdown::FILE_NAME,
            markdown::render(doc, language).into_bytes(),
        ),
        ExportFormat::Latex => {
            Artifact::new(format, latex::FILE_NAME, latex::render(doc, language).into_bytes())
        }
        ExportFormat::Docx => Artifact::new(format, docx::file_name(doc), docx::render(doc, language)?),
        ExportFormat::Png | ExportFormat::Jpeg | ExportFormat::Pdf => {
            let scale = match format {
                ExportFormat::Pdf => quality.scale(),
                _ => Quality::High.scale(),
            };
            let tree = TemplateRenderer::new(template).render(doc, language, &ReadOnly);
            let png = capture.capture(&html::page(&tree), scale).await?;
            let image = raster::flatten(&png)?;
            match format {
                ExportFormat::Png => Artifact::new(format, "cv.png", raster::encode_png(&image)?),
                ExportFormat::Jpeg => Artifact::new(format, "cv.jpg", raster::encode_jpeg(&image)?),
                _ => {
                    let jpeg = raster::encode_jpeg(&image)?;
                    let pdf = raster::pdf_from_jpeg(&jpeg, image.width(), image.height())?;
                    Artifact::new(format, "cv.pdf", pdf)
                }
            }
        }
    };
    info!(
        %format,
        file = %artifact.file_name,
        bytes = artifact.bytes.len(),
        "Export complete"
    );
    Ok(artifact)
}

// ────────────────────────────────────────────────────────────────────────────
// Shared linearization
// ────────────────────────────────────────────────────────────────────────────

/// Section order for every linear export.
pub const EXPORT_ORDER: [Section; 5] = [
    Section::Summary,
    Section::Experience,
    Section::Projects,
    Section::Education,
    Section::Skills,
];

/// One non-empty section, borrowed from the document.
#[derive(Debug, Clone, Copy)]
pub enum Block<'a> {
    Summary(&'a str),
    Experience(&'a [Experience]),
    Projects(&'a [Project]),
    Education(&'a [Education]),
    Skills(&'a [String]),
}

/// Non-empty sections in export order. The header is always present and is
/// not part of the outline.
pub fn outline(doc: &CvData) -> Vec<Block<'_>> {
    EXPORT_ORDER
        .iter()
        .filter(|section| !doc.is_section_empty(**section))
        .filter_map(|section| match section {
            Section::Summary => Some(Block::Summary(&doc.summary)),
            Section::Experience => Some(Block::Experience(&doc.experience)),
            Section::Projects => Some(Block::Projects(&doc.projects)),
            Section::Education => Some(Block::Education(&doc.education)),
            Section::Skills => Some(Block::Skills(&doc.skills)),
            Section::PersonalInfo => None,
        })
        .collect()
}

impl Block<'_> {
    pub fn section(&self) -> Section {
        match self {
            Block::Summary(_) => Section::Summary,
            Block::Experience(_) => Section::Experience,
            Block::Projects(_) => Section::Projects,
            Block::Education(_) => Section::Education,
            Block::Skills(_) => Section::Skills,
        }
    }
}

/// Non-empty contact values in header order. `twitter` is only included by
/// formats that show it.
pub fn contact_items(doc: &CvData, include_twitter: bool) -> Vec<&str> {
    let info = &doc.personal_info;
    let twitter = if include_twitter { info.twitter.as_str() } else { "" };
    [
        info.email.as_str(),
        info.phone.as_str(),
        info.location.as_str(),
        info.website.as_str(),
        info.linkedin.as_str(),
        twitter,
        info.github.as_str(),
    ]
    .into_iter()
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .collect()
}

/// Non-blank description lines, trimmed.
pub fn description_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|l| !l.is_empty())
}

/// Dates shown by linear exports: only when a start date exists, with the
/// end replaced by "Present" while `current` is set.
pub fn entry_dates<E: Entity>(entity: &E, language: Language) -> Option<String> {
    if entity.start_date().trim().is_empty() {
        return None;
    }
    dates::entity_range(entity, language)
}
