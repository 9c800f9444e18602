use axum::{
    extract::{Path, Query, State},
    response::Html,
    Json,
};
use serde::Deserialize;

use crate::models::cv::Language;
use crate::render::html::page;
use crate::render::templates::{TemplateKind, TemplateRenderer};
use crate::render::{Renderer, VisualTree};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PreviewQuery {
    pub template: Option<TemplateKind>,
    pub lang: Option<Language>,
}

/// Renders the current document for `view`, showing that view's draft at
/// its active field.
async fn render_view(state: &AppState, view: &str, query: PreviewQuery) -> VisualTree {
    let (doc, epoch) = {
        let store = state.store.read().await;
        (store.snapshot(), store.epoch())
    };
    let session = state.views.lock().await.session(view, epoch);
    TemplateRenderer::new(query.template.unwrap_or_default()).render(
        &doc,
        query.lang.unwrap_or(state.config.default_language),
        &session,
    )
}

/// GET /api/v1/views/:view/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    Path(view): Path<String>,
    Query(query): Query<PreviewQuery>,
) -> Html<String> {
    Html(page(&render_view(&state, &view, query).await))
}

/// GET /api/v1/views/:view/tree
pub async fn handle_preview_tree(
    State(state): State<AppState>,
    Path(view): Path<String>,
    Query(query): Query<PreviewQuery>,
) -> Json<VisualTree> {
    Json(render_view(&state, &view, query).await)
}

/// GET /api/v1/templates
pub async fn handle_list_templates() -> Json<Vec<TemplateKind>> {
    Json(TemplateKind::ALL.to_vec())
}
