use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::debug;

use crate::errors::AppError;
use crate::export::{export, Artifact, ExportFormat, Quality};
use crate::models::cv::Language;
use crate::notices::NoticeKind;
use crate::render::templates::TemplateKind;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub lang: Option<Language>,
    pub quality: Option<Quality>,
    pub template: Option<TemplateKind>,
}

/// `Content-Disposition` with an ASCII fallback name and the exact name
/// percent-encoded as `filename*`.
fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| if c.is_ascii_graphic() && c != '"' && c != '\\' { c } else { '_' })
        .collect();
    let mut encoded = String::new();
    for byte in file_name.bytes() {
        if byte.is_ascii_alphanumeric() || b"-._~".contains(&byte) {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{byte:02X}"));
        }
    }
    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}

fn download(artifact: Artifact) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, artifact.content_type.to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&artifact.file_name)),
        ],
        artifact.bytes,
    )
        .into_response()
}

/// GET /api/v1/export/:format
///
/// Exports the current snapshot. A failure posts one export notice.
pub async fn handle_export(
    State(state): State<AppState>,
    Path(format): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, AppError> {
    let format: ExportFormat = format.parse().map_err(AppError::Validation)?;
    let doc = state.store.read().await.snapshot();
    if format.is_raster() {
        debug!(%format, "Capturing preview for export");
    }

    let result = export(
        &doc,
        format,
        query.lang.unwrap_or(state.config.default_language),
        query.quality.unwrap_or_default(),
        query.template.unwrap_or_default(),
        state.capture.as_ref(),
    )
    .await;

    match result {
        Ok(artifact) => Ok(download(artifact)),
        Err(e) => {
            state
                .notices
                .push(NoticeKind::Export, format!("Failed to export {format}: {e}"));
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_encodes_non_ascii() {
        let header = content_disposition("CV_Nguyễn_An.docx");
        assert!(header.starts_with("attachment; filename=\"CV_Nguy_n_An.docx\""));
        assert!(header.ends_with("filename*=UTF-8''CV_Nguy%E1%BB%85n_An.docx"));
    }
}
