use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::errors::AppError;
use crate::notices::Notice;
use crate::state::AppState;

/// GET /api/v1/notices
pub async fn handle_list_notices(State(state): State<AppState>) -> Json<Vec<Notice>> {
    Json(state.notices.list())
}

/// DELETE /api/v1/notices/:id
pub async fn handle_dismiss_notice(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<StatusCode, AppError> {
    if state.notices.dismiss(id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Notice {id} not found")))
    }
}
