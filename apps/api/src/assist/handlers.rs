use axum::{extract::State, Json};
use serde::Deserialize;

use crate::assist::service::{run_enhance, run_generate_summary, run_suggest_skills, AssistResponse};
use crate::assist::tasks::TaskEntry;
use crate::errors::AppError;
use crate::models::cv::{EntitySection, Language};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistRequest {
    pub language: Option<Language>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnhanceRequest {
    pub section: EntitySection,
    pub entity_id: String,
    pub language: Option<Language>,
}

/// POST /api/v1/assist/summary
pub async fn handle_generate_summary(
    State(state): State<AppState>,
    body: Option<Json<AssistRequest>>,
) -> Result<Json<AssistResponse>, AppError> {
    let language = body
        .and_then(|Json(req)| req.language)
        .unwrap_or(state.config.default_language);
    Ok(Json(run_generate_summary(&state, language).await?))
}

/// POST /api/v1/assist/skills
pub async fn handle_suggest_skills(
    State(state): State<AppState>,
    body: Option<Json<AssistRequest>>,
) -> Result<Json<AssistResponse>, AppError> {
    let language = body
        .and_then(|Json(req)| req.language)
        .unwrap_or(state.config.default_language);
    Ok(Json(run_suggest_skills(&state, language).await?))
}

/// POST /api/v1/assist/enhance
pub async fn handle_enhance(
    State(state): State<AppState>,
    Json(req): Json<EnhanceRequest>,
) -> Result<Json<AssistResponse>, AppError> {
    let language = req.language.unwrap_or(state.config.default_language);
    Ok(Json(
        run_enhance(&state, req.section, &req.entity_id, language).await?,
    ))
}

/// GET /api/v1/assist/tasks
pub async fn handle_list_tasks(State(state): State<AppState>) -> Json<Vec<TaskEntry>> {
    Json(state.tasks.entries())
}
