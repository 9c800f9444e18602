//! Assist orchestration: task guard, agent call, settle-time apply.
//!
//! The agent runs with no lock held. Results are applied to the document as it
//! is when the call settles, not as it was when the call started, so edits
//! made meanwhile survive.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use crate::assist::tasks::TaskGuard;
use crate::assist::{merge_skills, role_hint, AssistError, SummaryContext, TaskKey};
use crate::document::address::{current_value, FieldAddress};
use crate::models::cv::{CvData, EntitySection, FieldValue, Language};
use crate::notices::NoticeKind;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssistResponse {
    pub key: TaskKey,
    /// False when the result changed nothing or its target no longer exists.
    pub applied: bool,
    pub document: Arc<CvData>,
}

/// Settles the guard from the call result. Failures post one notice.
fn settle<T>(
    state: &AppState,
    guard: TaskGuard,
    result: Result<T, AssistError>,
    what: &str,
) -> Result<T, AssistError> {
    match result {
        Ok(value) => {
            guard.succeed();
            Ok(value)
        }
        Err(e) => {
            state
                .notices
                .push(NoticeKind::Assist, format!("Failed to {what}: {e}"));
            guard.fail(e.to_string());
            Err(e)
        }
    }
}

async fn respond(state: &AppState, key: TaskKey, applied: bool) -> AssistResponse {
    AssistResponse {
        key,
        applied,
        document: state.store.read().await.snapshot(),
    }
}

/// Generates a summary and writes it to the summary field.
pub async fn run_generate_summary(
    state: &AppState,
    language: Language,
) -> Result<AssistResponse, AssistError> {
    let guard = state.tasks.begin(TaskKey::Summary)?;
    let ctx = SummaryContext::from_doc(&state.store.read().await.snapshot());

    let result = state.assist.generate_summary(&ctx, language).await;
    let text = settle(state, guard, result, "generate summary")?;

    let applied = state
        .store
        .write()
        .await
        .write_field(&FieldAddress::summary(), &FieldValue::Text(text));
    info!(applied, "Summary generated");
    Ok(respond(state, TaskKey::Summary, applied).await)
}

/// Suggests skills for the first position and merges them into the current
/// skills list.
pub async fn run_suggest_skills(
    state: &AppState,
    language: Language,
) -> Result<AssistResponse, AssistError> {
    let guard = state.tasks.begin(TaskKey::Skills)?;
    let hint = role_hint(&state.store.read().await.snapshot());

    let result = state.assist.suggest_skills(&hint, language).await;
    let suggested = settle(state, guard, result, "suggest skills")?;

    let applied = {
        let mut store = state.store.write().await;
        let current = store.snapshot();
        let merged = merge_skills(&current.skills, &suggested);
        if merged == current.skills {
            false
        } else {
            let mut next = (*current).clone();
            next.skills = merged;
            store.replace(next);
            true
        }
    };
    info!(applied, count = suggested.len(), "Skills suggested");
    Ok(respond(state, TaskKey::Skills, applied).await)
}

/// Rewrites one entity's description.
///
/// A result whose entity was removed while the call was in flight is dropped.
pub async fn run_enhance(
    state: &AppState,
    section: EntitySection,
    entity_id: &str,
    language: Language,
) -> Result<AssistResponse, AssistError> {
    let address = FieldAddress::keyed(section, entity_id, "description");
    let text = {
        let doc = state.store.read().await.snapshot();
        match current_value(&doc, &address) {
            Some(FieldValue::Text(text)) => text,
            _ => return Err(AssistError::UnknownEntity(section, entity_id.to_string())),
        }
    };

    let key = TaskKey::Enhance {
        section,
        entity_id: entity_id.to_string(),
    };
    let guard = state.tasks.begin(key.clone())?;
    let result = state
        .assist
        .enhance_text(&text, section.into(), language)
        .await;
    let enhanced = settle(state, guard, result, "enhance description")?;

    let applied = !enhanced.is_empty()
        && state
            .store
            .write()
            .await
            .write_field(&address, &FieldValue::Text(enhanced));
    info!(%key, applied, "Description enhanced");
    Ok(respond(state, key, applied).await)
}
