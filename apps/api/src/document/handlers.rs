use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::assist::TaskKey;
use crate::document::address::FieldAddress;
use crate::document::editor::{
    add_entity, form, remove_entity, set_current, set_profile_picture, EditorForm,
};
use crate::document::session::{Commit, EditKey, EditSession};
use crate::document::store::CommitOutcome;
use crate::errors::AppError;
use crate::models::cv::{CvData, EntitySection, FieldValue, Language};
use crate::state::AppState;

/// View name of the structured editor pane.
pub const EDITOR_VIEW: &str = "editor";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResponse {
    pub document: Arc<CvData>,
    pub epoch: u64,
    pub revision: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationResponse {
    /// False when the write resolved to nothing or changed nothing.
    pub applied: bool,
    #[serde(flatten)]
    pub state: DocumentResponse,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityCreated {
    pub id: String,
    #[serde(flatten)]
    pub state: DocumentResponse,
}

async fn document_response(state: &AppState) -> DocumentResponse {
    let store = state.store.read().await;
    DocumentResponse {
        document: store.snapshot(),
        epoch: store.epoch(),
        revision: store.revision(),
    }
}

/// Swaps in `next` if it differs from the current snapshot.
async fn replace_if_changed(
    state: &AppState,
    next: impl FnOnce(&CvData) -> CvData,
) -> MutationResponse {
    let applied = {
        let mut store = state.store.write().await;
        let current = store.snapshot();
        let next = next(&current);
        if next == *current {
            false
        } else {
            store.replace(next);
            true
        }
    };
    MutationResponse {
        applied,
        state: document_response(state).await,
    }
}

/// GET /api/v1/document
pub async fn handle_get_document(State(state): State<AppState>) -> Json<DocumentResponse> {
    Json(document_response(&state).await)
}

/// PUT /api/v1/document
pub async fn handle_replace_document(
    State(state): State<AppState>,
    Json(doc): Json<CvData>,
) -> Json<DocumentResponse> {
    state.store.write().await.replace(doc);
    Json(document_response(&state).await)
}

/// DELETE /api/v1/document
///
/// Clears the saved record and drops every open edit session.
pub async fn handle_reset_document(State(state): State<AppState>) -> Json<DocumentResponse> {
    state.store.write().await.reset();
    state.views.lock().await.remount();
    state
        .tasks
        .retain(|key, task| task.is_pending() && !matches!(key, TaskKey::Enhance { .. }));
    Json(document_response(&state).await)
}

#[derive(Debug, Deserialize)]
pub struct FieldWrite {
    pub address: FieldAddress,
    pub value: FieldValue,
}

/// PATCH /api/v1/document/fields
pub async fn handle_write_field(
    State(state): State<AppState>,
    Json(req): Json<FieldWrite>,
) -> Json<MutationResponse> {
    let applied = state
        .store
        .write()
        .await
        .write_field(&req.address, &req.value);
    Json(MutationResponse {
        applied,
        state: document_response(&state).await,
    })
}

/// POST /api/v1/document/:section/entities
pub async fn handle_add_entity(
    State(state): State<AppState>,
    Path(section): Path<EntitySection>,
) -> (StatusCode, Json<EntityCreated>) {
    let id = {
        let mut store = state.store.write().await;
        let (next, id) = add_entity(&store.snapshot(), section);
        store.replace(next);
        id
    };
    debug!(%section, %id, "Entity added");
    (
        StatusCode::CREATED,
        Json(EntityCreated {
            id,
            state: document_response(&state).await,
        }),
    )
}

/// DELETE /api/v1/document/:section/entities/:id
pub async fn handle_remove_entity(
    State(state): State<AppState>,
    Path((section, id)): Path<(EntitySection, String)>,
) -> Json<MutationResponse> {
    let response = replace_if_changed(&state, |doc| remove_entity(doc, section, &id)).await;
    state.tasks.retain(|key, _| !key.targets(section, &id));
    Json(response)
}

#[derive(Debug, Deserialize)]
pub struct CurrentToggle {
    pub current: bool,
}

/// PUT /api/v1/document/:section/entities/:id/current
pub async fn handle_set_current(
    State(state): State<AppState>,
    Path((section, id)): Path<(EntitySection, String)>,
    Json(req): Json<CurrentToggle>,
) -> Json<MutationResponse> {
    Json(replace_if_changed(&state, |doc| set_current(doc, section, &id, req.current)).await)
}

#[derive(Debug, Deserialize)]
pub struct ProfilePicture {
    /// Data URI or URL; `null` clears the picture.
    pub picture: Option<String>,
}

/// PUT /api/v1/document/profile-picture
pub async fn handle_set_profile_picture(
    State(state): State<AppState>,
    Json(req): Json<ProfilePicture>,
) -> Json<MutationResponse> {
    Json(replace_if_changed(&state, |doc| set_profile_picture(doc, req.picture.as_deref())).await)
}

#[derive(Debug, Deserialize)]
pub struct LanguageQuery {
    pub lang: Option<Language>,
}

/// GET /api/v1/editor/form
pub async fn handle_editor_form(
    State(state): State<AppState>,
    Query(query): Query<LanguageQuery>,
) -> Json<EditorForm> {
    let language = query.lang.unwrap_or(state.config.default_language);
    let (doc, epoch) = {
        let store = state.store.read().await;
        (store.snapshot(), store.epoch())
    };
    let session = state.views.lock().await.session(EDITOR_VIEW, epoch);
    Json(form(&doc, language, epoch, &session))
}

// ────────────────────────────────────────────────────────────────────────────
// Inline editing sessions
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase", tag = "state")]
pub enum SessionView {
    Idle,
    Editing { address: FieldAddress, draft: String },
}

impl From<&EditSession> for SessionView {
    fn from(session: &EditSession) -> Self {
        match session {
            EditSession::Idle => SessionView::Idle,
            EditSession::Editing { address, draft, .. } => SessionView::Editing {
                address: address.clone(),
                draft: draft.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditResponse {
    pub session: SessionView,
    /// Set when a draft left the session toward the store.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<CommitOutcome>,
    #[serde(flatten)]
    pub state: DocumentResponse,
}

/// Routes an optional commit into the store, then reports the view.
async fn finish_edit(
    state: &AppState,
    session: SessionView,
    commit: Option<Commit>,
) -> EditResponse {
    let commit = match commit {
        Some(c) => Some(state.store.write().await.commit(&c)),
        None => None,
    };
    EditResponse {
        session,
        commit,
        state: document_response(state).await,
    }
}

async fn current_epoch(state: &AppState) -> (Arc<CvData>, u64) {
    let store = state.store.read().await;
    (store.snapshot(), store.epoch())
}

#[derive(Debug, Deserialize)]
pub struct ActivateRequest {
    pub address: FieldAddress,
    /// Epoch the client's view was built in.
    pub epoch: Option<u64>,
}

/// POST /api/v1/views/:view/edit/activate
pub async fn handle_activate(
    State(state): State<AppState>,
    Path(view): Path<String>,
    Json(req): Json<ActivateRequest>,
) -> Result<Json<EditResponse>, AppError> {
    let (doc, epoch) = current_epoch(&state).await;
    if req.epoch.is_some_and(|e| e != epoch) {
        let session = SessionView::from(&state.views.lock().await.session(&view, epoch));
        return Ok(Json(EditResponse {
            session,
            commit: Some(CommitOutcome::Stale),
            state: document_response(&state).await,
        }));
    }

    let (activation, session) = {
        let mut views = state.views.lock().await;
        let session = views.session_mut(&view, epoch);
        let activation = session.activate(&doc, req.address.clone(), epoch);
        (activation, SessionView::from(&*session))
    };
    if !activation.editing && activation.previous.is_none() {
        return Err(AppError::Validation(format!(
            "{:?} is not an editable text field",
            req.address
        )));
    }
    Ok(Json(finish_edit(&state, session, activation.previous).await))
}

#[derive(Debug, Deserialize)]
pub struct DraftUpdate {
    pub text: String,
}

/// PUT /api/v1/views/:view/edit/draft
pub async fn handle_update_draft(
    State(state): State<AppState>,
    Path(view): Path<String>,
    Json(req): Json<DraftUpdate>,
) -> Result<Json<EditResponse>, AppError> {
    let (_, epoch) = current_epoch(&state).await;
    let session = {
        let mut views = state.views.lock().await;
        let session = views.session_mut(&view, epoch);
        if !session.update_draft(&req.text) {
            return Err(AppError::Validation(format!(
                "view '{view}' has no field in editing"
            )));
        }
        SessionView::from(&*session)
    };
    Ok(Json(finish_edit(&state, session, None).await))
}

#[derive(Debug, Deserialize)]
pub struct KeyPress {
    pub key: EditKey,
}

/// POST /api/v1/views/:view/edit/key
pub async fn handle_key(
    State(state): State<AppState>,
    Path(view): Path<String>,
    Json(req): Json<KeyPress>,
) -> Json<EditResponse> {
    let (_, epoch) = current_epoch(&state).await;
    let (commit, session) = {
        let mut views = state.views.lock().await;
        let session = views.session_mut(&view, epoch);
        let commit = session.on_key(req.key);
        (commit, SessionView::from(&*session))
    };
    Json(finish_edit(&state, session, commit).await)
}

/// POST /api/v1/views/:view/edit/blur
pub async fn handle_blur(
    State(state): State<AppState>,
    Path(view): Path<String>,
) -> Json<EditResponse> {
    let (_, epoch) = current_epoch(&state).await;
    let (commit, session) = {
        let mut views = state.views.lock().await;
        let session = views.session_mut(&view, epoch);
        let commit = session.on_blur();
        (commit, SessionView::from(&*session))
    };
    Json(finish_edit(&state, session, commit).await)
}

/// GET /api/v1/views/:view/edit
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(view): Path<String>,
) -> Json<SessionView> {
    let (_, epoch) = current_epoch(&state).await;
    let session = state.views.lock().await.session(&view, epoch);
    Json(SessionView::from(&session))
}
