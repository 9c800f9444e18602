pub mod health;
pub mod notices;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::assist::handlers as assist;
use crate::document::handlers as document;
use crate::export::handlers as export;
use crate::render::handlers as render;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Document store
        .route(
            "/api/v1/document",
            get(document::handle_get_document)
                .put(document::handle_replace_document)
                .delete(document::handle_reset_document),
        )
        .route("/api/v1/document/fields", patch(document::handle_write_field))
        .route(
            "/api/v1/document/profile-picture",
            put(document::handle_set_profile_picture),
        )
        .route(
            "/api/v1/document/:section/entities",
            post(document::handle_add_entity),
        )
        .route(
            "/api/v1/document/:section/entities/:id",
            axum::routing::delete(document::handle_remove_entity),
        )
        .route(
            "/api/v1/document/:section/entities/:id/current",
            put(document::handle_set_current),
        )
        .route("/api/v1/editor/form", get(document::handle_editor_form))
        // Inline editing and preview, per view
        .route("/api/v1/views/:view/edit", get(document::handle_get_session))
        .route(
            "/api/v1/views/:view/edit/activate",
            post(document::handle_activate),
        )
        .route(
            "/api/v1/views/:view/edit/draft",
            put(document::handle_update_draft),
        )
        .route("/api/v1/views/:view/edit/key", post(document::handle_key))
        .route("/api/v1/views/:view/edit/blur", post(document::handle_blur))
        .route("/api/v1/views/:view/preview", get(render::handle_preview))
        .route("/api/v1/views/:view/tree", get(render::handle_preview_tree))
        .route("/api/v1/templates", get(render::handle_list_templates))
        // Assist
        .route(
            "/api/v1/assist/summary",
            post(assist::handle_generate_summary),
        )
        .route("/api/v1/assist/skills", post(assist::handle_suggest_skills))
        .route("/api/v1/assist/enhance", post(assist::handle_enhance))
        .route("/api/v1/assist/tasks", get(assist::handle_list_tasks))
        // Export and notices
        .route("/api/v1/export/:format", get(export::handle_export))
        .route("/api/v1/notices", get(notices::handle_list_notices))
        .route(
            "/api/v1/notices/:id",
            axum::routing::delete(notices::handle_dismiss_notice),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::assist::agent::LlmAssistAgent;
    use crate::config::Config;
    use crate::document::store::MemoryStorage;
    use crate::export::capture::UnavailableCapture;

    fn state() -> AppState {
        AppState::new(
            Config::default(),
            Arc::new(MemoryStorage::default()),
            Arc::new(LlmAssistAgent::new(None)),
            Arc::new(UnavailableCapture),
        )
    }

    fn app() -> Router {
        build_router(state())
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    async fn send_json(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let (status, bytes) = send(app, method, uri, body).await;
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send_json(&app(), Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_field_write_then_markdown_export() {
        let app = app();
        let (status, body) = send_json(
            &app,
            Method::PATCH,
            "/api/v1/document/fields",
            Some(json!({
                "address": {"section": "personalInfo", "field": "fullName"},
                "value": "Ada Lovelace"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["applied"], true);

        let (status, body) =
            send_json(&app, Method::POST, "/api/v1/document/experience/entities", None).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = body["id"].as_str().unwrap().to_string();

        for (field, value) in [
            ("position", json!("Engineer")),
            ("company", json!("Analytical Engines")),
            ("current", json!(true)),
        ] {
            send_json(
                &app,
                Method::PATCH,
                "/api/v1/document/fields",
                Some(json!({
                    "address": {"section": "experience", "entityId": id, "field": field},
                    "value": value
                })),
            )
            .await;
        }

        let (status, bytes) = send(&app, Method::GET, "/api/v1/export/md", None).await;
        assert_eq!(status, StatusCode::OK);
        let md = String::from_utf8(bytes).unwrap();
        assert!(md.lines().any(|l| l == "# Ada Lovelace"));
        assert!(md.lines().any(|l| l == "### Engineer at Analytical Engines"));
    }

    #[tokio::test]
    async fn test_inline_edit_commit_on_enter() {
        let app = app();
        let address = json!({"section": "summary", "field": "summary"});
        send_json(
            &app,
            Method::PATCH,
            "/api/v1/document/fields",
            Some(json!({"address": address, "value": "Old summary"})),
        )
        .await;

        let (status, body) = send_json(
            &app,
            Method::POST,
            "/api/v1/views/preview/edit/activate",
            Some(json!({ "address": address })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["session"]["state"], "editing");

        send_json(
            &app,
            Method::PUT,
            "/api/v1/views/preview/edit/draft",
            Some(json!({"text": "Draft summary"})),
        )
        .await;

        // draft shows in the preview before commit
        let (_, html) = send(&app, Method::GET, "/api/v1/views/preview/preview", None).await;
        assert!(String::from_utf8(html).unwrap().contains("Draft summary"));

        let (_, body) = send_json(
            &app,
            Method::POST,
            "/api/v1/views/preview/edit/key",
            Some(json!({"key": "enter"})),
        )
        .await;
        assert_eq!(body["commit"], "applied");
        assert_eq!(body["session"]["state"], "idle");
        assert_eq!(body["document"]["summary"], "Draft summary");
    }

    #[tokio::test]
    async fn test_reset_discards_open_sessions() {
        let app = app();
        send_json(
            &app,
            Method::POST,
            "/api/v1/views/preview/edit/activate",
            Some(json!({"address": {"section": "summary", "field": "summary"}})),
        )
        .await;
        send_json(
            &app,
            Method::PUT,
            "/api/v1/views/preview/edit/draft",
            Some(json!({"text": "stale"})),
        )
        .await;

        let (_, body) = send_json(&app, Method::DELETE, "/api/v1/document", None).await;
        assert_eq!(body["epoch"], 1);

        let (_, body) =
            send_json(&app, Method::POST, "/api/v1/views/preview/edit/blur", None).await;
        assert!(body.get("commit").is_none());
        assert_eq!(body["document"]["summary"], "");
    }

    #[tokio::test]
    async fn test_unconfigured_assist_fails_with_notice() {
        let app = app();
        let (status, body) = send_json(&app, Method::POST, "/api/v1/assist/skills", None).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"]["code"], "ASSIST_ERROR");

        let (_, tasks) = send_json(&app, Method::GET, "/api/v1/assist/tasks", None).await;
        assert_eq!(tasks[0]["key"], "skills");
        assert_eq!(tasks[0]["state"], "failed");

        let (_, notices) = send_json(&app, Method::GET, "/api/v1/notices", None).await;
        let id = notices[0]["id"].as_u64().unwrap();
        assert_eq!(notices[0]["kind"], "assist");

        let (status, _) =
            send(&app, Method::DELETE, &format!("/api/v1/notices/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_raster_export_without_backend_posts_notice() {
        let app = app();
        let (status, body) = send_json(&app, Method::GET, "/api/v1/export/png", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "EXPORT_ERROR");

        let (_, notices) = send_json(&app, Method::GET, "/api/v1/notices", None).await;
        assert_eq!(notices[0]["kind"], "export");

        let (status, _) = send_json(&app, Method::GET, "/api/v1/export/odt", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_document_round_trips_over_http() {
        let app = app();
        let mut doc = serde_json::to_value(crate::models::cv::CvData::empty()).unwrap();
        doc["personalInfo"]["fullName"] = json!("Ada Lovelace");
        doc["skills"] = json!(["Rust, SQL"]);

        let (status, body) = send_json(&app, Method::PUT, "/api/v1/document", Some(doc)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["document"]["skills"], json!(["Rust", "SQL"]));

        let (status, body) = send_json(&app, Method::GET, "/api/v1/document", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["document"]["personalInfo"]["fullName"], "Ada Lovelace");
        assert_eq!(body["epoch"], 0);
    }

    #[tokio::test]
    async fn test_read_only_views_and_removed_entities_leave_no_state() {
        let state = state();
        let app = build_router(state.clone());

        for n in 0..20 {
            let (status, _) =
                send(&app, Method::GET, &format!("/api/v1/views/v{n}/edit"), None).await;
            assert_eq!(status, StatusCode::OK);
            send(&app, Method::GET, &format!("/api/v1/views/v{n}/preview"), None).await;
        }
        assert_eq!(state.views.lock().await.open_views(), 0);

        let (_, body) =
            send_json(&app, Method::POST, "/api/v1/document/projects/entities", None).await;
        let id = body["id"].as_str().unwrap().to_string();
        let (status, _) = send_json(
            &app,
            Method::POST,
            "/api/v1/assist/enhance",
            Some(json!({"section": "projects", "entityId": id})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        let (_, tasks) = send_json(&app, Method::GET, "/api/v1/assist/tasks", None).await;
        assert_eq!(tasks.as_array().unwrap().len(), 1);

        send(
            &app,
            Method::DELETE,
            &format!("/api/v1/document/projects/entities/{id}"),
            None,
        )
        .await;
        let (_, tasks) = send_json(&app, Method::GET, "/api/v1/assist/tasks", None).await;
        assert_eq!(tasks, json!([]));
    }

    #[tokio::test]
    async fn test_unknown_entity_enhance_is_404() {
        let (status, _) = send_json(
            &app(),
            Method::POST,
            "/api/v1/assist/enhance",
            Some(json!({"section": "projects", "entityId": "missing"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
