pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post, put},
    Router,
};

use crate::editor::{handlers as editor, MAX_PHOTO_BYTES};
use crate::enhance::handlers as enhance;
use crate::export::handlers as export;
use crate::render::handlers as preview;
use crate::state::AppState;

/// Room for a maximal photo sent as a base64 `data:` URL inside a JSON document.
const BODY_LIMIT_BYTES: usize = MAX_PHOTO_BYTES * 2;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Document
        .route(
            "/api/v1/resume",
            get(editor::handle_get_resume).put(editor::handle_replace_resume),
        )
        .route("/api/v1/resume/contact", put(editor::handle_set_contact))
        .route("/api/v1/resume/summary", put(editor::handle_set_summary))
        .route(
            "/api/v1/resume/skills",
            put(editor::handle_set_skills).post(editor::handle_add_skill),
        )
        .route(
            "/api/v1/resume/skills/:index",
            delete(editor::handle_remove_skill),
        )
        .route(
            "/api/v1/resume/sections/:section",
            post(editor::handle_add_entry),
        )
        .route(
            "/api/v1/resume/sections/:section/:id",
            put(editor::handle_update_entry).delete(editor::handle_remove_entry),
        )
        .route(
            "/api/v1/resume/photo",
            post(editor::handle_upload_photo).delete(editor::handle_clear_photo),
        )
        // Personalization
        .route(
            "/api/v1/personalization",
            get(editor::handle_get_personalization).put(editor::handle_set_personalization),
        )
        .route("/api/v1/fonts", get(editor::handle_list_fonts))
        .route("/api/v1/templates", get(editor::handle_list_templates))
        .route("/api/v1/template", put(editor::handle_select_template))
        // Preview / export / enhancement
        .route("/api/v1/preview", get(preview::handle_get_preview))
        .route("/api/v1/export", post(export::handle_export))
        .route("/api/v1/enhance", post(enhance::handle_enhance))
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::state::test_state;

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        app.clone().oneshot(request.body(body).unwrap()).await.unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let app = build_router(test_state());
        let response = send(&app, "GET", "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_section_entry_lifecycle() {
        let state = test_state();
        let app = build_router(state.clone());

        let response = send(
            &app,
            "POST",
            "/api/v1/resume/sections/experience",
            Some(json!({"company": "Acme", "role": "Engineer", "startDate": "2021-02"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created = json_body(response).await;
        let id = created["id"].as_str().unwrap().to_string();

        let response = send(
            &app,
            "PUT",
            &format!("/api/v1/resume/sections/experience/{id}"),
            Some(json!({"company": "Acme Corp", "role": "Lead"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["id"], id.as_str());

        // The preview was re-rendered by the edit.
        let text = state.preview_surface().lock().root().text_content();
        assert!(text.contains("Lead – Acme Corp"));

        let response = send(
            &app,
            "DELETE",
            &format!("/api/v1/resume/sections/experience/{id}"),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(
            &app,
            "DELETE",
            &format!("/api/v1/resume/sections/experience/{id}"),
            None,
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["error"]["code"], "ENTRY_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_unknown_section_is_not_found() {
        let app = build_router(test_state());
        let response = send(
            &app,
            "POST",
            "/api/v1/resume/sections/hobbies",
            Some(json!({"name": "Chess"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_skills_from_comma_separated_text() {
        let app = build_router(test_state());
        let response = send(
            &app,
            "PUT",
            "/api/v1/resume/skills",
            Some(json!({"text": "Rust, Go, , SQL"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["skills"], json!(["Rust", "Go", "SQL"]));

        let response = send(&app, "DELETE", "/api/v1/resume/skills/9", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_personalization_round_trip_and_catalogues() {
        let app = build_router(test_state());
        let response = send(
            &app,
            "PUT",
            "/api/v1/personalization",
            Some(json!({"primaryColor": "#112233", "accentColor": "#445566", "fontFamily": "Lora (Serif)"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, "GET", "/api/v1/preview", None).await;
        let preview = json_body(response).await;
        assert_eq!(preview["fontFamily"], "Lora");
        assert_eq!(preview["template"], "classic");

        let fonts = json_body(send(&app, "GET", "/api/v1/fonts", None).await).await;
        assert_eq!(fonts.as_array().unwrap().len(), 4);
        let templates = json_body(send(&app, "GET", "/api/v1/templates", None).await).await;
        assert_eq!(templates[0]["displayName"], "Classic Professional");
    }

    #[tokio::test]
    async fn test_export_returns_pdf_attachment() {
        let app = build_router(test_state());
        send(
            &app,
            "PUT",
            "/api/v1/resume/contact",
            Some(json!({"name": "Alex Johnson", "title": "Engineer"})),
        )
        .await;

        let response = send(&app, "POST", "/api/v1/export", None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/pdf"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"Alex_Johnson_classic.pdf\""
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[tokio::test]
    async fn test_export_rejects_malformed_body() {
        let app = build_router(test_state());
        send(&app, "PUT", "/api/v1/resume/summary", Some(json!({"summary": "x"}))).await;

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/export")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{\"fileName\": "))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");

        let response = send(&app, "POST", "/api/v1/export", Some(json!({"fileName": "cv.pdf"}))).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"cv.pdf\""
        );
    }

    #[tokio::test]
    async fn test_export_before_any_render_reports_generic_failure() {
        let app = build_router(test_state());
        let response = send(
            &app,
            "POST",
            "/api/v1/export",
            Some(json!({"fileName": "cv.pdf"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"]["message"], "PDF export failed. Please try again.");
    }

    #[tokio::test]
    async fn test_enhance_without_api_key_is_unavailable() {
        let app = build_router(test_state());
        let response = send(
            &app,
            "POST",
            "/api/v1/enhance",
            Some(json!({"sectionText": "Built APIs", "sectionType": "Professional Summary"})),
        )
        .await;
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_photo_upload_requires_photo_field() {
        let app = build_router(test_state());
        let boundary = "XBOUNDARY";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nvalue\r\n--{boundary}--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/resume/photo")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
