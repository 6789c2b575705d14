//! # Server Tests
//!
//! Drive the router in-process with `tower::ServiceExt::oneshot`; no socket
//! is opened and images come from an in-memory source.

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use signet::export::StaticImageSource;
use signet::server::{AppState, ServerConfig, router};

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn app() -> Router {
    let state = AppState::with_image_source(
        ServerConfig::default(),
        Arc::new(StaticImageSource::new()),
    );
    router(Arc::new(state))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
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

fn valid_form() -> Value {
    json!({
        "name": "Jaden Drury",
        "title": "Engineer",
        "company": "Acme",
        "phone": "555-0100",
        "includeBackground": false
    })
}

async fn new_session(app: &Router) -> String {
    let (status, body) = send_json(app, Method::POST, "/api/sessions", None).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

// ============================================================================
// WHOLE-FORM API
// ============================================================================

#[tokio::test]
async fn test_validate_reports_errors() {
    let app = app();
    let (status, body) = send_json(&app, Method::POST, "/api/validate", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], json!(false));
    assert_eq!(body["errors"]["name"]["code"], json!("EmptyField"));

    let (_, body) = send_json(&app, Method::POST, "/api/validate", Some(valid_form())).await;
    assert_eq!(body, json!({ "valid": true, "errors": {} }));
}

#[tokio::test]
async fn test_render_returns_markup() {
    let app = app();
    let (status, body) = send_json(&app, Method::POST, "/api/render", Some(valid_form())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["html"].as_str().unwrap().starts_with("<table"));
    assert_eq!(body["plainText"], json!("Jaden Drury\nEngineer\nAcme\n555-0100"));
    assert_eq!(body["survivesSanitization"], json!(true));
}

#[tokio::test]
async fn test_render_invalid_form_is_422() {
    let app = app();
    let form = json!({ "name": "Ada", "website": "", "icons": [{ "url": "nope", "altText": "x" }] });
    let (status, body) = send_json(&app, Method::POST, "/api/render", Some(form)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["errors"]["icons.0.url"]["code"], json!("InvalidUrl"));
}

#[tokio::test]
async fn test_export_png_attachment() {
    let app = app();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/export/png")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(valid_form().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"email-signature.png\""
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(image::load_from_memory(&bytes).is_ok());
}

#[tokio::test]
async fn test_export_unknown_format_is_400() {
    let app = app();
    let (status, _) = send(&app, Method::POST, "/api/export/bmp", Some(valid_form())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// SESSION API
// ============================================================================

#[tokio::test]
async fn test_session_lifecycle() {
    let app = app();
    let id = new_session(&app).await;

    // Fresh session: defaults, no errors yet, nothing committed.
    let (_, view) = send_json(&app, Method::GET, &format!("/api/sessions/{id}"), None).await;
    assert_eq!(view["canExport"], json!(false));
    assert_eq!(view["errors"], json!({}));
    assert_eq!(view["form"]["fontSize"], json!("12"));
    assert_eq!(view["html"], Value::Null);

    // Typing into an untouched field validates but keeps errors hidden.
    let uri = format!("/api/sessions/{id}/change");
    let (_, view) = send_json(&app, Method::POST, &uri, Some(json!({ "field": "title", "value": "CTO" }))).await;
    assert!(view["errors"]["name"].is_object());
    assert_eq!(view["visibleErrors"], json!({}));

    let (status, _) = send_json(&app, Method::POST, &uri, Some(json!({ "field": "name", "value": "Ada" }))).await;
    assert_eq!(status, StatusCode::OK);

    let uri = format!("/api/sessions/{id}/blur");
    let (_, view) = send_json(&app, Method::POST, &uri, Some(json!({ "field": "name" }))).await;
    assert_eq!(view["canExport"], json!(true));
    assert!(view["html"].as_str().unwrap().contains("Ada"));

    let uri = format!("/api/sessions/{id}/export/svg");
    let (status, bytes) = send(&app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(bytes).unwrap().starts_with("<svg"));
}

#[tokio::test]
async fn test_session_export_without_commit_is_409() {
    let app = app();
    let id = new_session(&app).await;
    let (status, _) = send(&app, Method::POST, &format!("/api/sessions/{id}/export/png"), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_session_icon_list_edits() {
    let app = app();
    let id = new_session(&app).await;
    let uri = format!("/api/sessions/{id}/icons");

    for _ in 0..5 {
        let (status, _) = send(&app, Method::POST, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, _) = send(&app, Method::POST, &uri, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, view) = send_json(&app, Method::DELETE, &format!("{uri}/4"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["form"]["icons"].as_array().unwrap().len(), 4);

    let (status, _) = send(&app, Method::DELETE, &format!("{uri}/9"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_session_is_404() {
    let app = app();
    let uri = format!("/api/sessions/{}", uuid::Uuid::new_v4());
    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_type_mismatch_is_400() {
    let app = app();
    let id = new_session(&app).await;
    let uri = format!("/api/sessions/{id}/change");
    let (status, _) = send(&app, Method::POST, &uri, Some(json!({ "field": "includeBorder", "value": "yes" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// FRONTEND
// ============================================================================

#[tokio::test]
async fn test_index_injects_form_limits() {
    let app = app();
    let (status, bytes) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(bytes).unwrap();
    assert!(html.contains("window.__SIGNET="));
    assert!(html.contains("app.js?v="));
}

#[tokio::test]
async fn test_asset_served_with_mime() {
    let app = app();
    let response = app
        .clone()
        .oneshot(Request::get("/assets/app.css").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/css");
}
