//! Static file serving for the frontend.

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use include_dir::{Dir, include_dir};
use std::sync::Arc;
use tracing::debug;

use crate::form::{NEW_ICON_URL, NEW_IMAGE_URL, SignatureForm};
use crate::model::{
    MAX_BORDER_WIDTH, MAX_FONT_SIZE, MAX_ICONS, MAX_IMAGES, MIN_BORDER_WIDTH, MIN_FONT_SIZE,
};

use super::state::AppState;

/// Embedded frontend distribution files.
static FRONTEND_DIST: Dir = include_dir!("$CARGO_MANIFEST_DIR/frontend/dist");

/// Serve index.html with cache-busting parameters and the form limits
/// injected, so the page and the server agree on defaults.
pub async fn index_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match FRONTEND_DIST.get_file("index.html") {
        Some(file) => {
            let contents = String::from_utf8_lossy(file.contents());
            let cache_bust = format!("?v={}", state.boot_time);
            let busted = contents
                .replace(".js\"", &format!(".js{}\"", cache_bust))
                .replace(".css\"", &format!(".css{}\"", cache_bust));

            let limits = serde_json::json!({
                "defaults": SignatureForm::default(),
                "maxImages": MAX_IMAGES,
                "maxIcons": MAX_ICONS,
                "minFontSize": MIN_FONT_SIZE,
                "maxFontSize": MAX_FONT_SIZE,
                "minBorderWidth": MIN_BORDER_WIDTH,
                "maxBorderWidth": MAX_BORDER_WIDTH,
                "newImageUrl": NEW_IMAGE_URL,
                "newIconUrl": NEW_ICON_URL,
            });
            let script = format!("<script>window.__SIGNET={}</script></head>", limits);
            let busted = busted.replace("</head>", &script);

            Html(busted).into_response()
        }
        None => (StatusCode::NOT_FOUND, "Frontend not built").into_response(),
    }
}

/// Serve a file under `assets/`. Query strings from the cache-busting
/// suffix are ignored; the long max-age relies on that suffix changing.
pub async fn asset_handler(Path(path): Path<String>) -> Response {
    let name = path.split('?').next().unwrap_or_default();

    let Some(file) = FRONTEND_DIST.get_file(format!("assets/{name}")) else {
        debug!(asset = name, "asset miss");
        return (StatusCode::NOT_FOUND, "Asset not found").into_response();
    };

    let mime = mime_guess::from_path(name).first_or_octet_stream();
    let mut response = file.contents().to_vec().into_response();
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(mime.essence_str()) {
        headers.insert(header::CONTENT_TYPE, value);
    }
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=31536000, immutable"),
    );
    response
}
