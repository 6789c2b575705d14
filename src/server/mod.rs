//! # HTTP Server for the Signature Form
//!
//! Serves the embedded form page and a JSON API around the form controller.
//!
//! ## Usage
//!
//! ```bash
//! signet serve --listen 127.0.0.1:8080
//! ```
//!
//! Then open http://localhost:8080 in a browser.
//!
//! ## Routes
//!
//! | Method | Path | |
//! |--------|------|-|
//! | GET | `/`, `/assets/*path` | embedded frontend |
//! | POST | `/api/validate` | error mapping for a whole form |
//! | POST | `/api/render` | HTML + plain text, 422 on errors |
//! | POST | `/api/export/:format` | `png`, `jpeg`, `svg` or `rich-text` |
//! | POST | `/api/sessions` | new form session |
//! | GET | `/api/sessions/:id` | session snapshot |
//! | POST | `/api/sessions/:id/{change,blur,reset}` | field edits |
//! | POST/DELETE | `/api/sessions/:id/{images,icons}[/:index]` | list edits |
//! | POST | `/api/sessions/:id/export/:format` | export the committed model, 409 if none |

mod handlers;
mod state;
mod static_files;

pub use handlers::ApiError;
pub use state::{AppState, SESSION_EXPIRATION_SECS, ServerConfig, Session};

use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::SignetError;

/// How often expired sessions and cached images are swept.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Frontend
        .route("/", get(static_files::index_handler))
        .route("/assets/*path", get(static_files::asset_handler))
        // Whole-form API
        .route("/api/validate", post(handlers::signature::validate))
        .route("/api/render", post(handlers::signature::render))
        .route("/api/export/:format", post(handlers::signature::export))
        // Session API
        .route("/api/sessions", post(handlers::session::create))
        .route("/api/sessions/:id", get(handlers::session::show))
        .route("/api/sessions/:id/change", post(handlers::session::change))
        .route("/api/sessions/:id/blur", post(handlers::session::blur))
        .route("/api/sessions/:id/reset", post(handlers::session::reset))
        .route("/api/sessions/:id/images", post(handlers::session::add_image))
        .route(
            "/api/sessions/:id/images/:index",
            delete(handlers::session::remove_image),
        )
        .route("/api/sessions/:id/icons", post(handlers::session::add_icon))
        .route(
            "/api/sessions/:id/icons/:index",
            delete(handlers::session::remove_icon),
        )
        .route(
            "/api/sessions/:id/export/:format",
            post(handlers::session::export),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use signet::server::{serve, ServerConfig};
///
/// # async fn example() -> Result<(), signet::error::SignetError> {
/// serve(ServerConfig::default()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<(), SignetError> {
    let app_state = Arc::new(AppState::new(config.clone())?);

    tokio::spawn(cleanup_caches(app_state.clone()));

    let app = router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            SignetError::Transport(format!("Failed to bind to {}: {}", config.listen_addr, e))
        })?;

    info!(
        listen = %config.listen_addr,
        session_ttl_secs = config.session_ttl.as_secs(),
        "signet server listening, open http://{}/",
        config.listen_addr
    );

    axum::serve(listener, app)
        .await
        .map_err(|e| SignetError::Transport(format!("Server error: {}", e)))?;

    Ok(())
}

/// Background task to drop expired sessions and idle cached images.
async fn cleanup_caches(state: Arc<AppState>) {
    let mut interval = tokio::time::interval(CLEANUP_INTERVAL);

    loop {
        interval.tick().await;

        let expired = state.expire_sessions().await;
        if expired > 0 {
            let remaining = state.sessions.read().await.len();
            info!(expired, remaining, "cleaned up expired sessions");
        }

        let evicted = state.images.evict_idle(state.config.session_ttl).await;
        if evicted > 0 {
            info!(evicted, "cleaned up idle cached images");
        }
    }
}
