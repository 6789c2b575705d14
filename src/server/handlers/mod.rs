//! HTTP handlers for the server.

pub mod session;
pub mod signature;

use axum::{
    Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::warn;

use crate::error::SignetError;
use crate::export::{self, ExportFormat, ImageSource, export_rich_text, resolve_images};
use crate::form::{EditError, ErrorMap};
use crate::render::RenderTree;

/// Handler failure, mapped to a status code and a JSON body.
#[derive(Debug)]
pub enum ApiError {
    /// Malformed request (400).
    BadRequest(String),
    /// Unknown session or list entry (404).
    NotFound(String),
    /// Nothing committed to export (409).
    Conflict(String),
    /// The candidate form has field errors (422).
    Invalid(ErrorMap),
    /// Export or internal failure (500).
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, json!({ "error": msg })),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, json!({ "error": msg })),
            ApiError::Invalid(errors) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": "form has errors", "errors": errors }),
            ),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": msg })),
        };
        (status, Json(body)).into_response()
    }
}

impl From<EditError> for ApiError {
    fn from(e: EditError) -> Self {
        match e {
            EditError::NoSuchEntry { .. } => ApiError::NotFound(e.to_string()),
            _ => ApiError::BadRequest(e.to_string()),
        }
    }
}

/// Target of an export route: a downloadable file or the clipboard payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportTarget {
    File(ExportFormat),
    RichText,
}

fn parse_target(format: &str) -> Result<ExportTarget, ApiError> {
    if format.eq_ignore_ascii_case("rich-text") {
        return Ok(ExportTarget::RichText);
    }
    format
        .parse()
        .map(ExportTarget::File)
        .map_err(|e: export::ExportError| ApiError::BadRequest(e.to_string()))
}

/// Export a rendered tree as an attachment (or rich-text JSON).
async fn export_response(
    tree: RenderTree,
    format: &str,
    images: &dyn ImageSource,
) -> Result<Response, ApiError> {
    let format = match parse_target(format)? {
        ExportTarget::RichText => return Ok(Json(export_rich_text(&tree)).into_response()),
        ExportTarget::File(format) => format,
    };

    let resolved = resolve_images(&tree, images).await;

    // Encoding is CPU-bound.
    let bytes = tokio::task::spawn_blocking(move || export::export(&tree, format, &resolved))
        .await
        .map_err(|e| ApiError::Internal(format!("Task error: {}", e)))?
        .map_err(|e| {
            let e = SignetError::from(e);
            warn!(%format, error = %e, "export failed");
            ApiError::Internal(e.to_string())
        })?;

    Ok((
        [
            (header::CONTENT_TYPE, format.mime().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", format.file_name()),
            ),
        ],
        bytes,
    )
        .into_response())
}
