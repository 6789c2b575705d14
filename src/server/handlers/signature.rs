//! Stateless endpoints: validate, render or export a whole form in one
//! request.

use axum::{
    Json,
    extract::{Path, State},
    response::Response,
};
use serde::Serialize;
use std::sync::Arc;

use crate::form::{ErrorMap, SignatureForm, validate as validate_form};
use crate::render::render as render_model;
use crate::sanitize::survives_sanitization;

use super::super::state::AppState;
use super::{ApiError, export_response};

#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub errors: ErrorMap,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderResponse {
    pub html: String,
    pub plain_text: String,
    pub survives_sanitization: bool,
}

/// POST /api/validate
pub async fn validate(Json(mut form): Json<SignatureForm>) -> Json<ValidateResponse> {
    form.normalize_all();
    let errors = validate_form(&form);
    Json(ValidateResponse {
        valid: errors.is_empty(),
        errors,
    })
}

/// POST /api/render
pub async fn render(Json(mut form): Json<SignatureForm>) -> Result<Json<RenderResponse>, ApiError> {
    form.normalize_all();
    let model = form.to_model().map_err(ApiError::Invalid)?;
    let tree = render_model(&model);
    let html = tree.to_html();
    Ok(Json(RenderResponse {
        survives_sanitization: survives_sanitization(&html),
        plain_text: tree.to_plain_text(),
        html,
    }))
}

/// POST /api/export/:format
pub async fn export(
    State(state): State<Arc<AppState>>,
    Path(format): Path<String>,
    Json(mut form): Json<SignatureForm>,
) -> Result<Response, ApiError> {
    form.normalize_all();
    let model = form.to_model().map_err(ApiError::Invalid)?;
    export_response(render_model(&model), &format, state.images.as_ref()).await
}
