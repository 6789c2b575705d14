//! Session endpoints: one [`FormController`] per browser tab, edited field
//! by field the way the form widgets report changes.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::form::{ErrorMap, Field, FieldValue, FormController, SignatureForm};
use crate::render::render;

use super::super::state::{AppState, Session};
use super::{ApiError, export_response};

/// Snapshot of a session returned by every session endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub form: SignatureForm,
    pub errors: ErrorMap,
    pub visible_errors: ErrorMap,
    pub can_export: bool,
    /// Preview of the committed model, absent until one exists.
    pub html: Option<String>,
}

impl SessionView {
    fn of(controller: &FormController) -> Self {
        Self {
            form: controller.form().clone(),
            errors: controller.errors().clone(),
            visible_errors: controller.visible_errors(),
            can_export: controller.can_export(),
            html: controller.committed().map(|m| render(m).to_html()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedSession {
    pub id: Uuid,
    pub state: SessionView,
}

#[derive(Debug, Deserialize)]
pub struct ChangeRequest {
    pub field: Field,
    pub value: FieldValue,
}

#[derive(Debug, Deserialize)]
pub struct BlurRequest {
    pub field: Field,
}

/// Run `edit` against a session's controller and return its new view.
async fn with_session<F>(state: &AppState, id: Uuid, edit: F) -> Result<Json<SessionView>, ApiError>
where
    F: FnOnce(&mut FormController) -> Result<(), ApiError>,
{
    let mut sessions = state.sessions.write().await;
    let session = sessions
        .get_mut(&id)
        .ok_or_else(|| ApiError::NotFound(format!("Session not found: {}", id)))?;
    session.touch();
    edit(&mut session.controller)?;
    Ok(Json(SessionView::of(&session.controller)))
}

/// POST /api/sessions
pub async fn create(State(state): State<Arc<AppState>>) -> (StatusCode, Json<CreatedSession>) {
    let id = Uuid::new_v4();
    let session = Session::new();
    let view = SessionView::of(&session.controller);
    let count = {
        let mut sessions = state.sessions.write().await;
        sessions.insert(id, session);
        sessions.len()
    };
    info!(%id, active = count, "session created");
    (StatusCode::CREATED, Json(CreatedSession { id, state: view }))
}

/// GET /api/sessions/:id
pub async fn show(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    with_session(&state, id, |_| Ok(())).await
}

/// POST /api/sessions/:id/change
pub async fn change(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ChangeRequest>,
) -> Result<Json<SessionView>, ApiError> {
    debug!(%id, field = %req.field, "change");
    with_session(&state, id, |c| Ok(c.change(req.field, req.value)?)).await
}

/// POST /api/sessions/:id/blur
pub async fn blur(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<BlurRequest>,
) -> Result<Json<SessionView>, ApiError> {
    with_session(&state, id, |c| {
        c.blur(req.field);
        Ok(())
    })
    .await
}

/// POST /api/sessions/:id/reset
pub async fn reset(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    with_session(&state, id, |c| {
        c.reset();
        Ok(())
    })
    .await
}

/// POST /api/sessions/:id/images
pub async fn add_image(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    with_session(&state, id, |c| c.add_image().map(drop).map_err(Into::into)).await
}

/// DELETE /api/sessions/:id/images/:index
pub async fn remove_image(
    State(state): State<Arc<AppState>>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Json<SessionView>, ApiError> {
    with_session(&state, id, |c| Ok(c.remove_image(index)?)).await
}

/// POST /api/sessions/:id/icons
pub async fn add_icon(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ApiError> {
    with_session(&state, id, |c| c.add_icon().map(drop).map_err(Into::into)).await
}

/// DELETE /api/sessions/:id/icons/:index
pub async fn remove_icon(
    State(state): State<Arc<AppState>>,
    Path((id, index)): Path<(Uuid, usize)>,
) -> Result<Json<SessionView>, ApiError> {
    with_session(&state, id, |c| Ok(c.remove_icon(index)?)).await
}

/// POST /api/sessions/:id/export/:format
///
/// Exports the committed model, never the candidate.
pub async fn export(
    State(state): State<Arc<AppState>>,
    Path((id, format)): Path<(Uuid, String)>,
) -> Result<Response, ApiError> {
    let tree = {
        let mut sessions = state.sessions.write().await;
        let session = sessions
            .get_mut(&id)
            .ok_or_else(|| ApiError::NotFound(format!("Session not found: {}", id)))?;
        session.touch();
        if !session.controller.can_export() {
            return Err(ApiError::Conflict(
                "Nothing to export: the form has errors".to_string(),
            ));
        }
        match session.controller.committed() {
            Some(model) => render(model),
            None => return Err(ApiError::Conflict("Nothing to export yet".to_string())),
        }
    };

    export_response(tree, &format, state.images.as_ref()).await
}
