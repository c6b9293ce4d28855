//! Project-level API endpoints: the session and its stage transitions.

use axum::{extract::State, Json};

use super::{error, success, ApiResult};
use crate::auth::BearerCredential;
use crate::models::{AdvanceResult, CreateDraftRequest, ExportResult, ResetRequest, SessionSnapshot};
use crate::AppState;

/// GET /api/project - Current session snapshot.
pub async fn get_project(State(state): State<AppState>) -> ApiResult<SessionSnapshot> {
    let snapshot = state.controller.snapshot().await;
    let revision_id = snapshot.revision;
    success(snapshot, revision_id)
}

/// POST /api/project/draft - Generate the slide text for a topic.
pub async fn submit_draft(
    State(state): State<AppState>,
    Json(request): Json<CreateDraftRequest>,
) -> ApiResult<SessionSnapshot> {
    match state.controller.submit(&request).await {
        Ok(snapshot) => {
            let revision_id = snapshot.revision;
            success(snapshot, revision_id)
        }
        Err(e) => error(e, state.controller.revision().await),
    }
}

/// POST /api/project/advance - Generate images and move to editing.
pub async fn advance_project(State(state): State<AppState>) -> ApiResult<AdvanceResult> {
    match state.controller.advance().await {
        Ok(result) => {
            let revision_id = result.session.revision;
            success(result, revision_id)
        }
        Err(e) => error(e, state.controller.revision().await),
    }
}

/// POST /api/project/reset - Discard the project and return to the start.
pub async fn reset_project(
    State(state): State<AppState>,
    Json(request): Json<ResetRequest>,
) -> ApiResult<SessionSnapshot> {
    match state.controller.reset(request.confirm).await {
        Ok(snapshot) => {
            let revision_id = snapshot.revision;
            success(snapshot, revision_id)
        }
        Err(e) => error(e, state.controller.revision().await),
    }
}

/// POST /api/project/export - Publish the deck with the caller's credential.
pub async fn export_project(
    State(state): State<AppState>,
    credential: BearerCredential,
) -> ApiResult<ExportResult> {
    let result = state.controller.export(credential.as_deref()).await;
    let revision_id = state.controller.revision().await;

    match result {
        Ok(export) => success(export, revision_id),
        Err(e) => error(e, revision_id),
    }
}
