//! Per-slide API endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use super::{error, success, ApiResult};
use crate::errors::AppErrorWithRevision;
use crate::models::{
    EditResult, SceneQuery, SetViewModeRequest, SlideRecord, SlideTextEdit, UpdateLayoutRequest,
};
use crate::render::Scene;
use crate::AppState;

/// PUT /api/project/slides/:index - Edit title, content or visual prompt.
pub async fn edit_slide(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(request): Json<SlideTextEdit>,
) -> ApiResult<EditResult> {
    let result = state.controller.edit_slide(index, &request).await;
    let revision_id = state.controller.revision().await;

    match result {
        Ok(edit) => success(edit, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/project/slides/:index/layout - Place or clear the overlay text boxes.
pub async fn update_layout(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(request): Json<UpdateLayoutRequest>,
) -> ApiResult<Arc<SlideRecord>> {
    let result = state.controller.set_layout(index, request.layout).await;
    let revision_id = state.controller.revision().await;

    match result {
        Ok(slide) => success(slide, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/project/slides/:index/view - Switch between image and vector view.
pub async fn set_view_mode(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Json(request): Json<SetViewModeRequest>,
) -> ApiResult<Arc<SlideRecord>> {
    let result = state.controller.set_view_mode(index, request.mode).await;
    let revision_id = state.controller.revision().await;

    match result {
        Ok(slide) => success(slide, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/project/slides/:index/remake - Rebuild the slide as vector elements.
pub async fn remake_slide(
    State(state): State<AppState>,
    Path(index): Path<usize>,
) -> ApiResult<Arc<SlideRecord>> {
    let result = state.controller.remake_slide(index).await;
    let revision_id = state.controller.revision().await;

    match result {
        Ok(slide) => success(slide, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/project/slides/:index/scene - Drawable scene of one slide.
pub async fn get_scene(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Query(query): Query<SceneQuery>,
) -> ApiResult<Scene> {
    let result = state.controller.render_slide(index, query.mode).await;
    let revision_id = state.controller.revision().await;

    match result {
        Ok(scene) => success(scene, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/project/slides/:index/preview.svg - The same scene as an SVG image.
pub async fn get_preview_svg(
    State(state): State<AppState>,
    Path(index): Path<usize>,
    Query(query): Query<SceneQuery>,
) -> Response {
    match state.controller.render_svg(index, query.mode).await {
        Ok(svg) => ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response(),
        Err(e) => AppErrorWithRevision {
            error: e,
            revision_id: state.controller.revision().await,
        }
        .into_response(),
    }
}
