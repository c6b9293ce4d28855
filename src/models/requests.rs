//! Request and response bodies of the project API.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{SessionSnapshot, SlideRecord, TextLayout, ViewMode};

fn default_slide_count() -> u32 {
    5
}

/// Request body for starting a project from a topic.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDraftRequest {
    #[serde(alias = "title")]
    pub topic: String,
    #[serde(default = "default_slide_count", alias = "count")]
    pub slide_count: u32,
    #[serde(default, alias = "is_locked")]
    pub is_locked: bool,
}

/// Request body for replacing a slide's overlay layout.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateLayoutRequest {
    #[serde(default)]
    pub layout: Option<TextLayout>,
}

/// Request body for switching a slide's active view.
#[derive(Debug, Clone, Deserialize)]
pub struct SetViewModeRequest {
    pub mode: ViewMode,
}

/// Request body for discarding the project.
#[derive(Debug, Clone, Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub confirm: bool,
}

/// Query string of the scene endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SceneQuery {
    #[serde(default)]
    pub mode: Option<ViewMode>,
}

/// Result of advancing from review to edit.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceResult {
    pub session: SessionSnapshot,
    /// Indices of slides left without a background image.
    pub failed_slides: Vec<usize>,
}

/// Result of a text edit. `applied` is false when the project is locked.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditResult {
    pub slide: Arc<SlideRecord>,
    pub applied: bool,
}

/// Result of a successful export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportResult {
    pub url: String,
}
