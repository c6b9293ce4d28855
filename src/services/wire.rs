//! Request/response shapes of the collaborator services.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::models::SlideRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftServiceRequest {
    pub title: String,
    pub count: u32,
    pub is_locked: bool,
}

/// `{ data: { slides: [...] } }`; both levels optional so a malformed
/// reply reaches the draft stage instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftServiceResponse {
    #[serde(default)]
    pub data: Option<DraftPayload>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftPayload {
    #[serde(default)]
    pub slides: Option<Vec<DraftSlide>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftSlide {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub visual_prompt: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageServiceRequest<'a> {
    pub prompt: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageServiceResponse {
    #[serde(default)]
    pub image_base64: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LayoutServiceRequest<'a> {
    pub image_base64: &'a str,
}

/// `layout` is kept raw so the remake stage decides what is malformed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LayoutServiceResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub layout: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportServiceRequest {
    pub title: String,
    pub slides: Vec<Arc<SlideRecord>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportServiceResponse {
    #[serde(default)]
    pub url: Option<String>,
}
