//! Project State and workflow stage.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::SlideRecord;

/// Largest deck the draft stage will produce.
pub const MAX_SLIDE_COUNT: u32 = 10;

/// Top-level workflow stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Draft,
    Review,
    Edit,
    Exported,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Draft => "draft",
            Stage::Review => "review",
            Stage::Edit => "edit",
            Stage::Exported => "exported",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The active project of a session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectState {
    pub id: Uuid,
    pub topic: String,
    pub slide_count: u32,
    pub is_locked: bool,
    pub slides: Vec<Arc<SlideRecord>>,
    pub created_at: String,
    pub updated_at: String,
}

impl ProjectState {
    pub fn new(topic: String, is_locked: bool, slides: Vec<SlideRecord>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: Uuid::new_v4(),
            topic,
            slide_count: slides.len() as u32,
            is_locked,
            slides: slides.into_iter().map(Arc::new).collect(),
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn slide(&self, index: usize) -> Option<&Arc<SlideRecord>> {
        self.slides.get(index)
    }

    /// Swap the record at `index`; every other record is left untouched.
    pub fn replace_slide(&mut self, index: usize, slide: SlideRecord) -> Option<Arc<SlideRecord>> {
        let updated = Arc::new(slide);
        *self.slides.get_mut(index)? = Arc::clone(&updated);
        self.touch();
        Some(updated)
    }

    /// Replace every record at once. Length must match the current deck.
    pub fn replace_all(&mut self, slides: Vec<SlideRecord>) -> bool {
        if slides.len() != self.slides.len() {
            return false;
        }
        self.slides = slides.into_iter().map(Arc::new).collect();
        self.touch();
        true
    }

    fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }
}

/// Read-only view of the session returned by the API.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub stage: Stage,
    pub revision: i64,
    pub project: Option<ProjectState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_url: Option<String>,
}
