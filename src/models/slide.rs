//! Slide Record: the per-slide entity carried from draft to export.

use serde::{Deserialize, Serialize};

use super::{Color, VectorScene};

/// How a slide is presented in the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Raster background with overlay text.
    #[default]
    Image,
    /// Reconstructed vector elements.
    Vector,
}

/// Position of one overlay text box on the raster background.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPlacement {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

/// Overlay placement for title and content in image mode.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TextLayout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<TextPlacement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<TextPlacement>,
}

impl TextPlacement {
    fn is_well_formed(&self) -> bool {
        [self.left, self.top, self.width]
            .iter()
            .all(|v| v.is_finite())
            && self.width >= 0.0
    }
}

impl TextLayout {
    /// Reject placements the renderer cannot draw.
    pub fn validate(&self) -> Result<(), String> {
        for (role, placement) in [("title", &self.title), ("content", &self.content)] {
            if placement.as_ref().is_some_and(|p| !p.is_well_formed()) {
                return Err(format!(
                    "The {} box needs a finite position and a non-negative width",
                    role
                ));
            }
        }
        Ok(())
    }
}

/// Requested changes to the text fields of a slide.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideTextEdit {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, alias = "visual_prompt")]
    pub visual_prompt: Option<String>,
}

impl SlideTextEdit {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.visual_prompt.is_none()
    }
}

/// One slide. Never mutated in place: every change builds a new record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlideRecord {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub visual_prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<TextLayout>,
    /// Base64 image bytes; `None` when generation failed or has not run.
    #[serde(rename = "backgroundImage", default)]
    pub background_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remake_data: Option<VectorScene>,
    #[serde(default)]
    pub view_mode: ViewMode,
}

impl SlideRecord {
    /// A draft record: text only, no image, layout or remake.
    pub fn text_only(
        title: impl Into<String>,
        content: impl Into<String>,
        visual_prompt: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            visual_prompt: visual_prompt.into(),
            layout: None,
            background_image: None,
            remake_data: None,
            view_mode: ViewMode::Image,
        }
    }

    /// The mode the renderer will actually use for `requested`.
    pub fn effective_mode(&self, requested: ViewMode) -> ViewMode {
        match requested {
            ViewMode::Vector if self.remake_data.is_some() => ViewMode::Vector,
            _ => ViewMode::Image,
        }
    }

    pub fn with_text_edit(&self, edit: &SlideTextEdit) -> Self {
        let mut next = self.clone();
        if let Some(title) = &edit.title {
            next.title = title.clone();
        }
        if let Some(content) = &edit.content {
            next.content = content.clone();
        }
        if let Some(visual_prompt) = &edit.visual_prompt {
            next.visual_prompt = visual_prompt.clone();
        }
        next
    }

    pub fn with_background(&self, background_image: Option<String>) -> Self {
        Self {
            background_image,
            ..self.clone()
        }
    }

    pub fn with_layout(&self, layout: Option<TextLayout>) -> Self {
        Self {
            layout,
            ..self.clone()
        }
    }

    /// Attach a reconstruction and make it the active view.
    pub fn with_remake(&self, scene: VectorScene) -> Self {
        Self {
            remake_data: Some(scene),
            view_mode: ViewMode::Vector,
            ..self.clone()
        }
    }

    pub fn with_view_mode(&self, view_mode: ViewMode) -> Self {
        Self {
            view_mode,
            ..self.clone()
        }
    }
}
