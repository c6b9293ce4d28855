//! Renderer-independent drawable scene.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::icons::GlyphShape;
use crate::models::{BBox, Color, FontWeight, TextAlign, ViewMode};

/// Everything needed to draw one slide, back to front.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    pub mode: ViewMode,
    pub background: Background,
    /// Drawn in order; later nodes cover earlier ones.
    pub nodes: Vec<SceneNode>,
    /// Icon names that had no glyph and were left out.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unresolved_icons: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Background {
    /// Raster stretched to exactly the canvas size; aspect ratio is not kept.
    Image {
        data: String,
        mime_type: String,
        width: f64,
        height: f64,
    },
    Solid { color: Color },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextRole {
    Title,
    Content,
    Free,
}

/// Word-wrapping text box. Wraps at `width`; height grows with the text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextBox {
    pub role: TextRole,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub text: String,
    pub font_size: f64,
    pub color: Color,
    pub font_weight: FontWeight,
    pub align: TextAlign,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backdrop: Option<Color>,
    pub padding: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SceneNode {
    Rect {
        bbox: BBox,
        fill: Color,
        opacity: f64,
        corner_radius: f64,
    },
    Ellipse {
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
        fill: Color,
        opacity: f64,
    },
    /// Stroke-only icon mapped onto its box with independent x/y scale.
    Glyph {
        icon_name: String,
        translate_x: f64,
        translate_y: f64,
        scale_x: f64,
        scale_y: f64,
        stroke: Color,
        stroke_style: BTreeMap<String, String>,
        shapes: Vec<GlyphShape>,
    },
    TextBox(TextBox),
    /// Region reserved for an illustration that was not decomposed.
    Placeholder { bbox: BBox, prompt: String },
}
