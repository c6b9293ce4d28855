//! Vector scene description produced by layout analysis.
//!
//! Field names follow the analysis service output (`background_color`,
//! `shape_type`, `fontSize`, ...). Missing or null attributes fall back to
//! the same defaults the editor uses; structurally broken elements (unknown
//! `type`, non-numeric `bbox`) make the whole scene unreadable.

use serde::{Deserialize, Deserializer, Serialize};

use super::Color;

/// Design canvas width in slide units.
pub const CANVAS_WIDTH: f64 = 960.0;
/// Design canvas height in slide units.
pub const CANVAS_HEIGHT: f64 = 540.0;

/// Axis-aligned box in canvas coordinates, serialized as `[x, y, w, h]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BBox {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    fn is_well_formed(&self) -> bool {
        [self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
            && self.width >= 0.0
            && self.height >= 0.0
    }
}

impl Default for BBox {
    fn default() -> Self {
        BBox::new(0.0, 0.0, 100.0, 100.0)
    }
}

impl From<[f64; 4]> for BBox {
    fn from([x, y, width, height]: [f64; 4]) -> Self {
        BBox::new(x, y, width, height)
    }
}

impl From<BBox> for [f64; 4] {
    fn from(b: BBox) -> Self {
        [b.x, b.y, b.width, b.height]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShapeType {
    RoundRectangle,
    Ellipse,
    #[default]
    #[serde(other)]
    Rectangle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Bold,
    #[default]
    #[serde(other)]
    Normal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Center,
    Right,
    Justify,
    #[default]
    #[serde(other)]
    Left,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeElement {
    #[serde(default, deserialize_with = "or_default")]
    pub shape_type: ShapeType,
    #[serde(default = "default_ink", deserialize_with = "ink")]
    pub color: Color,
    #[serde(default = "default_opacity", deserialize_with = "clamped_opacity")]
    pub opacity: f64,
    #[serde(default, deserialize_with = "or_default")]
    pub bbox: BBox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IconElement {
    #[serde(default = "default_icon_name", deserialize_with = "icon_name")]
    pub icon_name: String,
    #[serde(default = "default_icon_color", deserialize_with = "icon_color")]
    pub color: Color,
    #[serde(default, deserialize_with = "or_default")]
    pub bbox: BBox,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    #[serde(default, deserialize_with = "or_default")]
    pub text: String,
    #[serde(
        rename = "fontSize",
        default = "default_font_size",
        deserialize_with = "positive_font_size"
    )]
    pub font_size: f64,
    #[serde(default = "default_ink", deserialize_with = "ink")]
    pub color: Color,
    #[serde(rename = "fontWeight", default, deserialize_with = "or_default")]
    pub font_weight: FontWeight,
    #[serde(default, deserialize_with = "or_default")]
    pub align: TextAlign,
    #[serde(default, deserialize_with = "or_default")]
    pub bbox: BBox,
}

/// Region the analysis judged too complex to decompose into primitives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramElement {
    #[serde(default, deserialize_with = "or_default")]
    pub prompt: String,
    #[serde(default, deserialize_with = "or_default")]
    pub bbox: BBox,
}

/// One drawable element of a vector scene. Closed set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SceneElement {
    Shape(ShapeElement),
    Icon(IconElement),
    Text(TextElement),
    DiagramImage(DiagramElement),
}

impl SceneElement {
    pub fn bbox(&self) -> BBox {
        match self {
            SceneElement::Shape(e) => e.bbox,
            SceneElement::Icon(e) => e.bbox,
            SceneElement::Text(e) => e.bbox,
            SceneElement::DiagramImage(e) => e.bbox,
        }
    }
}

/// Structured reconstruction of a raster slide. `elements` order is z-order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorScene {
    #[serde(default = "default_background", deserialize_with = "background")]
    pub background_color: Color,
    #[serde(default, deserialize_with = "or_default")]
    pub elements: Vec<SceneElement>,
}

impl VectorScene {
    /// Reject geometry the renderer cannot place.
    pub fn validate(&self) -> Result<(), String> {
        for (index, element) in self.elements.iter().enumerate() {
            if !element.bbox().is_well_formed() {
                return Err(format!("element {} has an invalid bbox", index));
            }
        }
        Ok(())
    }
}

fn default_ink() -> Color {
    Color::BLACK
}

fn default_icon_color() -> Color {
    Color::rgb(0x33, 0x33, 0x33)
}

fn default_background() -> Color {
    Color::WHITE
}

fn default_icon_name() -> String {
    "circle".to_string()
}

fn default_font_size() -> f64 {
    18.0
}

fn default_opacity() -> f64 {
    1.0
}

// An explicit `null` reads the same as an absent field.

fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn ink<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Color, D::Error> {
    Ok(Option::<Color>::deserialize(deserializer)?.unwrap_or_else(default_ink))
}

fn icon_color<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Color, D::Error> {
    Ok(Option::<Color>::deserialize(deserializer)?.unwrap_or_else(default_icon_color))
}

fn background<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Color, D::Error> {
    Ok(Option::<Color>::deserialize(deserializer)?.unwrap_or_else(default_background))
}

fn icon_name<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(default_icon_name))
}

/// Non-positive or non-finite sizes fall back to the default.
fn positive_font_size<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(Option::<f64>::deserialize(deserializer)?
        .filter(|size| size.is_finite() && *size > 0.0)
        .unwrap_or_else(default_font_size))
}

fn clamped_opacity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(match Option::<f64>::deserialize(deserializer)? {
        Some(raw) if raw.is_finite() => raw.clamp(0.0, 1.0),
        _ => default_opacity(),
    })
}
