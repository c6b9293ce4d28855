//! Vector icon glyphs resolved by name.
//!
//! Glyphs are stroke-only SVG icons (Lucide style). Parsing keeps the drawable
//! child elements and their geometry attributes; paint attributes are dropped
//! because the renderer recolours every stroke.

use std::collections::{BTreeMap, HashMap};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::Serialize;

/// Elements that carry drawable geometry.
const DRAWABLE_TAGS: &[&str] = &[
    "path", "circle", "ellipse", "rect", "line", "polyline", "polygon",
];

/// Paint attributes replaced at render time.
const PAINT_ATTRIBUTES: &[&str] = &["stroke", "fill", "color", "class", "style"];

/// Root attributes worth keeping for stroke appearance.
const STROKE_STYLE_ATTRIBUTES: &[&str] = &["stroke-width", "stroke-linecap", "stroke-linejoin"];

/// One drawable element of a glyph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GlyphShape {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
}

/// A parsed icon.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IconGlyph {
    pub name: String,
    /// `[min_x, min_y, width, height]` of the source view box.
    pub view_box: [f64; 4],
    pub stroke_style: BTreeMap<String, String>,
    pub shapes: Vec<GlyphShape>,
}

impl IconGlyph {
    pub fn view_width(&self) -> f64 {
        self.view_box[2]
    }

    pub fn view_height(&self) -> f64 {
        self.view_box[3]
    }
}

/// Why an SVG document could not be used as a glyph.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GlyphError {
    #[error("SVG parse error at position {position}: {message}")]
    Xml { position: u64, message: String },
    #[error("no <svg> root element")]
    MissingRoot,
    #[error("view box is missing or degenerate")]
    InvalidViewBox,
    #[error("glyph has no drawable elements")]
    Empty,
}

/// Parse an SVG document into a glyph.
pub fn parse_glyph(name: &str, svg: &str) -> Result<IconGlyph, GlyphError> {
    let mut reader = Reader::from_str(svg);
    reader.config_mut().trim_text(true);

    let mut view_box: Option<[f64; 4]> = None;
    let mut stroke_style = BTreeMap::new();
    let mut shapes = Vec::new();
    let mut saw_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let tag = element_name(e);
                if tag == "svg" && !saw_root {
                    saw_root = true;
                    let attrs = collect_attributes(e);
                    view_box = root_view_box(&attrs);
                    for key in STROKE_STYLE_ATTRIBUTES {
                        if let Some(value) = attrs.get(*key) {
                            stroke_style.insert(key.to_string(), value.clone());
                        }
                    }
                } else if DRAWABLE_TAGS.contains(&tag.as_str()) {
                    let mut attributes = collect_attributes(e);
                    attributes.retain(|key, _| !PAINT_ATTRIBUTES.contains(&key.as_str()));
                    shapes.push(GlyphShape { tag, attributes });
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(GlyphError::Xml {
                    position: reader.buffer_position(),
                    message: e.to_string(),
                })
            }
            _ => {}
        }
    }

    if !saw_root {
        return Err(GlyphError::MissingRoot);
    }
    let view_box = view_box.ok_or(GlyphError::InvalidViewBox)?;
    if shapes.is_empty() {
        return Err(GlyphError::Empty);
    }

    Ok(IconGlyph {
        name: name.to_string(),
        view_box,
        stroke_style,
        shapes,
    })
}

fn element_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn collect_attributes(e: &BytesStart<'_>) -> BTreeMap<String, String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .filter_map(|attr| {
            let key = std::str::from_utf8(attr.key.as_ref()).ok()?;
            let value = std::str::from_utf8(&attr.value).ok()?;
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

/// `viewBox` first, then `width`/`height`.
fn root_view_box(attrs: &BTreeMap<String, String>) -> Option<[f64; 4]> {
    let from_view_box = attrs.get("viewBox").and_then(|raw| {
        let numbers: Vec<f64> = raw
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect::<Result<_, _>>()
            .ok()?;
        <[f64; 4]>::try_from(numbers).ok()
    });

    let view_box = from_view_box.or_else(|| {
        let width = attrs.get("width")?.trim_end_matches("px").parse().ok()?;
        let height = attrs.get("height")?.trim_end_matches("px").parse().ok()?;
        Some([0.0, 0.0, width, height])
    })?;

    (view_box[2] > 0.0 && view_box[3] > 0.0).then_some(view_box)
}

/// Synchronous glyph lookup used by the renderer.
pub trait IconLookup {
    fn glyph(&self, name: &str) -> Option<&IconGlyph>;
}

/// Glyphs resolved ahead of a render.
#[derive(Debug, Clone, Default)]
pub struct IconSet {
    glyphs: HashMap<String, IconGlyph>,
}

impl IconSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, glyph: IconGlyph) {
        self.glyphs.insert(glyph.name.clone(), glyph);
    }
}

impl FromIterator<IconGlyph> for IconSet {
    fn from_iter<I: IntoIterator<Item = IconGlyph>>(iter: I) -> Self {
        let mut set = IconSet::new();
        for glyph in iter {
            set.insert(glyph);
        }
        set
    }
}

impl IconLookup for IconSet {
    fn glyph(&self, name: &str) -> Option<&IconGlyph> {
        self.glyphs.get(name)
    }
}

/// Names that can be requested from the provider: `[a-z0-9-]`, non-empty.
pub fn is_valid_icon_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}
