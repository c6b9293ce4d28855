//! Scene Graph Renderer.
//!
//! [`render`] turns one slide and a view mode into a [`Scene`]. It is a pure
//! function of its inputs: the same slide, mode and glyph set always yield
//! an identical scene, and the slide itself is only borrowed.
//!
//! Image mode stretches the raster background over the whole canvas and
//! overlays the title and content boxes placed by the slide's layout.
//! Vector mode fills the background colour and emits one node per scene
//! element, in element order.

mod scene;
mod svg;

pub use scene::*;
pub use svg::to_svg;

use std::collections::BTreeSet;

use crate::icons::{GlyphShape, IconGlyph, IconLookup};
use crate::models::{
    Color, FontWeight, IconElement, SceneElement, ShapeElement, ShapeType, SlideRecord,
    TextAlign, TextPlacement, TextElement, VectorScene, ViewMode, CANVAS_HEIGHT, CANVAS_WIDTH,
};

pub const TITLE_FONT_SIZE: f64 = 42.0;
pub const CONTENT_FONT_SIZE: f64 = 24.0;
pub const OVERLAY_PADDING: f64 = 10.0;
pub const ROUND_RECT_RADIUS: f64 = 10.0;
pub const IMAGE_MIME_TYPE: &str = "image/png";

/// Canvas colour when there is nothing else to show.
pub const CANVAS_BACKDROP: Color = Color::rgb(0xf3, 0xf4, 0xf6);
/// White at 30% behind overlay text.
pub const OVERLAY_BACKDROP: Color = Color::rgba(255, 255, 255, 77);

/// Build the scene for `slide` in `mode`.
///
/// Vector mode silently degrades to image mode when the slide has no
/// reconstruction. Icons missing from `icons` are skipped.
pub fn render(slide: &SlideRecord, mode: ViewMode, icons: &dyn IconLookup) -> Scene {
    match (slide.effective_mode(mode), &slide.remake_data) {
        (ViewMode::Vector, Some(scene)) => render_vector(scene, icons),
        _ => render_image(slide),
    }
}

/// Distinct icon names referenced by a scene, sorted.
pub fn icon_names(scene: &VectorScene) -> Vec<String> {
    scene
        .elements
        .iter()
        .filter_map(|element| match element {
            SceneElement::Icon(icon) => Some(icon.icon_name.clone()),
            _ => None,
        })
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn render_image(slide: &SlideRecord) -> Scene {
    let background = match &slide.background_image {
        Some(data) => Background::Image {
            data: data.clone(),
            mime_type: IMAGE_MIME_TYPE.to_string(),
            width: CANVAS_WIDTH,
            height: CANVAS_HEIGHT,
        },
        None => Background::Solid {
            color: CANVAS_BACKDROP,
        },
    };

    let mut nodes = Vec::new();
    if let Some(layout) = &slide.layout {
        if let Some(placement) = &layout.title {
            nodes.push(overlay_text(TextRole::Title, placement, &slide.title));
        }
        if let Some(placement) = &layout.content {
            nodes.push(overlay_text(TextRole::Content, placement, &slide.content));
        }
    }

    Scene {
        width: CANVAS_WIDTH,
        height: CANVAS_HEIGHT,
        mode: ViewMode::Image,
        background,
        nodes,
        unresolved_icons: Vec::new(),
    }
}

fn overlay_text(role: TextRole, placement: &TextPlacement, text: &str) -> SceneNode {
    let font_size = match role {
        TextRole::Title => TITLE_FONT_SIZE,
        _ => CONTENT_FONT_SIZE,
    };
    SceneNode::TextBox(TextBox {
        role,
        x: placement.left,
        y: placement.top,
        width: placement.width,
        text: text.to_string(),
        font_size,
        color: placement.color.unwrap_or(Color::BLACK),
        font_weight: FontWeight::Normal,
        align: TextAlign::Left,
        backdrop: Some(OVERLAY_BACKDROP),
        padding: OVERLAY_PADDING,
    })
}

fn render_vector(scene: &VectorScene, icons: &dyn IconLookup) -> Scene {
    let mut nodes = Vec::with_capacity(scene.elements.len());
    let mut unresolved_icons = Vec::new();

    for element in &scene.elements {
        let node = match element {
            SceneElement::Shape(shape) => Some(shape_node(shape)),
            SceneElement::Icon(icon) => {
                let node = icons.glyph(&icon.icon_name).map(|g| glyph_node(icon, g));
                if node.is_none() {
                    unresolved_icons.push(icon.icon_name.clone());
                }
                node
            }
            SceneElement::Text(text) => Some(free_text(text)),
            SceneElement::DiagramImage(diagram) => Some(SceneNode::Placeholder {
                bbox: diagram.bbox,
                prompt: diagram.prompt.clone(),
            }),
        };
        nodes.extend(node);
    }

    Scene {
        width: CANVAS_WIDTH,
        height: CANVAS_HEIGHT,
        mode: ViewMode::Vector,
        background: Background::Solid {
            color: scene.background_color,
        },
        nodes,
        unresolved_icons,
    }
}

fn shape_node(shape: &ShapeElement) -> SceneNode {
    let b = shape.bbox;
    match shape.shape_type {
        ShapeType::Ellipse => SceneNode::Ellipse {
            cx: b.x + b.width / 2.0,
            cy: b.y + b.height / 2.0,
            rx: b.width / 2.0,
            ry: b.height / 2.0,
            fill: shape.color,
            opacity: shape.opacity,
        },
        ShapeType::Rectangle | ShapeType::RoundRectangle => SceneNode::Rect {
            bbox: b,
            fill: shape.color,
            opacity: shape.opacity,
            corner_radius: if shape.shape_type == ShapeType::RoundRectangle {
                ROUND_RECT_RADIUS
            } else {
                0.0
            },
        },
    }
}

fn glyph_node(icon: &IconElement, glyph: &IconGlyph) -> SceneNode {
    let b = icon.bbox;
    let scale_x = b.width / glyph.view_width();
    let scale_y = b.height / glyph.view_height();
    let stroke = icon.color.to_hex();

    let shapes = glyph
        .shapes
        .iter()
        .map(|shape| {
            let mut attributes = shape.attributes.clone();
            attributes.insert("stroke".to_string(), stroke.clone());
            attributes.insert("fill".to_string(), "none".to_string());
            GlyphShape {
                tag: shape.tag.clone(),
                attributes,
            }
        })
        .collect();

    SceneNode::Glyph {
        icon_name: icon.icon_name.clone(),
        translate_x: b.x - glyph.view_box[0] * scale_x,
        translate_y: b.y - glyph.view_box[1] * scale_y,
        scale_x,
        scale_y,
        stroke: icon.color,
        stroke_style: glyph.stroke_style.clone(),
        shapes,
    }
}

fn free_text(text: &TextElement) -> SceneNode {
    SceneNode::TextBox(TextBox {
        role: TextRole::Free,
        x: text.bbox.x,
        y: text.bbox.y,
        width: text.bbox.width,
        text: text.text.clone(),
        font_size: text.font_size,
        color: text.color,
        font_weight: text.font_weight,
        align: text.align,
        backdrop: None,
        padding: 0.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icons::{parse_glyph, tests::CLOUD_SVG, IconSet};
    use crate::models::{BBox, TextLayout};
    use serde_json::json;

    fn cloud_icons() -> IconSet {
        [parse_glyph("cloud", CLOUD_SVG).unwrap()].into_iter().collect()
    }

    fn remade_slide() -> SlideRecord {
        let scene: VectorScene = serde_json::from_value(json!({
            "background_color": "#101820",
            "elements": [
                { "type": "shape", "shape_type": "RECTANGLE", "color": "#82BE28", "bbox": [0, 0, 960, 80] },
                { "type": "text", "text": "Quarterly plan", "fontSize": 40, "color": "#FFFFFF", "bbox": [40, 10, 600, 60] },
                { "type": "icon", "icon_name": "cloud", "color": "#F5E100", "bbox": [800, 16, 96, 48] }
            ]
        }))
        .unwrap();
        SlideRecord::text_only("Quarterly plan", "Goals", "")
            .with_background(Some("aW1hZ2U=".to_string()))
            .with_layout(Some(TextLayout {
                title: Some(TextPlacement {
                    left: 50.0,
                    top: 40.0,
                    width: 500.0,
                    color: None,
                }),
                content: Some(TextPlacement {
                    left: 50.0,
                    top: 200.0,
                    width: 600.0,
                    color: Some(Color::rgb(0x22, 0x22, 0x22)),
                }),
            }))
            .with_remake(scene)
    }

    #[test]
    fn test_image_mode_background_and_overlays() {
        let slide = remade_slide();
        let scene = render(&slide, ViewMode::Image, &IconSet::new());

        assert_eq!(scene.mode, ViewMode::Image);
        assert_eq!(
            scene.background,
            Background::Image {
                data: "aW1hZ2U=".to_string(),
                mime_type: "image/png".to_string(),
                width: 960.0,
                height: 540.0,
            }
        );
        assert_eq!(scene.nodes.len(), 2);
        match (&scene.nodes[0], &scene.nodes[1]) {
            (SceneNode::TextBox(title), SceneNode::TextBox(content)) => {
                assert_eq!(title.role, TextRole::Title);
                assert_eq!(title.text, "Quarterly plan");
                assert_eq!(title.font_size, TITLE_FONT_SIZE);
                assert_eq!(title.color, Color::BLACK);
                assert_eq!(content.role, TextRole::Content);
                assert_eq!(content.font_size, CONTENT_FONT_SIZE);
                assert_eq!(content.color, Color::rgb(0x22, 0x22, 0x22));
                assert!(title.font_size > content.font_size);
            }
            other => panic!("expected two text boxes, got {:?}", other),
        }
    }

    #[test]
    fn test_image_mode_without_layout_draws_background_only() {
        let slide = SlideRecord::text_only("t", "c", "").with_background(Some("eA==".into()));
        let scene = render(&slide, ViewMode::Image, &IconSet::new());
        assert!(scene.nodes.is_empty());
        assert!(matches!(scene.background, Background::Image { .. }));
    }

    #[test]
    fn test_missing_image_uses_backdrop() {
        let slide = SlideRecord::text_only("t", "c", "");
        let scene = render(&slide, ViewMode::Image, &IconSet::new());
        assert_eq!(
            scene.background,
            Background::Solid {
                color: CANVAS_BACKDROP
            }
        );
    }

    #[test]
    fn test_render_is_deterministic() {
        let slide = remade_slide();
        let icons = cloud_icons();
        assert_eq!(
            render(&slide, ViewMode::Image, &icons),
            render(&slide, ViewMode::Image, &icons)
        );
        assert_eq!(
            render(&slide, ViewMode::Vector, &icons),
            render(&slide, ViewMode::Vector, &icons)
        );
    }

    #[test]
    fn test_mode_round_trip_leaves_slide_untouched() {
        let slide = remade_slide();
        let before = slide.clone();
        let icons = cloud_icons();

        let first = render(&slide, ViewMode::Image, &icons);
        let _vector = render(&slide, ViewMode::Vector, &icons);
        let again = render(&slide, ViewMode::Image, &icons);

        assert_eq!(first, again);
        assert_eq!(slide, before);
    }

    #[test]
    fn test_vector_mode_preserves_element_order() {
        let scene = render(&remade_slide(), ViewMode::Vector, &cloud_icons());

        assert_eq!(scene.mode, ViewMode::Vector);
        assert_eq!(
            scene.background,
            Background::Solid {
                color: Color::rgb(0x10, 0x18, 0x20)
            }
        );
        assert_eq!(scene.nodes.len(), 3);
        assert!(matches!(scene.nodes[0], SceneNode::Rect { .. }));
        assert!(matches!(scene.nodes[1], SceneNode::TextBox(_)));
        assert!(matches!(scene.nodes[2], SceneNode::Glyph { .. }));
    }

    #[test]
    fn test_vector_without_remake_falls_back_to_image() {
        let slide = SlideRecord::text_only("t", "c", "").with_background(Some("eA==".into()));
        let scene = render(&slide, ViewMode::Vector, &IconSet::new());
        assert_eq!(scene.mode, ViewMode::Image);
    }

    #[test]
    fn test_glyph_fills_bbox_and_recolours_strokes() {
        let scene = render(&remade_slide(), ViewMode::Vector, &cloud_icons());
        match &scene.nodes[2] {
            SceneNode::Glyph {
                translate_x,
                translate_y,
                scale_x,
                scale_y,
                stroke,
                shapes,
                ..
            } => {
                assert_eq!((*translate_x, *translate_y), (800.0, 16.0));
                assert_eq!((*scale_x, *scale_y), (4.0, 2.0));
                assert_eq!(*stroke, Color::rgb(0xf5, 0xe1, 0x00));
                assert!(!shapes.is_empty());
                for shape in shapes {
                    assert_eq!(shape.attributes["stroke"], "#f5e100");
                    assert_eq!(shape.attributes["fill"], "none");
                }
            }
            other => panic!("expected glyph, got {:?}", other),
        }
    }

    #[test]
    fn test_unresolved_icon_is_skipped() {
        let scene = render(&remade_slide(), ViewMode::Vector, &IconSet::new());
        assert_eq!(scene.nodes.len(), 2);
        assert!(matches!(scene.nodes[0], SceneNode::Rect { .. }));
        assert!(matches!(scene.nodes[1], SceneNode::TextBox(_)));
        assert_eq!(scene.unresolved_icons, vec!["cloud".to_string()]);
    }

    #[test]
    fn test_shapes_inscribed_in_bbox() {
        let scene: VectorScene = serde_json::from_value(json!({
            "elements": [
                { "type": "shape", "shape_type": "ELLIPSE", "color": "#FF0000", "opacity": 0.4, "bbox": [100, 50, 200, 100] },
                { "type": "shape", "shape_type": "ROUND_RECTANGLE", "bbox": [0, 0, 10, 10] },
                { "type": "diagram_image", "prompt": "city", "bbox": [1, 2, 3, 4] }
            ]
        }))
        .unwrap();
        let slide = SlideRecord::text_only("t", "c", "").with_remake(scene);
        let rendered = render(&slide, ViewMode::Vector, &IconSet::new());

        assert_eq!(
            rendered.nodes[0],
            SceneNode::Ellipse {
                cx: 200.0,
                cy: 100.0,
                rx: 100.0,
                ry: 50.0,
                fill: Color::rgb(255, 0, 0),
                opacity: 0.4,
            }
        );
        match &rendered.nodes[1] {
            SceneNode::Rect { corner_radius, .. } => assert_eq!(*corner_radius, ROUND_RECT_RADIUS),
            other => panic!("expected rect, got {:?}", other),
        }
        assert_eq!(
            rendered.nodes[2],
            SceneNode::Placeholder {
                bbox: BBox::new(1.0, 2.0, 3.0, 4.0),
                prompt: "city".to_string()
            }
        );
    }

    #[test]
    fn test_icon_names_are_distinct() {
        let scene: VectorScene = serde_json::from_value(json!({
            "elements": [
                { "type": "icon", "icon_name": "user" },
                { "type": "icon", "icon_name": "cloud" },
                { "type": "icon", "icon_name": "user" }
            ]
        }))
        .unwrap();
        assert_eq!(icon_names(&scene), vec!["cloud".to_string(), "user".to_string()]);
    }
}
