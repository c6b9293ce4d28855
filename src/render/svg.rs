//! SVG serialisation of a [`Scene`] for previews.
//!
//! Text wrapping uses an estimated advance (narrow glyphs about half an em,
//! wide CJK glyphs a full em); real metrics belong to whatever client draws
//! the scene for editing.

use std::fmt::Write;

use super::{Background, Scene, SceneNode, TextBox};
use crate::models::{Color, FontWeight, TextAlign};

const LINE_HEIGHT: f64 = 1.16;
const BASELINE: f64 = 0.9;

/// Render a scene as a standalone SVG document.
pub fn to_svg(scene: &Scene) -> String {
    let mut out = String::new();
    let (w, h) = (num(scene.width), num(scene.height));
    let _ = write!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#
    );

    match &scene.background {
        Background::Image {
            data,
            mime_type,
            width,
            height,
        } => {
            let _ = write!(
                out,
                r#"<image href="data:{};base64,{}" x="0" y="0" width="{}" height="{}" preserveAspectRatio="none"/>"#,
                escape(mime_type),
                escape(data),
                num(*width),
                num(*height)
            );
        }
        Background::Solid { color } => {
            let _ = write!(
                out,
                r#"<rect x="0" y="0" width="{w}" height="{h}"{}/>"#,
                fill(*color, 1.0)
            );
        }
    }

    for node in &scene.nodes {
        write_node(&mut out, node);
    }

    out.push_str("</svg>");
    out
}

fn write_node(out: &mut String, node: &SceneNode) {
    match node {
        SceneNode::Rect {
            bbox,
            fill: color,
            opacity,
            corner_radius,
        } => {
            let _ = write!(
                out,
                r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{r}" ry="{r}"{}/>"#,
                num(bbox.x),
                num(bbox.y),
                num(bbox.width),
                num(bbox.height),
                fill(*color, *opacity),
                r = num(*corner_radius),
            );
        }
        SceneNode::Ellipse {
            cx,
            cy,
            rx,
            ry,
            fill: color,
            opacity,
        } => {
            let _ = write!(
                out,
                r#"<ellipse cx="{}" cy="{}" rx="{}" ry="{}"{}/>"#,
                num(*cx),
                num(*cy),
                num(*rx),
                num(*ry),
                fill(*color, *opacity)
            );
        }
        SceneNode::Glyph {
            translate_x,
            translate_y,
            scale_x,
            scale_y,
            stroke,
            stroke_style,
            shapes,
            ..
        } => {
            let _ = write!(
                out,
                r#"<g transform="translate({} {}) scale({} {})" fill="none" stroke="{}""#,
                num(*translate_x),
                num(*translate_y),
                num(*scale_x),
                num(*scale_y),
                stroke.to_rgb_hex()
            );
            for (key, value) in stroke_style {
                let _ = write!(out, r#" {}="{}""#, escape(key), escape(value));
            }
            out.push('>');
            for shape in shapes {
                let _ = write!(out, "<{}", escape(&shape.tag));
                for (key, value) in &shape.attributes {
                    let _ = write!(out, r#" {}="{}""#, escape(key), escape(value));
                }
                out.push_str("/>");
            }
            out.push_str("</g>");
        }
        SceneNode::TextBox(text) => write_text(out, text),
        SceneNode::Placeholder { bbox, .. } => {
            let _ = write!(
                out,
                r##"<rect x="{}" y="{}" width="{}" height="{}" fill="#e5e7eb" stroke="#9ca3af" stroke-dasharray="6 4"/>"##,
                num(bbox.x),
                num(bbox.y),
                num(bbox.width),
                num(bbox.height)
            );
        }
    }
}

fn write_text(out: &mut String, text: &TextBox) {
    let inner_width = (text.width - 2.0 * text.padding).max(1.0);
    let lines = wrap_lines(&text.text, inner_width, text.font_size);
    let line_height = text.font_size * LINE_HEIGHT;

    if let Some(backdrop) = text.backdrop {
        let height = lines.len() as f64 * line_height + 2.0 * text.padding;
        let _ = write!(
            out,
            r#"<rect x="{}" y="{}" width="{}" height="{}"{}/>"#,
            num(text.x),
            num(text.y),
            num(text.width),
            num(height),
            fill(backdrop, 1.0)
        );
    }

    let left = text.x + text.padding;
    let (anchor, anchor_x) = match text.align {
        TextAlign::Center => ("middle", left + inner_width / 2.0),
        TextAlign::Right => ("end", left + inner_width),
        TextAlign::Left | TextAlign::Justify => ("start", left),
    };
    let weight = match text.font_weight {
        FontWeight::Bold => "bold",
        FontWeight::Normal => "normal",
    };

    let _ = write!(
        out,
        r#"<text font-size="{}" font-weight="{}" text-anchor="{}"{}>"#,
        num(text.font_size),
        weight,
        anchor,
        fill(text.color, 1.0)
    );
    let top = text.y + text.padding + text.font_size * BASELINE;
    for (i, line) in lines.iter().enumerate() {
        let _ = write!(
            out,
            r#"<tspan x="{}" y="{}">{}</tspan>"#,
            num(anchor_x),
            num(top + i as f64 * line_height),
            escape(line)
        );
    }
    out.push_str("</text>");
}

fn fill(color: Color, opacity: f64) -> String {
    let alpha = color.alpha() * opacity.clamp(0.0, 1.0);
    if alpha >= 1.0 {
        format!(r#" fill="{}""#, color.to_rgb_hex())
    } else {
        format!(
            r#" fill="{}" fill-opacity="{}""#,
            color.to_rgb_hex(),
            num(alpha)
        )
    }
}

/// Compact number formatting: at most three decimals, no trailing zeros.
fn num(value: f64) -> String {
    let formatted = format!("{:.3}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "-0" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharClass {
    Space,
    Narrow,
    Wide,
}

fn classify(c: char) -> CharClass {
    if c.is_whitespace() {
        CharClass::Space
    } else if (c as u32) >= 0x1100 {
        CharClass::Wide
    } else {
        CharClass::Narrow
    }
}

fn char_width(c: char, font_size: f64) -> f64 {
    match classify(c) {
        CharClass::Space => 0.3 * font_size,
        CharClass::Narrow => 0.55 * font_size,
        CharClass::Wide => font_size,
    }
}

/// Words, whitespace runs, and single wide characters.
fn tokens(paragraph: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut prev: Option<CharClass> = None;
    for (i, c) in paragraph.char_indices() {
        let class = classify(c);
        if let Some(p) = prev {
            if p != class || class == CharClass::Wide {
                out.push(&paragraph[start..i]);
                start = i;
            }
        }
        prev = Some(class);
    }
    if start < paragraph.len() {
        out.push(&paragraph[start..]);
    }
    out
}

/// Greedy wrap to `max_width`. Explicit newlines always break.
pub(crate) fn wrap_lines(text: &str, max_width: f64, font_size: f64) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut width = 0.0;

        for token in tokens(paragraph) {
            let token_width: f64 = token.chars().map(|c| char_width(c, font_size)).sum();

            if token.chars().all(char::is_whitespace) {
                if !line.is_empty() {
                    line.push_str(token);
                    width += token_width;
                }
                continue;
            }

            if width + token_width > max_width && !line.trim_end().is_empty() {
                lines.push(line.trim_end().to_string());
                line.clear();
                width = 0.0;
            }

            if token_width > max_width {
                for c in token.chars() {
                    let w = char_width(c, font_size);
                    if width + w > max_width && !line.is_empty() {
                        lines.push(std::mem::take(&mut line));
                        width = 0.0;
                    }
                    line.push(c);
                    width += w;
                }
            } else {
                line.push_str(token);
                width += token_width;
            }
        }

        lines.push(line.trim_end().to_string());
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BBox, ViewMode};
    use crate::render::TextRole;

    fn scene_with(nodes: Vec<SceneNode>) -> Scene {
        Scene {
            width: 960.0,
            height: 540.0,
            mode: ViewMode::Vector,
            background: Background::Solid {
                color: Color::WHITE,
            },
            nodes,
            unresolved_icons: Vec::new(),
        }
    }

    #[test]
    fn test_wrap_on_word_boundaries() {
        // 10px font: narrow glyph 5.5, space 3
        let lines = wrap_lines("alpha beta gamma", 60.0, 10.0);
        assert_eq!(lines, vec!["alpha beta", "gamma"]);
    }

    #[test]
    fn test_wrap_wide_characters_anywhere() {
        let lines = wrap_lines("現状の課題", 30.0, 10.0);
        assert_eq!(lines, vec!["現状の", "課題"]);
    }

    #[test]
    fn test_wrap_keeps_explicit_newlines() {
        let lines = wrap_lines("one\n\ntwo", 500.0, 10.0);
        assert_eq!(lines, vec!["one", "", "two"]);
    }

    #[test]
    fn test_wrap_hard_breaks_long_words() {
        let lines = wrap_lines("abcdefghij", 22.0, 10.0);
        assert_eq!(lines, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_svg_preserves_node_order() {
        let svg = to_svg(&scene_with(vec![
            SceneNode::Rect {
                bbox: BBox::new(0.0, 0.0, 10.0, 10.0),
                fill: Color::BLACK,
                opacity: 0.5,
                corner_radius: 0.0,
            },
            SceneNode::TextBox(TextBox {
                role: TextRole::Free,
                x: 0.0,
                y: 0.0,
                width: 200.0,
                text: "Q&A <now>".to_string(),
                font_size: 18.0,
                color: Color::BLACK,
                font_weight: FontWeight::Bold,
                align: TextAlign::Center,
                backdrop: None,
                padding: 0.0,
            }),
            SceneNode::Ellipse {
                cx: 5.0,
                cy: 5.0,
                rx: 5.0,
                ry: 5.0,
                fill: Color::WHITE,
                opacity: 1.0,
            },
        ]));

        let rect = svg.find(r#"<rect x="0" y="0" width="10""#).unwrap();
        let text = svg.find("<text").unwrap();
        let ellipse = svg.find("<ellipse").unwrap();
        assert!(rect < text && text < ellipse);
        assert!(svg.contains("Q&amp;A &lt;now&gt;"));
        assert!(svg.contains(r#"fill-opacity="0.5""#));
        assert!(svg.contains(r#"text-anchor="middle""#));
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn test_image_background_is_stretched() {
        let mut scene = scene_with(Vec::new());
        scene.background = Background::Image {
            data: "eA==".to_string(),
            mime_type: "image/png".to_string(),
            width: 960.0,
            height: 540.0,
        };
        let svg = to_svg(&scene);
        assert!(svg.contains(r#"href="data:image/png;base64,eA==""#));
        assert!(svg.contains(r#"preserveAspectRatio="none""#));
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(num(960.0), "960");
        assert_eq!(num(0.25), "0.25");
        assert_eq!(num(1.0 / 3.0), "0.333");
        assert_eq!(num(-0.0001), "0");
    }
}
