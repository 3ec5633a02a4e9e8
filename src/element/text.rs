use egui::{Pos2, Rect, pos2, vec2};

use super::Element;
use crate::layer::{TextAlign, TextLayer};
use crate::renderer::{RenderAssets, Surface, default_font};

/// Advance used per character when no font could be loaded.
const FALLBACK_ADVANCE: f32 = 0.55;

/// Wrapped lines of a text layer, positioned in canvas space.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLayout {
    /// Each line with its measured width.
    pub lines: Vec<(String, f32)>,
    pub line_height: f32,
    /// The whole text box including padding. Empty text still occupies one line.
    pub bounds: Rect,
}

impl TextLayout {
    /// Top-left of line `index`, honouring alignment and padding.
    pub fn line_origin(&self, layer: &TextLayer, index: usize) -> Pos2 {
        let inner_width = (layer.box_width - 2.0 * layer.padding).max(0.0);
        let width = self.lines.get(index).map_or(0.0, |(_, w)| *w);
        let dx = match layer.align {
            TextAlign::Left => 0.0,
            TextAlign::Center => (inner_width - width) / 2.0,
        };
        layer.position + vec2(layer.padding + dx, layer.padding + index as f32 * self.line_height)
    }
}

fn measure(font: Option<&ab_glyph::FontArc>, size: f32, text: &str) -> f32 {
    use ab_glyph::{Font, ScaleFont};
    let Some(font) = font else {
        return text.chars().count() as f32 * size * FALLBACK_ADVANCE;
    };
    let scaled = font.as_scaled(size);
    let mut width = 0.0;
    let mut previous = None;
    for ch in text.chars() {
        let id = scaled.glyph_id(ch);
        if let Some(prev) = previous {
            width += scaled.kern(prev, id);
        }
        width += scaled.h_advance(id);
        previous = Some(id);
    }
    width
}

/// Greedy word wrap. Words wider than the box are broken between characters.
fn wrap(text: &str, max_width: f32, measure: impl Fn(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_owned()
            } else {
                format!("{current} {word}")
            };
            if measure(&candidate) <= max_width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if measure(word) <= max_width {
                current = word.to_owned();
                continue;
            }
            for ch in word.chars() {
                current.push(ch);
                if measure(&current) > max_width && current.chars().count() > 1 {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(ch);
                }
            }
        }
        lines.push(current);
    }
    if lines.len() == 1 && lines[0].is_empty() {
        lines.clear();
    }
    lines
}

pub fn layout_text(layer: &TextLayer, font: Option<&ab_glyph::FontArc>) -> TextLayout {
    let size = layer.font_size;
    let inner_width = (layer.box_width - 2.0 * layer.padding).max(1.0);
    let lines: Vec<(String, f32)> = wrap(&layer.content, inner_width, |s| measure(font, size, s))
        .into_iter()
        .map(|line| {
            let width = measure(font, size, &line);
            (line, width)
        })
        .collect();
    let rows = lines.len().max(1) as f32;
    let bounds = Rect::from_min_size(
        layer.position,
        vec2(layer.box_width, rows * size + 2.0 * layer.padding),
    );
    TextLayout {
        lines,
        line_height: size,
        bounds,
    }
}

impl Element for TextLayer {
    fn bounds(&self) -> Rect {
        layout_text(self, default_font()).bounds
    }

    fn hit_test(&self, pos: Pos2) -> bool {
        self.bounds().contains(pos)
    }

    fn draw(&self, surface: &mut Surface, assets: &RenderAssets<'_>) {
        let layout = layout_text(self, assets.font);
        if let Some(badge) = self.badge {
            surface.fill_rect(layout.bounds, badge);
        }
        let Some(font) = assets.font else {
            return;
        };
        for (index, (line, _)) in layout.lines.iter().enumerate() {
            let origin = layout.line_origin(self, index);
            surface.draw_text_line(font, pos2(origin.x, origin.y), line, self.font_size, self.fill);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::{CanvasSize, TextId};

    fn fixed(s: &str) -> f32 {
        s.chars().count() as f32 * 10.0
    }

    #[test]
    fn test_wrap_breaks_at_words() {
        let lines = wrap("aaa bbb ccc", 75.0, fixed);
        assert_eq!(lines, vec!["aaa bbb".to_owned(), "ccc".to_owned()]);
    }

    #[test]
    fn test_wrap_splits_overlong_word() {
        let lines = wrap("abcdefgh", 30.0, fixed);
        assert_eq!(lines, vec!["abc", "def", "gh"]);
    }

    #[test]
    fn test_wrap_keeps_explicit_newlines() {
        let lines = wrap("one\n\ntwo", 100.0, fixed);
        assert_eq!(lines, vec!["one", "", "two"]);
    }

    #[test]
    fn test_empty_text_has_one_line_box() {
        let layer = TextLayer::seeded(TextId::Offer, CanvasSize::default(), "");
        let layout = layout_text(&layer, None);
        assert!(layout.lines.is_empty());
        assert_eq!(layout.bounds.height(), layer.font_size + 2.0 * layer.padding);
        assert_eq!(layout.bounds.width(), 400.0);
    }

    #[test]
    fn test_centered_line_origin() {
        let layer = TextLayer::seeded(TextId::Offer, CanvasSize::default(), "ab");
        let layout = layout_text(&layer, None);
        let width = layout.lines[0].1;
        let origin = layout.line_origin(&layer, 0);
        let expected_x = layer.position.x + layer.padding + (380.0 - width) / 2.0;
        assert!((origin.x - expected_x).abs() < 1e-3);
        assert_eq!(origin.y, layer.position.y + layer.padding);
    }

    #[test]
    fn test_long_tagline_grows_downwards() {
        let canvas = CanvasSize::new(400.0, 400.0);
        let short = TextLayer::seeded(TextId::Tagline, canvas, "Sale");
        let long = TextLayer::seeded(TextId::Tagline, canvas, "Sale ".repeat(40));
        let short_h = layout_text(&short, None).bounds.height();
        let long_h = layout_text(&long, None).bounds.height();
        assert!(long_h > short_h);
    }
}
