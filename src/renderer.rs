// src/renderer.rs
use std::sync::OnceLock;

use egui::{Color32, Pos2, Rect, pos2};
use image::{Rgba, RgbaImage};
use log::{debug, warn};

use crate::element::Element;
use crate::layer::{ImageGeometry, LayerModel};

/// A raster target addressed in canvas coordinates.
///
/// Every drawing call takes canvas-space geometry and multiplies it by
/// `scale`, so the same model produces the preview (scale 1) and the export
/// (scale 2) through identical code.
pub struct Surface {
    pixels: RgbaImage,
    scale: f32,
}

impl Surface {
    pub fn new(width: f32, height: f32, scale: f32, background: Color32) -> Self {
        let w = (width * scale).round().max(1.0) as u32;
        let h = (height * scale).round().max(1.0) as u32;
        let [r, g, b, _] = background.to_srgba_unmultiplied();
        Self {
            pixels: RgbaImage::from_pixel(w, h, Rgba([r, g, b, 255])),
            scale,
        }
    }

    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }

    /// Source-over blend of an unmultiplied RGBA value at a device pixel.
    pub fn blend_pixel(&mut self, x: u32, y: u32, [r, g, b, a]: [u8; 4]) {
        if a == 0 || x >= self.pixels.width() || y >= self.pixels.height() {
            return;
        }
        let dst = self.pixels.get_pixel(x, y).0;
        let src_a = a as f32 / 255.0;
        let dst_a = dst[3] as f32 / 255.0;
        let out_a = src_a + dst_a * (1.0 - src_a);
        if out_a <= 0.0 {
            return;
        }
        let blend = |src: u8, dst: u8| {
            let src_f = src as f32 / 255.0;
            let dst_f = dst as f32 / 255.0;
            ((src_f * src_a + dst_f * dst_a * (1.0 - src_a)) / out_a * 255.0)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        self.pixels.put_pixel(
            x,
            y,
            Rgba([
                blend(r, dst[0]),
                blend(g, dst[1]),
                blend(b, dst[2]),
                (out_a * 255.0).round() as u8,
            ]),
        );
    }

    /// Fills an axis-aligned canvas-space rectangle.
    pub fn fill_rect(&mut self, rect: Rect, color: Color32) {
        let Some((min_x, min_y, max_x, max_y)) = self.device_span(rect) else {
            return;
        };
        let rgba = color.to_srgba_unmultiplied();
        for y in min_y..max_y {
            for x in min_x..max_x {
                self.blend_pixel(x, y, rgba);
            }
        }
    }

    /// Draws `bitmap` stretched over the layer rectangle described by `geometry`,
    /// rotated about its origin. Samples bilinearly at device pixel centres.
    pub fn draw_bitmap(&mut self, bitmap: &RgbaImage, geometry: &ImageGeometry) {
        if bitmap.width() == 0 || bitmap.height() == 0 {
            return;
        }
        let corners = geometry.corners();
        let bounds = Rect::from_points(&corners);
        let Some((min_x, min_y, max_x, max_y)) = self.device_span(bounds) else {
            return;
        };
        let sx = bitmap.width() as f32 / geometry.width;
        let sy = bitmap.height() as f32 / geometry.height;
        for y in min_y..max_y {
            for x in min_x..max_x {
                let canvas = pos2(
                    (x as f32 + 0.5) / self.scale,
                    (y as f32 + 0.5) / self.scale,
                );
                let local = geometry.to_local(canvas);
                if local.x < 0.0
                    || local.y < 0.0
                    || local.x >= geometry.width
                    || local.y >= geometry.height
                {
                    continue;
                }
                let rgba = sample_bilinear(bitmap, local.x * sx - 0.5, local.y * sy - 0.5);
                self.blend_pixel(x, y, rgba);
            }
        }
    }

    /// Rasterises one line of text with its top-left at `origin` (canvas space).
    pub fn draw_text_line(&mut self, font: &ab_glyph::FontArc, origin: Pos2, text: &str, size: f32, color: Color32) {
        use ab_glyph::{Font, ScaleFont, point};
        if text.is_empty() {
            return;
        }
        let [r, g, b, a] = color.to_srgba_unmultiplied();
        let scaled = font.as_scaled(size * self.scale);
        let mut caret = point(origin.x * self.scale, origin.y * self.scale + scaled.ascent());
        let mut previous = None;
        for ch in text.chars() {
            let id = scaled.glyph_id(ch);
            if let Some(prev) = previous {
                caret.x += scaled.kern(prev, id);
            }
            let mut glyph = scaled.scaled_glyph(ch);
            glyph.position = caret;
            caret.x += scaled.h_advance(id);
            previous = Some(id);
            let Some(outlined) = scaled.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            let (width, height) = (self.pixels.width() as i32, self.pixels.height() as i32);
            outlined.draw(|gx, gy, coverage| {
                let px = gx as i32 + bounds.min.x as i32;
                let py = gy as i32 + bounds.min.y as i32;
                if px >= 0 && py >= 0 && px < width && py < height {
                    let alpha = (a as f32 * coverage).round().clamp(0.0, 255.0) as u8;
                    self.blend_pixel(px as u32, py as u32, [r, g, b, alpha]);
                }
            });
        }
    }

    /// Device pixel range `[min, max)` covered by a canvas rectangle, clipped to the surface.
    fn device_span(&self, rect: Rect) -> Option<(u32, u32, u32, u32)> {
        if !rect.is_finite() || rect.is_negative() {
            return None;
        }
        let w = self.pixels.width() as f32;
        let h = self.pixels.height() as f32;
        let min_x = (rect.min.x * self.scale).round().clamp(0.0, w) as u32;
        let min_y = (rect.min.y * self.scale).round().clamp(0.0, h) as u32;
        let max_x = (rect.max.x * self.scale).round().clamp(0.0, w) as u32;
        let max_y = (rect.max.y * self.scale).round().clamp(0.0, h) as u32;
        (min_x < max_x && min_y < max_y).then_some((min_x, min_y, max_x, max_y))
    }
}

fn sample_bilinear(bitmap: &RgbaImage, u: f32, v: f32) -> [u8; 4] {
    let max_x = bitmap.width() as i64 - 1;
    let max_y = bitmap.height() as i64 - 1;
    let x0 = u.floor();
    let y0 = v.floor();
    let tx = u - x0;
    let ty = v - y0;
    let fetch = |x: i64, y: i64| {
        let p = bitmap.get_pixel(x.clamp(0, max_x) as u32, y.clamp(0, max_y) as u32).0;
        [p[0] as f32, p[1] as f32, p[2] as f32, p[3] as f32]
    };
    let (x0, y0) = (x0 as i64, y0 as i64);
    let p00 = fetch(x0, y0);
    let p10 = fetch(x0 + 1, y0);
    let p01 = fetch(x0, y0 + 1);
    let p11 = fetch(x0 + 1, y0 + 1);
    let mut out = [0u8; 4];
    for i in 0..4 {
        let top = p00[i] + (p10[i] - p00[i]) * tx;
        let bottom = p01[i] + (p11[i] - p01[i]) * tx;
        out[i] = (top + (bottom - top) * ty).round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// Egui's bundled proportional font, shared by layout and rasterisation.
pub fn default_font() -> Option<&'static ab_glyph::FontArc> {
    static FONT: OnceLock<Option<ab_glyph::FontArc>> = OnceLock::new();
    FONT.get_or_init(|| {
        let definitions = egui::FontDefinitions::default();
        let name = definitions
            .families
            .get(&egui::FontFamily::Proportional)?
            .first()?
            .clone();
        let data = definitions.font_data.get(&name)?;
        match ab_glyph::FontVec::try_from_vec_and_index(data.font.to_vec(), data.index) {
            Ok(font) => {
                debug!("Loaded font '{}' for text rasterisation", name);
                Some(ab_glyph::FontArc::from(font))
            }
            Err(err) => {
                warn!("Failed to parse font '{}': {}", name, err);
                None
            }
        }
    })
    .as_ref()
}

/// What the layers need beyond the model itself.
#[derive(Clone, Copy, Default)]
pub struct RenderAssets<'a> {
    /// The resolved product image, if it finished loading.
    pub bitmap: Option<&'a RgbaImage>,
    pub font: Option<&'a ab_glyph::FontArc>,
}

/// Renders a [`LayerModel`] into pixels.
///
/// This is the only path from layer state to pixels: the live preview and
/// both export modes call [`CompositeRenderer::render`].
#[derive(Debug, Default, Clone, Copy)]
pub struct CompositeRenderer;

impl CompositeRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Background fill, then image, tagline, offer.
    pub fn render(&self, model: &LayerModel, bitmap: Option<&RgbaImage>, scale: f32) -> RgbaImage {
        let canvas = model.canvas();
        let scale = if scale.is_finite() && scale > 0.0 { scale } else { 1.0 };
        let mut surface = Surface::new(canvas.width, canvas.height, scale, model.background());
        let assets = RenderAssets {
            bitmap,
            font: default_font(),
        };
        for layer in model.layers() {
            layer.draw(&mut surface, &assets);
        }
        surface.into_image()
    }
}
