use egui::Color32;
use log::debug;

use crate::layer::LayerModel;

/// Brand colours offered before any extraction results are known.
pub const DEFAULT_SWATCHES: [&str; 3] = ["#ff9900", "#111111", "#ffffff"];

/// Parses `#rgb` or `#rrggbb` (the `#` is optional). Alpha is always opaque.
pub fn parse_hex(text: &str) -> Option<Color32> {
    let hex = text.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut rgb = [0u8; 3];
            for (i, c) in hex.chars().enumerate() {
                let v = c.to_digit(16)? as u8;
                rgb[i] = v * 16 + v;
            }
            Some(Color32::from_rgb(rgb[0], rgb[1], rgb[2]))
        }
        6 => Some(Color32::from_rgb(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        _ => None,
    }
}

pub fn to_hex(color: Color32) -> String {
    let [r, g, b, _] = color.to_srgba_unmultiplied();
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Maps a chosen swatch onto the canvas background.
///
/// Only the background changes; layers are untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    swatches: Vec<Color32>,
    chosen: Option<Color32>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::new(DEFAULT_SWATCHES.iter().filter_map(|s| parse_hex(s)).collect())
    }
}

impl Palette {
    pub fn new(swatches: Vec<Color32>) -> Self {
        Self {
            swatches,
            chosen: None,
        }
    }

    pub fn swatches(&self) -> &[Color32] {
        &self.swatches
    }

    /// The last colour applied, whether from a swatch or the manual picker.
    pub fn chosen(&self) -> Option<Color32> {
        self.chosen
    }

    pub fn choose(&mut self, color: Color32, model: &mut LayerModel) {
        self.chosen = Some(color);
        if model.set_background(color) {
            debug!("Background set to {}", to_hex(color));
        }
    }

    pub fn clear_choice(&mut self) {
        self.chosen = None;
    }
}
