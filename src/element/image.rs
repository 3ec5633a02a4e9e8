use egui::{Pos2, Rect};
use log::trace;

use super::Element;
use crate::layer::ImageLayer;
use crate::renderer::{RenderAssets, Surface};

impl Element for ImageLayer {
    fn bounds(&self) -> Rect {
        Rect::from_points(&self.geometry.corners())
    }

    fn hit_test(&self, pos: Pos2) -> bool {
        self.geometry.contains(pos)
    }

    fn draw(&self, surface: &mut Surface, assets: &RenderAssets<'_>) {
        match assets.bitmap {
            Some(bitmap) => surface.draw_bitmap(bitmap, &self.geometry),
            // Still loading or failed to load: the region stays empty.
            None => trace!("Image layer has no bitmap yet, skipping"),
        }
    }
}
