use egui::{Pos2, Rect};

pub(crate) mod image;
pub(crate) mod text;

pub use text::{TextLayout, layout_text};

use crate::layer::{Layer, LayerId};
use crate::renderer::{RenderAssets, Surface};

/// Capabilities shared by every layer variant: where it is, whether a
/// pointer hits it, and how it paints itself onto a [`Surface`].
pub trait Element {
    /// Axis-aligned canvas-space bounds.
    fn bounds(&self) -> Rect;

    /// Test if the element contains the given canvas position
    fn hit_test(&self, pos: Pos2) -> bool;

    /// Paint the element. Missing assets degrade to drawing nothing.
    fn draw(&self, surface: &mut Surface, assets: &RenderAssets<'_>);
}

impl Layer<'_> {
    pub fn id(&self) -> LayerId {
        match self {
            Layer::Image(_) => LayerId::Image,
            Layer::Text(id, _) => LayerId::from(*id),
        }
    }
}

impl Element for Layer<'_> {
    fn bounds(&self) -> Rect {
        match self {
            Layer::Image(i) => i.bounds(),
            Layer::Text(_, t) => t.bounds(),
        }
    }

    fn hit_test(&self, pos: Pos2) -> bool {
        match self {
            Layer::Image(i) => i.hit_test(pos),
            Layer::Text(_, t) => t.hit_test(pos),
        }
    }

    fn draw(&self, surface: &mut Surface, assets: &RenderAssets<'_>) {
        match self {
            Layer::Image(i) => i.draw(surface, assets),
            Layer::Text(_, t) => t.draw(surface, assets),
        }
    }
}
