use egui::{Color32, Pos2, Vec2, pos2, vec2};
use std::fmt;
use std::ops::RangeInclusive;

/// Image layers never shrink below this many canvas units on either axis.
pub const MIN_IMAGE_SIZE: f32 = 30.0;

pub const TAGLINE_FONT_RANGE: RangeInclusive<f32> = 16.0..=120.0;
pub const OFFER_FONT_RANGE: RangeInclusive<f32> = 12.0..=80.0;

pub const DEFAULT_BACKGROUND: Color32 = Color32::WHITE;
const DEFAULT_TAGLINE_FILL: Color32 = Color32::BLACK;
const DEFAULT_OFFER_FILL: Color32 = Color32::WHITE;
const DEFAULT_OFFER_BADGE: Color32 = Color32::from_rgb(0xff, 0x3b, 0x30);

/// Largest logical canvas edge. Exports render at twice this.
pub const MAX_CANVAS_SIZE: f32 = 8192.0;

/// Identity of one of the three fixed layers.
///
/// The set is closed: there is no way to name a fourth layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerId {
    Image,
    Tagline,
    Offer,
}

impl LayerId {
    /// Back to front.
    pub const Z_ORDER: [LayerId; 3] = [LayerId::Image, LayerId::Tagline, LayerId::Offer];

    pub fn as_str(&self) -> &'static str {
        match self {
            LayerId::Image => "img",
            LayerId::Tagline => "tag",
            LayerId::Offer => "offer",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "img" => Some(LayerId::Image),
            "tag" => Some(LayerId::Tagline),
            "offer" => Some(LayerId::Offer),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LayerId::Image => "Image",
            LayerId::Tagline => "Tagline",
            LayerId::Offer => "Offer",
        }
    }

    pub fn text_id(&self) -> Option<TextId> {
        match self {
            LayerId::Image => None,
            LayerId::Tagline => Some(TextId::Tagline),
            LayerId::Offer => Some(TextId::Offer),
        }
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The two text layers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextId {
    Tagline,
    Offer,
}

impl TextId {
    pub fn font_size_range(&self) -> RangeInclusive<f32> {
        match self {
            TextId::Tagline => TAGLINE_FONT_RANGE,
            TextId::Offer => OFFER_FONT_RANGE,
        }
    }

    pub fn default_font_size(&self) -> f32 {
        match self {
            TextId::Tagline => 48.0,
            TextId::Offer => 36.0,
        }
    }
}

impl From<TextId> for LayerId {
    fn from(id: TextId) -> Self {
        match id {
            TextId::Tagline => LayerId::Tagline,
            TextId::Offer => LayerId::Offer,
        }
    }
}

/// Logical canvas size, fixed for the lifetime of a session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

impl Default for CanvasSize {
    fn default() -> Self {
        Self {
            width: 1080.0,
            height: 1080.0,
        }
    }
}

impl CanvasSize {
    /// Degenerate or non-finite dimensions are corrected to one unit;
    /// oversized ones are capped at [`MAX_CANVAS_SIZE`].
    pub fn new(width: f32, height: f32) -> Self {
        let fix = |v: f32| if v.is_finite() && v >= 1.0 { v.min(MAX_CANVAS_SIZE) } else { 1.0 };
        Self {
            width: fix(width),
            height: fix(height),
        }
    }

    pub fn to_vec2(&self) -> Vec2 {
        vec2(self.width, self.height)
    }
}

/// Placement of the image layer in canvas space.
///
/// `(x, y)` is the layer origin (its unrotated top-left corner); `rotation`
/// is in degrees, clockwise, about that origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageGeometry {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub rotation: f32,
}

impl ImageGeometry {
    /// Default placement: 10%/12% offset, 80%/60% of the canvas.
    pub fn seeded(canvas: CanvasSize) -> Self {
        Self {
            x: canvas.width * 0.1,
            y: canvas.height * 0.12,
            width: canvas.width * 0.8,
            height: canvas.height * 0.6,
            rotation: 0.0,
        }
    }

    /// Applies the size floor and replaces non-finite fields with `fallback`'s.
    pub fn clamped(self, fallback: &ImageGeometry) -> Self {
        let pick = |v: f32, old: f32| if v.is_finite() { v } else { old };
        Self {
            x: pick(self.x, fallback.x),
            y: pick(self.y, fallback.y),
            width: pick(self.width, fallback.width).max(MIN_IMAGE_SIZE),
            height: pick(self.height, fallback.height).max(MIN_IMAGE_SIZE),
            rotation: pick(self.rotation, fallback.rotation),
        }
    }

    pub fn origin(&self) -> Pos2 {
        pos2(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        vec2(self.width, self.height)
    }

    /// Maps a point in the layer's local frame to canvas space.
    pub fn to_canvas(&self, local: Vec2) -> Pos2 {
        self.origin() + rotate(local, self.rotation.to_radians())
    }

    /// Maps a canvas point into the layer's local frame.
    pub fn to_local(&self, point: Pos2) -> Vec2 {
        rotate(point - self.origin(), -self.rotation.to_radians())
    }

    pub fn center(&self) -> Pos2 {
        self.to_canvas(self.size() * 0.5)
    }

    /// Corners in canvas space: top-left, top-right, bottom-right, bottom-left.
    pub fn corners(&self) -> [Pos2; 4] {
        [
            self.to_canvas(Vec2::ZERO),
            self.to_canvas(vec2(self.width, 0.0)),
            self.to_canvas(self.size()),
            self.to_canvas(vec2(0.0, self.height)),
        ]
    }

    pub fn contains(&self, point: Pos2) -> bool {
        let local = self.to_local(point);
        local.x >= 0.0 && local.y >= 0.0 && local.x <= self.width && local.y <= self.height
    }
}

pub(crate) fn rotate(v: Vec2, radians: f32) -> Vec2 {
    let (sin, cos) = radians.sin_cos();
    vec2(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImageLayer {
    pub geometry: ImageGeometry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextLayer {
    pub content: String,
    pub font_size: f32,
    pub fill: Color32,
    /// Filled rectangle drawn behind the text box.
    pub badge: Option<Color32>,
    /// Top-left of the text box.
    pub position: Pos2,
    pub box_width: f32,
    pub align: TextAlign,
    pub padding: f32,
}

impl TextLayer {
    pub fn seeded(id: TextId, canvas: CanvasSize, content: impl Into<String>) -> Self {
        match id {
            TextId::Tagline => Self {
                content: content.into(),
                font_size: id.default_font_size(),
                fill: DEFAULT_TAGLINE_FILL,
                badge: None,
                position: pos2(40.0, 20.0),
                box_width: (canvas.width - 80.0).max(1.0),
                align: TextAlign::Left,
                padding: 0.0,
            },
            TextId::Offer => Self {
                content: content.into(),
                font_size: id.default_font_size(),
                fill: DEFAULT_OFFER_FILL,
                badge: Some(DEFAULT_OFFER_BADGE),
                position: pos2(canvas.width / 2.0 - 200.0, canvas.height - 140.0),
                box_width: 400.0,
                align: TextAlign::Center,
                padding: 10.0,
            },
        }
    }

    /// Clamps the font size into the variant's range and keeps geometry finite.
    pub fn clamped(mut self, id: TextId, fallback: &TextLayer) -> Self {
        let range = id.font_size_range();
        self.font_size = if self.font_size.is_finite() {
            self.font_size.clamp(*range.start(), *range.end())
        } else {
            fallback.font_size
        };
        if !(self.position.x.is_finite() && self.position.y.is_finite()) {
            self.position = fallback.position;
        }
        if !self.box_width.is_finite() || self.box_width < 1.0 {
            self.box_width = fallback.box_width;
        }
        if !self.padding.is_finite() || self.padding < 0.0 {
            self.padding = fallback.padding;
        }
        self
    }
}

/// A borrowed view of one layer, used to walk the fixed z-order.
#[derive(Debug, Clone, Copy)]
pub enum Layer<'a> {
    Image(&'a ImageLayer),
    Text(TextId, &'a TextLayer),
}

#[derive(Debug, Clone, PartialEq)]
struct Seed {
    tagline: String,
    offer: String,
}

/// Authoritative state of the three layers and the canvas background.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerModel {
    canvas: CanvasSize,
    seed: Seed,
    image: ImageLayer,
    tagline: TextLayer,
    offer: TextLayer,
    background: Color32,
    revision: u64,
}

impl LayerModel {
    pub fn seed(canvas: CanvasSize, tagline: impl Into<String>, offer: impl Into<String>) -> Self {
        let seed = Seed {
            tagline: tagline.into(),
            offer: offer.into(),
        };
        Self {
            canvas,
            image: ImageLayer {
                geometry: ImageGeometry::seeded(canvas),
            },
            tagline: TextLayer::seeded(TextId::Tagline, canvas, seed.tagline.clone()),
            offer: TextLayer::seeded(TextId::Offer, canvas, seed.offer.clone()),
            background: DEFAULT_BACKGROUND,
            seed,
            revision: 0,
        }
    }

    /// Restores the seeded defaults. The revision keeps counting so cached
    /// renders of the old state are invalidated.
    pub fn reset(&mut self) {
        let revision = self.revision + 1;
        *self = Self::seed(self.canvas, self.seed.tagline.clone(), self.seed.offer.clone());
        self.revision = revision;
    }

    /// Compares layer state only, ignoring the revision counter.
    pub fn same_content(&self, other: &LayerModel) -> bool {
        self.canvas == other.canvas
            && self.image == other.image
            && self.tagline == other.tagline
            && self.offer == other.offer
            && self.background == other.background
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn image(&self) -> &ImageLayer {
        &self.image
    }

    pub fn tagline(&self) -> &TextLayer {
        &self.tagline
    }

    pub fn offer(&self) -> &TextLayer {
        &self.offer
    }

    pub fn text(&self, id: TextId) -> &TextLayer {
        match id {
            TextId::Tagline => &self.tagline,
            TextId::Offer => &self.offer,
        }
    }

    pub fn background(&self) -> Color32 {
        self.background
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn layer(&self, id: LayerId) -> Layer<'_> {
        match id {
            LayerId::Image => Layer::Image(&self.image),
            LayerId::Tagline => Layer::Text(TextId::Tagline, &self.tagline),
            LayerId::Offer => Layer::Text(TextId::Offer, &self.offer),
        }
    }

    /// All layers, back to front.
    pub fn layers(&self) -> [Layer<'_>; 3] {
        LayerId::Z_ORDER.map(|id| self.layer(id))
    }

    /// Replaces the image geometry in one step, applying the size floor.
    pub fn update_image(&mut self, geometry: ImageGeometry) {
        let clamped = geometry.clamped(&self.image.geometry);
        if clamped != self.image.geometry {
            self.image.geometry = clamped;
            self.revision += 1;
        }
    }

    /// Replaces a text layer in one step, clamping its style.
    pub fn update_text(&mut self, id: TextId, layer: TextLayer) {
        let slot = match id {
            TextId::Tagline => &mut self.tagline,
            TextId::Offer => &mut self.offer,
        };
        let clamped = layer.clamped(id, slot);
        if clamped != *slot {
            *slot = clamped;
            self.revision += 1;
        }
    }

    /// Returns whether the colour actually changed.
    pub fn set_background(&mut self, color: Color32) -> bool {
        if self.background == color {
            return false;
        }
        self.background = color;
        self.revision += 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_seeded_geometry_for_square_canvas() {
        let model = LayerModel::seed(CanvasSize::new(1080.0, 1080.0), "Sale", "20% Off");
        let g = model.image().geometry;
        assert!(approx(g.x, 108.0));
        assert!(approx(g.y, 129.6));
        assert!(approx(g.width, 864.0));
        assert!(approx(g.height, 648.0));
        assert_eq!(g.rotation, 0.0);
        assert_eq!(model.tagline().content, "Sale");
        assert_eq!(model.offer().content, "20% Off");
    }

    #[test]
    fn test_update_image_applies_floor() {
        let mut model = LayerModel::seed(CanvasSize::default(), "a", "b");
        let mut g = model.image().geometry;
        g.width = 4.0;
        g.height = -20.0;
        model.update_image(g);
        assert_eq!(model.image().geometry.width, MIN_IMAGE_SIZE);
        assert_eq!(model.image().geometry.height, MIN_IMAGE_SIZE);
    }

    #[test]
    fn test_non_finite_geometry_keeps_previous_value() {
        let mut model = LayerModel::seed(CanvasSize::default(), "a", "b");
        let before = model.image().geometry;
        let mut g = before;
        g.x = f32::NAN;
        g.rotation = f32::INFINITY;
        model.update_image(g);
        assert_eq!(model.image().geometry, before);
    }

    #[test]
    fn test_font_size_clamped_per_variant() {
        let mut model = LayerModel::seed(CanvasSize::default(), "a", "b");

        let mut tag = model.tagline().clone();
        tag.font_size = 500.0;
        model.update_text(TextId::Tagline, tag);
        assert_eq!(model.tagline().font_size, 120.0);

        let mut offer = model.offer().clone();
        offer.font_size = 1.0;
        model.update_text(TextId::Offer, offer);
        assert_eq!(model.offer().font_size, 12.0);
    }

    #[test]
    fn test_revision_only_moves_on_change() {
        let mut model = LayerModel::seed(CanvasSize::default(), "a", "b");
        let r0 = model.revision();
        assert!(!model.set_background(DEFAULT_BACKGROUND));
        assert_eq!(model.revision(), r0);
        assert!(model.set_background(Color32::RED));
        assert_eq!(model.revision(), r0 + 1);
    }

    #[test]
    fn test_reset_restores_seed() {
        let canvas = CanvasSize::new(800.0, 600.0);
        let pristine = LayerModel::seed(canvas, "Hello", "Deal");
        let mut model = pristine.clone();

        let mut g = model.image().geometry;
        g.x += 50.0;
        g.rotation = 33.0;
        model.update_image(g);
        let mut tag = model.tagline().clone();
        tag.content = "changed".into();
        model.update_text(TextId::Tagline, tag);
        model.set_background(Color32::BLACK);

        model.reset();
        assert!(model.same_content(&pristine));
        assert!(model.revision() > pristine.revision());
    }

    #[test]
    fn test_layer_names_round_trip() {
        for id in LayerId::Z_ORDER {
            assert_eq!(LayerId::from_name(id.as_str()), Some(id));
        }
        assert_eq!(LayerId::from_name("none"), None);
        assert_eq!(LayerId::from_name("background"), None);
    }

    #[test]
    fn test_rotated_contains() {
        let g = ImageGeometry {
            x: 100.0,
            y: 100.0,
            width: 100.0,
            height: 20.0,
            rotation: 90.0,
        };
        // Rotating clockwise by 90 degrees swings the box below the origin and to its left.
        assert!(g.contains(pos2(90.0, 150.0)));
        assert!(!g.contains(pos2(150.0, 110.0)));
    }
}
