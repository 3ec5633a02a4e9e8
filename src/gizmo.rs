use egui::{Color32, Painter, Pos2, Shape, Stroke};
use log::debug;

use crate::geometry::hit_testing::{HANDLE_SIZE, HandleMetrics, corner_position, handle_positions};
use crate::layer::{ImageGeometry, MIN_IMAGE_SIZE, TextId, rotate};
use crate::widgets::resize_handle::{HANDLE_COLOR, paint_round_handle, paint_square_handle};
use crate::widgets::Corner;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GizmoHandle {
    /// Pointer-down on the layer body.
    Move,
    Scale(Corner),
    Rotate,
}

/// What a gesture is acting on, captured at pointer-down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragTarget {
    Image(ImageGeometry),
    /// Text layers only move; they have no resize or rotate handles.
    Text(TextId, Pos2),
}

/// Geometry produced by a gesture. While the pointer is down this is the
/// transient preview value; on release it is the value to commit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureGeometry {
    Image(ImageGeometry),
    Text(TextId, Pos2),
}

#[derive(Debug, Clone, Copy)]
struct Gesture {
    target: DragTarget,
    handle: GizmoHandle,
    start_pointer: Pos2,
}

/// Converts pointer gestures into geometry updates.
///
/// The gizmo never touches the layer model. It hands out a live value for
/// rendering feedback via [`TransformGizmo::live`], and the final value from
/// [`TransformGizmo::finish`] for the caller to commit.
#[derive(Debug, Clone, Default)]
pub struct TransformGizmo {
    gesture: Option<Gesture>,
    live: Option<GestureGeometry>,
    /// Bumped on every live change so preview caches can tell frames apart.
    live_version: u64,
}

impl TransformGizmo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.gesture.is_some()
    }

    pub fn active_handle(&self) -> Option<GizmoHandle> {
        self.gesture.map(|g| g.handle)
    }

    pub fn live(&self) -> Option<&GestureGeometry> {
        self.live.as_ref()
    }

    pub fn live_version(&self) -> u64 {
        self.live_version
    }

    /// Starts a gesture. Text targets only accept [`GizmoHandle::Move`];
    /// anything else is downgraded to a move.
    pub fn begin(&mut self, target: DragTarget, handle: GizmoHandle, pointer: Pos2) {
        let handle = match target {
            DragTarget::Text(..) => GizmoHandle::Move,
            DragTarget::Image(_) => handle,
        };
        debug!("Gizmo gesture started: {:?} on {:?}", handle, target);
        self.gesture = Some(Gesture {
            target,
            handle,
            start_pointer: pointer,
        });
        self.live = None;
    }

    /// Applies an intermediate pointer position. Returns the live geometry.
    pub fn update(&mut self, pointer: Pos2) -> Option<GestureGeometry> {
        let gesture = self.gesture?;
        let geometry = gesture.evaluate(pointer);
        if self.live != Some(geometry) {
            self.live = Some(geometry);
            self.live_version += 1;
        }
        Some(geometry)
    }

    /// Ends the gesture at the release position, which alone decides the result.
    pub fn finish(&mut self, pointer: Pos2) -> Option<GestureGeometry> {
        let gesture = self.gesture.take()?;
        if self.live.take().is_some() {
            self.live_version += 1;
        }
        let geometry = gesture.evaluate(pointer);
        debug!("Gizmo gesture finished: {:?}", geometry);
        Some(geometry)
    }

    /// Drops the gesture without producing a result.
    pub fn cancel(&mut self) {
        if self.gesture.take().is_some() {
            debug!("Gizmo gesture cancelled");
        }
        if self.live.take().is_some() {
            self.live_version += 1;
        }
    }

    /// Paints the selection outline and, for images, the handles.
    ///
    /// `outline` are the selected layer's corners and `to_screen` maps canvas
    /// to screen space. Handles are only drawn for image geometry.
    pub fn paint(
        &self,
        painter: &Painter,
        outline: [Pos2; 4],
        image: Option<&ImageGeometry>,
        metrics: &HandleMetrics,
        hover: Option<Pos2>,
        to_screen: impl Fn(Pos2) -> Pos2,
    ) {
        let points: Vec<Pos2> = outline.iter().map(|p| to_screen(*p)).collect();
        painter.add(Shape::closed_line(points, Stroke::new(1.0, HANDLE_COLOR)));

        let Some(geometry) = image else {
            return;
        };
        let handles = handle_positions(geometry, metrics);
        let hovered = hover.and_then(|pos| crate::geometry::handle_at(geometry, pos, metrics));

        // Stem from the top edge to the rotate handle.
        let top_mid = geometry.to_canvas(egui::vec2(geometry.width / 2.0, 0.0));
        painter.line_segment(
            [to_screen(top_mid), to_screen(handles[4].1)],
            Stroke::new(1.0, HANDLE_COLOR),
        );

        for (handle, at) in handles {
            let is_hot = hovered == Some(handle) || self.active_handle() == Some(handle);
            match handle {
                GizmoHandle::Rotate => paint_round_handle(painter, to_screen(at), HANDLE_SIZE, is_hot),
                _ => paint_square_handle(painter, to_screen(at), HANDLE_SIZE, is_hot),
            }
        }

        if let Some(GestureGeometry::Image(live)) = self.live {
            if self.active_handle() == Some(GizmoHandle::Rotate) {
                let label = format!("{:.0}°", live.rotation);
                painter.text(
                    to_screen(handles[4].1) + egui::vec2(HANDLE_SIZE, -HANDLE_SIZE),
                    egui::Align2::LEFT_BOTTOM,
                    label,
                    egui::FontId::proportional(12.0),
                    Color32::from_gray(60),
                );
            }
        }
    }
}

impl Gesture {
    fn evaluate(&self, pointer: Pos2) -> GestureGeometry {
        let delta = pointer - self.start_pointer;
        match self.target {
            DragTarget::Text(id, position) => GestureGeometry::Text(id, position + delta),
            DragTarget::Image(initial) => GestureGeometry::Image(match self.handle {
                GizmoHandle::Move => ImageGeometry {
                    x: initial.x + delta.x,
                    y: initial.y + delta.y,
                    ..initial
                },
                GizmoHandle::Scale(corner) => {
                    let anchor = corner_position(&initial, corner.opposite());
                    let factor = scale_factor(anchor, self.start_pointer, pointer);
                    bake_scale(&initial, corner, factor)
                }
                GizmoHandle::Rotate => {
                    let center = initial.center();
                    let start = self.start_pointer - center;
                    let now = pointer - center;
                    if start.length_sq() <= f32::EPSILON || now.length_sq() <= f32::EPSILON {
                        initial
                    } else {
                        let delta = (now.y.atan2(now.x) - start.y.atan2(start.x)).to_degrees();
                        rotate_about_center(&initial, normalize_degrees(delta))
                    }
                }
            }),
        }
    }
}

/// Uniform scale implied by dragging a corner from `start` to `current`
/// while `anchor` stays fixed: the projection onto the start diagonal.
pub fn scale_factor(anchor: Pos2, start: Pos2, current: Pos2) -> f32 {
    let base = start - anchor;
    let len_sq = base.length_sq();
    if len_sq <= f32::EPSILON {
        return 1.0;
    }
    (current - anchor).dot(base) / len_sq
}

/// Bakes a scale factor into width and height, pinning the corner opposite
/// `corner`. Each dimension becomes `max(30, dimension * factor)`, so the
/// layer never collapses or inverts.
pub fn bake_scale(geometry: &ImageGeometry, corner: Corner, factor: f32) -> ImageGeometry {
    let factor = if factor.is_finite() { factor } else { 1.0 };
    let width = (geometry.width * factor).max(MIN_IMAGE_SIZE);
    let height = (geometry.height * factor).max(MIN_IMAGE_SIZE);
    let pinned = corner.opposite();
    let anchor = corner_position(geometry, pinned);
    let offset = rotate(
        pinned.local_offset(egui::vec2(width, height)),
        geometry.rotation.to_radians(),
    );
    let origin = anchor - offset;
    ImageGeometry {
        x: origin.x,
        y: origin.y,
        width,
        height,
        rotation: geometry.rotation,
    }
}

/// Rotates the layer by `delta` degrees about its visual centre.
pub fn rotate_about_center(geometry: &ImageGeometry, delta: f32) -> ImageGeometry {
    let center = geometry.center();
    let rotation = normalize_degrees(geometry.rotation + delta);
    let half = rotate(geometry.size() * 0.5, rotation.to_radians());
    let origin = center - half;
    ImageGeometry {
        x: origin.x,
        y: origin.y,
        rotation,
        ..*geometry
    }
}

/// Wraps an angle into `(-180, 180]`.
pub fn normalize_degrees(degrees: f32) -> f32 {
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped > 180.0 { wrapped - 360.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::pos2;

    fn image() -> ImageGeometry {
        ImageGeometry {
            x: 108.0,
            y: 129.6,
            width: 864.0,
            height: 648.0,
            rotation: 0.0,
        }
    }

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-2
    }

    #[test]
    fn test_tenth_scale_bakes_without_floor() {
        let tenth = bake_scale(&image(), Corner::BottomRight, 0.1);
        assert!(approx(tenth.width, 86.4));
        assert!(approx(tenth.height, 64.8));
        assert!(approx(tenth.x, 108.0));
        assert!(approx(tenth.y, 129.6));
    }

    #[test]
    fn test_tiny_scale_hits_floor() {
        let baked = bake_scale(&image(), Corner::BottomRight, 0.04);
        assert!(approx(baked.width, 34.56));
        assert_eq!(baked.height, 30.0);
        // Top-left stays pinned.
        assert!(approx(baked.x, 108.0));
        assert!(approx(baked.y, 129.6));
    }

    #[test]
    fn test_negative_scale_never_inverts() {
        let baked = bake_scale(&image(), Corner::TopLeft, -3.0);
        assert_eq!(baked.width, MIN_IMAGE_SIZE);
        assert_eq!(baked.height, MIN_IMAGE_SIZE);
    }

    #[test]
    fn test_scale_pins_opposite_corner_when_rotated() {
        let mut g = image();
        g.rotation = 30.0;
        let pinned_before = corner_position(&g, Corner::BottomRight);
        let baked = bake_scale(&g, Corner::TopLeft, 0.5);
        let pinned_after = corner_position(&baked, Corner::BottomRight);
        assert!(pinned_before.distance(pinned_after) < 1e-2);
        assert!(approx(baked.width, 432.0));
    }

    #[test]
    fn test_scale_factor_projects_on_diagonal() {
        let anchor = pos2(0.0, 0.0);
        assert!(approx(scale_factor(anchor, pos2(100.0, 100.0), pos2(50.0, 50.0)), 0.5));
        assert!(approx(scale_factor(anchor, pos2(100.0, 100.0), pos2(200.0, 0.0)), 1.0));
        assert_eq!(scale_factor(anchor, anchor, pos2(10.0, 10.0)), 1.0);
    }

    #[test]
    fn test_rotation_keeps_center() {
        let g = image();
        let rotated = rotate_about_center(&g, 90.0);
        assert!(g.center().distance(rotated.center()) < 1e-2);
        assert!(approx(rotated.rotation, 90.0));
    }

    #[test]
    fn test_normalize_degrees() {
        assert!(approx(normalize_degrees(370.0), 10.0));
        assert!(approx(normalize_degrees(-190.0), 170.0));
        assert!(approx(normalize_degrees(180.0), 180.0));
    }

    #[test]
    fn test_move_commits_release_position_only() {
        let mut gizmo = TransformGizmo::new();
        gizmo.begin(DragTarget::Image(image()), GizmoHandle::Move, pos2(500.0, 500.0));
        gizmo.update(pos2(900.0, 900.0));
        gizmo.update(pos2(510.0, 480.0));
        let done = gizmo.finish(pos2(520.0, 530.0));
        assert_eq!(
            done,
            Some(GestureGeometry::Image(ImageGeometry {
                x: 128.0,
                y: 159.6,
                ..image()
            }))
        );
        assert!(!gizmo.is_active());
        assert!(gizmo.live().is_none());
    }

    #[test]
    fn test_text_targets_only_move() {
        let mut gizmo = TransformGizmo::new();
        gizmo.begin(
            DragTarget::Text(TextId::Tagline, pos2(40.0, 20.0)),
            GizmoHandle::Rotate,
            pos2(50.0, 30.0),
        );
        assert_eq!(gizmo.active_handle(), Some(GizmoHandle::Move));
        assert_eq!(
            gizmo.finish(pos2(60.0, 30.0)),
            Some(GestureGeometry::Text(TextId::Tagline, pos2(50.0, 20.0)))
        );
    }

    #[test]
    fn test_live_version_tracks_changes() {
        let mut gizmo = TransformGizmo::new();
        gizmo.begin(DragTarget::Image(image()), GizmoHandle::Move, pos2(0.0, 0.0));
        let v0 = gizmo.live_version();
        gizmo.update(pos2(1.0, 0.0));
        gizmo.update(pos2(1.0, 0.0));
        assert_eq!(gizmo.live_version(), v0 + 1);
        gizmo.cancel();
        assert_eq!(gizmo.live_version(), v0 + 2);
        assert_eq!(gizmo.finish(pos2(5.0, 5.0)), None);
    }

    #[test]
    fn test_repeated_resizes_stay_above_floor() {
        let mut g = image();
        for factor in [0.5, 0.01, 3.0, -1.0, 0.2, f32::NAN, 0.0] {
            g = bake_scale(&g, Corner::BottomLeft, factor);
            assert!(g.width >= MIN_IMAGE_SIZE && g.height >= MIN_IMAGE_SIZE);
        }
    }
}
