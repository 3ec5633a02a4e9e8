use egui::{Pos2, vec2};

use crate::gizmo::GizmoHandle;
use crate::layer::ImageGeometry;
use crate::widgets::Corner;

/// Width of a gizmo handle in screen pixels.
pub const HANDLE_SIZE: f32 = 10.0;
/// Distance of the rotate handle above the top edge, in screen pixels.
pub const ROTATE_HANDLE_OFFSET: f32 = 40.0;

/// Handle dimensions converted into canvas units for the current zoom.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleMetrics {
    /// Pointer distance that still counts as grabbing a handle.
    pub grab_radius: f32,
    pub rotate_offset: f32,
}

impl Default for HandleMetrics {
    fn default() -> Self {
        Self::for_view_scale(1.0)
    }
}

impl HandleMetrics {
    /// `view_scale` is screen pixels per canvas unit.
    pub fn for_view_scale(view_scale: f32) -> Self {
        let scale = if view_scale.is_finite() && view_scale > 0.0 { view_scale } else { 1.0 };
        Self {
            grab_radius: HANDLE_SIZE / scale,
            rotate_offset: ROTATE_HANDLE_OFFSET / scale,
        }
    }
}

/// Canvas position of a resize corner.
pub fn corner_position(geometry: &ImageGeometry, corner: Corner) -> Pos2 {
    geometry.to_canvas(corner.local_offset(geometry.size()))
}

/// Canvas position of the rotate handle: above the top edge midpoint in the layer's frame.
pub fn rotate_handle_position(geometry: &ImageGeometry, metrics: &HandleMetrics) -> Pos2 {
    geometry.to_canvas(vec2(geometry.width / 2.0, -metrics.rotate_offset))
}

/// The four corner handles followed by the rotate handle.
pub fn handle_positions(geometry: &ImageGeometry, metrics: &HandleMetrics) -> [(GizmoHandle, Pos2); 5] {
    [
        (GizmoHandle::Scale(Corner::TopLeft), corner_position(geometry, Corner::TopLeft)),
        (GizmoHandle::Scale(Corner::TopRight), corner_position(geometry, Corner::TopRight)),
        (GizmoHandle::Scale(Corner::BottomLeft), corner_position(geometry, Corner::BottomLeft)),
        (GizmoHandle::Scale(Corner::BottomRight), corner_position(geometry, Corner::BottomRight)),
        (GizmoHandle::Rotate, rotate_handle_position(geometry, metrics)),
    ]
}

/// The closest handle within grabbing distance of `pos`, if any.
pub fn handle_at(geometry: &ImageGeometry, pos: Pos2, metrics: &HandleMetrics) -> Option<GizmoHandle> {
    handle_positions(geometry, metrics)
        .into_iter()
        .map(|(handle, at)| (handle, at.distance(pos)))
        .filter(|(_, distance)| *distance <= metrics.grab_radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(handle, _)| handle)
}
