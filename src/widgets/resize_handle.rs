use egui::{Color32, CursorIcon, Painter, Pos2, Rect, Stroke, Vec2, vec2};

pub const HANDLE_COLOR: Color32 = Color32::from_rgb(30, 120, 255);

/// One of the four active resize corners of the image gizmo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    /// The corner that stays pinned while this one is dragged.
    pub fn opposite(&self) -> Corner {
        match self {
            Corner::TopLeft => Corner::BottomRight,
            Corner::TopRight => Corner::BottomLeft,
            Corner::BottomLeft => Corner::TopRight,
            Corner::BottomRight => Corner::TopLeft,
        }
    }

    /// Offset of this corner from the layer origin in the unrotated frame.
    pub fn local_offset(&self, size: Vec2) -> Vec2 {
        match self {
            Corner::TopLeft => Vec2::ZERO,
            Corner::TopRight => vec2(size.x, 0.0),
            Corner::BottomLeft => vec2(0.0, size.y),
            Corner::BottomRight => size,
        }
    }

    pub fn cursor_icon(&self) -> CursorIcon {
        match self {
            Corner::TopLeft => CursorIcon::ResizeNwSe,
            Corner::TopRight => CursorIcon::ResizeNeSw,
            Corner::BottomLeft => CursorIcon::ResizeNeSw,
            Corner::BottomRight => CursorIcon::ResizeNwSe,
        }
    }
}

/// Draws a square resize handle centred on `position` (screen space).
pub fn paint_square_handle(painter: &Painter, position: Pos2, size: f32, hovered: bool) {
    let rect = Rect::from_center_size(position, Vec2::splat(size));
    let fill = if hovered { Color32::WHITE } else { HANDLE_COLOR };
    painter.rect_filled(rect, 2.0, fill);
    painter.rect_stroke(rect, 2.0, Stroke::new(1.0, if hovered { HANDLE_COLOR } else { Color32::WHITE }));
}

/// Draws the round rotate handle centred on `position` (screen space).
pub fn paint_round_handle(painter: &Painter, position: Pos2, size: f32, hovered: bool) {
    let fill = if hovered { Color32::WHITE } else { HANDLE_COLOR };
    painter.circle_filled(position, size / 2.0, fill);
    painter.circle_stroke(position, size / 2.0, Stroke::new(1.0, Color32::WHITE));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opposite_is_involution() {
        for corner in Corner::ALL {
            assert_eq!(corner.opposite().opposite(), corner);
            assert_ne!(corner.opposite(), corner);
        }
    }

    #[test]
    fn test_local_offsets_span_the_box() {
        let size = vec2(10.0, 4.0);
        assert_eq!(Corner::TopLeft.local_offset(size), Vec2::ZERO);
        assert_eq!(Corner::BottomRight.local_offset(size), size);
        assert_eq!(
            Corner::TopRight.local_offset(size) + Corner::BottomLeft.local_offset(size),
            size
        );
    }
}
