use egui::Color32;
use log::debug;

use crate::layer::{LayerId, TextId};
use crate::session::EditorSession;

/// A direct edit from the control panel.
///
/// Pointer gestures do not go through here; they are driven by the gizmo.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Select(LayerId),
    Deselect,
    SetText { target: TextId, content: String },
    /// Clamped into the target's allowed range.
    SetFontSize { target: TextId, size: f32 },
    SetFill { target: TextId, color: Color32 },
    /// `None` removes the badge.
    SetBadge { target: TextId, color: Option<Color32> },
    /// A palette swatch or a manually picked colour for the background.
    SetBackground(Color32),
    Reset,
}

impl Command {
    pub(crate) fn apply(self, session: &mut EditorSession) {
        debug!("Applying {self:?}");
        match self {
            Command::Select(id) => session.select(Some(id)),
            Command::Deselect => session.select(None),
            Command::SetText { target, content } => {
                session.edit_text(target, |layer| layer.content = content);
            }
            Command::SetFontSize { target, size } => {
                session.edit_text(target, |layer| layer.font_size = size);
            }
            Command::SetFill { target, color } => {
                session.edit_text(target, |layer| layer.fill = color);
            }
            Command::SetBadge { target, color } => {
                session.edit_text(target, |layer| layer.badge = color);
            }
            Command::SetBackground(color) => session.choose_background(color),
            Command::Reset => session.reset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionOptions;

    #[test]
    fn test_font_size_is_clamped() {
        let mut session = EditorSession::open(SessionOptions::default());
        session.apply(Command::SetFontSize {
            target: TextId::Offer,
            size: 400.0,
        });
        assert_eq!(session.model().offer().font_size, 80.0);
    }

    #[test]
    fn test_text_edits_leave_geometry_alone() {
        let mut session = EditorSession::open(SessionOptions::default());
        let geometry = session.model().image().geometry;
        let position = session.model().tagline().position;

        session.apply(Command::SetText {
            target: TextId::Tagline,
            content: String::new(),
        });
        session.apply(Command::SetFill {
            target: TextId::Tagline,
            color: Color32::RED,
        });
        session.apply(Command::SetBadge {
            target: TextId::Offer,
            color: None,
        });

        assert_eq!(session.model().image().geometry, geometry);
        assert_eq!(session.model().tagline().position, position);
        assert_eq!(session.model().tagline().content, "");
        assert_eq!(session.model().tagline().fill, Color32::RED);
        assert_eq!(session.model().offer().badge, None);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut session = EditorSession::open(SessionOptions::default());
        session.apply(Command::SetBackground(Color32::BLACK));
        session.apply(Command::Select(LayerId::Offer));

        session.apply(Command::Reset);
        let once = session.model().clone();
        session.apply(Command::Reset);

        assert!(session.model().same_content(&once));
        assert_eq!(session.selection().active(), Some(LayerId::Image));
        assert_eq!(session.palette().chosen(), None);
    }
}
