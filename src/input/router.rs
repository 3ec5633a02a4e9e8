use log::trace;

use super::InputEvent;
use crate::session::EditorSession;

/// Routes canvas input events to the session. Returns whether the preview
/// may need repainting.
pub fn route_event(event: &InputEvent, session: &mut EditorSession) -> bool {
    trace!("Routing {event:?}");
    match event {
        InputEvent::PointerDown { location } => {
            session.pointer_down(location.canvas);
            true
        }
        InputEvent::PointerMove { location } => session.pointer_move(location.canvas),
        InputEvent::PointerUp { location } => {
            session.pointer_up(location.canvas);
            true
        }
    }
}
