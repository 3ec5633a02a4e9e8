use log::debug;

use crate::layer::LayerId;

/// Inputs that can change which layer is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEvent {
    /// A pointer press landed on a layer's rendered region.
    LayerClicked(LayerId),
    /// A pointer press landed on the bare canvas.
    BackgroundClicked,
    /// An explicit "select X" control.
    Select(LayerId),
}

/// Tracks the single active layer: one of `img`, `tag`, `offer`, or none.
///
/// Transitions only change the active identity; they never move or resize
/// anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectionController {
    active: Option<LayerId>,
}

impl SelectionController {
    pub fn new(initial: Option<LayerId>) -> Self {
        Self { active: initial }
    }

    pub fn active(&self) -> Option<LayerId> {
        self.active
    }

    pub fn is_selected(&self, id: LayerId) -> bool {
        self.active == Some(id)
    }

    /// Name of the current state, `"none"` when nothing is selected.
    pub fn state_name(&self) -> &'static str {
        self.active.map_or("none", |id| id.as_str())
    }

    pub fn handle(&mut self, event: SelectionEvent) {
        let next = match event {
            SelectionEvent::LayerClicked(id) | SelectionEvent::Select(id) => Some(id),
            SelectionEvent::BackgroundClicked => None,
        };
        if next != self.active {
            debug!("Selection {} -> {}", self.state_name(), next.map_or("none", |id| id.as_str()));
        }
        self.active = next;
    }

    pub fn select(&mut self, id: LayerId) {
        self.handle(SelectionEvent::Select(id));
    }
}
