use egui::{Context, PointerButton, Pos2, Rect};

mod router;
pub use router::route_event;

use crate::layer::CanvasSize;

/// Maps between the on-screen canvas rectangle and canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasView {
    /// Screen rectangle the canvas is drawn into.
    pub rect: Rect,
    /// Screen pixels per canvas unit.
    pub scale: f32,
}

impl CanvasView {
    /// Largest uniform fit of `canvas` centred in `available`.
    pub fn fit(canvas: CanvasSize, available: Rect) -> Self {
        let scale = (available.width() / canvas.width)
            .min(available.height() / canvas.height)
            .max(f32::EPSILON);
        let size = canvas.to_vec2() * scale;
        Self {
            rect: Rect::from_center_size(available.center(), size),
            scale,
        }
    }

    pub fn to_canvas(&self, screen: Pos2) -> Pos2 {
        Pos2::ZERO + (screen - self.rect.min) / self.scale
    }

    pub fn to_screen(&self, canvas: Pos2) -> Pos2 {
        self.rect.min + canvas.to_vec2() * self.scale
    }

    pub fn contains(&self, screen: Pos2) -> bool {
        self.rect.contains(screen)
    }
}

/// Represents the location where an input event occurred
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InputLocation {
    /// The position in screen coordinates
    pub screen: Pos2,
    /// The same position in canvas coordinates
    pub canvas: Pos2,
}

/// Pointer events on the canvas, primary button only.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { location: InputLocation },
    PointerMove { location: InputLocation },
    PointerUp { location: InputLocation },
}

/// Handles converting raw egui input into canvas [`InputEvent`]s.
///
/// A gesture starts only on a press inside the canvas and then captures
/// the pointer until release, even if it leaves the canvas.
#[derive(Debug, Default)]
pub struct InputHandler {
    last_pointer_pos: Option<Pos2>,
    capturing: bool,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    /// Last pointer position over the window, in screen coordinates.
    pub fn hover_pos(&self) -> Option<Pos2> {
        self.last_pointer_pos
    }

    /// Process raw egui input and generate our InputEvents
    pub fn process_input(&mut self, ctx: &Context, view: &CanvasView) -> Vec<InputEvent> {
        let (hover, pressed, released) = ctx.input(|input| {
            (
                input.pointer.hover_pos().or(input.pointer.interact_pos()),
                input.pointer.button_pressed(PointerButton::Primary),
                input.pointer.button_released(PointerButton::Primary),
            )
        });
        self.translate(view, hover, pressed, released)
    }

    fn translate(
        &mut self,
        view: &CanvasView,
        hover: Option<Pos2>,
        pressed: bool,
        released: bool,
    ) -> Vec<InputEvent> {
        let mut events = Vec::new();
        let pos = hover.or(self.last_pointer_pos);
        let moved = hover.is_some() && hover != self.last_pointer_pos;
        if hover.is_some() {
            self.last_pointer_pos = hover;
        }
        let Some(pos) = pos else {
            return events;
        };
        let location = InputLocation {
            screen: pos,
            canvas: view.to_canvas(pos),
        };

        if pressed && !self.capturing && view.contains(pos) {
            self.capturing = true;
            events.push(InputEvent::PointerDown { location });
        } else if self.capturing && moved {
            events.push(InputEvent::PointerMove { location });
        }

        if released && self.capturing {
            self.capturing = false;
            events.push(InputEvent::PointerUp { location });
        }
        events
    }
}
