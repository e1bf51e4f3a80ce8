use crate::core::geo::Point;
use serde::{Deserialize, Serialize};

/// Raw input delivered by the host element, in client coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// A pointer (mouse button, pen or finger) went down
    PointerDown(PointerInput),
    /// A pointer moved
    PointerMove(PointerInput),
    /// A pointer was released
    PointerUp(PointerInput),
    /// The platform aborted the pointer, e.g. the touch was taken by the OS
    PointerCancel(PointerInput),
    /// Scroll wheel or trackpad scroll
    Wheel(WheelInput),
}

/// Pointer id and position carried by every pointer event
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerInput {
    pub id: u64,
    pub position: Point,
}

impl PointerInput {
    pub fn new(id: u64, x: f64, y: f64) -> Self {
        Self {
            id,
            position: Point::new(x, y),
        }
    }
}

/// Scroll deltas, cursor position and the modifiers held while scrolling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelInput {
    pub position: Point,
    pub delta_x: f64,
    pub delta_y: f64,
    pub modifiers: KeyModifiers,
}

impl WheelInput {
    pub fn new(position: Point, delta_x: f64, delta_y: f64) -> Self {
        Self {
            position,
            delta_x,
            delta_y,
            modifiers: KeyModifiers::default(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: KeyModifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// Keyboard modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct KeyModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyModifiers {
    /// Control on most platforms, command on macOS
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Whether an event was handled
///
/// `Handled` tells the host to suppress the platform's default action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EventHandled {
    Handled,
    NotHandled,
}

impl InputEvent {
    /// Gets the position associated with this event
    pub fn position(&self) -> Point {
        match self {
            InputEvent::PointerDown(p)
            | InputEvent::PointerMove(p)
            | InputEvent::PointerUp(p)
            | InputEvent::PointerCancel(p) => p.position,
            InputEvent::Wheel(w) => w.position,
        }
    }

    /// Pointer id for pointer events
    pub fn pointer_id(&self) -> Option<u64> {
        match self {
            InputEvent::PointerDown(p)
            | InputEvent::PointerMove(p)
            | InputEvent::PointerUp(p)
            | InputEvent::PointerCancel(p) => Some(p.id),
            InputEvent::Wheel(_) => None,
        }
    }

    /// Checks if this event ends a pointer's interaction
    pub fn is_pointer_end(&self) -> bool {
        matches!(
            self,
            InputEvent::PointerUp(_) | InputEvent::PointerCancel(_)
        )
    }
}
