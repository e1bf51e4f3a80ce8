use crate::{
    core::{config::GestureOptions, geo::Point, transform::Transformation},
    input::events::{EventHandled, InputEvent, PointerInput, WheelInput},
};

/// Narrow capability through which the controller reads and replaces the
/// view transformation. The controller never touches the view otherwise.
pub trait TransformationProvider {
    fn get(&self) -> Transformation;
    fn set(&mut self, transformation: Transformation);
}

/// A pointer taking part in a gesture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedPointer {
    pub id: u64,
    /// Position when the current session started
    pub init: Point,
    /// Most recent position
    pub last: Point,
}

impl TrackedPointer {
    fn new(input: &PointerInput) -> Self {
        Self {
            id: input.id,
            init: input.position,
            last: input.position,
        }
    }

    /// Starts a new session from the current position so the movement so far
    /// is not applied twice.
    fn rebased(self) -> Self {
        Self {
            init: self.last,
            ..self
        }
    }
}

/// State of a gesture in progress
///
/// `snapshot` is the view transformation when the tracked pointer set last
/// changed; every move recomputes the transformation from it.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    /// Single pointer pan
    OneFinger {
        pointer: TrackedPointer,
        snapshot: Transformation,
    },
    /// Two pointer pan, zoom and rotate
    TwoFinger {
        primary: TrackedPointer,
        secondary: TrackedPointer,
        snapshot: Transformation,
    },
}

impl GestureState {
    pub fn pointer_count(&self) -> usize {
        match self {
            GestureState::Idle => 0,
            GestureState::OneFinger { .. } => 1,
            GestureState::TwoFinger { .. } => 2,
        }
    }

    pub fn tracks(&self, id: u64) -> bool {
        match self {
            GestureState::Idle => false,
            GestureState::OneFinger { pointer, .. } => pointer.id == id,
            GestureState::TwoFinger {
                primary, secondary, ..
            } => primary.id == id || secondary.id == id,
        }
    }

    /// Adds a pointer. A third pointer, or a repeated id, leaves the state as is.
    fn pointer_down(self, input: &PointerInput, current: Transformation) -> Self {
        match self {
            GestureState::Idle => GestureState::OneFinger {
                pointer: TrackedPointer::new(input),
                snapshot: current,
            },
            GestureState::OneFinger { pointer, .. } if pointer.id != input.id => {
                GestureState::TwoFinger {
                    primary: pointer.rebased(),
                    secondary: TrackedPointer::new(input),
                    snapshot: current,
                }
            }
            unchanged => unchanged,
        }
    }

    /// Records a move; returns false when the pointer isn't tracked.
    fn pointer_move(&mut self, input: &PointerInput) -> bool {
        let pointer = match self {
            GestureState::Idle => None,
            GestureState::OneFinger { pointer, .. } => Some(pointer),
            GestureState::TwoFinger {
                primary, secondary, ..
            } => {
                if primary.id == input.id {
                    Some(primary)
                } else {
                    Some(secondary)
                }
            }
        };
        match pointer {
            Some(pointer) if pointer.id == input.id => {
                pointer.last = input.position;
                true
            }
            _ => false,
        }
    }

    /// Removes a pointer, re-snapshotting when one pointer remains.
    fn pointer_end(self, id: u64, current: Transformation) -> Self {
        match self {
            GestureState::OneFinger { pointer, .. } if pointer.id == id => GestureState::Idle,
            GestureState::TwoFinger {
                primary, secondary, ..
            } if primary.id == id => GestureState::OneFinger {
                pointer: secondary.rebased(),
                snapshot: current,
            },
            GestureState::TwoFinger {
                primary, secondary, ..
            } if secondary.id == id => GestureState::OneFinger {
                pointer: primary.rebased(),
                snapshot: current,
            },
            unchanged => unchanged,
        }
    }

    /// The view transformation implied by the pointers' movement since the
    /// snapshot. `client_offset` converts client positions to host-local ones.
    fn transformation(&self, client_offset: Point) -> Option<Transformation> {
        match self {
            GestureState::Idle => None,
            GestureState::OneFinger { pointer, snapshot } => Some(Transformation::compose([
                Transformation::translate(pointer.last.subtract(&pointer.init)),
                *snapshot,
            ])),
            GestureState::TwoFinger {
                primary,
                secondary,
                snapshot,
            } => {
                let init_diff = primary.init.subtract(&secondary.init);
                let current_diff = primary.last.subtract(&secondary.last);
                let current_midpoint = primary.last.midpoint(&secondary.last);
                let translation =
                    current_midpoint.subtract(&primary.init.midpoint(&secondary.init));
                let centre = current_midpoint.subtract(&client_offset);

                // Coincident pointers carry no scale or angle information
                let (scale, angle) = if init_diff.length() == 0.0 {
                    (1.0, 0.0)
                } else {
                    (
                        current_diff.length() / init_diff.length(),
                        current_diff.angle() - init_diff.angle(),
                    )
                };
                if scale == 0.0 {
                    return None;
                }

                Some(Transformation::compose([
                    Transformation::translate(centre),
                    Transformation::scale_rotate(scale, angle),
                    Transformation::translate(translation.subtract(&centre)),
                    *snapshot,
                ]))
            }
        }
    }
}

/// Converts pointer and wheel input into view transformation updates
///
/// Updates are immediate: every wheel event and every tracked pointer move
/// results in exactly one [`TransformationProvider::set`], except a pinch
/// whose pointers have collapsed onto one point. That zero-scale update is
/// skipped and the view keeps its last transformation.
#[derive(Debug, Clone)]
pub struct GestureController {
    pub enabled: bool,
    options: GestureOptions,
    state: GestureState,
    /// Client position of the host element's top-left corner
    client_offset: Point,
}

impl GestureController {
    pub fn new() -> Self {
        Self::with_options(GestureOptions::default())
    }

    pub fn with_options(options: GestureOptions) -> Self {
        Self {
            enabled: true,
            options,
            state: GestureState::Idle,
            client_offset: Point::ZERO,
        }
    }

    /// Processes one input event. Returns `Handled` when the event belonged
    /// to the controller; for wheel events this always means the default
    /// scroll action must be suppressed.
    pub fn handle_event<P>(&mut self, event: &InputEvent, provider: &mut P) -> EventHandled
    where
        P: TransformationProvider + ?Sized,
    {
        if !self.enabled {
            return EventHandled::NotHandled;
        }

        let handled = match event {
            InputEvent::PointerDown(input) => self.pointer_down(input, provider),
            InputEvent::PointerMove(input) => self.pointer_move(input, provider),
            InputEvent::PointerUp(input) | InputEvent::PointerCancel(input) => {
                self.pointer_end(input, provider)
            }
            InputEvent::Wheel(input) => {
                self.wheel(input, provider);
                true
            }
        };

        if handled {
            EventHandled::Handled
        } else {
            EventHandled::NotHandled
        }
    }

    fn pointer_down<P>(&mut self, input: &PointerInput, provider: &mut P) -> bool
    where
        P: TransformationProvider + ?Sized,
    {
        let before = self.state.pointer_count();
        let state = std::mem::take(&mut self.state);
        self.state = state.pointer_down(input, provider.get());
        log::trace!(
            "pointer {} down: {} -> {} tracked pointers",
            input.id,
            before,
            self.state.pointer_count()
        );
        self.state.pointer_count() != before
    }

    fn pointer_move<P>(&mut self, input: &PointerInput, provider: &mut P) -> bool
    where
        P: TransformationProvider + ?Sized,
    {
        if !self.state.pointer_move(input) {
            return false;
        }
        if let Some(transformation) = self.state.transformation(self.client_offset) {
            provider.set(transformation);
        }
        true
    }

    fn pointer_end<P>(&mut self, input: &PointerInput, provider: &mut P) -> bool
    where
        P: TransformationProvider + ?Sized,
    {
        if !self.state.tracks(input.id) {
            return false;
        }
        let state = std::mem::take(&mut self.state);
        self.state = state.pointer_end(input.id, provider.get());
        log::trace!(
            "pointer {} ended, {} tracked pointers remain",
            input.id,
            self.state.pointer_count()
        );
        true
    }

    fn wheel<P>(&self, input: &WheelInput, provider: &mut P)
    where
        P: TransformationProvider + ?Sized,
    {
        let centre = self.to_local(input.position);
        let modifiers = input.modifiers;

        let change = if !self.options.scroll_mode || (modifiers.command() && !modifiers.shift) {
            about(
                centre,
                Transformation::scale(self.options.wheel_zoom_base.powf(-input.delta_y)),
            )
        } else if modifiers.command() && modifiers.shift {
            about(
                centre,
                Transformation::rotate(input.delta_y * self.options.wheel_rotate_rate),
            )
        } else if modifiers.shift {
            Transformation::translate(Point::new(-input.delta_y, 0.0))
        } else {
            Transformation::translate(Point::new(-input.delta_x, -input.delta_y))
        };

        provider.set(Transformation::compose([change, provider.get()]));
    }

    /// Converts a client coordinate to one relative to the host element
    fn to_local(&self, point: Point) -> Point {
        point.subtract(&self.client_offset)
    }

    /// Sets where the host element's top-left corner is in client coordinates
    pub fn set_client_offset(&mut self, offset: Point) {
        self.client_offset = offset;
    }

    pub fn client_offset(&self) -> Point {
        self.client_offset
    }

    pub fn set_options(&mut self, options: GestureOptions) {
        self.options = options;
    }

    pub fn options(&self) -> &GestureOptions {
        &self.options
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != GestureState::Idle
    }

    /// Drops every tracked pointer without touching the view
    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
    }
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new()
    }
}

/// `change` applied about `centre` instead of the origin
fn about(centre: Point, change: Transformation) -> Transformation {
    Transformation::compose([
        Transformation::translate(centre),
        change,
        Transformation::translate(centre.multiply(-1.0)),
    ])
}
