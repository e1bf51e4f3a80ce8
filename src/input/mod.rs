pub mod events;
pub mod gestures;

// Re-export the essential types
pub use events::{EventHandled, InputEvent, KeyModifiers, PointerInput, WheelInput};
pub use gestures::{GestureController, GestureState, TrackedPointer, TransformationProvider};
