//! Portable input model.
//!
//! Backends translate native keyboard, pointer and window notifications into
//! the types defined here so callers never see platform codes.

pub mod events;
pub mod key;
pub mod modifiers;
pub mod mouse;
pub mod utf8;

// Re-export commonly used types at module level
pub use events::{
    CursorExitEvent, CursorMoveEvent, CursorPos, Event, KeyCharEvent, KeyEvent, MouseButtonEvent,
    MoveEvent, Position, ResizeEvent, ScrollEvent, Size,
};
pub use key::{Key, ParseKeyError};
pub use modifiers::Modifiers;
pub use mouse::MouseButton;
