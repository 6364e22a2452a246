//! Portable event and geometry types delivered to window handlers.

use super::{Key, MouseButton};

/// Client-area size in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Window position in screen pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Cursor coordinate, either client-space or screen-space depending on use.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CursorPos {
    pub x: f64,
    pub y: f64,
}

impl CursorPos {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A physical key transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub down: bool,
}

/// Interpreted text input (after layout, dead keys and IME composition).
///
/// One key press may produce zero, one or several of these, and they are not
/// paired with [`KeyEvent`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCharEvent {
    /// Unicode scalar value of the produced character
    pub code_point: u32,
}

impl KeyCharEvent {
    /// The character, if the code point is a valid Unicode scalar value.
    pub fn as_char(&self) -> Option<char> {
        char::from_u32(self.code_point)
    }
}

/// Pointer motion inside the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorMoveEvent {
    /// Position relative to the client area
    pub pos: CursorPos,
    /// Position relative to the screen
    pub screen_pos: CursorPos,
    /// True only for the first motion after the cursor was outside the window
    pub entered: bool,
}

/// The pointer left the window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CursorExitEvent;

/// A mouse button transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseButtonEvent {
    pub button: MouseButton,
    pub down: bool,
}

/// Wheel movement. Positive vertical values scroll away from the user.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollEvent {
    pub v_scroll: f64,
    pub h_scroll: f64,
}

/// The client area changed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeEvent {
    pub size: Size,
}

/// The window moved on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveEvent {
    pub pos: Position,
}

/// Any translated event, in the order the native system queued it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Key(KeyEvent),
    KeyChar(KeyCharEvent),
    CursorMove(CursorMoveEvent),
    CursorExit(CursorExitEvent),
    MouseButton(MouseButtonEvent),
    Scroll(ScrollEvent),
    Resize(ResizeEvent),
    Move(MoveEvent),
}
