//! Keyboard modifier state.

use super::Key;

/// Which modifier keys are held, with left and right variants folded
/// together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    /// Either Shift key pressed
    pub shift: bool,
    /// Either Control key pressed
    pub ctrl: bool,
    /// Either Alt key pressed
    pub alt: bool,
}

impl Modifiers {
    /// Samples modifier state through a key-down query such as
    /// [`Window::is_key_down`](crate::Window::is_key_down).
    pub fn from_key_state(is_down: impl Fn(Key) -> bool) -> Self {
        Self {
            shift: is_down(Key::LShift) || is_down(Key::RShift),
            ctrl: is_down(Key::LControl) || is_down(Key::RControl),
            alt: is_down(Key::LAlt) || is_down(Key::RAlt),
        }
    }

    /// True if `key` is itself one of the tracked modifiers.
    pub fn is_modifier(key: Key) -> bool {
        matches!(
            key,
            Key::LShift | Key::RShift | Key::LControl | Key::RControl | Key::LAlt | Key::RAlt
        )
    }
}
