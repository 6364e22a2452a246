//! Mouse button identification.

/// Mouse button identification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary button
    Left,
    /// Secondary button
    Right,
    /// Wheel button
    Middle,
    /// First extra button (usually "back")
    X1,
    /// Second extra button (usually "forward")
    X2,
}

impl MouseButton {
    /// Every mouse button.
    pub const ALL: [MouseButton; 5] = [
        MouseButton::Left,
        MouseButton::Right,
        MouseButton::Middle,
        MouseButton::X1,
        MouseButton::X2,
    ];
}
