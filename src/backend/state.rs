//! Window state the translators read and update while draining events.

use crate::input::{Position, Size};

/// Bookkeeping owned by the window facade for the lifetime of the window.
///
/// Fullscreen is deliberately absent: it is always read back from the native
/// window so it cannot drift from what the window manager applied.
#[derive(Debug, Default)]
pub struct WindowState {
    pub(crate) close_requested: bool,
    pub(crate) cursor_in_window: bool,
    pub(crate) last_position: Option<Position>,
    pub(crate) last_size: Option<Size>,
    pub(crate) pending_high_surrogate: Option<u16>,
}

impl WindowState {
    /// State for a window that just opened with the given geometry.
    pub(crate) fn with_geometry(position: Position, size: Size) -> Self {
        Self {
            last_position: Some(position),
            last_size: Some(size),
            ..Self::default()
        }
    }

    /// Records pointer motion, returning whether the cursor just entered.
    pub(crate) fn cursor_moved(&mut self) -> bool {
        let entered = !self.cursor_in_window;
        self.cursor_in_window = true;
        entered
    }

    pub(crate) fn cursor_left(&mut self) {
        self.cursor_in_window = false;
    }

    /// Records a reported position, returning whether it differs from the
    /// last one notified.
    pub(crate) fn note_position(&mut self, position: Position) -> bool {
        let changed = self.last_position != Some(position);
        self.last_position = Some(position);
        changed
    }

    /// Records a reported size, returning whether it differs from the last
    /// one notified.
    pub(crate) fn note_size(&mut self, size: Size) -> bool {
        let changed = self.last_size != Some(size);
        self.last_size = Some(size);
        changed
    }

    pub fn is_close_requested(&self) -> bool {
        self.close_requested
    }

    pub fn is_cursor_in_window(&self) -> bool {
        self.cursor_in_window
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entered_only_after_leaving() {
        let mut state = WindowState::default();
        assert!(state.cursor_moved());
        assert!(!state.cursor_moved());
        state.cursor_left();
        assert!(state.cursor_moved());
    }

    #[test]
    fn geometry_changes_are_detected_once() {
        let mut state = WindowState::with_geometry(Position::new(0, 0), Size::new(800, 600));
        assert!(!state.note_size(Size::new(800, 600)));
        assert!(state.note_size(Size::new(1024, 768)));
        assert!(!state.note_size(Size::new(1024, 768)));
        assert!(state.note_position(Position::new(5, 5)));
        assert!(!state.note_position(Position::new(5, 5)));
    }
}
