//! Handler slots, one per event category.

use crate::input::{
    CursorExitEvent, CursorMoveEvent, KeyCharEvent, KeyEvent, MouseButtonEvent, MoveEvent,
    ResizeEvent, ScrollEvent,
};
use crate::window::Window;

/// A registered event handler. It receives the window that dispatched the
/// event so it can query or change it.
pub type Handler<E> = Box<dyn FnMut(&mut Window, E)>;

/// A single optional handler.
///
/// `changed` records whether the slot was written while its handler was
/// running, so a handler that replaces or clears itself is not restored.
pub(crate) struct Slot<E> {
    handler: Option<Handler<E>>,
    changed: bool,
}

impl<E> Default for Slot<E> {
    fn default() -> Self {
        Self {
            handler: None,
            changed: false,
        }
    }
}

impl<E> Slot<E> {
    pub(crate) fn set(&mut self, handler: Handler<E>) {
        self.handler = Some(handler);
        self.changed = true;
    }

    pub(crate) fn clear(&mut self) {
        self.handler = None;
        self.changed = true;
    }

    pub(crate) fn is_set(&self) -> bool {
        self.handler.is_some()
    }

    /// Takes the handler out for a call.
    pub(crate) fn begin(&mut self) -> Option<Handler<E>> {
        let handler = self.handler.take()?;
        self.changed = false;
        Some(handler)
    }

    /// Puts the handler back unless the slot was written during the call.
    pub(crate) fn finish(&mut self, handler: Handler<E>) {
        if !self.changed {
            self.handler = Some(handler);
        }
    }
}

#[derive(Default)]
pub(crate) struct Handlers {
    pub(crate) key: Slot<KeyEvent>,
    pub(crate) key_char: Slot<KeyCharEvent>,
    pub(crate) cursor_move: Slot<CursorMoveEvent>,
    pub(crate) cursor_exit: Slot<CursorExitEvent>,
    pub(crate) mouse_button: Slot<MouseButtonEvent>,
    pub(crate) scroll: Slot<ScrollEvent>,
    pub(crate) resize: Slot<ResizeEvent>,
    pub(crate) moved: Slot<MoveEvent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop() -> Handler<KeyEvent> {
        Box::new(|_, _| {})
    }

    #[test]
    fn handler_is_restored_after_call() {
        let mut slot = Slot::default();
        slot.set(noop());
        let handler = slot.begin().expect("handler registered");
        assert!(!slot.is_set());
        slot.finish(handler);
        assert!(slot.is_set());
    }

    #[test]
    fn clearing_during_call_wins() {
        let mut slot = Slot::default();
        slot.set(noop());
        let handler = slot.begin().expect("handler registered");
        slot.clear();
        slot.finish(handler);
        assert!(!slot.is_set());
    }

    #[test]
    fn empty_slot_yields_nothing() {
        let mut slot: Slot<KeyEvent> = Slot::default();
        assert!(slot.begin().is_none());
    }
}
