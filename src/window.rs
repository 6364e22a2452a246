//! The window facade.

use log::{debug, info};

use crate::backend::headless::{HeadlessBackend, HeadlessDisplay};
use crate::backend::{self, Backend, NativeHandles, WindowState};
use crate::error::Result;
use crate::handlers::{Handlers, Slot};
use crate::input::{
    CursorExitEvent, CursorMoveEvent, CursorPos, Event, Key, KeyCharEvent, KeyEvent, Modifiers,
    MouseButton, MouseButtonEvent, MoveEvent, Position, ResizeEvent, ScrollEvent, Size,
};
use crate::keytable::KeyTable;

/// A native window and its event handlers.
///
/// The window never runs its own loop. Call [`Window::poll`] or
/// [`Window::wait_events`] from your loop; both translate queued native
/// events and invoke the matching handlers on the calling thread, in the
/// order the system queued them.
///
/// A close request from the user only sets a flag
/// ([`Window::is_close_requested`]). Resources are released by
/// [`Window::close`] or when the window is dropped.
///
/// ```
/// use winport::{HeadlessDisplay, Key, Size, Window};
///
/// let display = HeadlessDisplay::new();
/// let mut window = Window::open_headless(&display, "demo", Size::new(640, 480), None)?;
/// window.set_key_handler(|window, event| {
///     if event.key == Key::Escape && event.down {
///         window.set_close_requested(true);
///     }
/// });
///
/// display.press_key(Key::Escape);
/// while !window.is_close_requested() {
///     window.wait_events();
/// }
/// window.close();
/// # Ok::<(), winport::WindowError>(())
/// ```
pub struct Window {
    backend: Box<dyn Backend>,
    state: WindowState,
    handlers: Handlers,
    /// Set while `poll` is draining events.
    dispatching: bool,
}

impl Window {
    /// Opens a native window with the given title and client size.
    ///
    /// Without a `position` the window system picks the placement.
    pub fn new(title: &str, size: Size, position: Option<Position>) -> Result<Self> {
        let backend = backend::open_native(title, size, position)?;
        Ok(Self::from_backend(backend))
    }

    /// Opens a window on a virtual display.
    pub fn open_headless(
        display: &HeadlessDisplay,
        title: &str,
        size: Size,
        position: Option<Position>,
    ) -> Result<Self> {
        let backend = HeadlessBackend::open(display, title, size, position)?;
        Ok(Self::from_backend(Box::new(backend)))
    }

    fn from_backend(backend: Box<dyn Backend>) -> Self {
        let state = WindowState::with_geometry(backend.position(), backend.size());
        debug!("window ready on the {} backend", backend.name());
        Self {
            backend,
            state,
            handlers: Handlers::default(),
            dispatching: false,
        }
    }

    /// Releases the native window and connection.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.backend.close();
    }

    /// Name of the backend driving this window (`"x11"`, `"win32"`,
    /// `"headless"`).
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Dispatches every queued event without blocking.
    ///
    /// Called from inside a handler this returns immediately: the poll that
    /// invoked the handler keeps draining the queue once it returns.
    pub fn poll(&mut self) {
        if self.dispatching {
            debug!("poll called from a handler, ignoring");
            return;
        }
        self.dispatching = true;
        while let Some(event) = self.backend.next_event(&mut self.state) {
            self.dispatch(event);
        }
        self.dispatching = false;
    }

    /// Blocks until at least one native event arrives, then dispatches
    /// everything queued, like [`Window::poll`]. Returns immediately when
    /// called from inside a handler.
    pub fn wait_events(&mut self) {
        if self.dispatching {
            debug!("wait_events called from a handler, ignoring");
            return;
        }
        self.backend.wait_for_event();
        self.poll();
    }

    fn dispatch(&mut self, event: Event) {
        match event {
            Event::Key(e) => self.call(|h| &mut h.key, e),
            Event::KeyChar(e) => self.call(|h| &mut h.key_char, e),
            Event::CursorMove(e) => self.call(|h| &mut h.cursor_move, e),
            Event::CursorExit(e) => self.call(|h| &mut h.cursor_exit, e),
            Event::MouseButton(e) => self.call(|h| &mut h.mouse_button, e),
            Event::Scroll(e) => self.call(|h| &mut h.scroll, e),
            Event::Resize(e) => self.call(|h| &mut h.resize, e),
            Event::Move(e) => self.call(|h| &mut h.moved, e),
        }
    }

    fn call<E>(&mut self, slot: fn(&mut Handlers) -> &mut Slot<E>, event: E) {
        let Some(mut handler) = slot(&mut self.handlers).begin() else {
            return;
        };
        handler(self, event);
        slot(&mut self.handlers).finish(handler);
    }

    pub fn title(&self) -> String {
        self.backend.title()
    }

    pub fn set_title(&mut self, title: &str) {
        self.backend.set_title(title);
    }

    /// Client-area size in pixels.
    pub fn size(&self) -> Size {
        self.backend.size()
    }

    pub fn set_size(&mut self, size: Size) {
        self.backend.set_size(size);
    }

    /// Screen position of the client area's top-left corner.
    pub fn position(&self) -> Position {
        self.backend.position()
    }

    pub fn set_position(&mut self, position: Position) {
        self.backend.set_position(position);
    }

    /// Read back from the native window each time.
    pub fn is_fullscreen(&self) -> bool {
        self.backend.is_fullscreen()
    }

    /// Switches to borderless fullscreen on the current monitor. Leaving
    /// fullscreen restores the placement the window had before entering it.
    pub fn set_fullscreen(&mut self, fullscreen: bool) {
        self.backend.set_fullscreen(fullscreen);
    }

    pub fn is_close_requested(&self) -> bool {
        self.state.close_requested
    }

    /// Sets or clears the close-request flag, e.g. to quit from a key
    /// handler or to ignore a close request.
    pub fn set_close_requested(&mut self, close_requested: bool) {
        self.state.close_requested = close_requested;
    }

    /// Whether the cursor is currently inside the client area, as tracked
    /// from motion and leave events.
    pub fn is_cursor_in_window(&self) -> bool {
        self.state.cursor_in_window
    }

    /// Current physical state of `key`. Keys the keyboard does not have
    /// report `false`.
    pub fn is_key_down(&self, key: Key) -> bool {
        key != Key::Unknown && self.backend.is_key_down(key)
    }

    /// Shift, Control and Alt state, sampled now.
    pub fn modifiers(&self) -> Modifiers {
        Modifiers::from_key_state(|key| self.is_key_down(key))
    }

    /// Lock state of CapsLock, NumLock or ScrollLock. Any other key
    /// reports `false`.
    pub fn is_key_toggled(&self, key: Key) -> bool {
        key.is_toggle() && self.backend.is_key_toggled(key)
    }

    /// Cursor position relative to the client area.
    pub fn cursor_pos(&self) -> CursorPos {
        self.backend.cursor_pos()
    }

    pub fn set_cursor_pos(&mut self, pos: CursorPos) {
        self.backend.set_cursor_pos(pos);
    }

    /// Cursor position in screen coordinates.
    pub fn cursor_screen_pos(&self) -> CursorPos {
        self.backend.cursor_screen_pos()
    }

    pub fn set_cursor_screen_pos(&mut self, pos: CursorPos) {
        self.backend.set_cursor_screen_pos(pos);
    }

    /// Current state of a mouse button.
    ///
    /// Fails with [`WindowError::UnmappedButton`](crate::WindowError::UnmappedButton)
    /// when the backend has no way to report that button.
    pub fn is_mouse_button_down(&self, button: MouseButton) -> Result<bool> {
        self.backend.is_mouse_button_down(button)
    }

    /// Native key code table for this session.
    pub fn key_table(&self) -> &KeyTable {
        self.backend.key_table()
    }

    /// Display and window handles for surface creation. `None` for
    /// headless windows.
    pub fn native_handles(&self) -> Option<NativeHandles> {
        self.backend.native_handles()
    }

    pub fn set_key_handler(&mut self, handler: impl FnMut(&mut Window, KeyEvent) + 'static) {
        self.handlers.key.set(Box::new(handler));
    }

    pub fn clear_key_handler(&mut self) {
        self.handlers.key.clear();
    }

    pub fn set_key_char_handler(&mut self, handler: impl FnMut(&mut Window, KeyCharEvent) + 'static) {
        self.handlers.key_char.set(Box::new(handler));
    }

    pub fn clear_key_char_handler(&mut self) {
        self.handlers.key_char.clear();
    }

    pub fn set_cursor_move_handler(
        &mut self,
        handler: impl FnMut(&mut Window, CursorMoveEvent) + 'static,
    ) {
        self.handlers.cursor_move.set(Box::new(handler));
    }

    pub fn clear_cursor_move_handler(&mut self) {
        self.handlers.cursor_move.clear();
    }

    pub fn set_cursor_exit_handler(
        &mut self,
        handler: impl FnMut(&mut Window, CursorExitEvent) + 'static,
    ) {
        self.handlers.cursor_exit.set(Box::new(handler));
    }

    pub fn clear_cursor_exit_handler(&mut self) {
        self.handlers.cursor_exit.clear();
    }

    pub fn set_mouse_button_handler(
        &mut self,
        handler: impl FnMut(&mut Window, MouseButtonEvent) + 'static,
    ) {
        self.handlers.mouse_button.set(Box::new(handler));
    }

    pub fn clear_mouse_button_handler(&mut self) {
        self.handlers.mouse_button.clear();
    }

    pub fn set_scroll_handler(&mut self, handler: impl FnMut(&mut Window, ScrollEvent) + 'static) {
        self.handlers.scroll.set(Box::new(handler));
    }

    pub fn clear_scroll_handler(&mut self) {
        self.handlers.scroll.clear();
    }

    pub fn set_resize_handler(&mut self, handler: impl FnMut(&mut Window, ResizeEvent) + 'static) {
        self.handlers.resize.set(Box::new(handler));
    }

    pub fn clear_resize_handler(&mut self) {
        self.handlers.resize.clear();
    }

    pub fn set_move_handler(&mut self, handler: impl FnMut(&mut Window, MoveEvent) + 'static) {
        self.handlers.moved.set(Box::new(handler));
    }

    pub fn clear_move_handler(&mut self) {
        self.handlers.moved.clear();
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("backend", &self.backend.name())
            .field("state", &self.state)
            .field("dispatching", &self.dispatching)
            .finish_non_exhaustive()
    }
}
