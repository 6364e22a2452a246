//! In-process virtual display.
//!
//! [`HeadlessDisplay`] behaves like a tiny X server with a window manager
//! attached: it hosts one window, applies geometry requests immediately,
//! answers state queries, and queues X11-style events that are translated by
//! the same code as the real X11 backend. Events can be injected from any
//! thread, which makes it suitable for tests and machines without a display.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};

use super::x11::keymap::evdev_key_table;
use super::x11::translate::{
    Atom, BUTTON_BACK, BUTTON_FORWARD, BUTTON_LEFT, BUTTON_MIDDLE, BUTTON_RIGHT,
    BUTTON_SCROLL_DOWN, BUTTON_SCROLL_UP, NativeEvent, Translator,
};
use super::{Backend, NativeHandles, WindowState};
use crate::error::{Result, WindowError};
use crate::input::{CursorPos, Event, Key, MouseButton, Position, Size};
use crate::keytable::KeyTable;

/// Atom the virtual window manager uses for `WM_DELETE_WINDOW`.
pub const WM_DELETE_WINDOW: Atom = 0x1F;

/// Dimensions of the virtual screen.
pub const SCREEN_SIZE: Size = Size::new(1920, 1080);

#[derive(Debug, Clone)]
struct VirtualWindow {
    title: String,
    position: Position,
    size: Size,
    fullscreen: bool,
    windowed: Option<(Position, Size)>,
}

#[derive(Debug, Default)]
struct DisplayState {
    refuse_connections: bool,
    window: Option<VirtualWindow>,
    queue: VecDeque<NativeEvent>,
    keys_down: HashSet<u32>,
    locks: HashSet<Key>,
    buttons_down: HashSet<MouseButton>,
    /// Pointer position in screen coordinates.
    pointer: Position,
}

impl DisplayState {
    fn push_configure(&mut self) {
        if let Some(window) = &self.window {
            let event = NativeEvent::Configure {
                x: window.position.x,
                y: window.position.y,
                width: window.size.width,
                height: window.size.height,
            };
            self.queue.push_back(event);
        }
    }

    fn window_origin(&self) -> Position {
        self.window
            .as_ref()
            .map(|window| window.position)
            .unwrap_or_default()
    }

    fn push_motion(&mut self) {
        let origin = self.window_origin();
        let event = NativeEvent::Motion {
            x: self.pointer.x - origin.x,
            y: self.pointer.y - origin.y,
            x_root: self.pointer.x,
            y_root: self.pointer.y,
        };
        self.queue.push_back(event);
    }
}

#[derive(Debug, Default)]
struct Shared {
    state: Mutex<DisplayState>,
    ready: Condvar,
}

/// Handle to a virtual display. Clones refer to the same display.
#[derive(Debug, Clone)]
pub struct HeadlessDisplay {
    shared: Arc<Shared>,
    keys: Arc<KeyTable>,
}

impl Default for HeadlessDisplay {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessDisplay {
    pub fn new() -> Self {
        Self {
            shared: Arc::default(),
            keys: Arc::new(evdev_key_table()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DisplayState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn inject(&self, apply: impl FnOnce(&mut DisplayState)) {
        let mut state = self.lock();
        apply(&mut state);
        drop(state);
        self.shared.ready.notify_all();
    }

    /// Makes subsequent window creation fail as if the server were
    /// unreachable.
    pub fn refuse_connections(&self, refuse: bool) {
        self.lock().refuse_connections = refuse;
    }

    /// Whether a window is currently open on this display.
    pub fn has_window(&self) -> bool {
        self.lock().window.is_some()
    }

    /// Number of native events waiting to be drained.
    pub fn pending_events(&self) -> usize {
        self.lock().queue.len()
    }

    /// Native keycode the virtual keyboard uses for `key`.
    pub fn keycode(&self, key: Key) -> Option<u32> {
        self.keys.to_native_key_code(key)
    }

    /// Queues a raw native event.
    pub fn push_event(&self, event: NativeEvent) {
        self.inject(|state| state.queue.push_back(event));
    }

    /// Presses `key` without composing any text.
    pub fn press_key(&self, key: Key) {
        self.press_key_with_text(key, "");
    }

    /// Presses `key`, delivering `text` as the composed input.
    pub fn press_key_with_text(&self, key: Key, text: &str) {
        let Some(keycode) = self.keycode(key) else {
            warn!("virtual keyboard has no {key:?} key");
            return;
        };
        self.inject(|state| {
            if state.keys_down.insert(keycode) && key.is_toggle() && !state.locks.remove(&key) {
                state.locks.insert(key);
            }
            state.queue.push_back(NativeEvent::KeyPress {
                keycode,
                text: text.as_bytes().to_vec(),
            });
        });
    }

    pub fn release_key(&self, key: Key) {
        let Some(keycode) = self.keycode(key) else {
            warn!("virtual keyboard has no {key:?} key");
            return;
        };
        self.inject(|state| {
            state.keys_down.remove(&keycode);
            state.queue.push_back(NativeEvent::KeyRelease { keycode });
        });
    }

    /// Types each character of `text` as a press/release pair, using the
    /// matching letter key where there is one.
    pub fn type_text(&self, text: &str) {
        let mut buf = [0u8; 4];
        for c in text.chars() {
            let key = match c {
                ' ' => Key::Space,
                c if c.is_ascii_alphabetic() => c
                    .encode_utf8(&mut buf)
                    .parse::<Key>()
                    .unwrap_or(Key::Unknown),
                _ => Key::Unknown,
            };
            let keycode = self.keycode(key).unwrap_or(0);
            self.inject(|state| {
                state.queue.push_back(NativeEvent::KeyPress {
                    keycode,
                    text: c.to_string().into_bytes(),
                });
                state.queue.push_back(NativeEvent::KeyRelease { keycode });
            });
        }
    }

    /// Sets a lock indicator without generating key events.
    pub fn set_lock(&self, key: Key, on: bool) {
        let mut state = self.lock();
        if on {
            state.locks.insert(key);
        } else {
            state.locks.remove(&key);
        }
    }

    /// Moves the pointer to a client-relative position of the window.
    pub fn move_pointer(&self, x: i32, y: i32) {
        self.inject(|state| {
            let origin = state.window_origin();
            state.pointer = Position::new(origin.x + x, origin.y + y);
            state.push_motion();
        });
    }

    /// The pointer leaves the window.
    pub fn leave(&self) {
        self.push_event(NativeEvent::Leave);
    }

    pub fn press_button(&self, button: MouseButton) {
        self.inject(|state| {
            state.buttons_down.insert(button);
            state.queue.push_back(NativeEvent::ButtonPress {
                button: button_number(button),
            });
        });
    }

    pub fn release_button(&self, button: MouseButton) {
        self.inject(|state| {
            state.buttons_down.remove(&button);
            state.queue.push_back(NativeEvent::ButtonRelease {
                button: button_number(button),
            });
        });
    }

    /// Turns the wheel by `steps` notches; positive values scroll away from
    /// the user.
    pub fn scroll(&self, steps: i32) {
        let button = if steps >= 0 {
            BUTTON_SCROLL_UP
        } else {
            BUTTON_SCROLL_DOWN
        };
        self.inject(|state| {
            for _ in 0..steps.unsigned_abs() {
                state.queue.push_back(NativeEvent::ButtonPress { button });
                state.queue.push_back(NativeEvent::ButtonRelease { button });
            }
        });
    }

    /// The window manager asks the window to close.
    pub fn request_close(&self) {
        self.push_event(NativeEvent::ClientMessage {
            protocol: WM_DELETE_WINDOW,
        });
    }

    /// The window manager moves or resizes the window.
    pub fn configure(&self, position: Position, size: Size) {
        self.inject(|state| {
            if let Some(window) = state.window.as_mut() {
                window.position = position;
                window.size = size;
            }
            state.push_configure();
        });
    }
}

fn button_number(button: MouseButton) -> u32 {
    match button {
        MouseButton::Left => BUTTON_LEFT,
        MouseButton::Middle => BUTTON_MIDDLE,
        MouseButton::Right => BUTTON_RIGHT,
        MouseButton::X1 => BUTTON_BACK,
        MouseButton::X2 => BUTTON_FORWARD,
    }
}

/// Backend half of a window opened on a [`HeadlessDisplay`].
pub(crate) struct HeadlessBackend {
    display: HeadlessDisplay,
    pending: VecDeque<Event>,
    closed: bool,
}

impl HeadlessBackend {
    pub(crate) fn open(
        display: &HeadlessDisplay,
        title: &str,
        size: Size,
        position: Option<Position>,
    ) -> Result<Self> {
        let mut state = display.lock();
        if state.refuse_connections {
            return Err(WindowError::Connection(
                "virtual display is refusing connections".into(),
            ));
        }
        if state.window.is_some() {
            return Err(WindowError::Creation(
                "virtual display already hosts a window".into(),
            ));
        }

        state.window = Some(VirtualWindow {
            title: title.to_owned(),
            position: position.unwrap_or_default(),
            size,
            fullscreen: false,
            windowed: None,
        });
        state.queue.clear();
        drop(state);

        info!(
            "opened headless window \"{title}\" ({}x{})",
            size.width, size.height
        );
        Ok(Self {
            display: display.clone(),
            pending: VecDeque::new(),
            closed: false,
        })
    }

    fn with_window<T: Default>(&self, read: impl FnOnce(&VirtualWindow) -> T) -> T {
        self.display.lock().window.as_ref().map(read).unwrap_or_default()
    }

    fn update_window(&mut self, apply: impl FnOnce(&mut VirtualWindow)) {
        self.display.inject(|state| {
            let Some(window) = state.window.as_mut() else {
                return;
            };
            let before = (window.position, window.size);
            apply(window);
            if before != (window.position, window.size) {
                state.push_configure();
            }
        });
    }
}

impl Backend for HeadlessBackend {
    fn name(&self) -> &'static str {
        "headless"
    }

    fn key_table(&self) -> &KeyTable {
        &self.display.keys
    }

    fn next_event(&mut self, state: &mut WindowState) -> Option<Event> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }
        if self.closed {
            return None;
        }

        let translator = Translator {
            keys: &self.display.keys,
            wm_delete_window: WM_DELETE_WINDOW,
        };
        let mut display = self.display.lock();
        while self.pending.is_empty() {
            let native = display.queue.pop_front()?;
            translator.translate(&native, state, &mut self.pending);
        }
        drop(display);
        self.pending.pop_front()
    }

    fn wait_for_event(&mut self) {
        if !self.pending.is_empty() || self.closed {
            return;
        }
        let guard = self.display.lock();
        let _guard = self
            .display
            .shared
            .ready
            .wait_while(guard, |state| state.queue.is_empty() && state.window.is_some())
            .unwrap_or_else(PoisonError::into_inner);
    }

    fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.pending.clear();
        self.display.inject(|state| {
            state.window = None;
            state.queue.clear();
        });
        info!("closed headless window");
    }

    fn title(&self) -> String {
        self.with_window(|window| window.title.clone())
    }

    fn set_title(&mut self, title: &str) {
        self.update_window(|window| window.title = title.to_owned());
    }

    fn size(&self) -> Size {
        self.with_window(|window| window.size)
    }

    fn set_size(&mut self, size: Size) {
        self.update_window(|window| window.size = size);
    }

    fn position(&self) -> Position {
        self.with_window(|window| window.position)
    }

    fn set_position(&mut self, position: Position) {
        self.update_window(|window| window.position = position);
    }

    fn is_fullscreen(&self) -> bool {
        self.with_window(|window| window.fullscreen)
    }

    fn set_fullscreen(&mut self, fullscreen: bool) {
        self.update_window(|window| {
            if window.fullscreen == fullscreen {
                return;
            }
            window.fullscreen = fullscreen;
            if fullscreen {
                window.windowed = Some((window.position, window.size));
                window.position = Position::new(0, 0);
                window.size = SCREEN_SIZE;
            } else if let Some((position, size)) = window.windowed.take() {
                window.position = position;
                window.size = size;
            }
            debug!("headless fullscreen -> {fullscreen}");
        });
    }

    fn is_key_down(&self, key: Key) -> bool {
        self.display
            .keys
            .to_native_key_code(key)
            .is_some_and(|code| self.display.lock().keys_down.contains(&code))
    }

    fn is_key_toggled(&self, key: Key) -> bool {
        self.display.lock().locks.contains(&key)
    }

    fn cursor_pos(&self) -> CursorPos {
        let state = self.display.lock();
        let origin = state.window_origin();
        CursorPos::new(
            f64::from(state.pointer.x - origin.x),
            f64::from(state.pointer.y - origin.y),
        )
    }

    fn set_cursor_pos(&mut self, pos: CursorPos) {
        self.display.inject(|state| {
            let origin = state.window_origin();
            state.pointer = Position::new(origin.x + pos.x as i32, origin.y + pos.y as i32);
            state.push_motion();
        });
    }

    fn cursor_screen_pos(&self) -> CursorPos {
        let pointer = self.display.lock().pointer;
        CursorPos::new(f64::from(pointer.x), f64::from(pointer.y))
    }

    fn set_cursor_screen_pos(&mut self, pos: CursorPos) {
        self.display.inject(|state| {
            state.pointer = Position::new(pos.x as i32, pos.y as i32);
            state.push_motion();
        });
    }

    fn is_mouse_button_down(&self, button: MouseButton) -> Result<bool> {
        match button {
            MouseButton::X1 | MouseButton::X2 => Err(WindowError::UnmappedButton(button)),
            _ => Ok(self.display.lock().buttons_down.contains(&button)),
        }
    }

    fn native_handles(&self) -> Option<NativeHandles> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(display: &HeadlessDisplay) -> HeadlessBackend {
        HeadlessBackend::open(display, "test", Size::new(640, 480), Some(Position::new(10, 20)))
            .expect("open headless window")
    }

    fn drain(backend: &mut HeadlessBackend, state: &mut WindowState) -> Vec<Event> {
        std::iter::from_fn(|| backend.next_event(state)).collect()
    }

    #[test]
    fn refuses_connections_on_request() {
        let display = HeadlessDisplay::new();
        display.refuse_connections(true);
        let err = HeadlessBackend::open(&display, "x", Size::new(1, 1), None)
            .err()
            .expect("connection should fail");
        assert!(matches!(err, WindowError::Connection(_)));
    }

    #[test]
    fn one_window_per_display() {
        let display = HeadlessDisplay::new();
        let mut first = open(&display);
        assert!(matches!(
            HeadlessBackend::open(&display, "second", Size::new(1, 1), None),
            Err(WindowError::Creation(_))
        ));
        first.close();
        assert!(!display.has_window());
        assert!(HeadlessBackend::open(&display, "second", Size::new(1, 1), None).is_ok());
    }

    #[test]
    fn key_state_and_locks_follow_injection() {
        let display = HeadlessDisplay::new();
        let backend = open(&display);
        display.press_key(Key::LShift);
        assert!(backend.is_key_down(Key::LShift));
        display.release_key(Key::LShift);
        assert!(!backend.is_key_down(Key::LShift));

        display.press_key(Key::CapsLock);
        display.release_key(Key::CapsLock);
        assert!(backend.is_key_toggled(Key::CapsLock));
        display.press_key(Key::CapsLock);
        assert!(!backend.is_key_toggled(Key::CapsLock));
    }

    #[test]
    fn typed_text_produces_chars_and_keys() {
        let display = HeadlessDisplay::new();
        let mut backend = open(&display);
        let mut state = WindowState::default();
        display.type_text("hi");
        let events = drain(&mut backend, &mut state);
        assert_eq!(events.len(), 6);
        assert!(matches!(events[0], Event::KeyChar(e) if e.code_point == u32::from(b'h')));
        assert!(matches!(events[1], Event::Key(e) if e.key == Key::H && e.down));
        assert!(matches!(events[2], Event::Key(e) if e.key == Key::H && !e.down));
    }

    #[test]
    fn geometry_requests_queue_configure_events() {
        let display = HeadlessDisplay::new();
        let mut backend = open(&display);
        backend.set_size(Size::new(800, 600));
        backend.set_title("renamed");
        assert_eq!(display.pending_events(), 1);
        assert_eq!(backend.title(), "renamed");
    }

    #[test]
    fn pointer_coordinates_are_relative_to_window() {
        let display = HeadlessDisplay::new();
        let mut backend = open(&display);
        display.move_pointer(5, 6);
        assert_eq!(backend.cursor_pos(), CursorPos::new(5.0, 6.0));
        assert_eq!(backend.cursor_screen_pos(), CursorPos::new(15.0, 26.0));
        backend.set_cursor_screen_pos(CursorPos::new(100.0, 100.0));
        assert_eq!(backend.cursor_pos(), CursorPos::new(90.0, 80.0));
    }

    #[test]
    fn extra_buttons_cannot_be_queried() {
        let display = HeadlessDisplay::new();
        let backend = open(&display);
        display.press_button(MouseButton::Left);
        assert!(matches!(backend.is_mouse_button_down(MouseButton::Left), Ok(true)));
        assert!(matches!(backend.is_mouse_button_down(MouseButton::Right), Ok(false)));
        assert!(matches!(
            backend.is_mouse_button_down(MouseButton::X2),
            Err(WindowError::UnmappedButton(MouseButton::X2))
        ));
    }
}
