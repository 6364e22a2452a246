//! Native windowing backends.
//!
//! Each backend owns one native window plus whatever connection it needs and
//! turns native notifications into portable [`Event`]s. Translation itself
//! lives in platform-independent `translate` modules so it can be exercised
//! without a display; the native layers only decode raw events and perform
//! OS calls.

use raw_window_handle::{RawDisplayHandle, RawWindowHandle};

use crate::error::Result;
use crate::input::{CursorPos, Event, Key, MouseButton, Position, Size};
use crate::keytable::KeyTable;

pub mod cocoa;
pub mod headless;
pub mod state;
pub mod win32;
pub mod x11;

pub use state::WindowState;

/// Display and window handles for handing the window to a graphics API.
#[derive(Debug, Clone, Copy)]
pub struct NativeHandles {
    pub display: RawDisplayHandle,
    pub window: RawWindowHandle,
}

/// Operations every backend provides to the window facade.
///
/// Setters and queries never fail once the window exists: native errors are
/// logged and replaced with neutral values. Only construction and the mouse
/// button query surface errors.
pub(crate) trait Backend {
    /// Short backend identifier used in logs.
    fn name(&self) -> &'static str;

    /// Native code table built for this session.
    fn key_table(&self) -> &KeyTable;

    /// Returns the next translated event without blocking.
    ///
    /// Native events that translate to nothing (repaints, filtered key
    /// presses, close requests) are consumed here and only update `state`.
    fn next_event(&mut self, state: &mut WindowState) -> Option<Event>;

    /// Blocks until at least one native event is queued.
    fn wait_for_event(&mut self);

    /// Releases native resources. Calling it again is a no-op.
    fn close(&mut self);

    fn title(&self) -> String;
    fn set_title(&mut self, title: &str);

    fn size(&self) -> Size;
    fn set_size(&mut self, size: Size);

    fn position(&self) -> Position;
    fn set_position(&mut self, position: Position);

    fn is_fullscreen(&self) -> bool;
    fn set_fullscreen(&mut self, fullscreen: bool);

    fn is_key_down(&self, key: Key) -> bool;

    /// Lock state of a toggle key; called only for keys where
    /// [`Key::is_toggle`] holds.
    fn is_key_toggled(&self, key: Key) -> bool;

    fn cursor_pos(&self) -> CursorPos;
    fn set_cursor_pos(&mut self, pos: CursorPos);
    fn cursor_screen_pos(&self) -> CursorPos;
    fn set_cursor_screen_pos(&mut self, pos: CursorPos);

    fn is_mouse_button_down(&self, button: MouseButton) -> Result<bool>;

    fn native_handles(&self) -> Option<NativeHandles>;
}

/// Opens the native backend for the platform this crate was compiled for.
#[cfg(windows)]
pub(crate) fn open_native(
    title: &str,
    size: Size,
    position: Option<Position>,
) -> Result<Box<dyn Backend>> {
    let backend = win32::native::Win32Backend::open(title, size, position)?;
    Ok(Box::new(backend))
}

/// Opens the native backend for the platform this crate was compiled for.
#[cfg(target_os = "macos")]
pub(crate) fn open_native(
    title: &str,
    size: Size,
    position: Option<Position>,
) -> Result<Box<dyn Backend>> {
    cocoa::open(title, size, position)
}

/// Opens the native backend for the platform this crate was compiled for.
#[cfg(all(unix, not(target_os = "macos")))]
pub(crate) fn open_native(
    title: &str,
    size: Size,
    position: Option<Position>,
) -> Result<Box<dyn Backend>> {
    let backend = x11::native::X11Backend::open(title, size, position)?;
    Ok(Box::new(backend))
}

#[cfg(not(any(windows, unix)))]
pub(crate) fn open_native(
    _title: &str,
    _size: Size,
    _position: Option<Position>,
) -> Result<Box<dyn Backend>> {
    Err(crate::error::WindowError::Unsupported("native"))
}
