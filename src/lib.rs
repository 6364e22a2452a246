//! Portable native windows with normalized input.
//!
//! A [`Window`] wraps one native window (Win32 or X11, plus an in-process
//! headless display for tests) and turns its keyboard, mouse and geometry
//! notifications into the same [`Event`] types everywhere. Handlers run on
//! the calling thread from [`Window::poll`] or [`Window::wait_events`].
//!
//! The [`config`] module holds the settings used by the `winport-demo`
//! binary so external tools can share its parsing and validation.

pub mod backend;
pub mod config;
pub mod error;
pub mod handlers;
pub mod input;
pub mod keytable;
#[cfg(feature = "vulkan")]
pub mod surface;
pub mod window;

pub use backend::headless::HeadlessDisplay;
pub use backend::{NativeHandles, WindowState};
pub use error::{Result, WindowError};
pub use handlers::Handler;
pub use input::{
    CursorExitEvent, CursorMoveEvent, CursorPos, Event, Key, KeyCharEvent, KeyEvent, Modifiers,
    MouseButton, MouseButtonEvent, MoveEvent, ParseKeyError, Position, ResizeEvent, ScrollEvent,
    Size,
};
pub use keytable::KeyTable;
pub use window::Window;
