//! macOS placeholder.
//!
//! There is no AppKit backend yet; opening a window on macOS fails with
//! [`WindowError::Unsupported`] so callers can fall back to the headless
//! display.

use log::warn;

use super::Backend;
use crate::error::{Result, WindowError};
use crate::input::{Position, Size};

#[cfg_attr(not(target_os = "macos"), allow(dead_code))]
pub(crate) fn open(
    title: &str,
    _size: Size,
    _position: Option<Position>,
) -> Result<Box<dyn Backend>> {
    warn!("cannot open \"{title}\": no Cocoa backend");
    Err(WindowError::Unsupported("cocoa"))
}
