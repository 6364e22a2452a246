//! X11 backend.
//!
//! Key names come from XKB, text from XIM composition, and window manager
//! interaction goes through the EWMH atoms. The native layer is only built
//! on Unix systems other than macOS; the key map and translator compile
//! everywhere.

pub mod keymap;
pub mod translate;

#[cfg(all(unix, not(target_os = "macos")))]
pub(crate) mod native;
