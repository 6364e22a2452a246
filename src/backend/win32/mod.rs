//! Win32 backend.
//!
//! Virtual-key codes are resolved through a table built from a fixed list,
//! with Shift, Control and Alt split into their left and right variants from
//! the key message flags. The window procedure only records messages; they
//! are translated when the owner polls.

pub mod keymap;
pub mod translate;

#[cfg(windows)]
pub(crate) mod native;
