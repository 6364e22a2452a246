//! Error types surfaced by window construction and state queries.

use thiserror::Error;

use crate::input::MouseButton;

/// Errors that can occur while opening or querying a window.
///
/// Translation of native input never produces an error: unmapped keys resolve
/// to [`Key::Unknown`](crate::Key::Unknown) and unmapped buttons are dropped.
#[derive(Debug, Error)]
pub enum WindowError {
    /// The native windowing system could not be reached.
    #[error("could not connect to the windowing system: {0}")]
    Connection(String),

    /// The native window could not be created.
    #[error("failed to create native window: {0}")]
    Creation(String),

    /// The current platform has no working backend.
    #[error("the {0} backend is not implemented")]
    Unsupported(&'static str),

    /// A graphics surface could not be created for the window.
    #[error("surface error: {0}")]
    Surface(String),

    /// A mouse button was queried that the backend cannot report.
    #[error("mouse button {0:?} has no native mapping on this platform")]
    UnmappedButton(MouseButton),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, WindowError>;
