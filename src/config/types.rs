//! Configuration type definitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::input::{Position, Size};

/// Initial window settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WindowSettings {
    /// Window title
    #[serde(default = "default_title")]
    pub title: String,

    /// Client area width in pixels (valid range: 1 - 16384)
    #[serde(default = "default_width")]
    pub width: u32,

    /// Client area height in pixels (valid range: 1 - 16384)
    #[serde(default = "default_height")]
    pub height: u32,

    /// Horizontal screen position; the window system chooses when unset
    #[serde(default)]
    pub x: Option<i32>,

    /// Vertical screen position; the window system chooses when unset
    #[serde(default)]
    pub y: Option<i32>,

    /// Open in fullscreen mode
    #[serde(default)]
    pub start_fullscreen: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
            x: None,
            y: None,
            start_fullscreen: false,
        }
    }
}

impl WindowSettings {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Requested position; both coordinates must be set.
    pub fn position(&self) -> Option<Position> {
        Some(Position::new(self.x?, self.y?))
    }
}

/// Demo program behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct DemoConfig {
    /// Pixels moved per arrow key press (valid range: 1 - 1000)
    #[serde(default = "default_step")]
    pub move_step: u32,

    /// Pixels added or removed per resize key press (valid range: 1 - 1000)
    #[serde(default = "default_step")]
    pub resize_step: u32,

    /// Block in `wait_events` instead of polling every frame
    #[serde(default)]
    pub wait_events: bool,

    /// Sleep between polls in milliseconds when not waiting
    #[serde(default = "default_frame_interval")]
    pub frame_interval_ms: u64,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            move_step: default_step(),
            resize_step: default_step(),
            wait_events: false,
            frame_interval_ms: default_frame_interval(),
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_title() -> String {
    "winport".to_string()
}

fn default_width() -> u32 {
    1280
}

fn default_height() -> u32 {
    720
}

fn default_step() -> u32 {
    50
}

fn default_frame_interval() -> u64 {
    16
}
