//! Configuration file support for winport-demo.
//!
//! Settings are read from `~/.config/winport/config.toml`. They cover the
//! initial window geometry, the demo's key bindings and its event loop mode.
//!
//! If no config file exists, sensible defaults are used automatically.

pub mod keybindings;
pub mod types;

// Re-export commonly used types at module level
pub use keybindings::{Action, InputConfig, KeyBinding};
pub use types::{DemoConfig, WindowSettings};

use anyhow::{Context, Result};
use log::{debug, info};
use schemars::{JsonSchema, Schema};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Largest accepted window dimension in either direction.
pub const MAX_DIMENSION: u32 = 16384;

/// Root configuration deserialized from the TOML file.
///
/// # Example TOML
/// ```toml
/// [window]
/// title = "scratch"
/// width = 800
/// height = 600
///
/// [input]
/// close_keys = ["Escape", "Ctrl+Q"]
/// fullscreen_keys = ["F11"]
///
/// [demo]
/// wait_events = true
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
pub struct WindowConfig {
    /// Initial window title and geometry
    #[serde(default)]
    pub window: WindowSettings,

    /// Key bindings for demo actions
    #[serde(default)]
    pub input: InputConfig,

    /// Demo event loop settings
    #[serde(default)]
    pub demo: DemoConfig,
}

impl WindowConfig {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Validated ranges:
    /// - `window.width`, `window.height`: 1 - 16384
    /// - `demo.move_step`, `demo.resize_step`: 1 - 1000
    fn validate_and_clamp(&mut self) {
        if !(1..=MAX_DIMENSION).contains(&self.window.width) {
            log::warn!(
                "Invalid window width {}, clamping to 1-{} range",
                self.window.width,
                MAX_DIMENSION
            );
            self.window.width = self.window.width.clamp(1, MAX_DIMENSION);
        }

        if !(1..=MAX_DIMENSION).contains(&self.window.height) {
            log::warn!(
                "Invalid window height {}, clamping to 1-{} range",
                self.window.height,
                MAX_DIMENSION
            );
            self.window.height = self.window.height.clamp(1, MAX_DIMENSION);
        }

        if !(1..=1000).contains(&self.demo.move_step) {
            log::warn!(
                "Invalid move_step {}, clamping to 1-1000 range",
                self.demo.move_step
            );
            self.demo.move_step = self.demo.move_step.clamp(1, 1000);
        }

        if !(1..=1000).contains(&self.demo.resize_step) {
            log::warn!(
                "Invalid resize_step {}, clamping to 1-1000 range",
                self.demo.resize_step
            );
            self.demo.resize_step = self.demo.resize_step.clamp(1, 1000);
        }

        if self.window.x.is_some() != self.window.y.is_some() {
            log::warn!("Only one of window.x / window.y is set, ignoring the position");
            self.window.x = None;
            self.window.y = None;
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("winport");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default location, or returns defaults if
    /// the file does not exist.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Loads and validates configuration from `config_path`.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or contains
    /// invalid TOML.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let mut config: WindowConfig = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        config.validate_and_clamp();

        info!("Loaded config from {}", config_path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// JSON schema describing the configuration file.
    pub fn config_schema() -> Schema {
        schemars::schema_for!(WindowConfig)
    }
}
