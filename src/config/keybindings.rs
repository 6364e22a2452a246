//! Keybinding configuration types and parsing.
//!
//! Bindings name a [`Key`] (any canonical name, alias or label accepted by
//! its `FromStr`) with optional `Ctrl+`, `Shift+` and `Alt+` prefixes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::input::{Key, Modifiers};

/// Actions the demo binds to keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Request the window to close
    Close,
    /// Switch between windowed and fullscreen
    ToggleFullscreen,
}

/// A single keybinding: a key with optional modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub key: Key,
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyBinding {
    /// Parse a keybinding string like "Ctrl+Shift+W" or "Escape".
    /// Modifiers can appear in any order and spaces around '+' are ignored.
    pub fn parse(s: &str) -> Result<Self, String> {
        let s = s.trim();
        if s.is_empty() {
            return Err("Empty keybinding string".to_string());
        }

        let parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let Some((key_part, modifier_parts)) = parts.split_last() else {
            return Err("Empty keybinding string".to_string());
        };

        let mut ctrl = false;
        let mut shift = false;
        let mut alt = false;
        for part in modifier_parts {
            match part.to_lowercase().as_str() {
                "ctrl" | "control" => ctrl = true,
                "shift" => shift = true,
                "alt" => alt = true,
                other => return Err(format!("Unknown modifier '{other}' in '{s}'")),
            }
        }

        let key = key_part
            .parse::<Key>()
            .map_err(|err| format!("Invalid keybinding '{s}': {err}"))?;

        Ok(Self {
            key,
            ctrl,
            shift,
            alt,
        })
    }

    /// Check if this keybinding matches the given key and modifier state.
    pub fn matches(&self, key: Key, modifiers: Modifiers) -> bool {
        self.key == key
            && self.ctrl == modifiers.ctrl
            && self.shift == modifiers.shift
            && self.alt == modifiers.alt
    }
}

/// The `[input]` section: key bindings for the demo's actions.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InputConfig {
    /// Keys that request the window to close
    #[serde(default = "default_close_keys")]
    pub close_keys: Vec<String>,

    /// Keys that toggle fullscreen
    #[serde(default = "default_fullscreen_keys")]
    pub fullscreen_keys: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            close_keys: default_close_keys(),
            fullscreen_keys: default_fullscreen_keys(),
        }
    }
}

impl InputConfig {
    /// Build a lookup map from keybindings to actions.
    /// Returns an error if any keybinding string is invalid or if duplicates are detected.
    pub fn build_action_map(&self) -> Result<HashMap<KeyBinding, Action>, String> {
        let mut map = HashMap::new();

        let mut insert_binding = |binding_str: &str, action: Action| -> Result<(), String> {
            let binding = KeyBinding::parse(binding_str)?;
            if let Some(existing_action) = map.insert(binding, action) {
                return Err(format!(
                    "Duplicate keybinding '{}' assigned to both {:?} and {:?}",
                    binding_str, existing_action, action
                ));
            }
            Ok(())
        };

        for binding_str in &self.close_keys {
            insert_binding(binding_str, Action::Close)?;
        }

        for binding_str in &self.fullscreen_keys {
            insert_binding(binding_str, Action::ToggleFullscreen)?;
        }

        Ok(map)
    }
}

fn default_close_keys() -> Vec<String> {
    vec!["Escape".to_string()]
}

fn default_fullscreen_keys() -> Vec<String> {
    vec!["F11".to_string(), "Alt+Return".to_string()]
}
