use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

use crate::buffer::DEFAULT_MAX_MESSAGES;
use crate::error::Result;

/// Display and persistence preferences for the message list
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Print timestamps in group headers
    pub show_timestamps: bool,
    /// Draw consecutive messages of one author under a single header.
    /// When off every message gets its own header.
    pub group_messages: bool,
    pub max_buffer_messages: usize,
    /// Persist messages to the chat log directory
    pub log_messages: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            show_timestamps: true,
            group_messages: true,
            max_buffer_messages: DEFAULT_MAX_MESSAGES,
            log_messages: false,
        }
    }
}

/// Command line switches that take precedence over the stored settings.
/// A switch that is off leaves the stored value alone.
#[derive(Clone, Copy, Debug, Default)]
pub struct Overrides {
    pub no_group: bool,
    pub no_timestamps: bool,
    pub log: bool,
}

impl Settings {
    pub fn apply(&mut self, overrides: Overrides) {
        if overrides.no_group {
            self.group_messages = false;
        }
        if overrides.no_timestamps {
            self.show_timestamps = false;
        }
        if overrides.log {
            self.log_messages = true;
        }
    }
}

pub fn settings_path() -> Option<PathBuf> {
    if let Some(proj) = ProjectDirs::from("io", "cord", "cord-client") {
        let dir = proj.config_dir();
        if let Err(e) = fs::create_dir_all(dir) {
            log::warn!("Failed to create config dir: {}", e);
            return None;
        }
        return Some(dir.join("settings.json"));
    }
    None
}

pub fn load_settings() -> Option<Settings> {
    let path = settings_path()?;
    let content = fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(settings) => Some(settings),
        Err(e) => {
            log::warn!("Ignoring invalid settings file: {}", e);
            None
        }
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    if let Some(path) = settings_path() {
        let mut file = fs::File::create(path)?;
        let data = serde_json::to_string_pretty(settings)?;
        file.write_all(data.as_bytes())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings_fill_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"group_messages": false}"#).unwrap();
        assert!(!settings.group_messages);
        assert!(settings.show_timestamps);
        assert_eq!(settings.max_buffer_messages, DEFAULT_MAX_MESSAGES);
        assert!(!settings.log_messages);
    }

    #[test]
    fn test_overrides_only_touch_requested_fields() {
        let mut settings = Settings {
            show_timestamps: true,
            group_messages: true,
            max_buffer_messages: 10,
            log_messages: false,
        };
        settings.apply(Overrides::default());
        assert!(settings.group_messages && settings.show_timestamps && !settings.log_messages);

        settings.apply(Overrides {
            no_group: true,
            log: true,
            ..Overrides::default()
        });
        assert!(!settings.group_messages);
        assert!(settings.show_timestamps);
        assert!(settings.log_messages);
        assert_eq!(settings.max_buffer_messages, 10);

        // Switches never turn a stored preference back on
        let mut quiet = Settings {
            group_messages: false,
            ..Settings::default()
        };
        quiet.apply(Overrides::default());
        assert!(!quiet.group_messages);
    }

    #[test]
    fn test_settings_json_round_trip() {
        let settings = Settings {
            show_timestamps: false,
            group_messages: true,
            max_buffer_messages: 50,
            log_messages: true,
        };
        let json = serde_json::to_string_pretty(&settings).unwrap();
        let back: Settings = serde_json::from_str(&json).unwrap();
        assert_eq!(back, settings);
    }
}
