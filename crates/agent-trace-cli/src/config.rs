//! CLI configuration management.
//!
//! Supports loading configuration from a config file, `.env`, environment
//! variables and CLI arguments with proper precedence.

use std::path::PathBuf;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::warn;

use agent_trace_core::DEFAULT_EVENTS_URL;

/// Viewer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// WebSocket URL of the trace events server.
    pub ws_url: String,

    /// Initial window width in points.
    pub window_width: f32,

    /// Initial window height in points.
    pub window_height: f32,

    /// Start with the dark theme.
    pub dark_mode: bool,

    /// Start with the trace panel open.
    pub show_sidebar: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ws_url: DEFAULT_EVENTS_URL.to_string(),
            window_width: 1400.0,
            window_height: 900.0,
            dark_mode: true,
            show_sidebar: true,
        }
    }
}

impl Config {
    /// Load configuration from the config file, then the environment.
    ///
    /// `.env` is expected to have been loaded into the process environment
    /// already, so it sits at the same precedence as real variables.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Defaults overlaid with the config file only. Used when saving, so
    /// environment overrides never end up persisted.
    pub fn load_file() -> Result<Self> {
        match Self::config_file_path() {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read config from {}", path.display()))?;
                serde_json::from_str(&contents)
                    .with_context(|| format!("Failed to parse config file {}", path.display()))
            }
            _ => Ok(Self::default()),
        }
    }

    /// Override fields from `TRACE_VIZ_*` variables. Unparseable values are
    /// reported and ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("TRACE_VIZ_WS_URL") {
            self.ws_url = url;
        }
        if let Some(value) = lookup("TRACE_VIZ_DARK_MODE") {
            match parse_flag(&value) {
                Some(dark) => self.dark_mode = dark,
                None => warn!(%value, "ignoring TRACE_VIZ_DARK_MODE"),
            }
        }
        if let Some(value) = lookup("TRACE_VIZ_WINDOW_WIDTH") {
            match value.parse() {
                Ok(width) => self.window_width = width,
                Err(_) => warn!(%value, "ignoring TRACE_VIZ_WINDOW_WIDTH"),
            }
        }
        if let Some(value) = lookup("TRACE_VIZ_WINDOW_HEIGHT") {
            match value.parse() {
                Ok(height) => self.window_height = height,
                Err(_) => warn!(%value, "ignoring TRACE_VIZ_WINDOW_HEIGHT"),
            }
        }
    }

    /// Save current configuration to the config file.
    pub fn save(&self) -> Result<()> {
        if let Some(config_path) = Self::config_file_path() {
            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create config directory: {}", parent.display())
                })?;
            }
            let contents = serde_json::to_string_pretty(self)?;
            std::fs::write(&config_path, contents)
                .with_context(|| format!("Failed to write config to {}", config_path.display()))?;
        }
        Ok(())
    }

    /// Get the path to the config file.
    pub fn config_file_path() -> Option<PathBuf> {
        ProjectDirs::from("dev", "agent-trace", "trace-viz")
            .map(|dirs| dirs.config_dir().join("config.json"))
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Reject anything that is not a `ws://` or `wss://` URL.
pub fn validate_ws_url(url: &str) -> Result<()> {
    let rest = url
        .strip_prefix("ws://")
        .or_else(|| url.strip_prefix("wss://"));
    match rest {
        Some(host) if !host.is_empty() => Ok(()),
        _ => anyhow::bail!("Invalid events URL: {url}. Expected ws://host[:port]/path or wss://..."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_point_at_local_server() {
        let config = Config::default();
        assert_eq!(config.ws_url, "ws://127.0.0.1:8000/ws");
        assert_eq!((config.window_width, config.window_height), (1400.0, 900.0));
        assert!(config.dark_mode && config.show_sidebar);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config: Config = serde_json::from_str(r#"{"ws_url": "ws://trace.local/ws"}"#).unwrap();
        assert_eq!(config.ws_url, "ws://trace.local/ws");
        assert_eq!(config.window_width, 1400.0);
    }

    #[test]
    fn env_overrides_file_values() {
        let mut config = Config {
            ws_url: "ws://from-file/ws".into(),
            ..Config::default()
        };
        config.apply_env(env(&[
            ("TRACE_VIZ_WS_URL", "wss://from-env/ws"),
            ("TRACE_VIZ_DARK_MODE", "off"),
            ("TRACE_VIZ_WINDOW_WIDTH", "1024"),
        ]));
        assert_eq!(config.ws_url, "wss://from-env/ws");
        assert!(!config.dark_mode);
        assert_eq!(config.window_width, 1024.0);
        assert_eq!(config.window_height, 900.0);
    }

    #[test]
    fn bad_env_values_are_ignored() {
        let mut config = Config::default();
        config.apply_env(env(&[
            ("TRACE_VIZ_DARK_MODE", "maybe"),
            ("TRACE_VIZ_WINDOW_HEIGHT", "tall"),
        ]));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn only_websocket_urls_are_accepted() {
        assert!(validate_ws_url("ws://127.0.0.1:8000/ws").is_ok());
        assert!(validate_ws_url("wss://trace.example.com/ws").is_ok());
        assert!(validate_ws_url("http://127.0.0.1:8000/ws").is_err());
        assert!(validate_ws_url("ws://").is_err());
    }
}
