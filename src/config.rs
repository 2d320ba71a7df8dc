use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "config/partyline.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_service_url")]
    pub service_url: String,
    #[serde(default = "default_shorten_endpoint")]
    pub shorten_endpoint: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    /// Delay before the focus-regain reconnect fires, in milliseconds.
    #[serde(default = "default_reconnect_delay_ms")]
    pub reconnect_delay_ms: u64,
}

fn default_service_url() -> String {
    "wss://chat.partyline.example/ws".to_string()
}

fn default_shorten_endpoint() -> String {
    "https://chat.partyline.example/api/shorten-url".to_string()
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_reconnect_delay_ms() -> u64 {
    750
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_url: default_service_url(),
            shorten_endpoint: default_shorten_endpoint(),
            data_dir: default_data_dir(),
            reconnect_delay_ms: default_reconnect_delay_ms(),
        }
    }
}

pub fn load_config(path: &str) -> AppConfig {
    let path = Path::new(path);
    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("Failed to parse config file {}: {err}", path.display());
                AppConfig::default()
            }
        },
        Err(err) => {
            log::info!(
                "Config file {} not found ({err}); using defaults",
                path.display()
            );
            AppConfig::default()
        }
    }
}

pub fn save_config(path: &str, config: &AppConfig) -> std::io::Result<()> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(config)?;
    fs::write(path, json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let config = load_config("does/not/exist.json");
        assert_eq!(config.reconnect_delay_ms, default_reconnect_delay_ms());
        assert!(config.service_url.starts_with("wss://"));
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partyline.json");
        fs::write(&path, r#"{"service_url": "ws://localhost:9000/ws"}"#).unwrap();
        let config = load_config(path.to_str().unwrap());
        assert_eq!(config.service_url, "ws://localhost:9000/ws");
        assert_eq!(config.data_dir, "data");
    }

    #[test]
    fn config_round_trips_through_save() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("partyline.json");
        let mut config = AppConfig::default();
        config.reconnect_delay_ms = 250;
        save_config(path.to_str().unwrap(), &config).unwrap();
        let loaded = load_config(path.to_str().unwrap());
        assert_eq!(loaded.reconnect_delay_ms, 250);
    }
}
