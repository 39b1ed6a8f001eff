use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use console_core::{SearchConfig, DEFAULT_DEBOUNCE};
use console_engine::ClientSettings;
use console_logging::LogDestination;
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_SETTINGS_FILE: &str = "console.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse settings {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConsoleSettings {
    pub base_url: String,
    pub status_path: String,
    pub search_path: String,
    pub debounce_ms: u64,
    pub allow_empty_search: bool,
    pub connect_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub log_destination: LogDestination,
    pub log_file: PathBuf,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        let client = ClientSettings::default();
        Self {
            base_url: client.base_url,
            status_path: "cluster/status".to_string(),
            search_path: "collections/search".to_string(),
            debounce_ms: DEFAULT_DEBOUNCE.as_millis() as u64,
            allow_empty_search: false,
            connect_timeout_ms: client.connect_timeout.as_millis() as u64,
            request_timeout_ms: client.request_timeout.as_millis() as u64,
            log_destination: LogDestination::File,
            log_file: PathBuf::from("./console.log"),
        }
    }
}

impl ConsoleSettings {
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            base_url: self.base_url.clone(),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            request_timeout: Duration::from_millis(self.request_timeout_ms),
        }
    }

    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            debounce: Duration::from_millis(self.debounce_ms),
            allow_empty_search: self.allow_empty_search,
        }
    }
}

/// Reads settings from `path`. A missing file yields the defaults.
pub fn load_settings(path: &Path) -> Result<ConsoleSettings, ConfigError> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Ok(ConsoleSettings::default());
        }
        Err(source) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
