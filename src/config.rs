use serde::Deserialize;
use std::{fs, path::Path, path::PathBuf};
use tracing::level_filters::LevelFilter;

use crate::errors::ConfigError;

const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP port to listen on.
    pub port: u16,

    /// Log level for tracing (e.g. "info", "debug").
    pub log_level: String,

    pub server_version: String,

    /// Path the item collection is served under, e.g. "/api/items".
    pub items_path: String,

    /// Path to the snapshot JSON file.
    ///
    /// If `None`, items live in memory only and are lost on shutdown.
    pub snapshot_path: Option<String>,

    /// Interval (seconds) between automatic snapshot saves.
    pub snapshot_interval: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            log_level: "info".to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            items_path: "/api/items".to_string(),
            snapshot_path: None,
            snapshot_interval: 30,
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let file = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_json(&file)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let cfg: AppConfig = serde_json::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Find config.json next to the executable, or one directory up.
    pub fn locate() -> Option<PathBuf> {
        let exe_path = std::env::current_exe().ok()?;
        let exe_dir = exe_path.parent()?;

        [exe_dir.join(CONFIG_FILE), exe_dir.join("..").join(CONFIG_FILE)]
            .into_iter()
            .find(|candidate| candidate.exists())
    }

    /// Apply the `PORT` environment variable, if set and valid.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            self.port = port;
        }
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let path = &self.items_path;
        if !path.starts_with('/') || path.ends_with('/') {
            return Err(ConfigError::InvalidItemsPath(path.clone()));
        }
        Ok(())
    }

    pub fn level_filter(&self) -> LevelFilter {
        match self.log_level.to_lowercase().as_str() {
            "trace" => LevelFilter::TRACE,
            "debug" => LevelFilter::DEBUG,
            "info" => LevelFilter::INFO,
            "warn" => LevelFilter::WARN,
            "error" => LevelFilter::ERROR,
            _ => LevelFilter::INFO,
        }
    }
}
