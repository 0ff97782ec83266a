//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory where finished strips are written.
    pub output_dir: PathBuf,

    /// Default booth settings.
    pub booth: BoothDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Default booth parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoothDefaults {
    /// Number of photos per session.
    pub photo_count: usize,

    /// Countdown start value before each shot.
    pub countdown_start: u32,

    /// Camera device path (empty = auto-detect).
    pub camera_device: String,

    /// Ideal capture width.
    pub capture_width: u32,

    /// Ideal capture height.
    pub capture_height: u32,

    /// JPEG quality for captured stills (0-100).
    pub jpeg_quality: u8,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "snapstrip=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_dir: dirs_default_output(),
            booth: BoothDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for BoothDefaults {
    fn default() -> Self {
        Self {
            photo_count: 4,
            countdown_start: 3,
            camera_device: String::new(),
            capture_width: 1280,
            capture_height: 720,
            jpeg_quality: 95,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        let config_path = config_file_path();
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }
}

/// Standard config file location.
fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("snapstrip").join("config.json")
}

/// Default output directory for finished strips.
fn dirs_default_output() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("snapstrip").join("strips")
}
