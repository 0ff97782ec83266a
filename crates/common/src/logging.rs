//! Logging and tracing initialization.

use std::fs::File;
use std::sync::Mutex;

use crate::config::LoggingConfig;

/// Initialize the tracing subscriber with the given configuration.
///
/// When `config.file` is set, log lines go to that file (appending,
/// ANSI stripped); otherwise they go to stderr. A file that cannot be
/// opened falls back to stderr rather than failing startup.
pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    match open_log_file(config) {
        Some(file) => {
            let writer = Mutex::new(file);
            if config.json {
                let subscriber = fmt::Subscriber::builder()
                    .with_env_filter(env_filter)
                    .json()
                    .with_writer(writer)
                    .finish();
                tracing::subscriber::set_global_default(subscriber).ok();
            } else {
                let subscriber = fmt::Subscriber::builder()
                    .with_env_filter(env_filter)
                    .with_target(true)
                    .with_ansi(false)
                    .with_writer(writer)
                    .finish();
                tracing::subscriber::set_global_default(subscriber).ok();
            }
        }
        None => {
            if config.json {
                let subscriber = fmt::Subscriber::builder()
                    .with_env_filter(env_filter)
                    .json()
                    .finish();
                tracing::subscriber::set_global_default(subscriber).ok();
            } else {
                let subscriber = fmt::Subscriber::builder()
                    .with_env_filter(env_filter)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .finish();
                tracing::subscriber::set_global_default(subscriber).ok();
            }
        }
    }
}

/// Initialize logging with defaults (useful for tests and quick scripts).
pub fn init_default_logging() {
    init_logging(&LoggingConfig::default());
}

/// Open the configured log file for appending, creating parents as needed.
fn open_log_file(config: &LoggingConfig) -> Option<File> {
    let path = config.file.as_ref()?;
    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Failed to create log directory {}: {e}", parent.display());
            return None;
        }
    }
    match std::fs::OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Failed to open log file {}: {e}", path.display());
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_log_file_creates_parents_and_appends() {
        let dir = std::env::temp_dir().join(format!("snapstrip-log-{}", std::process::id()));
        let path = dir.join("nested").join("booth.log");
        let config = LoggingConfig {
            level: "info".to_string(),
            json: false,
            file: Some(path.clone()),
        };

        let file = open_log_file(&config);
        assert!(file.is_some());
        assert!(path.exists());

        // A second open must not truncate or fail.
        assert!(open_log_file(&config).is_some());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_open_log_file_none_without_path() {
        let config = LoggingConfig::default();
        assert!(open_log_file(&config).is_none());
    }
}
