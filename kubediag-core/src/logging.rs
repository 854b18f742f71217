//! Logging configuration module
//!
//! Console output is always enabled; a JSON file layer with rotation is
//! added when a log directory is configured.

use crate::config::LogSettings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: Option<String>,
    pub rotation: LogRotation,
    /// JSON formatting for the console layer
    pub json_format: bool,
}

/// Log rotation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRotation {
    Hourly,
    Daily,
    Never,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_path: None,
            rotation: LogRotation::Daily,
            json_format: false,
        }
    }
}

impl From<&LogSettings> for LoggingConfig {
    fn from(settings: &LogSettings) -> Self {
        Self {
            level: settings.level.clone(),
            file_path: settings.file_path.clone(),
            json_format: settings.json_format,
            ..Default::default()
        }
    }
}

impl LoggingConfig {
    /// Initialize the global subscriber.
    ///
    /// The returned guard flushes the file writer on drop and must be held
    /// for the lifetime of the process.
    pub fn init(&self) -> Result<Option<WorkerGuard>, Box<dyn std::error::Error>> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        let console_layer = if self.json_format {
            fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .json()
                .boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(true)
                .with_writer(std::io::stderr)
                .boxed()
        };

        let mut guard = None;
        let file_layer = self.file_path.as_ref().map(|path| {
            let appender = match self.rotation {
                LogRotation::Hourly => rolling::hourly(path, "kubediag.log"),
                LogRotation::Daily => rolling::daily(path, "kubediag.log"),
                LogRotation::Never => rolling::never(path, "kubediag.log"),
            };
            let (writer, worker_guard) = non_blocking(appender);
            guard = Some(worker_guard);

            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_ansi(false)
                .json()
                .with_writer(writer)
        });

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .try_init()?;

        tracing::debug!("Logging initialized - level: {}", self.level);

        Ok(guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_settings() {
        let settings = LogSettings {
            level: "debug".to_string(),
            file_path: Some("/tmp/kubediag".to_string()),
            json_format: true,
        };
        let config = LoggingConfig::from(&settings);
        assert_eq!(config.level, "debug");
        assert_eq!(config.rotation, LogRotation::Daily);
        assert!(config.json_format);
    }
}
