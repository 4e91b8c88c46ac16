//! Logging setup using tracing.

use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Log level configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// Parse a log level from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            _ => None,
        }
    }

    /// Filter directive scoping this level to our crates and the HTTP layer.
    pub fn directive(&self) -> String {
        let level = self.as_str();
        format!(
            "snipshelf={level},snipshelf_core={level},snipshelf_auth={level},snipshelf_server={level},snipshelf_storage={level},tower_http={level}"
        )
    }
}

/// Logging configuration.
#[derive(Debug)]
pub struct LogConfig {
    pub level: LogLevel,
    /// Whether to include file/line info in logs.
    pub include_location: bool,
    pub ansi: bool,
    /// Append to this file instead of writing to stdout.
    pub file: Option<PathBuf>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            include_location: false,
            ansi: true,
            file: None,
        }
    }
}

/// Initialize logging with the given configuration.
///
/// `RUST_LOG` wins over the configured level when set. Call once at startup.
pub fn init(config: LogConfig) -> std::io::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.directive()));

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    match config.file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer.with_ansi(false).with_writer(file))
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer.with_ansi(config.ansi))
                .init();
        }
    }

    Ok(())
}

/// Get the default log file path.
pub fn default_log_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|p| p.join("snipshelf").join("logs").join("snipshelf.log"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_from_str() {
        assert_eq!(LogLevel::parse("debug"), Some(LogLevel::Debug));
        assert_eq!(LogLevel::parse("WARN"), Some(LogLevel::Warn));
        assert_eq!(LogLevel::parse("verbose"), None);
    }

    #[test]
    fn test_directive_covers_http_layer() {
        let directive = LogLevel::Debug.directive();
        assert!(directive.contains("snipshelf_server=debug"));
        assert!(directive.contains("tower_http=debug"));
    }

    #[test]
    fn test_default_log_config() {
        let config = LogConfig::default();
        assert_eq!(config.level, LogLevel::Info);
        assert!(config.file.is_none());
    }
}
