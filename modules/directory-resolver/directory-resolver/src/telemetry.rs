//! File logging for processes that load the plugins.
//!
//! A subscriber is installed at most once per process, and only when
//! `logging.file` is configured. If the host program already installed a
//! global subscriber, that one stays in place.

use std::path::Path;
use std::sync::OnceLock;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

static INSTALLED: OnceLock<bool> = OnceLock::new();

/// Install the file subscriber described by `config`.
///
/// Returns `true` if this process logs to the configured file. Failures are
/// swallowed: logging must never break a lookup.
pub fn init(config: &LoggingConfig) -> bool {
    let Some(path) = config.file.as_deref() else {
        return false;
    };
    *INSTALLED.get_or_init(|| install(path, &config.level).is_ok())
}

fn install(path: &Path, level: &str) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let file_name = path
        .file_name()
        .ok_or("log file path has no file name")?;
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name.to_string_lossy())
        .build(dir)?;

    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(appender)
        .with_ansi(false)
        .with_target(true)
        .try_init()
}
