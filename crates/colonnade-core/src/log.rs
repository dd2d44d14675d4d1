//! Hand-rolled rotating file logger.
//!
//! No `log`/`tracing` dependency: the same choice the teacher made, kept
//! deliberately rather than swapped for an ecosystem crate, since this *is*
//! the teacher's own ambient logging stack, not a gap it left unfilled.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use std::time::{SystemTime, UNIX_EPOCH};

/// Logging configuration, loaded as part of the settings snapshot.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub enabled: bool,
    pub level: String,
    pub max_file_mb: u64,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            max_file_mb: 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl Level {
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Level::Debug,
            "warn" | "warning" => Level::Warn,
            "error" => Level::Error,
            _ => Level::Info,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        }
    }
}

struct Logger {
    file: Option<File>,
    path: PathBuf,
    min_level: Level,
    max_bytes: u64,
    written: u64,
}

static LOGGER: OnceLock<Mutex<Logger>> = OnceLock::new();

/// Directory the CLI shell keeps logs in, mirroring the config directory
/// convention (`~/.config/colonnade/colonnade.log`).
pub fn default_log_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("colonnade")
        .join("colonnade.log")
}

/// Initializes the global logger. Safe to call more than once; only the
/// first call takes effect.
pub fn init(config: &LogConfig) {
    if !config.enabled {
        return;
    }
    let path = default_log_path();
    let _ = LOGGER.set(Mutex::new(Logger {
        file: open_for_append(&path),
        path,
        min_level: Level::parse(&config.level),
        max_bytes: config.max_file_mb.max(1) * 1024 * 1024,
        written: 0,
    }));
}

fn open_for_append(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}

/// Writes one formatted line if the logger is initialized and `level` passes
/// the configured minimum. Never panics: a logging failure must not be able
/// to bring down the orchestrator.
pub fn write(level: Level, args: fmt::Arguments<'_>) {
    let Some(logger) = LOGGER.get() else { return };
    let Ok(mut logger) = logger.lock() else { return };
    if level < logger.min_level {
        return;
    }
    let line = format!("[{}] {} {}\n", timestamp(), level.as_str(), args);
    logger.written += line.len() as u64;
    if logger.written > logger.max_bytes {
        logger.rotate();
    }
    if let Some(file) = logger.file.as_mut() {
        let _ = file.write_all(line.as_bytes());
    }
}

impl Logger {
    fn rotate(&mut self) {
        self.file = None;
        let rotated = self.path.with_extension("log.1");
        let _ = std::fs::rename(&self.path, rotated);
        self.file = open_for_append(&self.path);
        self.written = 0;
    }
}

/// Manual UTC `HH:MM:SS` formatting. No `chrono` dependency: this one value
/// is cheap enough to hand-roll rather than pull in a date/time crate.
fn timestamp() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    let secs_of_day = secs % 86_400;
    format!(
        "{:02}:{:02}:{:02}",
        secs_of_day / 3600,
        (secs_of_day % 3600) / 60,
        secs_of_day % 60
    )
}

#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => { $crate::log::write($crate::log::Level::Debug, format_args!($($arg)*)) };
}

#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => { $crate::log::write($crate::log::Level::Info, format_args!($($arg)*)) };
}

#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => { $crate::log::write($crate::log::Level::Warn, format_args!($($arg)*)) };
}

#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => { $crate::log::write($crate::log::Level::Error, format_args!($($arg)*)) };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parses_case_insensitively_and_defaults_to_info() {
        assert_eq!(Level::parse("DEBUG"), Level::Debug);
        assert_eq!(Level::parse("warning"), Level::Warn);
        assert_eq!(Level::parse("garbage"), Level::Info);
    }

    #[test]
    fn default_config_enables_info_level_logging() {
        // Assert
        let config = LogConfig::default();
        assert!(config.enabled);
        assert_eq!(Level::parse(&config.level), Level::Info);
    }
}
