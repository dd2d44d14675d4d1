//! Configuration loading (ambient, spec.md §6 non-goals exclude this from
//! the core's own responsibilities, but something has to build the
//! [`Settings`] snapshot C9 reads).
//!
//! Grounded on the teacher's `config::loader`: a `config_dir`/`config_path`
//! pair, a `try_load` that reads-then-parses-then-validates, and a `load`
//! that silently falls back to defaults on any error, logging a warning.
//! The teacher's own split across `Config`/`BarConfig`/keybindings files
//! collapses here because [`Settings`] is already the one file this crate
//! needs -- it is `#[serde(default)]` all the way down, so a TOML file that
//! only sets `gap` round-trips the rest from `Settings::default()`.

pub mod template;

use std::path::PathBuf;

use crate::settings::Settings;

/// Returns the configuration directory: `<platform config dir>/colonnade/`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("colonnade"))
}

/// Returns the path to `config.toml` inside [`config_dir`].
pub fn config_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("config.toml"))
}

/// Tries to load and parse `config.toml`.
///
/// Returns an error string describing what went wrong (missing directory,
/// IO error, parse error) rather than panicking -- the caller decides
/// whether a broken config file is fatal.
pub fn try_load() -> Result<Settings, String> {
    let path = config_path().ok_or("could not determine config directory")?;
    let content = std::fs::read_to_string(&path).map_err(|e| format!("{}: {e}", path.display()))?;
    let settings: Settings =
        toml::from_str(&content).map_err(|e| format!("{}: {e}", path.display()))?;
    Ok(settings)
}

/// Loads settings from disk, falling back to [`Settings::default`].
///
/// A missing file is the expected first-run state and returns defaults
/// silently. A file that exists but fails to parse logs a warning and
/// also falls back, rather than refusing to start the daemon.
pub fn load() -> Settings {
    match config_path() {
        Some(path) if !path.exists() => Settings::default(),
        None => Settings::default(),
        _ => match try_load() {
            Ok(settings) => settings,
            Err(e) => {
                crate::log_warn!("failed to load config, using defaults: {e}");
                Settings::default()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_load_reports_a_missing_directory_rather_than_panicking() {
        // Arrange: config_dir() depends on the environment, so only assert
        // the error path is an Err, not its exact text.
        // Act
        let result = try_load();
        // Assert: either the directory genuinely has no config.toml (Err)
        // or this test environment happens to have one (Ok) -- both are
        // acceptable, the point is this never panics.
        let _ = result;
    }

    #[test]
    fn default_settings_round_trip_through_toml() {
        // Arrange
        let settings = Settings::default();
        // Act
        let toml_text = toml::to_string(&settings).expect("serialize default settings");
        let parsed: Settings = toml::from_str(&toml_text).expect("parse serialized settings");
        // Assert
        assert_eq!(settings, parsed);
    }
}
