//! Shared CLI helpers used across multiple commands.

use std::path::{Path, PathBuf};

use anyhow::Context;
use mutewatch_config::{Settings, lint, settings_path, validate};

/// Resolve the settings file: an explicit path, or the user default.
pub fn resolve_settings_path(path: Option<&Path>) -> PathBuf {
    path.map_or_else(settings_path, Path::to_path_buf)
}

/// Load settings from `path`, using defaults when the file does not exist.
pub fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    Settings::load_or_default(path)
        .with_context(|| format!("failed to load settings from {}", path.display()))
}

/// Reject out-of-range settings and log lint warnings.
pub fn check_settings(settings: &Settings) -> anyhow::Result<()> {
    validate(settings).context("invalid settings")?;
    for warning in lint(settings) {
        tracing::warn!("{warning}");
    }
    Ok(())
}
