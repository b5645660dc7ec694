//! Platform-specific paths for settings and the default cue.
//!
//! # Directory Structure
//!
//! - **User config**: `~/.config/mutewatch/` (Linux), `~/Library/Application Support/mutewatch/` (macOS), `%APPDATA%\mutewatch\` (Windows)
//! - **Settings file**: `<user config>/settings.toml`
//! - **Default cue**: `<user config>/urmuted.wav`
//!
//! # Example
//!
//! ```rust,no_run
//! use mutewatch_config::paths;
//!
//! println!("Settings: {:?}", paths::settings_path());
//! println!("Default cue: {:?}", paths::default_cue_path());
//! ```

use std::path::PathBuf;

/// Application name used for directory paths.
const APP_NAME: &str = "mutewatch";

/// File name of the settings file inside the config directory.
pub const SETTINGS_FILE: &str = "settings.toml";

/// File name of the default audible cue.
pub const DEFAULT_CUE_FILE: &str = "urmuted.wav";

/// Returns the user-specific configuration directory.
///
/// Returns a fallback path if the config directory cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the path of the user settings file.
pub fn settings_path() -> PathBuf {
    user_config_dir().join(SETTINGS_FILE)
}

/// Returns the path of the cue played when no cue file is configured.
pub fn default_cue_path() -> PathBuf {
    user_config_dir().join(DEFAULT_CUE_FILE)
}

/// Ensure the user config directory exists.
///
/// Creates the directory and any parent directories if they don't exist.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_user_config_dir() -> Result<PathBuf, crate::ConfigError> {
    let dir = user_config_dir();

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| crate::ConfigError::create_dir(&dir, e))?;
    }

    Ok(dir)
}
