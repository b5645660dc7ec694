//! Settings management for mutewatch.
//!
//! This crate owns everything the user can configure and the handoff of that
//! configuration to the real-time detection core.
//!
//! # Features
//!
//! - **Settings**: Load and save [`Settings`] as TOML, edit by key
//! - **Validation**: Range checks and non-fatal lint warnings
//! - **Paths**: Platform-specific config directory and default cue location
//! - **Shared snapshot**: [`SharedConfig`] publishes complete runtime configs
//!   to the audio thread without locks
//!
//! # Example
//!
//! ```rust,no_run
//! use mutewatch_config::{Settings, SharedConfig, paths, validate};
//!
//! let settings = Settings::load_or_default(paths::settings_path()).unwrap();
//! validate(&settings).unwrap();
//!
//! let shared = SharedConfig::new(settings.monitor_config(48000.0, 1));
//! assert_eq!(shared.load().cooldown_ms, u64::from(settings.cooldown_ms));
//! ```

mod error;
mod settings;
mod shared;

/// Platform-specific paths for settings and the default cue.
pub mod paths;

/// Settings validation.
pub mod validation;

pub use error::{ConfigError, Result};
pub use paths::{default_cue_path, ensure_user_config_dir, settings_path, user_config_dir};
pub use settings::{FLAG_KEYS, Settings, TEXT_KEYS};
pub use shared::SharedConfig;
pub use validation::{LintWarning, ValidationError, ValidationResult, lint, validate};
