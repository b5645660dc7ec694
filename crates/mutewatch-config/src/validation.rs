//! Settings validation.
//!
//! [`validate`] rejects values outside the ranges in [`SETTING_PARAMS`].
//! [`lint`] reports combinations that load fine but behave oddly, such as an
//! open threshold at or below the close threshold. The detection core
//! accepts either; it is up to the caller to refuse, warn or carry on.

use mutewatch_core::SETTING_PARAMS;
use thiserror::Error;

use crate::settings::Settings;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Setting value out of range.
    #[error("setting '{key}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Setting key.
        key: String,
        /// The value that was out of range.
        value: f32,
        /// Minimum allowed value.
        min: f32,
        /// Maximum allowed value.
        max: f32,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Non-fatal settings issue.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LintWarning {
    /// The gate will flap because it can never hold open.
    #[error("open threshold {open_db} dB is not above close threshold {close_db} dB")]
    ThresholdOrder {
        /// Open threshold (dB).
        open_db: f32,
        /// Close threshold (dB).
        close_db: f32,
    },

    /// Both notifications are disabled, so nothing will ever be shown or heard.
    #[error("audio and visual cues are both disabled")]
    NothingEnabled,
}

/// Check every numeric setting against its descriptor range.
///
/// # Example
///
/// ```rust
/// use mutewatch_config::{Settings, validate};
///
/// assert!(validate(&Settings::default()).is_ok());
///
/// let mut settings = Settings::default();
/// settings.indicator_size = 1000;
/// assert!(validate(&settings).is_err());
/// ```
pub fn validate(settings: &Settings) -> ValidationResult<()> {
    let mut errors: Vec<ValidationError> = SETTING_PARAMS
        .iter()
        .filter_map(|desc| {
            let value = settings.numeric(desc.key)?;
            (!desc.contains(value)).then(|| ValidationError::OutOfRange {
                key: desc.key.to_string(),
                value,
                min: desc.min,
                max: desc.max,
            })
        })
        .collect();

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}

/// Report suspicious but loadable combinations.
pub fn lint(settings: &Settings) -> Vec<LintWarning> {
    let mut warnings = Vec::new();
    if settings.open_threshold_db <= settings.close_threshold_db {
        warnings.push(LintWarning::ThresholdOrder {
            open_db: settings.open_threshold_db,
            close_db: settings.close_threshold_db,
        });
    }
    if !settings.audio_cue && !settings.visual_cue {
        warnings.push(LintWarning::NothingEnabled);
    }
    warnings
}
