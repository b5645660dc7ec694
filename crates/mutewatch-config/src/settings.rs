//! Persisted user settings.
//!
//! [`Settings`] is the TOML-backed form of everything the user can adjust.
//! Numeric keys are the [`SETTING_PARAMS`] keys; missing fields take their
//! defaults so older or hand-written files keep loading.

use std::path::{Path, PathBuf};

use mutewatch_core::{
    DispatchConfig, GateConfig, GateParams, MonitorConfig, SETTING_PARAMS, find_setting,
};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::paths;

/// Boolean setting keys accepted by [`Settings::get`] and [`Settings::set`].
pub const FLAG_KEYS: &[&str] = &["audio_cue", "visual_cue"];

/// Free-text setting keys accepted by [`Settings::get`] and [`Settings::set`].
pub const TEXT_KEYS: &[&str] = &["cue_file", "output_device"];

/// User settings as stored in `settings.toml`.
///
/// # Example
///
/// ```rust
/// use mutewatch_config::Settings;
///
/// let settings = Settings::from_toml("cooldown_ms = 3000\naudio_cue = true").unwrap();
/// assert_eq!(settings.cooldown_ms, 3000);
/// assert!(settings.audio_cue);
/// // Everything else keeps its default.
/// assert_eq!(settings.open_threshold_db, -26.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Peak level that opens the gate (dB).
    pub open_threshold_db: f32,
    /// Tracked level below which the gate closes (dB).
    pub close_threshold_db: f32,
    /// Attack time (ms).
    pub attack_ms: u32,
    /// Hold time (ms).
    pub hold_ms: u32,
    /// Release time (ms).
    pub release_ms: u32,
    /// Cooldown between notifications, added to the cue length (ms).
    pub cooldown_ms: u32,
    /// Play the audible cue.
    pub audio_cue: bool,
    /// Show the on-screen indicator.
    pub visual_cue: bool,
    /// Indicator diameter (px).
    pub indicator_size: u32,
    /// WAV file played as the audible cue; `None` uses the bundled default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cue_file: Option<PathBuf>,
    /// Output device for the cue (name substring); `None` uses the default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_device: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        let gate = GateParams::default();
        let dispatch = DispatchConfig::default();
        Self {
            open_threshold_db: gate.open_threshold_db,
            close_threshold_db: gate.close_threshold_db,
            attack_ms: gate.attack_ms,
            hold_ms: gate.hold_ms,
            release_ms: gate.release_ms,
            cooldown_ms: 1500,
            audio_cue: dispatch.audio_cue,
            visual_cue: dispatch.visual_cue,
            indicator_size: dispatch.indicator_diameter_px,
            cue_file: None,
            output_device: None,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings, falling back to defaults when the file does not exist.
    ///
    /// Any other read or parse failure is still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load settings from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the settings to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the settings to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Gate parameters in user units.
    pub fn gate_params(&self) -> GateParams {
        GateParams {
            open_threshold_db: self.open_threshold_db,
            close_threshold_db: self.close_threshold_db,
            attack_ms: self.attack_ms,
            hold_ms: self.hold_ms,
            release_ms: self.release_ms,
        }
    }

    /// Notification switches.
    pub fn dispatch_config(&self) -> DispatchConfig {
        DispatchConfig {
            audio_cue: self.audio_cue,
            visual_cue: self.visual_cue,
            indicator_diameter_px: self.indicator_size,
        }
    }

    /// Build the complete runtime snapshot for a stream format.
    pub fn monitor_config(&self, sample_rate: f32, channels: usize) -> MonitorConfig {
        MonitorConfig {
            gate: GateConfig::new(&self.gate_params(), sample_rate, channels),
            cooldown_ms: u64::from(self.cooldown_ms),
            dispatch: self.dispatch_config(),
        }
    }

    /// Cue file to play, resolving the default location when unset.
    pub fn cue_path(&self) -> PathBuf {
        self.cue_file.clone().unwrap_or_else(paths::default_cue_path)
    }

    /// Numeric setting by [`SETTING_PARAMS`] key.
    pub fn numeric(&self, key: &str) -> Option<f32> {
        let value = match key {
            "open_threshold_db" => self.open_threshold_db,
            "close_threshold_db" => self.close_threshold_db,
            "attack_ms" => self.attack_ms as f32,
            "hold_ms" => self.hold_ms as f32,
            "release_ms" => self.release_ms as f32,
            "cooldown_ms" => self.cooldown_ms as f32,
            "indicator_size" => self.indicator_size as f32,
            _ => return None,
        };
        Some(value)
    }

    /// Every key accepted by [`get`](Self::get) and [`set`](Self::set).
    pub fn keys() -> impl Iterator<Item = &'static str> {
        SETTING_PARAMS
            .iter()
            .map(|p| p.key)
            .chain(FLAG_KEYS.iter().copied())
            .chain(TEXT_KEYS.iter().copied())
    }

    /// Current value of a setting as text.
    ///
    /// Unset optional settings read as an empty string.
    pub fn get(&self, key: &str) -> Result<String> {
        if let Some(value) = self.numeric(key) {
            return Ok(value.to_string());
        }
        match key {
            "audio_cue" => Ok(self.audio_cue.to_string()),
            "visual_cue" => Ok(self.visual_cue.to_string()),
            "cue_file" => Ok(self
                .cue_file
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_default()),
            "output_device" => Ok(self.output_device.clone().unwrap_or_default()),
            _ => Err(ConfigError::UnknownKey(key.to_string())),
        }
    }

    /// Set a setting from text.
    ///
    /// Numeric values are clamped to the setting's range; millisecond and
    /// pixel values are rounded to whole units. An empty value clears an
    /// optional setting.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mutewatch_config::Settings;
    ///
    /// let mut settings = Settings::default();
    /// settings.set("hold_ms", "99999").unwrap();
    /// assert_eq!(settings.hold_ms, 10_000);
    /// settings.set("audio_cue", "on").unwrap();
    /// assert!(settings.audio_cue);
    /// assert!(settings.set("volume", "3").is_err());
    /// ```
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if let Some(desc) = find_setting(key) {
            let parsed: f32 = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::invalid_value(key, value, "expected a number"))?;
            if !parsed.is_finite() {
                return Err(ConfigError::invalid_value(key, value, "expected a finite number"));
            }
            let clamped = desc.clamp(parsed);
            let whole = clamped.round() as u32;
            match key {
                "open_threshold_db" => self.open_threshold_db = clamped,
                "close_threshold_db" => self.close_threshold_db = clamped,
                "attack_ms" => self.attack_ms = whole,
                "hold_ms" => self.hold_ms = whole,
                "release_ms" => self.release_ms = whole,
                "cooldown_ms" => self.cooldown_ms = whole,
                "indicator_size" => self.indicator_size = whole,
                _ => return Err(ConfigError::UnknownKey(key.to_string())),
            }
            return Ok(());
        }

        match key {
            "audio_cue" => self.audio_cue = parse_flag(key, value)?,
            "visual_cue" => self.visual_cue = parse_flag(key, value)?,
            "cue_file" => self.cue_file = non_empty(value).map(PathBuf::from),
            "output_device" => self.output_device = non_empty(value).map(str::to_string),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(ConfigError::invalid_value(key, value, "expected true or false")),
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}
