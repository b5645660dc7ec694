//! Descriptors for the user-adjustable settings.
//!
//! Each setting the host exposes is described by a [`ParamDescriptor`]: a
//! display name, a stable key used in settings files and on the command line,
//! the unit, the allowed range, the default and a recommended step. Settings
//! editors and validators read this table instead of hard-coding ranges.
//!
//! # Example
//!
//! ```rust
//! use mutewatch_core::{ParamUnit, find_setting};
//!
//! let cooldown = find_setting("cooldown_ms").unwrap();
//! assert_eq!(cooldown.unit, ParamUnit::Milliseconds);
//! assert_eq!(cooldown.default, 1500.0);
//! assert_eq!(cooldown.clamp(20_000.0), 10_000.0);
//! ```
//!
//! # no_std Support
//!
//! The table is a `static` array; no allocation is involved.

/// Unit of a setting, used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamUnit {
    /// Decibels (dB) - thresholds.
    Decibels,

    /// Milliseconds (ms) - gate timing and cooldown.
    Milliseconds,

    /// Pixels (px) - indicator size.
    Pixels,
}

impl ParamUnit {
    /// Returns the unit suffix string for display.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mutewatch_core::ParamUnit;
    ///
    /// assert_eq!(ParamUnit::Decibels.suffix(), " dB");
    /// assert_eq!(ParamUnit::Pixels.suffix(), " px");
    /// ```
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Decibels => " dB",
            ParamUnit::Milliseconds => " ms",
            ParamUnit::Pixels => " px",
        }
    }
}

/// Metadata describing one numeric setting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Full name for display (e.g., "Open Threshold").
    pub name: &'static str,

    /// Stable key used in settings files and by `config set`.
    pub key: &'static str,

    /// Unit type for formatting the value.
    pub unit: ParamUnit,

    /// Minimum allowed value.
    pub min: f32,

    /// Maximum allowed value.
    pub max: f32,

    /// Value used when the setting is absent.
    pub default: f32,

    /// Recommended step for spin boxes and sliders.
    pub step: f32,

    /// Group for settings UIs (`"gate"` or `"notification"`).
    pub group: &'static str,
}

impl ParamDescriptor {
    const fn threshold(name: &'static str, key: &'static str, default: f32) -> Self {
        Self {
            name,
            key,
            unit: ParamUnit::Decibels,
            min: -96.0,
            max: 0.0,
            default,
            step: 1.0,
            group: "gate",
        }
    }

    const fn gate_time(name: &'static str, key: &'static str, default: f32) -> Self {
        Self {
            name,
            key,
            unit: ParamUnit::Milliseconds,
            min: 0.0,
            max: 10_000.0,
            default,
            step: 1.0,
            group: "gate",
        }
    }

    /// Clamps a value to this setting's valid range.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mutewatch_core::find_setting;
    ///
    /// let open = find_setting("open_threshold_db").unwrap();
    /// assert_eq!(open.clamp(-120.0), -96.0);
    /// assert_eq!(open.clamp(6.0), 0.0);
    /// assert_eq!(open.clamp(-20.0), -20.0);
    /// ```
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }

    /// `true` if `value` lies inside `[min, max]`. NaN is never contained.
    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Every numeric setting, in display order.
pub static SETTING_PARAMS: [ParamDescriptor; 7] = [
    ParamDescriptor::threshold("Open Threshold", "open_threshold_db", -26.0),
    ParamDescriptor::threshold("Close Threshold", "close_threshold_db", -32.0),
    ParamDescriptor::gate_time("Attack Time", "attack_ms", 25.0),
    ParamDescriptor::gate_time("Hold Time", "hold_ms", 200.0),
    ParamDescriptor::gate_time("Release Time", "release_ms", 150.0),
    ParamDescriptor {
        name: "Cooldown",
        key: "cooldown_ms",
        unit: ParamUnit::Milliseconds,
        min: 0.0,
        max: 10_000.0,
        default: 1500.0,
        step: 500.0,
        group: "notification",
    },
    ParamDescriptor {
        name: "Indicator Size",
        key: "indicator_size",
        unit: ParamUnit::Pixels,
        min: 5.0,
        max: 500.0,
        default: 45.0,
        step: 1.0,
        group: "notification",
    },
];

/// Looks up a setting by key.
pub fn find_setting(key: &str) -> Option<&'static ParamDescriptor> {
    SETTING_PARAMS.iter().find(|p| p.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::GateParams;

    #[test]
    fn test_defaults_match_gate_params() {
        let gate = GateParams::default();
        let get = |key| find_setting(key).unwrap().default;
        assert_eq!(get("open_threshold_db"), gate.open_threshold_db);
        assert_eq!(get("close_threshold_db"), gate.close_threshold_db);
        assert_eq!(get("attack_ms"), gate.attack_ms as f32);
        assert_eq!(get("hold_ms"), gate.hold_ms as f32);
        assert_eq!(get("release_ms"), gate.release_ms as f32);
    }

    #[test]
    fn test_defaults_in_range() {
        for p in &SETTING_PARAMS {
            assert!(p.contains(p.default), "{} default out of range", p.key);
            assert!(p.min < p.max, "{} has empty range", p.key);
            assert!(p.step > 0.0);
        }
    }

    #[test]
    fn test_keys_unique() {
        for (i, a) in SETTING_PARAMS.iter().enumerate() {
            for b in &SETTING_PARAMS[i + 1..] {
                assert_ne!(a.key, b.key);
            }
        }
    }

    #[test]
    fn test_contains_rejects_nan() {
        let p = find_setting("hold_ms").unwrap();
        assert!(!p.contains(f32::NAN));
        assert!(p.contains(0.0));
        assert!(p.contains(10_000.0));
        assert!(!p.contains(10_000.5));
    }

    #[test]
    fn test_unknown_key() {
        assert!(find_setting("gain").is_none());
    }
}
