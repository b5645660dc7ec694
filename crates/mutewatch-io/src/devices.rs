//! Audio device discovery via cpal.

use crate::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait};
use cpal::{Device, Host};

/// Extract device name via `description()` (cpal 0.17+).
pub(crate) fn device_name(device: &Device) -> std::result::Result<String, cpal::DeviceNameError> {
    device.description().map(|d| d.name().to_string())
}

/// Which way audio flows through a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Capture; monitored for speech.
    Input,
    /// Playback; where the audible cue plays.
    Output,
}

impl Direction {
    fn label(self) -> &'static str {
        match self {
            Direction::Input => "input",
            Direction::Output => "output",
        }
    }
}

/// One capture or playback endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioDevice {
    /// Human-readable device name.
    pub name: String,
    /// Capture or playback.
    pub direction: Direction,
    /// Channels of the default format, if the device reported one.
    pub channels: Option<u16>,
    /// Sample rate of the default format in Hz, if the device reported one.
    pub default_sample_rate: Option<u32>,
    /// Whether this is the host default for its direction.
    pub is_default: bool,
}

impl AudioDevice {
    /// One-line description for listings.
    ///
    /// # Example
    ///
    /// ```rust
    /// use mutewatch_io::{AudioDevice, Direction};
    ///
    /// let mic = AudioDevice {
    ///     name: "USB Headset".to_string(),
    ///     direction: Direction::Input,
    ///     channels: Some(1),
    ///     default_sample_rate: Some(48000),
    ///     is_default: true,
    /// };
    /// assert_eq!(mic.summary(), "USB Headset (48000 Hz, 1 ch, default input)");
    /// ```
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(rate) = self.default_sample_rate {
            parts.push(format!("{rate} Hz"));
        }
        if let Some(ch) = self.channels {
            parts.push(format!("{ch} ch"));
        }
        if parts.is_empty() {
            parts.push("no default format".to_string());
        }
        if self.is_default {
            parts.push(format!("default {}", self.direction.label()));
        }
        format!("{} ({})", self.name, parts.join(", "))
    }
}

/// Capture and playback devices, in the order `--input N` and `--output N`
/// index them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceList {
    pub inputs: Vec<AudioDevice>,
    pub outputs: Vec<AudioDevice>,
}

impl DeviceList {
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty() && self.outputs.is_empty()
    }
}

fn describe(device: &Device, direction: Direction, default_name: Option<&str>) -> AudioDevice {
    let name = device_name(device).unwrap_or_else(|_| "(unnamed)".to_string());
    let config = match direction {
        Direction::Input => device.default_input_config(),
        Direction::Output => device.default_output_config(),
    }
    .ok();

    AudioDevice {
        is_default: default_name == Some(name.as_str()),
        channels: config.as_ref().map(|c| c.channels()),
        default_sample_rate: config.as_ref().map(|c| c.sample_rate()),
        direction,
        name,
    }
}

fn describe_all<I>(devices: I, direction: Direction, default: Option<&Device>) -> Vec<AudioDevice>
where
    I: Iterator<Item = Device>,
{
    let default_name = default.and_then(|d| device_name(d).ok());
    devices
        .map(|d| describe(&d, direction, default_name.as_deref()))
        .collect()
}

/// List capture and playback devices separately.
pub fn list_devices() -> Result<DeviceList> {
    let host = cpal::default_host();
    let default_input = host.default_input_device();
    let default_output = host.default_output_device();

    let inputs = host
        .input_devices()
        .map_err(|e| Error::Stream(e.to_string()))?;
    let outputs = host
        .output_devices()
        .map_err(|e| Error::Stream(e.to_string()))?;

    Ok(DeviceList {
        inputs: describe_all(inputs, Direction::Input, default_input.as_ref()),
        outputs: describe_all(outputs, Direction::Output, default_output.as_ref()),
    })
}

/// The devices `watch` uses when none are named: (input, output).
pub fn default_device() -> Result<(Option<AudioDevice>, Option<AudioDevice>)> {
    let host = cpal::default_host();
    let input = host.default_input_device().map(|d| {
        let name = device_name(&d).ok();
        describe(&d, Direction::Input, name.as_deref())
    });
    let output = host.default_output_device().map(|d| {
        let name = device_name(&d).ok();
        describe(&d, Direction::Output, name.as_deref())
    });
    Ok((input, output))
}

/// Resolve an input device by name or index, or the default when `None`.
pub(crate) fn input_device(host: &Host, name_or_index: Option<&str>) -> Result<Device> {
    match name_or_index {
        Some(name) => {
            let devices: Vec<_> = host
                .input_devices()
                .map_err(|e| Error::Stream(e.to_string()))?
                .collect();
            find_device_from_list(&devices, name, "input")
        }
        None => host.default_input_device().ok_or(Error::NoDevice),
    }
}

/// Resolve an output device by name or index, or the default when `None`.
pub(crate) fn output_device(host: &Host, name_or_index: Option<&str>) -> Result<Device> {
    match name_or_index {
        Some(name) => {
            let devices: Vec<_> = host
                .output_devices()
                .map_err(|e| Error::Stream(e.to_string()))?
                .collect();
            find_device_from_list(&devices, name, "output")
        }
        None => host.default_output_device().ok_or(Error::NoDevice),
    }
}

/// Find a device from a list by index, exact name, or case-insensitive substring.
fn find_device_from_list(devices: &[Device], name_or_index: &str, kind: &str) -> Result<Device> {
    let names: Vec<Option<String>> = devices.iter().map(|d| device_name(d).ok()).collect();
    let index = pick_device(&names, name_or_index).ok_or_else(|| {
        Error::DeviceNotFound(format!("no {} device matching '{}'", kind, name_or_index))
    })?;
    Ok(devices[index].clone())
}

/// Index of the best match for `name_or_index` among device names.
///
/// A numeric query is an index; otherwise an exact name wins over the first
/// case-insensitive substring match.
pub(crate) fn pick_device(names: &[Option<String>], name_or_index: &str) -> Option<usize> {
    if let Ok(index) = name_or_index.parse::<usize>() {
        return (index < names.len()).then_some(index);
    }

    if let Some(index) = names
        .iter()
        .position(|n| n.as_deref() == Some(name_or_index))
    {
        return Some(index);
    }

    let search_lower = name_or_index.to_lowercase();
    let matches: Vec<usize> = names
        .iter()
        .enumerate()
        .filter(|(_, n)| {
            n.as_ref()
                .is_some_and(|n| n.to_lowercase().contains(&search_lower))
        })
        .map(|(i, _)| i)
        .collect();

    if matches.len() > 1 {
        tracing::warn!(
            query = name_or_index,
            count = matches.len(),
            "device query matches several devices, using the first"
        );
    }
    matches.first().copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<Option<String>> {
        vec![
            Some("Built-in Microphone".to_string()),
            None,
            Some("USB Headset".to_string()),
            Some("USB Headset Monitor".to_string()),
        ]
    }

    fn speakers() -> AudioDevice {
        AudioDevice {
            name: "Speakers".to_string(),
            direction: Direction::Output,
            channels: Some(2),
            default_sample_rate: Some(44100),
            is_default: true,
        }
    }

    #[test]
    fn test_summary_marks_default_output() {
        assert_eq!(speakers().summary(), "Speakers (44100 Hz, 2 ch, default output)");
    }

    #[test]
    fn test_summary_without_format() {
        let device = AudioDevice {
            channels: None,
            default_sample_rate: None,
            is_default: false,
            ..speakers()
        };
        assert_eq!(device.summary(), "Speakers (no default format)");
    }

    #[test]
    fn test_device_list_is_empty() {
        assert!(DeviceList::default().is_empty());
        let list = DeviceList {
            inputs: Vec::new(),
            outputs: vec![speakers()],
        };
        assert!(!list.is_empty());
    }

    #[test]
    fn test_pick_by_index() {
        assert_eq!(pick_device(&names(), "2"), Some(2));
        assert_eq!(pick_device(&names(), "9"), None);
    }

    #[test]
    fn test_exact_name_beats_substring() {
        assert_eq!(pick_device(&names(), "USB Headset Monitor"), Some(3));
        assert_eq!(pick_device(&names(), "USB Headset"), Some(2));
    }

    #[test]
    fn test_case_insensitive_substring() {
        assert_eq!(pick_device(&names(), "microphone"), Some(0));
        assert_eq!(pick_device(&names(), "usb"), Some(2));
        assert_eq!(pick_device(&names(), "bluetooth"), None);
    }
}
