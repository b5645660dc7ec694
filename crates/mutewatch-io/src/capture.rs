//! Input capture from the monitored device.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::devices::{device_name, input_device};
use crate::{Error, Result};

/// An input device resolved and ready to capture, with its stream format.
pub struct CaptureDevice {
    device: cpal::Device,
    config: cpal::StreamConfig,
    sample_format: cpal::SampleFormat,
    name: String,
}

impl CaptureDevice {
    /// Resolve the named (index, exact, or substring) or default input device.
    pub fn open(name_or_index: Option<&str>) -> Result<Self> {
        let host = cpal::default_host();
        let device = input_device(&host, name_or_index)?;
        let name = device_name(&device).unwrap_or_else(|_| "unknown".to_string());
        let supported = device
            .default_input_config()
            .map_err(|e| Error::Stream(e.to_string()))?;
        let sample_format = supported.sample_format();
        if !matches!(sample_format, cpal::SampleFormat::F32 | cpal::SampleFormat::I16) {
            return Err(Error::UnsupportedFormat(format!(
                "{name} captures {sample_format:?}, expected f32 or i16"
            )));
        }

        Ok(Self {
            device,
            config: supported.into(),
            sample_format,
            name,
        })
    }

    /// Whether the host has any input device at all.
    pub fn any_available() -> bool {
        cpal::default_host().default_input_device().is_some()
    }

    /// Device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Capture sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.config.sample_rate
    }

    /// Capture channel count.
    pub fn channels(&self) -> u16 {
        self.config.channels
    }

    /// Start capturing.
    ///
    /// `on_block` runs on the audio thread with interleaved f32 samples
    /// (`channels()` per frame) and must not block. 16-bit devices are
    /// converted into a scratch buffer that only grows.
    pub fn start<F>(self, mut on_block: F) -> Result<CaptureStream>
    where
        F: FnMut(&[f32]) + Send + 'static,
    {
        let on_error = |err: cpal::StreamError| tracing::error!(error = %err, "capture stream error");
        let stream = match self.sample_format {
            cpal::SampleFormat::I16 => {
                let mut scratch: Vec<f32> = Vec::new();
                self.device.build_input_stream(
                    &self.config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        scratch.clear();
                        scratch.extend(data.iter().map(|&s| f32::from(s) / 32768.0));
                        on_block(&scratch);
                    },
                    on_error,
                    None,
                )
            }
            _ => self.device.build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| on_block(data),
                on_error,
                None,
            ),
        }
        .map_err(|e| Error::Stream(e.to_string()))?;

        stream.play().map_err(|e| Error::Stream(e.to_string()))?;
        tracing::info!(
            device = %self.name,
            channels = self.config.channels,
            sample_rate = self.config.sample_rate,
            "capture stream started"
        );

        Ok(CaptureStream {
            _stream: stream,
            name: self.name,
            sample_rate: self.config.sample_rate,
            channels: self.config.channels,
        })
    }
}

impl std::fmt::Debug for CaptureDevice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureDevice")
            .field("name", &self.name)
            .field("sample_rate", &self.config.sample_rate)
            .field("channels", &self.config.channels)
            .field("sample_format", &self.sample_format)
            .finish_non_exhaustive()
    }
}

/// A running capture stream. Capture stops when dropped.
pub struct CaptureStream {
    _stream: cpal::Stream,
    name: String,
    sample_rate: u32,
    channels: u16,
}

impl CaptureStream {
    /// Device name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Capture sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Capture channel count.
    pub fn channels(&self) -> u16 {
        self.channels
    }
}

impl std::fmt::Debug for CaptureStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureStream")
            .field("name", &self.name)
            .field("sample_rate", &self.sample_rate)
            .field("channels", &self.channels)
            .finish_non_exhaustive()
    }
}
