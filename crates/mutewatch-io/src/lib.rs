//! Audio I/O layer for mutewatch.
//!
//! This crate provides:
//!
//! - **Device discovery**: [`list_devices`] and [`default_device`]
//! - **Capture**: [`CaptureDevice`] / [`CaptureStream`] for the monitored input
//! - **Audible cue**: [`CueSound`] (WAV decoding and format conversion),
//!   [`CuePlayback`] with a lock-free [`CueHandle`], and a [`CueSlot`] for
//!   replacing the cue at runtime
//! - **Engine**: [`MonitorEngine`] runs the detection pipeline per capture
//!   block against the latest published configuration
//! - **Clock and mute state**: [`SystemClock`] and [`MuteFlag`]
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use mutewatch_config::{Settings, SharedConfig};
//! use mutewatch_io::{CaptureDevice, CuePlayback, CueSlot, CueSound, MonitorEngine, MuteFlag, SystemClock};
//!
//! let settings = Settings::default();
//! let capture = CaptureDevice::open(None)?;
//! let shared = Arc::new(SharedConfig::new(
//!     settings.monitor_config(capture.sample_rate() as f32, capture.channels() as usize),
//! ));
//!
//! let playback = CuePlayback::open(&CueSound::load(settings.cue_path())?, None)?;
//! let cue = CueSlot::new();
//! cue.install(Some(&playback.handle()));
//! let mute = MuteFlag::new(true);
//! let mut engine = MonitorEngine::new(
//!     Arc::clone(&shared),
//!     capture.channels() as usize,
//!     cue.clone(),
//!     (),
//!     mute.clone(),
//!     SystemClock::new(),
//! );
//! let _stream = capture.start(move |block| {
//!     engine.process(block);
//! })?;
//! ```

mod capture;
mod clock;
mod cue;
mod devices;
mod engine;

pub use capture::{CaptureDevice, CaptureStream};
pub use clock::{MuteFlag, SystemClock};
pub use cue::{CueHandle, CuePlayback, CueSlot, CueSound};
pub use devices::{AudioDevice, DeviceList, Direction, default_device, list_devices};
pub use engine::MonitorEngine;

/// Error types for audio I/O operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// WAV file read error.
    #[error("WAV file error: {0}")]
    Wav(#[from] hound::Error),

    /// Audio stream setup or runtime error.
    #[error("Audio stream error: {0}")]
    Stream(String),

    /// No audio device available on the system.
    #[error("No audio device available")]
    NoDevice,

    /// The requested sample format is not supported.
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),

    /// The requested audio device was not found.
    #[error("Device not found: {0}")]
    DeviceNotFound(String),

    /// Standard I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result type for audio I/O operations.
pub type Result<T> = std::result::Result<T, Error>;
