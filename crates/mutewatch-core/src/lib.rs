//! mutewatch core - detection of "talking while muted" on a live audio stream.
//!
//! This crate holds the real-time part of mutewatch. It observes amplitude only;
//! it never mixes, filters, or rewrites the audio it is given.
//!
//! # Pipeline
//!
//! ```text
//! audio block ──► envelope ──► gate ──► debouncer ──► dispatcher ──► cue / indicator
//!                 (peaks)     (open?)   (cooldown)    (side effects)
//! ```
//!
//! - [`envelope`] - reduces a multichannel block to one peak per frame
//! - [`Gate`] - hysteresis open/close state machine with attack, hold and release
//! - [`Debouncer`] - cooldown-gated trigger decision, evaluated once per block
//! - [`Dispatcher`] - forwards a [`Trigger`] to the [`CuePlayer`] and [`IndicatorSink`]
//! - [`MuteMonitor`] - ties the above together and bypasses everything while unmuted
//!
//! # Real-time Behaviour
//!
//! Every call is synchronous and allocation-free. Processing is total over all
//! numeric input: silence, full-scale clipping and degenerate configurations
//! (zero sample rate, `open <= close` thresholds) produce odd but finite-time,
//! non-panicking behaviour. Validating settings is the caller's job.
//!
//! # Example
//!
//! ```rust
//! use mutewatch_core::{
//!     BlockOutcome, DispatchConfig, GateConfig, GateParams, MonitorConfig, MuteMonitor,
//! };
//!
//! let config = MonitorConfig {
//!     gate: GateConfig::new(&GateParams::default(), 48000.0, 1),
//!     cooldown_ms: 1500,
//!     dispatch: DispatchConfig::default(),
//! };
//! let mut monitor = MuteMonitor::new((), ());
//!
//! let loud = [0.1f32; 480];
//! let outcome = monitor.process_interleaved(&config, true, 0, &loud, 1);
//! assert!(matches!(outcome, BlockOutcome::Fired(_)));
//! ```
//!
//! # no_std Support
//!
//! Disable the default `std` feature to use the core on embedded targets:
//!
//! ```toml
//! [dependencies]
//! mutewatch-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod dispatch;
pub mod envelope;
pub mod gate;
pub mod math;
pub mod monitor;
pub mod param_info;
pub mod trigger;

pub use dispatch::{CuePlayer, DispatchConfig, Dispatcher, IndicatorSink};
pub use envelope::{frame_peak, interleaved_peaks, planar_peaks};
pub use gate::{Gate, GateConfig, GateParams, GatePhase, GateState};
pub use math::{db_to_linear, linear_to_db, ms_to_secs};
pub use monitor::{BlockOutcome, Clock, MonitorConfig, MuteMonitor, MuteState};
pub use param_info::{ParamDescriptor, ParamUnit, SETTING_PARAMS, find_setting};
pub use trigger::{Debouncer, INDICATOR_DURATION_RATIO, Trigger, TriggerTiming};
