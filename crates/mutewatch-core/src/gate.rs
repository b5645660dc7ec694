//! Hysteresis gate that classifies a loudness trajectory as open or closed.
//!
//! The gate opens on an instantaneous peak above the open threshold and closes
//! only once a decaying peak-tracking `level` falls below the close threshold.
//! Closing therefore follows the slower trajectory, so short dips between
//! syllables do not flap the gate.
//!
//! # Per-frame update
//!
//! Each frame runs four steps in a fixed order:
//!
//! 1. `cur_level > open_threshold` while closed → open
//! 2. `level < close_threshold` while open → closed, `held_time = 0`
//! 3. `level = max(level, cur_level) - decay_rate`
//! 4. open: `attenuation += attack_rate` (capped at 1);
//!    closed: `held_time += 1 / sample_rate`, and once past the hold time
//!    `attenuation -= release_rate` (floored at 0)
//!
//! Both comparisons are strict: a peak exactly at the open threshold does not
//! open the gate and a level exactly at the close threshold does not close it.
//!
//! # Attenuation
//!
//! The attenuation ramp mirrors a noise-gate gain curve but is never applied to
//! audio or consulted by the trigger decision. It is kept as observable state.
//!
//! # Thresholds
//!
//! `open_threshold > close_threshold` is expected and not checked. With
//! inverted thresholds the gate flaps rapidly; callers validate upstream.

use libm::{fmaxf, fminf};

use crate::envelope::{interleaved_peaks, planar_peaks};
use crate::math::{db_to_linear, ms_to_secs};

/// Fixed corner used to size the level decay: the level can fall across the
/// whole open→close span in `1/75` s.
pub const MIN_DECAY_RATE_HZ: f32 = 75.0;

/// User-facing gate settings.
///
/// | Field | Unit | Default |
/// |-------|------|---------|
/// | `open_threshold_db` | dB | -26.0 |
/// | `close_threshold_db` | dB | -32.0 |
/// | `attack_ms` | ms | 25 |
/// | `hold_ms` | ms | 200 |
/// | `release_ms` | ms | 150 |
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateParams {
    /// Peak level that opens the gate, in dB.
    pub open_threshold_db: f32,
    /// Tracked level below which the gate closes, in dB.
    pub close_threshold_db: f32,
    /// Time for the attenuation ramp to go from 0 to 1.
    pub attack_ms: u32,
    /// Time the gate must stay closed before release begins.
    pub hold_ms: u32,
    /// Time for the attenuation ramp to go from 1 to 0.
    pub release_ms: u32,
}

impl Default for GateParams {
    fn default() -> Self {
        Self {
            open_threshold_db: -26.0,
            close_threshold_db: -32.0,
            attack_ms: 25,
            hold_ms: 200,
            release_ms: 150,
        }
    }
}

/// Per-sample gate coefficients derived from [`GateParams`] and the stream format.
///
/// Rebuild the whole value whenever settings, sample rate or channel count
/// change; it is meant to be swapped in one piece, never patched field by field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateConfig {
    /// Linear peak threshold that opens the gate.
    pub open_threshold: f32,
    /// Linear level threshold that closes the gate.
    pub close_threshold: f32,
    /// Attenuation increment per sample while open.
    pub attack_rate: f32,
    /// Attenuation decrement per sample once the hold time has passed.
    pub release_rate: f32,
    /// Level decrement per sample.
    pub decay_rate: f32,
    /// Seconds the gate must stay closed before release starts.
    pub hold_seconds: f32,
    /// Stream sample rate in Hz.
    pub sample_rate: f32,
    /// Seconds per sample (`1 / sample_rate`).
    pub sample_period: f32,
    /// Number of channels inspected per frame.
    pub channel_count: usize,
}

impl GateConfig {
    /// Derive gate coefficients for a stream.
    ///
    /// No validation is performed. A zero sample rate or zero attack/release
    /// time yields infinite rates, which saturate the clamped ramps instantly.
    ///
    /// # Example
    /// ```rust
    /// use mutewatch_core::{GateConfig, GateParams};
    ///
    /// let cfg = GateConfig::new(&GateParams::default(), 48000.0, 2);
    /// assert!(cfg.open_threshold > cfg.close_threshold);
    /// assert!((cfg.attack_rate - 1.0 / 1200.0).abs() < 1e-9);
    /// ```
    pub fn new(params: &GateParams, sample_rate: f32, channel_count: usize) -> Self {
        let open_threshold = db_to_linear(params.open_threshold_db);
        let close_threshold = db_to_linear(params.close_threshold_db);

        let threshold_diff = open_threshold - close_threshold;
        let min_decay_period = (1.0 / MIN_DECAY_RATE_HZ) * sample_rate;

        Self {
            open_threshold,
            close_threshold,
            attack_rate: 1.0 / (ms_to_secs(params.attack_ms) * sample_rate),
            release_rate: 1.0 / (ms_to_secs(params.release_ms) * sample_rate),
            decay_rate: threshold_diff / min_decay_period,
            hold_seconds: ms_to_secs(params.hold_ms),
            sample_rate,
            sample_period: 1.0 / sample_rate,
            channel_count,
        }
    }
}

/// Binary gate classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatePhase {
    /// Signal considered absent.
    Closed,
    /// Signal considered present.
    Open,
}

/// Mutable gate state, updated once per frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GateState {
    /// Current hysteresis state.
    pub is_open: bool,
    /// Decaying peak-tracking loudness estimate.
    pub level: f32,
    /// Smoothed openness in `[0, 1]`.
    pub attenuation: f32,
    /// Seconds since the gate last closed.
    pub held_time: f32,
}

impl GateState {
    /// Current state as a [`GatePhase`].
    pub fn phase(&self) -> GatePhase {
        if self.is_open {
            GatePhase::Open
        } else {
            GatePhase::Closed
        }
    }
}

/// Hysteresis gate with attack, hold and release.
///
/// The gate owns its [`GateState`]; coefficients are borrowed per call so a
/// new [`GateConfig`] snapshot can be used on the very next block.
///
/// # Example
///
/// ```rust
/// use mutewatch_core::{Gate, GateConfig, GateParams, GatePhase};
///
/// let cfg = GateConfig::new(&GateParams::default(), 48000.0, 1);
/// let mut gate = Gate::new();
///
/// // -20 dB is above the -26 dB open threshold.
/// let open = gate.process_interleaved(&cfg, &[0.1; 64], 1);
/// assert!(open);
/// assert_eq!(gate.phase(), GatePhase::Open);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Gate {
    state: GateState,
}

impl Gate {
    /// Create a closed gate with zeroed level, attenuation and hold timer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the gate by one frame whose peak is `cur_level`.
    ///
    /// Returns the state after the frame.
    #[inline]
    pub fn process_level(&mut self, cfg: &GateConfig, cur_level: f32) -> bool {
        let s = &mut self.state;

        if cur_level > cfg.open_threshold && !s.is_open {
            s.is_open = true;
            #[cfg(feature = "tracing")]
            tracing::trace!(cur_level, "gate opened");
        }

        if s.level < cfg.close_threshold && s.is_open {
            s.held_time = 0.0;
            s.is_open = false;
            #[cfg(feature = "tracing")]
            tracing::trace!(level = s.level, "gate closed");
        }

        s.level = fmaxf(s.level, cur_level) - cfg.decay_rate;

        if s.is_open {
            s.attenuation = fminf(1.0, s.attenuation + cfg.attack_rate);
        } else {
            s.held_time += cfg.sample_period;
            if s.held_time > cfg.hold_seconds {
                s.attenuation = fmaxf(0.0, s.attenuation - cfg.release_rate);
            }
        }

        s.is_open
    }

    /// Run every frame of a planar block through the gate.
    ///
    /// Returns the state as of the last frame; a state that opened and closed
    /// again inside the block reads as closed.
    pub fn process_planar(&mut self, cfg: &GateConfig, channels: &[&[f32]]) -> bool {
        for cur_level in planar_peaks(channels, cfg.channel_count) {
            self.process_level(cfg, cur_level);
        }
        self.state.is_open
    }

    /// Run every frame of an interleaved block through the gate.
    ///
    /// `channels` is the interleave stride of `samples`.
    pub fn process_interleaved(&mut self, cfg: &GateConfig, samples: &[f32], channels: usize) -> bool {
        for cur_level in interleaved_peaks(samples, channels) {
            self.process_level(cfg, cur_level);
        }
        self.state.is_open
    }

    /// Force the gate closed without touching level, attenuation or hold timer.
    pub fn force_closed(&mut self) {
        self.state.is_open = false;
    }

    /// Return to the initial closed, silent state.
    pub fn reset(&mut self) {
        self.state = GateState::default();
    }

    /// Whether the gate is currently open.
    pub fn is_open(&self) -> bool {
        self.state.is_open
    }

    /// Current state as a [`GatePhase`].
    pub fn phase(&self) -> GatePhase {
        self.state.phase()
    }

    /// Snapshot of the full gate state.
    pub fn state(&self) -> GateState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: f32 = 48000.0;

    fn default_cfg() -> GateConfig {
        GateConfig::new(&GateParams::default(), SR, 1)
    }

    #[test]
    fn test_config_derivation() {
        let cfg = default_cfg();
        assert!((cfg.open_threshold - 0.050_118_7).abs() < 1e-6);
        assert!((cfg.close_threshold - 0.025_118_9).abs() < 1e-6);
        // 150 ms at 48 kHz = 7200 samples
        assert!((cfg.release_rate - 1.0 / 7200.0).abs() < 1e-9);
        // threshold span crossed in 640 samples (1/75 s)
        let span = cfg.open_threshold - cfg.close_threshold;
        assert!((cfg.decay_rate * 640.0 - span).abs() < 1e-6);
        assert!((cfg.hold_seconds - 0.2).abs() < 1e-7);
        assert!((cfg.sample_period - 1.0 / SR).abs() < 1e-12);
    }

    #[test]
    fn test_first_loud_frame_from_silence() {
        // From a zero level the close check fires in the same frame as the
        // open check, so the gate needs a second frame to settle open.
        let cfg = default_cfg();
        let mut gate = Gate::new();
        assert!(!gate.process_level(&cfg, 0.1));
        assert!(gate.process_level(&cfg, 0.1));
    }

    #[test]
    fn test_open_threshold_is_strict() {
        let cfg = default_cfg();
        let mut gate = Gate::new();
        for _ in 0..100 {
            gate.process_level(&cfg, cfg.open_threshold);
        }
        assert!(!gate.is_open());
    }

    #[test]
    fn test_close_threshold_is_strict() {
        // Zero decay keeps the level pinned at whatever peak it last saw.
        let mut cfg = default_cfg();
        cfg.decay_rate = 0.0;
        let mut gate = Gate::new();
        gate.state.level = cfg.close_threshold;
        gate.state.is_open = true;

        for _ in 0..100 {
            gate.process_level(&cfg, 0.0);
        }
        assert!(gate.is_open(), "level == close threshold must not close");
    }

    #[test]
    fn test_closes_after_level_decays() {
        let cfg = default_cfg();
        let mut gate = Gate::new();
        for _ in 0..100 {
            gate.process_level(&cfg, 0.1);
        }
        assert!(gate.is_open());

        // Level decays from ~0.1 to below ~0.025 in well under a second.
        let mut closed_at = None;
        for i in 0..48000 {
            if !gate.process_level(&cfg, 0.0) {
                closed_at = Some(i);
                break;
            }
        }
        let closed_at = closed_at.expect("gate should close on silence");
        // (0.1 - 0.0251) / decay_rate ≈ 1918 samples
        assert!((1800..2100).contains(&closed_at), "closed at {closed_at}");
    }

    #[test]
    fn test_attack_ramp_saturates() {
        let cfg = default_cfg();
        let mut gate = Gate::new();
        // 25 ms attack = 1200 samples
        for _ in 0..600 {
            gate.process_level(&cfg, 0.5);
        }
        let half = gate.state().attenuation;
        assert!(half > 0.4 && half < 0.6, "attenuation {half}");

        for _ in 0..10_000 {
            gate.process_level(&cfg, 0.5);
        }
        assert_eq!(gate.state().attenuation, 1.0);
    }

    #[test]
    fn test_hold_delays_release() {
        let cfg = default_cfg();
        let mut gate = Gate::new();
        for _ in 0..4800 {
            gate.process_level(&cfg, 0.5);
        }
        // Let the gate close, then stay inside the 200 ms hold.
        while gate.process_level(&cfg, 0.0) {}
        assert_eq!(gate.state().held_time, 0.0 + cfg.sample_period);
        for _ in 0..4800 {
            gate.process_level(&cfg, 0.0);
        }
        assert_eq!(gate.state().attenuation, 1.0, "still holding at 100 ms");

        // Past hold (200 ms) plus release (150 ms).
        for _ in 0..20_000 {
            gate.process_level(&cfg, 0.0);
        }
        assert_eq!(gate.state().attenuation, 0.0);
        assert!(!gate.is_open());
    }

    #[test]
    fn test_force_closed_keeps_level() {
        let cfg = default_cfg();
        let mut gate = Gate::new();
        gate.process_interleaved(&cfg, &[0.3; 32], 1);
        let before = gate.state();
        gate.force_closed();
        let after = gate.state();
        assert!(!after.is_open);
        assert_eq!(before.level, after.level);
        assert_eq!(before.attenuation, after.attenuation);
    }

    #[test]
    fn test_reset() {
        let cfg = default_cfg();
        let mut gate = Gate::new();
        gate.process_interleaved(&cfg, &[0.3; 32], 1);
        gate.reset();
        assert_eq!(gate.state(), GateState::default());
        assert_eq!(gate.phase(), GatePhase::Closed);
    }

    #[test]
    fn test_planar_and_interleaved_agree() {
        let cfg = GateConfig::new(&GateParams::default(), SR, 2);
        let left: Vec<f32> = (0..256).map(|i| if i % 50 < 10 { 0.2 } else { 0.0 }).collect();
        let right: Vec<f32> = (0..256).map(|i| if i % 70 < 5 { -0.4 } else { 0.01 }).collect();
        let interleaved: Vec<f32> = left.iter().zip(&right).flat_map(|(&l, &r)| [l, r]).collect();

        let mut a = Gate::new();
        let mut b = Gate::new();
        a.process_planar(&cfg, &[left.as_slice(), right.as_slice()]);
        b.process_interleaved(&cfg, &interleaved, 2);
        assert_eq!(a.state(), b.state());
    }

    #[test]
    fn test_degenerate_config_does_not_panic() {
        let params = GateParams {
            open_threshold_db: -40.0,
            close_threshold_db: -20.0,
            attack_ms: 0,
            hold_ms: 0,
            release_ms: 0,
        };
        for sr in [0.0, 1.0, 48000.0] {
            let cfg = GateConfig::new(&params, sr, 0);
            let mut gate = Gate::new();
            gate.process_interleaved(&cfg, &[1.0, 0.0, -1.0, 0.5], 1);
            let s = gate.state();
            assert!((0.0..=1.0).contains(&s.attenuation), "sr={sr}: {s:?}");
        }
    }
}
