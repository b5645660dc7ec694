//! Per-block pipeline: activation check, gate, debounce, dispatch.
//!
//! [`MuteMonitor`] is driven by the host once per audio block. It only
//! listens while the monitored source is muted; an unmuted source forces the
//! gate closed and skips everything else, because the notification exists to
//! flag speech that nobody can hear.

use crate::dispatch::{CuePlayer, DispatchConfig, Dispatcher, IndicatorSink};
use crate::gate::{Gate, GateConfig, GateState};
use crate::trigger::{Debouncer, Trigger, TriggerTiming};

/// Mute state of the monitored source.
pub trait MuteState {
    /// `true` while the user believes the source is muted.
    fn is_muted(&self) -> bool;
}

impl MuteState for bool {
    fn is_muted(&self) -> bool {
        *self
    }
}

/// Millisecond clock used for cooldown arithmetic.
///
/// Must be monotonic; the epoch is irrelevant.
pub trait Clock {
    /// Current time in milliseconds.
    fn now_ms(&self) -> u64;
}

/// Complete configuration snapshot consumed by one block.
///
/// Built off the audio thread and swapped in as a unit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonitorConfig {
    /// Gate coefficients for the current stream format.
    pub gate: GateConfig,
    /// Cooldown added to the cue length between firings, in ms.
    pub cooldown_ms: u64,
    /// Notification switches and indicator size.
    pub dispatch: DispatchConfig,
}

/// Result of processing one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOutcome {
    /// Source not muted; the gate was forced closed.
    Bypassed,
    /// Source muted, no notification this block.
    Listening {
        /// Gate state after the block's last frame.
        open: bool,
    },
    /// A notification fired.
    Fired(Trigger),
}

/// Detects speech on a muted source and dispatches notifications.
///
/// # Example
///
/// ```rust
/// use mutewatch_core::{
///     BlockOutcome, DispatchConfig, GateConfig, GateParams, MonitorConfig, MuteMonitor,
/// };
///
/// let config = MonitorConfig {
///     gate: GateConfig::new(&GateParams::default(), 48000.0, 1),
///     cooldown_ms: 1500,
///     dispatch: DispatchConfig::default(),
/// };
/// let mut monitor = MuteMonitor::new((), ());
/// let loud = [0.1f32; 480];
///
/// // Not muted: nothing happens no matter how loud.
/// assert_eq!(monitor.process_interleaved(&config, false, 0, &loud, 1), BlockOutcome::Bypassed);
///
/// // Muted and talking: fires.
/// assert!(matches!(
///     monitor.process_interleaved(&config, true, 0, &loud, 1),
///     BlockOutcome::Fired(_)
/// ));
/// ```
#[derive(Debug)]
pub struct MuteMonitor<P, I> {
    gate: Gate,
    debouncer: Debouncer,
    dispatcher: Dispatcher<P, I>,
}

impl<P: CuePlayer, I: IndicatorSink> MuteMonitor<P, I> {
    /// Create a monitor with a closed gate that has never fired.
    pub fn new(player: P, indicator: I) -> Self {
        Self {
            gate: Gate::new(),
            debouncer: Debouncer::new(),
            dispatcher: Dispatcher::new(player, indicator),
        }
    }

    /// Process one planar block (one slice per channel).
    pub fn process_planar(
        &mut self,
        cfg: &MonitorConfig,
        muted: bool,
        now_ms: u64,
        channels: &[&[f32]],
    ) -> BlockOutcome {
        if !muted {
            self.gate.force_closed();
            return BlockOutcome::Bypassed;
        }
        let open = self.gate.process_planar(&cfg.gate, channels);
        self.decide(cfg, open, now_ms)
    }

    /// Process one interleaved block with `channels` samples per frame.
    pub fn process_interleaved(
        &mut self,
        cfg: &MonitorConfig,
        muted: bool,
        now_ms: u64,
        samples: &[f32],
        channels: usize,
    ) -> BlockOutcome {
        if !muted {
            self.gate.force_closed();
            return BlockOutcome::Bypassed;
        }
        let open = self.gate.process_interleaved(&cfg.gate, samples, channels);
        self.decide(cfg, open, now_ms)
    }

    /// Single trigger check with the gate state as of the block's last frame.
    fn decide(&mut self, cfg: &MonitorConfig, open: bool, now_ms: u64) -> BlockOutcome {
        let timing = TriggerTiming {
            cooldown_ms: cfg.cooldown_ms,
            cue_length_ms: self.dispatcher.cue_length_ms(),
        };
        match self.debouncer.check(open, now_ms, &timing) {
            Some(trigger) => {
                self.dispatcher.dispatch(&trigger, &cfg.dispatch);
                BlockOutcome::Fired(trigger)
            }
            None => BlockOutcome::Listening { open },
        }
    }

    /// Reset the gate to its initial state, keeping the last firing time.
    ///
    /// Called when a new configuration snapshot is adopted.
    pub fn reset_gate(&mut self) {
        self.gate.reset();
    }

    /// Snapshot of the gate state.
    pub fn gate_state(&self) -> GateState {
        self.gate.state()
    }

    /// Clock time of the most recent notification.
    pub fn last_fire_ms(&self) -> Option<u64> {
        self.debouncer.last_fire_ms()
    }

    /// The dispatcher and its collaborators.
    pub fn dispatcher(&self) -> &Dispatcher<P, I> {
        &self.dispatcher
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::GateParams;

    fn config(cooldown_ms: u64) -> MonitorConfig {
        MonitorConfig {
            gate: GateConfig::new(&GateParams::default(), 48000.0, 1),
            cooldown_ms,
            dispatch: DispatchConfig::default(),
        }
    }

    struct FixedCue(u64);

    impl CuePlayer for FixedCue {
        fn restart_and_play(&mut self) {}

        fn cue_length_ms(&self) -> u64 {
            self.0
        }
    }

    #[test]
    fn test_unmuted_bypasses_and_closes() {
        let cfg = config(1500);
        let mut m = MuteMonitor::new((), ());
        let loud = [0.5f32; 256];
        m.process_interleaved(&cfg, true, 0, &loud, 1);
        assert!(m.gate_state().is_open);

        let level_before = m.gate_state().level;
        let outcome = m.process_interleaved(&cfg, false, 10_000, &loud, 1);
        assert_eq!(outcome, BlockOutcome::Bypassed);
        assert!(!m.gate_state().is_open);
        // Bypass does not run the envelope.
        assert_eq!(m.gate_state().level, level_before);
    }

    #[test]
    fn test_cue_length_widens_window() {
        let cfg = config(1500);
        let mut m = MuteMonitor::new(FixedCue(2000), ());
        let loud = [0.1f32; 480];
        assert!(matches!(
            m.process_interleaved(&cfg, true, 0, &loud, 1),
            BlockOutcome::Fired(_)
        ));
        assert_eq!(
            m.process_interleaved(&cfg, true, 3000, &loud, 1),
            BlockOutcome::Listening { open: true }
        );
        assert!(matches!(
            m.process_interleaved(&cfg, true, 3501, &loud, 1),
            BlockOutcome::Fired(_)
        ));
    }

    #[test]
    fn test_trigger_uses_last_frame_state() {
        let cfg = config(0);
        let mut m = MuteMonitor::new((), ());

        // Loud burst followed by enough silence to close inside the same block.
        let mut block = [0.0f32; 4800];
        block[..100].fill(0.1);
        let outcome = m.process_interleaved(&cfg, true, 0, &block, 1);
        assert_eq!(outcome, BlockOutcome::Listening { open: false });
        assert_eq!(m.last_fire_ms(), None);
    }

    #[test]
    fn test_reset_gate_keeps_last_fire() {
        let cfg = config(1500);
        let mut m = MuteMonitor::new((), ());
        m.process_interleaved(&cfg, true, 7, &[0.2; 64], 1);
        assert_eq!(m.last_fire_ms(), Some(7));
        m.reset_gate();
        assert_eq!(m.gate_state(), GateState::default());
        assert_eq!(m.last_fire_ms(), Some(7));
    }

    #[test]
    fn test_planar_path() {
        let cfg = MonitorConfig {
            gate: GateConfig::new(&GateParams::default(), 48000.0, 2),
            ..config(1500)
        };
        let mut m = MuteMonitor::new((), ());
        let quiet = [0.001f32; 128];
        let loud = [0.3f32; 128];
        let outcome = m.process_planar(&cfg, true, 0, &[quiet.as_slice(), loud.as_slice()]);
        assert!(matches!(outcome, BlockOutcome::Fired(_)));
    }

    #[test]
    fn test_mute_state_for_bool() {
        assert!(true.is_muted());
        assert!(!false.is_muted());
    }
}
