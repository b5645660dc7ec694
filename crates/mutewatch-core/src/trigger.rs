//! Cooldown-gated trigger decision.
//!
//! The debouncer is consulted once per audio block with the gate state as of
//! the block's last frame. It fires when the gate is open and more than
//! `cue_length_ms + cooldown_ms` have passed since the previous firing, so a
//! new notification never starts while the previous audio cue could still be
//! playing.
//!
//! The window is purely time based. A block the host never delivers simply
//! delays the next opportunity; nothing is compensated or retried.

/// Share of the cooldown during which the on-screen indicator stays visible.
///
/// Shorter than the full cooldown so that continuous talking while muted
/// produces a blinking indicator rather than a solid one.
pub const INDICATOR_DURATION_RATIO: f32 = 0.7;

/// Timing that bounds how often notifications may fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TriggerTiming {
    /// Minimum quiet period after a cue has finished, in ms.
    pub cooldown_ms: u64,
    /// Length of the audio cue, in ms.
    pub cue_length_ms: u64,
}

impl TriggerTiming {
    /// Minimum spacing between two firings.
    #[inline]
    pub fn window_ms(&self) -> u64 {
        self.cue_length_ms.saturating_add(self.cooldown_ms)
    }
}

/// A notification decision emitted by the [`Debouncer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trigger {
    /// Clock time at which the trigger fired.
    pub fired_at_ms: u64,
    /// Cooldown in effect when the trigger fired.
    pub cooldown_ms: u64,
}

impl Trigger {
    /// How long the indicator should stay visible for this trigger.
    ///
    /// `0.7 × cooldown`, truncated to whole milliseconds and saturated to `u32`.
    ///
    /// # Example
    /// ```rust
    /// use mutewatch_core::Trigger;
    ///
    /// let t = Trigger { fired_at_ms: 0, cooldown_ms: 1500 };
    /// assert_eq!(t.indicator_timeout_ms(), 1050);
    /// ```
    pub fn indicator_timeout_ms(&self) -> u32 {
        // Float-to-int `as` saturates.
        (self.cooldown_ms as f32 * INDICATOR_DURATION_RATIO) as u32
    }
}

/// Decides whether to fire a notification now.
///
/// # Example
///
/// ```rust
/// use mutewatch_core::{Debouncer, TriggerTiming};
///
/// let timing = TriggerTiming { cooldown_ms: 1500, cue_length_ms: 2000 };
/// let mut debouncer = Debouncer::new();
///
/// assert!(debouncer.check(true, 0, &timing).is_some());
/// assert!(debouncer.check(true, 1000, &timing).is_none());
/// assert!(debouncer.check(true, 3600, &timing).is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Debouncer {
    last_fire_ms: Option<u64>,
}

impl Debouncer {
    /// Create a debouncer that has never fired.
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate the trigger rule.
    ///
    /// Fires iff `is_open` and `now_ms - last_fire > timing.window_ms()`.
    /// Before the first firing there is nothing to wait for. A clock reading
    /// earlier than the last firing counts as zero elapsed time.
    pub fn check(&mut self, is_open: bool, now_ms: u64, timing: &TriggerTiming) -> Option<Trigger> {
        if !is_open {
            return None;
        }

        let due = match self.last_fire_ms {
            Some(last) => now_ms.saturating_sub(last) > timing.window_ms(),
            None => true,
        };
        if !due {
            return None;
        }

        self.last_fire_ms = Some(now_ms);
        Some(Trigger {
            fired_at_ms: now_ms,
            cooldown_ms: timing.cooldown_ms,
        })
    }

    /// Clock time of the most recent firing, if any.
    pub fn last_fire_ms(&self) -> Option<u64> {
        self.last_fire_ms
    }

    /// Forget the previous firing.
    pub fn reset(&mut self) {
        self.last_fire_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMING: TriggerTiming = TriggerTiming {
        cooldown_ms: 1500,
        cue_length_ms: 2000,
    };

    #[test]
    fn test_closed_gate_never_fires() {
        let mut d = Debouncer::new();
        for t in (0..100_000).step_by(250) {
            assert!(d.check(false, t, &TIMING).is_none());
        }
        assert_eq!(d.last_fire_ms(), None);
    }

    #[test]
    fn test_window_is_strict() {
        let mut d = Debouncer::new();
        assert!(d.check(true, 10_000, &TIMING).is_some());
        assert!(d.check(true, 13_500, &TIMING).is_none(), "exactly the window");
        assert!(d.check(true, 13_501, &TIMING).is_some());
    }

    #[test]
    fn test_trigger_carries_cooldown() {
        let mut d = Debouncer::new();
        let t = d.check(true, 42, &TIMING).unwrap();
        assert_eq!(t.fired_at_ms, 42);
        assert_eq!(t.cooldown_ms, 1500);
        assert_eq!(t.indicator_timeout_ms(), 1050);
    }

    #[test]
    fn test_clock_going_backwards() {
        let mut d = Debouncer::new();
        assert!(d.check(true, 50_000, &TIMING).is_some());
        assert!(d.check(true, 100, &TIMING).is_none());
        assert_eq!(d.last_fire_ms(), Some(50_000));
    }

    #[test]
    fn test_missed_checks_are_not_compensated() {
        let mut d = Debouncer::new();
        assert!(d.check(true, 0, &TIMING).is_some());
        // A long gap yields exactly one firing, not one per elapsed window.
        assert!(d.check(true, 60_000, &TIMING).is_some());
        assert!(d.check(true, 60_001, &TIMING).is_none());
    }

    #[test]
    fn test_zero_window() {
        let timing = TriggerTiming::default();
        let mut d = Debouncer::new();
        assert!(d.check(true, 5, &timing).is_some());
        assert!(d.check(true, 5, &timing).is_none());
        assert!(d.check(true, 6, &timing).is_some());
    }

    #[test]
    fn test_window_saturates() {
        let timing = TriggerTiming {
            cooldown_ms: u64::MAX,
            cue_length_ms: 10,
        };
        assert_eq!(timing.window_ms(), u64::MAX);
    }

    #[test]
    fn test_reset() {
        let mut d = Debouncer::new();
        d.check(true, 0, &TIMING);
        d.reset();
        assert!(d.check(true, 1, &TIMING).is_some());
    }
}
