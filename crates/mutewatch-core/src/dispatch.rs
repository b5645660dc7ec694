//! Notification dispatch to the playback and indicator collaborators.
//!
//! The dispatcher is stateless apart from the collaborators it owns. Both
//! collaborators are fire-and-forget: failures are their own business (log
//! and move on) and never feed back into the trigger decision.

use crate::trigger::Trigger;

/// Playback collaborator that plays the audible cue.
pub trait CuePlayer {
    /// Rewind the cue to its first frame and start playing it.
    ///
    /// Must not block and must not fail loudly; errors are logged by the
    /// implementation.
    fn restart_and_play(&mut self);

    /// Length of the cue in milliseconds; widens the debounce window.
    fn cue_length_ms(&self) -> u64 {
        0
    }
}

/// On-screen indicator collaborator.
pub trait IndicatorSink {
    /// Ask the indicator to become visible for `timeout_ms` at `diameter_px`.
    ///
    /// Non-blocking; overwrites any request that has not been picked up yet.
    fn queue_show(&self, timeout_ms: u32, diameter_px: u32);
}

/// No playback collaborator.
impl CuePlayer for () {
    fn restart_and_play(&mut self) {}
}

/// No indicator collaborator.
impl IndicatorSink for () {
    fn queue_show(&self, _timeout_ms: u32, _diameter_px: u32) {}
}

impl<P: CuePlayer> CuePlayer for Option<P> {
    fn restart_and_play(&mut self) {
        if let Some(player) = self {
            player.restart_and_play();
        }
    }

    fn cue_length_ms(&self) -> u64 {
        self.as_ref().map_or(0, CuePlayer::cue_length_ms)
    }
}

impl<I: IndicatorSink> IndicatorSink for Option<I> {
    fn queue_show(&self, timeout_ms: u32, diameter_px: u32) {
        if let Some(indicator) = self {
            indicator.queue_show(timeout_ms, diameter_px);
        }
    }
}

/// Which notifications to emit and how large the indicator is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Play the audible cue on trigger.
    pub audio_cue: bool,
    /// Show the on-screen indicator on trigger.
    pub visual_cue: bool,
    /// Indicator diameter in pixels.
    pub indicator_diameter_px: u32,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            audio_cue: false,
            visual_cue: true,
            indicator_diameter_px: 45,
        }
    }
}

/// Forwards triggers to the enabled collaborators.
#[derive(Debug)]
pub struct Dispatcher<P, I> {
    player: P,
    indicator: I,
}

impl<P: CuePlayer, I: IndicatorSink> Dispatcher<P, I> {
    /// Create a dispatcher owning both collaborators.
    pub fn new(player: P, indicator: I) -> Self {
        Self { player, indicator }
    }

    /// Emit the notifications enabled in `cfg` for `trigger`.
    ///
    /// The cue starts first, then the indicator is queued for
    /// [`Trigger::indicator_timeout_ms`].
    pub fn dispatch(&mut self, trigger: &Trigger, cfg: &DispatchConfig) {
        if cfg.audio_cue {
            self.player.restart_and_play();
        }
        if cfg.visual_cue {
            self.indicator
                .queue_show(trigger.indicator_timeout_ms(), cfg.indicator_diameter_px);
        }
    }

    /// Length of the cue the playback collaborator would play.
    pub fn cue_length_ms(&self) -> u64 {
        self.player.cue_length_ms()
    }

    /// Shared access to the playback collaborator.
    pub fn player(&self) -> &P {
        &self.player
    }

    /// Shared access to the indicator collaborator.
    pub fn indicator(&self) -> &I {
        &self.indicator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    #[derive(Default)]
    struct CountingPlayer {
        plays: u32,
    }

    impl CuePlayer for CountingPlayer {
        fn restart_and_play(&mut self) {
            self.plays += 1;
        }

        fn cue_length_ms(&self) -> u64 {
            2000
        }
    }

    #[derive(Default)]
    struct LastShow {
        last: Cell<Option<(u32, u32)>>,
    }

    impl IndicatorSink for LastShow {
        fn queue_show(&self, timeout_ms: u32, diameter_px: u32) {
            self.last.set(Some((timeout_ms, diameter_px)));
        }
    }

    const TRIGGER: Trigger = Trigger {
        fired_at_ms: 0,
        cooldown_ms: 1500,
    };

    #[test]
    fn test_defaults_show_indicator_only() {
        let mut d = Dispatcher::new(CountingPlayer::default(), LastShow::default());
        d.dispatch(&TRIGGER, &DispatchConfig::default());
        assert_eq!(d.player().plays, 0);
        assert_eq!(d.indicator().last.get(), Some((1050, 45)));
    }

    #[test]
    fn test_both_enabled() {
        let mut d = Dispatcher::new(CountingPlayer::default(), LastShow::default());
        let cfg = DispatchConfig {
            audio_cue: true,
            visual_cue: true,
            indicator_diameter_px: 120,
        };
        d.dispatch(&TRIGGER, &cfg);
        d.dispatch(&TRIGGER, &cfg);
        assert_eq!(d.player().plays, 2);
        assert_eq!(d.indicator().last.get(), Some((1050, 120)));
    }

    #[test]
    fn test_both_disabled() {
        let mut d = Dispatcher::new(CountingPlayer::default(), LastShow::default());
        let cfg = DispatchConfig {
            audio_cue: false,
            visual_cue: false,
            indicator_diameter_px: 45,
        };
        d.dispatch(&TRIGGER, &cfg);
        assert_eq!(d.player().plays, 0);
        assert_eq!(d.indicator().last.get(), None);
    }

    #[test]
    fn test_optional_collaborators() {
        let mut d = Dispatcher::new(None::<CountingPlayer>, Some(LastShow::default()));
        assert_eq!(d.cue_length_ms(), 0);
        d.dispatch(&TRIGGER, &DispatchConfig::default());
        assert!(d.indicator().as_ref().unwrap().last.get().is_some());

        let d = Dispatcher::new(Some(CountingPlayer::default()), ());
        assert_eq!(d.cue_length_ms(), 2000);
    }
}
