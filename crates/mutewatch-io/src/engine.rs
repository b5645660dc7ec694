//! Audio-thread engine driving the detection pipeline.

use std::sync::Arc;

use mutewatch_config::SharedConfig;
use mutewatch_core::{
    BlockOutcome, Clock, CuePlayer, IndicatorSink, MonitorConfig, MuteMonitor, MuteState,
};

/// Runs [`MuteMonitor`] against the latest published configuration.
///
/// One engine lives on the capture thread. At the start of every block it
/// loads the current [`SharedConfig`] snapshot; adopting a new snapshot
/// resets the gate but keeps the cooldown timer running.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use mutewatch_config::{Settings, SharedConfig};
/// use mutewatch_core::BlockOutcome;
/// use mutewatch_io::{MonitorEngine, MuteFlag, SystemClock};
///
/// let shared = Arc::new(SharedConfig::new(Settings::default().monitor_config(48000.0, 1)));
/// let mute = MuteFlag::new(false);
/// let mut engine = MonitorEngine::new(Arc::clone(&shared), 1, (), (), mute.clone(), SystemClock::new());
///
/// assert_eq!(engine.process(&[0.5; 256]), BlockOutcome::Bypassed);
/// mute.set(true);
/// assert!(matches!(engine.process(&[0.5; 256]), BlockOutcome::Fired(_)));
/// ```
pub struct MonitorEngine<P, I, M, C> {
    monitor: MuteMonitor<P, I>,
    shared: Arc<SharedConfig>,
    current: Arc<MonitorConfig>,
    channels: usize,
    mute: M,
    clock: C,
    fired: u64,
}

impl<P, I, M, C> MonitorEngine<P, I, M, C>
where
    P: CuePlayer,
    I: IndicatorSink,
    M: MuteState,
    C: Clock,
{
    /// Create an engine for an interleaved stream with `channels` channels.
    pub fn new(
        shared: Arc<SharedConfig>,
        channels: usize,
        player: P,
        indicator: I,
        mute: M,
        clock: C,
    ) -> Self {
        let current = shared.load_full();
        Self {
            monitor: MuteMonitor::new(player, indicator),
            shared,
            current,
            channels,
            mute,
            clock,
            fired: 0,
        }
    }

    /// Process one interleaved capture block.
    pub fn process(&mut self, samples: &[f32]) -> BlockOutcome {
        self.refresh_config();

        let muted = self.mute.is_muted();
        let now_ms = self.clock.now_ms();
        let outcome =
            self.monitor
                .process_interleaved(&self.current, muted, now_ms, samples, self.channels);

        if let BlockOutcome::Fired(trigger) = outcome {
            self.fired += 1;
            tracing::debug!(
                at_ms = trigger.fired_at_ms,
                indicator_ms = trigger.indicator_timeout_ms(),
                count = self.fired,
                "muted speech detected"
            );
        }
        outcome
    }

    fn refresh_config(&mut self) {
        let snapshot = self.shared.load();
        if !Arc::ptr_eq(&snapshot, &self.current) {
            // SharedConfig still holds the replaced snapshot; this is not the last drop.
            self.current = Arc::clone(&snapshot);
            self.monitor.reset_gate();
            tracing::debug!("adopted new monitor config");
        }
    }

    /// Number of notifications fired so far.
    pub fn fired_count(&self) -> u64 {
        self.fired
    }

    /// The wrapped monitor.
    pub fn monitor(&self) -> &MuteMonitor<P, I> {
        &self.monitor
    }

    /// Configuration used for the most recent block.
    pub fn config(&self) -> &MonitorConfig {
        &self.current
    }
}

impl<P, I, M, C> std::fmt::Debug for MonitorEngine<P, I, M, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorEngine")
            .field("channels", &self.channels)
            .field("fired", &self.fired)
            .finish_non_exhaustive()
    }
}
