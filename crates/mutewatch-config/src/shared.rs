//! Runtime configuration snapshot shared with the audio thread.
//!
//! [`SharedConfig`] publishes complete [`MonitorConfig`] values through an
//! `ArcSwap`. The settings thread builds a new snapshot and swaps it in;
//! the audio thread loads whichever snapshot is current at the start of a
//! block. Readers never take a lock and never see a half-written value.
//!
//! The snapshot replaced by a publish is retained until the following
//! publish. A reader that drops its copy after adopting the new snapshot is
//! then never the last owner, so snapshots are freed on the publishing thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use arc_swap::{ArcSwap, ArcSwapOption};
use mutewatch_core::MonitorConfig;

/// Atomically swappable [`MonitorConfig`].
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use mutewatch_config::{Settings, SharedConfig};
///
/// let shared = SharedConfig::new(Settings::default().monitor_config(48000.0, 1));
/// let before = shared.load_full();
///
/// let mut settings = Settings::default();
/// settings.cooldown_ms = 4000;
/// shared.publish(settings.monitor_config(48000.0, 1));
///
/// assert_eq!(shared.load().cooldown_ms, 4000);
/// assert!(!Arc::ptr_eq(&before, &shared.load_full()));
/// assert_eq!(shared.generation(), 1);
/// ```
#[derive(Debug)]
pub struct SharedConfig {
    current: ArcSwap<MonitorConfig>,
    retired: ArcSwapOption<MonitorConfig>,
    generation: AtomicU64,
}

impl SharedConfig {
    /// Create with an initial snapshot (generation 0).
    pub fn new(initial: MonitorConfig) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
            retired: ArcSwapOption::empty(),
            generation: AtomicU64::new(0),
        }
    }

    /// Replace the current snapshot.
    ///
    /// The replaced snapshot is kept until the next call; the one retained by
    /// the previous call is released here.
    pub fn publish(&self, config: MonitorConfig) {
        let previous = self.current.swap(Arc::new(config));
        self.retired.store(Some(previous));
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::debug!(generation, "published monitor config");
    }

    /// Wait-free read of the current snapshot.
    pub fn load(&self) -> arc_swap::Guard<Arc<MonitorConfig>> {
        self.current.load()
    }

    /// Owned handle to the current snapshot.
    pub fn load_full(&self) -> Arc<MonitorConfig> {
        self.current.load_full()
    }

    /// Number of snapshots published since creation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }
}
