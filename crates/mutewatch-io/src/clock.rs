//! Clock and mute-state sources for the engine.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use mutewatch_core::{Clock, MuteState};

/// Monotonic wall clock in milliseconds since creation.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Start counting from now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Shared mute switch, set by the host and read on the audio thread.
#[derive(Debug, Clone, Default)]
pub struct MuteFlag(Arc<AtomicBool>);

impl MuteFlag {
    /// Create a flag in the given state.
    pub fn new(muted: bool) -> Self {
        Self(Arc::new(AtomicBool::new(muted)))
    }

    /// Set the mute state.
    pub fn set(&self, muted: bool) {
        self.0.store(muted, Ordering::Release);
    }

    /// Flip the mute state and return the new value.
    pub fn toggle(&self) -> bool {
        !self.0.fetch_xor(true, Ordering::AcqRel)
    }
}

impl MuteState for MuteFlag {
    fn is_muted(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
