//! One-slot handoff from the audio thread to the indicator loop.
//!
//! The pending request lives in a single `AtomicU64`:
//!
//! ```text
//! bit 63      pending flag
//! bits 32..63 timeout in ms (31 bits, saturated)
//! bits 0..32  diameter in px
//! ```
//!
//! Posting overwrites whatever is pending; taking clears the slot. There is
//! no queue, so the last request before a poll is the one that is shown.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use mutewatch_core::IndicatorSink;

const PENDING: u64 = 1 << 63;
const TIMEOUT_MAX: u32 = (1 << 31) - 1;

/// A request to show the indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShowRequest {
    /// How long to stay visible, measured from when the indicator appears.
    /// Zero means the indicator stays hidden.
    pub timeout_ms: u32,
    /// Indicator diameter in pixels.
    pub diameter_px: u32,
}

impl ShowRequest {
    fn encode(self) -> u64 {
        let timeout = u64::from(self.timeout_ms.min(TIMEOUT_MAX));
        PENDING | (timeout << 32) | u64::from(self.diameter_px)
    }

    fn decode(bits: u64) -> Option<Self> {
        (bits & PENDING != 0).then(|| Self {
            timeout_ms: ((bits >> 32) as u32) & TIMEOUT_MAX,
            diameter_px: bits as u32,
        })
    }
}

/// Cloneable, lock-free pending-show slot.
///
/// # Example
///
/// ```rust
/// use mutewatch_core::IndicatorSink;
/// use mutewatch_indicator::{IndicatorMailbox, ShowRequest};
///
/// let mailbox = IndicatorMailbox::new();
/// let producer = mailbox.clone();
///
/// producer.queue_show(1050, 45);
/// producer.queue_show(700, 90);
///
/// assert_eq!(mailbox.take(), Some(ShowRequest { timeout_ms: 700, diameter_px: 90 }));
/// assert_eq!(mailbox.take(), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct IndicatorMailbox {
    slot: Arc<AtomicU64>,
}

impl IndicatorMailbox {
    /// Create an empty mailbox.
    pub fn new() -> Self {
        Self::default()
    }

    /// Post a request, replacing any that has not been taken yet.
    pub fn post(&self, request: ShowRequest) {
        self.slot.store(request.encode(), Ordering::Release);
    }

    /// Take the pending request, leaving the slot empty.
    pub fn take(&self) -> Option<ShowRequest> {
        ShowRequest::decode(self.slot.swap(0, Ordering::AcqRel))
    }

    /// Whether a request is waiting.
    pub fn is_pending(&self) -> bool {
        self.slot.load(Ordering::Acquire) & PENDING != 0
    }
}

impl IndicatorSink for IndicatorMailbox {
    fn queue_show(&self, timeout_ms: u32, diameter_px: u32) {
        self.post(ShowRequest {
            timeout_ms,
            diameter_px,
        });
    }
}
