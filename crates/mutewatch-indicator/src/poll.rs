//! Fixed-interval indicator loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::mailbox::IndicatorMailbox;
use crate::overlay::Overlay;
use crate::surface::IndicatorSurface;

/// Interval between indicator ticks.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Tick `overlay` every `interval` until `running` is cleared.
///
/// Each tick takes whatever request is pending in `mailbox`. Time is measured
/// from the loop's start with a monotonic clock.
pub fn run_poll_loop<S: IndicatorSurface + ?Sized>(
    mailbox: &IndicatorMailbox,
    overlay: &mut Overlay,
    surface: &mut S,
    interval: Duration,
    running: &AtomicBool,
) {
    let origin = Instant::now();
    while running.load(Ordering::Acquire) {
        let now_ms = origin.elapsed().as_millis() as u64;
        overlay.tick(now_ms, mailbox.take(), surface);
        thread::sleep(interval);
    }
    if overlay.is_visible() {
        surface.set_visible(false);
    }
    tracing::debug!("indicator loop stopped");
}

/// Run [`run_poll_loop`] on a dedicated thread with [`POLL_INTERVAL`].
pub fn spawn_indicator_thread<S>(
    mailbox: IndicatorMailbox,
    mut surface: S,
    running: Arc<AtomicBool>,
) -> std::io::Result<JoinHandle<()>>
where
    S: IndicatorSurface + Send + 'static,
{
    thread::Builder::new()
        .name("mutewatch-indicator".to_string())
        .spawn(move || {
            let mut overlay = Overlay::new();
            run_poll_loop(&mailbox, &mut overlay, &mut surface, POLL_INTERVAL, &running);
        })
}
