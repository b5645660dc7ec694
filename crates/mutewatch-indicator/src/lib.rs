//! On-screen "you are muted" indicator for mutewatch.
//!
//! The audio thread posts show requests into an [`IndicatorMailbox`]; a
//! separate loop ticks an [`Overlay`] every [`POLL_INTERVAL`], shows the
//! indicator on an [`IndicatorSurface`] and hides it again once the request's
//! timeout has passed.
//!
//! ```text
//! audio thread ──queue_show──► mailbox ──take (every 100 ms)──► overlay ──► surface
//! ```
//!
//! Rendering is left to the surface. [`LogSurface`] is a headless surface
//! that reports through `tracing`.

mod mailbox;
mod overlay;
mod poll;
mod surface;

pub use mailbox::{IndicatorMailbox, ShowRequest};
pub use overlay::{Overlay, OverlayChange, SCREEN_MARGIN_PX};
pub use poll::{POLL_INTERVAL, run_poll_loop, spawn_indicator_thread};
pub use surface::{IndicatorSurface, LogSurface};
