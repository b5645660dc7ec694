//! Timed show/hide state machine for the on-screen indicator.

use crate::mailbox::ShowRequest;
use crate::surface::IndicatorSurface;

/// Offset of the indicator from the top-left corner of the cursor's screen.
pub const SCREEN_MARGIN_PX: i32 = 10;

/// Visible change caused by a [`Overlay::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayChange {
    /// Nothing changed on screen.
    Unchanged,
    /// The indicator was (re)shown.
    Shown,
    /// The indicator was hidden.
    Hidden,
}

/// Indicator state, advanced by a periodic tick.
///
/// A shown indicator hides once more than `timeout_ms` has passed since it
/// appeared. The deadline is recomputed from the absolute start time on every
/// tick, so a newer request simply restarts the window.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overlay {
    visible: bool,
    timeout_ms: u32,
    start_ms: u64,
    diameter_px: u32,
}

impl Overlay {
    /// Create a hidden overlay.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the state machine.
    ///
    /// `pending` is the request taken from the mailbox since the last tick.
    /// A request with a zero timeout is consumed but leaves the indicator
    /// hidden.
    pub fn tick<S: IndicatorSurface + ?Sized>(
        &mut self,
        now_ms: u64,
        pending: Option<ShowRequest>,
        surface: &mut S,
    ) -> OverlayChange {
        let mut change = OverlayChange::Unchanged;

        if let Some(request) = pending {
            if request.timeout_ms == 0 {
                self.timeout_ms = 0;
                if self.visible {
                    self.hide(surface);
                    return OverlayChange::Hidden;
                }
                return OverlayChange::Unchanged;
            }

            self.start_ms = now_ms;
            self.timeout_ms = request.timeout_ms;
            self.diameter_px = request.diameter_px;
            surface.resize(request.diameter_px);
            surface.move_to_cursor_screen(SCREEN_MARGIN_PX);
            surface.set_visible(true);
            self.visible = true;
            change = OverlayChange::Shown;
        }

        if self.timeout_ms > 0 && now_ms.saturating_sub(self.start_ms) > u64::from(self.timeout_ms)
        {
            self.timeout_ms = 0;
            self.hide(surface);
            change = OverlayChange::Hidden;
        }

        change
    }

    fn hide<S: IndicatorSurface + ?Sized>(&mut self, surface: &mut S) {
        surface.set_visible(false);
        self.visible = false;
    }

    /// Whether the indicator is on screen.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// Diameter of the most recent show.
    pub fn diameter_px(&self) -> u32 {
        self.diameter_px
    }

    /// Remaining visible time at `now_ms`, if a hide is scheduled.
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        (self.timeout_ms > 0).then(|| {
            (self.start_ms + u64::from(self.timeout_ms)).saturating_sub(now_ms)
        })
    }
}
