//! Where the indicator is drawn.

/// A window or widget that can display the indicator.
///
/// Implementations are driven from the indicator loop's own thread only.
pub trait IndicatorSurface {
    /// Set the indicator to a `diameter_px` circle.
    fn resize(&mut self, diameter_px: u32);

    /// Place the indicator `margin_px` from the top-left corner of the screen
    /// under the mouse cursor.
    fn move_to_cursor_screen(&mut self, margin_px: i32);

    /// Show or hide the indicator.
    fn set_visible(&mut self, visible: bool);
}

impl<S: IndicatorSurface + ?Sized> IndicatorSurface for Box<S> {
    fn resize(&mut self, diameter_px: u32) {
        (**self).resize(diameter_px);
    }

    fn move_to_cursor_screen(&mut self, margin_px: i32) {
        (**self).move_to_cursor_screen(margin_px);
    }

    fn set_visible(&mut self, visible: bool) {
        (**self).set_visible(visible);
    }
}

/// Headless surface that reports state changes through `tracing`.
#[derive(Debug, Default)]
pub struct LogSurface {
    diameter_px: u32,
    visible: bool,
}

impl LogSurface {
    /// Create a hidden surface.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the indicator would currently be on screen.
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

impl IndicatorSurface for LogSurface {
    fn resize(&mut self, diameter_px: u32) {
        self.diameter_px = diameter_px;
    }

    fn move_to_cursor_screen(&mut self, _margin_px: i32) {}

    fn set_visible(&mut self, visible: bool) {
        if visible {
            tracing::warn!(diameter_px = self.diameter_px, "you are talking while muted");
        } else if self.visible {
            tracing::debug!("indicator hidden");
        }
        self.visible = visible;
    }
}
