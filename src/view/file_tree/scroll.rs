//! Reveal scrolling for auto-navigation
//!
//! The widget only says *which* row should come into view and over how
//! long (`TreeEvent::ScrollTo`); the host owns the scroll container and
//! plays the animation, optionally with [`ScrollAnimation`].

use std::f64::consts::PI;
use std::time::Duration;

/// Duration of the reveal animation
pub const DEFAULT_SCROLL_DURATION: Duration = Duration::from_millis(2000);

/// Swing easing: slow start, slow end
pub fn swing(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    0.5 - (t * PI).cos() / 2.0
}

/// Fixed-duration scroll from one offset to another
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollAnimation {
    from: f64,
    to: f64,
    duration: Duration,
}

impl ScrollAnimation {
    pub fn new(from: f64, to: f64, duration: Duration) -> Self {
        Self { from, to, duration }
    }

    /// Animation that moves `row` to the top of a container
    pub fn to_row(current_offset: f64, row: usize, row_height: f64, duration: Duration) -> Self {
        Self::new(current_offset, row as f64 * row_height, duration)
    }

    /// Offset at `elapsed` into the animation
    pub fn position_at(&self, elapsed: Duration) -> f64 {
        if self.duration.is_zero() || elapsed >= self.duration {
            return self.to;
        }
        let t = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.from + (self.to - self.from) * swing(t)
    }

    pub fn is_finished(&self, elapsed: Duration) -> bool {
        elapsed >= self.duration
    }

    pub fn target(&self) -> f64 {
        self.to
    }
}
