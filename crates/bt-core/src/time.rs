//! Per-context time model.
//!
//! # Design
//!
//! Every context counts the frames (ticks) it has executed and the simulated
//! time that has elapsed since it was created.  The scheduler advances both
//! once per completed tick:
//!
//!   elapsed_millis += step_millis
//!
//! Integer milliseconds are the canonical unit so frame arithmetic is exact;
//! [`ContextClock::elapsed_secs`] is a derived convenience.  Applications that
//! drive time from an external source (a game loop's real delta, a replay)
//! overwrite the counters with the explicit setters instead.

use std::fmt;

/// Frame and elapsed-time counters of one context.
///
/// `ContextClock` is cheap to copy and holds no heap data.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContextClock {
    /// Completed ticks since the context was created.
    pub frames: u64,
    /// Simulated milliseconds since the context was created.
    pub elapsed_millis: i64,
    /// Milliseconds added per completed tick.  `0` leaves time to the caller.
    pub step_millis: u32,
}

impl ContextClock {
    /// A clock at frame 0 that advances `step_millis` per tick.
    pub fn new(step_millis: u32) -> Self {
        Self { frames: 0, elapsed_millis: 0, step_millis }
    }

    /// Advance by one completed tick.
    #[inline]
    pub fn advance(&mut self) {
        self.frames += 1;
        self.elapsed_millis += self.step_millis as i64;
    }

    /// Elapsed time in (fractional) seconds.
    #[inline]
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_millis as f64 / 1_000.0
    }

    /// Overwrite the frame counter (externally driven time).
    #[inline]
    pub fn set_frames(&mut self, frames: u64) {
        self.frames = frames;
    }

    /// Overwrite the elapsed milliseconds (externally driven time).
    #[inline]
    pub fn set_elapsed_millis(&mut self, millis: i64) {
        self.elapsed_millis = millis;
    }

    /// Overwrite the elapsed time from seconds, rounding to the nearest ms.
    pub fn set_elapsed_secs(&mut self, secs: f64) {
        self.elapsed_millis = (secs * 1_000.0).round() as i64;
    }
}

impl fmt::Display for ContextClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "F{} ({:.3}s)", self.frames, self.elapsed_secs())
    }
}
