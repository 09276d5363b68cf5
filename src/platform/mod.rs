//! Platform abstraction layer
//!
//! Converts wall-clock frames into simulation milliseconds.

use std::time::{Duration, Instant};

/// Longest frame fed to the simulation; a stalled process does not
/// burn through the countdown in one jump.
pub const MAX_FRAME_MS: u64 = 250;

/// Measures elapsed wall time between frames
#[derive(Debug)]
pub struct FrameClock {
    last: Instant,
    /// Sub-millisecond remainder carried to the next frame
    carry: Duration,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            carry: Duration::ZERO,
        }
    }

    /// Milliseconds since the previous call
    pub fn tick(&mut self) -> u64 {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last);
        self.last = now;
        self.frame_ms(elapsed)
    }

    /// Convert a frame duration to whole milliseconds, keeping the remainder
    pub fn frame_ms(&mut self, elapsed: Duration) -> u64 {
        let total = self.carry + elapsed;
        let ms = total.as_millis() as u64;
        self.carry = total - Duration::from_millis(ms);
        if ms > MAX_FRAME_MS {
            log::debug!("frame of {}ms clamped", ms);
            self.carry = Duration::ZERO;
            return MAX_FRAME_MS;
        }
        ms
    }
}
