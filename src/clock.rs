//! Frame clock driving per-drawable update callbacks.

use std::time::Instant;

/// Monotonic frame clock.
///
/// Tracks elapsed time since construction and the delta since the previous
/// `tick()`. Passed by reference into each drawable's update callback once
/// per frame.
#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last_tick: Instant,
    delta_seconds: f32,
    total_seconds: f64,
    frame_number: u64,
}

impl FrameClock {
    /// Create a clock starting now
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last_tick: now,
            delta_seconds: 0.0,
            total_seconds: 0.0,
            frame_number: 0,
        }
    }

    /// Advance the clock by one frame
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.delta_seconds = now.duration_since(self.last_tick).as_secs_f32();
        self.total_seconds = now.duration_since(self.start).as_secs_f64();
        self.last_tick = now;
        self.frame_number += 1;
    }

    /// Seconds elapsed between the two most recent ticks
    pub fn delta_seconds(&self) -> f32 {
        self.delta_seconds
    }

    /// Seconds elapsed since the clock was created
    pub fn total_seconds(&self) -> f64 {
        self.total_seconds
    }

    /// Number of ticks so far
    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_clock_is_zeroed() {
        let clock = FrameClock::new();
        assert_eq!(clock.delta_seconds(), 0.0);
        assert_eq!(clock.frame_number(), 0);
    }

    #[test]
    fn test_tick_advances_frame_number() {
        let mut clock = FrameClock::new();
        clock.tick();
        clock.tick();
        assert_eq!(clock.frame_number(), 2);
        assert!(clock.total_seconds() >= 0.0);
    }
}
