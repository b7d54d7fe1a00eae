//! Time management utilities
//!
//! [`FrameTimer`] measures wall-clock frame time for the outer loop. [`GameTime`]
//! is the simulated clock advanced once per fixed step; behaviors and
//! routines only ever see the latter.

use std::time::Instant;

/// Wall-clock frame timer
///
/// Each [`FrameTimer::tick`] measures the real time since the previous one.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    last_tick: Instant,
    delta: f32,
    frames: u64,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameTimer {
    /// Timer starting now
    pub fn new() -> Self {
        Self {
            last_tick: Instant::now(),
            delta: 0.0,
            frames: 0,
        }
    }

    /// Mark the start of a frame, returns seconds since the last mark
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        self.delta = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        self.frames += 1;
        self.delta
    }

    /// Seconds measured by the last tick
    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// Ticks so far
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// Simulated game clock
#[derive(Debug, Clone, Default)]
pub struct GameTime {
    delta: f32,
    elapsed: f32,
    steps: u64,
}

impl GameTime {
    /// Create a clock at zero
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance by one step of `delta` seconds
    pub fn advance(&mut self, delta: f32) {
        self.delta = delta;
        self.elapsed += delta;
        self.steps += 1;
    }

    /// Length of the current step in seconds
    pub fn delta(&self) -> f32 {
        self.delta
    }

    /// Game time elapsed since the world started, in seconds
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Number of steps taken so far
    pub fn steps(&self) -> u64 {
        self.steps
    }
}
