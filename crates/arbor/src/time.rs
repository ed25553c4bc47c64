//! Frame timing handed to [`Scene::update`](crate::Scene::update).
//!
//! The host owns a [`TimeStep`] and advances it once per frame, either from
//! the wall clock ([`tick`](TimeStep::tick)) or by a fixed amount
//! ([`advance`](TimeStep::advance)) for deterministic stepping in tests and
//! tools. Systems receive it by reference.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct TimeStep {
    /// When the current frame started.
    frame_start: Instant,
    /// Duration of the previous frame.
    delta: Duration,
    /// Sum of all deltas so far.
    elapsed: Duration,
    frame_count: u64,
}

impl TimeStep {
    pub fn new() -> Self {
        Self {
            frame_start: Instant::now(),
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
        }
    }

    /// A step that has already advanced once by `delta`.
    pub fn fixed(delta: Duration) -> Self {
        let mut step = Self::new();
        step.advance(delta);
        step
    }

    /// Measure the time since the previous tick.
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.advance(now - self.frame_start);
        self.frame_start = now;
    }

    /// Advance by an explicit delta.
    pub fn advance(&mut self, delta: Duration) {
        self.delta = delta;
        self.elapsed += delta;
        self.frame_count += 1;
    }

    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Delta time in seconds (f32), the most common way to use it.
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for TimeStep {
    fn default() -> Self {
        Self::new()
    }
}
