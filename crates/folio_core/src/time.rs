//! Frame time
//!
//! The host advances a [`FrameClock`] once per display refresh; all
//! animation is a function of the elapsed time it reports.

use std::time::Duration;

/// Nominal display refresh (60 Hz = 16.666ms per frame)
pub const REFRESH_RATE_HZ: u32 = 60;
pub const FRAME_DURATION: Duration = Duration::from_micros(16_666); // ~16.666ms

/// Elapsed time since the scene was mounted.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    frame_count: u64,
    elapsed: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Advance by one frame of length `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.frame_count += 1;
        self.elapsed += dt;
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }
}

/// Rolling window of frame durations.
#[derive(Debug, Clone)]
pub struct FrameStats {
    samples: Vec<Duration>,
    capacity: usize,
    index: usize,
}

impl FrameStats {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: Vec::with_capacity(capacity),
            capacity,
            index: 0,
        }
    }

    pub fn record(&mut self, frame: Duration) {
        if self.samples.len() < self.capacity {
            self.samples.push(frame);
        } else {
            self.samples[self.index] = frame;
        }
        self.index = (self.index + 1) % self.capacity;
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn average(&self) -> Duration {
        if self.samples.is_empty() {
            return Duration::ZERO;
        }
        let sum: Duration = self.samples.iter().sum();
        sum / self.samples.len() as u32
    }

    pub fn min_max(&self) -> (Duration, Duration) {
        let min = self.samples.iter().min().copied().unwrap_or_default();
        let max = self.samples.iter().max().copied().unwrap_or_default();
        (min, max)
    }

    pub fn fps(&self) -> f64 {
        let avg = self.average().as_secs_f64();
        if avg > 0.0 {
            1.0 / avg
        } else {
            0.0
        }
    }
}
