//! Resize handling
//!
//! Re-runs detection on viewport changes, at most once per debounce window,
//! and reports a new profile only when it differs from the current one.

use std::time::{Duration, Instant};

use crate::probe::EnvironmentProbe;
use crate::profile::{detect, DeviceProfile};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(150);

pub struct ProfileWatcher {
    current: DeviceProfile,
    debounce: Duration,
    last_check: Option<Instant>,
    pending: bool,
}

impl ProfileWatcher {
    /// Start watching with an initial detection pass.
    pub fn new(probe: &dyn EnvironmentProbe, debounce: Duration) -> Self {
        Self {
            current: detect(probe),
            debounce,
            last_check: None,
            pending: false,
        }
    }

    pub fn current(&self) -> DeviceProfile {
        self.current
    }

    /// Whether a suppressed resize is waiting for [`ProfileWatcher::flush`].
    pub fn has_pending(&self) -> bool {
        self.pending
    }

    /// Handle a resize event. Returns the replacement profile when detection
    /// ran and produced a different result.
    pub fn on_resize(&mut self, probe: &dyn EnvironmentProbe, now: Instant) -> Option<DeviceProfile> {
        if let Some(last) = self.last_check {
            if now.saturating_duration_since(last) < self.debounce {
                self.pending = true;
                return None;
            }
        }
        self.check(probe, now)
    }

    /// Apply a resize that was suppressed by the debounce window, once the
    /// window has passed.
    pub fn flush(&mut self, probe: &dyn EnvironmentProbe, now: Instant) -> Option<DeviceProfile> {
        if !self.pending {
            return None;
        }
        match self.last_check {
            Some(last) if now.saturating_duration_since(last) < self.debounce => None,
            _ => self.check(probe, now),
        }
    }

    fn check(&mut self, probe: &dyn EnvironmentProbe, now: Instant) -> Option<DeviceProfile> {
        self.last_check = Some(now);
        self.pending = false;
        let next = detect(probe);
        if next == self.current {
            return None;
        }
        tracing::info!(
            mobile = next.is_mobile,
            low_end = next.is_low_end,
            particles = next.max_particles,
            shapes = next.max_shapes,
            "device profile changed"
        );
        self.current = next;
        Some(next)
    }
}
