//! Capability detection
//!
//! Classifies the device from one set of probe readings and assigns the
//! particle/shape budgets the background renderer may spend.

use serde::{Deserialize, Serialize};

use crate::probe::{EnvironmentProbe, ProbeReadings};

/// Widths at or below this are treated as mobile.
pub const MOBILE_MAX_WIDTH: u32 = 768;
/// Widths at or below this are treated as low-end regardless of other hints.
pub const LOW_END_MAX_WIDTH: u32 = 480;

const MOBILE_TOKENS: [&str; 8] = [
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

/// Particle and shape allowance for the background scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub max_particles: u32,
    pub max_shapes: u32,
}

impl Budget {
    pub const DESKTOP: Budget = Budget { max_particles: 1000, max_shapes: 8 };
    pub const MOBILE: Budget = Budget { max_particles: 200, max_shapes: 4 };
    pub const MOBILE_LOW_END: Budget = Budget { max_particles: 50, max_shapes: 2 };
    pub const LOW_END: Budget = Budget { max_particles: 300, max_shapes: 4 };
    /// Upper bound applied when the user prefers reduced motion.
    pub const REDUCED_MOTION_CAP: Budget = Budget { max_particles: 100, max_shapes: 2 };

    fn clamp_to(self, cap: Budget) -> Budget {
        Budget {
            max_particles: self.max_particles.min(cap.max_particles),
            max_shapes: self.max_shapes.min(cap.max_shapes),
        }
    }
}

/// Result of one detection pass. Recomputed wholesale, never patched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceProfile {
    pub is_mobile: bool,
    pub is_low_end: bool,
    pub prefer_reduced_motion: bool,
    pub pixel_ratio: f32,
    pub max_particles: u32,
    pub max_shapes: u32,
}

impl DeviceProfile {
    /// Profile used when the environment cannot be introspected.
    pub const CONSERVATIVE: DeviceProfile = DeviceProfile {
        is_mobile: false,
        is_low_end: false,
        prefer_reduced_motion: false,
        pixel_ratio: 1.0,
        max_particles: Budget::DESKTOP.max_particles,
        max_shapes: Budget::DESKTOP.max_shapes,
    };

    /// Classify one set of readings.
    pub fn from_readings(readings: &ProbeReadings) -> Self {
        let pixel_ratio = readings.pixel_ratio_or_default();
        let width = readings.viewport_width;

        let is_mobile = is_mobile_agent(&readings.user_agent) || width <= MOBILE_MAX_WIDTH;

        let is_low_end = readings.device_memory().is_some_and(|gb| gb <= 4.0)
            || readings.cores().is_some_and(|n| n <= 2)
            || (is_mobile && pixel_ratio > 2.0)
            || width <= LOW_END_MAX_WIDTH;

        let prefer_reduced_motion = readings.prefers_reduced_motion;

        let budget = assign_budget(is_mobile, is_low_end, prefer_reduced_motion);

        Self {
            is_mobile,
            is_low_end,
            prefer_reduced_motion,
            pixel_ratio,
            max_particles: budget.max_particles,
            max_shapes: budget.max_shapes,
        }
    }

    pub fn budget(&self) -> Budget {
        Budget {
            max_particles: self.max_particles,
            max_shapes: self.max_shapes,
        }
    }

    /// Whether the background should use the static fallback instead of the 3D scene.
    pub fn needs_fallback(&self) -> bool {
        self.is_mobile || self.is_low_end || self.prefer_reduced_motion
    }
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self::CONSERVATIVE
    }
}

/// Run one detection pass against `probe`.
pub fn detect(probe: &dyn EnvironmentProbe) -> DeviceProfile {
    match probe.readings() {
        Some(readings) => {
            let profile = DeviceProfile::from_readings(&readings);
            tracing::debug!(
                width = readings.viewport_width,
                mobile = profile.is_mobile,
                low_end = profile.is_low_end,
                reduced_motion = profile.prefer_reduced_motion,
                particles = profile.max_particles,
                shapes = profile.max_shapes,
                "device profile detected"
            );
            profile
        }
        None => {
            tracing::debug!("environment unavailable, using conservative profile");
            DeviceProfile::CONSERVATIVE
        }
    }
}

/// Budget policy. The mobile/low-end branch is decided first; the
/// reduced-motion cap is applied afterwards on every path.
pub fn assign_budget(is_mobile: bool, is_low_end: bool, prefer_reduced_motion: bool) -> Budget {
    let budget = if is_mobile {
        if is_low_end {
            Budget::MOBILE_LOW_END
        } else {
            Budget::MOBILE
        }
    } else if is_low_end {
        Budget::LOW_END
    } else {
        Budget::DESKTOP
    };

    if prefer_reduced_motion {
        budget.clamp_to(Budget::REDUCED_MOTION_CAP)
    } else {
        budget
    }
}

fn is_mobile_agent(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    MOBILE_TOKENS.iter().any(|token| ua.contains(token))
}
