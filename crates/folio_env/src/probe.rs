//! Environment probes
//!
//! Every ambient read the capability detector needs goes through
//! [`EnvironmentProbe`], so detection can run against a real host window
//! or against fixed readings.

use serde::{Deserialize, Serialize};

use crate::memory::HostMemory;

/// Environment variable that forces the reduced-motion preference on native hosts.
pub const REDUCED_MOTION_ENV: &str = "FOLIO_REDUCED_MOTION";

/// Raw values read from the environment in one detection pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeReadings {
    /// Viewport width in CSS (logical) pixels.
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub user_agent: String,
    pub prefers_reduced_motion: bool,
    /// Approximate installed memory in GB.
    pub device_memory_gb: Option<f32>,
    /// Logical core count.
    pub hardware_concurrency: Option<u32>,
    pub pixel_ratio: Option<f32>,
}

impl ProbeReadings {
    /// Device memory, with a zero reading treated as not exposed.
    pub fn device_memory(&self) -> Option<f32> {
        self.device_memory_gb.filter(|gb| *gb > 0.0)
    }

    /// Core count, with a zero reading treated as not exposed.
    pub fn cores(&self) -> Option<u32> {
        self.hardware_concurrency.filter(|n| *n > 0)
    }

    pub fn pixel_ratio_or_default(&self) -> f32 {
        match self.pixel_ratio {
            Some(ratio) if ratio > 0.0 => ratio,
            _ => 1.0,
        }
    }
}

impl Default for ProbeReadings {
    fn default() -> Self {
        Self {
            viewport_width: 1280,
            viewport_height: 720,
            user_agent: String::new(),
            prefers_reduced_motion: false,
            device_memory_gb: None,
            hardware_concurrency: None,
            pixel_ratio: None,
        }
    }
}

/// Source of environment readings.
pub trait EnvironmentProbe {
    /// Current readings, or `None` when introspection is unavailable
    /// (no window yet, non-interactive context).
    fn readings(&self) -> Option<ProbeReadings>;

    /// Record the window's physical size and scale factor. Probes that do
    /// not track a window ignore it.
    fn set_viewport(&mut self, _physical_width: u32, _physical_height: u32, _scale_factor: f64) {}
}

/// Probe that always answers with the same readings.
#[derive(Debug, Clone, Default)]
pub struct StaticProbe {
    readings: Option<ProbeReadings>,
}

impl StaticProbe {
    pub fn new(readings: ProbeReadings) -> Self {
        Self { readings: Some(readings) }
    }

    /// A probe for a context with nothing to introspect.
    pub fn unavailable() -> Self {
        Self { readings: None }
    }

    pub fn set(&mut self, readings: ProbeReadings) {
        self.readings = Some(readings);
    }
}

impl EnvironmentProbe for StaticProbe {
    fn readings(&self) -> Option<ProbeReadings> {
        self.readings.clone()
    }

    /// Moves the fixed viewport, keeping every other reading.
    fn set_viewport(&mut self, physical_width: u32, physical_height: u32, scale_factor: f64) {
        if physical_width == 0 || physical_height == 0 {
            return;
        }
        if let Some(readings) = self.readings.as_mut() {
            let scale = if scale_factor > 0.0 { scale_factor } else { 1.0 };
            let logical = |px: u32| (px as f64 / scale).round() as u32;
            readings.viewport_width = logical(physical_width);
            readings.viewport_height = logical(physical_height);
            readings.pixel_ratio = Some(scale as f32);
        }
    }
}

/// Probe backed by the native host: window metrics plus platform hardware hints.
#[derive(Debug, Clone)]
pub struct HostProbe {
    viewport: Option<(u32, u32)>,
    scale_factor: f64,
    reduced_motion: bool,
}

impl HostProbe {
    /// A probe with no window attached yet; `readings` returns `None`
    /// until a viewport is recorded.
    pub fn new() -> Self {
        Self {
            viewport: None,
            scale_factor: 1.0,
            reduced_motion: reduced_motion_from_env(),
        }
    }

    pub fn with_reduced_motion(mut self, reduced: bool) -> Self {
        self.reduced_motion = reduced;
        self
    }
}

impl Default for HostProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvironmentProbe for HostProbe {
    fn readings(&self) -> Option<ProbeReadings> {
        let (width, height) = self.viewport?;
        let logical = |px: u32| (px as f64 / self.scale_factor).round() as u32;
        Some(ProbeReadings {
            viewport_width: logical(width),
            viewport_height: logical(height),
            user_agent: host_user_agent(),
            prefers_reduced_motion: self.reduced_motion,
            device_memory_gb: HostMemory::detect().gib(),
            hardware_concurrency: u32::try_from(num_cpus::get()).ok(),
            pixel_ratio: Some(self.scale_factor as f32),
        })
    }

    /// A zero dimension (minimised window) keeps the last viewport.
    fn set_viewport(&mut self, physical_width: u32, physical_height: u32, scale_factor: f64) {
        if physical_width == 0 || physical_height == 0 {
            return;
        }
        self.viewport = Some((physical_width, physical_height));
        self.scale_factor = if scale_factor > 0.0 { scale_factor } else { 1.0 };
    }
}

/// User-agent style identifier for the native host.
pub fn host_user_agent() -> String {
    let platform = match std::env::consts::OS {
        "android" => "Linux; Android",
        "ios" => "iPhone; CPU iPhone OS",
        other => other,
    };
    format!(
        "Folio/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        platform,
        std::env::consts::ARCH
    )
}

fn reduced_motion_from_env() -> bool {
    std::env::var(REDUCED_MOTION_ENV)
        .map(|v| parse_flag(&v))
        .unwrap_or(false)
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_hints_count_as_unexposed() {
        let readings = ProbeReadings {
            device_memory_gb: Some(0.0),
            hardware_concurrency: Some(0),
            pixel_ratio: Some(0.0),
            ..ProbeReadings::default()
        };
        assert_eq!(readings.device_memory(), None);
        assert_eq!(readings.cores(), None);
        assert_eq!(readings.pixel_ratio_or_default(), 1.0);
    }

    #[test]
    fn host_probe_without_window_is_unavailable() {
        assert!(HostProbe::new().readings().is_none());
    }

    #[test]
    fn host_probe_reports_logical_viewport() {
        let mut probe = HostProbe::new().with_reduced_motion(true);
        probe.set_viewport(2560, 1440, 2.0);
        let readings = probe.readings().unwrap();
        assert_eq!(readings.viewport_width, 1280);
        assert_eq!(readings.viewport_height, 720);
        assert_eq!(readings.pixel_ratio, Some(2.0));
        assert!(readings.prefers_reduced_motion);
        assert!(readings.user_agent.starts_with("Folio/"));
    }

    #[test]
    fn minimised_window_keeps_last_viewport() {
        let mut probe = HostProbe::new();
        probe.set_viewport(0, 0, 1.0);
        assert!(probe.readings().is_none());

        probe.set_viewport(1920, 1080, 1.0);
        probe.set_viewport(0, 0, 1.0);
        probe.set_viewport(1920, 0, 1.0);
        let readings = probe.readings().unwrap();
        assert_eq!((readings.viewport_width, readings.viewport_height), (1920, 1080));
    }

    #[test]
    fn static_readings_follow_viewport() {
        let mut probe = StaticProbe::new(ProbeReadings {
            user_agent: "fixed".into(),
            ..ProbeReadings::default()
        });
        probe.set_viewport(1400, 900, 2.0);
        let readings = probe.readings().unwrap();
        assert_eq!((readings.viewport_width, readings.viewport_height), (700, 450));
        assert_eq!(readings.pixel_ratio, Some(2.0));
        assert_eq!(readings.user_agent, "fixed");

        probe.set_viewport(0, 900, 1.0);
        assert_eq!(probe.readings().unwrap().viewport_width, 700);

        let mut empty = StaticProbe::unavailable();
        empty.set_viewport(800, 600, 1.0);
        assert!(empty.readings().is_none());
    }

    #[test]
    fn flag_parsing() {
        assert!(parse_flag("1"));
        assert!(parse_flag(" TRUE "));
        assert!(!parse_flag("0"));
        assert!(!parse_flag(""));
    }
}
