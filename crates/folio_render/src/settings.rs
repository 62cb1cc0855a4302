//! Scene settings derived from a device profile

use folio_core::glam::Vec3;
use folio_core::scene::Rgb;
use folio_env::DeviceProfile;

/// Highest device pixel ratio the scene renders at.
pub const MAX_PIXEL_RATIO: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerMode {
    LowPower,
    HighPerformance,
}

/// Linear distance fog towards the page background colour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Rgb,
    pub near: f32,
    pub far: f32,
}

impl Fog {
    /// Blend factor at view depth `depth`, 0 = clear, 1 = fully fogged.
    pub fn factor(&self, depth: f32) -> f32 {
        if self.far <= self.near {
            return 0.0;
        }
        ((depth - self.near) / (self.far - self.near)).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneSettings {
    pub camera: Camera,
    pub fog: Fog,
    pub pixel_ratio: f32,
    pub antialias: bool,
    pub power: PowerMode,
    pub shape_opacity: f32,
    pub particle_opacity: f32,
    /// Particle size in CSS pixels, not attenuated by distance.
    pub particle_size: f32,
    /// Whether frames run continuously after the first draw.
    pub frame_loop: bool,
    pub max_shapes: u32,
    pub max_particles: u32,
    pub low_end: bool,
    pub reduced_motion: bool,
}

impl SceneSettings {
    pub fn from_profile(profile: &DeviceProfile) -> Self {
        let low_end = profile.is_low_end;
        Self {
            camera: Camera {
                position: Vec3::new(0.0, 0.0, 25.0),
                fov_y_degrees: 75.0,
                near: 0.1,
                far: 1000.0,
            },
            fog: Fog {
                color: Rgb::from_hex(0x0f172a),
                near: 30.0,
                far: 80.0,
            },
            pixel_ratio: profile.pixel_ratio.min(MAX_PIXEL_RATIO),
            antialias: !low_end,
            power: if profile.is_mobile { PowerMode::LowPower } else { PowerMode::HighPerformance },
            shape_opacity: if low_end { 0.4 } else { 0.6 },
            particle_opacity: if low_end { 0.5 } else { 0.7 },
            particle_size: if low_end { 1.0 } else { 1.5 },
            frame_loop: !profile.prefer_reduced_motion,
            max_shapes: profile.max_shapes,
            max_particles: profile.max_particles,
            low_end,
            reduced_motion: profile.prefer_reduced_motion,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capable_profile_gets_rich_settings() {
        let s = SceneSettings::from_profile(&DeviceProfile::CONSERVATIVE);
        assert!(s.antialias && s.frame_loop);
        assert_eq!(s.power, PowerMode::HighPerformance);
        assert_eq!(s.shape_opacity, 0.6);
        assert_eq!(s.particle_size, 1.5);
    }

    #[test]
    fn constrained_profile_dims_and_caps() {
        let profile = DeviceProfile {
            is_mobile: true,
            is_low_end: true,
            prefer_reduced_motion: true,
            pixel_ratio: 3.0,
            ..DeviceProfile::CONSERVATIVE
        };
        let s = SceneSettings::from_profile(&profile);
        assert_eq!(s.pixel_ratio, MAX_PIXEL_RATIO);
        assert!(!s.antialias && !s.frame_loop);
        assert_eq!(s.power, PowerMode::LowPower);
        assert_eq!(s.shape_opacity, 0.4);
        assert_eq!(s.particle_opacity, 0.5);
    }

    #[test]
    fn fog_ramps_between_near_and_far() {
        let fog = Fog { color: Rgb::new(0.0, 0.0, 0.0), near: 30.0, far: 80.0 };
        assert_eq!(fog.factor(10.0), 0.0);
        assert_eq!(fog.factor(55.0), 0.5);
        assert_eq!(fog.factor(200.0), 1.0);
    }
}
