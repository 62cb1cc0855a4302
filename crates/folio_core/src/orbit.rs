//! Tech stack orbit
//!
//! Six technology badges circling a common centre at a constant angular
//! speed. Positions are a pure function of time and viewport width.

use std::f32::consts::TAU;

use glam::Vec2;

use crate::scene::Rgb;

/// Angular speed, radians per second.
pub const ORBIT_SPEED: f32 = 0.5;
/// Orbit radius in CSS pixels on wide viewports.
pub const ORBIT_RADIUS: f32 = 120.0;
/// Radius multiplier below [`COMPACT_BELOW_WIDTH`].
pub const COMPACT_SCALE: f32 = 0.6;
/// Viewports narrower than this get the compact orbit.
pub const COMPACT_BELOW_WIDTH: u32 = 768;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrbitEntry {
    pub name: &'static str,
    /// Packed `0xRRGGBB`.
    pub color: u32,
}

impl OrbitEntry {
    pub fn rgb(&self) -> Rgb {
        Rgb::from_hex(self.color)
    }
}

pub const TECH_STACK: [OrbitEntry; 6] = [
    OrbitEntry { name: "TypeScript", color: 0x60a5fa },
    OrbitEntry { name: "React", color: 0x22d3ee },
    OrbitEntry { name: "Next.js", color: 0xf8fafc },
    OrbitEntry { name: "Tailwind", color: 0x06b6d4 },
    OrbitEntry { name: "Node.js", color: 0x22c55e },
    OrbitEntry { name: "Three.js", color: 0xfbbf24 },
];

pub fn radius(viewport_width: u32) -> f32 {
    if viewport_width < COMPACT_BELOW_WIDTH {
        ORBIT_RADIUS * COMPACT_SCALE
    } else {
        ORBIT_RADIUS
    }
}

/// Offsets from the orbit centre, one per [`TECH_STACK`] entry, `t`
/// seconds into the animation. Positive y points down, as on screen.
pub fn positions(t: f32, viewport_width: u32) -> [Vec2; TECH_STACK.len()] {
    let r = radius(viewport_width);
    let count = TECH_STACK.len() as f32;
    std::array::from_fn(|i| {
        let angle = i as f32 * TAU / count + t * ORBIT_SPEED;
        Vec2::new(angle.cos(), angle.sin()) * r
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn entries_are_evenly_spaced_on_the_circle() {
        let points = positions(0.0, 1280);
        assert!(close(points[0], Vec2::new(120.0, 0.0)));
        for (i, p) in points.iter().enumerate() {
            assert!((p.length() - ORBIT_RADIUS).abs() < 1e-3);
            let next = points[(i + 1) % points.len()];
            assert!((p.angle_to(next) - TAU / 6.0).abs() < 1e-4);
        }
    }

    #[test]
    fn orbit_turns_with_time() {
        let start = positions(0.0, 1280);
        let later = positions(1.0, 1280);
        assert!(!close(start[0], later[0]));
        assert!((start[0].angle_to(later[0]) - ORBIT_SPEED).abs() < 1e-4);

        // one full turn takes 2π / speed seconds
        let lap = positions(TAU / ORBIT_SPEED, 1280);
        for (a, b) in start.iter().zip(lap.iter()) {
            assert!(close(*a, *b));
        }
    }

    #[test]
    fn narrow_viewports_shrink_the_orbit() {
        assert!((radius(767) - 72.0).abs() < 1e-4);
        assert_eq!(radius(768), ORBIT_RADIUS);
        let points = positions(3.0, 400);
        assert!(points.iter().all(|p| (p.length() - 72.0).abs() < 1e-3));
    }

    #[test]
    fn stack_colours() {
        assert_eq!(TECH_STACK[0].rgb().to_hex_string(), "#60a5fa");
        assert_eq!(TECH_STACK[5].name, "Three.js");
    }
}
