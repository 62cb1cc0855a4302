//! Background scene model
//!
//! Decorative shapes and a particle field, plus the per-frame motion rules.
//! Everything here is plain data; drawing lives in `folio_render`.

use glam::Vec3;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::math::SeededRng;

/// Rotation added per frame, scaled by shape speed.
pub const SPIN_X_PER_FRAME: f32 = 0.005;
pub const SPIN_Y_PER_FRAME: f32 = 0.01;
/// Amplitude of the per-frame vertical bob increment.
pub const BOB_STEP: f32 = 0.005;
/// Global particle field rotation per frame (radians about Y).
pub const PARTICLE_SPIN_PER_FRAME: f32 = 0.0002;

/// Particle placement extents (full width of the box on each axis).
pub const PARTICLE_EXTENT: Vec3 = Vec3::new(100.0, 100.0, 50.0);

/// Linear RGB colour with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value.
    pub fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    /// Parse `#rrggbb` or `rrggbb`.
    pub fn parse(text: &str) -> Option<Self> {
        let digits = text.strip_prefix('#').unwrap_or(text);
        if digits.len() != 6 {
            return None;
        }
        u32::from_str_radix(digits, 16).ok().map(Self::from_hex)
    }

    /// HSL to RGB, all inputs in `[0, 1]`.
    pub fn from_hsl(h: f32, s: f32, l: f32) -> Self {
        if s <= 0.0 {
            return Self::new(l, l, l);
        }
        let q = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
        let p = 2.0 * l - q;
        Self {
            r: hue_to_channel(p, q, h + 1.0 / 3.0),
            g: hue_to_channel(p, q, h),
            b: hue_to_channel(p, q, h - 1.0 / 3.0),
        }
    }

    pub fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        Rgb {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
        }
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    /// `#rrggbb`
    pub fn to_hex_string(self) -> String {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", c(self.r), c(self.g), c(self.b))
    }
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * 6.0 * (2.0 / 3.0 - t)
    } else {
        p
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Sphere,
    Cube,
}

/// One decorative shape. Identity is its index in the list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeDescriptor {
    pub kind: ShapeKind,
    pub position: Vec3,
    pub color: Rgb,
    pub size: f32,
    pub speed: f32,
}

static BASE_SHAPES: Lazy<[ShapeDescriptor; 6]> = Lazy::new(|| {
    let shape = |kind, [x, y, z]: [f32; 3], hex, size, speed| ShapeDescriptor {
        kind,
        position: Vec3::new(x, y, z),
        color: Rgb::from_hex(hex),
        size,
        speed,
    };
    [
        shape(ShapeKind::Sphere, [-15.0, 8.0, -8.0], 0x3b82f6, 1.5, 0.8),
        shape(ShapeKind::Cube, [20.0, -5.0, -12.0], 0x8b5cf6, 1.8, 0.6),
        shape(ShapeKind::Sphere, [-10.0, -8.0, -5.0], 0x06b6d4, 1.2, 1.0),
        shape(ShapeKind::Cube, [15.0, 12.0, -10.0], 0xf59e0b, 2.0, 0.7),
        shape(ShapeKind::Sphere, [25.0, 3.0, -15.0], 0xef4444, 1.4, 0.9),
        shape(ShapeKind::Cube, [-20.0, 5.0, -14.0], 0x10b981, 1.6, 0.5),
    ]
});

/// The fixed shape list, in draw order.
pub fn base_shapes() -> &'static [ShapeDescriptor] {
    BASE_SHAPES.as_slice()
}

/// The first `max` shapes of the fixed list.
pub fn shapes_for(max: u32) -> &'static [ShapeDescriptor] {
    let all = base_shapes();
    &all[..(max as usize).min(all.len())]
}

/// Gentle hover applied on top of each shape's own motion. Only animated
/// scenes hover; low-end scenes hold a static pose.
/// The pose is a pure function of elapsed time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FloatMotion {
    pub speed: f32,
    pub rotation_intensity: f32,
    pub float_intensity: f32,
}

impl FloatMotion {
    pub const NORMAL: FloatMotion = FloatMotion { speed: 1.0, rotation_intensity: 0.5, float_intensity: 0.4 };

    /// (rotation, vertical offset) at time `t` seconds.
    pub fn sample(&self, t: f32) -> (Vec3, f32) {
        let phase = t / 4.0 * self.speed;
        let rotation = Vec3::new(
            phase.cos() / 8.0,
            phase.sin() / 8.0,
            phase.sin() / 20.0,
        ) * self.rotation_intensity;
        let lift = phase.sin() / 10.0 * self.float_intensity;
        (rotation, lift)
    }
}

/// World-space placement of a shape for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub translation: Vec3,
    pub rotation: Vec3,
    pub scale: f32,
}

/// Per-shape mutable state: accumulated spin and bob.
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeState {
    pub descriptor: ShapeDescriptor,
    pub rotation: Vec3,
    pub bob: f32,
    /// Time offset for the hover so shapes do not move in lockstep.
    pub float_offset: f32,
}

impl ShapeState {
    pub fn new(descriptor: ShapeDescriptor, float_offset: f32) -> Self {
        Self {
            descriptor,
            rotation: Vec3::ZERO,
            bob: 0.0,
            float_offset,
        }
    }

    /// One frame of spin and bob at elapsed time `t` seconds.
    pub fn advance(&mut self, t: f32) {
        let speed = self.descriptor.speed;
        self.rotation.x += SPIN_X_PER_FRAME * speed;
        self.rotation.y += SPIN_Y_PER_FRAME * speed;
        self.bob += (t * speed * 0.5).sin() * BOB_STEP;
    }

    pub fn pose(&self, t: f32, float: Option<FloatMotion>) -> Pose {
        let (hover_rotation, lift) = match float {
            Some(motion) => motion.sample(t + self.float_offset),
            None => (Vec3::ZERO, 0.0),
        };
        Pose {
            translation: self.descriptor.position + Vec3::new(0.0, self.bob + lift, 0.0),
            rotation: self.rotation + hover_rotation,
            scale: self.descriptor.size,
        }
    }
}

/// Flat buffer of particles. Sized once at creation.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleField {
    positions: Vec<Vec3>,
    colors: Vec<Rgb>,
    rotation_y: f32,
}

impl ParticleField {
    /// Place `count` particles in a box centred on the origin, with hues in
    /// the cyan to violet band.
    pub fn generate(count: usize, rng: &mut SeededRng) -> Self {
        let mut positions = Vec::with_capacity(count);
        let mut colors = Vec::with_capacity(count);
        for _ in 0..count {
            positions.push(Vec3::new(
                rng.centered(PARTICLE_EXTENT.x),
                rng.centered(PARTICLE_EXTENT.y),
                rng.centered(PARTICLE_EXTENT.z),
            ));
            colors.push(Rgb::from_hsl(rng.next_f32() * 0.3 + 0.5, 0.7, 0.5));
        }
        Self {
            positions,
            colors,
            rotation_y: 0.0,
        }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    pub fn spin(&mut self, radians: f32) {
        self.rotation_y += radians;
    }
}

/// Inputs for building a scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneConfig {
    pub max_shapes: u32,
    pub max_particles: u32,
    pub low_end: bool,
    pub reduced_motion: bool,
    pub seed: u64,
}

/// Shapes and particles for one mount.
#[derive(Debug, Clone)]
pub struct Scene {
    shapes: Vec<ShapeState>,
    particles: Option<ParticleField>,
    float: Option<FloatMotion>,
    animated: bool,
}

impl Scene {
    pub fn new(config: SceneConfig) -> Self {
        let mut rng = SeededRng::new(config.seed);
        let shapes = shapes_for(config.max_shapes)
            .iter()
            .map(|d| ShapeState::new(*d, rng.range(0.0, 10_000.0)))
            .collect::<Vec<_>>();

        // Reduced motion keeps the shapes but drops the particle layer.
        let particles = (!config.reduced_motion)
            .then(|| ParticleField::generate(config.max_particles as usize, &mut rng));

        let animated = !config.low_end && !config.reduced_motion;
        let float = animated.then_some(FloatMotion::NORMAL);

        tracing::debug!(
            shapes = shapes.len(),
            particles = particles.as_ref().map_or(0, ParticleField::len),
            animated,
            "scene built"
        );

        Self { shapes, particles, float, animated }
    }

    pub fn shapes(&self) -> &[ShapeState] {
        &self.shapes
    }

    pub fn particles(&self) -> Option<&ParticleField> {
        self.particles.as_ref()
    }

    pub fn is_animated(&self) -> bool {
        self.animated
    }

    pub fn float_motion(&self) -> Option<FloatMotion> {
        self.float
    }

    /// Apply one frame of motion at elapsed time `t` seconds.
    /// Returns whether anything moved.
    pub fn step(&mut self, t: f32) -> bool {
        if !self.animated {
            return false;
        }
        for shape in &mut self.shapes {
            shape.advance(t);
        }
        if let Some(field) = &mut self.particles {
            field.spin(PARTICLE_SPIN_PER_FRAME);
        }
        true
    }

    pub fn poses(&self, t: f32) -> impl Iterator<Item = (&ShapeState, Pose)> + '_ {
        let float = self.float;
        self.shapes.iter().map(move |s| (s, s.pose(t, float)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SceneConfig {
        SceneConfig {
            max_shapes: 8,
            max_particles: 1000,
            low_end: false,
            reduced_motion: false,
            seed: 7,
        }
    }

    #[test]
    fn hex_parsing() {
        let c = Rgb::parse("#3b82f6").unwrap();
        assert_eq!(c, Rgb::from_hex(0x3b82f6));
        assert_eq!(c.to_hex_string(), "#3b82f6");
        assert!(Rgb::parse("#fff").is_none());
        assert!(Rgb::parse("zzzzzz").is_none());
    }

    #[test]
    fn hsl_primaries() {
        let red = Rgb::from_hsl(0.0, 1.0, 0.5);
        assert!((red.r - 1.0).abs() < 1e-5 && red.g.abs() < 1e-5 && red.b.abs() < 1e-5);
        let grey = Rgb::from_hsl(0.3, 0.0, 0.25);
        assert_eq!(grey, Rgb::new(0.25, 0.25, 0.25));
    }

    #[test]
    fn shape_list_is_sliced_to_budget() {
        assert_eq!(shapes_for(2).len(), 2);
        assert_eq!(shapes_for(4)[3].kind, ShapeKind::Cube);
        // budget above the list length yields the whole list
        assert_eq!(shapes_for(8).len(), base_shapes().len());
        assert!(shapes_for(0).is_empty());
    }

    #[test]
    fn particle_field_is_seeded_and_bounded() {
        let a = ParticleField::generate(500, &mut SeededRng::new(1));
        let b = ParticleField::generate(500, &mut SeededRng::new(1));
        assert_eq!(a, b);
        assert_eq!(a.len(), 500);
        for p in a.positions() {
            assert!(p.x.abs() <= 50.0 && p.y.abs() <= 50.0 && p.z.abs() <= 25.0);
        }
    }

    #[test]
    fn step_spins_shapes_and_particles() {
        let mut scene = Scene::new(config());
        assert!(scene.step(0.5));
        let first = &scene.shapes()[0];
        let speed = first.descriptor.speed;
        assert!((first.rotation.x - SPIN_X_PER_FRAME * speed).abs() < 1e-6);
        assert!((first.rotation.y - SPIN_Y_PER_FRAME * speed).abs() < 1e-6);
        let field = scene.particles().unwrap();
        assert!((field.rotation_y() - PARTICLE_SPIN_PER_FRAME).abs() < 1e-9);
        assert_eq!(field.len(), 1000);
    }

    #[test]
    fn motion_is_deterministic() {
        let mut a = Scene::new(config());
        let mut b = Scene::new(config());
        for frame in 0..120 {
            let t = frame as f32 / 60.0;
            a.step(t);
            b.step(t);
        }
        assert_eq!(a.shapes(), b.shapes());
        let pa: Vec<_> = a.poses(2.0).map(|(_, p)| p).collect();
        let pb: Vec<_> = b.poses(2.0).map(|(_, p)| p).collect();
        assert_eq!(pa, pb);
    }

    #[test]
    fn low_end_scene_holds_a_static_pose() {
        let mut scene = Scene::new(SceneConfig { low_end: true, ..config() });
        let before: Vec<_> = scene.poses(0.0).map(|(_, p)| p).collect();
        for frame in 0..30 {
            assert!(!scene.step(frame as f32 / 60.0));
        }
        let after: Vec<_> = scene.poses(0.5).map(|(_, p)| p).collect();
        assert_eq!(before, after);
        assert_eq!(scene.particles().unwrap().rotation_y(), 0.0);
    }

    #[test]
    fn reduced_motion_scene_has_no_particles() {
        let scene = Scene::new(SceneConfig { reduced_motion: true, ..config() });
        assert!(scene.particles().is_none());
        assert!(!scene.is_animated());
    }
}
