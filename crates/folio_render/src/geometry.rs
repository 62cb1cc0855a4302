//! Frame geometry
//!
//! Projects the scene on the CPU into NDC triangles: shapes as unlit
//! meshes, particles as fixed-size screen quads. Fog is applied per vertex.

use folio_core::glam::{EulerRot, Mat4, Quat, Vec3, Vec4};
use folio_core::scene::{Rgb, Scene, ShapeKind};

use crate::backend::Vertex;
use crate::settings::SceneSettings;

const SPHERE_SEGMENTS: u32 = 12;
const SPHERE_RINGS: u32 = 8;

/// Vertices emitted per particle (two triangles).
pub const PARTICLE_VERTICES: usize = 6;

/// Unit cube (edge 1) as a triangle list.
pub fn cube_mesh() -> Vec<Vec3> {
    let c = |x: f32, y: f32, z: f32| Vec3::new(x, y, z) * 0.5;
    let corners = [
        c(-1.0, -1.0, -1.0),
        c(1.0, -1.0, -1.0),
        c(1.0, 1.0, -1.0),
        c(-1.0, 1.0, -1.0),
        c(-1.0, -1.0, 1.0),
        c(1.0, -1.0, 1.0),
        c(1.0, 1.0, 1.0),
        c(-1.0, 1.0, 1.0),
    ];
    const FACES: [[usize; 4]; 6] = [
        [4, 5, 6, 7], // +z
        [1, 0, 3, 2], // -z
        [5, 1, 2, 6], // +x
        [0, 4, 7, 3], // -x
        [7, 6, 2, 3], // +y
        [0, 1, 5, 4], // -y
    ];
    FACES
        .iter()
        .flat_map(|&[a, b, c, d]| [corners[a], corners[b], corners[c], corners[a], corners[c], corners[d]])
        .collect()
}

/// Unit-radius UV sphere as a triangle list.
pub fn sphere_mesh() -> Vec<Vec3> {
    use std::f32::consts::{PI, TAU};
    let point = |ring: u32, seg: u32| {
        let theta = ring as f32 / SPHERE_RINGS as f32 * PI;
        let phi = seg as f32 / SPHERE_SEGMENTS as f32 * TAU;
        Vec3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin())
    };
    let mut tris = Vec::with_capacity((SPHERE_RINGS * SPHERE_SEGMENTS * 6) as usize);
    for ring in 0..SPHERE_RINGS {
        for seg in 0..SPHERE_SEGMENTS {
            let a = point(ring, seg);
            let b = point(ring + 1, seg);
            let c = point(ring + 1, seg + 1);
            let d = point(ring, seg + 1);
            tris.extend_from_slice(&[a, b, c, a, c, d]);
        }
    }
    tris
}

/// Precomputed meshes and camera matrices for one surface size.
pub struct FrameBuilder {
    cube: Vec<Vec3>,
    sphere: Vec<Vec3>,
    view: Mat4,
    view_proj: Mat4,
    viewport: (u32, u32),
}

impl FrameBuilder {
    pub fn new(settings: &SceneSettings, viewport: (u32, u32)) -> Self {
        let (view, view_proj) = camera_matrices(settings, viewport);
        Self {
            cube: cube_mesh(),
            sphere: sphere_mesh(),
            view,
            view_proj,
            viewport,
        }
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn set_viewport(&mut self, settings: &SceneSettings, viewport: (u32, u32)) {
        let (view, view_proj) = camera_matrices(settings, viewport);
        self.view = view;
        self.view_proj = view_proj;
        self.viewport = viewport;
    }

    /// Build the vertex list for `scene` at elapsed time `t` seconds.
    pub fn build(&self, scene: &Scene, settings: &SceneSettings, t: f32) -> Vec<Vertex> {
        let mut out = Vec::new();
        if let Some(field) = scene.particles() {
            self.push_particles(&mut out, field.positions(), field.colors(), field.rotation_y(), settings);
        }

        // back to front so blending looks right without a depth buffer
        let mut shapes: Vec<_> = scene
            .poses(t)
            .map(|(state, pose)| (self.depth(pose.translation), state.descriptor, pose))
            .collect();
        shapes.sort_by(|a, b| b.0.total_cmp(&a.0));

        for (_, descriptor, pose) in shapes {
            let model = Mat4::from_scale_rotation_translation(
                Vec3::splat(pose.scale),
                Quat::from_euler(EulerRot::XYZ, pose.rotation.x, pose.rotation.y, pose.rotation.z),
                pose.translation,
            );
            let mesh = match descriptor.kind {
                ShapeKind::Sphere => &self.sphere,
                ShapeKind::Cube => &self.cube,
            };
            self.push_mesh(&mut out, mesh, model, descriptor.color, settings.shape_opacity, settings);
        }
        out
    }

    fn depth(&self, world: Vec3) -> f32 {
        -(self.view * world.extend(1.0)).z
    }

    fn fogged(&self, color: Rgb, world: Vec3, settings: &SceneSettings) -> Rgb {
        let fog = &settings.fog;
        color.lerp(fog.color, fog.factor(self.depth(world)))
    }

    fn project(&self, world: Vec3) -> Option<[f32; 2]> {
        let clip: Vec4 = self.view_proj * world.extend(1.0);
        (clip.w > 0.0).then(|| [clip.x / clip.w, clip.y / clip.w])
    }

    fn push_mesh(
        &self,
        out: &mut Vec<Vertex>,
        mesh: &[Vec3],
        model: Mat4,
        color: Rgb,
        opacity: f32,
        settings: &SceneSettings,
    ) {
        for tri in mesh.chunks_exact(3) {
            let world = [
                model.transform_point3(tri[0]),
                model.transform_point3(tri[1]),
                model.transform_point3(tri[2]),
            ];
            let projected = [self.project(world[0]), self.project(world[1]), self.project(world[2])];
            let [Some(a), Some(b), Some(c)] = projected else { continue };
            for (position, w) in [a, b, c].into_iter().zip(world) {
                let [r, g, b] = self.fogged(color, w, settings).to_array();
                out.push(Vertex { position, color: [r, g, b, opacity] });
            }
        }
    }

    fn push_particles(
        &self,
        out: &mut Vec<Vertex>,
        positions: &[Vec3],
        colors: &[Rgb],
        rotation_y: f32,
        settings: &SceneSettings,
    ) {
        let spin = Mat4::from_rotation_y(rotation_y);
        let (w, h) = self.viewport;
        let size = settings.particle_size * settings.pixel_ratio;
        // half-extent in NDC: (size / 2) * (2 / dimension)
        let hx = size / w.max(1) as f32;
        let hy = size / h.max(1) as f32;
        out.reserve(positions.len() * PARTICLE_VERTICES);
        for (p, color) in positions.iter().zip(colors) {
            let world = spin.transform_point3(*p);
            let Some([x, y]) = self.project(world) else { continue };
            let [r, g, b] = self.fogged(*color, world, settings).to_array();
            let rgba = [r, g, b, settings.particle_opacity];
            let corners = [
                [x - hx, y - hy],
                [x + hx, y - hy],
                [x + hx, y + hy],
                [x - hx, y - hy],
                [x + hx, y + hy],
                [x - hx, y + hy],
            ];
            out.extend(corners.into_iter().map(|position| Vertex { position, color: rgba }));
        }
    }
}

fn camera_matrices(settings: &SceneSettings, (w, h): (u32, u32)) -> (Mat4, Mat4) {
    let camera = &settings.camera;
    let aspect = w.max(1) as f32 / h.max(1) as f32;
    let view = Mat4::look_at_rh(camera.position, Vec3::ZERO, Vec3::Y);
    let proj = Mat4::perspective_rh(camera.fov_y_degrees.to_radians(), aspect, camera.near, camera.far);
    (view, proj * view)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::scene::{base_shapes, SceneConfig};
    use folio_env::DeviceProfile;

    fn settings() -> SceneSettings {
        SceneSettings::from_profile(&DeviceProfile::CONSERVATIVE)
    }

    fn scene(max_shapes: u32, max_particles: u32) -> Scene {
        Scene::new(SceneConfig {
            max_shapes,
            max_particles,
            low_end: false,
            reduced_motion: false,
            seed: 3,
        })
    }

    #[test]
    fn mesh_sizes() {
        assert_eq!(cube_mesh().len(), 36);
        assert_eq!(sphere_mesh().len(), (SPHERE_RINGS * SPHERE_SEGMENTS * 6) as usize);
    }

    #[test]
    fn particles_emit_one_quad_each() {
        let s = settings();
        let builder = FrameBuilder::new(&s, (1280, 720));
        let verts = builder.build(&scene(0, 250), &s, 0.0);
        // every particle sits in front of the camera (z <= 25)
        assert_eq!(verts.len(), 250 * PARTICLE_VERTICES);
        assert!(verts.iter().all(|v| v.color[3] == s.particle_opacity));
    }

    #[test]
    fn shapes_use_their_meshes() {
        let s = settings();
        let builder = FrameBuilder::new(&s, (1280, 720));
        let verts = builder.build(&scene(2, 0), &s, 0.0);
        let expected: usize = base_shapes()[..2]
            .iter()
            .map(|d| match d.kind {
                ShapeKind::Sphere => sphere_mesh().len(),
                ShapeKind::Cube => cube_mesh().len(),
            })
            .sum();
        assert_eq!(verts.len(), expected);
    }

    #[test]
    fn origin_projects_to_screen_centre() {
        let s = settings();
        let builder = FrameBuilder::new(&s, (800, 600));
        let [x, y] = builder.project(Vec3::ZERO).unwrap();
        assert!(x.abs() < 1e-5 && y.abs() < 1e-5);
        assert!(builder.project(Vec3::new(0.0, 0.0, 40.0)).is_none());
    }

    #[test]
    fn distant_points_are_fogged() {
        let s = settings();
        let builder = FrameBuilder::new(&s, (800, 600));
        let white = Rgb::new(1.0, 1.0, 1.0);
        let near = builder.fogged(white, Vec3::new(0.0, 0.0, 0.0), &s);
        let far = builder.fogged(white, Vec3::new(0.0, 0.0, -100.0), &s);
        assert_eq!(near, white);
        let close = |a: f32, b: f32| (a - b).abs() < 1e-5;
        assert!(close(far.r, s.fog.color.r) && close(far.g, s.fog.color.g) && close(far.b, s.fog.color.b));
    }
}
