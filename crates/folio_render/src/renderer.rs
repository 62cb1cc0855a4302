//! Adaptive background renderer
//!
//! Picks the 3D scene or the static fallback for a device profile and
//! hands back a [`RenderHandle`] that owns the frame loop for that mount.

use std::time::Duration;

use folio_core::scene::{Scene, SceneConfig};
use folio_core::time::{FrameClock, FrameStats};
use folio_env::DeviceProfile;

use crate::backend::{DrawSurface, SurfaceError, SurfaceFactory};
use crate::fallback::CssBackground;
use crate::geometry::FrameBuilder;
use crate::settings::SceneSettings;

const STATS_WINDOW: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    Scene,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// A frame was drawn; `moved` reports whether the scene advanced.
    Drawn { moved: bool },
    /// Nothing to do this frame (fallback, or frame loop disabled).
    Idle,
    /// The handle has been torn down.
    Stopped,
}

struct SceneMount {
    scene: Scene,
    settings: SceneSettings,
    builder: FrameBuilder,
    surface: Option<Box<dyn DrawSurface>>,
}

impl SceneMount {
    fn draw(&mut self, t: f32) -> Result<(), SurfaceError> {
        let Some(surface) = self.surface.as_mut() else {
            return Ok(());
        };
        let vertices = self.builder.build(&self.scene, &self.settings, t);
        surface.draw(&vertices)
    }
}

struct FallbackMount {
    background: CssBackground,
    pixel_ratio: f32,
    surface: Option<Box<dyn DrawSurface>>,
}

impl FallbackMount {
    /// Paint the resting layout. A mount without a surface stays blank.
    fn paint(&mut self) -> Result<(), SurfaceError> {
        let Some(surface) = self.surface.as_mut() else {
            return Ok(());
        };
        let vertices = self.background.vertices(surface.size(), self.pixel_ratio);
        surface.draw(&vertices)
    }
}

enum Mounted {
    Scene(Box<SceneMount>),
    Fallback(FallbackMount),
}

/// Owns one mount of the background: its frame loop and drawing surface.
///
/// The host calls [`RenderHandle::on_frame`] once per display refresh while
/// [`RenderHandle::is_running`] holds. [`RenderHandle::teardown`] stops the
/// loop and releases the surface; it is also run on drop.
pub struct RenderHandle {
    mounted: Mounted,
    running: bool,
    clock: FrameClock,
    stats: FrameStats,
}

impl RenderHandle {
    fn fallback(seed: u64, surface: Option<Box<dyn DrawSurface>>, pixel_ratio: f32) -> Self {
        let mut mount = FallbackMount {
            background: CssBackground::generate(seed),
            pixel_ratio,
            surface,
        };
        if let Err(err) = mount.paint() {
            tracing::warn!(%err, "static background paint failed");
        }
        Self {
            mounted: Mounted::Fallback(mount),
            running: true,
            clock: FrameClock::new(),
            stats: FrameStats::new(STATS_WINDOW),
        }
    }

    pub fn mode(&self) -> RenderMode {
        match self.mounted {
            Mounted::Scene(_) => RenderMode::Scene,
            Mounted::Fallback(_) => RenderMode::Fallback,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Whether the host should keep scheduling frames.
    pub fn wants_frames(&self) -> bool {
        self.running
            && matches!(&self.mounted, Mounted::Scene(mount) if mount.settings.frame_loop)
    }

    pub fn scene(&self) -> Option<&Scene> {
        match &self.mounted {
            Mounted::Scene(mount) => Some(&mount.scene),
            Mounted::Fallback(_) => None,
        }
    }

    pub fn settings(&self) -> Option<&SceneSettings> {
        match &self.mounted {
            Mounted::Scene(mount) => Some(&mount.settings),
            Mounted::Fallback(_) => None,
        }
    }

    pub fn fallback_background(&self) -> Option<&CssBackground> {
        match &self.mounted {
            Mounted::Fallback(mount) => Some(&mount.background),
            Mounted::Scene(_) => None,
        }
    }

    /// Whether this mount holds a drawing surface.
    pub fn has_surface(&self) -> bool {
        match &self.mounted {
            Mounted::Scene(mount) => mount.surface.is_some(),
            Mounted::Fallback(mount) => mount.surface.is_some(),
        }
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    /// Run one frame, `dt` after the previous one.
    pub fn on_frame(&mut self, dt: Duration) -> FrameOutcome {
        if !self.running {
            return FrameOutcome::Stopped;
        }
        let Mounted::Scene(mount) = &mut self.mounted else {
            return FrameOutcome::Idle;
        };
        if !mount.settings.frame_loop {
            return FrameOutcome::Idle;
        }

        self.clock.advance(dt);
        self.stats.record(dt);
        let t = self.clock.elapsed_secs();
        let moved = mount.scene.step(t);
        match mount.draw(t) {
            Ok(()) => {}
            Err(SurfaceError::Lost) => tracing::debug!("surface lost, frame skipped"),
            Err(err) => tracing::warn!(%err, "frame skipped"),
        }
        FrameOutcome::Drawn { moved }
    }

    /// Forward a drawable size change to the surface. Mounts without a
    /// frame loop are redrawn at the new size.
    pub fn resize(&mut self, width: u32, height: u32) {
        if !self.running || width == 0 || height == 0 {
            return;
        }
        match &mut self.mounted {
            Mounted::Scene(mount) => {
                if let Some(surface) = mount.surface.as_mut() {
                    surface.resize(width, height);
                }
                mount.builder.set_viewport(&mount.settings, (width, height));
            }
            Mounted::Fallback(mount) => {
                if let Some(surface) = mount.surface.as_mut() {
                    surface.resize(width, height);
                }
            }
        }
        self.repaint();
    }

    /// Redraw a mount that has no frame loop, e.g. when the host window was
    /// exposed. Animated scenes repaint on their next frame instead.
    pub fn repaint(&mut self) {
        if !self.running {
            return;
        }
        let result = match &mut self.mounted {
            Mounted::Scene(mount) if !mount.settings.frame_loop => mount.draw(self.clock.elapsed_secs()),
            Mounted::Scene(_) => Ok(()),
            Mounted::Fallback(mount) => mount.paint(),
        };
        if let Err(err) = result {
            tracing::warn!(%err, "repaint failed");
        }
    }

    /// Stop the frame loop and release the surface. Safe to call repeatedly.
    pub fn teardown(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        let surface = match &mut self.mounted {
            Mounted::Scene(mount) => mount.surface.take(),
            Mounted::Fallback(mount) => mount.surface.take(),
        };
        if let Some(mut surface) = surface {
            surface.release();
        }
        tracing::debug!(mode = ?self.mode(), frames = self.clock.frame_count(), "background torn down");
    }
}

impl Drop for RenderHandle {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Mount the background for `profile`: the 3D scene on capable devices,
/// the static fallback otherwise. The fallback is painted once if a surface
/// can be acquired and left blank if not.
pub fn render(profile: &DeviceProfile, factory: &mut dyn SurfaceFactory, seed: u64) -> RenderHandle {
    if profile.needs_fallback() {
        tracing::info!(
            mobile = profile.is_mobile,
            low_end = profile.is_low_end,
            reduced_motion = profile.prefer_reduced_motion,
            "mounting static background"
        );
        let settings = SceneSettings::from_profile(profile);
        let surface = match factory.create(&settings) {
            Ok(surface) => Some(surface),
            Err(err) => {
                tracing::warn!(%err, "drawing surface unavailable, static background left blank");
                None
            }
        };
        return RenderHandle::fallback(seed, surface, settings.pixel_ratio);
    }
    render_scene(profile, factory, seed)
}

/// Mount the 3D scene regardless of the profile's flags. Falls back to the
/// static background if no surface can be acquired.
pub fn render_scene(profile: &DeviceProfile, factory: &mut dyn SurfaceFactory, seed: u64) -> RenderHandle {
    let settings = SceneSettings::from_profile(profile);
    let mut surface = match factory.create(&settings) {
        Ok(surface) => surface,
        Err(err) => {
            tracing::warn!(%err, "drawing surface unavailable, using static background");
            return RenderHandle::fallback(seed, None, settings.pixel_ratio);
        }
    };

    let scene = Scene::new(SceneConfig {
        max_shapes: settings.max_shapes,
        max_particles: settings.max_particles,
        low_end: settings.low_end,
        reduced_motion: settings.reduced_motion,
        seed,
    });
    let info = surface.info();
    let size = surface.size();
    surface.resize(size.0, size.1);
    let builder = FrameBuilder::new(&settings, size);

    tracing::info!(
        backend = ?info.backend,
        shapes = scene.shapes().len(),
        particles = scene.particles().map_or(0, |p| p.len()),
        animated = scene.is_animated(),
        "mounting 3D background"
    );

    let mut mount = SceneMount {
        scene,
        settings,
        builder,
        surface: Some(surface),
    };
    // first frame shows the initial pose even when the loop never runs
    if let Err(err) = mount.draw(0.0) {
        tracing::warn!(%err, "initial frame failed");
    }

    RenderHandle {
        mounted: Mounted::Scene(Box::new(mount)),
        running: true,
        clock: FrameClock::new(),
        stats: FrameStats::new(STATS_WINDOW),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::HeadlessFactory;
    use folio_core::time::FRAME_DURATION;

    const SEED: u64 = 99;

    fn desktop() -> DeviceProfile {
        DeviceProfile::CONSERVATIVE
    }

    #[test]
    fn capable_profile_gets_scene() {
        let mut factory = HeadlessFactory::new(1280, 720);
        let handle = render(&desktop(), &mut factory, SEED);
        assert_eq!(handle.mode(), RenderMode::Scene);
        assert!(handle.wants_frames());
        // initial pose drawn on mount
        assert_eq!(factory.stats().frames.get(), 1);
    }

    #[test]
    fn any_constraint_selects_fallback() {
        let constrained = [
            DeviceProfile { is_mobile: true, ..desktop() },
            DeviceProfile { is_low_end: true, ..desktop() },
            DeviceProfile { prefer_reduced_motion: true, ..desktop() },
        ];
        for profile in constrained {
            let mut factory = HeadlessFactory::new(1280, 720);
            let mut handle = render(&profile, &mut factory, SEED);
            assert_eq!(handle.mode(), RenderMode::Fallback);
            assert!(!handle.wants_frames());
            assert_eq!(handle.on_frame(FRAME_DURATION), FrameOutcome::Idle);
            // painted once on mount, never per frame
            assert_eq!(factory.stats().frames.get(), 1);
        }
    }

    #[test]
    fn fallback_paints_on_mount_and_resize_only() {
        let profile = DeviceProfile { prefer_reduced_motion: true, ..desktop() };
        let mut factory = HeadlessFactory::new(1280, 720);
        let mut handle = render(&profile, &mut factory, SEED);
        let stats = factory.stats();
        assert!(handle.has_surface());
        assert_eq!(stats.frames.get(), 1);
        assert!(stats.last_vertex_count.get() > 6);

        for _ in 0..10 {
            assert_eq!(handle.on_frame(FRAME_DURATION), FrameOutcome::Idle);
        }
        assert_eq!(stats.frames.get(), 1);

        handle.resize(800, 600);
        assert_eq!(stats.frames.get(), 2);
        handle.repaint();
        assert_eq!(stats.frames.get(), 3);

        handle.teardown();
        assert!(stats.released.get());
        handle.resize(640, 480);
        handle.repaint();
        assert_eq!(stats.frames.get(), 3);
    }

    #[test]
    fn missing_gpu_degrades_to_fallback() {
        let mut factory = HeadlessFactory::unavailable();
        let handle = render(&desktop(), &mut factory, SEED);
        assert_eq!(handle.mode(), RenderMode::Fallback);
        assert!(handle.fallback_background().is_some());
        assert!(!handle.has_surface());
    }

    #[test]
    fn fallback_without_gpu_stays_blank() {
        let profile = DeviceProfile { is_mobile: true, ..desktop() };
        let mut factory = HeadlessFactory::unavailable();
        let mut handle = render(&profile, &mut factory, SEED);
        assert_eq!(handle.mode(), RenderMode::Fallback);
        assert!(!handle.has_surface());
        handle.resize(800, 600);
        handle.repaint();
        assert_eq!(factory.stats().frames.get(), 0);
    }

    #[test]
    fn frames_advance_the_scene() {
        let mut factory = HeadlessFactory::new(1280, 720);
        let mut handle = render(&desktop(), &mut factory, SEED);
        for _ in 0..10 {
            assert_eq!(handle.on_frame(FRAME_DURATION), FrameOutcome::Drawn { moved: true });
        }
        assert_eq!(factory.stats().frames.get(), 11);
        assert_eq!(handle.clock().frame_count(), 10);
        assert!(handle.scene().unwrap().shapes()[0].rotation.y > 0.0);
        assert!(factory.stats().last_vertex_count.get() > 0);
    }

    #[test]
    fn teardown_is_idempotent_and_stops_mutation() {
        let mut factory = HeadlessFactory::new(1280, 720);
        let mut handle = render(&desktop(), &mut factory, SEED);
        handle.on_frame(FRAME_DURATION);
        let stats = factory.stats();

        handle.teardown();
        assert!(stats.released.get());
        let frozen = handle.scene().unwrap().shapes().to_vec();
        let drawn = stats.frames.get();

        handle.teardown();
        assert!(!handle.is_running());
        assert_eq!(handle.on_frame(FRAME_DURATION), FrameOutcome::Stopped);
        assert_eq!(handle.scene().unwrap().shapes(), frozen.as_slice());
        assert_eq!(stats.frames.get(), drawn);
    }

    #[test]
    fn drop_releases_surface() {
        let mut factory = HeadlessFactory::new(640, 480);
        let handle = render(&desktop(), &mut factory, SEED);
        let stats = factory.stats();
        drop(handle);
        assert!(stats.released.get());
    }

    #[test]
    fn forced_low_end_scene_holds_still() {
        let profile = DeviceProfile { is_low_end: true, ..desktop() };
        let mut factory = HeadlessFactory::new(1280, 720);
        let mut handle = render_scene(&profile, &mut factory, SEED);
        assert_eq!(handle.mode(), RenderMode::Scene);
        let before = handle.scene().unwrap().shapes().to_vec();
        for _ in 0..30 {
            assert_eq!(handle.on_frame(FRAME_DURATION), FrameOutcome::Drawn { moved: false });
        }
        assert_eq!(handle.scene().unwrap().shapes(), before.as_slice());
        assert_eq!(handle.settings().unwrap().shape_opacity, 0.4);
    }

    #[test]
    fn forced_reduced_motion_scene_draws_once() {
        let profile = DeviceProfile { prefer_reduced_motion: true, ..desktop() };
        let mut factory = HeadlessFactory::new(1280, 720);
        let mut handle = render_scene(&profile, &mut factory, SEED);
        assert!(!handle.wants_frames());
        assert_eq!(handle.on_frame(FRAME_DURATION), FrameOutcome::Idle);
        assert_eq!(factory.stats().frames.get(), 1);
        assert!(handle.scene().unwrap().particles().is_none());

        handle.resize(800, 600);
        assert_eq!(factory.stats().frames.get(), 2);
    }
}
