//! Background host state
//!
//! What the window host keeps between events, minus the window itself:
//! the environment probe, the surface factory, the profile watcher and the
//! live mount. A profile change tears the mount down and replaces it.

use std::time::{Duration, Instant};

use folio_env::{DeviceProfile, EnvironmentProbe, ProfileWatcher};

use crate::backend::SurfaceFactory;
use crate::renderer::{render, RenderHandle};

pub struct BackgroundHost<P, F> {
    probe: P,
    factory: F,
    watcher: ProfileWatcher,
    handle: RenderHandle,
    seed: u64,
    mounts: u64,
}

impl<P: EnvironmentProbe, F: SurfaceFactory> BackgroundHost<P, F> {
    /// Detect the profile from `probe` and mount the first background.
    pub fn new(probe: P, mut factory: F, seed: u64, debounce: Duration) -> Self {
        let watcher = ProfileWatcher::new(&probe, debounce);
        let profile = watcher.current();
        tracing::info!(?profile, "device profile detected");
        let handle = render(&profile, &mut factory, seed);
        Self {
            probe,
            factory,
            watcher,
            handle,
            seed,
            mounts: 1,
        }
    }

    pub fn profile(&self) -> DeviceProfile {
        self.watcher.current()
    }

    pub fn handle(&self) -> &RenderHandle {
        &self.handle
    }

    pub fn handle_mut(&mut self) -> &mut RenderHandle {
        &mut self.handle
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    /// Mounts made so far, the first one included.
    pub fn mount_count(&self) -> u64 {
        self.mounts
    }

    pub fn has_pending(&self) -> bool {
        self.watcher.has_pending()
    }

    /// Handle a window resize or scale change, in physical pixels. Returns
    /// whether the background was remounted. A zero dimension (minimised
    /// window) is ignored.
    pub fn resize(&mut self, width: u32, height: u32, scale_factor: f64, now: Instant) -> bool {
        if width == 0 || height == 0 {
            tracing::debug!(width, height, "zero-size resize ignored");
            return false;
        }
        self.handle.resize(width, height);
        self.probe.set_viewport(width, height, scale_factor);
        match self.watcher.on_resize(&self.probe, now) {
            Some(profile) => {
                self.remount(profile);
                true
            }
            None => false,
        }
    }

    /// Run a resize check deferred by the debounce window. Returns whether
    /// the background was remounted.
    pub fn flush(&mut self, now: Instant) -> bool {
        match self.watcher.flush(&self.probe, now) {
            Some(profile) => {
                self.remount(profile);
                true
            }
            None => false,
        }
    }

    pub fn teardown(&mut self) {
        self.handle.teardown();
    }

    fn remount(&mut self, profile: DeviceProfile) {
        // the old surface goes before the new one is acquired
        self.handle.teardown();
        self.handle = render(&profile, &mut self.factory, self.seed);
        self.mounts += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use folio_env::watcher::DEFAULT_DEBOUNCE;
    use folio_env::{ProbeReadings, StaticProbe};

    use super::*;
    use crate::backend::HeadlessFactory;
    use crate::renderer::RenderMode;

    fn desktop_host() -> BackgroundHost<StaticProbe, HeadlessFactory> {
        let probe = StaticProbe::new(ProbeReadings {
            viewport_width: 1280,
            viewport_height: 720,
            hardware_concurrency: Some(8),
            device_memory_gb: Some(16.0),
            ..ProbeReadings::default()
        });
        BackgroundHost::new(probe, HeadlessFactory::new(1280, 720), 7, DEFAULT_DEBOUNCE)
    }

    #[test]
    fn crossing_the_breakpoint_replaces_the_mount() {
        let mut host = desktop_host();
        assert_eq!(host.handle().mode(), RenderMode::Scene);
        let scene_surface = host.factory().stats();

        assert!(host.resize(700, 720, 1.0, Instant::now()));
        assert!(scene_surface.released.get());
        assert!(host.profile().is_mobile);
        assert_eq!(host.handle().mode(), RenderMode::Fallback);
        assert!(host.handle().is_running());
        assert_eq!(host.mount_count(), 2);

        let fallback_surface = host.factory().stats();
        assert!(!Rc::ptr_eq(&scene_surface, &fallback_surface));
        assert_eq!(fallback_surface.frames.get(), 1);
        assert!(!fallback_surface.released.get());
    }

    #[test]
    fn resize_within_the_profile_keeps_the_mount() {
        let mut host = desktop_host();
        let surface = host.factory().stats();

        assert!(!host.resize(1100, 700, 1.0, Instant::now()));
        assert_eq!(host.mount_count(), 1);
        assert!(Rc::ptr_eq(&surface, &host.factory().stats()));
        assert!(!surface.released.get());
        assert_eq!(host.handle().mode(), RenderMode::Scene);
    }

    #[test]
    fn minimised_window_is_ignored() {
        let mut host = desktop_host();
        let before = host.profile();
        let surface = host.factory().stats();

        assert!(!host.resize(0, 0, 1.0, Instant::now()));
        assert!(!host.resize(1280, 0, 1.0, Instant::now()));
        assert_eq!(host.profile(), before);
        assert_eq!(host.mount_count(), 1);
        assert!(!surface.released.get());
        assert_eq!(host.probe().readings().unwrap().viewport_width, 1280);
    }

    #[test]
    fn debounced_resize_remounts_on_flush() {
        let start = Instant::now();
        let mut host = desktop_host();
        assert!(!host.resize(1200, 720, 1.0, start));

        let soon = start + Duration::from_millis(10);
        assert!(!host.resize(600, 720, 1.0, soon));
        assert!(host.has_pending());
        assert!(!host.flush(soon));
        assert_eq!(host.handle().mode(), RenderMode::Scene);

        assert!(host.flush(start + DEFAULT_DEBOUNCE));
        assert_eq!(host.handle().mode(), RenderMode::Fallback);
        assert_eq!(host.mount_count(), 2);
    }

    #[test]
    fn widening_back_restores_the_scene() {
        let start = Instant::now();
        let mut host = desktop_host();
        assert!(host.resize(700, 720, 1.0, start));
        let fallback_surface = host.factory().stats();

        assert!(host.resize(1280, 720, 1.0, start + DEFAULT_DEBOUNCE));
        assert!(fallback_surface.released.get());
        assert_eq!(host.handle().mode(), RenderMode::Scene);
        assert_eq!(host.mount_count(), 3);
    }

    #[test]
    fn teardown_releases_the_live_surface() {
        let mut host = desktop_host();
        let surface = host.factory().stats();
        host.teardown();
        assert!(surface.released.get());
        assert!(!host.handle().is_running());
    }
}
