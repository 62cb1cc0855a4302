//! Window host
//!
//! Runs the background inside a winit window: hands window events to a
//! [`BackgroundHost`], drives its frames and animates the title.

use std::sync::Arc;
use std::time::{Duration, Instant};

use folio_core::typing::Typewriter;
use folio_env::{EnvironmentProbe, HostProbe};
use winit::{
    application::ApplicationHandler,
    error::EventLoopError,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::gpu::WgpuFactory;
use crate::host::BackgroundHost;
use crate::renderer::FrameOutcome;

/// How often the title animation is ticked when no frames are scheduled.
const IDLE_TICK: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Show the typewriter text after the title.
    pub animate_title: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Folio".to_string(),
            width: 1280,
            height: 720,
            animate_title: true,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BackgroundOptions {
    pub seed: u64,
    pub debounce: Duration,
    pub reduced_motion: Option<bool>,
}

impl Default for BackgroundOptions {
    fn default() -> Self {
        Self {
            seed: 42,
            debounce: folio_env::watcher::DEFAULT_DEBOUNCE,
            reduced_motion: None,
        }
    }
}

/// Create window attributes from config
pub fn window_attributes(config: &WindowConfig) -> winit::window::WindowAttributes {
    Window::default_attributes()
        .with_title(config.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(config.width, config.height))
}

/// Window title with the typewriter text and cursor after it.
fn title_text(base: &str, typewriter: &Typewriter) -> String {
    let cursor = if typewriter.cursor_visible() { "|" } else { "" };
    format!("{} · {}{}", base, typewriter.text(), cursor)
}

struct Mount {
    window: Arc<Window>,
    host: BackgroundHost<HostProbe, WgpuFactory>,
}

pub struct BackgroundApp {
    config: WindowConfig,
    options: BackgroundOptions,
    mount: Option<Mount>,
    typewriter: Typewriter,
    shown_title: String,
    last_tick: Instant,
    last_frame: Instant,
}

impl BackgroundApp {
    pub fn new(config: WindowConfig, options: BackgroundOptions) -> Self {
        Self {
            shown_title: config.title.clone(),
            config,
            options,
            mount: None,
            typewriter: Typewriter::default(),
            last_tick: Instant::now(),
            last_frame: Instant::now(),
        }
    }

    fn tick_title(&mut self, now: Instant) {
        let dt = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;
        if !self.config.animate_title {
            return;
        }
        // the cursor blinks while the text holds still
        self.typewriter.advance(dt);
        let title = title_text(&self.config.title, &self.typewriter);
        if let (true, Some(mount)) = (title != self.shown_title, &self.mount) {
            mount.window.set_title(&title);
            self.shown_title = title;
        }
    }

    fn remounted(&mut self) {
        self.last_frame = Instant::now();
        if let Some(mount) = &self.mount {
            mount.window.request_redraw();
        }
    }
}

impl ApplicationHandler for BackgroundApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.mount.is_some() {
            return;
        }
        let window = match event_loop.create_window(window_attributes(&self.config)) {
            Ok(window) => Arc::new(window),
            Err(err) => {
                tracing::error!(%err, "failed to create window");
                event_loop.exit();
                return;
            }
        };

        let mut probe = HostProbe::new();
        if let Some(reduced) = self.options.reduced_motion {
            probe = probe.with_reduced_motion(reduced);
        }
        let size = window.inner_size();
        probe.set_viewport(size.width, size.height, window.scale_factor());

        let factory = WgpuFactory::new(Arc::clone(&window));
        let host = BackgroundHost::new(probe, factory, self.options.seed, self.options.debounce);
        window.request_redraw();

        self.mount = Some(Mount { window, host });
        self.last_tick = Instant::now();
        self.last_frame = self.last_tick;
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(mount) = self.mount.as_mut() else { return };
        match event {
            WindowEvent::CloseRequested => {
                mount.host.teardown();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                let scale = mount.window.scale_factor();
                if mount.host.resize(size.width, size.height, scale, Instant::now()) {
                    self.remounted();
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let size = mount.window.inner_size();
                if mount.host.resize(size.width, size.height, scale_factor, Instant::now()) {
                    self.remounted();
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                let dt = now.saturating_duration_since(self.last_frame);
                self.last_frame = now;
                let handle = mount.host.handle_mut();
                match handle.on_frame(dt) {
                    FrameOutcome::Idle => handle.repaint(),
                    FrameOutcome::Stopped => tracing::debug!("redraw after teardown ignored"),
                    FrameOutcome::Drawn { .. } => {}
                }
                self.tick_title(now);
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if self.mount.as_mut().is_some_and(|mount| mount.host.flush(now)) {
            self.remounted();
        }

        let Some(mount) = &self.mount else { return };
        if mount.host.handle().wants_frames() {
            event_loop.set_control_flow(ControlFlow::Poll);
            mount.window.request_redraw();
        } else {
            self.tick_title(now);
            event_loop.set_control_flow(ControlFlow::WaitUntil(now + IDLE_TICK));
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(mut mount) = self.mount.take() {
            mount.host.teardown();
        }
    }
}

/// Open the background window and run until it is closed.
pub fn run(config: WindowConfig, options: BackgroundOptions) -> Result<(), EventLoopError> {
    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);
    let mut app = BackgroundApp::new(config, options);
    event_loop.run_app(&mut app)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let options = BackgroundOptions::default();
        assert_eq!(options.debounce, Duration::from_millis(150));
        assert_eq!(options.reduced_motion, None);
        assert_eq!(WindowConfig::default().width, 1280);
    }

    #[test]
    fn title_follows_cursor_blink_while_text_holds() {
        use folio_core::typing::{CURSOR_BLINK, TYPE_DELAY};

        let mut typewriter = Typewriter::new(["Hi"]);
        typewriter.advance(TYPE_DELAY * 2);
        let typed = title_text("Folio", &typewriter);
        assert_eq!(typed, "Folio · Hi|");

        assert!(!typewriter.advance(CURSOR_BLINK));
        let blinked = title_text("Folio", &typewriter);
        assert_eq!(blinked, "Folio · Hi");
        assert_ne!(typed, blinked);
    }
}
