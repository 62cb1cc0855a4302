//! Folio Render
//!
//! Adaptive background: a 3D scene of floating shapes and particles on
//! capable devices, a static gradient fallback everywhere else.

pub mod backend;
pub mod fallback;
pub mod geometry;
pub mod gpu;
pub mod host;
pub mod renderer;
pub mod settings;
pub mod window;

pub use backend::{DrawSurface, HeadlessFactory, SurfaceError, SurfaceFactory, Vertex};
pub use fallback::CssBackground;
pub use host::BackgroundHost;
pub use renderer::{render, render_scene, FrameOutcome, RenderHandle, RenderMode};
pub use settings::SceneSettings;

pub use wgpu;
pub use winit;

/// Rendering backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// Metal (macOS, iOS)
    Metal,
    /// DirectX 12 (Windows)
    DirectX12,
    /// Vulkan (cross-platform)
    Vulkan,
    /// OpenGL / WebGL
    OpenGL,
    /// WebGPU in a browser
    WebGpu,
    /// No GPU; frames are recorded, not presented
    Software,
}

/// What the acquired surface reports about itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceInfo {
    pub backend: BackendType,
    pub max_texture_size: u32,
}
