//! Drawing surface abstraction
//!
//! The renderer only talks to a [`DrawSurface`]; a [`SurfaceFactory`]
//! acquires one for a mount and may fail, in which case the renderer
//! degrades to the static fallback.

use std::cell::Cell;
use std::rc::Rc;

use thiserror::Error;

use crate::settings::SceneSettings;
use crate::{BackendType, SurfaceInfo};

/// One vertex of the CPU-built frame geometry, already in NDC.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("failed to create drawing surface: {0}")]
    Init(String),

    #[error("no compatible graphics adapter")]
    NoAdapter,

    #[error("surface configuration unsupported: {0}")]
    Unsupported(String),

    #[error("surface lost, reconfigured")]
    Lost,

    #[error("frame presentation failed: {0}")]
    Frame(String),
}

/// A drawing surface owned by one mounted scene.
pub trait DrawSurface {
    fn info(&self) -> SurfaceInfo;

    /// Drawable size in physical pixels.
    fn size(&self) -> (u32, u32);

    fn resize(&mut self, width: u32, height: u32);

    /// Draw one frame of triangle-list geometry.
    fn draw(&mut self, vertices: &[Vertex]) -> Result<(), SurfaceError>;

    /// Give back GPU resources. Called once, on teardown.
    fn release(&mut self) {}
}

/// Acquires a surface for a mount.
pub trait SurfaceFactory {
    fn create(&mut self, settings: &SceneSettings) -> Result<Box<dyn DrawSurface>, SurfaceError>;
}

/// Counters shared between a [`HeadlessSurface`] and whoever created it.
#[derive(Debug, Default)]
pub struct HeadlessStats {
    pub frames: Cell<u64>,
    pub last_vertex_count: Cell<usize>,
    pub released: Cell<bool>,
}

/// Surface that records frames instead of presenting them.
pub struct HeadlessSurface {
    width: u32,
    height: u32,
    stats: Rc<HeadlessStats>,
}

impl DrawSurface for HeadlessSurface {
    fn info(&self) -> SurfaceInfo {
        SurfaceInfo {
            backend: BackendType::Software,
            max_texture_size: 8192,
        }
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    fn draw(&mut self, vertices: &[Vertex]) -> Result<(), SurfaceError> {
        self.stats.frames.set(self.stats.frames.get() + 1);
        self.stats.last_vertex_count.set(vertices.len());
        Ok(())
    }

    fn release(&mut self) {
        self.stats.released.set(true);
    }
}

/// Factory for [`HeadlessSurface`]s. Can be told to fail, standing in for
/// a host without a usable GPU.
pub struct HeadlessFactory {
    width: u32,
    height: u32,
    available: bool,
    stats: Rc<HeadlessStats>,
}

impl HeadlessFactory {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            available: true,
            stats: Rc::default(),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            available: false,
            ..Self::new(0, 0)
        }
    }

    /// Stats of the most recently created surface.
    pub fn stats(&self) -> Rc<HeadlessStats> {
        Rc::clone(&self.stats)
    }
}

impl SurfaceFactory for HeadlessFactory {
    fn create(&mut self, _settings: &SceneSettings) -> Result<Box<dyn DrawSurface>, SurfaceError> {
        if !self.available {
            return Err(SurfaceError::NoAdapter);
        }
        self.stats = Rc::default();
        Ok(Box::new(HeadlessSurface {
            width: self.width,
            height: self.height,
            stats: Rc::clone(&self.stats),
        }))
    }
}
