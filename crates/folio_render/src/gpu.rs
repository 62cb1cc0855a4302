//! wgpu drawing surface for a winit window

use std::sync::Arc;

use winit::window::Window;

use crate::backend::{DrawSurface, SurfaceError, SurfaceFactory, Vertex};
use crate::settings::{PowerMode, SceneSettings};
use crate::{BackendType, SurfaceInfo};

const MSAA_SAMPLES: u32 = 4;
const INITIAL_VERTEX_CAPACITY: usize = 4096;

/// Creates a [`WgpuSurface`] on the given window for each mount.
pub struct WgpuFactory {
    window: Arc<Window>,
}

impl WgpuFactory {
    pub fn new(window: Arc<Window>) -> Self {
        Self { window }
    }
}

impl SurfaceFactory for WgpuFactory {
    fn create(&mut self, settings: &SceneSettings) -> Result<Box<dyn DrawSurface>, SurfaceError> {
        let surface = pollster::block_on(WgpuSurface::new(Arc::clone(&self.window), settings))?;
        Ok(Box::new(surface))
    }
}

struct Gpu {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    vertex_capacity: usize,
    msaa: Option<wgpu::TextureView>,
    sample_count: u32,
}

pub struct WgpuSurface {
    gpu: Option<Gpu>,
    info: SurfaceInfo,
    clear: wgpu::Color,
}

impl WgpuSurface {
    async fn new(window: Arc<Window>, settings: &SceneSettings) -> Result<Self, SurfaceError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window)
            .map_err(|e| SurfaceError::Init(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: match settings.power {
                    PowerMode::LowPower => wgpu::PowerPreference::LowPower,
                    PowerMode::HighPerformance => wgpu::PowerPreference::HighPerformance,
                },
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(SurfaceError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("folio background"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_webgl2_defaults()
                        .using_resolution(adapter.limits()),
                    memory_hints: wgpu::MemoryHints::MemoryUsage,
                },
                None,
            )
            .await
            .map_err(|e| SurfaceError::Init(e.to_string()))?;

        let caps = surface.get_capabilities(&adapter);
        // colours are authored in sRGB and written as-is
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| SurfaceError::Unsupported("no surface formats".into()))?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let sample_count = if settings.antialias
            && adapter
                .get_texture_format_features(format)
                .flags
                .sample_count_supported(MSAA_SAMPLES)
        {
            MSAA_SAMPLES
        } else {
            1
        };

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Background Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("../shaders/background.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Background Pipeline Layout"),
            bind_group_layouts: &[],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Background Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4],
                }],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: sample_count,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        });

        let vertex_buffer = vertex_buffer(&device, INITIAL_VERTEX_CAPACITY);
        let msaa = (sample_count > 1).then(|| msaa_view(&device, &config, sample_count));

        let adapter_info = adapter.get_info();
        let info = SurfaceInfo {
            backend: backend_type(adapter_info.backend),
            max_texture_size: device.limits().max_texture_dimension_2d,
        };
        tracing::info!(
            adapter = %adapter_info.name,
            backend = ?info.backend,
            ?format,
            sample_count,
            "wgpu surface ready"
        );

        let [r, g, b] = settings.fog.color.to_array();
        Ok(Self {
            gpu: Some(Gpu {
                surface,
                device,
                queue,
                config,
                pipeline,
                vertex_buffer,
                vertex_capacity: INITIAL_VERTEX_CAPACITY,
                msaa,
                sample_count,
            }),
            info,
            clear: wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: 1.0,
            },
        })
    }
}

impl DrawSurface for WgpuSurface {
    fn info(&self) -> SurfaceInfo {
        self.info
    }

    fn size(&self) -> (u32, u32) {
        self.gpu
            .as_ref()
            .map_or((0, 0), |gpu| (gpu.config.width, gpu.config.height))
    }

    fn resize(&mut self, width: u32, height: u32) {
        let Some(gpu) = self.gpu.as_mut() else { return };
        if width == 0 || height == 0 {
            return;
        }
        gpu.config.width = width;
        gpu.config.height = height;
        gpu.surface.configure(&gpu.device, &gpu.config);
        if gpu.sample_count > 1 {
            gpu.msaa = Some(msaa_view(&gpu.device, &gpu.config, gpu.sample_count));
        }
    }

    fn draw(&mut self, vertices: &[Vertex]) -> Result<(), SurfaceError> {
        let Some(gpu) = self.gpu.as_mut() else {
            return Ok(());
        };

        if vertices.len() > gpu.vertex_capacity {
            gpu.vertex_capacity = vertices.len().next_power_of_two();
            gpu.vertex_buffer = vertex_buffer(&gpu.device, gpu.vertex_capacity);
        }
        if !vertices.is_empty() {
            gpu.queue
                .write_buffer(&gpu.vertex_buffer, 0, bytemuck::cast_slice(vertices));
        }

        let output = match gpu.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return Err(SurfaceError::Lost);
            }
            Err(e) => return Err(SurfaceError::Frame(e.to_string())),
        };
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = gpu.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Background Encoder"),
        });

        {
            let (target, resolve_target) = match &gpu.msaa {
                Some(msaa) => (msaa, Some(&view)),
                None => (&view, None),
            };
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Background Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: target,
                    resolve_target,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&gpu.pipeline);
            render_pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));
            render_pass.draw(0..vertices.len() as u32, 0..1);
        }

        gpu.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn release(&mut self) {
        if let Some(gpu) = self.gpu.take() {
            gpu.vertex_buffer.destroy();
            tracing::debug!("wgpu surface released");
        }
    }
}

fn vertex_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Background Vertices"),
        size: (std::mem::size_of::<Vertex>() * capacity) as u64,
        usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn msaa_view(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration, samples: u32) -> wgpu::TextureView {
    device
        .create_texture(&wgpu::TextureDescriptor {
            label: Some("Background MSAA"),
            size: wgpu::Extent3d {
                width: config.width,
                height: config.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: samples,
            dimension: wgpu::TextureDimension::D2,
            format: config.format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        })
        .create_view(&wgpu::TextureViewDescriptor::default())
}

fn backend_type(backend: wgpu::Backend) -> BackendType {
    match backend {
        wgpu::Backend::Metal => BackendType::Metal,
        wgpu::Backend::Dx12 => BackendType::DirectX12,
        wgpu::Backend::Vulkan => BackendType::Vulkan,
        wgpu::Backend::Gl => BackendType::OpenGL,
        wgpu::Backend::BrowserWebGpu => BackendType::WebGpu,
        _ => BackendType::Software,
    }
}
