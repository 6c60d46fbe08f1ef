use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;
use winit::window::Window;

use crate::assets::Geometry;
use crate::traits::{ClearMode, FrameView, SceneRenderer};

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

const FALLBACK_COLOR: [f32; 3] = [0.8, 0.8, 0.8];

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct ObjectUniform {
    mvp: [[f32; 4]; 4],
}

/// Interleaves positions and colors for upload
pub fn vertices(geometry: &Geometry) -> Vec<Vertex> {
    let colors = geometry.colors();
    geometry
        .positions()
        .iter()
        .enumerate()
        .map(|(i, p)| Vertex {
            position: p.to_array(),
            color: colors.get(i).copied().unwrap_or(FALLBACK_COLOR),
        })
        .collect()
}

struct GpuObject {
    geometry: Arc<Geometry>,
    vertex_buffer: wgpu::Buffer,
    index_buffer: Option<(wgpu::Buffer, u32)>,
    vertex_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

/// Draws point clouds as points and meshes as depth-tested triangles
pub struct GpuRenderer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    object_layout: wgpu::BindGroupLayout,
    points_pipeline: wgpu::RenderPipeline,
    triangles_pipeline: wgpu::RenderPipeline,
    objects: HashMap<String, GpuObject>,
    released: bool,
}

impl GpuRenderer {
    pub async fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("Failed to create surface")?;
        let adapter = Self::request_adapter(&instance, &surface).await?;
        let (device, queue) = Self::request_device(&adapter).await?;

        let config = Self::create_surface_config(&surface, &adapter, size.width, size.height)?;
        surface.configure(&device, &config);

        let depth_view = Self::create_depth_view(&device, config.width, config.height);
        let object_layout = Self::create_object_layout(&device);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Scene Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("scene.wgsl").into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Scene Pipeline Layout"),
            bind_group_layouts: &[&object_layout],
            push_constant_ranges: &[],
        });

        let points_pipeline = Self::create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            config.format,
            wgpu::PrimitiveTopology::PointList,
        );
        let triangles_pipeline = Self::create_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            config.format,
            wgpu::PrimitiveTopology::TriangleList,
        );

        log::info!(
            "GPU renderer ready: {}x{} {:?} ({:?} alpha)",
            config.width,
            config.height,
            config.format,
            config.alpha_mode
        );

        Ok(Self {
            device,
            queue,
            surface,
            config,
            depth_view,
            object_layout,
            points_pipeline,
            triangles_pipeline,
            objects: HashMap::new(),
            released: false,
        })
    }

    async fn request_adapter(
        instance: &wgpu::Instance,
        surface: &wgpu::Surface<'_>,
    ) -> Result<wgpu::Adapter> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| anyhow!("Failed to find appropriate adapter: {}", e))
    }

    async fn request_device(adapter: &wgpu::Adapter) -> Result<(wgpu::Device, wgpu::Queue)> {
        adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
                experimental_features: Default::default(),
                trace: Default::default(),
            })
            .await
            .context("Failed to create device")
    }

    fn create_surface_config(
        surface: &wgpu::Surface,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Result<wgpu::SurfaceConfiguration> {
        let caps = surface.get_capabilities(adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .context("Surface reports no texture formats")?;

        // Zero-alpha clears only composite over the feed with a blending alpha mode
        let alpha_mode = [
            wgpu::CompositeAlphaMode::PreMultiplied,
            wgpu::CompositeAlphaMode::PostMultiplied,
        ]
        .into_iter()
        .find(|mode| caps.alpha_modes.contains(mode))
        .or_else(|| caps.alpha_modes.first().copied())
        .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        Ok(wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        })
    }

    fn create_depth_view(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Depth Texture"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        texture.create_view(&wgpu::TextureViewDescriptor::default())
    }

    fn create_object_layout(device: &wgpu::Device) -> wgpu::BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("object_bind_group_layout"),
        })
    }

    fn create_pipeline(
        device: &wgpu::Device,
        layout: &wgpu::PipelineLayout,
        shader: &wgpu::ShaderModule,
        format: wgpu::TextureFormat,
        topology: wgpu::PrimitiveTopology,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(match topology {
                wgpu::PrimitiveTopology::PointList => "Points Pipeline",
                _ => "Triangles Pipeline",
            }),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &[Vertex::layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })
    }

    fn upload(&self, name: &str, geometry: &Arc<Geometry>) -> GpuObject {
        let vertices = vertices(geometry);
        let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(name),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = match geometry.as_ref() {
            Geometry::Mesh { indices, .. } if !indices.is_empty() => {
                let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(name),
                    contents: bytemuck::cast_slice(indices),
                    usage: wgpu::BufferUsages::INDEX,
                });
                Some((buffer, indices.len() as u32))
            }
            _ => None,
        };

        let uniform_buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Object Uniform"),
            size: std::mem::size_of::<ObjectUniform>() as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &self.object_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("object_bind_group"),
        });

        log::debug!("Uploaded {} ({} vertices)", name, vertices.len());

        GpuObject {
            geometry: Arc::clone(geometry),
            vertex_buffer,
            index_buffer,
            vertex_count: vertices.len() as u32,
            uniform_buffer,
            bind_group,
        }
    }
}

impl SceneRenderer for GpuRenderer {
    fn render(&mut self, frame: &FrameView<'_>) -> Result<()> {
        if self.released {
            bail!("renderer used after release");
        }

        for item in &frame.objects {
            let stale = self
                .objects
                .get(item.name)
                .map_or(true, |gpu| !Arc::ptr_eq(&gpu.geometry, item.geometry));
            if stale {
                let gpu = self.upload(item.name, item.geometry);
                self.objects.insert(item.name.to_string(), gpu);
            }
        }

        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                return Ok(());
            }
            Err(e) => return Err(e).context("Failed to acquire surface texture"),
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let clear = match frame.clear {
            ClearMode::Opaque => wgpu::Color::BLACK,
            ClearMode::Transparent => wgpu::Color::TRANSPARENT,
        };

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(clear),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            for item in &frame.objects {
                let Some(gpu) = self.objects.get(item.name) else {
                    continue;
                };

                let uniform = ObjectUniform {
                    mvp: (frame.view_projection * item.model).to_cols_array_2d(),
                };
                self.queue
                    .write_buffer(&gpu.uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));

                render_pass.set_bind_group(0, &gpu.bind_group, &[]);
                render_pass.set_vertex_buffer(0, gpu.vertex_buffer.slice(..));

                match &gpu.index_buffer {
                    Some((indices, count)) => {
                        render_pass.set_pipeline(&self.triangles_pipeline);
                        render_pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                        render_pass.draw_indexed(0..*count, 0, 0..1);
                    }
                    None => {
                        let pipeline = match gpu.geometry.as_ref() {
                            Geometry::Points { .. } => &self.points_pipeline,
                            Geometry::Mesh { .. } => &self.triangles_pipeline,
                        };
                        render_pass.set_pipeline(pipeline);
                        render_pass.draw(0..gpu.vertex_count, 0..1);
                    }
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 || self.released {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = Self::create_depth_view(&self.device, width, height);
    }

    fn output_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    fn release(&mut self) {
        if self.released {
            return;
        }
        self.objects.clear();
        self.device
            .poll(wgpu::PollType::Wait {
                submission_index: None,
                timeout: None,
            })
            .ok();
        self.released = true;
        log::info!("GPU renderer released");
    }
}

/// Renderer without a surface; counts what it was asked to draw
#[derive(Debug, Clone, Default)]
pub struct HeadlessRenderer {
    size: (u32, u32),
    frames: u64,
    last_clear: Option<ClearMode>,
    last_object_count: usize,
    last_vertex_count: usize,
    released: bool,
}

impl HeadlessRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            ..Self::default()
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn last_clear(&self) -> Option<ClearMode> {
        self.last_clear
    }

    pub fn last_object_count(&self) -> usize {
        self.last_object_count
    }

    pub fn last_vertex_count(&self) -> usize {
        self.last_vertex_count
    }

    pub fn is_released(&self) -> bool {
        self.released
    }
}

impl SceneRenderer for HeadlessRenderer {
    fn render(&mut self, frame: &FrameView<'_>) -> Result<()> {
        if self.released {
            bail!("renderer used after release");
        }
        self.frames += 1;
        self.last_clear = Some(frame.clear);
        self.last_object_count = frame.objects.len();
        self.last_vertex_count = frame
            .objects
            .iter()
            .map(|item| item.geometry.vertex_count())
            .sum();
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn output_size(&self) -> (u32, u32) {
        self.size
    }

    fn release(&mut self) {
        self.released = true;
    }
}
