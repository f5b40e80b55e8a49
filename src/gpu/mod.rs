//! wgpu implementation of [`RenderBackend`].
//!
//! Draw calls from the scene composer are recorded during the frame and
//! replayed in a single render pass by [`Renderer::present`]. Every recorded
//! draw gets its own slot in one uniform buffer, addressed with a dynamic
//! offset. Sphere meshes are generated on first use and cached by
//! `(radius, sectors, stacks)`.

mod shader;
mod sphere;

use std::collections::HashMap;
use std::num::NonZeroU64;
use std::sync::Arc;

use wgpu::util::DeviceExt;
use winit::window::Window;

pub use shader::SPHERE_SHADER;
pub use sphere::{SphereMesh, SphereVertex};

use crate::error::GpuError;
use crate::scene::{DrawUniforms, RenderBackend, TextureHandle};
use crate::textures::TextureImage;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const UNIFORM_SIZE: u64 = std::mem::size_of::<DrawUniforms>() as u64;
/// Uniform slots allocated up front; grows on demand.
const INITIAL_DRAW_CAPACITY: u64 = 16;

type MeshKey = (u32, u32, u32);

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

#[derive(Debug, Clone, Copy)]
struct DrawCommand {
    slot: u32,
    texture: TextureHandle,
    mesh: MeshKey,
    backdrop: bool,
}

/// Owns the surface, device and every GPU resource used to draw the scene.
pub struct Renderer {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pipeline: wgpu::RenderPipeline,
    backdrop_pipeline: wgpu::RenderPipeline,
    depth_texture: wgpu::TextureView,
    clear_color: wgpu::Color,

    uniform_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    uniform_stride: u64,
    uniform_capacity: u64,

    texture_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    /// Indexed by [`TextureHandle`]; slot 0 is plain white.
    textures: Vec<wgpu::BindGroup>,
    meshes: HashMap<MeshKey, GpuMesh>,

    // Per-frame recording.
    pending_uniforms: Vec<DrawUniforms>,
    bound_texture: TextureHandle,
    commands: Vec<DrawCommand>,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, clear_color: [f64; 3]) -> Result<Self, GpuError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .ok_or(GpuError::NoAdapter)?;

        tracing::info!(adapter = ?adapter.get_info().name, backend = ?adapter.get_info().backend, "GPU adapter selected");

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or(GpuError::NoSurfaceFormat)?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = create_depth_texture(&device, &config);

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Draw Uniform Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: NonZeroU64::new(UNIFORM_SIZE),
                },
                count: None,
            }],
        });

        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Surface Texture Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let alignment = device.limits().min_uniform_buffer_offset_alignment as u64;
        let uniform_stride = UNIFORM_SIZE.div_ceil(alignment) * alignment;
        let uniform_capacity = INITIAL_DRAW_CAPACITY;
        let (uniform_buffer, uniform_bind_group) =
            create_uniform_buffer(&device, &uniform_layout, uniform_stride, uniform_capacity);

        // Planet textures wrap horizontally across the seam.
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Surface Sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Sphere Shader"),
            source: wgpu::ShaderSource::Wgsl(SPHERE_SHADER.into()),
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sphere Pipeline Layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let pipeline = create_sphere_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            config.format,
            wgpu::CompareFunction::Less,
            true,
        );
        // Backdrop: no depth test, no depth write.
        let backdrop_pipeline = create_sphere_pipeline(
            &device,
            &pipeline_layout,
            &shader,
            config.format,
            wgpu::CompareFunction::Always,
            false,
        );

        let [r, g, b] = clear_color;
        let mut renderer = Self {
            surface,
            device,
            queue,
            config,
            pipeline,
            backdrop_pipeline,
            depth_texture,
            clear_color: wgpu::Color { r, g, b, a: 1.0 },
            uniform_layout,
            uniform_buffer,
            uniform_bind_group,
            uniform_stride,
            uniform_capacity,
            texture_layout,
            sampler,
            textures: Vec::new(),
            meshes: HashMap::new(),
            pending_uniforms: Vec::new(),
            bound_texture: TextureHandle::default(),
            commands: Vec::new(),
        };
        renderer.load_texture(&TextureImage::solid(255, 255, 255));

        Ok(renderer)
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_texture = create_depth_texture(&self.device, &self.config);
        }
    }

    /// Reconfigure the surface at its current size, e.g. after it was lost.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    /// Upload an image and return its handle.
    pub fn load_texture(&mut self, image: &TextureImage) -> TextureHandle {
        let texture = self.device.create_texture_with_data(
            &self.queue,
            &wgpu::TextureDescriptor {
                label: Some("Surface Texture"),
                size: wgpu::Extent3d {
                    width: image.width,
                    height: image.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &image.data,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Surface Texture Bind Group"),
            layout: &self.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let handle = TextureHandle(self.textures.len() as u32);
        self.textures.push(bind_group);
        handle
    }

    /// Discard anything recorded since the last present.
    pub fn begin_frame(&mut self) {
        self.pending_uniforms.clear();
        self.commands.clear();
        self.bound_texture = TextureHandle::default();
    }

    /// Draw everything recorded this frame and present it.
    pub fn present(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.upload_uniforms();

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Scene Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let mut backdrop = None;
            for command in &self.commands {
                let (Some(mesh), Some(texture)) = (
                    self.meshes.get(&command.mesh),
                    self.textures.get(command.texture.0 as usize).or(self.textures.first()),
                ) else {
                    continue;
                };
                if backdrop != Some(command.backdrop) {
                    let pipeline = if command.backdrop { &self.backdrop_pipeline } else { &self.pipeline };
                    render_pass.set_pipeline(pipeline);
                    backdrop = Some(command.backdrop);
                }
                let offset = (command.slot as u64 * self.uniform_stride) as u32;
                render_pass.set_bind_group(0, &self.uniform_bind_group, &[offset]);
                render_pass.set_bind_group(1, texture, &[]);
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn upload_uniforms(&mut self) {
        let needed = self.pending_uniforms.len() as u64;
        if needed == 0 {
            return;
        }
        if needed > self.uniform_capacity {
            let capacity = needed.next_power_of_two();
            tracing::debug!(capacity, "Growing draw uniform buffer");
            let (buffer, bind_group) =
                create_uniform_buffer(&self.device, &self.uniform_layout, self.uniform_stride, capacity);
            self.uniform_buffer = buffer;
            self.uniform_bind_group = bind_group;
            self.uniform_capacity = capacity;
        }

        let stride = self.uniform_stride as usize;
        let mut bytes = vec![0u8; stride * self.pending_uniforms.len()];
        for (slot, uniforms) in self.pending_uniforms.iter().enumerate() {
            let start = slot * stride;
            bytes[start..start + UNIFORM_SIZE as usize].copy_from_slice(bytemuck::bytes_of(uniforms));
        }
        self.queue.write_buffer(&self.uniform_buffer, 0, &bytes);
    }

    fn mesh(&mut self, radius: f32, sectors: u32, stacks: u32) -> MeshKey {
        let key = (radius.to_bits(), sectors, stacks);
        if !self.meshes.contains_key(&key) {
            let mesh = SphereMesh::new(radius, sectors, stacks);
            tracing::debug!(radius, sectors, stacks, vertices = mesh.vertices.len(), "Built sphere mesh");

            let vertex_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Sphere Vertex Buffer"),
                contents: bytemuck::cast_slice(&mesh.vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Sphere Index Buffer"),
                contents: bytemuck::cast_slice(&mesh.indices),
                usage: wgpu::BufferUsages::INDEX,
            });
            self.meshes.insert(
                key,
                GpuMesh {
                    vertex_buffer,
                    index_buffer,
                    index_count: mesh.indices.len() as u32,
                },
            );
        }
        key
    }
}

impl Renderer {
    fn record(&mut self, radius: f32, sectors: u32, stacks: u32, backdrop: bool) {
        let Some(slot) = self.pending_uniforms.len().checked_sub(1) else {
            tracing::warn!("draw issued before set_uniforms, skipping");
            return;
        };
        let mesh = self.mesh(radius, sectors, stacks);
        self.commands.push(DrawCommand {
            slot: slot as u32,
            texture: self.bound_texture,
            mesh,
            backdrop,
        });
    }
}

impl RenderBackend for Renderer {
    fn set_uniforms(&mut self, uniforms: &DrawUniforms) {
        self.pending_uniforms.push(*uniforms);
    }

    fn bind_texture(&mut self, texture: TextureHandle) {
        self.bound_texture = texture;
    }

    fn draw_sphere(&mut self, radius: f32, sectors: u32, stacks: u32) {
        self.record(radius, sectors, stacks, false);
    }

    fn draw_backdrop(&mut self, radius: f32, sectors: u32, stacks: u32) {
        self.record(radius, sectors, stacks, true);
    }
}

fn create_uniform_buffer(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    stride: u64,
    capacity: u64,
) -> (wgpu::Buffer, wgpu::BindGroup) {
    let buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("Draw Uniform Buffer"),
        size: stride * capacity,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("Draw Uniform Bind Group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer: &buffer,
                offset: 0,
                size: NonZeroU64::new(UNIFORM_SIZE),
            }),
        }],
    });
    (buffer, bind_group)
}

fn create_sphere_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    depth_compare: wgpu::CompareFunction,
    depth_write_enabled: bool,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(if depth_write_enabled { "Sphere Pipeline" } else { "Backdrop Pipeline" }),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: Some("vs_main"),
            buffers: &[SphereVertex::layout()],
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
        // No culling: the starfield is seen from inside.
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: None,
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled,
            depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState::default(),
        multiview: None,
        cache: None,
    })
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Depth Texture"),
        size: wgpu::Extent3d {
            width: config.width,
            height: config.height,
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
