use crate::texture;
use bytemuck::{Pod, Zeroable};
use finder_render::{
    BufferHandle, BufferTarget, CUBE_VERTEX_STRIDE, DrawCall, GpuError, GpuSurface,
    ProgramHandle, TextureHandle, Uniform,
};
use glam::Mat4;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};
use wgpu::util::DeviceExt;

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.2,
    g: 0.2,
    b: 0.2,
    a: 1.0,
};

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Uniforms {
    projection: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    model: [[f32; 4]; 4],
}

impl Default for Uniforms {
    fn default() -> Self {
        let identity = Mat4::IDENTITY.to_cols_array_2d();
        Self {
            projection: identity,
            view: identity,
            model: identity,
        }
    }
}

struct Program {
    pipeline: wgpu::RenderPipeline,
    uniforms: Uniforms,
}

struct Buffer {
    target: BufferTarget,
    raw: Option<wgpu::Buffer>,
}

struct QueuedDraw {
    call: DrawCall,
    uniforms: Uniforms,
}

struct Frame {
    output: wgpu::SurfaceTexture,
    draws: Vec<QueuedDraw>,
}

/// [`GpuSurface`] backed by a wgpu device presenting to a window surface.
///
/// Draws are queued between `begin_frame` and `end_frame` with a snapshot of
/// their program's uniforms, then encoded into a single render pass.
pub struct WgpuSurface {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    sampler: wgpu::Sampler,
    white: wgpu::TextureView,
    next_handle: u32,
    buffers: BTreeMap<BufferHandle, Buffer>,
    bound: BTreeMap<BufferTarget, BufferHandle>,
    textures: BTreeMap<TextureHandle, wgpu::TextureView>,
    programs: BTreeMap<ProgramHandle, Program>,
    frame: Option<Frame>,
}

impl WgpuSurface {
    /// Pick an adapter compatible with `surface`, open a device, and
    /// configure the surface for `width` x `height`.
    pub fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'static>,
        width: u32,
        height: u32,
    ) -> Result<Self, GpuError> {
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| GpuError::Surface("no compatible adapter".into()))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("finder_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .map_err(|e| GpuError::Surface(e.to_string()))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(caps.formats.first())
            .copied()
            .ok_or_else(|| GpuError::Surface("surface reports no formats".into()))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("cube_bind_group_layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("cube_pipeline_layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("cube_sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        let white = texture::white(&device, &queue);
        let depth_view = texture::create_depth_texture(&device, config.width, config.height);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            depth_view,
            bind_group_layout,
            pipeline_layout,
            sampler,
            white,
            next_handle: 0,
            buffers: BTreeMap::new(),
            bound: BTreeMap::new(),
            textures: BTreeMap::new(),
            programs: BTreeMap::new(),
            frame: None,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    /// Next handle value. Values are never reused, so running out is an error.
    fn issue(&mut self) -> Result<u32, GpuError> {
        self.next_handle = self
            .next_handle
            .checked_add(1)
            .ok_or(GpuError::HandlesExhausted)?;
        Ok(self.next_handle)
    }

    fn read_shader(path: &Path) -> Result<String, GpuError> {
        std::fs::read_to_string(path).map_err(|source| GpuError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn build_pipeline(&self, vertex: &Path, fragment: &Path) -> Result<wgpu::RenderPipeline, GpuError> {
        let vertex_src = Self::read_shader(vertex)?;
        let fragment_src = Self::read_shader(fragment)?;

        self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let vertex_module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: vertex.to_str(),
            source: wgpu::ShaderSource::Wgsl(vertex_src.into()),
        });
        let fragment_module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: fragment.to_str(),
            source: wgpu::ShaderSource::Wgsl(fragment_src.into()),
        });

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("cube_pipeline"),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: CUBE_VERTEX_STRIDE as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![
                        0 => Float32x3,
                        1 => Float32x2,
                    ],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: crate::DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        match pollster::block_on(self.device.pop_error_scope()) {
            Some(err) => Err(GpuError::Shader(err.to_string())),
            None => Ok(pipeline),
        }
    }

    fn encode_frame(&self, frame: &Frame) -> wgpu::CommandBuffer {
        let view = frame
            .output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // Resolve every draw up front so the pass only borrows prepared data.
        let mut prepared = Vec::with_capacity(frame.draws.len());
        for draw in &frame.draws {
            let (Some(program), Some(vbo), Some(ibo)) = (
                self.programs.get(&draw.call.program),
                self.raw_buffer(draw.call.vertex_buffer),
                self.raw_buffer(draw.call.index_buffer),
            ) else {
                warn!(program = ?draw.call.program, "dropping draw: resources released before end of frame");
                continue;
            };
            let texture = draw
                .call
                .texture
                .and_then(|t| self.textures.get(&t))
                .unwrap_or(&self.white);
            let uniform_buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("cube_uniforms"),
                contents: bytemuck::bytes_of(&draw.uniforms),
                usage: wgpu::BufferUsages::UNIFORM,
            });
            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some("cube_bind_group"),
                layout: &self.bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: uniform_buffer.as_entire_binding(),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(texture),
                    },
                    wgpu::BindGroupEntry {
                        binding: 2,
                        resource: wgpu::BindingResource::Sampler(&self.sampler),
                    },
                ],
            });
            prepared.push((&program.pipeline, vbo, ibo, bind_group, draw.call.index_count));
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("main_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(CLEAR_COLOR),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            for (pipeline, vbo, ibo, bind_group, index_count) in &prepared {
                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, bind_group, &[]);
                pass.set_vertex_buffer(0, vbo.slice(..));
                pass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..*index_count, 0, 0..1);
            }
        }
        encoder.finish()
    }

    fn raw_buffer(&self, handle: BufferHandle) -> Option<&wgpu::Buffer> {
        self.buffers.get(&handle).and_then(|b| b.raw.as_ref())
    }
}

impl GpuSurface for WgpuSurface {
    fn begin_frame(&mut self) -> Result<(), GpuError> {
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
                self.surface
                    .get_current_texture()
                    .map_err(|e| GpuError::Surface(e.to_string()))?
            }
            Err(e) => return Err(GpuError::Surface(e.to_string())),
        };
        self.frame = Some(Frame {
            output,
            draws: Vec::new(),
        });
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), GpuError> {
        let frame = self.frame.take().ok_or(GpuError::NotInFrame)?;
        let commands = self.encode_frame(&frame);
        self.queue.submit(std::iter::once(commands));
        frame.output.present();
        Ok(())
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = texture::create_depth_texture(&self.device, width, height);
        debug!(width, height, "surface resized");
    }

    fn create_buffer(&mut self, target: BufferTarget) -> Result<BufferHandle, GpuError> {
        let handle = BufferHandle(self.issue()?);
        self.buffers.insert(handle, Buffer { target, raw: None });
        Ok(handle)
    }

    fn bind_buffer(
        &mut self,
        target: BufferTarget,
        buffer: Option<BufferHandle>,
    ) -> Result<(), GpuError> {
        match buffer {
            Some(handle) => {
                if !self.buffers.contains_key(&handle) {
                    return Err(GpuError::UnknownBuffer(handle));
                }
                self.bound.insert(target, handle);
            }
            None => {
                self.bound.remove(&target);
            }
        }
        Ok(())
    }

    fn upload_data(&mut self, target: BufferTarget, bytes: &[u8]) -> Result<(), GpuError> {
        let handle = *self
            .bound
            .get(&target)
            .ok_or(GpuError::NothingBound(target))?;
        let buffer = self
            .buffers
            .get_mut(&handle)
            .ok_or(GpuError::UnknownBuffer(handle))?;
        let usage = match buffer.target {
            BufferTarget::Vertex => wgpu::BufferUsages::VERTEX,
            BufferTarget::Index => wgpu::BufferUsages::INDEX,
        };
        buffer.raw = Some(self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("render_object_buffer"),
            contents: bytes,
            usage,
        }));
        Ok(())
    }

    fn create_texture(&mut self, path: &Path) -> Result<TextureHandle, GpuError> {
        let image = texture::load_rgba8(path)?;
        let label = path.display().to_string();
        let view = texture::upload(&self.device, &self.queue, &label, &image);
        let handle = TextureHandle(self.issue()?);
        self.textures.insert(handle, view);
        debug!(%label, width = image.width, height = image.height, "texture loaded");
        Ok(handle)
    }

    fn create_program(
        &mut self,
        vertex: &Path,
        fragment: &Path,
    ) -> Result<ProgramHandle, GpuError> {
        let pipeline = self.build_pipeline(vertex, fragment)?;
        let handle = ProgramHandle(self.issue()?);
        self.programs.insert(
            handle,
            Program {
                pipeline,
                uniforms: Uniforms::default(),
            },
        );
        Ok(handle)
    }

    fn set_uniform(
        &mut self,
        program: ProgramHandle,
        name: &str,
        value: Uniform,
    ) -> Result<(), GpuError> {
        let program = self
            .programs
            .get_mut(&program)
            .ok_or(GpuError::UnknownProgram(program))?;
        match (name, value) {
            ("projection", Uniform::Mat4(m)) => program.uniforms.projection = m.to_cols_array_2d(),
            ("view", Uniform::Mat4(m)) => program.uniforms.view = m.to_cols_array_2d(),
            ("model", Uniform::Mat4(m)) => program.uniforms.model = m.to_cols_array_2d(),
            // Only texture unit 0 exists; the sampler binding is fixed.
            ("texture0", Uniform::Int(0)) => {}
            (name, value) => debug!(name, ?value, "ignoring unsupported uniform"),
        }
        Ok(())
    }

    fn draw_indexed(&mut self, call: &DrawCall) -> Result<(), GpuError> {
        let uniforms = self
            .programs
            .get(&call.program)
            .ok_or(GpuError::UnknownProgram(call.program))?
            .uniforms;
        for buffer in [call.vertex_buffer, call.index_buffer] {
            if self.raw_buffer(buffer).is_none() {
                return Err(GpuError::UnknownBuffer(buffer));
            }
        }
        let frame = self.frame.as_mut().ok_or(GpuError::NotInFrame)?;
        frame.draws.push(QueuedDraw {
            call: *call,
            uniforms,
        });
        Ok(())
    }

    fn delete_buffer(&mut self, buffer: BufferHandle) {
        self.buffers.remove(&buffer);
        self.bound.retain(|_, b| *b != buffer);
    }

    fn delete_texture(&mut self, texture: TextureHandle) {
        self.textures.remove(&texture);
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        self.programs.remove(&program);
    }
}
