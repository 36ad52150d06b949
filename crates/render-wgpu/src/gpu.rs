use crate::shaders;
use crate::texture::GpuTextures;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use parkview_common::{ModelHandle, TextureHandle};
use parkview_render::{DepthFunc, Program, RenderBackend, SKYBOX_TEXTURE_UNIT, SKYBOX_VERTICES, uniforms};
use std::collections::{BTreeMap, BTreeSet};
use wgpu::util::DeviceExt;

/// Offset alignment for dynamic uniform bindings.
const UNIFORM_STRIDE: u64 = 256;
const MAX_DRAWS: usize = 1024;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct DrawUniforms {
    model: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    color: [f32; 4],
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    normal: [f32; 3],
}

/// Stand-in geometry drawn for every ready model: a unit cube.
fn proxy_mesh() -> (Vec<Vertex>, Vec<u16>) {
    let p = 0.5_f32;
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ];
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, u, v) in faces {
        let base = vertices.len() as u16;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let position = std::array::from_fn(|i| (normal[i] + su * u[i] + sv * v[i]) * p);
            vertices.push(Vertex { position, normal });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }
    (vertices, indices)
}

/// Flat color derived from a model handle so proxies are told apart.
fn proxy_color(model: ModelHandle) -> [f32; 4] {
    let bytes = model.0.to_le_bytes();
    let channel = |b: u8| 0.35 + 0.6 * (b as f32 / 255.0);
    [channel(bytes[0]), channel(bytes[1]), channel(bytes[2]), 1.0]
}

enum DrawKind {
    Mesh,
    Skybox(TextureHandle),
}

struct PendingDraw {
    kind: DrawKind,
    depth: DepthFunc,
    uniforms: DrawUniforms,
}

/// Pipelines for one program, one per depth function.
struct PipelinePair {
    less: wgpu::RenderPipeline,
    less_equal: wgpu::RenderPipeline,
}

impl PipelinePair {
    fn get(&self, func: DepthFunc) -> &wgpu::RenderPipeline {
        match func {
            DepthFunc::Less => &self.less,
            DepthFunc::LessEqual => &self.less_equal,
        }
    }
}

/// wgpu implementation of [`RenderBackend`].
///
/// Calls between [`begin_frame`](Self::begin_frame) and
/// [`submit`](Self::submit) are buffered, then replayed in order inside a
/// single render pass. Each draw snapshots the current program's uniforms
/// into its own slot of a dynamic-offset uniform buffer.
pub struct WgpuRenderer {
    mesh_pipelines: PipelinePair,
    skybox_pipelines: PipelinePair,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    mesh_vertex_buffer: wgpu::Buffer,
    mesh_index_buffer: wgpu::Buffer,
    mesh_index_count: u32,
    skybox_vertex_buffer: wgpu::Buffer,
    depth_texture: wgpu::TextureView,
    surface_format: wgpu::TextureFormat,
    textures: GpuTextures,

    ready_models: BTreeSet<ModelHandle>,
    program: Option<Program>,
    mat4s: BTreeMap<(Program, &'static str), Mat4>,
    depth_func: DepthFunc,
    cubemap: TextureHandle,
    clear_color: [f32; 4],
    draws: Vec<PendingDraw>,
}

impl WgpuRenderer {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat, width: u32, height: u32) -> Self {
        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("draw_uniform_buffer"),
            size: UNIFORM_STRIDE * MAX_DRAWS as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniform_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("draw_uniform_layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: true,
                    min_binding_size: wgpu::BufferSize::new(std::mem::size_of::<DrawUniforms>() as u64),
                },
                count: None,
            }],
        });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("draw_uniform_bind_group"),
            layout: &uniform_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                    buffer: &uniform_buffer,
                    offset: 0,
                    size: wgpu::BufferSize::new(std::mem::size_of::<DrawUniforms>() as u64),
                }),
            }],
        });

        let textures = GpuTextures::new(device);

        let mesh_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mesh_pipeline_layout"),
            bind_group_layouts: &[&uniform_layout],
            push_constant_ranges: &[],
        });
        let skybox_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("skybox_pipeline_layout"),
            bind_group_layouts: &[&uniform_layout, textures.cube_layout()],
            push_constant_ranges: &[],
        });

        let mesh_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mesh_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::mesh_shader().into()),
        });
        let skybox_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("skybox_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::skybox_shader().into()),
        });

        let mesh_buffers = [wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3],
        }];
        let skybox_buffers = [wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 3]>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &wgpu::vertex_attr_array![0 => Float32x3],
        }];

        let mesh = ProgramDesc {
            label: "mesh",
            layout: &mesh_layout,
            shader: &mesh_shader,
            vs: "vs_mesh",
            fs: "fs_mesh",
            buffers: &mesh_buffers,
            cull_mode: Some(wgpu::Face::Back),
        };
        // The camera sits inside the skybox cube.
        let skybox = ProgramDesc {
            label: "skybox",
            layout: &skybox_layout,
            shader: &skybox_shader,
            vs: "vs_sky",
            fs: "fs_sky",
            buffers: &skybox_buffers,
            cull_mode: None,
        };

        let mesh_pipelines = mesh.build_pair(device, surface_format);
        let skybox_pipelines = skybox.build_pair(device, surface_format);

        let (mesh_verts, mesh_indices) = proxy_mesh();
        let mesh_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("proxy_vertex_buffer"),
            contents: bytemuck::cast_slice(&mesh_verts),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let mesh_index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("proxy_index_buffer"),
            contents: bytemuck::cast_slice(&mesh_indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let skybox_vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("skybox_vertex_buffer"),
            contents: bytemuck::cast_slice(&SKYBOX_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            mesh_pipelines,
            skybox_pipelines,
            uniform_buffer,
            uniform_bind_group,
            mesh_vertex_buffer,
            mesh_index_buffer,
            mesh_index_count: mesh_indices.len() as u32,
            skybox_vertex_buffer,
            depth_texture: Self::create_depth_texture(device, width, height),
            surface_format,
            textures,
            ready_models: BTreeSet::new(),
            program: None,
            mat4s: BTreeMap::new(),
            depth_func: DepthFunc::default(),
            cubemap: TextureHandle::EMPTY,
            clear_color: [0.0, 0.0, 0.0, 1.0],
            draws: Vec::new(),
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.depth_texture = Self::create_depth_texture(device, width, height);
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.surface_format
    }

    pub fn textures_mut(&mut self) -> &mut GpuTextures {
        &mut self.textures
    }

    /// Models the backend may draw. Anything else is treated as failed.
    pub fn set_ready_models(&mut self, models: impl IntoIterator<Item = ModelHandle>) {
        self.ready_models = models.into_iter().collect();
    }

    /// Start buffering a new frame.
    pub fn begin_frame(&mut self) {
        self.draws.clear();
    }

    /// Replay the buffered frame into `view` and submit it.
    pub fn submit(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, view: &wgpu::TextureView) {
        if self.draws.len() > MAX_DRAWS {
            tracing::warn!("frame has {} draws, dropping all past {MAX_DRAWS}", self.draws.len());
            self.draws.truncate(MAX_DRAWS);
        }

        if !self.draws.is_empty() {
            let mut staging = vec![0u8; self.draws.len() * UNIFORM_STRIDE as usize];
            for (slot, draw) in staging.chunks_mut(UNIFORM_STRIDE as usize).zip(&self.draws) {
                let bytes = bytemuck::bytes_of(&draw.uniforms);
                slot[..bytes.len()].copy_from_slice(bytes);
            }
            queue.write_buffer(&self.uniform_buffer, 0, &staging);
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("frame_encoder"),
        });

        {
            let [r, g, b, a] = self.clear_color.map(f64::from);
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("frame_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
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
                ..Default::default()
            });

            for (slot, draw) in self.draws.iter().enumerate() {
                let offset = (slot as u64 * UNIFORM_STRIDE) as u32;
                match draw.kind {
                    DrawKind::Mesh => {
                        pass.set_pipeline(self.mesh_pipelines.get(draw.depth));
                        pass.set_bind_group(0, &self.uniform_bind_group, &[offset]);
                        pass.set_vertex_buffer(0, self.mesh_vertex_buffer.slice(..));
                        pass.set_index_buffer(self.mesh_index_buffer.slice(..), wgpu::IndexFormat::Uint16);
                        pass.draw_indexed(0..self.mesh_index_count, 0, 0..1);
                    }
                    DrawKind::Skybox(texture) => {
                        let Some(cube) = self.textures.cube_bind_group(texture) else {
                            continue;
                        };
                        pass.set_pipeline(self.skybox_pipelines.get(draw.depth));
                        pass.set_bind_group(0, &self.uniform_bind_group, &[offset]);
                        pass.set_bind_group(1, cube, &[]);
                        pass.set_vertex_buffer(0, self.skybox_vertex_buffer.slice(..));
                        pass.draw(0..SKYBOX_VERTICES.len() as u32, 0..1);
                    }
                }
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
    }

    fn snapshot(&self, program: Program, color: [f32; 4]) -> DrawUniforms {
        let get = |name: &'static str| {
            self.mat4s
                .get(&(program, name))
                .copied()
                .unwrap_or(Mat4::IDENTITY)
                .to_cols_array_2d()
        };
        DrawUniforms {
            model: get(uniforms::MODEL),
            view: get(uniforms::VIEW),
            projection: get(uniforms::PROJECTION),
            color,
        }
    }

    fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> wgpu::TextureView {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth_texture"),
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
        texture.create_view(&Default::default())
    }
}

impl RenderBackend for WgpuRenderer {
    fn clear(&mut self, color: [f32; 4]) {
        self.clear_color = color;
    }

    fn use_program(&mut self, program: Program) {
        self.program = Some(program);
    }

    fn set_mat4(&mut self, name: &str, value: &Mat4) {
        let Some(program) = self.program else {
            tracing::warn!("set_mat4({name}) with no program bound");
            return;
        };
        let key = match name {
            uniforms::MODEL => uniforms::MODEL,
            uniforms::VIEW => uniforms::VIEW,
            uniforms::PROJECTION => uniforms::PROJECTION,
            other => {
                tracing::warn!("unknown matrix uniform '{other}'");
                return;
            }
        };
        self.mat4s.insert((program, key), *value);
    }

    /// The cubemap sampler has a fixed binding, so there is nothing to
    /// store; a unit other than 0 is only reported.
    fn set_int(&mut self, name: &str, value: i32) {
        if name == uniforms::SKYBOX && value != SKYBOX_TEXTURE_UNIT as i32 {
            tracing::warn!("skybox sampler unit {value} unsupported, using {SKYBOX_TEXTURE_UNIT}");
        }
    }

    fn depth_func(&self) -> DepthFunc {
        self.depth_func
    }

    fn set_depth_func(&mut self, func: DepthFunc) {
        self.depth_func = func;
    }

    fn draw_model(&mut self, model: ModelHandle) {
        if self.program != Some(Program::Scene) || !self.ready_models.contains(&model) {
            return;
        }
        let uniforms = self.snapshot(Program::Scene, proxy_color(model));
        self.draws.push(PendingDraw {
            kind: DrawKind::Mesh,
            depth: self.depth_func,
            uniforms,
        });
    }

    fn bind_cubemap(&mut self, unit: u32, texture: TextureHandle) {
        if unit == SKYBOX_TEXTURE_UNIT {
            self.cubemap = texture;
        }
    }

    fn draw_skybox(&mut self, _vertex_count: u32) {
        if self.program != Some(Program::Skybox) || self.cubemap.is_empty() {
            return;
        }
        let uniforms = self.snapshot(Program::Skybox, [1.0; 4]);
        self.draws.push(PendingDraw {
            kind: DrawKind::Skybox(self.cubemap),
            depth: self.depth_func,
            uniforms,
        });
    }
}

struct ProgramDesc<'a> {
    label: &'a str,
    layout: &'a wgpu::PipelineLayout,
    shader: &'a wgpu::ShaderModule,
    vs: &'a str,
    fs: &'a str,
    buffers: &'a [wgpu::VertexBufferLayout<'a>],
    cull_mode: Option<wgpu::Face>,
}

impl ProgramDesc<'_> {
    fn build_pair(&self, device: &wgpu::Device, format: wgpu::TextureFormat) -> PipelinePair {
        PipelinePair {
            less: self.build(device, format, wgpu::CompareFunction::Less),
            less_equal: self.build(device, format, wgpu::CompareFunction::LessEqual),
        }
    }

    fn build(
        &self,
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        depth_compare: wgpu::CompareFunction,
    ) -> wgpu::RenderPipeline {
        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(self.label),
            layout: Some(self.layout),
            vertex: wgpu::VertexState {
                module: self.shader,
                entry_point: Some(self.vs),
                compilation_options: Default::default(),
                buffers: self.buffers,
            },
            fragment: Some(wgpu::FragmentState {
                module: self.shader,
                entry_point: Some(self.fs),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: self.cull_mode,
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                depth_compare,
                stencil: Default::default(),
                bias: Default::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        })
    }
}
