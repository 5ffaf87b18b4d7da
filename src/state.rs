use std::time::Instant;

use wgpu;
use wgpu::util::DeviceExt;
use winit::{
    event::*,
    window::*,
};
use anyhow::{Context, Result};
use bytemuck;
use glam::Mat4;
use log::{info, warn};
use crate::config::{Config, Mode, ProjectionConfig};
use crate::input::Input;
use crate::mesh::{Mesh, Vertex};
use crate::rig::Rig;
use crate::texture::{DepthTexture, DEPTH_FORMAT};

pub struct State {
    surface: wgpu::Surface,
    device: wgpu::Device,
    queue: wgpu::Queue,
    sc_desc: wgpu::SwapChainDescriptor,
    swap_chain: wgpu::SwapChain,
    pub size: winit::dpi::PhysicalSize<u32>,
    render_pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    cube: Mesh,
    depth_texture: DepthTexture,
    rig: Rig,
    input: Input,
    projection: ProjectionConfig,
    clock: FrameClock,
}

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    model: [[f32; 4]; 4],
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
}

impl Uniforms {
    fn new(rig: &Rig, aspect_ratio: f32, projection: &ProjectionConfig) -> Self {
        Uniforms {
            model: Mat4::identity().to_cols_array_2d(),
            view: rig.view_matrix().to_cols_array_2d(),
            projection: rig
                .projection_matrix(aspect_ratio, projection.near, projection.far)
                .to_cols_array_2d(),
        }
    }
}

/// Seconds elapsed between successive `tick` calls.
struct FrameClock {
    last_frame: Instant,
}

impl FrameClock {
    fn new() -> Self {
        Self { last_frame: Instant::now() }
    }

    fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let delta = now.saturating_duration_since(self.last_frame);
        self.last_frame = now;
        delta.as_secs_f32()
    }
}

impl State {
    pub async fn new(window: &Window, config: &Config) -> Result<Self> {
        let size = window.inner_size();

        // initializing GPU
        let instance = wgpu::Instance::new(wgpu::BackendBit::PRIMARY);
        let surface = unsafe { instance.create_surface(window) };
        let adapter = instance.request_adapter(
            &wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::Default,
                compatible_surface: Some(&surface),
            }
        ).await.context("Failed to create adapter")?;
        info!("using adapter {:?}", adapter.get_info());
        let (device, queue) = adapter.request_device(
            &wgpu::DeviceDescriptor {
                features: wgpu::Features::empty(),
                limits: wgpu::Limits::default(),
                shader_validation: true,
            },
            None,
        ).await.context("Failed to create device")?;
        let sc_desc = wgpu::SwapChainDescriptor {
            usage: wgpu::TextureUsage::OUTPUT_ATTACHMENT,
            format: wgpu::TextureFormat::Bgra8UnormSrgb,
            width: size.width,
            height: size.height,
            present_mode: wgpu::PresentMode::Fifo,
        };
        let swap_chain = device.create_swap_chain(&surface, &sc_desc);

        let cube = Mesh::cube(&device);

        // setting up camera
        let rig = Rig::from_config(config);
        info!("running {:?} camera", rig.mode());
        if rig.mode() == Mode::Fly {
            if let Err(e) = window.set_cursor_grab(true) {
                warn!("could not grab cursor: {}", e);
            }
            window.set_cursor_visible(false);
        }

        // setting up uniform buffer
        let uniforms = Uniforms::new(&rig, aspect_ratio(&sc_desc), &config.projection);
        let uniform_buffer = device.create_buffer_init(
            &wgpu::util::BufferInitDescriptor {
                label: Some("uniform_buffer"),
                contents: bytemuck::cast_slice(&[uniforms]),
                usage: wgpu::BufferUsage::UNIFORM | wgpu::BufferUsage::COPY_DST,
            }
        );
        let uniform_bind_group_layout = device.create_bind_group_layout(
            &wgpu::BindGroupLayoutDescriptor {
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStage::VERTEX,
                        ty: wgpu::BindingType::UniformBuffer {
                            dynamic: false,
                            min_binding_size: None,
                        },
                        count: None,
                    },
                ],
                label: Some("uniform_bind_group_layout")
            }
        );
        let uniform_bind_group = device.create_bind_group(
            &wgpu::BindGroupDescriptor {
                layout: &uniform_bind_group_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::Buffer(uniform_buffer.slice(..)),
                    },
                ],
                label: Some("uniform_bind_group"),
            }
        );

        // load shaders
        let vs_module = device.create_shader_module(
            wgpu::include_spirv!("shader.vert.spv"));
        let fs_module = device.create_shader_module(
            wgpu::include_spirv!("shader.frag.spv"));

        let depth_texture = DepthTexture::new(&device, &sc_desc, Some("depth_texture"));

        // render pipeline
        let render_pipeline_layout = device.create_pipeline_layout(
            &wgpu::PipelineLayoutDescriptor {
                label: Some("render_pipeline_layout"),
                bind_group_layouts: &[&uniform_bind_group_layout],
                push_constant_ranges: &[],
            }
        );

        let render_pipeline = device.create_render_pipeline(
            &wgpu::RenderPipelineDescriptor {
                label: Some("render_pipeline"),
                layout: Some(&render_pipeline_layout),
                vertex_stage: wgpu::ProgrammableStageDescriptor {
                    module: &vs_module,
                    entry_point: "main",
                },
                fragment_stage: Some(wgpu::ProgrammableStageDescriptor {
                    module: &fs_module,
                    entry_point: "main",
                }),
                rasterization_state: Some(
                    wgpu::RasterizationStateDescriptor {
                        front_face: wgpu::FrontFace::Ccw,
                        cull_mode: wgpu::CullMode::None,
                        depth_bias: 0,
                        depth_bias_slope_scale: 0.0,
                        depth_bias_clamp: 0.0,
                        clamp_depth: false,
                    }
                ),
                color_states: &[
                    wgpu::ColorStateDescriptor {
                        format: sc_desc.format,
                        color_blend: wgpu::BlendDescriptor::REPLACE,
                        alpha_blend: wgpu::BlendDescriptor::REPLACE,
                        write_mask: wgpu::ColorWrite::ALL,
                    }
                ],
                primitive_topology: wgpu::PrimitiveTopology::TriangleList,
                depth_stencil_state: Some(wgpu::DepthStencilStateDescriptor {
                    format: DEPTH_FORMAT,
                    depth_write_enabled: true,
                    depth_compare: wgpu::CompareFunction::Less,
                    stencil: wgpu::StencilStateDescriptor::default(),
                }),
                vertex_state: wgpu::VertexStateDescriptor {
                    index_format: wgpu::IndexFormat::Uint32,
                    vertex_buffers: &[Vertex::desc()],
                },
                sample_count: 1,
                sample_mask: !0,
                alpha_to_coverage_enabled: false,
            }
        );

        Ok(Self {
            surface,
            device,
            queue,
            sc_desc,
            swap_chain,
            size,
            render_pipeline,
            uniform_buffer,
            uniform_bind_group,
            cube,
            depth_texture,
            rig,
            input: Input::new(),
            projection: config.projection.clone(),
            clock: FrameClock::new(),
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        // minimized
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.size = new_size;
        self.sc_desc.width = new_size.width;
        self.sc_desc.height = new_size.height;
        self.swap_chain = self.device.create_swap_chain(&self.surface, &self.sc_desc);
        self.depth_texture = DepthTexture::new(&self.device, &self.sc_desc, Some("depth_texture"));
    }

    pub fn input(&mut self, event: &WindowEvent) -> bool {
        self.input.handle_window_event(event)
    }

    pub fn device_input(&mut self, event: &DeviceEvent) {
        self.input.handle_device_event(event);
    }

    pub fn update(&mut self) {
        let delta_time = self.clock.tick();
        self.input.apply(&mut self.rig, delta_time);
        let uniforms = Uniforms::new(&self.rig, aspect_ratio(&self.sc_desc), &self.projection);
        self.queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));
    }

    pub fn render(&mut self) -> Result<(), wgpu::SwapChainError> {
        let frame = self.swap_chain.get_current_frame()?.output;
        let mut encoder = self.device.create_command_encoder(
            &wgpu::CommandEncoderDescriptor { label: Some("Render Encoder") },
        );
        let mut render_pass = encoder
            .begin_render_pass(&wgpu::RenderPassDescriptor {
                color_attachments: &[
                    wgpu::RenderPassColorAttachmentDescriptor {
                        attachment: &frame.view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color {
                                r: 0.2,
                                g: 0.3,
                                b: 0.3,
                                a: 1.0,
                            }),
                            store: true,
                        },
                    },
                ],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachmentDescriptor {
                    attachment: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: true,
                    }),
                    stencil_ops: None,
                }),
            });
        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.cube.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.cube.index_buffer.slice(..));
        render_pass.draw_indexed(0..self.cube.num_indices, 0, 0..1);
        drop(render_pass);
        self.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }
}

fn aspect_ratio(sc_desc: &wgpu::SwapChainDescriptor) -> f32 {
    sc_desc.width as f32 / sc_desc.height.max(1) as f32
}
