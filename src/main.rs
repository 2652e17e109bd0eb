// First-person scene: a spinning cube on a floor plane, explored with
// pointer-lock mouse look and WASD / Space / Shift movement.
//
// Frame order: RedrawRequested → SceneSession::tick (motion + ECS) → draw.

mod engine;

use std::ops::Range;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use winit::{
    event::{DeviceEvent, ElementState, Event as WinitEvent, KeyEvent, MouseButton, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};
use wgpu::util::DeviceExt;
use engine::config::{self, CameraConfig, MotionConfig};
use engine::debug_overlay::{DebugOverlay, DebugStats, OverlayFrame};
use engine::mesh::{self, GpuVertex, RenderMesh};
use engine::scene::SceneSession;
use engine::{Color as EntityColor, MeshKind, Transform};

// ============================================================================
// INSTANCE DATA (per-entity)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct InstanceData {
    model: [[f32; 4]; 4],
    color: [f32; 4],
}

impl InstanceData {
    fn new(transform: &Transform, color: &EntityColor) -> Self {
        Self {
            model: transform.model_matrix().to_cols_array_2d(),
            color: color.to_rgba(),
        }
    }

    fn desc() -> wgpu::VertexBufferLayout<'static> {
        const VEC4: wgpu::BufferAddress = std::mem::size_of::<[f32; 4]>() as wgpu::BufferAddress;
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceData>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,  // One per instance, not per vertex
            attributes: &[
                // Model matrix columns (locations 1-4)
                wgpu::VertexAttribute { offset: 0,        shader_location: 1, format: wgpu::VertexFormat::Float32x4 },
                wgpu::VertexAttribute { offset: VEC4,     shader_location: 2, format: wgpu::VertexFormat::Float32x4 },
                wgpu::VertexAttribute { offset: VEC4 * 2, shader_location: 3, format: wgpu::VertexFormat::Float32x4 },
                wgpu::VertexAttribute { offset: VEC4 * 3, shader_location: 4, format: wgpu::VertexFormat::Float32x4 },
                // Color (location 5)
                wgpu::VertexAttribute { offset: VEC4 * 4, shader_location: 5, format: wgpu::VertexFormat::Float32x4 },
            ],
        }
    }
}

const MAX_INSTANCES: usize = 16;
const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

// ============================================================================
// UNIFORM DATA (camera only)
// ============================================================================

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Uniforms {
    view_proj: [[f32; 4]; 4],
}

// ============================================================================
// GPU MESHES
// ============================================================================

struct GpuMesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    num_indices: u32,
}

impl GpuMesh {
    fn upload(device: &wgpu::Device, label: &str, mesh: &RenderMesh) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: mesh.vertex_bytes(),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: mesh.index_bytes(),
            usage: wgpu::BufferUsages::INDEX,
        });
        Self {
            vertex_buffer,
            index_buffer,
            num_indices: mesh.index_count() as u32,
        }
    }
}

// ============================================================================
// FRAME TIMING
// ============================================================================

/// Frame-time statistics over the last full second.
struct FrameStats {
    frames: u32,
    window_start: Instant,
    last_frame: Instant,
    sum_ms: f32,
    min_ms: f32,
    max_ms: f32,
    // Published once per second
    fps: u32,
    avg_ms: f32,
    shown_min_ms: f32,
    shown_max_ms: f32,
}

impl FrameStats {
    fn new() -> Self {
        let now = Instant::now();
        Self {
            frames: 0,
            window_start: now,
            last_frame: now,
            sum_ms: 0.0,
            min_ms: f32::MAX,
            max_ms: 0.0,
            fps: 0,
            avg_ms: 0.0,
            shown_min_ms: 0.0,
            shown_max_ms: 0.0,
        }
    }

    /// Record one presented frame. Returns true when a new second was published.
    fn record(&mut self) -> bool {
        let now = Instant::now();
        let ms = (now - self.last_frame).as_secs_f32() * 1000.0;
        self.last_frame = now;
        self.frames += 1;
        self.sum_ms += ms;
        self.min_ms = self.min_ms.min(ms);
        self.max_ms = self.max_ms.max(ms);

        if (now - self.window_start).as_secs_f32() < 1.0 {
            return false;
        }
        self.fps = self.frames;
        self.avg_ms = self.sum_ms / self.frames as f32;
        self.shown_min_ms = self.min_ms;
        self.shown_max_ms = self.max_ms;
        self.frames = 0;
        self.sum_ms = 0.0;
        self.min_ms = f32::MAX;
        self.max_ms = 0.0;
        self.window_start = now;
        true
    }
}

// ============================================================================
// APPLICATION STATE
// ============================================================================

struct State {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    render_pipeline: wgpu::RenderPipeline,
    depth_view: wgpu::TextureView,
    cube_mesh: GpuMesh,
    floor_mesh: GpuMesh,
    instance_buffer: wgpu::Buffer,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    overlay: DebugOverlay,
    frame_stats: FrameStats,
    draw_calls: u32,

    session: SceneSession,
}

impl State {
    async fn new(window: Arc<Window>) -> anyhow::Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create render surface")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no GPU adapter compatible with the window surface")?;
        log::info!("using adapter {:?}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await
            .context("failed to open GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no supported formats")?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };

        surface.configure(&device, &config);
        log::info!("surface configured: {:?} {}x{}", surface_format, config.width, config.height);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shader.wgsl").into()),
        });

        let uniforms = Uniforms {
            view_proj: glam::Mat4::IDENTITY.to_cols_array_2d(),
        };

        let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Uniform Buffer"),
            contents: bytemuck::cast_slice(&[uniforms]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let uniform_bind_group_layout =
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
                label: Some("uniform_bind_group_layout"),
            });

        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
            label: Some("uniform_bind_group"),
        });

        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Render Pipeline Layout"),
                bind_group_layouts: &[&uniform_bind_group_layout],
                push_constant_ranges: &[],
            });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Render Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[GpuVertex::desc(), InstanceData::desc()],  // Vertex + Instance buffers
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
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
        });

        let cube_mesh = GpuMesh::upload(&device, "Cube", &mesh::triangulate(&mesh::cube(config::CUBE_SIZE)));
        let floor_mesh = GpuMesh::upload(&device, "Floor", &mesh::triangulate(&mesh::floor(config::FLOOR_SIZE)));

        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Instance Buffer"),
            size: (MAX_INSTANCES * std::mem::size_of::<InstanceData>()) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let depth_view = create_depth_view(&device, config.width, config.height);
        let overlay = DebugOverlay::new(&window, &device, surface_format);

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            size,
            render_pipeline,
            depth_view,
            cube_mesh,
            floor_mesh,
            instance_buffer,
            uniform_buffer,
            uniform_bind_group,
            overlay,
            frame_stats: FrameStats::new(),
            draw_calls: 0,
            session: SceneSession::new(MotionConfig::default(), CameraConfig::default()),
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.depth_view = create_depth_view(&self.device, new_size.width, new_size.height);
        }
    }

    fn update(&mut self) {
        let step = self.session.tick();
        log::trace!("frame {}: {:?}", self.session.frame(), step);
    }

    /// Gather per-entity instances grouped by mesh, in draw order.
    fn collect_instances(&mut self) -> (Vec<InstanceData>, Vec<(MeshKind, Range<u32>)>) {
        let world = self.session.world_mut();
        let mut query = world.query::<(&Transform, &MeshKind, &EntityColor)>();

        let mut batches = Vec::new();
        let mut instances = Vec::new();
        for kind in [MeshKind::Floor, MeshKind::Cube] {
            let start = instances.len() as u32;
            instances.extend(
                query
                    .iter(world)
                    .filter(|(_, k, _)| **k == kind)
                    .map(|(transform, _, color)| InstanceData::new(transform, color)),
            );
            let end = (instances.len().min(MAX_INSTANCES)) as u32;
            if end > start {
                batches.push((kind, start..end));
            }
        }
        instances.truncate(MAX_INSTANCES);
        (instances, batches)
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let (instances, batches) = self.collect_instances();
        if !instances.is_empty() {
            self.queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&instances));
        }

        let aspect = self.size.width as f32 / self.size.height.max(1) as f32;
        let uniforms = Uniforms {
            view_proj: self.session.controls().camera().view_projection(aspect).to_cols_array_2d(),
        };
        self.queue.write_buffer(&self.uniform_buffer, 0, bytemuck::cast_slice(&[uniforms]));

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
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
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.uniform_bind_group, &[]);
            render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));

            for (kind, range) in &batches {
                let mesh = match kind {
                    MeshKind::Cube => &self.cube_mesh,
                    MeshKind::Floor => &self.floor_mesh,
                };
                render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                render_pass.draw_indexed(0..mesh.num_indices, 0, range.clone());
            }
        }
        self.draw_calls = batches.len() as u32;

        let stats = self.overlay.visible.then(|| self.debug_stats());
        let locked = self.session.is_locked();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: self.window.scale_factor() as f32,
        };
        self.overlay.render(
            &self.device,
            &self.queue,
            &mut encoder,
            &self.window,
            &view,
            &screen_descriptor,
            OverlayFrame {
                stats: stats.as_ref(),
                show_lock_hint: !locked,
                show_crosshair: locked,
            },
        );

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        Ok(())
    }

    fn debug_stats(&self) -> DebugStats {
        let camera = self.session.controls().camera();
        let velocity = self.session.velocity();
        DebugStats {
            fps: self.frame_stats.fps,
            frame_time_avg_ms: self.frame_stats.avg_ms,
            frame_time_min_ms: self.frame_stats.shown_min_ms,
            frame_time_max_ms: self.frame_stats.shown_max_ms,
            draw_calls: self.draw_calls,
            resolution: (self.size.width, self.size.height),
            camera_position: camera.position.to_array(),
            camera_angles: (camera.yaw.to_degrees(), camera.pitch.to_degrees()),
            look_direction: camera.look_direction().to_array(),
            held_keys: self.session.movement().held().map(|m| m.label()).collect(),
            // Internal forward velocity is negative when moving forward.
            velocity: (-velocity.x, -velocity.y),
            pointer_locked: self.session.is_locked(),
        }
    }

    /// Keyboard shortcuts handled by the host rather than the scene.
    fn handle_shortcut(&mut self, key: KeyCode) {
        match key {
            KeyCode::Escape => self.session.release_lock(self.window.as_ref()),
            KeyCode::F3 => self.overlay.toggle(),
            _ => {}
        }
    }
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

// ============================================================================
// MAIN
// ============================================================================

#[allow(deprecated)] // closure-style EventLoop::run / create_window
fn main() -> anyhow::Result<()> {
    env_logger::init();

    let event_loop = EventLoop::new().context("failed to create event loop")?;

    let window_attributes = Window::default_attributes()
        .with_title("First Light")
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

    let window = Arc::new(
        event_loop
            .create_window(window_attributes)
            .context("failed to create window")?,
    );

    let mut state = pollster::block_on(State::new(window.clone()))?;

    event_loop.run(move |event, control_flow| {
        match event {
            WinitEvent::WindowEvent {
                ref event,
                window_id,
            } if window_id == window.id() => {
                // The overlay has no interactive widgets; its response is unused.
                let _ = state.overlay.handle_window_event(&window, event);

                match event {
                    WindowEvent::CloseRequested => {
                        state.session.teardown(window.as_ref());
                        control_flow.exit();
                    }
                    WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                state: ElementState::Pressed,
                                physical_key: PhysicalKey::Code(key @ (KeyCode::Escape | KeyCode::F3)),
                                repeat: false,
                                ..
                            },
                        ..
                    } => state.handle_shortcut(*key),
                    WindowEvent::MouseInput {
                        state: ElementState::Pressed,
                        button: MouseButton::Left,
                        ..
                    } => {
                        if let Err(e) = state.session.request_lock(window.as_ref()) {
                            log::warn!("pointer lock failed: {e}");
                        }
                    }
                    WindowEvent::Resized(physical_size) => {
                        state.resize(*physical_size);
                    }
                    WindowEvent::RedrawRequested => {
                        state.update();
                        match state.render() {
                            Ok(_) => {}
                            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => state.resize(state.size),
                            Err(wgpu::SurfaceError::OutOfMemory) => {
                                log::error!("GPU out of memory, exiting");
                                state.session.teardown(window.as_ref());
                                control_flow.exit();
                            }
                            Err(e) => log::warn!("render error: {e:?}"),
                        }

                        if state.frame_stats.record() {
                            log::debug!(
                                "FPS: {} | frame {:.2} ms | draw calls: {}",
                                state.frame_stats.fps, state.frame_stats.avg_ms, state.draw_calls
                            );
                        }
                    }
                    other => state.session.handle_window_event(other, window.as_ref()),
                }
            }
            WinitEvent::DeviceEvent {
                event: DeviceEvent::MouseMotion { delta: (dx, dy) },
                ..
            } => state.session.handle_mouse_motion(dx as f32, dy as f32),
            WinitEvent::AboutToWait => {
                window.request_redraw();
            }
            WinitEvent::LoopExiting => {
                state.session.teardown(window.as_ref());
            }
            _ => {}
        }
    })?;

    Ok(())
}
