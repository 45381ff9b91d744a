//! GPU plumbing: device setup, pipelines, per-frame uniform updates and the
//! winit event loop.
//!
//! Per-frame protocol: the scene driver updates the car and camera, then
//! `render` copies the camera matrices into the camera uniform, writes one
//! object uniform per draw (lit objects, then flattened shadow geometry) and
//! records a single render pass: lit pass, shadow pass, sky last.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use bytemuck::{Pod, Zeroable};
use cgmath::{Matrix4, SquareMatrix};
use wgpu::util::DeviceExt;
use winit::{
    dpi::LogicalSize,
    event::{DeviceEvent, ElementState, Event, WindowEvent},
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowBuilder},
};

use crate::app::DemoApp;
use crate::camera::Camera;
use crate::config::DemoConfig;
use crate::constants::scene::GROUND_SIZE;
use crate::error::EngineError;
use crate::input::InputState;
use crate::renderer::mesh::{
    build_box, build_cylinder, build_house, build_plane, build_sky_cube, GpuMesh,
};
use crate::renderer::vertex::Vertex;
use crate::scene::{DirectionalLight, Material, MeshKind, PointLight};

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    view_proj: [[f32; 4]; 4],
    position: [f32; 3],
    _padding: f32,
}

impl CameraUniform {
    fn new() -> Self {
        Self {
            view: Matrix4::identity().into(),
            projection: Matrix4::identity().into(),
            view_proj: Matrix4::identity().into(),
            position: [0.0, 0.0, 0.0],
            _padding: 0.0,
        }
    }

    fn update(&mut self, camera: &dyn Camera) {
        let view = camera.view_matrix();
        let proj = camera.proj_matrix();
        self.view = view.into();
        self.projection = proj.into();
        self.view_proj = (proj * view).into();
        let pos = camera.position();
        self.position = [pos.x, pos.y, pos.z];
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct LightUniform {
    dir_direction: [f32; 3],
    _pad0: f32,
    dir_ambient: [f32; 4],
    dir_diffuse: [f32; 4],
    dir_specular: [f32; 4],
    point_position: [f32; 3],
    point_range: f32,
    point_ambient: [f32; 4],
    point_diffuse: [f32; 4],
    point_specular: [f32; 4],
    point_attenuation: [f32; 3],
    _pad1: f32,
}

impl LightUniform {
    fn from_lights(dir: &DirectionalLight, point: &PointLight) -> Self {
        Self {
            dir_direction: dir.direction,
            _pad0: 0.0,
            dir_ambient: dir.ambient,
            dir_diffuse: dir.diffuse,
            dir_specular: dir.specular,
            point_position: point.position,
            point_range: point.range,
            point_ambient: point.ambient,
            point_diffuse: point.diffuse,
            point_specular: point.specular,
            point_attenuation: point.attenuation,
            _pad1: 0.0,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct ObjectUniform {
    world: [[f32; 4]; 4],
    ambient: [f32; 4],
    diffuse: [f32; 4],
    specular: [f32; 4],
}

impl ObjectUniform {
    fn from_parts(world: Matrix4<f32>, material: &Material) -> Self {
        Self {
            world: world.into(),
            ambient: material.ambient,
            diffuse: material.diffuse,
            specular: material.specular,
        }
    }
}

/// One uniform buffer + bind group per draw, reused across frames.
struct ObjectSlot {
    buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
}

pub struct GpuState {
    pub window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    pub size: winit::dpi::PhysicalSize<u32>,
    depth_texture: wgpu::TextureView,

    scene_pipeline: wgpu::RenderPipeline,
    shadow_pipeline: wgpu::RenderPipeline,
    sky_pipeline: wgpu::RenderPipeline,

    camera_uniform: CameraUniform,
    camera_buffer: wgpu::Buffer,
    light_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,

    object_layout: wgpu::BindGroupLayout,
    object_slots: Vec<ObjectSlot>,

    meshes: HashMap<MeshKind, GpuMesh>,
    sky_mesh: GpuMesh,
}

impl GpuState {
    async fn new(window: Arc<Window>, app: &DemoApp) -> Result<Self> {
        log::info!("[GpuState::new] Starting GPU initialization");
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Some(adapter) => adapter,
            None => {
                log::warn!("[GpuState::new] No high-performance adapter, trying low power");
                instance
                    .request_adapter(&wgpu::RequestAdapterOptions {
                        power_preference: wgpu::PowerPreference::LowPower,
                        compatible_surface: Some(&surface),
                        force_fallback_adapter: false,
                    })
                    .await
                    .ok_or(EngineError::AdapterNotFound)?
            }
        };
        let info = adapter.get_info();
        log::info!(
            "[GpuState::new] Adapter: {} ({:?}, {:?})",
            info.name,
            info.device_type,
            info.backend
        );

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("gokart device"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::downlevel_defaults()
                        .using_resolution(adapter.limits()),
                },
                None,
            )
            .await
            .map_err(EngineError::DeviceRequest)?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::Fifo,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        log::info!(
            "[GpuState::new] Surface configured {}x{} ({:?})",
            config.width,
            config.height,
            config.format
        );

        let depth_texture = create_depth_texture(&device, &config);

        // Frame uniforms: camera + lights.
        let camera_uniform = CameraUniform::new();
        let camera_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("camera buffer"),
            contents: bytemuck::cast_slice(&[camera_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });
        let light_uniform = LightUniform::from_lights(app.dir_light(), app.point_light());
        let light_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("light buffer"),
            contents: bytemuck::cast_slice(&[light_uniform]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let frame_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
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
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
            label: Some("frame_bind_group_layout"),
        });
        let frame_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &frame_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: light_buffer.as_entire_binding(),
                },
            ],
            label: Some("frame_bind_group"),
        });

        let object_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
            label: Some("object_bind_group_layout"),
        });

        let scene_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("scene shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
        });
        let sky_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("sky shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shaders/sky.wgsl").into()),
        });

        let scene_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("scene pipeline layout"),
            bind_group_layouts: &[&frame_layout, &object_layout],
            push_constant_ranges: &[],
        });

        let scene_pipeline = build_pipeline(
            &device,
            &scene_layout,
            &scene_shader,
            config.format,
            wgpu::BlendState::REPLACE,
            true,
            wgpu::CompareFunction::Less,
            "scene pipeline",
        );
        // Shadow geometry blends onto whatever it covers and must not write
        // depth, or overlapping car parts would punch holes in each other.
        let shadow_pipeline = build_pipeline(
            &device,
            &scene_layout,
            &scene_shader,
            config.format,
            wgpu::BlendState::ALPHA_BLENDING,
            false,
            wgpu::CompareFunction::Less,
            "shadow pipeline",
        );
        let sky_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("sky pipeline layout"),
            bind_group_layouts: &[&frame_layout],
            push_constant_ranges: &[],
        });
        let sky_pipeline = build_pipeline(
            &device,
            &sky_layout,
            &sky_shader,
            config.format,
            wgpu::BlendState::REPLACE,
            false,
            wgpu::CompareFunction::LessEqual,
            "sky pipeline",
        );

        let mut meshes = HashMap::new();
        meshes.insert(MeshKind::Box, GpuMesh::upload(&device, &build_box(), "box"));
        meshes.insert(
            MeshKind::Cylinder,
            GpuMesh::upload(&device, &build_cylinder(20), "cylinder"),
        );
        meshes.insert(
            MeshKind::Plane,
            GpuMesh::upload(&device, &build_plane(GROUND_SIZE), "ground"),
        );
        meshes.insert(
            MeshKind::House,
            GpuMesh::upload(&device, &build_house(), "house"),
        );
        let sky_mesh = GpuMesh::upload(&device, &build_sky_cube(), "sky");

        log::info!("[GpuState::new] GPU initialization complete");
        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            size,
            depth_texture,
            scene_pipeline,
            shadow_pipeline,
            sky_pipeline,
            camera_uniform,
            camera_buffer,
            light_buffer,
            frame_bind_group,
            object_layout,
            object_slots: Vec::new(),
            meshes,
            sky_mesh,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width == 0 || new_size.height == 0 {
            return;
        }
        self.size = new_size;
        self.config.width = new_size.width;
        self.config.height = new_size.height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture = create_depth_texture(&self.device, &self.config);
        log::debug!("[GpuState::resize] {}x{}", new_size.width, new_size.height);
    }

    fn ensure_slots(&mut self, count: usize) {
        while self.object_slots.len() < count {
            let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("object uniform"),
                size: std::mem::size_of::<ObjectUniform>() as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                layout: &self.object_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
                label: Some("object_bind_group"),
            });
            self.object_slots.push(ObjectSlot { buffer, bind_group });
        }
    }

    fn render(&mut self, app: &DemoApp) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        // Frame uniforms from the active camera.
        self.camera_uniform.update(app.active_camera());
        self.queue.write_buffer(
            &self.camera_buffer,
            0,
            bytemuck::cast_slice(&[self.camera_uniform]),
        );

        // Draw list: lit objects first, then their flattened shadows.
        let shadow = app.shadow_projection();
        let shadow_material = Material::shadow();
        let mut draws: Vec<(MeshKind, ObjectUniform)> = Vec::new();
        for object in app.objects() {
            draws.push((
                object.mesh,
                ObjectUniform::from_parts(object.world, &object.material),
            ));
        }
        let lit_count = draws.len();
        for object in app.shadow_casters() {
            draws.push((
                object.mesh,
                ObjectUniform::from_parts(shadow * object.world, &shadow_material),
            ));
        }

        self.ensure_slots(draws.len());
        for (slot, (_, uniform)) in self.object_slots.iter().zip(&draws) {
            self.queue
                .write_buffer(&slot.buffer, 0, bytemuck::cast_slice(&[*uniform]));
        }

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("render encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
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
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            let viewport = app.active_camera().core().viewport();
            if viewport.width > 0.0 && viewport.height > 0.0 {
                render_pass.set_viewport(
                    viewport.x,
                    viewport.y,
                    viewport.width.min(self.config.width as f32),
                    viewport.height.min(self.config.height as f32),
                    viewport.min_depth,
                    viewport.max_depth,
                );
            }

            render_pass.set_bind_group(0, &self.frame_bind_group, &[]);

            // 1. Lit objects.
            render_pass.set_pipeline(&self.scene_pipeline);
            for (i, (mesh_kind, _)) in draws.iter().take(lit_count).enumerate() {
                self.draw_mesh(&mut render_pass, *mesh_kind, i);
            }

            // 2. Projected shadows.
            render_pass.set_pipeline(&self.shadow_pipeline);
            for (i, (mesh_kind, _)) in draws.iter().enumerate().skip(lit_count) {
                self.draw_mesh(&mut render_pass, *mesh_kind, i);
            }

            // 3. Sky, behind everything.
            render_pass.set_pipeline(&self.sky_pipeline);
            render_pass.set_vertex_buffer(0, self.sky_mesh.vertex_buffer.slice(..));
            render_pass
                .set_index_buffer(self.sky_mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
            render_pass.draw_indexed(0..self.sky_mesh.num_indices, 0, 0..1);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }

    fn draw_mesh<'a>(
        &'a self,
        render_pass: &mut wgpu::RenderPass<'a>,
        mesh_kind: MeshKind,
        slot: usize,
    ) {
        let mesh = &self.meshes[&mesh_kind];
        render_pass.set_bind_group(1, &self.object_slots[slot].bind_group, &[]);
        render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
        render_pass.set_index_buffer(mesh.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..mesh.num_indices, 0, 0..1);
    }
}

#[allow(clippy::too_many_arguments)]
fn build_pipeline(
    device: &wgpu::Device,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    format: wgpu::TextureFormat,
    blend: wgpu::BlendState,
    depth_write: bool,
    depth_compare: wgpu::CompareFunction,
    label: &str,
) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(label),
        layout: Some(layout),
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: "vs_main",
            buffers: &[Vertex::desc()],
        },
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(blend),
                write_mask: wgpu::ColorWrites::ALL,
            })],
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
        depth_stencil: Some(wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth32Float,
            depth_write_enabled: depth_write,
            depth_compare,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
    })
}

fn create_depth_texture(
    device: &wgpu::Device,
    config: &wgpu::SurfaceConfiguration,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth texture"),
        size: wgpu::Extent3d {
            width: config.width.max(1),
            height: config.height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Depth32Float,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&wgpu::TextureViewDescriptor::default())
}

pub async fn run_app(event_loop: EventLoop<()>, config: DemoConfig) -> Result<()> {
    log::info!("[run_app] Creating window");
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(&config.window_title)
            .with_inner_size(LogicalSize::new(config.window_width, config.window_height))
            .build(&event_loop)
            .map_err(EngineError::WindowCreation)?,
    );

    let mut app = DemoApp::new(&config);
    let mut gpu_state = GpuState::new(window.clone(), &app).await?;
    let mut input_state = InputState::new();
    let mut last_frame = std::time::Instant::now();

    // Relative mouse look needs the cursor grabbed.
    input_state.set_cursor_locked(true);
    match window.set_cursor_grab(CursorGrabMode::Locked) {
        Ok(_) => window.set_cursor_visible(false),
        Err(e) => {
            log::warn!("[run_app] Cursor lock failed ({e}), trying confined mode");
            window.set_cursor_grab(CursorGrabMode::Confined).ok();
            window.set_cursor_visible(false);
        }
    }

    gpu_state.window.request_redraw();

    event_loop.run(move |event, elwt| {
        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == gpu_state.window.id() => match event {
                WindowEvent::CloseRequested => elwt.exit(),
                WindowEvent::Resized(physical_size) => {
                    gpu_state.resize(*physical_size);
                    app.on_resize(physical_size.width, physical_size.height);
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    if let PhysicalKey::Code(code) = event.physical_key {
                        if code == KeyCode::Escape && event.state == ElementState::Pressed {
                            elwt.exit();
                        } else {
                            input_state.process_key(code, event.state);
                        }
                    }
                }
                WindowEvent::MouseInput { button, state, .. } => {
                    input_state.process_mouse_button(*button, *state);
                }
                WindowEvent::MouseWheel { delta, .. } => {
                    input_state.process_scroll(*delta);
                }
                WindowEvent::RedrawRequested => {
                    let now = std::time::Instant::now();
                    // Cap dt so a stall does not teleport the car.
                    let dt = (now - last_frame).as_secs_f32().min(0.1);
                    last_frame = now;

                    app.update(&input_state, dt);
                    input_state.clear_frame_deltas();

                    match gpu_state.render(&app) {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost) => gpu_state.resize(gpu_state.size),
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("[run_app] Surface out of memory, exiting");
                            elwt.exit();
                        }
                        Err(e) => log::warn!("[run_app] Surface error: {:?}", e),
                    }
                }
                _ => {}
            },
            Event::DeviceEvent {
                event: DeviceEvent::MouseMotion { delta },
                ..
            } => {
                if input_state.is_cursor_locked() {
                    input_state.process_mouse_motion(delta);
                }
            }
            Event::AboutToWait => {
                gpu_state.window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}
