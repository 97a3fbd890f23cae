//! Central-attractor particle swarm
//!
//! A grid of point masses falls toward the origin under a single attractor,
//! integrated by a compute pass and drawn as instanced cubes.

mod config;
mod controller;
mod error;

use config::AppConfig;
use controller::CameraController;
use error::StartupError;
use particle_physics::{ParticleStore, SwarmStats, WorldInfo};
use particle_renderer::{Camera, ParticleRenderer};
use particle_simulation::ParticleSimulation;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Fullscreen, Window, WindowId},
};

/// Delta used for single steps while paused
const SINGLE_STEP: f32 = 1.0 / 60.0;

struct GpuState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,

    app_config: AppConfig,
    simulation: ParticleSimulation,
    renderer: ParticleRenderer,
    camera: Camera,
    controller: CameraController,

    world: WorldInfo,
    paused: bool,
    frame: u64,

    frame_times: VecDeque<f32>,
    last_frame_time: Instant,
}

impl GpuState {
    async fn new(window: Arc<Window>, app_config: AppConfig) -> Result<Self, StartupError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;

        log::info!("Using GPU: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;

        // Prefer an sRGB surface so the linear tint is encoded on write
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let store = ParticleStore::spawn(app_config.grid, &app_config.spawn);
        let simulation =
            ParticleSimulation::new(device.clone(), queue.clone(), &store, &app_config.force)?;
        let renderer =
            ParticleRenderer::new(&device, &config, app_config.grid, app_config.palette);

        let camera = Camera::new(config.width, config.height);
        let controller = CameraController::new(50.0, 0.003);

        log::info!(
            "Simulating {} particles, strength {} ({:?})",
            simulation.particle_count(),
            app_config.force.strength,
            app_config.force.falloff
        );

        Ok(Self {
            surface,
            device,
            queue,
            config,
            app_config,
            simulation,
            renderer,
            camera,
            controller,
            world: WorldInfo::default(),
            paused: false,
            frame: 0,
            frame_times: VecDeque::with_capacity(60),
            last_frame_time: Instant::now(),
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
            self.renderer.resize(&self.device, &self.config);
            self.camera.resize(new_size.width, new_size.height);
        }
    }

    /// Put every particle back at its spawn slot and restart the clock.
    fn reset(&mut self) {
        let store = ParticleStore::spawn(self.app_config.grid, &self.app_config.spawn);
        match self.simulation.reset(&store) {
            Ok(()) => {
                self.world = WorldInfo::default();
                log::info!("Simulation reset");
            }
            Err(err) => log::error!("Reset failed: {err}"),
        }
    }

    /// Advance one fixed tick in its own submission while paused.
    fn single_step(&mut self) {
        let world = self.world.advance(SINGLE_STEP);
        self.simulation.update_world(world);
        self.simulation.step();
        log::debug!("Stepped to t={:.3}s", world.time);
    }

    fn cycle_palette(&mut self) {
        self.app_config.palette = self.app_config.palette.cycled();
        self.renderer.set_palette(&self.queue, self.app_config.palette);
        log::info!("Base tint: {}", self.app_config.palette.base_tint);
    }

    fn toggle_falloff(&mut self) {
        self.app_config.force.falloff = self.app_config.force.falloff.toggled();
        self.simulation.update_force(&self.app_config.force);
        log::info!("Falloff: {:?}", self.app_config.force.falloff);
    }

    fn log_diagnostics(&self) {
        match self.simulation.read_back() {
            Ok(store) => {
                let stats = SwarmStats::measure(&store);
                if stats.non_finite > 0 {
                    log::warn!("t={:.2}s {stats}", self.world.time);
                } else {
                    log::debug!("t={:.2}s {stats}", self.world.time);
                }
            }
            Err(err) => log::warn!("Diagnostics readback failed: {err}"),
        }
    }

    /// Advance and draw one frame, returning the average frame time in ms.
    fn render(&mut self) -> Result<f32, wgpu::SurfaceError> {
        let now = Instant::now();
        let frame_seconds = now.duration_since(self.last_frame_time).as_secs_f32();
        self.last_frame_time = now;

        if self.frame_times.len() == 60 {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(frame_seconds);

        self.controller.update(&mut self.camera, frame_seconds);

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        // Compute before render in one encoder: the draw reads finished positions
        if !self.paused {
            let world = self.world.advance(self.app_config.tick_delta(frame_seconds));
            self.simulation.update_world(world);
            self.simulation.encode_step(&mut encoder);
        }

        self.renderer.encode(
            &self.queue,
            &mut encoder,
            &view,
            &self.camera.to_uniform(),
            self.simulation.position_buffer(),
            self.simulation.particle_count(),
        );

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        self.frame += 1;
        let interval = u64::from(self.app_config.diagnostics_interval);
        if interval > 0 && self.frame % interval == 0 {
            self.log_diagnostics();
        }

        let average = self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;
        Ok(average * 1000.0)
    }
}

#[derive(Default)]
struct App {
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    mouse_pressed: bool,
}

impl App {
    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), StartupError> {
        let window_attributes = Window::default_attributes()
            .with_title("Attractor Swarm")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let gpu_state = pollster::block_on(GpuState::new(window.clone(), AppConfig::default()))?;

        self.window = Some(window);
        self.gpu_state = Some(gpu_state);
        Ok(())
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, code: KeyCode) {
        match code {
            KeyCode::Escape => event_loop.exit(),
            KeyCode::KeyF => {
                if let Some(window) = &self.window {
                    let fullscreen = match window.fullscreen() {
                        Some(_) => None,
                        None => Some(Fullscreen::Borderless(None)),
                    };
                    window.set_fullscreen(fullscreen);
                }
            }
            KeyCode::KeyP => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.paused = !gpu_state.paused;
                    log::info!("Paused: {}", gpu_state.paused);
                }
            }
            KeyCode::KeyN => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    if gpu_state.paused {
                        gpu_state.single_step();
                    }
                }
            }
            KeyCode::KeyC => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.cycle_palette();
                }
            }
            KeyCode::KeyG => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.toggle_falloff();
                }
            }
            KeyCode::KeyR => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.reset();
                }
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(err) = self.init(event_loop) {
                log::error!("Startup failed: {err}");
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu_state) = &mut self.gpu_state {
            gpu_state.controller.process_window_event(&event);
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => self.handle_key(event_loop, code),

            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.mouse_pressed = state == ElementState::Pressed;
            }

            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }

            WindowEvent::RedrawRequested => {
                if let (Some(window), Some(gpu_state)) = (&self.window, &mut self.gpu_state) {
                    match gpu_state.render() {
                        Ok(frame_ms) => {
                            window.set_title(&format!(
                                "Attractor Swarm - {:.0} FPS ({:.2}ms) - {} particles",
                                1000.0 / frame_ms.max(f32::EPSILON),
                                frame_ms,
                                gpu_state.simulation.particle_count()
                            ));
                        }
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            gpu_state.resize(window.inner_size())
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("Surface out of memory");
                            event_loop.exit();
                        }
                        Err(err) => log::warn!("Render error: {err:?}"),
                    }
                }
            }

            _ => {}
        }

        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if !self.mouse_pressed {
            return;
        }
        if let Some(gpu_state) = &mut self.gpu_state {
            gpu_state.controller.process_device_event(&event);
        }
    }
}

fn main() -> Result<(), winit::error::EventLoopError> {
    // RUST_LOG=debug for periodic swarm diagnostics
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting attractor swarm...");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::default();
    event_loop.run_app(&mut app)
}
