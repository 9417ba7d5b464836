use anyhow::{Context, Result};
use clap::Parser;
use egui::Context as EguiContext;
use labyrinth_common::GameConfig;
use labyrinth_input::{Action, Direction, MouseLook, MoveInput};
use labyrinth_kernel::SimulationState;
use labyrinth_render_wgpu::WgpuRenderer;
use labyrinth_tools::{FrameTimer, SimulationInspector};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

const SCREEN_WIDTH: u32 = 1600;
const SCREEN_HEIGHT: u32 = 900;
/// Pixel-precise scroll deltas per wheel notch.
const PIXELS_PER_LINE: f32 = 40.0;

#[derive(Parser)]
#[command(name = "labyrinth-desktop", about = "Third-person maze game")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Game config (.yaml, .yml or .json); built-in level when absent
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Game state plus the per-frame input the window feeds it.
struct AppState {
    sim: SimulationState,
    held: MoveInput,
    mouse: MouseLook,
    /// Relative pointer motion arrives as device events while grabbed.
    pointer_grabbed: bool,
    timer: FrameTimer,
    last_frame: Instant,
    show_inspector: bool,
    blocked_moves: usize,
    camera_clamps: usize,
}

impl AppState {
    fn new(config: GameConfig) -> Result<Self> {
        let sim = SimulationState::new(config).context("failed to build the maze")?;
        Ok(Self {
            sim,
            held: MoveInput::default(),
            mouse: MouseLook::new(),
            pointer_grabbed: false,
            timer: FrameTimer::new(120),
            last_frame: Instant::now(),
            show_inspector: false,
            blocked_moves: 0,
            camera_clamps: 0,
        })
    }

    fn update(&mut self) {
        let now = Instant::now();
        let dt = self.timer.record(now - self.last_frame);
        self.last_frame = now;

        self.sim.step(&self.held, dt);

        let events = self.sim.drain_events();
        let (blocked, clamped) = SimulationInspector::collision_counts(&events);
        self.blocked_moves += blocked;
        self.camera_clamps += clamped;
    }

    /// Returns false once the game has been asked to quit.
    fn handle_key(&mut self, key: KeyCode, pressed: bool) -> bool {
        let direction = match key {
            KeyCode::KeyW => Some(Direction::Forward),
            KeyCode::KeyS => Some(Direction::Back),
            KeyCode::KeyA => Some(Direction::Left),
            KeyCode::KeyD => Some(Direction::Right),
            _ => None,
        };
        if let Some(direction) = direction {
            self.held.set(direction, pressed);
            return true;
        }

        if !pressed {
            return true;
        }
        match key {
            KeyCode::KeyR => self.sim.apply(Action::Restart),
            KeyCode::Escape => self.sim.apply(Action::Quit),
            KeyCode::F1 => self.show_inspector = !self.show_inspector,
            _ => {}
        }
        !self.sim.is_terminated()
    }

    fn draw_ui(&self, ctx: &EguiContext) {
        if self.sim.is_won() {
            egui::Window::new("win")
                .title_bar(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.heading("YOU WIN!");
                        ui.label("Press [R] to Replay");
                        ui.label("Press [ESC] to Quit");
                    });
                });
        }

        if !self.show_inspector {
            return;
        }

        let summary = SimulationInspector::summary(&self.sim);
        egui::SidePanel::left("inspector")
            .default_width(260.0)
            .show(ctx, |ui| {
                ui.heading("Labyrinth");
                ui.separator();
                ui.label(format!("Tick: {}  Status: {:?}", summary.tick, summary.status));
                ui.label(format!(
                    "Character: ({:.2}, {:.2}, {:.2})",
                    summary.character[0], summary.character[1], summary.character[2]
                ));
                ui.label(format!("Cell: {}  Goal: {}", summary.cell, summary.win_cell));
                ui.label(format!(
                    "Camera: ({:.2}, {:.2}, {:.2})",
                    summary.camera[0], summary.camera[1], summary.camera[2]
                ));
                ui.label(format!(
                    "Yaw: {:.1}  Pitch: {:.1}  FOV: {:.1}",
                    summary.yaw_deg, summary.pitch_deg, summary.zoom
                ));
                ui.separator();
                ui.label(format!(
                    "Blocked moves: {}  Camera clamps: {}",
                    self.blocked_moves, self.camera_clamps
                ));
                ui.label(format!(
                    "FPS: {:.0}  frame avg {:.2} ms (min {:.2}, max {:.2})",
                    self.timer.fps(),
                    self.timer.average().as_secs_f64() * 1000.0,
                    self.timer.min().as_secs_f64() * 1000.0,
                    self.timer.max().as_secs_f64() * 1000.0,
                ));
                ui.separator();
                ui.small("WASD: Move | Mouse: Look | Wheel: Zoom | F1: Inspector | ESC: Quit");
            });
    }
}

/// GPU and window resources, created once the event loop is running.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    egui_ctx: EguiContext,
    /// Fatal startup error, reported after the event loop returns.
    failure: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(state: AppState) -> Self {
        Self {
            state,
            gpu: None,
            egui_ctx: EguiContext::default(),
            failure: None,
        }
    }

    fn init_gpu(&mut self, event_loop: &ActiveEventLoop) -> Result<Gpu> {
        let attrs = Window::default_attributes()
            .with_title("Labyrinth")
            .with_inner_size(PhysicalSize::new(SCREEN_WIDTH, SCREEN_HEIGHT));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no suitable GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("labyrinth_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("failed to create device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no formats")?;
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

        self.state.sim.camera_mut().aspect = config.width as f32 / config.height as f32;

        let renderer = WgpuRenderer::new(
            &device,
            surface_format,
            config.width,
            config.height,
            self.state.sim.maze(),
        );

        let egui_winit = egui_winit::State::new(
            self.egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Gpu {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    /// Hide and capture the pointer. Falls back to confining it where locking
    /// is unsupported; if neither works, absolute cursor positions drive the look.
    fn grab_pointer(&mut self) {
        let Some(gpu) = &self.gpu else {
            return;
        };
        let window = &gpu.window;
        let grabbed = window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
        match grabbed {
            Ok(()) => self.state.pointer_grabbed = true,
            Err(e) => {
                tracing::warn!("cursor grab unavailable: {e}");
                self.state.pointer_grabbed = false;
            }
        }
        window.set_cursor_visible(false);
        self.state.mouse.reset();
    }

    fn resize(&mut self, new_size: PhysicalSize<u32>) {
        let Some(gpu) = &mut self.gpu else {
            return;
        };
        gpu.config.width = new_size.width.max(1);
        gpu.config.height = new_size.height.max(1);
        gpu.surface.configure(&gpu.device, &gpu.config);
        gpu.renderer
            .resize(&gpu.device, gpu.config.width, gpu.config.height);
        self.state.sim.camera_mut().aspect = gpu.config.width as f32 / gpu.config.height as f32;
    }

    fn redraw(&mut self) {
        self.state.update();

        let Some(gpu) = &mut self.gpu else {
            return;
        };

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        gpu.renderer
            .render(&gpu.device, &gpu.queue, &view, &self.state.sim);

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let state = &self.state;
        let full_output = self.egui_ctx.run(raw_input, |ctx| state.draw_ui(ctx));
        gpu.egui_winit
            .handle_platform_output(&gpu.window, full_output.platform_output);

        let paint_jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [gpu.config.width, gpu.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            gpu.egui_renderer
                .update_texture(&gpu.device, &gpu.queue, *id, image_delta);
        }
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        gpu.egui_renderer.update_buffers(
            &gpu.device,
            &gpu.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            gpu.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            gpu.egui_renderer.free_texture(id);
        }

        output.present();
        gpu.window.request_redraw();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match self.init_gpu(event_loop) {
            Ok(gpu) => {
                self.gpu = Some(gpu);
                self.grab_pointer();
            }
            Err(e) => {
                tracing::error!("startup failed: {e:#}");
                self.failure = Some(e);
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
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.state.sim.apply(Action::Quit);
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => self.resize(new_size),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if !self
                    .state
                    .handle_key(key, key_state == ElementState::Pressed)
                {
                    event_loop.exit();
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                if !self.state.pointer_grabbed {
                    if let Some(action) = self
                        .state
                        .mouse
                        .cursor_moved(position.x as f32, position.y as f32)
                    {
                        self.state.sim.apply(action);
                    }
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_LINE,
                };
                self.state.sim.apply(Action::Zoom(lines));
            }
            WindowEvent::Focused(true) => self.grab_pointer(),
            WindowEvent::Focused(false) => {
                self.state.held = MoveInput::default();
                self.state.mouse.reset();
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.state.pointer_grabbed {
                if let Some(action) = self.state.mouse.motion(delta.0 as f32, delta.1 as f32) {
                    self.state.sim.apply(action);
                }
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("labyrinth-desktop starting");

    let config = match &cli.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => GameConfig::default(),
    };

    let event_loop = EventLoop::new().context("failed to create event loop")?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(AppState::new(config)?);
    event_loop.run_app(&mut app)?;

    if let Some(e) = app.failure {
        return Err(e);
    }
    tracing::info!(tick = app.state.sim.tick(), "labyrinth-desktop exiting");
    Ok(())
}
