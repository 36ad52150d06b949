use anyhow::{Context, Result, anyhow};
use clap::Parser;
use parkview_assets::{AssetStore, load_cubemap_or_empty};
use parkview_input::{InputState, Key, MouseTracker};
use parkview_render::{Camera, FrameComposer, SceneCatalog, SkyboxRenderer, ViewerState};
use parkview_render_wgpu::WgpuRenderer;
use parkview_scene::{AppConfig, SceneTable, theme_park};
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

/// Trackpad pixels that count as one wheel line.
const PIXELS_PER_LINE: f64 = 40.0;

#[derive(Parser)]
#[command(name = "parkview-desktop", about = "Fly through the theme park")]
struct Cli {
    /// YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Scene table (YAML or JSON); overrides the config
    #[arg(short, long)]
    scene: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Window width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Window height in pixels
    #[arg(long)]
    height: Option<u32>,
}

impl Cli {
    fn resolve_config(&self) -> Result<AppConfig> {
        let mut config = match &self.config {
            Some(path) => AppConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => AppConfig::default(),
        };
        if let Some(scene) = &self.scene {
            config.scene = Some(scene.clone());
        }
        if let Some(width) = self.width {
            config.window.width = width;
        }
        if let Some(height) = self.height {
            config.window.height = height;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Everything that lives independently of the GPU.
struct AppState {
    config: AppConfig,
    table: SceneTable,
    assets: AssetStore,
    catalog: SceneCatalog,
    viewer: ViewerState,
    input: InputState,
    mouse: MouseTracker,
    /// Virtual pointer built from raw motion while the cursor is grabbed.
    cursor: (f64, f64),
    focused: bool,
    start: Instant,
}

impl AppState {
    fn new(config: AppConfig) -> Result<Self> {
        let table = match &config.scene {
            Some(path) => {
                SceneTable::load(path).with_context(|| format!("loading scene {}", path.display()))?
            }
            None => theme_park(),
        };

        let mut assets = AssetStore::new();
        for model in &table.models {
            assets.register_model(&model.key, &model.path);
        }
        if assets.failed_count() > 0 {
            tracing::warn!(
                "{} of {} models unavailable, their objects will not be drawn",
                assets.failed_count(),
                assets.len()
            );
        }

        let catalog = SceneCatalog::from_table(&table, |key| assets.handle_for(key))?;
        let viewer = ViewerState::new(Camera::from_config(&config.camera), 0.0);

        Ok(Self {
            config,
            table,
            assets,
            catalog,
            viewer,
            input: InputState::new(),
            mouse: MouseTracker::new(),
            cursor: (0.0, 0.0),
            focused: true,
            start: Instant::now(),
        })
    }

    fn handle_key(&mut self, key: KeyCode, pressed: bool) {
        let key = match key {
            KeyCode::KeyW => Key::W,
            KeyCode::KeyA => Key::A,
            KeyCode::KeyS => Key::S,
            KeyCode::KeyD => Key::D,
            KeyCode::Escape => Key::Escape,
            _ => return,
        };
        if let Some(action) = self.input.handle_key(key, pressed) {
            self.viewer.apply(action, 0.0);
        }
    }

    fn mouse_motion(&mut self, dx: f64, dy: f64) {
        if !self.focused {
            return;
        }
        self.cursor.0 += dx;
        self.cursor.1 += dy;
        if let Some(action) = self.mouse.sample(self.cursor.0, self.cursor.1) {
            self.viewer.apply(action, 0.0);
        }
    }

    fn scroll(&mut self, delta: MouseScrollDelta) {
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(pos) => (pos.y / PIXELS_PER_LINE) as f32,
        };
        if let Some(action) = self.input.scroll(lines) {
            self.viewer.apply(action, 0.0);
        }
    }

    fn set_focus(&mut self, focused: bool) {
        self.focused = focused;
        if !focused {
            self.mouse.reset();
            self.input.clear();
        }
    }
}

struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: WgpuRenderer,
    composer: FrameComposer,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, state: &AppState) -> Result<Self> {
        let window_config = &state.config.window;
        let attrs = Window::default_attributes()
            .with_title(window_config.title.clone())
            .with_inner_size(PhysicalSize::new(window_config.width, window_config.height));
        let window = Arc::new(event_loop.create_window(attrs).context("creating window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("creating surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| anyhow!("no compatible GPU adapter"))?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("parkview_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("creating device")?;

        let size = window.inner_size();
        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface reports no formats"))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps.alpha_modes.first().copied().unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let mut renderer = WgpuRenderer::new(&device, format, config.width, config.height);
        renderer.set_ready_models(state.assets.ready_handles());
        let cubemap = load_cubemap_or_empty(
            &mut renderer.textures_mut().loader(&device, &queue),
            &state.table.skybox.faces,
        );

        let mut composer = FrameComposer::new(&state.config, SkyboxRenderer::new(cubemap));
        composer.resize(config.width, config.height);
        composer.skybox().configure(&mut renderer);

        grab_cursor(&window);

        tracing::info!(
            "GPU initialized with {} backend, {} objects in scene",
            adapter.get_info().backend.to_str(),
            state.catalog.len()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            composer,
        })
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.renderer.resize(&self.device, width, height);
        self.composer.resize(width, height);
    }

    fn render(&mut self, state: &AppState) {
        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                self.surface.configure(&self.device, &self.config);
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

        self.renderer.begin_frame();
        self.composer.compose(
            &mut self.renderer,
            &state.viewer.camera,
            &state.catalog,
            state.viewer.elapsed(),
        );
        self.renderer.submit(&self.device, &self.queue, &view);
        output.present();
    }
}

fn grab_cursor(window: &Window) {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    if let Err(e) = grabbed {
        tracing::warn!("cursor grab unavailable: {e}");
    }
    window.set_cursor_visible(false);
}

struct GpuApp {
    state: AppState,
    gpu: Option<Gpu>,
    error: Option<anyhow::Error>,
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match Gpu::new(event_loop, &self.state) {
            Ok(gpu) => {
                self.gpu = Some(gpu);
                let now = self.state.start.elapsed().as_secs_f64();
                self.state.viewer.restart_clock(now);
            }
            Err(e) => {
                self.error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                self.state.viewer.stop();
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(size.width, size.height);
                }
            }
            WindowEvent::Focused(focused) => {
                self.state.set_focus(focused);
                if let (true, Some(gpu)) = (focused, &self.gpu) {
                    grab_cursor(&gpu.window);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                self.state.handle_key(key, key_state == ElementState::Pressed);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.state.scroll(delta);
            }
            WindowEvent::RedrawRequested => {
                let now = self.state.start.elapsed().as_secs_f64();
                self.state.viewer.advance(now, &self.state.input);
                if !self.state.viewer.is_running() {
                    event_loop.exit();
                    return;
                }
                if let Some(gpu) = &mut self.gpu {
                    gpu.render(&self.state);
                    gpu.window.request_redraw();
                }
            }
            _ => {}
        }
        if !self.state.viewer.is_running() {
            event_loop.exit();
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.state.mouse_motion(delta.0, delta.1);
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

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("parkview-desktop starting");

    let config = cli.resolve_config()?;
    let state = AppState::new(config)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp {
        state,
        gpu: None,
        error: None,
    };
    event_loop.run_app(&mut app)?;

    match app.error {
        Some(e) => Err(e.context("GPU initialization failed")),
        None => {
            tracing::info!("parkview-desktop exiting");
            Ok(())
        }
    }
}
