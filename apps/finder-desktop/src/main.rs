use anyhow::{Context, Result};
use clap::Parser;
use finder_input::{CursorMode, InputState, Key};
use finder_render_wgpu::WgpuSurface;
use finder_scene::{Engine, EngineConfig, FrameContext, SampleScene, Scene};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

#[derive(Parser)]
#[command(name = "finder-desktop", about = "Finder engine desktop host")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Engine config file (YAML)
    #[arg(short, long, default_value = "assets/finder.yaml")]
    config: PathBuf,

    /// Override the window width
    #[arg(long)]
    width: Option<u32>,

    /// Override the window height
    #[arg(long)]
    height: Option<u32>,

    /// Override the camera field of view in degrees
    #[arg(long)]
    fov: Option<f32>,
}

fn map_key(code: KeyCode) -> Key {
    match code {
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::Space => Key::Space,
        KeyCode::ShiftLeft => Key::LeftShift,
        KeyCode::ControlLeft => Key::LeftControl,
        KeyCode::Escape => Key::Escape,
        _ => Key::Other,
    }
}

/// Frame state gathered from window events between redraws.
struct WindowFrame {
    window: Option<Arc<Window>>,
    size: (u32, u32),
    delta_time: f32,
    input: InputState,
    focused: bool,
    cursor: CursorMode,
    exit: bool,
}

impl WindowFrame {
    fn new(width: u32, height: u32) -> Self {
        Self {
            window: None,
            size: (width, height),
            delta_time: 0.0,
            input: InputState::new(),
            focused: true,
            cursor: CursorMode::Normal,
            exit: false,
        }
    }
}

impl FrameContext for WindowFrame {
    fn window_size(&self) -> (u32, u32) {
        self.size
    }

    fn delta_time(&self) -> f32 {
        self.delta_time
    }

    fn input(&self) -> &InputState {
        &self.input
    }

    fn is_focused(&self) -> bool {
        self.focused
    }

    fn cursor_mode(&self) -> CursorMode {
        self.cursor
    }

    fn set_cursor_mode(&mut self, mode: CursorMode) {
        self.cursor = mode;
        let Some(window) = &self.window else {
            return;
        };
        let grab = match mode {
            CursorMode::Grabbed => window
                .set_cursor_grab(CursorGrabMode::Confined)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Locked)),
            CursorMode::Normal | CursorMode::Hidden => window.set_cursor_grab(CursorGrabMode::None),
        };
        if let Err(e) = grab {
            tracing::warn!("cursor grab failed: {e}");
        }
        window.set_cursor_visible(mode == CursorMode::Normal);
    }

    fn request_exit(&mut self) {
        self.exit = true;
    }

    fn exit_requested(&self) -> bool {
        self.exit
    }
}

struct DesktopApp {
    config: EngineConfig,
    frame: WindowFrame,
    engine: Option<Engine<WgpuSurface>>,
    last_frame: Instant,
    failure: Option<anyhow::Error>,
}

impl DesktopApp {
    fn new(config: EngineConfig) -> Self {
        let frame = WindowFrame::new(config.window.width, config.window.height);
        Self {
            config,
            frame,
            engine: None,
            last_frame: Instant::now(),
            failure: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = Arc::new(event_loop.create_window(attrs).context("create window")?);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(window.clone())
            .context("create surface")?;

        let size = window.inner_size();
        let gpu = WgpuSurface::new(&instance, surface, size.width, size.height)?;

        let mut camera = self.config.camera();
        camera.set_viewport(size.width, size.height);
        let scene = Scene::new(
            "sample",
            self.config.world_space(),
            camera,
            SampleScene::new(self.config.material()),
        )?;

        let mut engine = Engine::new(gpu);
        engine.add_scene(scene)?;

        self.frame.window = Some(window);
        self.frame.size = (size.width, size.height);
        if self.config.window.grab_cursor {
            self.frame.set_cursor_mode(CursorMode::Grabbed);
        }
        self.engine = Some(engine);
        self.last_frame = Instant::now();
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        tracing::error!("{error:#}");
        self.failure = Some(error);
        event_loop.exit();
    }
}

impl ApplicationHandler for DesktopApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.engine.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                self.frame.size = (new_size.width, new_size.height);
                if let Some(engine) = &mut self.engine {
                    engine.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::Focused(focused) => {
                self.frame.focused = focused;
                if !focused {
                    self.frame.input.release_all();
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                let key = map_key(code);
                match state {
                    ElementState::Pressed => self.frame.input.press(key),
                    ElementState::Released => self.frame.input.release(key),
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                self.frame.delta_time = (now - self.last_frame).as_secs_f32().min(0.1);
                self.last_frame = now;

                let Some(engine) = &mut self.engine else {
                    return;
                };
                if let Err(e) = engine.frame(&mut self.frame) {
                    tracing::error!("frame failed: {e}");
                }
                self.frame.input.end_frame();

                if self.frame.exit_requested() {
                    event_loop.exit();
                } else if let Some(window) = &self.frame.window {
                    window.request_redraw();
                }
            }
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
            if self.frame.focused {
                self.frame
                    .input
                    .add_mouse_motion(delta.0 as f32, delta.1 as f32);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.frame.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        // Release scene GPU resources while the device and window still exist.
        self.engine.take();
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let mut config = EngineConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(width) = cli.width {
        config.window.width = width;
    }
    if let Some(height) = cli.height {
        config.window.height = height;
    }
    if let Some(fov) = cli.fov {
        config.fov = fov;
    }
    config.validate()?;

    tracing::info!("finder-desktop starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = DesktopApp::new(config);
    event_loop.run_app(&mut app)?;

    match app.failure.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
