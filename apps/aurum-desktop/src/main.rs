use anyhow::Result;
use aurum_common::{FieldConfig, Viewport};
use aurum_render::RenderLoop;
use aurum_render_wgpu::{WgpuHost, WgpuSurface};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "aurum-desktop", about = "Animated particle sphere in a window")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML field configuration; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn viewport_of(window: &Window) -> Viewport {
    let scale = window.scale_factor();
    let logical = window.inner_size().to_logical::<f32>(scale);
    Viewport::new(logical.width, logical.height, scale as f32)
}

struct App {
    config: FieldConfig,
    window: Option<Arc<Window>>,
    render_loop: Option<RenderLoop<WgpuSurface>>,
}

impl App {
    fn new(config: FieldConfig) -> Self {
        Self {
            config,
            window: None,
            render_loop: None,
        }
    }

    fn apply_viewport(&mut self) {
        if let (Some(window), Some(rl)) = (&self.window, &mut self.render_loop) {
            rl.resize(viewport_of(window));
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(rl) = &mut self.render_loop {
            rl.dispose();
            tracing::info!(stats = ?rl.stats(), "field stopped");
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("Aurum")
            .with_inner_size(LogicalSize::new(1280.0, 720.0))
            .with_transparent(self.config.transparent);
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                tracing::error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };

        let viewport = viewport_of(&window);
        let mut rl: RenderLoop<WgpuSurface> = match RenderLoop::new(self.config.clone(), viewport) {
            Ok(rl) => rl,
            Err(e) => {
                tracing::error!("invalid field setup: {e}");
                event_loop.exit();
                return;
            }
        };

        let redraw = window.clone();
        if let Err(e) = rl.init(WgpuHost::new(window.clone()), &mut || redraw.request_redraw()) {
            tracing::error!("particle field disabled: {e}");
            event_loop.exit();
            return;
        }

        self.window = Some(window);
        self.render_loop = Some(rl);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                self.shutdown(event_loop);
            }
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                self.apply_viewport();
            }
            WindowEvent::CursorMoved { position, .. } => {
                if let (Some(window), Some(rl)) = (&self.window, &mut self.render_loop) {
                    let logical = position.to_logical::<f32>(window.scale_factor());
                    rl.pointer_moved(logical.x, logical.y);
                }
            }
            WindowEvent::RedrawRequested => {
                if let (Some(window), Some(rl)) = (&self.window, &mut self.render_loop) {
                    rl.tick(&mut || window.request_redraw());
                }
            }
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(rl) = &mut self.render_loop {
            rl.dispose();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = match &cli.config {
        Some(path) => FieldConfig::load(path)?,
        None => FieldConfig::default(),
    };

    tracing::info!(particles = config.particle_count, "aurum-desktop starting");

    let event_loop = EventLoop::new()?;
    // Frames are requested by the render loop itself.
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    Ok(())
}
