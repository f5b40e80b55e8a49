//! Window, event loop and the glue between winit, the frame loop and wgpu.

use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{CursorGrabMode, Window, WindowId},
};

use crate::config::SimulationConfig;
use crate::error::AppError;
use crate::frame::{FrameLoop, LoopState};
use crate::gpu::Renderer;
use crate::input::Input;
use crate::overlay::TitleOverlay;
use crate::textures::TextureImage;
use crate::time::Time;

/// Open the viewer window and run until it is closed or Escape is pressed.
pub fn run(config: SimulationConfig) -> Result<(), AppError> {
    config.validate()?;
    let frame_loop = FrameLoop::new(&config)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(config, frame_loop);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

struct App {
    config: SimulationConfig,
    frame_loop: FrameLoop,
    window: Option<Arc<Window>>,
    renderer: Option<Renderer>,
    input: Input,
    time: Time,
    overlay: TitleOverlay,
    title: String,
    /// First fatal error; returned from [`run`] after the loop exits.
    error: Option<AppError>,
}

impl App {
    fn new(config: SimulationConfig, frame_loop: FrameLoop) -> Self {
        let title = config.window.title.clone();
        Self {
            config,
            frame_loop,
            window: None,
            renderer: None,
            input: Input::new(),
            time: Time::new(),
            overlay: TitleOverlay::new(),
            title,
            error: None,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: AppError) {
        tracing::error!("{}", error);
        self.error.get_or_insert(error);
        self.frame_loop.request_exit();
        event_loop.exit();
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window_attrs = Window::default_attributes()
            .with_title(self.config.window.title.as_str())
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));

        let window = Arc::new(event_loop.create_window(window_attrs)?);
        let mut renderer = pollster::block_on(Renderer::new(window.clone(), self.config.window.clear_color))?;

        self.upload_textures(&mut renderer);
        grab_cursor(&window);

        self.window = Some(window);
        self.renderer = Some(renderer);
        Ok(())
    }

    fn upload_textures(&mut self, renderer: &mut Renderer) {
        let dir = self.config.texture_dir.clone();

        let bodies: Vec<_> = self
            .frame_loop
            .registry()
            .iter()
            .map(|body| (body.id(), body.definition.texture, body.definition.fallback_color))
            .collect();
        for (id, stem, fallback) in bodies {
            let handle = renderer.load_texture(&TextureImage::load_or_solid(&dir, stem, fallback));
            self.frame_loop.registry_mut().set_texture(id, handle);
        }

        if self.config.starfield.enabled {
            let image = TextureImage::load_or_solid(&dir, &self.config.starfield.texture, [0, 0, 0]);
            let handle = renderer.load_texture(&image);
            self.frame_loop.composer_mut().set_starfield_texture(handle);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let Some(renderer) = self.renderer.as_mut() else {
            return;
        };

        renderer.begin_frame();
        let state = self
            .frame_loop
            .step(&self.input, &self.time, renderer, &mut self.overlay);
        self.input.end_frame();

        if state == LoopState::Exit {
            event_loop.exit();
            return;
        }

        match renderer.present() {
            Ok(()) => {
                if self.time.frame_presented() {
                    tracing::trace!(fps = self.time.fps(), frame = self.time.frame(), "Frame rate");
                }
            }
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => renderer.reconfigure(),
            Err(wgpu::SurfaceError::OutOfMemory) => {
                tracing::error!("GPU out of memory, exiting");
                self.frame_loop.request_exit();
                event_loop.exit();
                return;
            }
            Err(e) => tracing::warn!("Render error: {:?}", e),
        }

        let title = self.overlay.take_title(&self.config.window.title);
        if let Some(window) = &self.window {
            if title != self.title {
                window.set_title(&title);
                self.title = title;
            }
            window.request_redraw();
        }
    }
}

/// Hide the cursor and keep it in the window for mouse-look.
fn grab_cursor(window: &Window) {
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    if let Err(e) = grabbed {
        tracing::warn!("Could not grab cursor: {}", e);
    }
    window.set_cursor_visible(false);
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.init(event_loop) {
                self.fail(event_loop, e);
                return;
            }
            tracing::info!("Viewer started");
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.handle_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                self.frame_loop.request_exit();
                event_loop.exit();
            }
            WindowEvent::Resized(physical_size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(physical_size);
                }
            }
            WindowEvent::Focused(true) => {
                if let Some(window) = &self.window {
                    grab_cursor(window);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _id: DeviceId, event: DeviceEvent) {
        self.input.handle_device_event(&event);
    }
}
