//! Verdant - tessellated grass viewer

use std::process::ExitCode;
use std::sync::Arc;

use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window, WindowId},
};

use verdant::core::{
    camera::Camera,
    camera_controller::CameraController,
    config::AppConfig,
    error::Error,
    input::InputState,
    logging,
    time::FrameTimer,
};
use verdant::render::{FrameStatus, SceneRenderer};

struct App {
    config: AppConfig,
    window: Option<Arc<Window>>,
    renderer: Option<SceneRenderer>,
    camera: Camera,
    controller: CameraController,
    input: InputState,
    timer: FrameTimer,
    fatal: Option<Error>,
}

impl App {
    fn new(config: AppConfig) -> Self {
        let camera = Camera::from_config(&config.camera);
        Self {
            config,
            window: None,
            renderer: None,
            camera,
            controller: CameraController::new(),
            input: InputState::new(),
            timer: FrameTimer::new(),
            fatal: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<(), Error> {
        let window_cfg = &self.config.window;
        let window_attrs = Window::default_attributes()
            .with_title(window_cfg.title.clone())
            .with_inner_size(PhysicalSize::new(window_cfg.width, window_cfg.height));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .map_err(|e| Error::Window(e.to_string()))?,
        );
        let size = window.inner_size();
        log::info!("Window created: {}x{}", size.width, size.height);

        let renderer = SceneRenderer::new(window.clone(), &self.config)?;
        log::info!("Rendering {} blades", renderer.blade_count());

        self.grab_cursor(&window);
        self.window = Some(window);
        self.renderer = Some(renderer);
        Ok(())
    }

    fn grab_cursor(&mut self, window: &Window) {
        let grabbed = window
            .set_cursor_grab(CursorGrabMode::Locked)
            .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined))
            .is_ok();
        if grabbed {
            window.set_cursor_visible(false);
        } else {
            log::warn!("Cursor grab unavailable, using pointer position for look");
        }
        self.input.set_pointer_captured(grabbed);
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: Error) {
        log::error!("{error}");
        self.fatal = Some(error);
        event_loop.exit();
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        self.timer.tick();
        self.controller.update(&mut self.camera, &mut self.input, self.timer.delta_secs());

        let Some(renderer) = &mut self.renderer else {
            return;
        };
        match renderer.render(&self.camera) {
            Ok(FrameStatus::Presented | FrameStatus::Skipped) => {}
            Err(e) => {
                self.fail(event_loop, e);
                return;
            }
        }

        if self.timer.fps_updated() {
            if let Some(window) = &self.window {
                window.set_title(&format!("{} - {:.1} FPS", self.config.window.title, self.timer.fps()));
            }
        }
        self.input.end_frame();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.init(event_loop) {
            self.fail(event_loop, e);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        self.input.process_event(&event);

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state.is_pressed() && event.physical_key == PhysicalKey::Code(KeyCode::Escape) {
                    event_loop.exit();
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
            }
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.input.process_mouse_motion(delta);
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn run() -> Result<(), Error> {
    let config = AppConfig::from_env()?;
    let event_loop = EventLoop::new().map_err(|e| Error::Window(e.to_string()))?;
    let mut app = App::new(config);
    event_loop
        .run_app(&mut app)
        .map_err(|e| Error::Window(e.to_string()))?;
    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

fn main() -> ExitCode {
    logging::init();
    log::info!("Verdant starting...");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("verdant: {e}");
            ExitCode::FAILURE
        }
    }
}
