use std::sync::Arc;

use clap::Parser;
use elevation_viewer::camera_controller::CameraController;
use elevation_viewer::config::Args;
use elevation_viewer::renderer::State;
use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, NamedKey},
    window::{CursorGrabMode, Window, WindowId},
};

#[derive(Default)]
struct App {
    args: Args,
    window: Option<Arc<Window>>,
    state: Option<State>,
}

impl App {
    fn new(args: Args) -> Self {
        Self {
            args,
            ..Default::default()
        }
    }
}

fn capture_cursor(window: &Window) {
    window.set_cursor_visible(false);
    let grabbed = window
        .set_cursor_grab(CursorGrabMode::Locked)
        .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
    if let Err(e) = grabbed {
        warn!("could not grab cursor: {e}");
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window_attributes = Window::default_attributes()
            .with_title("Elevation Map Viewer")
            .with_inner_size(LogicalSize::new(800.0, 600.0));
        let window = match event_loop.create_window(window_attributes) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                error!("failed to create window: {e}");
                event_loop.exit();
                return;
            }
        };
        capture_cursor(&window);
        self.window = Some(window.clone());

        let scene = self.args.build_scene();
        let controller = CameraController::new(self.args.step);
        match pollster::block_on(State::new(window, scene, controller)) {
            Ok(state) => self.state = Some(state),
            Err(e) => {
                error!("failed to create renderer: {e:?}");
                event_loop.exit();
            }
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let Some(state) = self.state.as_mut() {
            if let DeviceEvent::MouseMotion { delta } = event {
                state.mouse_motion(delta);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        let window = match self.window.as_ref() {
            Some(w) => w,
            None => return,
        };
        let state = match self.state.as_mut() {
            Some(s) => s,
            None => return,
        };

        if id != window.id() {
            return;
        }

        if !state.input(&event) {
            match event {
                WindowEvent::CloseRequested
                | WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            state: ElementState::Pressed,
                            logical_key: Key::Named(NamedKey::Escape),
                            ..
                        },
                    ..
                } => {
                    event_loop.exit();
                }
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            state: ElementState::Pressed,
                            logical_key: Key::Character(c),
                            repeat: false,
                            ..
                        },
                    ..
                } if c.eq_ignore_ascii_case("n") => {
                    info!("regenerating terrain");
                    state.scene_mut().randomize(self.args.h_min, self.args.h_max);
                }
                WindowEvent::KeyboardInput {
                    event:
                        KeyEvent {
                            state: ElementState::Pressed,
                            logical_key: Key::Character(c),
                            repeat: false,
                            ..
                        },
                    ..
                } if c.eq_ignore_ascii_case("p") => {
                    state.scene_mut().toggle_padding(self.args.padding());
                    info!("terrain padding: {:?}", state.scene_mut().padding());
                }
                WindowEvent::Resized(physical_size) => {
                    state.resize(physical_size);
                    window.request_redraw();
                }
                WindowEvent::RedrawRequested => {
                    match state.render() {
                        Ok(_) => {}
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => state.resize(state.size()),
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            error!("out of GPU memory");
                            event_loop.exit();
                        }
                        Err(e) => warn!("{e:?}"),
                    }
                }
                _ => {}
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = self.state.as_mut() {
            state.update();
        }
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    info!("starting with {}x{} grid", args.nx, args.ny);

    let event_loop = EventLoop::new()?;
    let mut app = App::new(args);
    event_loop.run_app(&mut app)?;
    Ok(())
}
