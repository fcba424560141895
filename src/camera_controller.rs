use glam::Vec3;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{Key, NamedKey};

use crate::camera::{Camera, CameraAction, ProjectionMode};

const PITCH_PER_PIXEL: f32 = 1.0 / 256.0;
const YAW_PER_PIXEL: f32 = 1.0 / 128.0;
const FOVY_PER_PIXEL: f32 = 1.0 / 64.0;
const ORTHO_ZOOM_BASE: f32 = 1.01;

/// Input gathered between frames, kept in arrival order.
#[derive(Copy, Clone, Debug, PartialEq)]
enum Input {
    Move(Vec3),
    Shift(Vec3),
    Look(f32, f32),
    Zoom(f32),
    Toggle,
}

/// Collects input between frames and turns it into camera actions.
///
/// Mouse motion orbits the view; with the left button held it zooms instead,
/// and while the right button is held it is ignored. A right press toggles
/// the projection. `r`/`f` move forward and back, `d`/`g` strafe, space and
/// `z` rise and sink along the world y-axis. Actions come out in the order
/// their input arrived.
#[derive(Default)]
pub struct CameraController {
    step: f32,
    is_zoom_dragging: bool,
    is_toggle_held: bool,
    pending: Vec<Input>,
}

impl CameraController {
    pub fn new(step: f32) -> Self {
        Self {
            step,
            ..Default::default()
        }
    }

    pub fn key_action(&self, key: &Key) -> Option<CameraAction> {
        let s = self.step;
        match key {
            Key::Named(NamedKey::Space) => Some(CameraAction::Shift(Vec3::new(0.0, s, 0.0))),
            Key::Character(c) => match c.to_lowercase().as_str() {
                "r" => Some(CameraAction::Move(Vec3::new(0.0, 0.0, s))),
                "f" => Some(CameraAction::Move(Vec3::new(0.0, 0.0, -s))),
                "d" => Some(CameraAction::Move(Vec3::new(-s, 0.0, 0.0))),
                "g" => Some(CameraAction::Move(Vec3::new(s, 0.0, 0.0))),
                "z" => Some(CameraAction::Shift(Vec3::new(0.0, -s, 0.0))),
                " " => Some(CameraAction::Shift(Vec3::new(0.0, s, 0.0))),
                _ => None,
            },
            _ => None,
        }
    }

    /// Queues `input`, merging it into the last entry when both are the same
    /// kind of motion.
    fn push(&mut self, input: Input) {
        let merged = match (self.pending.last_mut(), input) {
            (Some(Input::Move(a)), Input::Move(b)) | (Some(Input::Shift(a)), Input::Shift(b)) => {
                *a += b;
                true
            }
            (Some(Input::Look(ax, ay)), Input::Look(bx, by)) => {
                *ax += bx;
                *ay += by;
                true
            }
            (Some(Input::Zoom(a)), Input::Zoom(b)) => {
                *a += b;
                true
            }
            _ => false,
        };
        if !merged {
            self.pending.push(input);
        }
    }

    pub fn process_events(&mut self, event: &WindowEvent) -> bool {
        match event {
            WindowEvent::KeyboardInput { event: key_event, .. } => {
                if key_event.state != ElementState::Pressed {
                    return false;
                }
                match self.key_action(&key_event.logical_key) {
                    Some(CameraAction::Move(step)) => {
                        self.push(Input::Move(step));
                        true
                    }
                    Some(CameraAction::Shift(d)) => {
                        self.push(Input::Shift(d));
                        true
                    }
                    _ => false,
                }
            }
            WindowEvent::MouseInput { state, button, .. } => self.process_button(*button, *state),
            _ => false,
        }
    }

    pub fn process_button(&mut self, button: MouseButton, state: ElementState) -> bool {
        let pressed = state == ElementState::Pressed;
        match button {
            MouseButton::Left => {
                self.is_zoom_dragging = pressed;
                true
            }
            MouseButton::Right => {
                self.is_toggle_held = pressed;
                if pressed {
                    self.push(Input::Toggle);
                    // Toggling ends any zoom drag in progress.
                    self.is_zoom_dragging = false;
                }
                true
            }
            _ => false,
        }
    }

    pub fn process_mouse_motion(&mut self, delta_x: f64, delta_y: f64) {
        if self.is_toggle_held || (delta_x == 0.0 && delta_y == 0.0) {
            return;
        }
        if self.is_zoom_dragging {
            if delta_y != 0.0 {
                self.push(Input::Zoom(delta_y as f32));
            }
        } else {
            self.push(Input::Look(delta_x as f32, delta_y as f32));
        }
    }

    /// Drains the queued input in arrival order. `mode` is the projection in
    /// effect now; each zoom is resolved against the mode left by the toggles
    /// queued before it.
    pub fn take_actions(&mut self, mode: ProjectionMode) -> Vec<CameraAction> {
        let mut mode = mode;
        self.pending
            .drain(..)
            .filter_map(|input| match input {
                Input::Move(step) if step != Vec3::ZERO => Some(CameraAction::Move(step)),
                Input::Shift(d) if d != Vec3::ZERO => Some(CameraAction::Shift(d)),
                Input::Look(dx, dy) if dx != 0.0 || dy != 0.0 => Some(CameraAction::Pan {
                    d_theta: -dy * PITCH_PER_PIXEL,
                    d_phi: -dx * YAW_PER_PIXEL,
                }),
                Input::Zoom(dy) if dy != 0.0 => Some(match mode {
                    ProjectionMode::Perspective => CameraAction::ZoomPerspective(dy * FOVY_PER_PIXEL),
                    ProjectionMode::Orthographic => CameraAction::ZoomOrthographic(ORTHO_ZOOM_BASE.powf(dy)),
                }),
                Input::Toggle => {
                    mode = mode.toggled();
                    Some(CameraAction::ToggleProjection)
                }
                _ => None,
            })
            .collect()
    }

    pub fn update_camera(&mut self, camera: &mut Camera) {
        for action in self.take_actions(camera.mode()) {
            camera.apply(action);
        }
    }
}
