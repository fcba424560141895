use std::convert::Infallible;
use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, FRAC_PI_6, PI, TAU};
use std::str::FromStr;

use glam::{Mat3, Mat4, Vec3};
use log::{debug, warn};

use crate::heightfield::Grid;

pub const FOVY_MIN: f32 = PI / 64.0;
pub const FOVY_MAX: f32 = PI * 63.0 / 64.0;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ProjectionMode {
    #[default]
    Perspective,
    Orthographic,
}

impl ProjectionMode {
    /// Unknown codes fall back to perspective.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => ProjectionMode::Orthographic,
            _ => ProjectionMode::Perspective,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ProjectionMode::Perspective => ProjectionMode::Orthographic,
            ProjectionMode::Orthographic => ProjectionMode::Perspective,
        }
    }
}

impl FromStr for ProjectionMode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mode = match s.trim().to_ascii_lowercase().as_str() {
            "perspective" | "persp" => ProjectionMode::Perspective,
            "orthographic" | "ortho" => ProjectionMode::Orthographic,
            other => match other.parse::<i32>() {
                Ok(code) => ProjectionMode::from_code(code),
                Err(_) => {
                    warn!("unknown projection mode {other:?}, using perspective");
                    ProjectionMode::Perspective
                }
            },
        };
        Ok(mode)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Perspective {
    pub fovy: f32,
    pub aspect: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for Perspective {
    fn default() -> Self {
        Self {
            fovy: FRAC_PI_4,
            aspect: 4.0 / 3.0,
            znear: 0.125,
            zfar: 1024.0,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Orthographic {
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Default for Orthographic {
    fn default() -> Self {
        Self {
            left: -400.0,
            right: 400.0,
            bottom: -300.0,
            top: 300.0,
            znear: 0.125,
            zfar: 1024.0,
        }
    }
}

/// Discrete camera operations, the only way input reaches the camera.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum CameraAction {
    Pan { d_theta: f32, d_phi: f32 },
    /// Translate along the world axes.
    Shift(Vec3),
    /// Translate along the camera's own axes; +z steps forward.
    Move(Vec3),
    ZoomPerspective(f32),
    ZoomOrthographic(f32),
    ToggleProjection,
}

/// Orbit/fly camera. `theta` tilts about the x-axis, `phi` turns about the
/// world y-axis; at `theta = phi = 0` the camera looks down -z with +y up.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    theta: f32,
    phi: f32,
    pub position: Vec3,
    mode: ProjectionMode,
    pub perspective: Perspective,
    pub orthographic: Orthographic,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            theta: 0.0,
            phi: 0.0,
            position: Vec3::ZERO,
            mode: ProjectionMode::Perspective,
            perspective: Perspective::default(),
            orthographic: Orthographic::default(),
        }
    }
}

impl Camera {
    pub fn new(position: Vec3, theta: f32, phi: f32) -> Self {
        let mut camera = Self {
            position,
            theta,
            phi,
            ..Default::default()
        };
        camera.clamp_angles();
        camera
    }

    /// Places the camera behind and above the terrain, tilted down toward it.
    pub fn framing(grid: &Grid) -> Self {
        let mut camera = Self::default();
        camera.frame(grid);
        camera
    }

    /// Moves and re-aims the camera as `framing` would, keeping the
    /// projection mode and parameters.
    pub fn frame(&mut self, grid: &Grid) {
        let (nx, ny) = (grid.nx() as f32, grid.ny() as f32);
        let height = (nx * nx + ny * ny).sqrt() / 2.0;
        self.position = Vec3::new(grid.dy() * ny / 2.0, height, grid.dx() * nx * 1.7);
        self.theta = -FRAC_PI_6;
        self.phi = 0.0;
    }

    pub fn theta(&self) -> f32 {
        self.theta
    }

    pub fn phi(&self) -> f32 {
        self.phi
    }

    pub fn mode(&self) -> ProjectionMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: ProjectionMode) {
        self.mode = mode;
    }

    pub fn apply(&mut self, action: CameraAction) {
        match action {
            CameraAction::Pan { d_theta, d_phi } => self.pan(d_theta, d_phi),
            CameraAction::Shift(d) => self.shift(d),
            CameraAction::Move(step) => self.move_by(step),
            CameraAction::ZoomPerspective(delta) => self.zoom_perspective(delta),
            CameraAction::ZoomOrthographic(factor) => self.zoom_orthographic(factor),
            CameraAction::ToggleProjection => self.toggle_projection(),
        }
    }

    pub fn pan(&mut self, d_theta: f32, d_phi: f32) {
        if !d_theta.is_finite() || !d_phi.is_finite() {
            warn!("ignoring pan by ({d_theta}, {d_phi})");
            return;
        }
        self.theta += d_theta;
        self.phi += d_phi;
        self.clamp_angles();
    }

    fn clamp_angles(&mut self) {
        self.theta = self.theta.clamp(-FRAC_PI_2, FRAC_PI_2);
        self.phi -= (self.phi / TAU).floor() * TAU;
        // Tiny negative angles round up to exactly TAU.
        if self.phi >= TAU {
            self.phi = 0.0;
        }
    }

    pub fn shift(&mut self, d: Vec3) {
        self.position += d;
    }

    pub fn move_by(&mut self, step: Vec3) {
        self.position += self.rotation() * Vec3::new(step.x, step.y, -step.z);
    }

    pub fn toggle_projection(&mut self) {
        self.mode = self.mode.toggled();
        debug!("camera projection switched to {:?}", self.mode);
    }

    pub fn zoom_perspective(&mut self, delta: f32) {
        if !delta.is_finite() {
            warn!("ignoring perspective zoom by {delta}");
            return;
        }
        self.perspective.fovy = (self.perspective.fovy + delta).clamp(FOVY_MIN, FOVY_MAX);
    }

    pub fn zoom_orthographic(&mut self, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            warn!("ignoring orthographic zoom factor {factor}");
            return;
        }
        let ortho = &mut self.orthographic;
        ortho.left *= factor;
        ortho.right *= factor;
        ortho.bottom *= factor;
        ortho.top *= factor;
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.perspective.aspect = width as f32 / height as f32;
        }
    }

    fn rotation(&self) -> Mat3 {
        Mat3::from_rotation_y(self.phi) * Mat3::from_rotation_x(self.theta)
    }

    /// Camera-to-world transform.
    pub fn transform(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_rotation_y(self.phi)
            * Mat4::from_rotation_x(self.theta)
    }

    /// Unit vector the camera looks along, in world space.
    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }

    pub fn build_view_matrix(&self) -> Mat4 {
        self.transform().inverse()
    }

    pub fn build_projection_matrix(&self) -> Mat4 {
        match self.mode {
            ProjectionMode::Perspective => {
                let p = &self.perspective;
                Mat4::perspective_rh(p.fovy, p.aspect, p.znear, p.zfar)
            }
            ProjectionMode::Orthographic => {
                let o = &self.orthographic;
                Mat4::orthographic_rh(o.left, o.right, o.bottom, o.top, o.znear, o.zfar)
            }
        }
    }
}
