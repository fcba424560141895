use std::path::Path;

use glam::{Mat4, Vec3};
use log::info;
use rand::Rng;

use crate::camera::Camera;
use crate::heightfield::{Grid, GridError, Padding};
use crate::light::DirectionalLight;
use crate::mesh::Mesh;

/// Rigid placement of the terrain: a translation and a rotation vector whose
/// length is the angle in radians.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ModelTransform {
    pub translation: Vec3,
    pub rotation: Vec3,
}

impl ModelTransform {
    pub fn matrix(&self) -> Mat4 {
        let translate = Mat4::from_translation(self.translation);
        let angle = self.rotation.length();
        if angle > 0.0 {
            translate * Mat4::from_axis_angle(self.rotation / angle, angle)
        } else {
            translate
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FrameMatrices {
    pub model: Mat4,
    pub view: Mat4,
    pub projection: Mat4,
}

/// Owns everything the viewer draws. Any change to the grid goes through
/// here so the mesh is regenerated before the next frame.
pub struct Scene {
    grid: Grid,
    padding: Padding,
    mesh: Mesh,
    mesh_revision: u64,
    pub camera: Camera,
    pub light: DirectionalLight,
    pub transform: ModelTransform,
}

impl Scene {
    pub fn new(grid: Grid, padding: Padding) -> Self {
        let camera = Camera::framing(&grid);
        let mut scene = Self {
            grid,
            padding,
            mesh: Mesh::default(),
            mesh_revision: 0,
            camera,
            light: DirectionalLight::default(),
            transform: ModelTransform::default(),
        };
        scene.rebuild_mesh();
        scene
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn padding(&self) -> Padding {
        self.padding
    }

    /// Bumped on every rebuild; the renderer re-uploads when it changes.
    pub fn mesh_revision(&self) -> u64 {
        self.mesh_revision
    }

    pub fn set_padding(&mut self, padding: Padding) {
        if padding != self.padding {
            self.padding = padding;
            self.rebuild_mesh();
        }
    }

    /// Switches between no border and `padding` (automatic when `padding`
    /// is itself `None`).
    pub fn toggle_padding(&mut self, padding: Padding) {
        let next = match (self.padding, padding) {
            (Padding::None, Padding::None) => Padding::Auto,
            (Padding::None, p) => p,
            _ => Padding::None,
        };
        self.set_padding(next);
    }

    pub fn randomize(&mut self, h_min: f32, h_max: f32) {
        self.grid.randomize(h_min, h_max);
        self.rebuild_mesh();
    }

    pub fn randomize_with<R: Rng>(&mut self, rng: &mut R, h_min: f32, h_max: f32) {
        self.grid.randomize_with(rng, h_min, h_max);
        self.rebuild_mesh();
    }

    /// Loads a heightmap and re-frames the camera on the new terrain.
    pub fn load_heightmap<P: AsRef<Path>>(&mut self, path: P, height_scale: f32) -> Result<(), GridError> {
        self.grid.load(path.as_ref(), height_scale)?;
        info!(
            "loaded {}x{} heightmap from {}",
            self.grid.nx(),
            self.grid.ny(),
            path.as_ref().display()
        );
        self.camera.frame(&self.grid);
        self.rebuild_mesh();
        Ok(())
    }

    pub fn rebuild_mesh(&mut self) {
        self.mesh = Mesh::from_grid(&self.grid, self.padding);
        self.mesh_revision += 1;
        info!(
            "terrain mesh rebuilt: {} vertices, {} triangles",
            self.mesh.vertex_count(),
            self.mesh.triangle_count()
        );
    }

    pub fn frame_matrices(&self) -> FrameMatrices {
        FrameMatrices {
            model: self.transform.matrix(),
            view: self.camera.build_view_matrix(),
            projection: self.camera.build_projection_matrix(),
        }
    }
}
