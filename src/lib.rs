//! Height-field terrain viewer: elevation grids, the meshes built from them,
//! an orbit/fly camera and the wgpu renderer that draws the result.

pub mod camera;
pub mod camera_controller;
pub mod config;
pub mod heightfield;
pub mod light;
pub mod mesh;
pub mod model;
pub mod renderer;
pub mod scene;
