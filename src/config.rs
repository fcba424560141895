use std::path::PathBuf;

use clap::Parser;
use log::{info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::camera::ProjectionMode;
use crate::heightfield::{Grid, Padding};
use crate::scene::Scene;

#[derive(Parser, Debug, Clone)]
#[command(name = "elevation-viewer", about = "Height-field terrain viewer")]
pub struct Args {
    /// Samples along the grid's i axis
    #[arg(long, default_value_t = 64)]
    pub nx: usize,

    /// Samples along the grid's j axis
    #[arg(long, default_value_t = 64)]
    pub ny: usize,

    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub dx: f32,

    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub dy: f32,

    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub h_min: f32,

    #[arg(long, default_value_t = 8.0, allow_negative_numbers = true)]
    pub h_max: f32,

    /// Zero-height border in cells; negative picks one from the grid size
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub padding: i32,

    /// Grayscale image to use instead of random terrain
    #[arg(long)]
    pub heightmap: Option<PathBuf>,

    /// Height of a white heightmap pixel
    #[arg(long, default_value_t = 8.0)]
    pub height_scale: f32,

    /// Seed for reproducible random terrain
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value = "perspective")]
    pub projection: ProjectionMode,

    /// Distance covered by one movement key press
    #[arg(long, default_value_t = 1.0)]
    pub step: f32,
}

impl Default for Args {
    fn default() -> Self {
        Self::parse_from(["elevation-viewer"])
    }
}

impl Args {
    pub fn padding(&self) -> Padding {
        Padding::from(self.padding)
    }

    /// Builds the initial scene. A heightmap that cannot be read is reported
    /// and replaced by random terrain.
    pub fn build_scene(&self) -> Scene {
        let mut grid = Grid::new(self.nx, self.ny, self.dx, self.dy);
        if !self.load_heightmap(&mut grid) {
            match self.seed {
                Some(seed) => {
                    info!("randomizing terrain with seed {seed}");
                    grid.randomize_with(&mut StdRng::seed_from_u64(seed), self.h_min, self.h_max);
                }
                None => grid.randomize(self.h_min, self.h_max),
            }
        }

        let mut scene = Scene::new(grid, self.padding());
        scene.camera.set_mode(self.projection);
        scene
    }

    fn load_heightmap(&self, grid: &mut Grid) -> bool {
        let Some(path) = &self.heightmap else {
            return false;
        };
        match grid.load(path, self.height_scale) {
            Ok(()) => {
                info!("loaded {}x{} heightmap from {}", grid.nx(), grid.ny(), path.display());
                true
            }
            Err(e) => {
                warn!("{e}; falling back to random terrain");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Camera;

    #[test]
    fn defaults_match_the_classic_viewer() {
        let args = Args::default();
        assert_eq!((args.nx, args.ny), (64, 64));
        assert_eq!((args.dx, args.dy), (1.0, 1.0));
        assert_eq!((args.h_min, args.h_max), (0.0, 8.0));
        assert_eq!(args.padding(), Padding::Auto);
        assert_eq!(args.projection, ProjectionMode::Perspective);
        assert!(args.heightmap.is_none());
    }

    #[test]
    fn parses_overrides() {
        let args = Args::try_parse_from([
            "elevation-viewer",
            "--nx",
            "12",
            "--dy",
            "-2.5",
            "--padding",
            "0",
            "--projection",
            "ortho",
            "--seed",
            "9",
        ])
        .unwrap();
        assert_eq!(args.nx, 12);
        assert_eq!(args.dy, -2.5);
        assert_eq!(args.padding(), Padding::None);
        assert_eq!(args.projection, ProjectionMode::Orthographic);
        assert_eq!(args.seed, Some(9));
    }

    #[test]
    fn unknown_projection_is_perspective() {
        let args = Args::try_parse_from(["elevation-viewer", "--projection", "isometric"]).unwrap();
        assert_eq!(args.projection, ProjectionMode::Perspective);
    }

    #[test]
    fn seeded_scenes_are_identical() {
        let args = Args::try_parse_from(["elevation-viewer", "--nx", "8", "--ny", "5", "--seed", "3"]).unwrap();
        let a = args.build_scene();
        let b = args.build_scene();
        assert_eq!(a.grid(), b.grid());
        assert_eq!(a.mesh().vertex_count(), (8 + 2) * (5 + 2));
        assert!(a.grid().heights().iter().all(|&h| (0.0..=8.0).contains(&h)));
    }

    #[test]
    fn missing_heightmap_falls_back_to_random() {
        let args = Args::try_parse_from([
            "elevation-viewer",
            "--nx",
            "6",
            "--ny",
            "6",
            "--heightmap",
            "/nonexistent/terrain.png",
            "--h-min",
            "1",
            "--h-max",
            "2",
        ])
        .unwrap();
        let scene = args.build_scene();
        assert_eq!(scene.grid().nx(), 6);
        assert!(scene.grid().heights().iter().all(|&h| (1.0..=2.0).contains(&h)));
        assert_eq!(scene.mesh_revision(), 1);
    }

    #[test]
    fn heightmap_scene_is_framed_on_the_loaded_grid() {
        let path = std::env::temp_dir().join(format!("elevation-viewer-args-{}.png", std::process::id()));
        image::GrayImage::from_pixel(50, 20, image::Luma([255])).save(&path).unwrap();

        let args = Args::try_parse_from([
            "elevation-viewer",
            "--nx",
            "4",
            "--ny",
            "4",
            "--projection",
            "orthographic",
            "--heightmap",
            path.to_str().unwrap(),
        ])
        .unwrap();
        let scene = args.build_scene();
        std::fs::remove_file(&path).unwrap();

        assert_eq!((scene.grid().nx(), scene.grid().ny()), (50, 20));
        assert_eq!(scene.camera.position, Camera::framing(scene.grid()).position);
        assert_eq!(scene.camera.mode(), ProjectionMode::Orthographic);
        assert_eq!(scene.mesh_revision(), 1);
    }
}
