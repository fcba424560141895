use std::borrow::Cow;
use std::path::Path;

use rand::Rng;
use thiserror::Error;

pub const MIN_SAMPLES: usize = 2;

#[derive(Debug, Error)]
pub enum GridError {
    #[error("failed to read heightmap image: {0}")]
    Image(#[from] image::ImageError),
    #[error("heightmap is {width}x{height}, need at least 2 samples per side")]
    TooSmall { width: u32, height: u32 },
    #[error("heightmap is {width}x{height}, more samples than 32-bit mesh indices can address")]
    TooLarge { width: u32, height: u32 },
}

/// How many zero-height cells to frame the terrain with before meshing.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Padding {
    None,
    /// Scales with the grid: `max(1, round(sqrt(nx * ny) / 8))`.
    #[default]
    Auto,
    Cells(usize),
}

impl From<i32> for Padding {
    fn from(value: i32) -> Self {
        match value {
            v if v < 0 => Padding::Auto,
            0 => Padding::None,
            v => Padding::Cells(v as usize),
        }
    }
}

impl Padding {
    pub fn cells_for(self, nx: usize, ny: usize) -> usize {
        match self {
            Padding::None => 0,
            Padding::Cells(p) => p,
            Padding::Auto => {
                let p = ((nx * ny) as f64).sqrt() / 8.0;
                (p.round() as usize).max(1)
            }
        }
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<(), GridError> {
    if (width as usize) < MIN_SAMPLES || (height as usize) < MIN_SAMPLES {
        return Err(GridError::TooSmall { width, height });
    }
    // Mesh indices are u32.
    if width as u64 * height as u64 > u32::MAX as u64 {
        return Err(GridError::TooLarge { width, height });
    }
    Ok(())
}

/// Row-major elevation samples. Sample `(i, j)` is stored at `i + nx * j`.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    nx: usize,
    ny: usize,
    dx: f32,
    dy: f32,
    heights: Vec<f32>,
}

impl Grid {
    pub fn new(nx: usize, ny: usize, dx: f32, dy: f32) -> Self {
        let nx = nx.max(MIN_SAMPLES);
        let ny = ny.max(MIN_SAMPLES);
        Self {
            nx,
            ny,
            dx: dx.abs(),
            dy: dy.abs(),
            heights: vec![0.0; nx * ny],
        }
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn dx(&self) -> f32 {
        self.dx
    }

    pub fn dy(&self) -> f32 {
        self.dy
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    pub fn index(&self, i: usize, j: usize) -> usize {
        debug_assert!(i < self.nx && j < self.ny);
        i + self.nx * j
    }

    pub fn height(&self, i: usize, j: usize) -> f32 {
        self.heights[self.index(i, j)]
    }

    pub fn set_height(&mut self, i: usize, j: usize, h: f32) {
        let idx = self.index(i, j);
        self.heights[idx] = h;
    }

    pub fn heights(&self) -> &[f32] {
        &self.heights
    }

    pub fn heights_mut(&mut self) -> &mut [f32] {
        &mut self.heights
    }

    pub fn randomize(&mut self, h_min: f32, h_max: f32) {
        self.randomize_with(&mut rand::rng(), h_min, h_max);
    }

    pub fn randomize_with<R: Rng>(&mut self, rng: &mut R, h_min: f32, h_max: f32) {
        for h in self.heights.iter_mut() {
            let alpha: f32 = rng.random();
            *h = alpha * h_min + (1.0 - alpha) * h_max;
        }
    }

    /// Replaces the samples with the luminance of a heightmap image. The grid
    /// takes the image's dimensions and keeps its own spacing.
    pub fn load<P: AsRef<Path>>(&mut self, path: P, height_scale: f32) -> Result<(), GridError> {
        let img = image::open(path.as_ref())?;
        self.load_image(&img, height_scale)
    }

    pub fn load_from_memory(&mut self, bytes: &[u8], height_scale: f32) -> Result<(), GridError> {
        let img = image::load_from_memory(bytes)?;
        self.load_image(&img, height_scale)
    }

    fn load_image(&mut self, img: &image::DynamicImage, height_scale: f32) -> Result<(), GridError> {
        let luma = img.to_luma16();
        let (width, height) = luma.dimensions();
        check_dimensions(width, height)?;

        // ImageBuffer pixels are row-major with x fastest, matching `i + nx * j`.
        self.nx = width as usize;
        self.ny = height as usize;
        self.heights = luma
            .pixels()
            .map(|p| p.0[0] as f32 / u16::MAX as f32 * height_scale)
            .collect();
        Ok(())
    }

    pub fn apply_padding(&self, padding: Padding) -> Cow<'_, Grid> {
        let p = padding.cells_for(self.nx, self.ny);
        if p == 0 {
            return Cow::Borrowed(self);
        }

        let nx = self.nx + 2 * p;
        let ny = self.ny + 2 * p;
        let mut heights = vec![0.0; nx * ny];
        for j in 0..self.ny {
            let src = &self.heights[self.nx * j..self.nx * (j + 1)];
            let start = p + nx * (j + p);
            heights[start..start + self.nx].copy_from_slice(src);
        }

        Cow::Owned(Grid {
            nx,
            ny,
            dx: self.dx,
            dy: self.dy,
            heights,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn numbered(nx: usize, ny: usize) -> Grid {
        let mut grid = Grid::new(nx, ny, 1.0, 1.0);
        for (k, h) in grid.heights_mut().iter_mut().enumerate() {
            *h = k as f32 + 1.0;
        }
        grid
    }

    #[test]
    fn new_clamps_degenerate_sizes() {
        let grid = Grid::new(0, 1, -2.0, -0.5);
        assert_eq!((grid.nx(), grid.ny()), (2, 2));
        assert_eq!((grid.dx(), grid.dy()), (2.0, 0.5));
        assert_eq!(grid.len(), 4);
        assert!(grid.heights().iter().all(|&h| h == 0.0));
    }

    #[test]
    fn index_is_x_fastest() {
        let mut grid = Grid::new(4, 3, 1.0, 1.0);
        grid.set_height(3, 2, 7.0);
        assert_eq!(grid.index(3, 2), 11);
        assert_eq!(grid.heights()[11], 7.0);
        assert_eq!(grid.height(3, 2), 7.0);
    }

    #[test]
    fn randomize_stays_in_range() {
        let mut grid = Grid::new(16, 16, 1.0, 1.0);
        let mut rng = StdRng::seed_from_u64(7);
        grid.randomize_with(&mut rng, 2.0, 5.0);
        assert!(grid.heights().iter().all(|&h| (2.0..=5.0).contains(&h)));
        assert!(grid.heights().iter().any(|&h| h != grid.heights()[0]));
    }

    #[test]
    fn randomize_is_reproducible_with_seed() {
        let mut a = Grid::new(8, 8, 1.0, 1.0);
        let mut b = a.clone();
        a.randomize_with(&mut StdRng::seed_from_u64(42), 0.0, 8.0);
        b.randomize_with(&mut StdRng::seed_from_u64(42), 0.0, 8.0);
        assert_eq!(a, b);
    }

    #[test]
    fn randomize_with_equal_bounds_is_flat() {
        let mut grid = Grid::new(5, 5, 1.0, 1.0);
        grid.randomize(3.0, 3.0);
        assert!(grid.heights().iter().all(|&h| (h - 3.0).abs() < 1e-6));
    }

    #[test]
    fn padding_none_borrows_the_source() {
        let grid = numbered(3, 4);
        let padded = grid.apply_padding(Padding::None);
        assert!(matches!(padded, Cow::Borrowed(_)));
        assert_eq!(*padded, grid);
    }

    #[test]
    fn padding_frames_interior_with_zeros() {
        let grid = numbered(3, 4);
        let p = 2;
        let padded = grid.apply_padding(Padding::Cells(p));
        assert_eq!((padded.nx(), padded.ny()), (3 + 2 * p, 4 + 2 * p));
        assert_eq!(padded.len(), padded.nx() * padded.ny());
        assert_eq!((padded.dx(), padded.dy()), (grid.dx(), grid.dy()));

        for j in 0..padded.ny() {
            for i in 0..padded.nx() {
                let inside = (p..p + 3).contains(&i) && (p..p + 4).contains(&j);
                let h = padded.height(i, j);
                if inside {
                    assert_eq!(h, grid.height(i - p, j - p));
                } else {
                    assert_eq!(h, 0.0, "border cell ({i}, {j})");
                }
            }
        }
    }

    #[test]
    fn auto_padding_scales_with_grid() {
        assert_eq!(Padding::Auto.cells_for(2, 2), 1);
        assert_eq!(Padding::Auto.cells_for(64, 64), 8);
        assert_eq!(Padding::Auto.cells_for(20, 20), 3);

        let grid = Grid::new(64, 64, 1.0, 1.0);
        let padded = grid.apply_padding(Padding::Auto);
        assert_eq!((padded.nx(), padded.ny()), (80, 80));
    }

    #[test]
    fn padding_from_signed_value() {
        assert_eq!(Padding::from(-1), Padding::Auto);
        assert_eq!(Padding::from(-30), Padding::Auto);
        assert_eq!(Padding::from(0), Padding::None);
        assert_eq!(Padding::from(3), Padding::Cells(3));
    }

    fn png_bytes(img: image::GrayImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image::DynamicImage::ImageLuma8(img)
            .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn load_reads_luminance_as_height() {
        let mut img = image::GrayImage::new(3, 2);
        img.put_pixel(2, 0, image::Luma([255]));
        img.put_pixel(1, 1, image::Luma([0]));
        img.put_pixel(0, 1, image::Luma([255]));

        let mut grid = Grid::new(10, 10, 2.0, 3.0);
        grid.load_from_memory(&png_bytes(img), 4.0).unwrap();

        assert_eq!((grid.nx(), grid.ny()), (3, 2));
        assert_eq!(grid.len(), 6);
        assert_eq!((grid.dx(), grid.dy()), (2.0, 3.0));
        assert!((grid.height(2, 0) - 4.0).abs() < 1e-5);
        assert!((grid.height(0, 1) - 4.0).abs() < 1e-5);
        assert_eq!(grid.height(1, 1), 0.0);
        assert_eq!(grid.height(0, 0), 0.0);
    }

    #[test]
    fn load_rejects_single_row_images() {
        let mut grid = Grid::new(4, 4, 1.0, 1.0);
        let before = grid.clone();
        let err = grid
            .load_from_memory(&png_bytes(image::GrayImage::new(5, 1)), 1.0)
            .unwrap_err();
        assert!(matches!(err, GridError::TooSmall { width: 5, height: 1 }));
        assert_eq!(grid, before);
    }

    #[test]
    fn dimensions_must_fit_u32_indices() {
        assert!(check_dimensions(2, 2).is_ok());
        assert!(check_dimensions(65_536, 65_535).is_ok());
        assert!(matches!(
            check_dimensions(65_536, 65_536),
            Err(GridError::TooLarge { width: 65_536, height: 65_536 })
        ));
        assert!(matches!(check_dimensions(1, 9), Err(GridError::TooSmall { .. })));
    }

    #[test]
    fn load_reports_undecodable_bytes() {
        let mut grid = Grid::new(4, 4, 1.0, 1.0);
        let err = grid.load_from_memory(b"not an image", 1.0).unwrap_err();
        assert!(matches!(err, GridError::Image(_)));
    }
}
