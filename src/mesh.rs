use glam::Vec3;

use crate::heightfield::{Grid, Padding};

/// World position of grid sample `(i, j)`. Grid i runs along world z and
/// grid j along world x; the height is world y.
pub fn grid_to_world(grid: &Grid, i: usize, j: usize) -> Vec3 {
    Vec3::new(j as f32 * grid.dy(), grid.height(i, j), i as f32 * grid.dx())
}

/// CPU-side terrain geometry, regenerated in full whenever the grid changes.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
}

impl Mesh {
    pub fn from_grid(grid: &Grid, padding: Padding) -> Self {
        Self::build(&grid.apply_padding(padding))
    }

    pub fn build(grid: &Grid) -> Self {
        let (nx, ny) = (grid.nx(), grid.ny());
        debug_assert!(
            6 * (nx - 1) * (ny - 1) <= u32::MAX as usize,
            "{nx}x{ny} grid overflows 32-bit indices"
        );

        let mut positions = vec![Vec3::ZERO; nx * ny];
        for j in 0..ny {
            for i in 0..nx {
                positions[grid.index(i, j)] = grid_to_world(grid, i, j);
            }
        }

        let mut normals = vec![Vec3::Y; nx * ny];
        for j in 0..ny {
            let jm = j.saturating_sub(1);
            let jp = (j + 1).min(ny - 1);
            for i in 0..nx {
                let im = i.saturating_sub(1);
                let ip = (i + 1).min(nx - 1);

                let gx = positions[grid.index(ip, j)] - positions[grid.index(im, j)];
                let gy = positions[grid.index(i, jp)] - positions[grid.index(i, jm)];

                let n = gx.cross(gy).normalize_or_zero();
                if n != Vec3::ZERO {
                    normals[grid.index(i, j)] = n;
                }
            }
        }

        let mut triangles = Vec::with_capacity(2 * (nx - 1) * (ny - 1));
        for j in 0..ny - 1 {
            for i in 0..nx - 1 {
                let v00 = grid.index(i, j) as u32;
                let v10 = grid.index(i + 1, j) as u32;
                let v11 = grid.index(i + 1, j + 1) as u32;
                let v01 = grid.index(i, j + 1) as u32;

                triangles.push([v00, v10, v11]);
                triangles.push([v11, v01, v00]);
            }
        }

        Self {
            positions,
            normals,
            triangles,
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn index_count(&self) -> usize {
        3 * self.triangles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const EPS: f32 = 1e-5;

    fn bump() -> Grid {
        let mut grid = Grid::new(3, 3, 1.0, 1.0);
        grid.set_height(1, 1, 1.0);
        grid
    }

    #[test]
    fn counts_match_grid_dimensions() {
        for (nx, ny) in [(2, 2), (3, 7), (16, 5), (33, 33)] {
            let mesh = Mesh::build(&Grid::new(nx, ny, 1.0, 2.0));
            assert_eq!(mesh.vertex_count(), nx * ny);
            assert_eq!(mesh.normals().len(), nx * ny);
            assert_eq!(mesh.triangle_count(), 2 * (nx - 1) * (ny - 1));
            assert_eq!(mesh.index_count(), 6 * (nx - 1) * (ny - 1));
        }
    }

    #[test]
    fn padded_mesh_uses_padded_dimensions() {
        let grid = Grid::new(4, 6, 1.0, 1.0);
        let mesh = Mesh::from_grid(&grid, Padding::Cells(2));
        assert_eq!(mesh.vertex_count(), 8 * 10);
        assert_eq!(mesh.triangle_count(), 2 * 7 * 9);
    }

    #[test]
    fn positions_swap_grid_axes() {
        let mut grid = Grid::new(4, 3, 2.0, 5.0);
        grid.set_height(3, 1, 9.0);
        assert_eq!(grid_to_world(&grid, 3, 1), Vec3::new(5.0, 9.0, 6.0));

        let mesh = Mesh::build(&grid);
        assert_eq!(mesh.positions()[grid.index(3, 1)], Vec3::new(5.0, 9.0, 6.0));
        assert_eq!(mesh.positions()[0], Vec3::ZERO);
    }

    #[test]
    fn flat_grid_normals_point_up() {
        let mesh = Mesh::build(&Grid::new(5, 4, 1.5, 0.5));
        for n in mesh.normals() {
            assert!((*n - Vec3::Y).length() < EPS, "{n:?}");
        }
    }

    #[test]
    fn normals_are_unit_length() {
        let mut grid = Grid::new(24, 17, 1.0, 0.75);
        grid.randomize_with(&mut StdRng::seed_from_u64(3), -4.0, 12.0);
        let mesh = Mesh::from_grid(&grid, Padding::Auto);
        for n in mesh.normals() {
            assert!((n.length() - 1.0).abs() < EPS, "{n:?}");
        }
    }

    #[test]
    fn raised_centre_normal_is_most_upright() {
        let grid = bump();
        let mesh = Mesh::build(&grid);
        assert_eq!(mesh.vertex_count(), 9);
        assert_eq!(mesh.triangle_count(), 8);

        let centre = mesh.normals()[grid.index(1, 1)];
        assert!((centre - Vec3::Y).length() < EPS);

        for (i, j) in [(1, 0), (0, 1), (2, 1), (1, 2)] {
            let edge = mesh.normals()[grid.index(i, j)];
            assert!(centre.y > edge.y + 0.1, "edge ({i}, {j}) = {edge:?}");
        }
        for n in mesh.normals() {
            assert!(centre.y >= n.y - EPS);
        }
    }

    #[test]
    fn edge_normals_lean_away_from_bump() {
        let grid = bump();
        let mesh = Mesh::build(&grid);
        // (0, 1) sits at smaller world z than the bump, so it tilts toward -z.
        let n = mesh.normals()[grid.index(0, 1)];
        assert!(n.z < 0.0);
        assert!(n.x.abs() < EPS);
    }

    #[test]
    fn triangles_wind_counter_clockwise_from_above() {
        let mesh = Mesh::build(&Grid::new(4, 4, 1.0, 1.0));
        for tri in mesh.triangles() {
            let [a, b, c] = tri.map(|v| mesh.positions()[v as usize]);
            let face = (b - a).cross(c - a);
            assert!(face.y > 0.0, "{tri:?}");
        }
    }

    #[test]
    fn first_quad_indices() {
        let mesh = Mesh::build(&Grid::new(3, 2, 1.0, 1.0));
        assert_eq!(mesh.triangles()[0], [0, 1, 4]);
        assert_eq!(mesh.triangles()[1], [4, 3, 0]);
        let max = mesh.triangles().iter().flatten().copied().max();
        assert_eq!(max, Some(5));
    }
}
