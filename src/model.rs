use wgpu::util::DeviceExt;

use crate::mesh::Mesh;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

pub fn interleave(mesh: &Mesh) -> Vec<Vertex> {
    mesh.positions()
        .iter()
        .zip(mesh.normals())
        .map(|(p, n)| Vertex {
            position: p.to_array(),
            normal: n.to_array(),
        })
        .collect()
}

/// GPU copy of the terrain mesh. Replaced wholesale after every rebuild.
pub struct TerrainModel {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
}

impl TerrainModel {
    pub fn from_mesh(device: &wgpu::Device, mesh: &Mesh) -> Self {
        let vertices = interleave(mesh);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Terrain Index Buffer"),
            contents: bytemuck::cast_slice(mesh.triangles()),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            num_indices: mesh.index_count() as u32,
        }
    }
}

pub trait Drawable {
    fn draw_terrain(&mut self, terrain: &TerrainModel);
}

impl Drawable for wgpu::RenderPass<'_> {
    fn draw_terrain(&mut self, terrain: &TerrainModel) {
        self.set_vertex_buffer(0, terrain.vertex_buffer.slice(..));
        self.set_index_buffer(terrain.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..terrain.num_indices, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::heightfield::Grid;

    #[test]
    fn interleave_pairs_positions_with_normals() {
        let mut grid = Grid::new(3, 2, 1.0, 2.0);
        grid.set_height(2, 1, 4.0);
        let mesh = Mesh::build(&grid);
        let vertices = interleave(&mesh);

        assert_eq!(vertices.len(), mesh.vertex_count());
        let v = vertices[grid.index(2, 1)];
        assert_eq!(v.position, [2.0, 4.0, 2.0]);
        assert_eq!(v.normal, mesh.normals()[grid.index(2, 1)].to_array());
    }

    #[test]
    fn buffers_have_tight_layouts() {
        assert_eq!(std::mem::size_of::<Vertex>(), 24);
        assert_eq!(Vertex::desc().array_stride, 24);

        let mesh = Mesh::build(&Grid::new(4, 4, 1.0, 1.0));
        let indices: &[u32] = bytemuck::cast_slice(mesh.triangles());
        assert_eq!(indices.len(), mesh.index_count());
        assert_eq!(&indices[..6], &[0, 1, 5, 5, 4, 0]);
    }
}
