//! Shared instance mesh and vertex buffer layouts

use bytemuck::{Pod, Zeroable};
use std::ops::Range;
use wgpu::util::DeviceExt;

/// Per-vertex data, stepped once per mesh vertex
pub trait Vertex: Pod + Zeroable {
    fn attribs() -> &'static [wgpu::VertexAttribute];
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: Self::attribs(),
        }
    }
}

/// Per-instance data, stepped once per particle
pub trait Instance: Pod + Zeroable {
    fn attribs() -> &'static [wgpu::VertexAttribute];
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as u64,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: Self::attribs(),
        }
    }
}

/// Local-space mesh vertex (location 0)
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    pub position: [f32; 3],
}

impl MeshVertex {
    const ATTRIBS: &'static [wgpu::VertexAttribute] = &wgpu::vertex_attr_array![
        0 => Float32x3,
    ];
}

impl Vertex for MeshVertex {
    fn attribs() -> &'static [wgpu::VertexAttribute] {
        Self::ATTRIBS
    }
}

/// View of one slot of the simulation's position buffer (location 1).
/// The trailing lane is padding and is not bound.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 3],
    pub _padding: f32,
}

impl ParticleInstance {
    const ATTRIBS: &'static [wgpu::VertexAttribute] = &wgpu::vertex_attr_array![
        1 => Float32x3,
    ];
}

impl Instance for ParticleInstance {
    fn attribs() -> &'static [wgpu::VertexAttribute] {
        Self::ATTRIBS
    }
}

/// Axis-aligned cube centred on the origin with the given half extent.
pub fn cube_geometry(half_extent: f32) -> (Vec<MeshVertex>, Vec<u32>) {
    let h = half_extent;
    let vertices = [
        [-h, -h, -h],
        [h, -h, -h],
        [h, -h, h],
        [-h, -h, h],
        [-h, h, -h],
        [h, h, -h],
        [h, h, h],
        [-h, h, h],
    ]
    .into_iter()
    .map(|position| MeshVertex { position })
    .collect();

    #[rustfmt::skip]
    let indices = vec![
        // bottom
        0, 1, 2,
        0, 2, 3,
        // top
        4, 6, 5,
        4, 7, 6,
        // back
        0, 5, 1,
        0, 4, 5,
        // front
        3, 2, 6,
        3, 6, 7,
        // left
        3, 4, 0,
        3, 7, 4,
        // right
        1, 6, 2,
        1, 5, 6,
    ];

    (vertices, indices)
}

pub struct Mesh {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

impl Mesh {
    pub fn create(device: &wgpu::Device, vertices: &[impl Vertex], indices: &[u32]) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        log::debug!(
            "Created mesh with {} vertices and {} triangles",
            vertices.len(),
            indices.len() / 3
        );

        Self {
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
        }
    }

    pub fn cube(device: &wgpu::Device, half_extent: f32) -> Self {
        let (vertices, indices) = cube_geometry(half_extent);
        Self::create(device, &vertices, &indices)
    }

    pub fn draw_instanced(
        &self,
        render_pass: &mut wgpu::RenderPass,
        instance_buffer: &wgpu::Buffer,
        instances: Range<u32>,
    ) {
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_vertex_buffer(1, instance_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.index_count, 0, instances);
    }
}
