//! Flat ground quad

use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct GroundVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

const fn vertex(x: f32, z: f32, u: f32, v: f32) -> GroundVertex {
    GroundVertex { position: [x, 0.0, z], uv: [u, v] }
}

/// Two triangles covering `[-1, 1]^2` on the y = 0 plane, wound counter-clockwise seen from above
pub const GROUND_VERTICES: [GroundVertex; 6] = [
    vertex(-1.0, 1.0, 0.0, 1.0),
    vertex(1.0, 1.0, 1.0, 1.0),
    vertex(1.0, -1.0, 1.0, 0.0),
    vertex(-1.0, 1.0, 0.0, 1.0),
    vertex(1.0, -1.0, 1.0, 0.0),
    vertex(-1.0, -1.0, 0.0, 0.0),
];

impl GroundVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x2];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Vertex buffer holding [`GROUND_VERTICES`]
pub struct GroundMesh {
    buffer: wgpu::Buffer,
}

impl GroundMesh {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("ground_vertices"),
            size: std::mem::size_of_val(&GROUND_VERTICES) as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        queue.write_buffer(&buffer, 0, bytemuck::cast_slice(&GROUND_VERTICES));
        Self { buffer }
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn vertex_count(&self) -> u32 {
        GROUND_VERTICES.len() as u32
    }
}
