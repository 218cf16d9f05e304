//! GPU uniform buffers for a linked program

use std::num::NonZeroU64;

use super::reflect::UNIFORM_GROUP;
use super::ShaderProgram;

/// One uniform buffer per reflected block, bound together in group 0
pub struct UniformBuffers {
    buffers: Vec<wgpu::Buffer>,
    layout: wgpu::BindGroupLayout,
    bind_group: wgpu::BindGroup,
}

impl UniformBuffers {
    pub fn new(device: &wgpu::Device, program: &ShaderProgram) -> Self {
        let label = program.label();
        let visibility = wgpu::ShaderStages::VERTEX_FRAGMENT | wgpu::ShaderStages::COMPUTE;

        let buffers: Vec<wgpu::Buffer> = program
            .blocks()
            .iter()
            .enumerate()
            .map(|(i, block)| {
                device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(&format!("{label} uniforms {}", block.name)),
                    size: program.staging(i).len() as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                })
            })
            .collect();

        let layout_entries: Vec<wgpu::BindGroupLayoutEntry> = program
            .blocks()
            .iter()
            .map(|block| wgpu::BindGroupLayoutEntry {
                binding: block.binding,
                visibility,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(block.size as u64),
                },
                count: None,
            })
            .collect();

        let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some(&format!("{label} uniform layout (group {UNIFORM_GROUP})")),
            entries: &layout_entries,
        });

        let group_entries: Vec<wgpu::BindGroupEntry> = program
            .blocks()
            .iter()
            .zip(&buffers)
            .map(|(block, buffer)| wgpu::BindGroupEntry {
                binding: block.binding,
                resource: buffer.as_entire_binding(),
            })
            .collect();

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} uniform bind group")),
            layout: &layout,
            entries: &group_entries,
        });

        Self { buffers, layout, bind_group }
    }

    /// Buffer backing block `index` of the program
    pub fn buffer(&self, index: usize) -> Option<&wgpu::Buffer> {
        self.buffers.get(index)
    }

    pub fn layout(&self) -> &wgpu::BindGroupLayout {
        &self.layout
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}
