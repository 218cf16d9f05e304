//! GPU storage for blades and the tessellation intermediates

use bytemuck::{Pod, Zeroable};

use crate::grass::blade::Blade;
use crate::grass::tessellation::PATCH_VERTICES;

/// Tess-control output for one blade (must match `ControlPoint` in the grass shaders)
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct ControlPoint {
    /// Blade vectors, unchanged (64 bytes, offset 0)
    pub blade: Blade,
    /// Chosen subdivision level (4 bytes, offset 64)
    pub level: u32,
    /// Padding to 80 bytes
    pub _pad: [u32; 3],
}

/// Immutable blade records plus the patch and control-point buffers derived from them
pub struct BladeBuffers {
    blades: wgpu::Buffer,
    patches: wgpu::Buffer,
    control: wgpu::Buffer,
    blade_count: u32,
}

impl BladeBuffers {
    /// Upload blades once; an empty slice still allocates one record per buffer
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, blades: &[Blade]) -> Self {
        let records = blades.len().max(1) as u64;
        let storage = |label: &str, size: u64, usage: wgpu::BufferUsages| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size,
                usage: wgpu::BufferUsages::STORAGE | usage,
                mapped_at_creation: false,
            })
        };

        let blade_buffer = storage("grass_blades", records * Blade::SIZE, wgpu::BufferUsages::COPY_DST);
        if !blades.is_empty() {
            queue.write_buffer(&blade_buffer, 0, bytemuck::cast_slice(blades));
        }
        let patches = storage(
            "grass_patches",
            records * PATCH_VERTICES as u64 * Blade::SIZE,
            wgpu::BufferUsages::empty(),
        );
        let control = storage(
            "grass_control_points",
            records * std::mem::size_of::<ControlPoint>() as u64,
            wgpu::BufferUsages::empty(),
        );

        log::info!("Uploaded {} grass blades ({} KB)", blades.len(), blades.len() as u64 * Blade::SIZE / 1024);

        Self {
            blades: blade_buffer,
            patches,
            control,
            blade_count: blades.len() as u32,
        }
    }

    pub fn blades(&self) -> &wgpu::Buffer {
        &self.blades
    }

    pub fn patches(&self) -> &wgpu::Buffer {
        &self.patches
    }

    pub fn control(&self) -> &wgpu::Buffer {
        &self.control
    }

    pub fn blade_count(&self) -> u32 {
        self.blade_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_point_layout() {
        assert_eq!(std::mem::size_of::<ControlPoint>(), 80);
        let cp = ControlPoint { blade: Blade::reference(), level: 9, _pad: [0; 3] };
        let bytes = bytemuck::bytes_of(&cp);
        assert_eq!(&bytes[64..68], &9u32.to_ne_bytes());
    }
}
