//! Multi-stage shader programs with a typed uniform contract
//!
//! A [`ShaderBuilder`] queues one WGSL source per [`StageKind`]; `build()`
//! compiles each stage with naga, links them and hands back a
//! [`ShaderProgram`]. Uniforms are then set by member name and pushed to the
//! GPU with [`ShaderProgram::activate`].

pub mod builder;
pub mod reflect;
pub mod stage;
pub mod uniforms;

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::PathBuf;

use thiserror::Error;

use crate::core::types::{Mat4, Vec3, Vec4};

pub use builder::ShaderBuilder;
pub use reflect::{UniformBlock, UniformKind, UniformMember, UNIFORM_GROUP};
pub use stage::{CompiledStage, StageKind, ENTRY_POINT};
pub use uniforms::UniformBuffers;

/// Shader loading, compilation and link failures
#[derive(Debug, Error)]
pub enum ShaderError {
    #[error("failed to read {stage} shader {}: {source}", .path.display())]
    Io {
        stage: StageKind,
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("{stage} shader '{name}' failed to compile:\n{log}")]
    Compile {
        stage: StageKind,
        name: String,
        log: String,
    },

    #[error("shader program '{program}' failed to link:\n{log}")]
    Link { program: String, log: String },
}

/// Resolved position of a uniform inside the staging blocks
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UniformLocation {
    /// Index into [`ShaderProgram::blocks`]
    pub block: usize,
    pub offset: u32,
    pub kind: UniformKind,
}

/// A linked program: compiled stages plus CPU-side uniform staging
#[derive(Debug)]
pub struct ShaderProgram {
    label: String,
    stages: Vec<CompiledStage>,
    blocks: Vec<UniformBlock>,
    staging: Vec<Vec<u8>>,
    dirty: Vec<bool>,
    locations: HashMap<String, Option<UniformLocation>>,
}

/// Uniform buffer sizes are padded to this alignment
const UNIFORM_SIZE_ALIGN: u32 = 16;

impl ShaderProgram {
    pub(crate) fn new(label: String, stages: Vec<CompiledStage>, blocks: Vec<UniformBlock>) -> Self {
        let staging: Vec<Vec<u8>> = blocks
            .iter()
            .map(|b| vec![0u8; b.size.max(1).next_multiple_of(UNIFORM_SIZE_ALIGN) as usize])
            .collect();
        let dirty = vec![true; blocks.len()];
        Self { label, stages, blocks, staging, dirty, locations: HashMap::new() }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Uniform blocks sorted by binding
    pub fn blocks(&self) -> &[UniformBlock] {
        &self.blocks
    }

    pub fn stage(&self, kind: StageKind) -> Option<&CompiledStage> {
        self.stages.iter().find(|s| s.kind == kind)
    }

    pub fn is_tessellated(&self) -> bool {
        self.stage(StageKind::TessControl).is_some()
    }

    /// Current CPU-side bytes of a block
    pub fn staging(&self, block: usize) -> &[u8] {
        &self.staging[block]
    }

    /// Create the wgpu module for one stage
    pub fn create_module(&self, device: &wgpu::Device, kind: StageKind) -> Option<wgpu::ShaderModule> {
        let stage = self.stage(kind)?;
        let label = format!("{} {}", self.label, kind);
        Some(device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&label),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(&stage.source)),
        }))
    }

    /// Look up a uniform member by name, caching hits and misses
    pub fn uniform_location(&mut self, name: &str) -> Option<UniformLocation> {
        if let Some(cached) = self.locations.get(name) {
            return *cached;
        }
        let found = self.blocks.iter().enumerate().find_map(|(block, b)| {
            b.members
                .iter()
                .find(|m| m.name == name)
                .map(|m| UniformLocation { block, offset: m.offset, kind: m.kind })
        });
        self.locations.insert(name.to_string(), found);
        found
    }

    /// Number of names looked up so far, found or not
    pub fn cached_lookups(&self) -> usize {
        self.locations.len()
    }

    pub fn set_mat4(&mut self, name: &str, value: &Mat4) {
        self.write_uniform(name, &[UniformKind::Mat4], bytemuck::bytes_of(value));
    }

    pub fn set_int(&mut self, name: &str, value: i32) {
        self.write_uniform(name, &[UniformKind::Int, UniformKind::Uint], bytemuck::bytes_of(&value));
    }

    pub fn set_uint(&mut self, name: &str, value: u32) {
        self.write_uniform(name, &[UniformKind::Uint, UniformKind::Int], bytemuck::bytes_of(&value));
    }

    pub fn set_float(&mut self, name: &str, value: f32) {
        self.write_uniform(name, &[UniformKind::Float], bytemuck::bytes_of(&value));
    }

    pub fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.write_uniform(name, &[UniformKind::Vec3, UniformKind::Vec4], bytemuck::bytes_of(&value));
    }

    pub fn set_vec4(&mut self, name: &str, value: Vec4) {
        self.write_uniform(name, &[UniformKind::Vec4], bytemuck::bytes_of(&value));
    }

    fn write_uniform(&mut self, name: &str, accepts: &[UniformKind], bytes: &[u8]) {
        let Some(loc) = self.uniform_location(name) else {
            log::debug!("{}: no uniform named '{name}'", self.label);
            return;
        };
        if !accepts.contains(&loc.kind) {
            log::debug!("{}: uniform '{name}' is {:?}, not {:?}", self.label, loc.kind, accepts[0]);
            return;
        }
        let start = loc.offset as usize;
        let Some(dst) = self.staging[loc.block].get_mut(start..start + bytes.len()) else {
            return;
        };
        dst.copy_from_slice(bytes);
        self.dirty[loc.block] = true;
    }

    /// Push pending uniform writes to the program's GPU buffers
    pub fn activate(&mut self, queue: &wgpu::Queue, buffers: &UniformBuffers) {
        for (i, dirty) in self.dirty.iter_mut().enumerate() {
            if !*dirty {
                continue;
            }
            if let Some(buffer) = buffers.buffer(i) {
                queue.write_buffer(buffer, 0, &self.staging[i]);
                *dirty = false;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROGRAM_VS: &str = r#"
        struct Transforms { model: mat4x4<f32>, view: mat4x4<f32>, proj: mat4x4<f32> }
        @group(0) @binding(0) var<uniform> transforms: Transforms;
        @vertex fn main(@location(0) pos: vec3<f32>) -> @builtin(position) vec4<f32> {
            return transforms.proj * transforms.view * transforms.model * vec4<f32>(pos, 1.0);
        }
    "#;

    const PROGRAM_FS: &str = r#"
        struct Look { tint: vec3<f32>, gain: f32, levels: u32, offset: i32 }
        @group(0) @binding(1) var<uniform> look: Look;
        @fragment fn main() -> @location(0) vec4<f32> {
            return vec4<f32>(look.tint * look.gain, f32(look.levels) + f32(look.offset));
        }
    "#;

    fn program() -> ShaderProgram {
        ShaderBuilder::new("test")
            .source("test.vert", PROGRAM_VS, StageKind::Vertex)
            .source("test.frag", PROGRAM_FS, StageKind::Fragment)
            .build()
            .unwrap()
    }

    fn f32_at(bytes: &[u8], offset: usize) -> f32 {
        f32::from_ne_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    #[test]
    fn test_staging_blocks_are_padded() {
        let program = program();
        assert_eq!(program.blocks().len(), 2);
        assert_eq!(program.staging(0).len(), 192);
        // tint(12) + gain(4) + levels(4) + offset(4) = 24, padded to 32
        assert_eq!(program.staging(1).len(), 32);
    }

    #[test]
    fn test_set_mat4_writes_column_major() {
        let mut program = program();
        let view = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        program.set_mat4("view", &view);
        let bytes = program.staging(0);
        // view starts at 64; translation is column 3
        assert_eq!(f32_at(bytes, 64 + 48), 1.0);
        assert_eq!(f32_at(bytes, 64 + 52), 2.0);
        assert_eq!(f32_at(bytes, 64 + 56), 3.0);
        assert_eq!(f32_at(bytes, 0), 0.0);
    }

    #[test]
    fn test_scalar_and_vector_setters() {
        let mut program = program();
        program.set_vec3("tint", Vec3::new(0.5, 0.25, 0.125));
        program.set_float("gain", 2.0);
        program.set_int("levels", 7);
        program.set_int("offset", -3);
        let bytes = program.staging(1);
        assert_eq!(f32_at(bytes, 4), 0.25);
        assert_eq!(f32_at(bytes, 12), 2.0);
        assert_eq!(u32::from_ne_bytes(bytes[16..20].try_into().unwrap()), 7);
        assert_eq!(i32::from_ne_bytes(bytes[20..24].try_into().unwrap()), -3);
    }

    #[test]
    fn test_unknown_name_is_cached_miss() {
        let mut program = program();
        program.set_float("does_not_exist", 1.0);
        program.set_float("does_not_exist", 2.0);
        assert_eq!(program.uniform_location("does_not_exist"), None);
        assert_eq!(program.cached_lookups(), 1);
        assert!(program.staging(1).iter().all(|&b| b == 0));
    }

    #[test]
    fn test_type_mismatch_writes_nothing() {
        let mut program = program();
        program.set_float("model", 4.0);
        program.set_mat4("gain", &Mat4::IDENTITY);
        program.set_vec4("tint", Vec4::ONE);
        assert!(program.staging(0).iter().all(|&b| b == 0));
        assert!(program.staging(1).iter().all(|&b| b == 0));
    }

    #[test]
    fn test_location_lookup() {
        let mut program = program();
        let loc = program.uniform_location("proj").unwrap();
        assert_eq!(loc, UniformLocation { block: 0, offset: 128, kind: UniformKind::Mat4 });
        let loc = program.uniform_location("levels").unwrap();
        assert_eq!((loc.block, loc.offset, loc.kind), (1, 16, UniformKind::Uint));
    }
}
