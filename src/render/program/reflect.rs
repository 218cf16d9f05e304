//! Uniform and interface reflection over naga modules

use std::collections::BTreeSet;

use naga::{AddressSpace, Binding, Scalar, TypeInner, VectorSize};

use super::stage::CompiledStage;

/// Bind group that holds every uniform block
pub const UNIFORM_GROUP: u32 = 0;

/// Shape of a uniform value as seen by the setters
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UniformKind {
    Float,
    Int,
    Uint,
    Vec2,
    Vec3,
    Vec4,
    Mat4,
    /// Anything the setters cannot write (arrays, nested structs, ...)
    Opaque,
}

impl UniformKind {
    fn from_type(inner: &TypeInner) -> Self {
        match *inner {
            TypeInner::Scalar(s) if s == Scalar::F32 => Self::Float,
            TypeInner::Scalar(s) if s == Scalar::I32 => Self::Int,
            TypeInner::Scalar(s) if s == Scalar::U32 => Self::Uint,
            TypeInner::Vector { size, scalar } if scalar == Scalar::F32 => match size {
                VectorSize::Bi => Self::Vec2,
                VectorSize::Tri => Self::Vec3,
                VectorSize::Quad => Self::Vec4,
            },
            TypeInner::Matrix { columns: VectorSize::Quad, rows: VectorSize::Quad, scalar }
                if scalar == Scalar::F32 =>
            {
                Self::Mat4
            }
            _ => Self::Opaque,
        }
    }
}

/// A named value inside a uniform block
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UniformMember {
    pub name: String,
    pub offset: u32,
    pub kind: UniformKind,
}

/// One `var<uniform>` as declared by a stage
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UniformBlock {
    /// Variable name in the declaring stage
    pub name: String,
    pub group: u32,
    pub binding: u32,
    /// Byte size of the block type
    pub size: u32,
    pub members: Vec<UniformMember>,
}

impl UniformBlock {
    /// Same size and members, regardless of variable name
    pub fn same_shape(&self, other: &Self) -> bool {
        self.size == other.size && self.members == other.members
    }
}

/// Collect every uniform block a stage declares
pub fn uniform_blocks(stage: &CompiledStage) -> Vec<UniformBlock> {
    let module = &stage.module;
    let ctx = module.to_ctx();
    module
        .global_variables
        .iter()
        .filter(|(_, var)| var.space == AddressSpace::Uniform)
        .filter_map(|(_, var)| {
            let binding = var.binding.as_ref()?;
            let name = var.name.clone().unwrap_or_default();
            let ty = &module.types[var.ty];
            let size = ty.inner.size(ctx);
            let members = match &ty.inner {
                TypeInner::Struct { members, .. } => members
                    .iter()
                    .map(|m| UniformMember {
                        name: m.name.clone().unwrap_or_default(),
                        offset: m.offset,
                        kind: UniformKind::from_type(&module.types[m.ty].inner),
                    })
                    .collect(),
                // A bare `var<uniform> x: T` is addressed by its variable name
                inner => vec![UniformMember {
                    name: name.clone(),
                    offset: 0,
                    kind: UniformKind::from_type(inner),
                }],
            };
            Some(UniformBlock { name, group: binding.group, binding: binding.binding, size, members })
        })
        .collect()
}

/// `@location`s the stage's `main` reads
pub fn input_locations(stage: &CompiledStage) -> BTreeSet<u32> {
    let mut locations = BTreeSet::new();
    if let Some(ep) = stage.entry_point() {
        for arg in &ep.function.arguments {
            collect_locations(&stage.module, arg.binding.as_ref(), arg.ty, &mut locations);
        }
    }
    locations
}

/// `@location`s the stage's `main` writes
pub fn output_locations(stage: &CompiledStage) -> BTreeSet<u32> {
    let mut locations = BTreeSet::new();
    if let Some(result) = stage.entry_point().and_then(|ep| ep.function.result.as_ref()) {
        collect_locations(&stage.module, result.binding.as_ref(), result.ty, &mut locations);
    }
    locations
}

fn collect_locations(
    module: &naga::Module,
    binding: Option<&Binding>,
    ty: naga::Handle<naga::Type>,
    out: &mut BTreeSet<u32>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => {
            out.insert(*location);
        }
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_locations(module, member.binding.as_ref(), member.ty, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::program::stage::StageKind;

    fn compile(kind: StageKind, src: &str) -> CompiledStage {
        CompiledStage::compile(kind, "test", src.to_string()).unwrap()
    }

    #[test]
    fn test_struct_offsets_follow_wgsl_layout() {
        let stage = compile(
            StageKind::Fragment,
            r#"
            struct Params {
                tint: vec3<f32>,
                strength: f32,
                model: mat4x4<f32>,
                count: u32,
                bias: i32,
                uv: vec2<f32>,
            }
            @group(0) @binding(3) var<uniform> params: Params;
            @fragment fn main() -> @location(0) vec4<f32> {
                return vec4<f32>(params.tint * params.strength, f32(params.count));
            }
            "#,
        );
        let blocks = uniform_blocks(&stage);
        assert_eq!(blocks.len(), 1);
        let block = &blocks[0];
        assert_eq!((block.group, block.binding), (0, 3));
        let layout: Vec<_> = block.members.iter().map(|m| (m.name.as_str(), m.offset, m.kind)).collect();
        assert_eq!(
            layout,
            vec![
                ("tint", 0, UniformKind::Vec3),
                ("strength", 12, UniformKind::Float),
                ("model", 16, UniformKind::Mat4),
                ("count", 80, UniformKind::Uint),
                ("bias", 84, UniformKind::Int),
                ("uv", 88, UniformKind::Vec2),
            ]
        );
        assert_eq!(block.size, 96);
    }

    #[test]
    fn test_bare_uniform_uses_variable_name() {
        let stage = compile(
            StageKind::Fragment,
            r#"
            @group(0) @binding(0) var<uniform> exposure: f32;
            @fragment fn main() -> @location(0) vec4<f32> { return vec4<f32>(exposure); }
            "#,
        );
        let blocks = uniform_blocks(&stage);
        assert_eq!(blocks[0].members, vec![UniformMember { name: "exposure".into(), offset: 0, kind: UniformKind::Float }]);
    }

    #[test]
    fn test_storage_buffers_are_not_uniforms() {
        let stage = compile(
            StageKind::TessControl,
            r#"
            @group(1) @binding(0) var<storage, read_write> data: array<vec4<f32>>;
            @compute @workgroup_size(64) fn main(@builtin(global_invocation_id) id: vec3<u32>) {
                data[id.x] = vec4<f32>(1.0);
            }
            "#,
        );
        assert!(uniform_blocks(&stage).is_empty());
    }

    #[test]
    fn test_interface_locations() {
        let vs = compile(
            StageKind::Vertex,
            r#"
            struct Out {
                @builtin(position) clip: vec4<f32>,
                @location(0) uv: vec2<f32>,
                @location(2) shade: f32,
            }
            @vertex fn main(@location(0) pos: vec3<f32>, @location(1) uv: vec2<f32>) -> Out {
                var out: Out;
                out.clip = vec4<f32>(pos, 1.0);
                out.uv = uv;
                out.shade = 1.0;
                return out;
            }
            "#,
        );
        assert_eq!(input_locations(&vs), BTreeSet::from([0, 1]));
        assert_eq!(output_locations(&vs), BTreeSet::from([0, 2]));
    }
}
