//! Shader stage kinds and per-stage compilation

use std::fmt;
use std::path::Path;

use naga::valid::{Capabilities, ModuleInfo, ValidationFlags, Validator};
use naga::ShaderStage;

use super::ShaderError;

/// Entry point every stage must export
pub const ENTRY_POINT: &str = "main";

/// Pipeline role of a shader source
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StageKind {
    Vertex,
    TessControl,
    TessEval,
    Fragment,
}

impl StageKind {
    pub const ALL: [StageKind; 4] = [Self::Vertex, Self::TessControl, Self::TessEval, Self::Fragment];

    /// File suffix used by the stage files in the shader directory
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Vertex => ".vert.wgsl",
            Self::TessControl => ".tesc.wgsl",
            Self::TessEval => ".tese.wgsl",
            Self::Fragment => ".frag.wgsl",
        }
    }

    /// Guess the stage kind from a file name suffix
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_str()?;
        Self::ALL.into_iter().find(|kind| name.ends_with(kind.suffix()))
    }

    /// The wgpu stage that runs this role's `main`
    ///
    /// Tessellated programs run the vertex role as a compute pass over patch
    /// vertices and draw the tess-eval role as the vertex shader.
    pub fn entry_stage(self, tessellated: bool) -> ShaderStage {
        match self {
            Self::Vertex if tessellated => ShaderStage::Compute,
            Self::Vertex => ShaderStage::Vertex,
            Self::TessControl => ShaderStage::Compute,
            Self::TessEval => ShaderStage::Vertex,
            Self::Fragment => ShaderStage::Fragment,
        }
    }

    pub fn is_tessellation(self) -> bool {
        matches!(self, Self::TessControl | Self::TessEval)
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Vertex => "vertex",
            Self::TessControl => "tessellation-control",
            Self::TessEval => "tessellation-evaluation",
            Self::Fragment => "fragment",
        })
    }
}

/// A parsed and validated stage
#[derive(Debug)]
pub struct CompiledStage {
    pub kind: StageKind,
    /// File path or label the source came from
    pub name: String,
    pub source: String,
    pub module: naga::Module,
    pub info: ModuleInfo,
}

impl CompiledStage {
    /// Parse and validate WGSL source for one stage
    pub fn compile(kind: StageKind, name: impl Into<String>, source: String) -> Result<Self, ShaderError> {
        let name = name.into();
        let module = naga::front::wgsl::parse_str(&source).map_err(|e| ShaderError::Compile {
            stage: kind,
            name: name.clone(),
            log: e.emit_to_string(&source),
        })?;
        let info = Validator::new(ValidationFlags::all(), Capabilities::all())
            .validate(&module)
            .map_err(|e| ShaderError::Compile {
                stage: kind,
                name: name.clone(),
                log: e.emit_to_string(&source),
            })?;
        Ok(Self { kind, name, source, module, info })
    }

    /// The `main` entry point, if present
    pub fn entry_point(&self) -> Option<&naga::EntryPoint> {
        self.module.entry_points.iter().find(|ep| ep.name == ENTRY_POINT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_roundtrip() {
        for kind in StageKind::ALL {
            let file = format!("grass{}", kind.suffix());
            assert_eq!(StageKind::from_path(Path::new(&file)), Some(kind));
        }
        assert_eq!(StageKind::from_path(Path::new("grass.wgsl")), None);
    }

    #[test]
    fn test_entry_stage_roles() {
        assert_eq!(StageKind::Vertex.entry_stage(false), ShaderStage::Vertex);
        assert_eq!(StageKind::Vertex.entry_stage(true), ShaderStage::Compute);
        assert_eq!(StageKind::TessControl.entry_stage(true), ShaderStage::Compute);
        assert_eq!(StageKind::TessEval.entry_stage(true), ShaderStage::Vertex);
        assert_eq!(StageKind::Fragment.entry_stage(true), ShaderStage::Fragment);
    }

    #[test]
    fn test_compile_valid_stage() {
        let stage = CompiledStage::compile(
            StageKind::Fragment,
            "inline",
            "@fragment fn main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }".to_string(),
        )
        .unwrap();
        assert_eq!(stage.entry_point().map(|ep| ep.stage), Some(ShaderStage::Fragment));
    }

    #[test]
    fn test_compile_error_names_stage() {
        let err = CompiledStage::compile(StageKind::TessEval, "broken.tese.wgsl", "fn main( {".to_string())
            .unwrap_err();
        match err {
            ShaderError::Compile { stage, name, log } => {
                assert_eq!(stage, StageKind::TessEval);
                assert_eq!(name, "broken.tese.wgsl");
                assert!(!log.is_empty());
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_validation_error_is_compile_error() {
        // Parses, but returns the wrong type
        let src = "@fragment fn main() -> @location(0) vec4<f32> { return 1.0; }".to_string();
        let err = CompiledStage::compile(StageKind::Fragment, "typed", src).unwrap_err();
        assert!(matches!(err, ShaderError::Compile { .. }));
    }
}
