//! Stage queueing and the link step

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use super::reflect::{self, UniformBlock, UNIFORM_GROUP};
use super::stage::{CompiledStage, StageKind, ENTRY_POINT};
use super::{ShaderError, ShaderProgram};

enum StageSource {
    File(PathBuf),
    Inline { name: String, text: String },
}

/// Collects stage sources and links them into a [`ShaderProgram`]
///
/// Consumed by [`ShaderBuilder::build`], so stages cannot be added to a
/// program after it is linked.
#[must_use]
pub struct ShaderBuilder {
    label: String,
    queued: Vec<(StageKind, StageSource)>,
}

impl ShaderBuilder {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into(), queued: Vec::new() }
    }

    /// Queue a stage file, read when the program is built
    pub fn load(mut self, path: impl Into<PathBuf>, kind: StageKind) -> Self {
        self.queued.push((kind, StageSource::File(path.into())));
        self
    }

    /// Queue in-memory stage source
    pub fn source(mut self, name: impl Into<String>, text: impl Into<String>, kind: StageKind) -> Self {
        self.queued.push((kind, StageSource::Inline { name: name.into(), text: text.into() }));
        self
    }

    /// Compile every queued stage, then link
    pub fn build(self) -> Result<ShaderProgram, ShaderError> {
        let mut stages = Vec::with_capacity(self.queued.len());
        for (kind, source) in self.queued {
            let (name, text) = match source {
                StageSource::File(path) => {
                    let text = std::fs::read_to_string(&path).map_err(|source| ShaderError::Io {
                        stage: kind,
                        path: path.clone(),
                        source,
                    })?;
                    (path.display().to_string(), text)
                }
                StageSource::Inline { name, text } => (name, text),
            };
            stages.push(CompiledStage::compile(kind, name, text)?);
        }
        link(self.label, stages)
    }
}

fn link(label: String, stages: Vec<CompiledStage>) -> Result<ShaderProgram, ShaderError> {
    let mut log = Vec::new();
    let count = |kind: StageKind| stages.iter().filter(|s| s.kind == kind).count();

    for kind in [StageKind::Vertex, StageKind::Fragment] {
        if count(kind) == 0 {
            log.push(format!("missing {kind} stage"));
        }
    }
    for kind in StageKind::ALL {
        let n = count(kind);
        if n > 1 {
            log.push(format!("{kind} stage queued {n} times"));
        }
    }
    let (has_control, has_eval) = (count(StageKind::TessControl) > 0, count(StageKind::TessEval) > 0);
    if has_control != has_eval {
        log.push("tessellation-control and tessellation-evaluation stages must be used together".to_string());
    }
    let tessellated = has_control || has_eval;

    for stage in &stages {
        let expected = stage.kind.entry_stage(tessellated);
        match stage.entry_point() {
            None => log.push(format!("{} stage '{}' has no entry point `{ENTRY_POINT}`", stage.kind, stage.name)),
            Some(ep) if ep.stage != expected => log.push(format!(
                "{} stage '{}': `{ENTRY_POINT}` is a {:?} entry point, expected {:?}",
                stage.kind, stage.name, ep.stage, expected
            )),
            Some(_) => {}
        }
    }

    let blocks = link_uniforms(&stages, &mut log);
    link_interface(&stages, tessellated, &mut log);

    if !log.is_empty() {
        return Err(ShaderError::Link { program: label, log: log.join("\n") });
    }

    log::info!(
        "Linked shader program '{label}': {} stages, {} uniform blocks",
        stages.len(),
        blocks.len()
    );
    Ok(ShaderProgram::new(label, stages, blocks))
}

/// Merge per-stage uniform blocks by binding, logging conflicts
fn link_uniforms(stages: &[CompiledStage], log: &mut Vec<String>) -> Vec<UniformBlock> {
    let mut merged: BTreeMap<u32, (UniformBlock, StageKind)> = BTreeMap::new();
    for stage in stages {
        for block in reflect::uniform_blocks(stage) {
            if block.group != UNIFORM_GROUP {
                log.push(format!(
                    "{} stage: uniform '{}' is in group {}, uniforms must be in group {UNIFORM_GROUP}",
                    stage.kind, block.name, block.group
                ));
                continue;
            }
            match merged.get(&block.binding) {
                Some((existing, owner)) if !existing.same_shape(&block) => log.push(format!(
                    "uniform binding {} declared as '{}' by the {owner} stage and differently as '{}' by the {} stage",
                    block.binding, existing.name, block.name, stage.kind
                )),
                Some(_) => {}
                None => {
                    merged.insert(block.binding, (block, stage.kind));
                }
            }
        }
    }

    let mut owners: HashMap<&str, u32> = HashMap::new();
    for (binding, (block, _)) in &merged {
        for member in &block.members {
            if let Some(other) = owners.insert(member.name.as_str(), *binding) {
                log.push(format!(
                    "uniform name '{}' is declared by bindings {other} and {binding}",
                    member.name
                ));
            }
        }
    }

    merged.into_values().map(|(block, _)| block).collect()
}

/// Every fragment input must be written by the rasterised stage
fn link_interface(stages: &[CompiledStage], tessellated: bool, log: &mut Vec<String>) {
    let rasterised = if tessellated { StageKind::TessEval } else { StageKind::Vertex };
    let find = |kind| stages.iter().find(|s| s.kind == kind);
    let (Some(producer), Some(fragment)) = (find(rasterised), find(StageKind::Fragment)) else {
        return;
    };
    let written = reflect::output_locations(producer);
    for location in reflect::input_locations(fragment).difference(&written) {
        log.push(format!(
            "fragment input @location({location}) is not written by the {rasterised} stage"
        ));
    }
}
