//! Packed per-blade record shared with the GPU

use std::path::Path;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::core::error::Error;
use crate::core::types::{Result, Vec3};

/// One grass blade as four packed vec4s (64 bytes)
///
/// The w lanes carry scalars, not homogeneous weights:
/// `v0.w` is always 1, `v1.w` is the height, `v2.w` the width and
/// `up.w` the stiffness.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable, Serialize, Deserialize)]
pub struct Blade {
    /// Base position
    pub v0: [f32; 4],
    /// Bezier guide point, w = height
    pub v1: [f32; 4],
    /// Tip control point, w = width
    pub v2: [f32; 4],
    /// Local up direction, w = stiffness
    pub up: [f32; 4],
}

impl Blade {
    /// Size of one record in GPU storage
    pub const SIZE: u64 = std::mem::size_of::<Self>() as u64;

    pub fn new(base: Vec3, guide: Vec3, tip: Vec3, up: Vec3, height: f32, width: f32, stiffness: f32) -> Self {
        Self {
            v0: base.extend(1.0).to_array(),
            v1: guide.extend(height).to_array(),
            v2: tip.extend(width).to_array(),
            up: up.extend(stiffness).to_array(),
        }
    }

    /// The single blade the renderer shows with no other source configured
    pub fn reference() -> Self {
        Self {
            v0: [0.0, 0.0, 0.0, 1.0],
            v1: [0.0, 0.1, 0.0, 0.1],
            v2: [-0.1, 0.1, 0.0, 0.01],
            up: [0.0, 1.0, 0.0, 1.0],
        }
    }

    pub fn base(&self) -> Vec3 {
        Vec3::from_slice(&self.v0[..3])
    }

    pub fn guide(&self) -> Vec3 {
        Vec3::from_slice(&self.v1[..3])
    }

    pub fn tip(&self) -> Vec3 {
        Vec3::from_slice(&self.v2[..3])
    }

    pub fn up_dir(&self) -> Vec3 {
        Vec3::from_slice(&self.up[..3])
    }

    pub fn height(&self) -> f32 {
        self.v1[3]
    }

    pub fn width(&self) -> f32 {
        self.v2[3]
    }

    pub fn stiffness(&self) -> f32 {
        self.up[3]
    }

    /// Check the record invariants: finite lanes and `v0.w == 1`
    pub fn validate(&self) -> std::result::Result<(), String> {
        let lanes = self.v0.iter().chain(&self.v1).chain(&self.v2).chain(&self.up);
        if lanes.clone().any(|v| !v.is_finite()) {
            return Err("non-finite component".to_string());
        }
        if self.v0[3] != 1.0 {
            return Err(format!("v0.w must be 1, got {}", self.v0[3]));
        }
        Ok(())
    }
}

/// Read a JSON array of blades, rejecting records that break the invariants
pub fn load_blades(path: &Path) -> Result<Vec<Blade>> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| Error::Blade(format!("{}: {e}", path.display())))?;
    let blades: Vec<Blade> = serde_json::from_str(&json)
        .map_err(|e| Error::Blade(format!("{}: {e}", path.display())))?;
    for (i, blade) in blades.iter().enumerate() {
        blade
            .validate()
            .map_err(|reason| Error::Blade(format!("{} blade {i}: {reason}", path.display())))?;
    }
    Ok(blades)
}

/// Write blades as a JSON array
pub fn save_blades(path: &Path, blades: &[Blade]) -> Result<()> {
    let json = serde_json::to_string_pretty(blades).map_err(|e| Error::Blade(e.to_string()))?;
    std::fs::write(path, json)?;
    Ok(())
}
