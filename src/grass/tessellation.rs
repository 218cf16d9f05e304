//! Tessellation level policy and draw-call shape
//!
//! The GPU stages in `shaders/grass.*.wgsl` implement the same rules; this
//! module is their host-side counterpart used for dispatch sizing, tests and
//! benchmarks.

use crate::core::types::{Mat4, Vec2, Vec3};
use crate::grass::blade::Blade;
use crate::grass::config::TessellationMode;
use crate::grass::curve::{safe_normalize, BladeCurve, SurfacePoint, EPSILON};

/// Highest subdivision level along a blade
pub const MAX_TESS_LEVEL: u32 = 16;

/// Control points per patch; all reference the same blade
pub const PATCH_VERTICES: u32 = 3;

/// Vertices drawn per blade instance (two triangles per segment)
pub const VERTICES_PER_BLADE: u32 = 6 * MAX_TESS_LEVEL;

/// Invocations per compute workgroup in the patch and control stages
pub const WORKGROUP_SIZE: u32 = 64;

/// `(u, dv)` for the six vertices of one segment quad
pub const CORNER_OFFSETS: [(f32, f32); 6] = [
    (0.0, 0.0),
    (1.0, 0.0),
    (0.0, 1.0),
    (0.0, 1.0),
    (1.0, 0.0),
    (1.0, 1.0),
];

/// Subdivision level for one blade
///
/// `mvp` is `proj * view * model`; `viewport` is the framebuffer size in pixels.
pub fn tessellation_level(mode: &TessellationMode, blade: &Blade, mvp: Mat4, viewport: Vec2) -> u32 {
    match *mode {
        TessellationMode::Fixed { level } => level.clamp(1, MAX_TESS_LEVEL),
        TessellationMode::ScreenSpace { min_level, max_level, pixels_per_segment } => {
            let lo = min_level.clamp(1, MAX_TESS_LEVEL);
            let hi = max_level.clamp(lo, MAX_TESS_LEVEL);

            let base = blade.base();
            let tip = base + safe_normalize(blade.up_dir(), Vec3::Y) * blade.height();
            let clip_base = mvp * base.extend(1.0);
            let clip_tip = mvp * tip.extend(1.0);
            if clip_base.w <= EPSILON || clip_tip.w <= EPSILON {
                return lo;
            }

            let ndc_base = clip_base.truncate().truncate() / clip_base.w;
            let ndc_tip = clip_tip.truncate().truncate() / clip_tip.w;
            let pixels = ((ndc_tip - ndc_base) * 0.5 * viewport).length();
            let segments = (pixels / pixels_per_segment.max(EPSILON)).ceil();
            if !segments.is_finite() {
                return lo;
            }
            (segments as u32).clamp(lo, hi)
        }
    }
}

/// Tess-eval output for one drawn vertex, `None` when the segment is collapsed
pub fn eval_vertex(curve: &BladeCurve, level: u32, vertex_index: u32) -> Option<SurfacePoint> {
    let level = level.clamp(1, MAX_TESS_LEVEL);
    let segment = vertex_index / 6;
    if segment >= level {
        return None;
    }
    let (u, dv) = CORNER_OFFSETS[(vertex_index % 6) as usize];
    let v = (segment as f32 + dv) / level as f32;
    Some(curve.sample(u, v))
}

/// Triangle list for one blade at `level` (6 vertices per segment)
pub fn tessellate(blade: &Blade, level: u32) -> Vec<SurfacePoint> {
    let curve = BladeCurve::new(blade);
    (0..VERTICES_PER_BLADE)
        .map_while(|i| eval_vertex(&curve, level, i))
        .collect()
}

/// Dispatch and draw sizes for a blade count
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DrawCall {
    /// Vertices per instance of the tess-eval draw
    pub vertex_count: u32,
    /// One instance per blade
    pub instance_count: u32,
    /// Workgroups for the patch-vertex stage (`blade_count * PATCH_VERTICES` invocations)
    pub patch_workgroups: u32,
    /// Workgroups for the tess-control stage (one invocation per blade)
    pub control_workgroups: u32,
}

impl DrawCall {
    pub fn for_blade_count(blade_count: u32) -> Self {
        if blade_count == 0 {
            return Self { vertex_count: 0, instance_count: 0, patch_workgroups: 0, control_workgroups: 0 };
        }
        Self {
            vertex_count: VERTICES_PER_BLADE,
            instance_count: blade_count,
            patch_workgroups: (blade_count * PATCH_VERTICES).div_ceil(WORKGROUP_SIZE),
            control_workgroups: blade_count.div_ceil(WORKGROUP_SIZE),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.instance_count == 0
    }
}
