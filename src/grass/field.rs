//! Procedural blade field
//!
//! Blades sit on a jittered grid over `[-extent, extent]^2`. A low-frequency
//! fBm term groups tall blades into clumps; per-blade hashes add jitter to
//! height, width and facing.

use std::f32::consts::TAU;

use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use crate::core::types::Vec3;
use crate::grass::blade::Blade;
use crate::grass::config::FieldConfig;

/// Share of blade height driven by the clump noise; the rest is per-blade jitter
const CLUMP_WEIGHT: f32 = 0.6;

/// Hash channels so each per-blade attribute draws an independent value
const CHANNEL_JITTER_X: u32 = 0;
const CHANNEL_JITTER_Z: u32 = 1;
const CHANNEL_HEIGHT: u32 = 2;
const CHANNEL_WIDTH: u32 = 3;
const CHANNEL_FACING: u32 = 4;

pub struct FieldGenerator {
    config: FieldConfig,
    clump: Fbm<Perlin>,
}

impl FieldGenerator {
    pub fn new(config: FieldConfig) -> Self {
        let clump = Fbm::<Perlin>::new(config.seed)
            .set_octaves(3)
            .set_persistence(0.5)
            .set_lacunarity(2.0);
        Self { config, clump }
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    /// Generate exactly `count` blades
    pub fn generate(&self) -> Vec<Blade> {
        let count = self.config.count;
        if count == 0 {
            return Vec::new();
        }
        let cols = (count as f32).sqrt().ceil().max(1.0) as u32;
        let rows = count.div_ceil(cols);
        let extent = self.config.extent;
        let cell_x = 2.0 * extent / cols as f32;
        let cell_z = 2.0 * extent / rows as f32;

        (0..count)
            .map(|i| {
                let (ix, iz) = ((i % cols) as i32, (i / cols) as i32);
                let jx = self.hash(ix, iz, CHANNEL_JITTER_X);
                let jz = self.hash(ix, iz, CHANNEL_JITTER_Z);
                let x = -extent + (ix as f32 + jx) * cell_x;
                let z = -extent + (iz as f32 + jz) * cell_z;
                self.blade_at(x, z, ix, iz)
            })
            .collect()
    }

    fn blade_at(&self, x: f32, z: f32, ix: i32, iz: i32) -> Blade {
        let cfg = &self.config;
        let clump = self.clump_at(x, z);
        let height_t = CLUMP_WEIGHT * clump + (1.0 - CLUMP_WEIGHT) * self.hash(ix, iz, CHANNEL_HEIGHT);
        let height = lerp(cfg.height_min, cfg.height_max, height_t);
        let width = lerp(cfg.width_min, cfg.width_max, self.hash(ix, iz, CHANNEL_WIDTH));

        let angle = self.hash(ix, iz, CHANNEL_FACING) * TAU;
        let facing = Vec3::new(angle.cos(), 0.0, angle.sin());

        let base = Vec3::new(x, 0.0, z);
        let guide = base + Vec3::Y * height;
        let tip = guide + facing * (cfg.bend * height) - Vec3::Y * (0.25 * cfg.bend * height);
        Blade::new(base, guide, tip, Vec3::Y, height, width, cfg.stiffness)
    }

    /// Clump factor in [0, 1]
    fn clump_at(&self, x: f32, z: f32) -> f32 {
        let s = self.config.clump_scale as f64;
        let n = self.clump.get([x as f64 * s, z as f64 * s]) as f32;
        ((n + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    fn hash(&self, ix: i32, iz: i32, channel: u32) -> f32 {
        hash_2d(ix, iz, self.config.seed.wrapping_mul(31).wrapping_add(channel))
    }
}

/// Integer hash of a grid cell, mapped to [0, 1]
fn hash_2d(ix: i32, iz: i32, seed: u32) -> f32 {
    let mut h = (ix as u32).wrapping_mul(374761393)
        .wrapping_add((iz as u32).wrapping_mul(668265263))
        .wrapping_add(seed.wrapping_mul(1274126177));
    h = (h ^ (h >> 13)).wrapping_mul(1103515245);
    h = h ^ (h >> 16);
    (h & 0x7FFFFFFF) as f32 / 0x7FFFFFFF_u32 as f32
}

/// Interpolate inside `[a, b]`, clamped against rounding past `b`
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    (a + (b - a) * t).clamp(a.min(b), a.max(b))
}
