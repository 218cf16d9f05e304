//! CPU evaluation of the blade surface
//!
//! Mirrors `shaders/grass.tese.wgsl` so the surface math can be tested and
//! benchmarked without a GPU. Rendering never goes through this path.

use crate::core::types::Vec3;
use crate::grass::blade::Blade;

/// Lengths at or below this are treated as degenerate
pub const EPSILON: f32 = 1e-6;

/// Normalize `v`, or return `fallback` when `v` is (nearly) zero
pub fn safe_normalize(v: Vec3, fallback: Vec3) -> Vec3 {
    let len = v.length();
    if len > EPSILON { v / len } else { fallback }
}

/// A sampled point on a blade surface (model space)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfacePoint {
    pub position: Vec3,
    pub normal: Vec3,
}

/// Quadratic Bezier blade with a tapering ribbon cross-section
#[derive(Clone, Copy, Debug)]
pub struct BladeCurve {
    v0: Vec3,
    v1: Vec3,
    v2: Vec3,
    up: Vec3,
    side: Vec3,
    width: f32,
}

impl BladeCurve {
    pub fn new(blade: &Blade) -> Self {
        let (v0, v1, v2) = (blade.base(), blade.guide(), blade.tip());
        let up = safe_normalize(blade.up_dir(), Vec3::Y);

        // Facing is the part of the lean orthogonal to up
        let lean = v2 - v0;
        let facing = safe_normalize(lean - up * lean.dot(up), Vec3::X);
        let side = safe_normalize(up.cross(facing), Vec3::Z);

        Self { v0, v1, v2, up, side, width: blade.width() }
    }

    /// Centerline point and its de Casteljau intermediates at height `v`
    fn casteljau(&self, v: f32) -> (Vec3, Vec3, Vec3) {
        let a = self.v0.lerp(self.v1, v);
        let b = self.v1.lerp(self.v2, v);
        (a, b, a.lerp(b, v))
    }

    /// Centerline position at height fraction `v`
    pub fn center(&self, v: f32) -> Vec3 {
        self.casteljau(v).2
    }

    /// Width-axis direction of the blade
    pub fn side(&self) -> Vec3 {
        self.side
    }

    /// Surface point at across-blade `u` and along-blade `v`, both in [0, 1]
    pub fn sample(&self, u: f32, v: f32) -> SurfacePoint {
        let (a, b, c) = self.casteljau(v);
        let tangent = safe_normalize(b - a, self.up);
        let position = c + self.side * (u - 0.5) * self.width * (1.0 - v);
        let normal = safe_normalize(self.side.cross(tangent), self.up);
        SurfacePoint { position, normal }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < EPS
    }

    #[test]
    fn test_endpoints_interpolate_control_points() {
        let blade = Blade::reference();
        let curve = BladeCurve::new(&blade);
        assert!(approx(curve.center(0.0), blade.base()));
        assert!(approx(curve.center(1.0), blade.tip()));
        // Tip collapses to the centerline regardless of u
        assert!(approx(curve.sample(0.0, 1.0).position, blade.tip()));
        assert!(approx(curve.sample(1.0, 1.0).position, blade.tip()));
    }

    #[test]
    fn test_base_width_matches_blade_width() {
        let blade = Blade::reference();
        let curve = BladeCurve::new(&blade);
        let left = curve.sample(0.0, 0.0).position;
        let right = curve.sample(1.0, 0.0).position;
        assert!(((right - left).length() - blade.width()).abs() < EPS);
        assert!(approx((left + right) * 0.5, blade.base()));
    }

    #[test]
    fn test_width_tapers_linearly() {
        let blade = Blade::reference();
        let curve = BladeCurve::new(&blade);
        for v in [0.0, 0.25, 0.5, 0.9] {
            let span = (curve.sample(1.0, v).position - curve.sample(0.0, v).position).length();
            assert!((span - blade.width() * (1.0 - v)).abs() < EPS, "v = {v}");
        }
    }

    #[test]
    fn test_normals_are_unit_and_orthogonal_to_side() {
        let blade = Blade::reference();
        let curve = BladeCurve::new(&blade);
        for i in 0..=8 {
            let v = i as f32 / 8.0;
            let p = curve.sample(0.3, v);
            assert!((p.normal.length() - 1.0).abs() < EPS);
            assert!(p.normal.dot(curve.side()).abs() < EPS);
        }
    }

    #[test]
    fn test_degenerate_blade_is_finite() {
        let blade = Blade {
            v0: [1.0, 2.0, 3.0, 1.0],
            v1: [1.0, 2.0, 3.0, 0.0],
            v2: [1.0, 2.0, 3.0, 0.05],
            up: [0.0, 0.0, 0.0, 1.0],
        };
        let curve = BladeCurve::new(&blade);
        for i in 0..=4 {
            for j in 0..=4 {
                let p = curve.sample(i as f32 / 4.0, j as f32 / 4.0);
                assert!(p.position.is_finite() && p.normal.is_finite());
                assert!((p.normal.length() - 1.0).abs() < EPS);
                // Every point lies on a line through v0 along the side axis
                let offset = p.position - blade.base();
                assert!(offset.cross(curve.side()).length() < EPS);
            }
        }
    }

    #[test]
    fn test_upright_blade_faces_x_fallback() {
        // Tip straight above the base: no horizontal lean
        let blade = Blade {
            v0: [0.0, 0.0, 0.0, 1.0],
            v1: [0.0, 0.5, 0.0, 1.0],
            v2: [0.0, 1.0, 0.0, 0.1],
            up: [0.0, 1.0, 0.0, 1.0],
        };
        let curve = BladeCurve::new(&blade);
        // side = up x X = -Z
        assert!(approx(curve.side(), Vec3::NEG_Z));
        assert!(approx(curve.sample(0.5, 0.5).normal, Vec3::X));
    }

    #[test]
    fn test_safe_normalize() {
        assert_eq!(safe_normalize(Vec3::ZERO, Vec3::Y), Vec3::Y);
        assert_eq!(safe_normalize(Vec3::splat(1e-8), Vec3::Z), Vec3::Z);
        assert!(approx(safe_normalize(Vec3::new(3.0, 0.0, 4.0), Vec3::Y), Vec3::new(0.6, 0.0, 0.8)));
    }
}
