//! Curl-noise direction field.
//!
//! The velocity direction at a point is built from the central-difference
//! gradient `(dx, dy, dz)` of a scalar [`NoiseSource`], recombined as
//! `(dy - dz, dz - dx, dx - dy)`. The divergence of that vector is a sum of
//! mixed partials that cancel pairwise, so the flow is incompressible by
//! construction. This is a stylized recombination, not the textbook curl of a
//! vector potential, and the motion's look depends on it.

use crate::noise_field::NoiseSource;
use glam::DVec3;

/// Central-difference step, in noise-space units.
pub const EPSILON: f64 = 1e-4;

/// Below this magnitude the raw curl is treated as degenerate.
const DEGENERATE_EPS: f64 = 1e-10;

/// Evaluates the normalized curl direction of a noise source.
///
/// World positions are mapped to noise space by `noise_scale` before sampling.
pub struct CurlEvaluator<'a, N: NoiseSource + ?Sized> {
    noise: &'a N,
    noise_scale: f64,
}

impl<'a, N: NoiseSource + ?Sized> CurlEvaluator<'a, N> {
    pub fn new(noise: &'a N, noise_scale: f64) -> Self {
        Self { noise, noise_scale }
    }

    /// Unnormalized `(dy - dz, dz - dx, dx - dy)` at world position `p`.
    ///
    /// Six noise evaluations.
    pub fn raw_at(&self, p: DVec3) -> DVec3 {
        let q = p * self.noise_scale;
        let n = |offset: DVec3| self.noise.sample(q + offset);
        let inv = 1.0 / (2.0 * EPSILON);

        let dx = (n(DVec3::X * EPSILON) - n(DVec3::X * -EPSILON)) * inv;
        let dy = (n(DVec3::Y * EPSILON) - n(DVec3::Y * -EPSILON)) * inv;
        let dz = (n(DVec3::Z * EPSILON) - n(DVec3::Z * -EPSILON)) * inv;

        DVec3::new(dy - dz, dz - dx, dx - dy)
    }

    /// Unit-length curl direction at `p`, or `DVec3::ZERO` when the gradient
    /// is degenerate.
    pub fn curl_at(&self, p: DVec3) -> DVec3 {
        let raw = self.raw_at(p);
        let len = raw.length();
        if !len.is_finite() || len < DEGENERATE_EPS {
            return DVec3::ZERO;
        }
        raw / len
    }
}
