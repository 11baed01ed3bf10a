//! Scalar noise sources.
//!
//! A [`NoiseSource`] is a continuous, deterministic scalar function of a 3D
//! point with output roughly in [-1, 1]. [`NoiseField`] is the production
//! implementation (Perlin noise from the `noise` crate); tests plug in flat or
//! analytic sources through the same trait.

use glam::DVec3;
use noise::{NoiseFn, Perlin};

/// A deterministic scalar field over 3D space.
pub trait NoiseSource: Send + Sync {
    /// Sample the field at `p`. Same input, same output.
    fn sample(&self, p: DVec3) -> f64;
}

/// Largest coordinate magnitude handed to Perlin. `noise` floors each
/// coordinate into an `isize` and panics past that range; at this magnitude
/// an `f64` has no fractional bits left, so the field is flat anyway.
pub const MAX_SAMPLE_COORD: f64 = 1e15;

/// Seeded 3D Perlin noise.
///
/// Points with a non-finite coordinate or one beyond [`MAX_SAMPLE_COORD`]
/// sample as `0.0`.
#[derive(Debug, Clone)]
pub struct NoiseField {
    noise: Perlin,
}

impl NoiseField {
    pub fn new(seed: u32) -> Self {
        Self {
            noise: Perlin::new(seed),
        }
    }
}

impl NoiseSource for NoiseField {
    fn sample(&self, p: DVec3) -> f64 {
        if !p.is_finite() || p.abs().max_element() > MAX_SAMPLE_COORD {
            return 0.0;
        }
        self.noise.get([p.x, p.y, p.z])
    }
}
