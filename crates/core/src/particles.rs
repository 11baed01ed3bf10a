//! Particle collection and its reset lifecycle.
//!
//! A collection is built whole by [`ParticleCollection::reset`] and then only
//! has its positions mutated in place, once per frame. Colors are derived once
//! from each particle's initial radial distance and never touched again.

use crate::color::{ColorRamp, Srgb};
use crate::config::{validate_count, validate_radius};
use crate::error::SimError;
use crate::prng::RandomSource;
use glam::DVec3;

/// Half-width of the per-channel color jitter.
const COLOR_JITTER: f64 = 0.05;

/// Particle positions plus their reset-time colors, index-aligned.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleCollection {
    positions: Vec<DVec3>,
    colors: Vec<Srgb>,
}

impl ParticleCollection {
    /// Builds `count` particles uniformly distributed over the solid ball of
    /// radius `radius`, with colors from `ramp`.
    ///
    /// Fails before drawing anything if `count` or `radius` is invalid, so a
    /// caller never observes a partial collection.
    pub fn reset(
        count: usize,
        radius: f64,
        ramp: &ColorRamp,
        rng: &mut dyn RandomSource,
    ) -> Result<Self, SimError> {
        validate_count(count)?;
        validate_radius(radius)?;

        let mut positions = Vec::with_capacity(count);
        let mut colors = Vec::with_capacity(count);
        let mut draws = 0usize;

        for _ in 0..count {
            let (p, n) = sample_in_ball(radius, rng);
            draws += n;
            colors.push(particle_color(p, radius, ramp, rng));
            positions.push(p);
        }

        log::debug!(
            "reset: {count} particles in radius {radius}, {draws} draws ({:.3} per particle)",
            draws as f64 / count as f64
        );

        Ok(Self { positions, colors })
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[DVec3] {
        &self.positions
    }

    /// Mutable positions for the integrator. The length cannot change.
    pub fn positions_mut(&mut self) -> &mut [DVec3] {
        &mut self.positions
    }

    pub fn colors(&self) -> &[Srgb] {
        &self.colors
    }
}

/// Rejection-samples a point in the ball: uniform in the cube `[-r, r]^3`,
/// redrawn while outside the sphere. Returns the point and the number of draws
/// (about 6/pi on average).
pub fn sample_in_ball(radius: f64, rng: &mut dyn RandomSource) -> (DVec3, usize) {
    let mut draws = 0;
    loop {
        draws += 1;
        let p = DVec3::new(
            rng.next_range(-radius, radius),
            rng.next_range(-radius, radius),
            rng.next_range(-radius, radius),
        );
        if p.length() <= radius {
            return (p, draws);
        }
    }
}

/// Ramp color at `|p| / radius`, jittered per channel and clamped.
fn particle_color(p: DVec3, radius: f64, ramp: &ColorRamp, rng: &mut dyn RandomSource) -> Srgb {
    let base = ramp.sample(p.length() / radius);
    Srgb {
        r: base.r + rng.next_range(-COLOR_JITTER, COLOR_JITTER),
        g: base.g + rng.next_range(-COLOR_JITTER, COLOR_JITTER),
        b: base.b + rng.next_range(-COLOR_JITTER, COLOR_JITTER),
    }
    .clamped()
}
