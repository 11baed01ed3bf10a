//! Simulation configuration: live field parameters, reset-triggering particle
//! settings, and the serializable bundle that makes a run reproducible.

use crate::color::ColorRamp;
use crate::error::SimError;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::ops::RangeInclusive;

/// Radius of the spherical containment domain.
pub const DOMAIN_RADIUS: f64 = 50.0;

pub const PARTICLE_COUNT_RANGE: RangeInclusive<usize> = 1_000..=20_000;
pub const PARTICLE_SIZE_RANGE: RangeInclusive<f64> = 0.1..=2.0;
pub const NOISE_SCALE_RANGE: RangeInclusive<f64> = 0.005..=0.1;
pub const SPEED_RANGE: RangeInclusive<f64> = 0.1..=10.0;
pub const BOUNDARY_STRENGTH_RANGE: RangeInclusive<f64> = 1.0..=10.0;

pub const DEFAULT_PARTICLE_COUNT: usize = 5_000;
pub const DEFAULT_PARTICLE_SIZE: f64 = 0.5;
pub const DEFAULT_NOISE_SCALE: f64 = 0.05;
pub const DEFAULT_SPEED: f64 = 4.0;
pub const DEFAULT_BOUNDARY_STRENGTH: f64 = 4.0;
pub const DEFAULT_SEED: u64 = 42;

/// Field parameters read by the integrator every frame.
///
/// Changing these never resets the particle collection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldParameters {
    /// Spatial frequency of the noise: larger values give finer detail.
    pub noise_scale: f64,
    /// Multiplier on the curl-derived velocity.
    pub speed: f64,
    /// Gain of the restoring push once a particle leaves the domain.
    pub boundary_strength: f64,
}

impl Default for FieldParameters {
    fn default() -> Self {
        Self {
            noise_scale: DEFAULT_NOISE_SCALE,
            speed: DEFAULT_SPEED,
            boundary_strength: DEFAULT_BOUNDARY_STRENGTH,
        }
    }
}

impl FieldParameters {
    /// Returns a copy with every value clamped into its declared range.
    /// Non-finite values fall back to the default.
    pub fn clamped(self) -> Self {
        Self {
            noise_scale: clamp_param("noiseScale", self.noise_scale, NOISE_SCALE_RANGE, DEFAULT_NOISE_SCALE),
            speed: clamp_param("speed", self.speed, SPEED_RANGE, DEFAULT_SPEED),
            boundary_strength: clamp_param(
                "boundaryStrength",
                self.boundary_strength,
                BOUNDARY_STRENGTH_RANGE,
                DEFAULT_BOUNDARY_STRENGTH,
            ),
        }
    }
}

fn clamp_param(name: &str, value: f64, range: RangeInclusive<f64>, default: f64) -> f64 {
    if !value.is_finite() {
        log::warn!("{name} = {value} is not finite, using default {default}");
        return default;
    }
    let clamped = value.clamp(*range.start(), *range.end());
    if clamped != value {
        log::warn!(
            "{name} = {value} outside [{}, {}], clamped to {clamped}",
            range.start(),
            range.end()
        );
    }
    clamped
}

/// Particle settings. Changing either value replaces the whole collection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParticleConfig {
    #[serde(rename = "particleCount")]
    pub count: usize,
    /// Uniform per-instance scale handed to the presentation layer.
    #[serde(rename = "particleSize")]
    pub size: f64,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_PARTICLE_COUNT,
            size: DEFAULT_PARTICLE_SIZE,
        }
    }
}

impl ParticleConfig {
    /// Rejects counts and sizes outside their ranges. No clamping: a reset
    /// with a bad count fails instead of producing a surprising collection.
    pub fn validate(&self) -> Result<(), SimError> {
        validate_count(self.count)?;
        validate_size(self.size)
    }
}

pub(crate) fn validate_count(count: usize) -> Result<(), SimError> {
    if PARTICLE_COUNT_RANGE.contains(&count) {
        Ok(())
    } else {
        Err(SimError::ParticleCountOutOfRange {
            count,
            min: *PARTICLE_COUNT_RANGE.start(),
            max: *PARTICLE_COUNT_RANGE.end(),
        })
    }
}

pub(crate) fn validate_size(size: f64) -> Result<(), SimError> {
    if PARTICLE_SIZE_RANGE.contains(&size) {
        Ok(())
    } else {
        Err(SimError::ParticleSizeOutOfRange {
            size,
            min: *PARTICLE_SIZE_RANGE.start(),
            max: *PARTICLE_SIZE_RANGE.end(),
        })
    }
}

pub(crate) fn validate_radius(radius: f64) -> Result<(), SimError> {
    if radius.is_finite() && radius > 0.0 {
        Ok(())
    } else {
        Err(SimError::InvalidDomainRadius(radius))
    }
}

/// Everything needed to reproduce a run: same config, same frames, same `dt`
/// sequence gives bit-identical positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationConfig {
    #[serde(flatten)]
    pub particles: ParticleConfig,
    #[serde(flatten)]
    pub field: FieldParameters,
    pub domain_radius: f64,
    pub seed: u64,
    pub colors: ColorRamp,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            particles: ParticleConfig::default(),
            field: FieldParameters::default(),
            domain_radius: DOMAIN_RADIUS,
            seed: DEFAULT_SEED,
            colors: ColorRamp::default(),
        }
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        self.particles.validate()?;
        validate_radius(self.domain_radius)
    }
}

/// Schema for every parameter on the configuration surface: type, default,
/// range, and whether changing it resets the collection.
pub fn param_schema() -> Value {
    json!({
        "particleCount": {
            "type": "integer",
            "default": DEFAULT_PARTICLE_COUNT,
            "min": PARTICLE_COUNT_RANGE.start(),
            "max": PARTICLE_COUNT_RANGE.end(),
            "reset": true,
            "description": "Number of particles"
        },
        "particleSize": {
            "type": "number",
            "default": DEFAULT_PARTICLE_SIZE,
            "min": PARTICLE_SIZE_RANGE.start(),
            "max": PARTICLE_SIZE_RANGE.end(),
            "reset": true,
            "description": "Uniform scale of each particle instance"
        },
        "noiseScale": {
            "type": "number",
            "default": DEFAULT_NOISE_SCALE,
            "min": NOISE_SCALE_RANGE.start(),
            "max": NOISE_SCALE_RANGE.end(),
            "reset": false,
            "description": "Spatial frequency of the curl noise"
        },
        "speed": {
            "type": "number",
            "default": DEFAULT_SPEED,
            "min": SPEED_RANGE.start(),
            "max": SPEED_RANGE.end(),
            "reset": false,
            "description": "Velocity multiplier"
        },
        "boundaryStrength": {
            "type": "number",
            "default": DEFAULT_BOUNDARY_STRENGTH,
            "min": BOUNDARY_STRENGTH_RANGE.start(),
            "max": BOUNDARY_STRENGTH_RANGE.end(),
            "reset": false,
            "description": "Gain of the restoring force outside the domain"
        }
    })
}
