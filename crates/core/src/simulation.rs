//! The simulation context: owns the noise field, parameters, random source and
//! particle collection, and exposes read-only views for presentation.
//!
//! There is one writer per frame ([`Simulation::step`]); presentation borrows
//! the views afterward. Field parameters are copied once at the start of each
//! frame, so every particle in a frame sees the same values.

use crate::color::{ColorRamp, Srgb};
use crate::config::{
    param_schema, validate_count, validate_size, FieldParameters, ParticleConfig, SimulationConfig,
};
use crate::error::SimError;
use crate::integrator::Integrator;
use crate::noise_field::NoiseField;
use crate::params::{opt_f64, opt_usize};
use crate::particles::ParticleCollection;
use crate::prng::{RandomSource, Xorshift64};
use glam::DVec3;
use serde_json::{json, Value};

/// Summary of how far particles sit from the domain center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RadialStats {
    pub max: f64,
    pub mean: f64,
}

/// Curl-noise particle simulation.
pub struct Simulation {
    noise: NoiseField,
    field: FieldParameters,
    particles: ParticleConfig,
    radius: f64,
    seed: u64,
    ramp: ColorRamp,
    rng: Xorshift64,
    collection: ParticleCollection,
    frame: u64,
}

impl Simulation {
    /// Validates `config`, seeds the noise field and PRNG from `config.seed`,
    /// and builds the initial collection.
    pub fn new(config: SimulationConfig) -> Result<Self, SimError> {
        config.validate()?;
        let mut rng = Xorshift64::new(config.seed);
        let noise = NoiseField::new(rng.next_u32());
        let collection = ParticleCollection::reset(
            config.particles.count,
            config.domain_radius,
            &config.colors,
            &mut rng,
        )?;
        Ok(Self {
            noise,
            field: config.field.clamped(),
            particles: config.particles,
            radius: config.domain_radius,
            seed: config.seed,
            ramp: config.colors,
            rng,
            collection,
            frame: 0,
        })
    }

    /// Rebuilds the collection with the current particle settings, drawing
    /// from the internal PRNG.
    pub fn reset(&mut self) -> Result<(), SimError> {
        let collection =
            ParticleCollection::reset(self.particles.count, self.radius, &self.ramp, &mut self.rng)?;
        self.install(collection);
        Ok(())
    }

    /// Like [`Simulation::reset`] but draws from a caller-supplied source.
    pub fn reset_with(&mut self, rng: &mut dyn RandomSource) -> Result<(), SimError> {
        let collection =
            ParticleCollection::reset(self.particles.count, self.radius, &self.ramp, rng)?;
        self.install(collection);
        Ok(())
    }

    fn install(&mut self, collection: ParticleCollection) {
        self.collection = collection;
        self.frame = 0;
    }

    /// Advances every particle by `dt` seconds.
    pub fn step(&mut self, dt: f64) {
        let params = self.field;
        Integrator::new(&self.noise, self.radius).step_all(
            self.collection.positions_mut(),
            dt,
            &params,
        );
        self.frame += 1;
    }

    /// Replaces the field parameters (clamped into range). Takes effect on
    /// the next frame; the collection is kept.
    pub fn set_field_params(&mut self, params: FieldParameters) {
        self.field = params.clamped();
    }

    /// Changes the particle count and resets. On error nothing changes.
    pub fn set_particle_count(&mut self, count: usize) -> Result<(), SimError> {
        validate_count(count)?;
        self.particles.count = count;
        self.reset()
    }

    /// Changes the particle size and resets. On error nothing changes.
    pub fn set_particle_size(&mut self, size: f64) -> Result<(), SimError> {
        validate_size(size)?;
        self.particles.size = size;
        self.reset()
    }

    /// Applies a partial JSON update from the configuration surface.
    ///
    /// Recognized keys: `particleCount`, `particleSize`, `noiseScale`, `speed`,
    /// `boundaryStrength`; others are ignored. All keys are type-checked and
    /// the particle settings validated before anything is applied. Returns
    /// `true` if the update changed the particle settings and so reset the
    /// collection.
    pub fn apply_params(&mut self, update: &Value) -> Result<bool, SimError> {
        let count = opt_usize(update, "particleCount")?;
        let size = opt_f64(update, "particleSize")?;
        let noise_scale = opt_f64(update, "noiseScale")?;
        let speed = opt_f64(update, "speed")?;
        let boundary_strength = opt_f64(update, "boundaryStrength")?;

        let next = ParticleConfig {
            count: count.unwrap_or(self.particles.count),
            size: size.unwrap_or(self.particles.size),
        };
        next.validate()?;

        self.set_field_params(FieldParameters {
            noise_scale: noise_scale.unwrap_or(self.field.noise_scale),
            speed: speed.unwrap_or(self.field.speed),
            boundary_strength: boundary_strength.unwrap_or(self.field.boundary_strength),
        });

        if next == self.particles {
            return Ok(false);
        }
        self.particles = next;
        self.reset()?;
        Ok(true)
    }

    /// Current surface parameter values as a JSON object.
    pub fn params(&self) -> Value {
        json!({
            "particleCount": self.particles.count,
            "particleSize": self.particles.size,
            "noiseScale": self.field.noise_scale,
            "speed": self.field.speed,
            "boundaryStrength": self.field.boundary_strength,
        })
    }

    /// Schema for [`Simulation::params`].
    pub fn param_schema(&self) -> Value {
        param_schema()
    }

    /// The current settings as a [`SimulationConfig`].
    ///
    /// `Simulation::new(sim.config())` reproduces the collection this
    /// simulation had right after construction. Every reset since then has
    /// drawn further from the internal PRNG, so later collections are not
    /// reproduced.
    pub fn config(&self) -> SimulationConfig {
        SimulationConfig {
            particles: self.particles,
            field: self.field,
            domain_radius: self.radius,
            seed: self.seed,
            colors: self.ramp,
        }
    }

    pub fn positions(&self) -> &[DVec3] {
        self.collection.positions()
    }

    pub fn colors(&self) -> &[Srgb] {
        self.collection.colors()
    }

    pub fn particle_count(&self) -> usize {
        self.collection.len()
    }

    pub fn particle_size(&self) -> f64 {
        self.particles.size
    }

    pub fn domain_radius(&self) -> f64 {
        self.radius
    }

    pub fn field_params(&self) -> FieldParameters {
        self.field
    }

    /// Frames stepped since the last reset.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn radial_stats(&self) -> RadialStats {
        let positions = self.collection.positions();
        let (max, sum) = positions.iter().fold((0.0_f64, 0.0_f64), |(max, sum), p| {
            let len = p.length();
            (max.max(len), sum + len)
        });
        let mean = if positions.is_empty() {
            0.0
        } else {
            sum / positions.len() as f64
        };
        RadialStats { max, mean }
    }
}
