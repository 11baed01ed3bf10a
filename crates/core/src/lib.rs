#![deny(unsafe_code)]
//! Core of the curlfield particle system.
//!
//! Particles drift through a sphere of radius [`DOMAIN_RADIUS`], advected by a
//! divergence-free curl-noise field. The crate provides the scalar
//! [`NoiseField`], the [`CurlEvaluator`], the forward-Euler [`Integrator`] with
//! spherical containment, the [`ParticleCollection`] reset lifecycle, and the
//! [`Simulation`] context that ties them together. Rendering is left to the
//! caller, which reads positions and colors back through borrowed views.

pub mod color;
pub mod config;
pub mod curl;
pub mod error;
pub mod integrator;
pub mod noise_field;
pub mod params;
pub mod particles;
pub mod prng;
pub mod simulation;

pub use color::{ColorRamp, Srgb};
pub use config::{FieldParameters, ParticleConfig, SimulationConfig, DOMAIN_RADIUS};
pub use curl::CurlEvaluator;
pub use error::SimError;
pub use integrator::Integrator;
pub use noise_field::{NoiseField, NoiseSource};
pub use particles::ParticleCollection;
pub use prng::{RandomSource, Xorshift64};
pub use simulation::{RadialStats, Simulation};
