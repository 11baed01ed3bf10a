//! Error types for the curlfield core.

use thiserror::Error;

/// Errors produced by simulation setup, configuration, and presentation.
///
/// The per-frame integration path never fails; everything here is raised at
/// reset or configuration time.
#[derive(Debug, Error)]
pub enum SimError {
    /// Requested particle count is outside the supported range.
    #[error("particle count {count} out of range [{min}, {max}]")]
    ParticleCountOutOfRange {
        count: usize,
        min: usize,
        max: usize,
    },

    /// Requested particle size is outside the supported range.
    #[error("particle size {size} out of range [{min}, {max}]")]
    ParticleSizeOutOfRange { size: f64, min: f64, max: f64 },

    /// Domain radius must be finite and strictly positive.
    #[error("invalid domain radius: {0}")]
    InvalidDomainRadius(f64),

    /// A recognized parameter key carried the wrong JSON type.
    #[error("parameter type mismatch for '{name}': expected {expected}")]
    ParamTypeMismatch { name: String, expected: String },

    /// A color string could not be parsed.
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// Width or height was zero when creating a raster.
    #[error("invalid dimensions: width and height must be non-zero")]
    InvalidDimensions,

    /// Writing a snapshot failed.
    #[error("i/o error: {0}")]
    Io(String),
}
