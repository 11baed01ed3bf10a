//! PNG snapshot of the particle cloud.
//!
//! Feature-gated behind `png` (default on) so consumers that only need
//! instance transforms do not pull in the `image` crate.

use curlfield_core::{SimError, Simulation};
use std::path::Path;

use crate::pixel::rasterize;

/// Rasterizes the simulation and writes it as a PNG.
///
/// Returns `SimError::InvalidDimensions` for zero or oversized dimensions, or
/// `SimError::Io` on write failure.
pub fn write_png(
    sim: &Simulation,
    width: usize,
    height: usize,
    path: &Path,
) -> Result<(), SimError> {
    let rgba = rasterize(sim, width, height)?;
    let w = u32::try_from(width).map_err(|_| SimError::InvalidDimensions)?;
    let h = u32::try_from(height).map_err(|_| SimError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, rgba)
        .ok_or_else(|| SimError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| SimError::Io(e.to_string()))?;
    log::info!("wrote {width}x{height} snapshot to {}", path.display());
    Ok(())
}
