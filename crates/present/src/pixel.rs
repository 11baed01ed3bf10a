//! CPU splat of the particle cloud into an RGBA8 buffer.
//!
//! Orthographic projection onto the XY plane, +y up, looking down -z. The
//! domain's diameter spans the shorter image side. Particles are drawn far to
//! near as filled discs in their instance color over a black background.

use curlfield_core::{SimError, Simulation};
use glam::DVec3;

/// Smallest disc radius in pixels, so tiny particles still show up.
const MIN_DISC_RADIUS: f64 = 0.5;

/// Maps a world position to fractional pixel coordinates.
pub fn project(p: DVec3, width: usize, height: usize, radius: f64) -> (f64, f64) {
    let scale = pixels_per_unit(width, height, radius);
    let cx = width as f64 / 2.0;
    let cy = height as f64 / 2.0;
    (cx + p.x * scale, cy - p.y * scale)
}

fn pixels_per_unit(width: usize, height: usize, radius: f64) -> f64 {
    width.min(height) as f64 / (2.0 * radius)
}

/// Renders the simulation's current state to a `width * height * 4` RGBA8 buffer.
///
/// Returns `SimError::InvalidDimensions` if either dimension is zero.
pub fn rasterize(sim: &Simulation, width: usize, height: usize) -> Result<Vec<u8>, SimError> {
    if width == 0 || height == 0 {
        return Err(SimError::InvalidDimensions);
    }
    let len = width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(4))
        .ok_or(SimError::InvalidDimensions)?;

    let mut rgba = vec![0u8; len];
    for px in rgba.chunks_exact_mut(4) {
        px[3] = 255;
    }

    let radius = sim.domain_radius();
    let disc = (sim.particle_size() * pixels_per_unit(width, height, radius)).max(MIN_DISC_RADIUS);

    let positions = sim.positions();
    let colors = sim.colors();
    let mut order: Vec<usize> = (0..positions.len()).collect();
    order.sort_by(|&a, &b| positions[a].z.total_cmp(&positions[b].z));

    for i in order {
        let center = project(positions[i], width, height, radius);
        let [r, g, b] = colors[i].to_rgb8();
        fill_disc(&mut rgba, (width, height), center, disc, [r, g, b, 255]);
    }

    Ok(rgba)
}

fn fill_disc(
    rgba: &mut [u8],
    (width, height): (usize, usize),
    (x, y): (f64, f64),
    r: f64,
    color: [u8; 4],
) {
    let x0 = (x - r).floor().max(0.0) as usize;
    let y0 = (y - r).floor().max(0.0) as usize;
    let x1 = ((x + r).ceil() as isize).clamp(0, width as isize - 1) as usize;
    let y1 = ((y + r).ceil() as isize).clamp(0, height as isize - 1) as usize;
    let r2 = r * r;

    for py in y0..=y1 {
        for px in x0..=x1 {
            let dx = px as f64 + 0.5 - x;
            let dy = py as f64 + 0.5 - y;
            if dx * dx + dy * dy <= r2 {
                let idx = (py * width + px) * 4;
                rgba[idx..idx + 4].copy_from_slice(&color);
            }
        }
    }
}
