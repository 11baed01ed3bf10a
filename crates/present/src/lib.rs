#![deny(unsafe_code)]
//! Presentation adapter: mirrors a [`Simulation`] into what a rendering
//! surface consumes.
//!
//! Per frame, [`instances`] yields one transform per particle (translation
//! plus uniform scale). Once per reset, [`colors_rgb8`] yields the instance
//! colors. For headless use, [`pixel::rasterize`] splats the cloud into an
//! RGBA8 buffer and `snapshot::write_png` (default `png` feature) saves it.

pub mod pixel;

#[cfg(feature = "png")]
pub mod snapshot;

use curlfield_core::Simulation;

/// Per-instance transform handed to a renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Instance {
    pub translation: [f32; 3],
    pub scale: f32,
}

/// One transform per particle, index-aligned with the simulation.
pub fn instances(sim: &Simulation) -> Vec<Instance> {
    let scale = sim.particle_size() as f32;
    sim.positions()
        .iter()
        .map(|p| Instance {
            translation: p.as_vec3().to_array(),
            scale,
        })
        .collect()
}

/// Overwrites `out` with the current transforms, reusing its allocation.
///
/// This is the per-frame path; `out` is resized when the particle count
/// changed since the last call.
pub fn write_instances(sim: &Simulation, out: &mut Vec<Instance>) {
    let scale = sim.particle_size() as f32;
    out.clear();
    out.extend(sim.positions().iter().map(|p| Instance {
        translation: p.as_vec3().to_array(),
        scale,
    }));
}

/// Instance colors as packed RGB8, index-aligned with [`instances`].
pub fn colors_rgb8(sim: &Simulation) -> Vec<[u8; 3]> {
    sim.colors().iter().map(|c| c.to_rgb8()).collect()
}
