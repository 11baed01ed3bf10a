//! Per-frame particle advection with spherical containment.
//!
//! One step is: sample a noise amplitude, scale the unit curl direction into a
//! velocity, take a forward-Euler step, then pull the particle back if it left
//! the domain. A spring-like push proportional to penetration depth runs first;
//! if that is not enough within the frame, the particle is clamped just inside
//! the sphere. After `step` returns, `|p| <= radius` always holds.

use crate::config::FieldParameters;
use crate::curl::CurlEvaluator;
use crate::noise_field::NoiseSource;
use glam::DVec3;

/// Distance inside the boundary a hard-clamped particle lands at.
pub const CLAMP_MARGIN: f64 = 0.001;

/// Advances particle positions through the curl field of `noise`.
pub struct Integrator<'a, N: NoiseSource + ?Sized> {
    noise: &'a N,
    radius: f64,
}

impl<'a, N: NoiseSource + ?Sized> Integrator<'a, N> {
    /// `radius` must be finite and positive; [`crate::Simulation`] validates it.
    pub fn new(noise: &'a N, radius: f64) -> Self {
        Self { noise, radius }
    }

    /// Returns `position` advanced by `dt` seconds.
    ///
    /// Negative or non-finite `dt` is treated as zero. A non-finite position
    /// is reset to the origin.
    pub fn step(&self, position: DVec3, dt: f64, params: &FieldParameters) -> DVec3 {
        if !position.is_finite() {
            return DVec3::ZERO;
        }
        let dt = sanitize_dt(dt);
        let curl = CurlEvaluator::new(self.noise, params.noise_scale);

        let noise_amp = self.noise.sample(position * params.noise_scale) * 0.5 + 0.5;
        let velocity = curl.curl_at(position) * params.speed * noise_amp;
        let moved = position + velocity * dt;
        if !moved.is_finite() {
            // The step overflowed: the particle ran off along `velocity`.
            return direction(velocity) * clamp_radius(self.radius);
        }

        contain(moved, dt, self.radius, params.boundary_strength)
    }

    /// Steps every position in place, in index order, with one parameter set.
    pub fn step_all(&self, positions: &mut [DVec3], dt: f64, params: &FieldParameters) {
        for p in positions.iter_mut() {
            *p = self.step(*p, dt, params);
        }
    }
}

/// Pulls `position` back inside the sphere of `radius` if it is outside.
///
/// The soft push is `(len - radius) * boundary_strength * dt` toward the
/// origin; a hard clamp to `radius - CLAMP_MARGIN` catches any overshoot.
/// A non-finite position is reset to the origin.
pub fn contain(position: DVec3, dt: f64, radius: f64, boundary_strength: f64) -> DVec3 {
    if !position.is_finite() {
        return DVec3::ZERO;
    }
    let len = position.length();
    if len <= radius {
        return position;
    }
    if !len.is_finite() {
        // |p|^2 overflowed; the push would too.
        return direction(position) * clamp_radius(radius);
    }

    let shift = (len - radius) * boundary_strength * dt;
    let pushed = position - (position / len) * shift;
    if pushed.is_finite() && pushed.length() <= radius {
        return pushed;
    }

    // Clamp along the pushed point; it may have crossed the origin.
    let toward = if pushed.is_finite() {
        direction(pushed)
    } else if shift > 0.0 {
        -direction(position)
    } else {
        direction(position)
    };
    toward * clamp_radius(radius)
}

/// Unit vector along `v`, or zero. Rescales first so huge components do not
/// overflow the length.
fn direction(v: DVec3) -> DVec3 {
    let scale = v.abs().max_element();
    if scale == 0.0 || !scale.is_finite() {
        return DVec3::ZERO;
    }
    (v / scale).normalize_or_zero()
}

fn clamp_radius(radius: f64) -> f64 {
    (radius - CLAMP_MARGIN).max(0.0)
}

fn sanitize_dt(dt: f64) -> f64 {
    if dt.is_finite() && dt > 0.0 {
        dt
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noise_field::NoiseField;

    const R: f64 = 50.0;

    struct Flat;

    impl NoiseSource for Flat {
        fn sample(&self, _p: DVec3) -> f64 {
            0.0
        }
    }

    /// `n(q) = q.x`: gradient (1, 0, 0), curl direction (0, -1, 1) / sqrt(2).
    struct RampX;

    impl NoiseSource for RampX {
        fn sample(&self, p: DVec3) -> f64 {
            p.x
        }
    }

    fn params(noise_scale: f64, speed: f64, boundary_strength: f64) -> FieldParameters {
        FieldParameters {
            noise_scale,
            speed,
            boundary_strength,
        }
    }

    #[test]
    fn outside_particle_is_pulled_inside() {
        let field = NoiseField::new(42);
        let integrator = Integrator::new(&field, R);
        let p = DVec3::new(100.0, 0.0, 0.0);
        let next = integrator.step(p, 0.016, &params(0.05, 4.0, 4.0));
        let d = next.length();
        assert!(d < 100.0, "moved outward: {d}");
        assert!(d <= R + 1e-6, "still outside: {d}");
    }

    #[test]
    fn zero_dt_is_a_no_op_inside_domain() {
        let field = NoiseField::new(42);
        let integrator = Integrator::new(&field, R);
        let p = DVec3::new(12.5, -30.0, 7.25);
        assert_eq!(integrator.step(p, 0.0, &FieldParameters::default()), p);
    }

    #[test]
    fn negative_dt_is_treated_as_zero() {
        let field = NoiseField::new(42);
        let integrator = Integrator::new(&field, R);
        let p = DVec3::new(1.0, 2.0, 3.0);
        assert_eq!(integrator.step(p, -0.5, &FieldParameters::default()), p);
        assert_eq!(integrator.step(p, f64::NAN, &FieldParameters::default()), p);
    }

    #[test]
    fn zero_dt_still_enforces_containment() {
        let field = NoiseField::new(42);
        let integrator = Integrator::new(&field, R);
        let next = integrator.step(DVec3::new(0.0, 80.0, 0.0), 0.0, &FieldParameters::default());
        assert!(next.length() <= R);
    }

    #[test]
    fn forward_euler_follows_curl_direction() {
        let integrator = Integrator::new(&RampX, R);
        // At the origin noise = 0, so the amplitude is exactly 0.5.
        let next = integrator.step(DVec3::ZERO, 0.1, &params(0.05, 4.0, 4.0));
        let expected = DVec3::new(0.0, -1.0, 1.0).normalize() * 4.0 * 0.5 * 0.1;
        assert!((next - expected).length() < 1e-9, "next = {next}, expected {expected}");
    }

    #[test]
    fn flat_noise_produces_no_motion() {
        let integrator = Integrator::new(&Flat, R);
        let p = DVec3::new(5.0, 5.0, 5.0);
        assert_eq!(integrator.step(p, 0.5, &FieldParameters::default()), p);
    }

    #[test]
    fn non_finite_position_resets_to_origin() {
        let integrator = Integrator::new(&Flat, R);
        let next = integrator.step(DVec3::new(f64::NAN, 0.0, 0.0), 0.016, &FieldParameters::default());
        assert_eq!(next, DVec3::ZERO);
    }

    #[test]
    fn soft_push_without_clamp() {
        // push = 10 * 10 * 0.15 = 15 -> lands at 45, inside, no clamp needed.
        let next = contain(DVec3::new(60.0, 0.0, 0.0), 0.15, R, 10.0);
        assert!((next - DVec3::new(45.0, 0.0, 0.0)).length() < 1e-9, "next = {next}");
    }

    #[test]
    fn hard_clamp_after_insufficient_push() {
        let next = contain(DVec3::new(0.0, 0.0, -1000.0), 0.016, R, 1.0);
        assert!((next.length() - (R - CLAMP_MARGIN)).abs() < 1e-9);
        assert!(next.z < 0.0, "clamp must keep the direction: {next}");
    }

    #[test]
    fn overshoot_through_origin_is_clamped() {
        // push * dt = 950 * 10 * 1 -> far past the origin on the other side.
        let next = contain(DVec3::new(1000.0, 0.0, 0.0), 1.0, R, 10.0);
        assert!(next.length() <= R);
        assert!(next.x < 0.0);
    }

    #[test]
    fn huge_dt_keeps_particles_contained_and_finite() {
        let field = NoiseField::new(42);
        let integrator = Integrator::new(&field, R);
        let fp = FieldParameters::default();
        for dt in [1e3, 1e200, 1e306, f64::MAX] {
            let next = integrator.step(DVec3::new(10.0, 5.0, -3.0), dt, &fp);
            assert!(next.is_finite(), "dt {dt}: {next}");
            assert!(next.length() <= R, "dt {dt}: |p| = {}", next.length());
        }
    }

    #[test]
    fn far_out_finite_positions_are_contained() {
        let field = NoiseField::new(42);
        let integrator = Integrator::new(&field, R);
        let fp = FieldParameters::default();
        for p in [
            DVec3::new(1e20, 0.0, 0.0),
            DVec3::new(-3e200, 1e200, 0.0),
            DVec3::splat(f64::MAX),
        ] {
            let next = integrator.step(p, 0.016, &fp);
            assert!(next.is_finite(), "from {p}: {next}");
            assert!(next.length() <= R, "from {p}: |p| = {}", next.length());
        }
        let next = integrator.step(DVec3::new(1e20, 0.0, 0.0), 0.016, &fp);
        assert!(next.x > 0.0, "clamp must keep the direction: {next}");
    }

    #[test]
    fn contain_resets_non_finite_positions() {
        assert_eq!(contain(DVec3::new(f64::INFINITY, 0.0, 0.0), 0.016, R, 4.0), DVec3::ZERO);
        assert_eq!(contain(DVec3::new(0.0, f64::NAN, 1.0), 0.016, R, 4.0), DVec3::ZERO);
    }

    #[test]
    fn contain_with_overflowing_length_clamps_along_position() {
        let next = contain(DVec3::new(0.0, -1e300, 0.0), 0.016, R, 4.0);
        assert!((next - DVec3::new(0.0, -(R - CLAMP_MARGIN), 0.0)).length() < 1e-9, "{next}");
    }

    #[test]
    fn contain_with_overflowing_push_lands_across_origin() {
        let next = contain(DVec3::new(1e10, 0.0, 0.0), f64::MAX, R, 10.0);
        assert!(next.is_finite());
        assert!((next.x + (R - CLAMP_MARGIN)).abs() < 1e-9, "{next}");
    }

    #[test]
    fn contain_leaves_inside_points_untouched() {
        let p = DVec3::new(10.0, -20.0, 30.0);
        assert_eq!(contain(p, 10.0, R, 10.0), p);
    }

    #[test]
    fn step_all_matches_individual_steps() {
        let field = NoiseField::new(3);
        let integrator = Integrator::new(&field, R);
        let fp = FieldParameters::default();
        let original = vec![
            DVec3::new(1.0, 2.0, 3.0),
            DVec3::new(-40.0, 10.0, 5.0),
            DVec3::new(49.9, 0.0, 0.0),
        ];
        let mut batch = original.clone();
        integrator.step_all(&mut batch, 0.016, &fp);
        for (before, after) in original.iter().zip(&batch) {
            assert_eq!(integrator.step(*before, 0.016, &fp), *after);
        }
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn any_params() -> impl Strategy<Value = FieldParameters> {
            (0.005_f64..=0.1, 0.1_f64..=10.0, 1.0_f64..=10.0).prop_map(|(n, s, b)| params(n, s, b))
        }

        proptest! {
            #[test]
            fn containment_holds_after_every_step(
                x in -200.0_f64..200.0,
                y in -200.0_f64..200.0,
                z in -200.0_f64..200.0,
                dt in prop_oneof![0.0_f64..2.0, 2.0_f64..1e308],
                fp in any_params(),
            ) {
                let field = NoiseField::new(42);
                let integrator = Integrator::new(&field, R);
                let next = integrator.step(DVec3::new(x, y, z), dt, &fp);
                prop_assert!(next.is_finite(), "non-finite {next} after step");
                prop_assert!(next.length() <= R + 1e-6, "|p| = {} after step", next.length());
            }

            #[test]
            fn extreme_inputs_stay_contained(
                x in -1e300_f64..1e300,
                y in -1e300_f64..1e300,
                z in -1e300_f64..1e300,
                dt in 0.0_f64..1e300,
                fp in any_params(),
            ) {
                let field = NoiseField::new(42);
                let integrator = Integrator::new(&field, R);
                let next = integrator.step(DVec3::new(x, y, z), dt, &fp);
                prop_assert!(next.is_finite(), "non-finite {next} after step");
                prop_assert!(next.length() <= R, "|p| = {} after step", next.length());
            }

            #[test]
            fn repeated_frames_stay_contained(
                seed: u32,
                x in -50.0_f64..50.0,
                y in -50.0_f64..50.0,
                z in -50.0_f64..50.0,
                fp in any_params(),
            ) {
                let field = NoiseField::new(seed);
                let integrator = Integrator::new(&field, R);
                let mut p = DVec3::new(x, y, z);
                for frame in 0..200 {
                    p = integrator.step(p, 1.0 / 60.0, &fp);
                    prop_assert!(p.length() <= R + 1e-6, "frame {frame}: |p| = {}", p.length());
                }
            }

            #[test]
            fn step_is_deterministic(
                x in -60.0_f64..60.0,
                y in -60.0_f64..60.0,
                z in -60.0_f64..60.0,
                dt in 0.0_f64..0.1,
                fp in any_params(),
            ) {
                let field = NoiseField::new(42);
                let integrator = Integrator::new(&field, R);
                let p = DVec3::new(x, y, z);
                let a = integrator.step(p, dt, &fp);
                let b = integrator.step(p, dt, &fp);
                prop_assert_eq!(a.to_array().map(f64::to_bits), b.to_array().map(f64::to_bits));
            }

            #[test]
            fn zero_dt_never_moves_contained_particles(
                x in -28.0_f64..28.0,
                y in -28.0_f64..28.0,
                z in -28.0_f64..28.0,
                fp in any_params(),
            ) {
                let field = NoiseField::new(42);
                let integrator = Integrator::new(&field, R);
                let p = DVec3::new(x, y, z);
                prop_assert_eq!(integrator.step(p, 0.0, &fp), p);
            }

            #[test]
            fn displacement_bounded_by_speed(
                x in -45.0_f64..45.0,
                y in -25.0_f64..25.0,
                z in -20.0_f64..20.0,
                dt in 0.0_f64..0.05,
                fp in any_params(),
            ) {
                // Unit direction times amplitude in roughly [0, 1].
                let field = NoiseField::new(42);
                let integrator = Integrator::new(&field, R);
                let p = DVec3::new(x, y, z);
                prop_assume!(p.length() < 49.0);
                let moved = (integrator.step(p, dt, &fp) - p).length();
                prop_assert!(moved <= fp.speed * dt * 1.25 + 1e-12, "moved {moved}");
            }
        }
    }
}
