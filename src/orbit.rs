//! Keplerian orbit shape.
//!
//! Every orbit is an ellipse with the Sun at one focus (the scene origin).
//! Bodies are not integrated under gravity; their distance from the focus is
//! read straight off the polar equation of the ellipse for the current
//! accumulated angle.
//!
//! ```ignore
//! use solarium::orbit;
//!
//! let r = orbit::radius(0.0, 0.017, 1.0);
//! let (x, y) = orbit::position(0.0, r);
//! ```

use glam::{DVec2, Vec3};

use crate::bodies::OrbitalParameters;

/// Distance from the focus for an ellipse of eccentricity `e` and
/// semi-major axis `a` at angle `theta`.
///
/// `r = a (1 - e²) / (1 + e cos θ)`. Positive for `a > 0` and `0 <= e < 1`.
#[inline]
pub fn radius(theta: f64, e: f64, a: f64) -> f64 {
    a * (1.0 - e * e) / (1.0 + e * theta.cos())
}

/// Orbital-plane coordinates for a body at angle `theta` and distance `r`.
#[inline]
pub fn position(theta: f64, r: f64) -> DVec2 {
    DVec2::new(r * theta.sin(), r * theta.cos())
}

/// [`radius`] for a body's parameters, multiplied by the scene scale
/// (scene units per semi-major-axis unit).
#[inline]
pub fn scaled_radius(theta: f64, params: &OrbitalParameters, scale: f64) -> f64 {
    scale * radius(theta, params.eccentricity, params.semi_major_axis)
}

/// Lift an orbital-plane point into world space. The orbital plane is XZ.
#[inline]
pub fn to_world(plane: DVec2) -> Vec3 {
    Vec3::new(plane.x as f32, 0.0, plane.y as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use std::f64::consts::TAU;

    #[test]
    fn test_radius_positive_for_valid_orbits() {
        let mut rng = rand::thread_rng();
        for _ in 0..10_000 {
            let theta = rng.gen_range(0.0..1.0e4);
            let e = rng.gen_range(0.0..0.999);
            let a = rng.gen_range(1.0e-3..100.0);
            assert!(radius(theta, e, a) > 0.0, "theta={theta} e={e} a={a}");
        }
    }

    #[test]
    fn test_radius_periodic() {
        let mut rng = rand::thread_rng();
        for _ in 0..1_000 {
            let theta = rng.gen_range(0.0..500.0);
            let e = rng.gen_range(0.0..0.95);
            let a = rng.gen_range(0.1..40.0);
            let r0 = radius(theta, e, a);
            let r1 = radius(theta + TAU, e, a);
            assert!((r0 - r1).abs() <= 1e-9 * r0.max(1.0));
        }
    }

    #[test]
    fn test_earth_at_zero_angle() {
        let e = 0.017;
        let a = 1.0;
        let expected = a * (1.0 - e * e) / (1.0 + e);
        assert!((radius(0.0, e, a) - expected).abs() < 1e-6);
        // Closest approach sits at theta = 0 with this parametrisation.
        assert!((radius(0.0, e, a) - a * (1.0 - e)).abs() < 1e-6);
    }

    #[test]
    fn test_circle_is_constant() {
        for i in 0..16 {
            let theta = i as f64 * 0.4;
            assert!((radius(theta, 0.0, 2.5) - 2.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_position_axes() {
        let p = position(0.0, 3.0);
        assert!(p.x.abs() < 1e-12);
        assert!((p.y - 3.0).abs() < 1e-12);

        let p = position(std::f64::consts::FRAC_PI_2, 3.0);
        assert!((p.x - 3.0).abs() < 1e-12);
        assert!(p.y.abs() < 1e-12);
    }

    #[test]
    fn test_to_world_uses_xz_plane() {
        let w = to_world(DVec2::new(1.5, -2.0));
        assert_eq!(w, Vec3::new(1.5, 0.0, -2.0));
    }
}
