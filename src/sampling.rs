//! Random sampling for particle creation and bursts.
//!
//! Two free functions carry the core geometry:
//!
//! - [`sample_cone`] draws a point uniformly inside the tree's cone volume.
//! - [`explosion_velocity`] draws an outward-biased burst velocity.
//!
//! [`Sampler`] wraps a seeded [`SmallRng`] with helpers for the other random
//! draws groups need at creation time (colors, sizes, orientations, phases).
//!
//! ```ignore
//! let mut sampler = Sampler::new(7);
//! let target = sampler.in_cone(12.0, 4.5);
//! let burst = sampler.explosion_velocity(target, 0.8);
//! ```

use glam::{EulerRot, Quat, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::{PI, TAU};

/// Direction used when a position has no usable outward direction
/// (the origin, or a non-finite input).
pub const FALLBACK_DIRECTION: Vec3 = Vec3::Y;

/// Half-width of the per-axis jitter added to a burst direction.
pub const BURST_JITTER: f32 = 0.25;

/// Smallest magnitude scale a burst may use.
const MIN_FORCE: f32 = 1e-6;

/// Uniform point inside a cone standing on the XZ plane, centered vertically
/// at the origin.
///
/// The radius at height `y` tapers linearly to zero at the apex. The radial
/// draw is square-rooted so points are uniform by area across each
/// horizontal disk rather than bunched toward the axis.
pub fn sample_cone<R: Rng + ?Sized>(rng: &mut R, height: f32, bottom_radius: f32) -> Vec3 {
    let y = rng.gen::<f32>() * height;
    let radius_at_y = bottom_radius * (1.0 - y / height);
    let theta = rng.gen::<f32>() * TAU;
    let r = rng.gen::<f32>().sqrt() * radius_at_y;

    Vec3::new(r * theta.cos(), y - height / 2.0, r * theta.sin())
}

/// Outward burst velocity for a particle at `position`.
///
/// The radial direction is jittered by up to [`BURST_JITTER`] per axis,
/// renormalized, and scaled by `force * U(0.5, 1.5)`. Never NaN and never
/// zero length, including at the origin.
pub fn explosion_velocity<R: Rng + ?Sized>(rng: &mut R, position: Vec3, force: f32) -> Vec3 {
    let radial = position.try_normalize().unwrap_or(FALLBACK_DIRECTION);
    let jitter = Vec3::new(
        rng.gen_range(-BURST_JITTER..BURST_JITTER),
        rng.gen_range(-BURST_JITTER..BURST_JITTER),
        rng.gen_range(-BURST_JITTER..BURST_JITTER),
    );
    // jitter can cancel the radial direction exactly only in theory, keep the
    // unjittered direction if it does
    let direction = (radial + jitter).try_normalize().unwrap_or(radial);

    let force = force.max(MIN_FORCE);
    direction * force * rng.gen_range(0.5..1.5)
}

/// Angular velocity with each axis in `[-spin/2, spin/2)`.
pub fn sample_spin<R: Rng + ?Sized>(rng: &mut R, spin: f32) -> Vec3 {
    let half = spin.abs() / 2.0;
    if half > 0.0 {
        Vec3::new(
            rng.gen_range(-half..half),
            rng.gen_range(-half..half),
            rng.gen_range(-half..half),
        )
    } else {
        Vec3::ZERO
    }
}

/// Seeded random source with helpers for particle creation.
#[derive(Debug, Clone)]
pub struct Sampler {
    rng: SmallRng,
}

impl Sampler {
    /// Deterministic sampler for a given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Sampler seeded from the thread RNG.
    pub fn from_entropy() -> Self {
        Self::new(rand::thread_rng().gen())
    }

    /// Access the underlying RNG for the free functions.
    #[inline]
    pub fn rng(&mut self) -> &mut SmallRng {
        &mut self.rng
    }

    // ========== Random primitives ==========

    /// Random f32 between 0.0 and 1.0.
    #[inline]
    pub fn random(&mut self) -> f32 {
        self.rng.gen()
    }

    /// Random f32 in `[min, max)`. Returns `min` for an empty range.
    #[inline]
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        if max > min {
            self.rng.gen_range(min..max)
        } else {
            min
        }
    }

    // ========== Geometry ==========

    /// See [`sample_cone`].
    pub fn in_cone(&mut self, height: f32, bottom_radius: f32) -> Vec3 {
        sample_cone(&mut self.rng, height, bottom_radius)
    }

    /// See [`explosion_velocity`].
    pub fn explosion_velocity(&mut self, position: Vec3, force: f32) -> Vec3 {
        explosion_velocity(&mut self.rng, position, force)
    }

    /// See [`sample_spin`].
    pub fn spin(&mut self, spin: f32) -> Vec3 {
        sample_spin(&mut self.rng, spin)
    }

    /// Orientation from three random Euler angles in `[0, π)`.
    pub fn rotation(&mut self) -> Quat {
        Quat::from_euler(
            EulerRot::XYZ,
            self.range(0.0, PI),
            self.range(0.0, PI),
            self.range(0.0, PI),
        )
    }

    /// Random rotation about the vertical axis only.
    pub fn yaw(&mut self) -> Quat {
        Quat::from_rotation_y(self.range(0.0, TAU))
    }
}

/// Point on the photo spiral wrapped around the tree.
///
/// `t` runs from 0 at the top to 1 at the bottom; the radius widens linearly
/// from `top_radius` to `bottom_radius` over `turns` full revolutions.
pub fn spiral_position(t: f32, height: f32, top_radius: f32, bottom_radius: f32, turns: f32) -> Vec3 {
    let y = height / 2.0 - t * height;
    let radius = top_radius + (bottom_radius - top_radius) * t;
    let angle = t * TAU * turns;
    Vec3::new(angle.cos() * radius, y, angle.sin() * radius)
}

/// Yaw rotation that turns a panel's +Z face away from the trunk axis at `position`.
pub fn outward_yaw(position: Vec3) -> Quat {
    Quat::from_rotation_y(position.x.atan2(position.z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cone_samples_inside_volume() {
        let mut sampler = Sampler::new(1);
        let (height, radius) = (12.0, 4.5);
        for _ in 0..5_000 {
            let p = sampler.in_cone(height, radius);
            let y = p.y + height / 2.0;
            assert!((0.0..=height).contains(&y));
            let bound = radius * (1.0 - y / height);
            let r = (p.x * p.x + p.z * p.z).sqrt();
            assert!(r <= bound + 1e-4, "r={r} bound={bound}");
        }
    }

    #[test]
    fn test_burst_at_origin_uses_fallback() {
        let mut sampler = Sampler::new(3);
        for _ in 0..1_000 {
            let v = sampler.explosion_velocity(Vec3::ZERO, 0.8);
            assert!(v.is_finite());
            let speed = v.length();
            assert!(speed >= 0.8 * 0.5 - 1e-5 && speed <= 0.8 * 1.5 + 1e-5);
            // jitter is at most 0.25 per axis, so an upward fallback stays upward
            assert!(v.y > 0.0);
        }
    }

    #[test]
    fn test_burst_points_outward() {
        let mut sampler = Sampler::new(5);
        let position = Vec3::new(3.0, 0.0, 0.0);
        for _ in 0..1_000 {
            let v = sampler.explosion_velocity(position, 1.0);
            assert!(v.x > 0.0);
        }
    }

    #[test]
    fn test_burst_survives_non_finite_input() {
        let mut sampler = Sampler::new(9);
        let v = sampler.explosion_velocity(Vec3::new(f32::NAN, 1.0, 0.0), 0.8);
        assert!(v.is_finite());
        assert!(v.length() > 0.0);
    }

    #[test]
    fn test_range_handles_empty() {
        let mut sampler = Sampler::new(0);
        assert_eq!(sampler.range(2.0, 2.0), 2.0);
        assert_eq!(sampler.spin(0.0), Vec3::ZERO);
    }

    #[test]
    fn test_spiral_endpoints() {
        let top = spiral_position(0.0, 13.2, 0.5, 4.725, 4.5);
        assert!((top.y - 6.6).abs() < 1e-5);
        assert!((top.x - 0.5).abs() < 1e-5);

        let bottom = spiral_position(1.0, 13.2, 0.5, 4.725, 4.5);
        assert!((bottom.y + 6.6).abs() < 1e-5);
        let r = (bottom.x * bottom.x + bottom.z * bottom.z).sqrt();
        assert!((r - 4.725).abs() < 1e-4);
    }

    #[test]
    fn test_outward_yaw_faces_away_from_axis() {
        let position = Vec3::new(2.0, 1.0, 0.0);
        let facing = outward_yaw(position) * Vec3::Z;
        assert!((facing - Vec3::X).length() < 1e-5);
    }
}
