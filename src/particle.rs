//! Particle data and per-group policy.
//!
//! Every group on the tree (foliage points, ornaments, figurines, lights, the
//! topper and photo panels) is a [`ParticleGroup`]: a fixed-size list of [`Particle`]s
//! plus one [`GroupPolicy`] that tunes the shared integrator in
//! [`engine`](crate::engine). Groups differ only in policy and in how their
//! particles were laid out at creation.
//!
//! # Particle
//!
//! - `target` is where the particle sits on the assembled tree. It is fixed at
//!   creation and only readable afterwards.
//! - `position`, `velocity`, `orientation` and `angular_velocity` are the
//!   integrated state.
//! - `rest` is the orientation the particle relaxes toward while assembled.
//! - `color`, `scale`, `phase`, `tempo` and `aspect` are appearance data the
//!   integrator either leaves alone or animates for specific groups.

use glam::{Quat, Vec3};
use rand::rngs::SmallRng;
use rand::SeedableRng;

// ============================================================================
// PARTICLE
// ============================================================================

/// One simulated element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    target: Vec3,
    pub position: Vec3,
    pub velocity: Vec3,
    pub orientation: Quat,
    /// Euler increments (radians per tick) applied while dispersed.
    pub angular_velocity: Vec3,
    pub rest: Quat,
    /// Linear RGB, 0.0 to 1.0.
    pub color: Vec3,
    pub scale: Vec3,
    /// Per-particle animation offset.
    pub phase: f32,
    /// Per-particle animation rate (twinkle speed for lights).
    pub tempo: f32,
    /// Width over height, for panels.
    pub aspect: f32,
}

impl Particle {
    /// Particle resting at `target`.
    pub fn new(target: Vec3) -> Self {
        Self {
            target,
            position: target,
            velocity: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            angular_velocity: Vec3::ZERO,
            rest: Quat::IDENTITY,
            color: Vec3::ONE,
            scale: Vec3::ONE,
            phase: 0.0,
            tempo: 1.0,
            aspect: 1.0,
        }
    }

    /// Assembled-layout position. Never changes after creation.
    #[inline]
    pub fn target(&self) -> Vec3 {
        self.target
    }

    /// Start somewhere other than the target.
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    /// Sets both the current and the rest orientation.
    pub fn with_orientation(mut self, orientation: Quat) -> Self {
        self.orientation = orientation;
        self.rest = orientation;
        self
    }

    /// Base RGB color.
    pub fn with_color(mut self, color: Vec3) -> Self {
        self.color = color;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_uniform_scale(self, scale: f32) -> Self {
        self.with_scale(Vec3::splat(scale))
    }

    pub fn with_phase(mut self, phase: f32) -> Self {
        self.phase = phase;
        self
    }

    pub fn with_tempo(mut self, tempo: f32) -> Self {
        self.tempo = tempo;
        self
    }

    /// Width over height, for photo panels.
    pub fn with_aspect(mut self, aspect: f32) -> Self {
        self.aspect = aspect;
        self
    }

    /// Twinkle brightness in `[0.2, 1.0]` at `elapsed` seconds.
    #[inline]
    pub fn twinkle(&self, elapsed: f32) -> f32 {
        0.6 + 0.4 * (elapsed * self.tempo + self.phase).sin()
    }

    /// Whether position and orientation are usable.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.position.is_finite() && self.orientation.is_finite()
    }
}

// ============================================================================
// POLICY
// ============================================================================

/// How a group's particles are oriented.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OrientationPolicy {
    /// Orientation is never touched (point sprites).
    Fixed,
    /// Tumbles freely while dispersed, relaxes to the creation orientation.
    Tumble,
    /// Relaxes to a yaw facing away from the trunk axis, pitched by `tilt`.
    FaceOutward { tilt: f32 },
    /// Relaxes to upright and keeps spinning about Y by `yaw_rate` per tick.
    Upright { yaw_rate: f32 },
}

/// Per-group tuning of the shared integrator.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GroupPolicy {
    pub orientation: OrientationPolicy,
    /// Multiplier on the configured reassembly fraction.
    pub reassembly_scale: f32,
    /// Multiplier on burst velocities.
    pub burst_scale: f32,
    /// Added to every burst velocity.
    pub burst_bias: Vec3,
    /// Full width of the per-axis angular velocity roll.
    pub spin: f32,
    /// Whether members can be pulled into view while Focused.
    pub focusable: bool,
}

impl Default for GroupPolicy {
    fn default() -> Self {
        Self {
            orientation: OrientationPolicy::Tumble,
            reassembly_scale: 1.0,
            burst_scale: 1.0,
            burst_bias: Vec3::ZERO,
            spin: 0.0,
            focusable: false,
        }
    }
}

impl GroupPolicy {
    pub fn with_orientation(mut self, orientation: OrientationPolicy) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_reassembly_scale(mut self, scale: f32) -> Self {
        self.reassembly_scale = scale;
        self
    }

    pub fn with_burst_scale(mut self, scale: f32) -> Self {
        self.burst_scale = scale;
        self
    }

    pub fn with_burst_bias(mut self, bias: Vec3) -> Self {
        self.burst_bias = bias;
        self
    }

    pub fn with_spin(mut self, spin: f32) -> Self {
        self.spin = spin;
        self
    }

    /// Let the focused layout pull this group's particles into view.
    pub fn focusable(mut self) -> Self {
        self.focusable = true;
        self
    }
}

// ============================================================================
// GROUP
// ============================================================================

/// Which part of the tree a group draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GroupKind {
    Foliage,
    Ornaments,
    Figurines,
    Lights,
    Topper,
    Photos,
}

/// Fixed-size collection of particles sharing one policy.
///
/// The particle list is exposed as a slice, so its length is fixed once the
/// group is built.
#[derive(Clone, Debug)]
pub struct ParticleGroup {
    pub(crate) kind: GroupKind,
    pub(crate) policy: GroupPolicy,
    pub(crate) particles: Vec<Particle>,
    pub(crate) rng: SmallRng,
    /// Last layout epoch this group reacted to.
    pub(crate) seen_epoch: u32,
}

impl ParticleGroup {
    /// Build a group. `seed` drives burst velocities and spins.
    pub fn new(kind: GroupKind, policy: GroupPolicy, particles: Vec<Particle>, seed: u64) -> Self {
        Self {
            kind,
            policy,
            particles,
            rng: SmallRng::seed_from_u64(seed),
            seen_epoch: 0,
        }
    }

    #[inline]
    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    #[inline]
    pub fn policy(&self) -> &GroupPolicy {
        &self.policy
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Particles in creation order.
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable view; the group itself cannot grow or shrink.
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Particle at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    /// Iterate particles in creation order.
    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }
}

impl<'a> IntoIterator for &'a ParticleGroup {
    type Item = &'a Particle;
    type IntoIter = std::slice::Iter<'a, Particle>;

    fn into_iter(self) -> Self::IntoIter {
        self.particles.iter()
    }
}
