//! The shared per-tick integrator.
//!
//! One function body drives every group; the group's [`GroupPolicy`] and the
//! layout [`LayoutSnapshot`] passed in through [`FrameInput`] decide what each
//! particle does this tick:
//!
//! | Layout | Particle | Motion |
//! |--------|----------|--------|
//! | Assembled | any | lerp to target, velocities cleared, orientation relaxes to rest |
//! | Scattered | any | ballistic with damping, slow drift once settled, tumbling |
//! | Focused | focused panel | pulled in front of the viewpoint, faces the viewer |
//! | Focused | everything else | same as Scattered |
//!
//! A fresh layout epoch entering Scattered or Focused reseeds every velocity
//! with a burst, once per transition.
//!
//! The fractions in [`PhysicsConfig`] are applied per tick, not per second.
//!
//! ```ignore
//! let frame = FrameInput::new(snapshot, elapsed, Viewpoint::default());
//! for group in groups.iter_mut() {
//!     group.tick(&frame, &config.physics);
//! }
//! ```

use glam::{EulerRot, Mat3, Quat, Vec3};

use crate::config::PhysicsConfig;
use crate::layout::{LayoutSnapshot, LayoutState};
use crate::particle::{GroupPolicy, OrientationPolicy, Particle, ParticleGroup};
use crate::sampling::{explosion_velocity, outward_yaw, sample_spin};

/// Camera pose the focused panel is pulled toward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewpoint {
    pub position: Vec3,
    pub orientation: Quat,
}

impl Viewpoint {
    /// Pose from an eye position and a camera orientation.
    pub fn new(position: Vec3, orientation: Quat) -> Self {
        Self {
            position,
            orientation,
        }
    }

    /// Pose at `eye` looking at `target` with +Y up.
    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        let forward = (target - eye).try_normalize().unwrap_or(Vec3::NEG_Z);
        let right = forward.cross(Vec3::Y).try_normalize().unwrap_or(Vec3::X);
        let up = right.cross(forward);
        let orientation = Quat::from_mat3(&Mat3::from_cols(right, up, -forward)).normalize();
        Self::new(eye, orientation)
    }

    /// Viewing direction (-Z in camera space).
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }
}

impl Default for Viewpoint {
    fn default() -> Self {
        Self::looking_at(Vec3::new(0.0, 0.0, 25.0), Vec3::ZERO)
    }
}

/// Everything a group needs from the outside world for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameInput {
    pub layout: LayoutSnapshot,
    /// Seconds since the scene started.
    pub elapsed: f32,
    pub viewpoint: Viewpoint,
}

impl FrameInput {
    /// Everything a group needs for one tick.
    pub fn new(layout: LayoutSnapshot, elapsed: f32, viewpoint: Viewpoint) -> Self {
        Self {
            layout,
            elapsed,
            viewpoint,
        }
    }
}

impl ParticleGroup {
    /// Advance every particle by one tick.
    pub fn tick(&mut self, frame: &FrameInput, physics: &PhysicsConfig) {
        let layout = frame.layout;
        if layout.epoch != self.seen_epoch {
            self.seen_epoch = layout.epoch;
            if layout.state.is_dispersed() {
                self.burst(physics.explosion_force);
            }
        }

        let focus = if self.policy.focusable {
            layout.focused_index()
        } else {
            None
        };
        let policy = &self.policy;

        for (i, particle) in self.particles.iter_mut().enumerate() {
            let last_position = particle.position;
            let focused = focus == Some(i);

            match layout.state {
                LayoutState::Assembled => assemble(particle, policy, physics),
                _ if focused => pull_into_view(particle, &frame.viewpoint, physics),
                _ => scatter(particle, i, frame.elapsed, policy, physics),
            }

            if policy.focusable {
                animate_scale(particle, focused, physics);
            }
            restore_if_degenerate(particle, last_position);
        }
    }

    /// Reseed velocities and spins for a new dispersal.
    fn burst(&mut self, force: f32) {
        let policy = self.policy;
        for particle in self.particles.iter_mut() {
            particle.velocity = explosion_velocity(&mut self.rng, particle.position, force)
                * policy.burst_scale
                + policy.burst_bias;
            particle.angular_velocity = sample_spin(&mut self.rng, policy.spin);
        }
    }
}

// ========== Per-layout rules ==========

fn assemble(particle: &mut Particle, policy: &GroupPolicy, physics: &PhysicsConfig) {
    let rate = physics.reassembly_speed * policy.reassembly_scale;
    particle.position += (particle.target() - particle.position) * rate;
    particle.velocity = Vec3::ZERO;
    particle.angular_velocity = Vec3::ZERO;

    let rest = match policy.orientation {
        OrientationPolicy::Fixed => return,
        OrientationPolicy::Tumble => particle.rest,
        OrientationPolicy::FaceOutward { tilt } => {
            outward_yaw(particle.position) * Quat::from_rotation_x(tilt)
        }
        OrientationPolicy::Upright { yaw_rate } => {
            (Quat::from_rotation_y(yaw_rate) * particle.rest).normalize()
        }
    };
    particle.rest = rest;
    particle.orientation = particle
        .orientation
        .slerp(rest, physics.orientation_relax)
        .normalize();
}

fn scatter(
    particle: &mut Particle,
    index: usize,
    elapsed: f32,
    policy: &GroupPolicy,
    physics: &PhysicsConfig,
) {
    particle.position += particle.velocity;
    particle.velocity *= physics.damping;

    if particle.velocity.length() < physics.settle_speed {
        let i = index as f32;
        let drift = Vec3::new((elapsed + i).sin(), (0.5 * elapsed + i).cos(), 0.0);
        particle.position += drift * physics.float_speed;
    }

    if policy.orientation != OrientationPolicy::Fixed {
        let w = particle.angular_velocity;
        let step = Quat::from_euler(EulerRot::XYZ, w.x, w.y, w.z);
        particle.orientation = (particle.orientation * step).normalize();
    }
}

fn pull_into_view(particle: &mut Particle, viewpoint: &Viewpoint, physics: &PhysicsConfig) {
    let destination = viewpoint.position + viewpoint.forward() * physics.focus_distance;
    particle.position = particle.position.lerp(destination, physics.focus_follow);
    particle.orientation = particle
        .orientation
        .slerp(viewpoint.orientation, physics.focus_follow)
        .normalize();
    particle.velocity = Vec3::ZERO;
    particle.angular_velocity = Vec3::ZERO;
}

fn animate_scale(particle: &mut Particle, focused: bool, physics: &PhysicsConfig) {
    let height = if focused {
        physics.focus_height
    } else {
        physics.base_height
    };
    let goal = Vec3::new(height * particle.aspect, height, 1.0);
    particle.scale = particle.scale.lerp(goal, physics.scale_follow);
}

/// Put a particle that integrated into NaN or infinity back on solid ground.
fn restore_if_degenerate(particle: &mut Particle, last_position: Vec3) {
    if !particle.position.is_finite() || !particle.velocity.is_finite() {
        particle.position = if last_position.is_finite() {
            last_position
        } else {
            particle.target()
        };
        particle.velocity = Vec3::ZERO;
    }
    if !particle.orientation.is_finite() || !particle.angular_velocity.is_finite() {
        if !particle.rest.is_finite() {
            particle.rest = Quat::IDENTITY;
        }
        particle.orientation = particle.rest;
        particle.angular_velocity = Vec3::ZERO;
    }
    if !particle.scale.is_finite() {
        particle.scale = Vec3::ONE;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::GroupKind;

    fn physics() -> PhysicsConfig {
        PhysicsConfig::default()
    }

    fn group(policy: GroupPolicy, targets: &[Vec3]) -> ParticleGroup {
        let particles = targets.iter().copied().map(Particle::new).collect();
        ParticleGroup::new(GroupKind::Ornaments, policy, particles, 11)
    }

    fn frame(state: LayoutState, focus: Option<usize>, epoch: u32, elapsed: f32) -> FrameInput {
        FrameInput::new(
            LayoutSnapshot::new(state, focus, epoch),
            elapsed,
            Viewpoint::default(),
        )
    }

    #[test]
    fn test_assembled_target_is_fixed_point() {
        let targets = [Vec3::new(1.0, 2.0, 3.0), Vec3::new(-2.0, 0.5, 0.0)];
        let mut g = group(GroupPolicy::default(), &targets);
        for tick in 0..100 {
            g.tick(&frame(LayoutState::Assembled, None, 0, tick as f32), &physics());
        }
        for (p, t) in g.iter().zip(targets) {
            assert_eq!(p.position, t);
            assert_eq!(p.velocity, Vec3::ZERO);
        }
    }

    #[test]
    fn test_round_trip_returns_to_target() {
        let targets = [Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO, Vec3::new(0.0, -5.0, 1.0)];
        let policy = GroupPolicy::default().with_spin(0.2);
        let mut g = group(policy, &targets);
        assert_eq!(physics().reassembly_speed, 0.08);

        for tick in 0..60 {
            g.tick(&frame(LayoutState::Scattered, None, 1, tick as f32 / 60.0), &physics());
        }
        assert!(g.iter().zip(targets).any(|(p, t)| p.position.distance(t) > 1.0));

        for tick in 0..200 {
            g.tick(&frame(LayoutState::Assembled, None, 2, tick as f32 / 60.0), &physics());
        }
        for (p, t) in g.iter().zip(targets) {
            assert!(p.position.distance(t) < 1e-3, "{} vs {}", p.position, t);
            assert_eq!(p.angular_velocity, Vec3::ZERO);
        }
    }

    #[test]
    fn test_origin_particle_bursts_along_fallback() {
        let force = physics().explosion_force;
        for seed in 0..50 {
            let particles = vec![Particle::new(Vec3::ZERO)];
            let mut g =
                ParticleGroup::new(GroupKind::Ornaments, GroupPolicy::default(), particles, seed);
            g.tick(&frame(LayoutState::Scattered, None, 1, 0.0), &physics());

            // first scattered step moves by exactly the burst velocity
            let moved = g.particles()[0].position;
            assert!(moved.is_finite());
            assert!(moved.y > 0.0);
            assert!(moved.length() >= force * 0.5 - 1e-5 && moved.length() <= force * 1.5 + 1e-5);
        }
    }

    #[test]
    fn test_burst_happens_once_per_epoch() {
        let mut g = group(GroupPolicy::default(), &[Vec3::X]);
        let f = frame(LayoutState::Scattered, None, 1, 0.0);

        g.tick(&f, &physics());
        let after_burst = g.particles()[0].velocity;
        assert!(after_burst.length() > 0.0);

        g.tick(&f, &physics());
        let v = g.particles()[0].velocity;
        assert!((v - after_burst * physics().damping).length() < 1e-6);
    }

    #[test]
    fn test_assembled_epoch_does_not_burst() {
        let mut g = group(GroupPolicy::default(), &[Vec3::X]);
        g.tick(&frame(LayoutState::Assembled, None, 5, 0.0), &physics());
        assert_eq!(g.particles()[0].velocity, Vec3::ZERO);
        assert_eq!(g.seen_epoch, 5);
    }

    #[test]
    fn test_burst_bias_and_scale() {
        let policy = GroupPolicy::default()
            .with_burst_scale(0.0)
            .with_burst_bias(Vec3::new(0.0, 0.5, 0.0));
        let mut g = group(policy, &[Vec3::X]);
        g.tick(&frame(LayoutState::Scattered, None, 1, 0.0), &physics());
        let v = g.particles()[0].velocity;
        assert!((v - Vec3::new(0.0, 0.5 * physics().damping, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_settled_particles_drift() {
        let mut g = group(GroupPolicy::default(), &[Vec3::ZERO]);
        g.tick(&frame(LayoutState::Scattered, None, 0, 1.0), &physics());
        let p = g.particles()[0];
        let expected = Vec3::new(1.0_f32.sin(), 0.5_f32.cos(), 0.0) * physics().float_speed;
        assert!((p.position - expected).length() < 1e-6);
    }

    #[test]
    fn test_fixed_orientation_untouched() {
        let policy = GroupPolicy::default()
            .with_orientation(OrientationPolicy::Fixed)
            .with_spin(1.0);
        let mut g = group(policy, &[Vec3::X]);
        for epoch in 1..4 {
            g.tick(&frame(LayoutState::Scattered, None, epoch, 0.0), &physics());
            g.tick(&frame(LayoutState::Assembled, None, epoch + 10, 0.0), &physics());
        }
        assert_eq!(g.particles()[0].orientation, Quat::IDENTITY);
    }

    #[test]
    fn test_tumble_spins_while_scattered() {
        let mut g = group(GroupPolicy::default().with_spin(0.2), &[Vec3::X]);
        for _ in 0..10 {
            g.tick(&frame(LayoutState::Scattered, None, 1, 0.0), &physics());
        }
        let q = g.particles()[0].orientation;
        assert!(q.is_normalized());
        assert!(q.angle_between(Quat::IDENTITY) > 1e-4);
    }

    #[test]
    fn test_face_outward_rest() {
        let policy = GroupPolicy::default().with_orientation(OrientationPolicy::FaceOutward { tilt: 0.0 });
        let target = Vec3::new(3.0, 0.0, 0.0);
        let mut g = group(policy, &[target]);
        for _ in 0..400 {
            g.tick(&frame(LayoutState::Assembled, None, 0, 0.0), &physics());
        }
        let facing = g.particles()[0].orientation * Vec3::Z;
        assert!((facing - Vec3::X).length() < 1e-3);
    }

    #[test]
    fn test_upright_keeps_spinning_assembled() {
        let policy =
            GroupPolicy::default().with_orientation(OrientationPolicy::Upright { yaw_rate: 0.02 });
        let mut g = group(policy, &[Vec3::Y]);
        let before = g.particles()[0].rest;
        g.tick(&frame(LayoutState::Assembled, None, 0, 0.0), &physics());
        let after = g.particles()[0].rest;
        assert!((before.angle_between(after) - 0.02).abs() < 1e-4);
        // stays upright
        let up = g.particles()[0].orientation * Vec3::Y;
        assert!((up - Vec3::Y).length() < 1e-4);
    }

    #[test]
    fn test_focused_pulls_only_focused_panel() {
        let policy = GroupPolicy::default().focusable();
        let targets = [Vec3::X, Vec3::Y, Vec3::NEG_Z];
        let mut g = group(policy, &targets);
        let view = Viewpoint::default();
        let destination = view.position + view.forward() * physics().focus_distance;

        for tick in 0..300 {
            g.tick(&frame(LayoutState::Focused, Some(1), 1, tick as f32), &physics());
        }
        let focused = g.particles()[1];
        assert!(focused.position.distance(destination) < 1e-3);
        assert!(focused.orientation.angle_between(view.orientation) < 1e-3);
        assert!((focused.scale.y - physics().focus_height).abs() < 1e-3);

        for i in [0, 2] {
            let p = g.particles()[i];
            assert!(p.position.distance(destination) > 1.0);
            assert!((p.scale.y - physics().base_height).abs() < 1e-3);
        }
    }

    #[test]
    fn test_focus_ignored_for_non_focusable_group() {
        let mut g = group(GroupPolicy::default(), &[Vec3::X]);
        let view = Viewpoint::default();
        let destination = view.position + view.forward() * physics().focus_distance;
        for tick in 0..300 {
            g.tick(&frame(LayoutState::Focused, Some(0), 1, tick as f32), &physics());
        }
        assert!(g.particles()[0].position.distance(destination) > 1.0);
    }

    #[test]
    fn test_no_focus_pulls_nothing() {
        let policy = GroupPolicy::default().focusable();
        let mut g = group(policy, &[]);
        g.tick(&frame(LayoutState::Focused, None, 1, 0.0), &physics());
        assert!(g.is_empty());
    }

    #[test]
    fn test_degenerate_state_is_restored() {
        let mut g = group(GroupPolicy::default().with_spin(0.2), &[Vec3::X]);
        g.tick(&frame(LayoutState::Scattered, None, 1, 0.0), &physics());
        let before = g.particles()[0].position;

        {
            let p = &mut g.particles_mut()[0];
            p.velocity = Vec3::new(f32::INFINITY, 0.0, 0.0);
            p.angular_velocity = Vec3::new(f32::NAN, 0.0, 0.0);
        }
        g.tick(&frame(LayoutState::Scattered, None, 1, 0.0), &physics());

        let p = g.particles()[0];
        assert!(p.is_finite());
        assert_eq!(p.position, before);
        assert_eq!(p.velocity, Vec3::ZERO);
        assert_eq!(p.orientation, p.rest);
    }

    #[test]
    fn test_viewpoint_forward() {
        let view = Viewpoint::default();
        assert!((view.forward() - Vec3::NEG_Z).length() < 1e-5);

        let side = Viewpoint::looking_at(Vec3::new(10.0, 0.0, 0.0), Vec3::ZERO);
        assert!((side.forward() - Vec3::NEG_X).length() < 1e-5);
        assert!((side.orientation * Vec3::Y - Vec3::Y).length() < 1e-5);
    }
}
