//! Hand-steered camera.
//!
//! While the tree is scattered, the wrist's offset from the image center turns
//! into an orbit delta. [`CameraIntentMapper`] produces the delta;
//! [`OrbitRig`] is a spherical orbit camera that consumes it and yields the
//! [`Viewpoint`] the focused panel is pulled toward.

use glam::{Mat4, Vec2, Vec3};

use crate::config::{CameraConfig, GestureConfig};
use crate::engine::Viewpoint;
use crate::error::ConfigError;
use crate::layout::LayoutState;

/// Incremental orbit request, in sensitivity-scaled units.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CameraDelta {
    pub dx: f32,
    pub dy: f32,
}

/// Wrist position to camera delta, active only while Scattered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraIntentMapper {
    pub sensitivity: Vec2,
}

impl CameraIntentMapper {
    pub fn new(sensitivity: Vec2) -> Self {
        Self { sensitivity }
    }

    pub fn from_config(config: &GestureConfig) -> Self {
        Self::new(Vec2::new(config.sensitivity_x, config.sensitivity_y))
    }

    /// `((0.5 - wrist.x) * sx, (0.5 - wrist.y) * sy)`; unclamped.
    pub fn map(&self, state: LayoutState, wrist: Vec2) -> Option<CameraDelta> {
        if state != LayoutState::Scattered {
            return None;
        }
        let offset = (Vec2::splat(0.5) - wrist) * self.sensitivity;
        Some(CameraDelta {
            dx: offset.x,
            dy: offset.y,
        })
    }
}

impl Default for CameraIntentMapper {
    fn default() -> Self {
        Self::from_config(&GestureConfig::default())
    }
}

/// Orbit camera around a target point.
///
/// `azimuth` turns about +Y starting from +Z; `polar` is measured down from +Y.
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitRig {
    pub azimuth: f32,
    pub polar: f32,
    pub distance: f32,
    pub target: Vec3,
    config: CameraConfig,
}

impl OrbitRig {
    /// Level with the target, looking down -Z.
    ///
    /// Fails if the distance or polar limits are inverted or not finite.
    pub fn new(config: CameraConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: CameraConfig) -> Self {
        let distance = config.distance.clamp(config.min_distance, config.max_distance);
        Self {
            azimuth: 0.0,
            polar: std::f32::consts::FRAC_PI_2,
            distance,
            target: Vec3::ZERO,
            config,
        }
    }

    /// Apply one delta: azimuth and polar move by `rate` of it, polar clamped.
    pub fn apply(&mut self, delta: CameraDelta) {
        self.azimuth += delta.dx * self.config.rate;
        self.polar = (self.polar + delta.dy * self.config.rate)
            .clamp(self.config.polar_min, self.config.polar_max);
    }

    /// Move toward (negative) or away from (positive) the target.
    pub fn zoom(&mut self, amount: f32) {
        self.distance = (self.distance + amount)
            .clamp(self.config.min_distance, self.config.max_distance);
    }

    /// Eye position on the sphere around `target`.
    pub fn position(&self) -> Vec3 {
        let (sin_polar, cos_polar) = self.polar.sin_cos();
        let x = self.distance * sin_polar * self.azimuth.sin();
        let y = self.distance * cos_polar;
        let z = self.distance * sin_polar * self.azimuth.cos();
        self.target + Vec3::new(x, y, z)
    }

    /// Right-handed view matrix looking at `target`.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position(), self.target, Vec3::Y)
    }

    /// Pose handed to [`Scene::tick`](crate::scene::Scene::tick).
    pub fn viewpoint(&self) -> Viewpoint {
        Viewpoint::looking_at(self.position(), self.target)
    }
}

impl Default for OrbitRig {
    fn default() -> Self {
        Self::from_valid(CameraConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_maps_only_while_scattered() {
        let mapper = CameraIntentMapper::default();
        let wrist = Vec2::new(0.25, 0.75);
        assert!(mapper.map(LayoutState::Assembled, wrist).is_none());
        assert!(mapper.map(LayoutState::Focused, wrist).is_none());

        let delta = mapper.map(LayoutState::Scattered, wrist).unwrap();
        assert!((delta.dx - 1.0).abs() < 1e-6);
        assert!((delta.dy + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_centered_wrist_is_still() {
        let mapper = CameraIntentMapper::default();
        let delta = mapper.map(LayoutState::Scattered, Vec2::splat(0.5)).unwrap();
        assert_eq!(delta, CameraDelta::default());
    }

    #[test]
    fn test_mapper_does_not_clamp() {
        let mapper = CameraIntentMapper::default();
        let delta = mapper.map(LayoutState::Scattered, Vec2::new(-3.0, 9.0)).unwrap();
        assert!((delta.dx - 14.0).abs() < 1e-5);
        assert!((delta.dy + 17.0).abs() < 1e-5);
    }

    #[test]
    fn test_rig_starts_on_z_axis() {
        let rig = OrbitRig::default();
        let p = rig.position();
        assert!((p - Vec3::new(0.0, 0.0, 25.0)).length() < 1e-4);
        assert!((rig.viewpoint().forward() - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn test_polar_is_clamped() {
        let mut rig = OrbitRig::default();
        for _ in 0..1_000 {
            rig.apply(CameraDelta { dx: 0.0, dy: 5.0 });
        }
        assert_eq!(rig.polar, 2.0);
        for _ in 0..1_000 {
            rig.apply(CameraDelta { dx: 0.0, dy: -5.0 });
        }
        assert_eq!(rig.polar, 1.0);
    }

    #[test]
    fn test_azimuth_accumulates() {
        let mut rig = OrbitRig::default();
        rig.apply(CameraDelta { dx: 2.0, dy: 0.0 });
        assert!((rig.azimuth - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut rig = OrbitRig::default();
        rig.zoom(-100.0);
        assert_eq!(rig.distance, 10.0);
        rig.zoom(100.0);
        assert_eq!(rig.distance, 40.0);
    }

    #[test]
    fn test_rig_rejects_unclampable_limits() {
        let inverted = CameraConfig {
            min_distance: 40.0,
            max_distance: 10.0,
            ..CameraConfig::default()
        };
        assert!(matches!(
            OrbitRig::new(inverted),
            Err(ConfigError::Invalid { field: "camera.max_distance", .. })
        ));

        let nan_polar = CameraConfig {
            polar_max: f32::NAN,
            ..CameraConfig::default()
        };
        assert!(OrbitRig::new(nan_polar).is_err());

        let mut rig = OrbitRig::new(CameraConfig::default()).unwrap();
        rig.apply(CameraDelta { dx: 1.0, dy: 100.0 });
        rig.zoom(-100.0);
        assert_eq!(rig.polar, 2.0);
        assert_eq!(rig.distance, 10.0);
    }

    #[test]
    fn test_view_matrix_maps_target_ahead() {
        let rig = OrbitRig::default();
        let p = rig.view_matrix().transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(0.0, 0.0, -25.0)).length() < 1e-4);
    }
}
