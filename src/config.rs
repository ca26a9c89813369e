//! Scene configuration.
//!
//! Every field has a default matching the tuned look of the tree, so a config
//! file only needs to name what it changes:
//!
//! ```json
//! { "seed": 7, "physics": { "damping": 0.95 }, "gesture": { "debounce_ms": 400 } }
//! ```
//!
//! Builder-style overrides are available for code:
//!
//! ```ignore
//! let config = SceneConfig::default()
//!     .with_seed(7)
//!     .with_particle_count(2_000)
//!     .with_debounce_ms(250);
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Top-level configuration for a [`Scene`](crate::scene::Scene).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
    pub tree: TreeConfig,
    pub physics: PhysicsConfig,
    pub gesture: GestureConfig,
    pub camera: CameraConfig,
    pub snow: SnowConfig,
}

/// Tree dimensions and group sizes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub height: f32,
    pub bottom_radius: f32,
    /// Foliage points.
    pub particle_count: usize,
    /// Baubles, gifts and candy canes plus the fixed stocking and reindeer figurines.
    pub ornament_count: usize,
    pub photo_count: usize,
    pub light_count: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            height: 12.0,
            bottom_radius: 4.5,
            particle_count: 7_500,
            ornament_count: 110,
            photo_count: 36,
            light_count: 300,
        }
    }
}

/// Integrator constants.
///
/// `damping`, `reassembly_speed`, `orientation_relax`, `focus_follow` and
/// `scale_follow` are fractions applied once per tick, not per second.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub explosion_force: f32,
    pub damping: f32,
    pub reassembly_speed: f32,
    /// Amplitude of the drift added to settled scattered particles.
    pub float_speed: f32,
    /// Speed below which a scattered particle starts drifting.
    pub settle_speed: f32,
    pub orientation_relax: f32,
    /// Distance in front of the viewpoint where the focused panel parks.
    pub focus_distance: f32,
    pub focus_follow: f32,
    pub scale_follow: f32,
    /// Panel height while focused.
    pub focus_height: f32,
    /// Panel height otherwise.
    pub base_height: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            explosion_force: 0.8,
            damping: 0.96,
            reassembly_speed: 0.08,
            float_speed: 0.005,
            settle_speed: 0.01,
            orientation_relax: 0.05,
            focus_distance: 8.0,
            focus_follow: 0.1,
            scale_follow: 0.1,
            focus_height: 4.5,
            base_height: 0.9,
        }
    }
}

/// Gesture classification and transition timing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// A finger is open when its tip is farther from the wrist than
    /// `open_ratio` times its knuckle.
    pub open_ratio: f32,
    /// Thumb-to-index distance (normalized image units) below which the hand pinches.
    pub pinch_threshold: f32,
    /// Minimum time between two applied layout transitions.
    pub debounce_ms: u64,
    pub sensitivity_x: f32,
    pub sensitivity_y: f32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            open_ratio: 1.2,
            pinch_threshold: 0.05,
            debounce_ms: 500,
            sensitivity_x: 4.0,
            sensitivity_y: 2.0,
        }
    }
}

/// Orbit camera used to turn hand movement into a viewpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub distance: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    /// Polar angle limits (radians from +Y) while hand-steered.
    pub polar_min: f32,
    pub polar_max: f32,
    /// Fraction of each camera delta applied per tick.
    pub rate: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            distance: 25.0,
            min_distance: 10.0,
            max_distance: 40.0,
            polar_min: 1.0,
            polar_max: 2.0,
            rate: 0.05,
        }
    }
}

impl CameraConfig {
    /// Reject limits an orbit cannot clamp to (inverted, NaN, non-positive distance).
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("camera.distance", self.distance)?;
        positive("camera.min_distance", self.min_distance)?;
        if !(self.max_distance >= self.min_distance) {
            return Err(ConfigError::invalid(
                "camera.max_distance",
                "must not be below camera.min_distance",
            ));
        }
        finite("camera.polar_min", self.polar_min)?;
        if !(self.polar_max >= self.polar_min) {
            return Err(ConfigError::invalid(
                "camera.polar_max",
                "must not be below camera.polar_min",
            ));
        }
        non_negative("camera.rate", self.rate)
    }
}

/// Ambient snowfall around the tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnowConfig {
    pub count: usize,
    /// Half-width of the square the flakes fall through.
    pub spread: f32,
    pub floor: f32,
    pub ceiling: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    pub sway: f32,
}

impl Default for SnowConfig {
    fn default() -> Self {
        Self {
            count: 1_000,
            spread: 25.0,
            floor: -10.0,
            ceiling: 30.0,
            min_speed: 0.02,
            max_speed: 0.07,
            sway: 0.01,
        }
    }
}

impl SceneConfig {
    /// Parse a JSON config and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_particle_count(mut self, count: usize) -> Self {
        self.tree.particle_count = count;
        self
    }

    pub fn with_ornament_count(mut self, count: usize) -> Self {
        self.tree.ornament_count = count;
        self
    }

    pub fn with_photo_count(mut self, count: usize) -> Self {
        self.tree.photo_count = count;
        self
    }

    pub fn with_light_count(mut self, count: usize) -> Self {
        self.tree.light_count = count;
        self
    }

    pub fn with_snow_count(mut self, count: usize) -> Self {
        self.snow.count = count;
        self
    }

    pub fn with_debounce_ms(mut self, ms: u64) -> Self {
        self.gesture.debounce_ms = ms;
        self
    }

    pub fn with_physics(mut self, physics: PhysicsConfig) -> Self {
        self.physics = physics;
        self
    }

    /// Reject values that would break the integrator's invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = &self.tree;
        positive("tree.height", t.height)?;
        positive("tree.bottom_radius", t.bottom_radius)?;

        let p = &self.physics;
        positive("physics.explosion_force", p.explosion_force)?;
        fraction("physics.damping", p.damping)?;
        fraction("physics.reassembly_speed", p.reassembly_speed)?;
        fraction("physics.orientation_relax", p.orientation_relax)?;
        fraction("physics.focus_follow", p.focus_follow)?;
        fraction("physics.scale_follow", p.scale_follow)?;
        non_negative("physics.float_speed", p.float_speed)?;
        non_negative("physics.settle_speed", p.settle_speed)?;
        positive("physics.focus_distance", p.focus_distance)?;
        positive("physics.focus_height", p.focus_height)?;
        positive("physics.base_height", p.base_height)?;

        let g = &self.gesture;
        positive("gesture.open_ratio", g.open_ratio)?;
        positive("gesture.pinch_threshold", g.pinch_threshold)?;
        finite("gesture.sensitivity_x", g.sensitivity_x)?;
        finite("gesture.sensitivity_y", g.sensitivity_y)?;

        self.camera.validate()?;

        let s = &self.snow;
        positive("snow.spread", s.spread)?;
        if !(s.ceiling > s.floor) {
            return Err(ConfigError::invalid("snow.ceiling", "must be above snow.floor"));
        }
        non_negative("snow.min_speed", s.min_speed)?;
        if !(s.max_speed >= s.min_speed) {
            return Err(ConfigError::invalid(
                "snow.max_speed",
                "must not be below snow.min_speed",
            ));
        }
        non_negative("snow.sway", s.sway)?;

        Ok(())
    }
}

fn finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} is not finite")))
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} must be positive")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} must not be negative")))
    }
}

fn fraction(field: &'static str, value: f32) -> Result<(), ConfigError> {
    finite(field, value)?;
    if value > 0.0 && value < 1.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} must be in (0, 1)")))
    }
}
