//! # Evergreen - gesture-driven particle tree
//!
//! A particle Christmas tree that flies apart and reassembles under hand
//! control. Several particle groups (foliage, ornaments, figurines, lights,
//! a topper and photo panels) share one integrator and one layout:
//!
//! - **Assembled**: every particle eases back to its spot on the tree.
//! - **Scattered**: an explosive burst throws everything outward, then it drifts.
//! - **Focused**: one photo panel is pulled in front of the camera.
//!
//! Layout changes come from a hand-gesture classifier reading 21 landmark
//! points per frame, or from a manual toggle, and are debounced.
//!
//! ## Quick Start
//!
//! ```ignore
//! use evergreen::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut scene = Scene::new(SceneConfig::default().with_seed(7))?;
//!     let source = ScriptedSource::from_path("hands.jsonl")?;
//!     spawn_gesture_source(source, scene.feed(), scene.classifier().clone());
//!
//!     let mut rig = OrbitRig::default();
//!     loop {
//!         let report = scene.tick(&rig.viewpoint());
//!         if let Some(delta) = report.camera {
//!             rig.apply(delta);
//!         }
//!     }
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Gestures
//!
//! | Hand | Effect |
//! |------|--------|
//! | Open palm (4 fingers) | scatter |
//! | Fist (0 fingers, no pinch) | assemble |
//! | Pinch while scattered | focus the next photo |
//! | Wrist offset while scattered | orbit the camera |
//!
//! ### Groups and policies
//!
//! Every group is a [`ParticleGroup`] with a [`GroupPolicy`]: orientation
//! behavior, burst strength and bias, spin, reassembly rate, and whether the
//! group can be focused. See [`groups`] for the tree's concrete groups.
//!
//! ### Threads
//!
//! Gesture sources run on their own thread and hand samples over through a
//! wait-free single-slot cell ([`sync`]). The tick never blocks. If the source
//! cannot start, the scene keeps running on manual toggles.

pub mod camera;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod focus;
pub mod gesture;
pub mod groups;
pub mod instance;
pub mod layout;
pub mod particle;
pub mod sampling;
pub mod scene;
pub mod snow;
pub mod source;
pub mod sync;

pub use bytemuck;
pub use camera::{CameraDelta, CameraIntentMapper, OrbitRig};
pub use config::SceneConfig;
pub use engine::{FrameInput, Viewpoint};
pub use error::{ConfigError, Error, LandmarkError, Result, SourceError};
pub use focus::FocusSelector;
pub use gesture::{GestureClassifier, GestureSample, HandFrame};
pub use glam::{Quat, Vec2, Vec3, Vec4};
pub use layout::{LayoutSnapshot, LayoutState, LayoutStateMachine, Transition};
pub use particle::{GroupKind, GroupPolicy, OrientationPolicy, Particle, ParticleGroup};
pub use scene::{Scene, TickReport};

pub mod prelude {
    pub use crate::camera::{CameraDelta, CameraIntentMapper, OrbitRig};
    pub use crate::clock::{Clock, FrameClock, ManualClock, MonotonicClock};
    pub use crate::config::{
        CameraConfig, GestureConfig, PhysicsConfig, SceneConfig, SnowConfig, TreeConfig,
    };
    pub use crate::engine::{FrameInput, Viewpoint};
    pub use crate::error::{ConfigError, LandmarkError, SourceError};
    pub use crate::focus::FocusSelector;
    pub use crate::gesture::{GestureClassifier, GestureSample, HandFrame};
    pub use crate::groups::{OrnamentKind, TreeGroups};
    pub use crate::instance::InstanceRaw;
    pub use crate::layout::{
        EdgeAction, LayoutCommand, LayoutSnapshot, LayoutState, LayoutStateMachine, Transition,
    };
    pub use crate::particle::{GroupKind, GroupPolicy, OrientationPolicy, Particle, ParticleGroup};
    pub use crate::sampling::Sampler;
    pub use crate::scene::{tree_sway, Scene, TickReport};
    pub use crate::source::{spawn_gesture_source, GestureSource, ScriptedSource, UnavailableSource};
    pub use crate::sync::{Capability, GestureFeed, LatestCell, LatestCursor, SharedLayout};
    pub use crate::{Quat, Vec2, Vec3, Vec4};
}
