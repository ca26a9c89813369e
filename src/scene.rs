//! The whole tree, ticked once per frame.
//!
//! [`Scene`] owns every particle group, the snowfall, the layout state machine
//! and the focus selector. Gesture samples arrive through a [`GestureFeed`]
//! that a producer thread fills; manual toggles arrive through
//! [`Scene::toggle`]. Each [`Scene::tick`]:
//!
//! 1. reads the clock,
//! 2. feeds the newest unseen gesture sample to the state machine,
//! 3. applies any transition's edge actions and publishes the new layout,
//! 4. maps the wrist to a camera delta while scattered,
//! 5. integrates every group and the snow,
//! 6. sways the whole tree about Y while assembled ([`tree_sway`]).
//!
//! ```ignore
//! let mut scene = Scene::new(SceneConfig::default().with_seed(7))?;
//! let feed = scene.feed();
//! spawn_gesture_source(source, feed, scene.classifier().clone());
//!
//! let mut rig = OrbitRig::default();
//! loop {
//!     let report = scene.tick(&rig.viewpoint());
//!     if let Some(delta) = report.camera {
//!         rig.apply(delta);
//!     }
//! }
//! ```

use std::sync::Arc;

use glam::Quat;
use tracing::{debug, info};

use crate::camera::{CameraDelta, CameraIntentMapper};
use crate::clock::{Clock, FrameClock, MonotonicClock};
use crate::config::SceneConfig;
use crate::engine::{FrameInput, Viewpoint};
use crate::error::ConfigError;
use crate::focus::FocusSelector;
use crate::gesture::{GestureClassifier, GestureSample};
use crate::groups::TreeGroups;
use crate::instance::{write_instances, write_snow, InstanceRaw};
use crate::layout::{EdgeAction, LayoutSnapshot, LayoutState, LayoutStateMachine, Transition};
use crate::sampling::Sampler;
use crate::snow::Snowfall;
use crate::sync::{GestureFeed, LatestCursor, SharedLayout};

/// What happened during one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickReport {
    pub snapshot: LayoutSnapshot,
    /// Transition triggered by a gesture this tick.
    pub transition: Option<Transition>,
    /// Orbit request while scattered with a hand in view.
    pub camera: Option<CameraDelta>,
    /// Seconds since the first tick.
    pub elapsed: f32,
    /// Yaw of the whole tree in radians, for the renderer's root transform.
    pub tree_yaw: f32,
}

/// Peak yaw of the assembled tree's sway, in radians.
pub const SWAY_AMPLITUDE: f32 = 0.1;

/// Angular frequency of the sway, in radians per second.
pub const SWAY_RATE: f32 = 0.1;

/// Yaw of the swaying tree `elapsed` seconds in.
pub fn tree_sway(elapsed: f32) -> f32 {
    (elapsed * SWAY_RATE).sin() * SWAY_AMPLITUDE
}

pub struct Scene {
    config: SceneConfig,
    groups: TreeGroups,
    snow: Snowfall,
    machine: LayoutStateMachine,
    focus: FocusSelector,
    snapshot: LayoutSnapshot,
    shared: Arc<SharedLayout>,
    feed: GestureFeed,
    cursor: LatestCursor,
    mapper: CameraIntentMapper,
    classifier: GestureClassifier,
    clock: Box<dyn Clock>,
    frames: FrameClock,
    /// Held at its last value while dispersed.
    tree_yaw: f32,
}

impl Scene {
    /// Validate `config` and build every group.
    pub fn new(config: SceneConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut sampler = match config.seed {
            Some(seed) => Sampler::new(seed),
            None => Sampler::from_entropy(),
        };
        let groups = TreeGroups::build(&config.tree, &mut sampler);
        let snow = Snowfall::new(config.snow.clone(), &mut sampler);

        // placeholder panels count as focusable until real photos are known
        let focus = FocusSelector::new(groups.photos.len());
        let snapshot = LayoutSnapshot::new(LayoutState::Assembled, focus.focus(), 0);

        info!(
            particles = groups.particle_count(),
            snowflakes = snow.len(),
            seed = ?config.seed,
            "scene built"
        );

        Ok(Self {
            machine: LayoutStateMachine::new(config.gesture.debounce_ms),
            mapper: CameraIntentMapper::from_config(&config.gesture),
            classifier: GestureClassifier::new(config.gesture.clone()),
            shared: Arc::new(SharedLayout::new(snapshot)),
            feed: GestureFeed::new(),
            cursor: LatestCursor::new(),
            clock: Box::new(MonotonicClock::new()),
            frames: FrameClock::new(),
            tree_yaw: 0.0,
            config,
            groups,
            snow,
            focus,
            snapshot,
        })
    }

    /// Replace the time source (tests use a [`ManualClock`](crate::clock::ManualClock)).
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Advance the animation clock by a fixed step per tick instead of wall time.
    pub fn with_fixed_delta(mut self, delta: f32) -> Self {
        self.frames.set_fixed_delta(Some(delta));
        self
    }

    // ========== Inputs ==========

    /// Handle for a gesture producer.
    pub fn feed(&self) -> GestureFeed {
        self.feed.clone()
    }

    /// Classifier configured for this scene, for producer threads.
    pub fn classifier(&self) -> &GestureClassifier {
        &self.classifier
    }

    /// Publish a sample as if a producer had. Processed on the next tick.
    pub fn submit(&self, sample: GestureSample) {
        self.feed.publish(sample);
    }

    /// Manual toggle, subject to the same debounce as gestures.
    pub fn toggle(&mut self) -> Option<Transition> {
        let now = self.clock.now_ms();
        let transition = self.machine.toggle(now)?;
        self.apply(transition);
        Some(transition)
    }

    /// Number of photos that can be focused. Clamps the current focus.
    pub fn set_focusable_count(&mut self, count: usize) {
        self.focus.set_focusable_count(count.min(self.groups.photos.len()));
        self.snapshot.focus = self.focus.focus();
        self.shared.store(self.snapshot);
    }

    pub fn set_photo_aspect(&mut self, index: usize, aspect: f32) -> bool {
        self.groups.set_photo_aspect(index, aspect)
    }

    // ========== Tick ==========

    /// Advance everything one frame, viewed from `viewpoint`.
    pub fn tick(&mut self, viewpoint: &Viewpoint) -> TickReport {
        let now = self.clock.now_ms();
        let (elapsed, _) = self.frames.update(now);

        let transition = self
            .cursor
            .fresh(self.feed.samples())
            .and_then(|sample| self.machine.handle(&sample, now));
        if let Some(transition) = transition {
            self.apply(transition);
        }

        let camera = self
            .feed
            .latest()
            .and_then(|sample| self.mapper.map(self.machine.state(), sample.wrist));

        let frame = FrameInput::new(self.snapshot, elapsed, *viewpoint);
        for group in self.groups.iter_mut() {
            group.tick(&frame, &self.config.physics);
        }
        self.snow.tick(elapsed);

        if self.snapshot.state == LayoutState::Assembled {
            self.tree_yaw = tree_sway(elapsed);
        }

        TickReport {
            snapshot: self.snapshot,
            transition,
            camera,
            elapsed,
            tree_yaw: self.tree_yaw,
        }
    }

    fn apply(&mut self, transition: Transition) {
        for action in transition.actions() {
            match action {
                EdgeAction::AdvanceFocus => {
                    self.focus.on_focus_entry();
                }
                // groups reseed when they see the new epoch
                EdgeAction::Explode => {}
            }
        }
        self.snapshot = self.snapshot.advanced(transition.to, self.focus.focus());
        self.shared.store(self.snapshot);
        debug!(
            state = %transition.to,
            focus = ?self.snapshot.focus,
            epoch = self.snapshot.epoch,
            "layout published"
        );
    }

    // ========== Outputs ==========

    /// Layout as of the last applied transition.
    pub fn snapshot(&self) -> LayoutSnapshot {
        self.snapshot
    }

    /// Current layout state.
    pub fn state(&self) -> LayoutState {
        self.snapshot.state
    }

    /// Layout word readable from other threads.
    pub fn shared_layout(&self) -> Arc<SharedLayout> {
        Arc::clone(&self.shared)
    }

    /// Every particle group, in render order.
    pub fn groups(&self) -> &TreeGroups {
        &self.groups
    }

    /// Ambient snowfall, independent of the layout.
    pub fn snow(&self) -> &Snowfall {
        &self.snow
    }

    /// Which photo panel the next or current focus pulls.
    pub fn focus(&self) -> &FocusSelector {
        &self.focus
    }

    /// The validated configuration the scene was built from.
    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    /// Per-frame timing, including fps.
    pub fn frame_clock(&self) -> &FrameClock {
        &self.frames
    }

    /// Root yaw of the tree in radians; see [`tree_sway`].
    pub fn tree_yaw(&self) -> f32 {
        self.tree_yaw
    }

    /// [`Scene::tree_yaw`] as a rotation about Y.
    pub fn tree_rotation(&self) -> Quat {
        Quat::from_rotation_y(self.tree_yaw)
    }

    /// Whether only manual toggles can change the layout.
    pub fn is_manual_only(&self) -> bool {
        self.feed.is_degraded()
    }

    /// Flatten every group and the snow into instance records.
    pub fn write_instances(&self, out: &mut Vec<InstanceRaw>) {
        out.clear();
        for group in self.groups.iter() {
            write_instances(group, self.frames.elapsed(), out);
        }
        write_snow(&self.snow, out);
    }
}
