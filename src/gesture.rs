//! Hand-landmark gesture classification.
//!
//! A hand tracker delivers 21 normalized landmarks per frame (wrist, then four
//! joints per digit from thumb to pinky). [`classify`] reduces one frame to a
//! coarse [`GestureSample`]: how many non-thumb fingers are extended, whether
//! thumb and index are pinched together, and where the wrist is in the image.
//!
//! Distances are measured in the image plane (x, y); depth from monocular
//! trackers is too noisy to help.
//!
//! Classification is pure and stateless. Deciding what a sample *means* for the
//! layout is the job of [`LayoutStateMachine`](crate::layout::LayoutStateMachine).

use glam::{Vec2, Vec3};

use crate::config::GestureConfig;
use crate::error::LandmarkError;

// ============================================================================
// HAND LANDMARK INDICES
// ============================================================================

pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_TIP: usize = 20;

/// (tip, knuckle) pairs for the four non-thumb fingers.
pub const FINGERS: [(usize, usize); 4] = [
    (INDEX_TIP, INDEX_MCP),
    (MIDDLE_TIP, MIDDLE_MCP),
    (RING_TIP, RING_MCP),
    (PINKY_TIP, PINKY_MCP),
];

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// One validated frame of hand landmarks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HandFrame {
    points: [Vec3; LANDMARK_COUNT],
}

impl HandFrame {
    /// Validate a landmark slice: exactly 21 points, all coordinates finite.
    pub fn new(points: &[Vec3]) -> Result<Self, LandmarkError> {
        if points.len() != LANDMARK_COUNT {
            return Err(LandmarkError::WrongCount {
                expected: LANDMARK_COUNT,
                actual: points.len(),
            });
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(LandmarkError::NonFinite { index });
        }

        let mut frame = [Vec3::ZERO; LANDMARK_COUNT];
        frame.copy_from_slice(points);
        Ok(Self { points: frame })
    }

    /// Same as [`HandFrame::new`] for `[x, y, z]` triples as trackers emit them.
    pub fn from_triples(triples: &[[f32; 3]]) -> Result<Self, LandmarkError> {
        let points: Vec<Vec3> = triples.iter().copied().map(Vec3::from).collect();
        Self::new(&points)
    }

    #[inline]
    pub fn point(&self, index: usize) -> Vec3 {
        self.points[index]
    }

    /// Landmark projected onto the image plane.
    #[inline]
    pub fn planar(&self, index: usize) -> Vec2 {
        self.points[index].truncate()
    }

    /// All 21 landmarks.
    pub fn points(&self) -> &[Vec3; LANDMARK_COUNT] {
        &self.points
    }
}

/// Coarse reading of one hand frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GestureSample {
    /// Extended non-thumb fingers, 0..=4.
    pub openness: u8,
    pub pinching: bool,
    /// Wrist position in normalized image coordinates.
    pub wrist: Vec2,
}

impl GestureSample {
    /// Wrist position for synthetic samples.
    pub const CENTER: Vec2 = Vec2::new(0.5, 0.5);

    /// All four fingers extended, centered wrist.
    pub const OPEN_PALM: GestureSample = GestureSample {
        openness: 4,
        pinching: false,
        wrist: Self::CENTER,
    };

    /// All fingers curled, centered wrist.
    pub const FIST: GestureSample = GestureSample {
        openness: 0,
        pinching: false,
        wrist: Self::CENTER,
    };

    /// Thumb and index touching, centered wrist.
    pub const PINCH: GestureSample = GestureSample {
        openness: 1,
        pinching: true,
        wrist: Self::CENTER,
    };

    /// Same gesture with the wrist moved to `wrist`.
    pub fn with_wrist(mut self, wrist: Vec2) -> Self {
        self.wrist = wrist;
        self
    }
}

/// Whether the finger with the given landmarks is extended.
///
/// Strict comparison: a tip exactly at `open_ratio` times the knuckle
/// distance counts as curled.
pub fn finger_open(frame: &HandFrame, tip: usize, knuckle: usize, open_ratio: f32) -> bool {
    let wrist = frame.planar(WRIST);
    let tip_distance = frame.planar(tip).distance(wrist);
    let knuckle_distance = frame.planar(knuckle).distance(wrist);
    tip_distance > knuckle_distance * open_ratio
}

/// Reduce one frame to a [`GestureSample`].
pub fn classify(frame: &HandFrame, config: &GestureConfig) -> GestureSample {
    let openness = FINGERS
        .iter()
        .filter(|(tip, knuckle)| finger_open(frame, *tip, *knuckle, config.open_ratio))
        .count() as u8;

    let pinch_distance = frame.planar(THUMB_TIP).distance(frame.planar(INDEX_TIP));

    GestureSample {
        openness,
        pinching: pinch_distance < config.pinch_threshold,
        wrist: frame.planar(WRIST),
    }
}

/// [`classify`] bound to a configuration, for producer threads.
#[derive(Clone, Debug, Default)]
pub struct GestureClassifier {
    config: GestureConfig,
}

impl GestureClassifier {
    pub fn new(config: GestureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Classify an already validated frame.
    pub fn classify(&self, frame: &HandFrame) -> GestureSample {
        classify(frame, &self.config)
    }

    /// Validate and classify raw points in one step.
    pub fn classify_points(&self, points: &[Vec3]) -> Result<GestureSample, LandmarkError> {
        HandFrame::new(points).map(|frame| self.classify(&frame))
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Synthetic hands for tests.

    use super::*;

    /// Hand with the wrist at `wrist`, knuckles 0.1 above it, and each finger's
    /// tip placed at `reach[i]` times the knuckle distance. The thumb sits far
    /// from the index tip unless `pinch` is set.
    pub fn hand(wrist: Vec2, reach: [f32; 4], pinch: bool) -> Vec<Vec3> {
        let mut points = vec![wrist.extend(0.0); LANDMARK_COUNT];
        for (finger, (tip, knuckle)) in FINGERS.iter().enumerate() {
            let spread = (finger as f32 - 1.5) * 0.02;
            let dir = Vec2::new(spread, -0.1);
            let dist = dir.length();
            points[*knuckle] = (wrist + dir).extend(0.0);
            points[*tip] = (wrist + dir / dist * dist * reach[finger]).extend(0.0);
        }
        points[THUMB_TIP] = if pinch {
            points[INDEX_TIP] + Vec3::new(0.01, 0.0, 0.0)
        } else {
            (wrist + Vec2::new(0.2, 0.0)).extend(0.0)
        };
        points
    }

    pub fn open_hand(wrist: Vec2) -> Vec<Vec3> {
        hand(wrist, [2.0; 4], false)
    }

    pub fn fist(wrist: Vec2) -> Vec<Vec3> {
        hand(wrist, [0.8; 4], false)
    }
}
