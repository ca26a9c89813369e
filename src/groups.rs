//! Builders for the groups that make up the tree.
//!
//! Each builder lays its particles out on the assembled tree, assigns colors
//! and sizes, and attaches the [`GroupPolicy`] that gives the group its
//! character when scattered:
//!
//! | Group | Layout | Orientation | Burst |
//! |-------|--------|-------------|-------|
//! | Foliage | cone volume | fixed points | 1.2x |
//! | Ornaments | cone volume | tumble | 1x, slower reassembly |
//! | Figurines | cone volume | face outward | 1x, slower reassembly |
//! | Lights | cone volume, pushed 2% out | fixed points | 1x |
//! | Topper | apex | upright, spinning | 1x, biased up |
//! | Photos | spiral around the cone | face outward, tilted | 0.5x, focusable |

use glam::Vec3;
use rand::Rng;

use crate::config::TreeConfig;
use crate::particle::{GroupKind, GroupPolicy, OrientationPolicy, Particle, ParticleGroup};
use crate::sampling::{spiral_position, Sampler};

// ============================================================================
// PALETTE
// ============================================================================

macro_rules! hex_color {
    ($rgb:expr) => {
        Vec3::new(
            (($rgb >> 16) & 0xff) as f32 / 255.0,
            (($rgb >> 8) & 0xff) as f32 / 255.0,
            ($rgb & 0xff) as f32 / 255.0,
        )
    };
}

/// `0xRRGGBB` to RGB in `[0, 1]`.
pub fn hex(rgb: u32) -> Vec3 {
    hex_color!(rgb)
}

pub const EMERALD_DEEP: Vec3 = hex_color!(0x022b1c_u32);
pub const EMERALD_LIGHT: Vec3 = hex_color!(0x106b46_u32);
pub const EMERALD_VIBRANT: Vec3 = hex_color!(0x2ecc71_u32);
pub const GOLD_METALLIC: Vec3 = hex_color!(0xffd700_u32);
pub const GOLD_CHAMPAGNE: Vec3 = hex_color!(0xf7e7ce_u32);
pub const BROWN_REINDEER: Vec3 = hex_color!(0x8b4513_u32);
pub const RED_STOCKING: Vec3 = hex_color!(0xd32f2f_u32);

// ============================================================================
// LAYOUT CONSTANTS
// ============================================================================

pub const STOCKING_COUNT: usize = 3;
pub const REINDEER_COUNT: usize = 4;

/// Photo spiral proportions relative to the tree.
const SPIRAL_HEIGHT_SCALE: f32 = 1.1;
const SPIRAL_RADIUS_SCALE: f32 = 1.05;
const SPIRAL_TOP_RADIUS: f32 = 0.5;
const SPIRAL_TURNS: f32 = 4.5;
const PHOTO_TILT: f32 = -0.15;

const LIGHT_PUSH_OUT: f32 = 1.02;
const TOPPER_LIFT: f32 = 0.5;
const TOPPER_YAW_RATE: f32 = 0.02;

/// Mesh family of an ornament.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum OrnamentKind {
    Bauble = 0,
    Gift = 1,
    CandyCane = 2,
    Stocking = 3,
    Reindeer = 4,
}

/// Kind of the `index`th of `count` tumbling ornaments: the first 40% are
/// baubles, the next 30% gifts, the rest candy canes.
pub fn ornament_kind(index: usize, count: usize) -> OrnamentKind {
    let baubles = count * 4 / 10;
    let gifts = count * 7 / 10;
    if index < baubles {
        OrnamentKind::Bauble
    } else if index < gifts {
        OrnamentKind::Gift
    } else {
        OrnamentKind::CandyCane
    }
}

/// Kind of the `index`th figurine: stockings first, then reindeer.
pub fn figurine_kind(index: usize) -> OrnamentKind {
    if index < STOCKING_COUNT {
        OrnamentKind::Stocking
    } else {
        OrnamentKind::Reindeer
    }
}

// ============================================================================
// BUILDERS
// ============================================================================

/// Needle points filling the cone.
pub fn foliage(tree: &TreeConfig, sampler: &mut Sampler) -> ParticleGroup {
    let particles = (0..tree.particle_count)
        .map(|_| {
            let roll = sampler.random();
            let color = if roll > 0.95 {
                GOLD_METALLIC
            } else if roll > 0.7 {
                EMERALD_VIBRANT
            } else if roll > 0.4 {
                EMERALD_LIGHT
            } else {
                EMERALD_DEEP
            };
            Particle::new(sampler.in_cone(tree.height, tree.bottom_radius))
                .with_color(color)
                .with_uniform_scale(sampler.range(0.2, 0.6))
        })
        .collect();

    let policy = GroupPolicy::default()
        .with_orientation(OrientationPolicy::Fixed)
        .with_burst_scale(1.2);
    ParticleGroup::new(GroupKind::Foliage, policy, particles, seed(sampler))
}

/// Baubles, gifts and candy canes. Tumble freely when scattered.
pub fn ornaments(tree: &TreeConfig, sampler: &mut Sampler) -> ParticleGroup {
    let count = misc_ornament_count(tree);
    let particles = (0..count)
        .map(|i| {
            let target = sampler.in_cone(tree.height, tree.bottom_radius);
            let orientation = sampler.rotation();
            let (color, size) = match ornament_kind(i, count) {
                OrnamentKind::Bauble => {
                    let gold = if sampler.random() > 0.5 {
                        GOLD_METALLIC
                    } else {
                        GOLD_CHAMPAGNE
                    };
                    (gold, sampler.range(0.25, 0.45))
                }
                OrnamentKind::Gift => (Vec3::ONE, sampler.range(0.5, 0.8)),
                _ => (Vec3::ONE, sampler.range(0.3, 0.5)),
            };
            Particle::new(target)
                .with_orientation(orientation)
                .with_color(color)
                .with_uniform_scale(size)
        })
        .collect();

    let policy = GroupPolicy::default()
        .with_spin(0.2)
        .with_reassembly_scale(0.8);
    ParticleGroup::new(GroupKind::Ornaments, policy, particles, seed(sampler))
}

/// Stockings and reindeer. Settle facing away from the trunk.
pub fn figurines(tree: &TreeConfig, sampler: &mut Sampler) -> ParticleGroup {
    let count = (STOCKING_COUNT + REINDEER_COUNT).min(tree.ornament_count);
    let particles = (0..count)
        .map(|i| {
            let target = sampler.in_cone(tree.height, tree.bottom_radius);
            let (color, size) = match figurine_kind(i) {
                OrnamentKind::Stocking => (RED_STOCKING, 0.6),
                _ => (BROWN_REINDEER, 0.7),
            };
            Particle::new(target)
                .with_orientation(sampler.yaw())
                .with_color(color)
                .with_uniform_scale(size)
        })
        .collect();

    let policy = GroupPolicy::default()
        .with_orientation(OrientationPolicy::FaceOutward { tilt: 0.0 })
        .with_spin(0.2)
        .with_reassembly_scale(0.8);
    ParticleGroup::new(GroupKind::Figurines, policy, particles, seed(sampler))
}

/// Twinkling lights sitting just outside the foliage.
pub fn lights(tree: &TreeConfig, sampler: &mut Sampler) -> ParticleGroup {
    let particles = (0..tree.light_count)
        .map(|_| {
            let target = sampler.in_cone(tree.height, tree.bottom_radius) * LIGHT_PUSH_OUT;
            Particle::new(target)
                .with_color(GOLD_METALLIC)
                .with_uniform_scale(0.08)
                .with_phase(sampler.range(0.0, 100.0))
                .with_tempo(sampler.range(2.0, 7.0))
        })
        .collect();

    let policy = GroupPolicy::default().with_orientation(OrientationPolicy::Fixed);
    ParticleGroup::new(GroupKind::Lights, policy, particles, seed(sampler))
}

/// The star on top.
pub fn topper(tree: &TreeConfig, sampler: &mut Sampler) -> ParticleGroup {
    let apex = Vec3::new(0.0, tree.height / 2.0 + TOPPER_LIFT, 0.0);
    let particles = vec![Particle::new(apex).with_color(GOLD_METALLIC)];

    let policy = GroupPolicy::default()
        .with_orientation(OrientationPolicy::Upright {
            yaw_rate: TOPPER_YAW_RATE,
        })
        .with_burst_bias(Vec3::new(0.0, 0.5, 0.0))
        .with_spin(0.2);
    ParticleGroup::new(GroupKind::Topper, policy, particles, seed(sampler))
}

/// Photo panels on a spiral wrapped around the tree.
pub fn photos(tree: &TreeConfig, sampler: &mut Sampler) -> ParticleGroup {
    let count = tree.photo_count;
    let height = tree.height * SPIRAL_HEIGHT_SCALE;
    let bottom_radius = tree.bottom_radius * SPIRAL_RADIUS_SCALE;

    let particles = (0..count)
        .map(|i| {
            let t = if count > 1 {
                i as f32 / (count - 1) as f32
            } else {
                0.0
            };
            let target = spiral_position(t, height, SPIRAL_TOP_RADIUS, bottom_radius, SPIRAL_TURNS);
            Particle::new(target)
                .with_orientation(sampler.yaw())
                .with_aspect(1.0)
        })
        .collect();

    let policy = GroupPolicy::default()
        .with_orientation(OrientationPolicy::FaceOutward { tilt: PHOTO_TILT })
        .with_burst_scale(0.5)
        .with_spin(0.1)
        .focusable();
    ParticleGroup::new(GroupKind::Photos, policy, particles, seed(sampler))
}

fn misc_ornament_count(tree: &TreeConfig) -> usize {
    tree.ornament_count
        .saturating_sub(STOCKING_COUNT + REINDEER_COUNT)
}

/// Derive an independent stream for a group's bursts.
fn seed(sampler: &mut Sampler) -> u64 {
    sampler.rng().gen()
}

// ============================================================================
// TREE
// ============================================================================

/// Every group on the tree, built from one sampler.
#[derive(Clone, Debug)]
pub struct TreeGroups {
    pub foliage: ParticleGroup,
    pub ornaments: ParticleGroup,
    pub figurines: ParticleGroup,
    pub lights: ParticleGroup,
    pub topper: ParticleGroup,
    pub photos: ParticleGroup,
}

impl TreeGroups {
    /// Build every group from one sampler, in render order.
    pub fn build(tree: &TreeConfig, sampler: &mut Sampler) -> Self {
        Self {
            foliage: foliage(tree, sampler),
            ornaments: ornaments(tree, sampler),
            figurines: figurines(tree, sampler),
            lights: lights(tree, sampler),
            topper: topper(tree, sampler),
            photos: photos(tree, sampler),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParticleGroup> {
        [
            &self.foliage,
            &self.ornaments,
            &self.figurines,
            &self.lights,
            &self.topper,
            &self.photos,
        ]
        .into_iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ParticleGroup> {
        [
            &mut self.foliage,
            &mut self.ornaments,
            &mut self.figurines,
            &mut self.lights,
            &mut self.topper,
            &mut self.photos,
        ]
        .into_iter()
    }

    /// Total particles across all groups.
    pub fn particle_count(&self) -> usize {
        self.iter().map(ParticleGroup::len).sum()
    }

    /// Set a photo's width-over-height ratio once its image is known.
    /// Returns `false` for an out-of-range index or a degenerate ratio.
    pub fn set_photo_aspect(&mut self, index: usize, aspect: f32) -> bool {
        if !(aspect.is_finite() && aspect > 0.0) {
            return false;
        }
        match self.photos.particles_mut().get_mut(index) {
            Some(panel) => {
                panel.aspect = aspect;
                true
            }
            None => false,
        }
    }
}
