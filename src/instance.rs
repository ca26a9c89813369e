//! Per-instance records for a renderer.
//!
//! The scene does not draw anything itself. After each tick a renderer can
//! flatten any group into [`InstanceRaw`] records and upload the bytes as an
//! instance buffer: one record per particle, 64 bytes laid out as four
//! 16-byte rows (position and variant, rotation, scale and padding, color).
//! The struct itself is only 4-byte aligned.

use bytemuck::{Pod, Zeroable};

use crate::groups::{figurine_kind, ornament_kind};
use crate::particle::{GroupKind, Particle, ParticleGroup};
use crate::snow::Snowfall;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct InstanceRaw {
    pub position: [f32; 3],
    /// Mesh variant within the group (see [`OrnamentKind`](crate::groups::OrnamentKind)).
    pub variant: u32,
    /// Quaternion `[x, y, z, w]`.
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
    pub _pad0: f32,
    /// RGB plus brightness in alpha.
    pub color: [f32; 4],
}

impl InstanceRaw {
    /// Record for one particle with the given mesh variant and alpha.
    pub fn from_particle(particle: &Particle, variant: u32, alpha: f32) -> Self {
        Self {
            position: particle.position.to_array(),
            variant,
            rotation: particle.orientation.to_array(),
            scale: particle.scale.to_array(),
            _pad0: 0.0,
            color: particle.color.extend(alpha).to_array(),
        }
    }
}

/// Append one record per particle of `group` to `out`.
///
/// Lights carry their twinkle brightness at `elapsed` in the alpha channel;
/// ornaments and figurines carry their mesh variant.
pub fn write_instances(group: &ParticleGroup, elapsed: f32, out: &mut Vec<InstanceRaw>) {
    let count = group.len();
    out.reserve(count);
    for (i, particle) in group.iter().enumerate() {
        let variant = match group.kind() {
            GroupKind::Ornaments => ornament_kind(i, count) as u32,
            GroupKind::Figurines => figurine_kind(i) as u32,
            _ => 0,
        };
        let alpha = match group.kind() {
            GroupKind::Lights => particle.twinkle(elapsed),
            _ => 1.0,
        };
        out.push(InstanceRaw::from_particle(particle, variant, alpha));
    }
}

/// Append one white record per snowflake.
pub fn write_snow(snow: &Snowfall, out: &mut Vec<InstanceRaw>) {
    out.extend(snow.flakes().iter().map(|flake| InstanceRaw {
        position: flake.position.to_array(),
        rotation: [0.0, 0.0, 0.0, 1.0],
        scale: [1.0; 3],
        color: [1.0; 4],
        ..InstanceRaw::default()
    }));
}

/// Raw bytes for GPU upload.
pub fn as_bytes(instances: &[InstanceRaw]) -> &[u8] {
    bytemuck::cast_slice(instances)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SnowConfig, TreeConfig};
    use crate::groups::{self, OrnamentKind};
    use crate::sampling::Sampler;

    #[test]
    fn test_instance_layout() {
        assert_eq!(std::mem::size_of::<InstanceRaw>(), 64);
        assert_eq!(std::mem::align_of::<InstanceRaw>(), 4);
    }

    #[test]
    fn test_figurine_variants() {
        let group = groups::figurines(&TreeConfig::default(), &mut Sampler::new(3));
        let mut out = Vec::new();
        write_instances(&group, 0.0, &mut out);
        assert_eq!(out.len(), 7);
        assert_eq!(out[0].variant, OrnamentKind::Stocking as u32);
        assert_eq!(out[6].variant, OrnamentKind::Reindeer as u32);
        assert_eq!(out[0].color[3], 1.0);
    }

    #[test]
    fn test_lights_twinkle_in_alpha() {
        let group = groups::lights(&TreeConfig::default(), &mut Sampler::new(3));
        let mut out = Vec::new();
        write_instances(&group, 2.5, &mut out);
        for (raw, light) in out.iter().zip(group.iter()) {
            assert_eq!(raw.color[3], light.twinkle(2.5));
        }
    }

    #[test]
    fn test_bytes_cover_all_records() {
        let snow = Snowfall::new(SnowConfig::default(), &mut Sampler::new(1));
        let mut out = Vec::new();
        write_snow(&snow, &mut out);
        assert_eq!(as_bytes(&out).len(), snow.len() * 64);
    }
}
