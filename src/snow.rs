//! Ambient snowfall.
//!
//! Flakes fall at their own speed through a square column around the tree,
//! sway sideways, and wrap from the floor back to the ceiling. Snow ignores
//! the layout entirely.

use glam::Vec3;

use crate::config::SnowConfig;
use crate::sampling::Sampler;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Flake {
    pub position: Vec3,
    /// Fall per tick.
    pub speed: f32,
    /// Sway phase.
    pub offset: f32,
}

/// Fixed population of falling flakes.
#[derive(Clone, Debug)]
pub struct Snowfall {
    flakes: Vec<Flake>,
    config: SnowConfig,
}

impl Snowfall {
    /// Scatter `config.count` flakes through the snow volume.
    pub fn new(config: SnowConfig, sampler: &mut Sampler) -> Self {
        let flakes = (0..config.count)
            .map(|_| Flake {
                position: Vec3::new(
                    sampler.range(-config.spread, config.spread),
                    sampler.range(config.floor, config.ceiling),
                    sampler.range(-config.spread, config.spread),
                ),
                speed: sampler.range(config.min_speed, config.max_speed),
                offset: sampler.range(0.0, 100.0),
            })
            .collect();
        Self { flakes, config }
    }

    /// Advance one tick at `elapsed` seconds.
    pub fn tick(&mut self, elapsed: f32) {
        let sway = self.config.sway;
        for flake in self.flakes.iter_mut() {
            flake.position.y -= flake.speed;
            flake.position.x += (elapsed + flake.offset).sin() * sway;
            flake.position.z += (elapsed + flake.offset * 0.5).cos() * sway;

            if flake.position.y < self.config.floor {
                flake.position.y = self.config.ceiling;
            }
        }
    }

    pub fn flakes(&self) -> &[Flake] {
        &self.flakes
    }

    pub fn len(&self) -> usize {
        self.flakes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flakes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flakes_start_in_volume() {
        let config = SnowConfig::default();
        let snow = Snowfall::new(config.clone(), &mut Sampler::new(4));
        assert_eq!(snow.len(), 1_000);
        for flake in snow.flakes() {
            assert!(flake.position.x.abs() <= config.spread);
            assert!(flake.position.y >= config.floor && flake.position.y < config.ceiling);
            assert!(flake.speed >= config.min_speed && flake.speed < config.max_speed);
        }
    }

    #[test]
    fn test_flakes_wrap_to_ceiling() {
        let config = SnowConfig::default();
        let mut snow = Snowfall::new(config.clone(), &mut Sampler::new(4));
        for tick in 0..5_000 {
            snow.tick(tick as f32 / 60.0);
            for flake in snow.flakes() {
                assert!(flake.position.y >= config.floor && flake.position.y <= config.ceiling);
            }
        }
    }

    #[test]
    fn test_flake_falls_by_speed() {
        let mut snow = Snowfall::new(SnowConfig::default(), &mut Sampler::new(1));
        let before = snow.flakes()[0];
        snow.tick(0.0);
        let after = snow.flakes()[0];
        if before.position.y - before.speed >= SnowConfig::default().floor {
            assert!((after.position.y - (before.position.y - before.speed)).abs() < 1e-5);
        }
    }
}
