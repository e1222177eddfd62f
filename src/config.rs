use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::EngineError;
use crate::model::world::block::ids;

/// Full engine configuration. Every section falls back to its defaults, so a
/// partial JSON document only needs the values it overrides.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub world: WorldConfig,
    pub terrain: TerrainConfig,
    pub player: PlayerConfig,
    pub timing: TimingConfig,
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EngineError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.world.world_size < 1 {
            return Err(EngineError::InvalidWorldSize(self.world.world_size));
        }
        if self.world.chunk_size < 1 {
            return Err(EngineError::InvalidConfig(format!(
                "chunk_size must be positive, got {}",
                self.world.chunk_size
            )));
        }
        if self.world.map_height < 1 {
            return Err(EngineError::InvalidConfig(format!(
                "map_height must be positive, got {}",
                self.world.map_height
            )));
        }
        if self.world.tile_map_size == 0 {
            return Err(EngineError::InvalidConfig("tile_map_size must be positive".into()));
        }
        if self.player.quick_slots.is_empty() {
            return Err(EngineError::InvalidConfig("quick_slots must not be empty".into()));
        }
        if self.timing.fixed_steps_per_second <= 0.0 {
            return Err(EngineError::InvalidConfig(
                "fixed_steps_per_second must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub chunk_size: i32,
    pub map_height: i32,
    pub world_size: i32,
    /// Seeds the noise permutation table; equal seeds give equal terrain
    pub seed: u64,
    pub tile_map_size: u32,
    /// Chunks rendered around the viewer (Chebyshev, exclusive)
    pub view_distance: i32,
    pub max_propagation_radius: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_size: 16,
            map_height: 32,
            world_size: 320,
            seed: 0x5eed,
            tile_map_size: 16,
            view_distance: 8,
            max_propagation_radius: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    // Height field
    pub ground_min_level: f64,
    pub ground_max_level: f64,
    pub sea_level: i32,
    pub octaves: u32,
    pub amplitude: f64,
    pub frequency: f64,

    // Biome fields share the permutation table, shifted apart
    pub temperature_shift: [f64; 2],
    pub temperature_frequency: f64,
    pub beach_shift: [f64; 2],
    pub beach_frequency: f64,

    // Biome thresholds on normalized [0, 1] fields
    pub desert_temperature: f64,
    pub snow_temperature: f64,
    pub beach_threshold: f64,
    pub dirt_depth: i32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            ground_min_level: 8.0,
            ground_max_level: 26.0,
            sea_level: 14,
            octaves: 6,
            amplitude: 1.0,
            frequency: 0.012,

            temperature_shift: [10_000.0, -10_000.0],
            temperature_frequency: 0.004,
            beach_shift: [-20_000.0, 20_000.0],
            beach_frequency: 0.02,

            desert_temperature: 0.62,
            snow_temperature: 0.38,
            beach_threshold: 0.55,
            dirt_depth: 3,
        }
    }
}

/// Player tuning, in blocks and seconds
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub size: [f32; 3],
    /// Reach for breaking and placing blocks
    pub range: f32,
    pub ray_depth: usize,
    pub move_speed: f32,
    pub max_speed: f32,
    pub max_run_speed: f32,
    pub max_fall_speed: f32,
    pub max_swim_fall_speed: f32,
    pub jump_force: f32,
    pub swim_jump_force: f32,
    pub run_multiplier: f32,
    pub fly_speed_modifier: f32,
    pub swim_speed: f32,
    pub gravity: f32,
    /// Fraction of velocity left after one second
    pub damping: f32,
    pub swim_damping: f32,
    pub rest_threshold: f32,
    pub look_speed: f32,
    pub jump_delay: f32,
    pub block_set_delay: f32,
    pub quick_slots: Vec<i32>,
    pub spawn_height: f32,
    pub start_flying: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            size: [0.6, 1.8, 0.6],
            range: 4.0,
            ray_depth: 100,
            move_speed: 100.0,
            max_speed: 4.0,
            max_run_speed: 10.0,
            max_fall_speed: 30.0,
            max_swim_fall_speed: 10.0,
            jump_force: 8.3,
            swim_jump_force: 2.8,
            run_multiplier: 2.5,
            fly_speed_modifier: 1.5,
            swim_speed: 0.6,
            gravity: 9.80665 * 3.0,
            damping: 1.0 / 1000.0,
            swim_damping: 1.0 / 10.0,
            rest_threshold: 0.001,
            look_speed: std::f32::consts::TAU / 1200.0,
            jump_delay: 0.2,
            block_set_delay: 0.25,
            quick_slots: vec![
                ids::STONE,
                ids::GRASS,
                ids::DIRT,
                ids::COBBLESTONE,
                ids::PLANKS,
                ids::SAND,
                ids::GLASS,
                ids::BRICKS,
            ],
            spawn_height: 36.0,
            start_flying: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// 0 renders every display refresh
    pub frames_per_second: f64,
    pub ticks_per_second: f64,
    pub fixed_steps_per_second: f64,
    /// Catch-up steps beyond this in one frame are dropped
    pub max_fixed_steps_per_frame: u32,
    pub pointer_lock_cooldown: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            frames_per_second: 0.0,
            ticks_per_second: 60.0,
            fixed_steps_per_second: 120.0,
            max_fixed_steps_per_frame: 8,
            pointer_lock_cooldown: 1.5,
        }
    }
}
