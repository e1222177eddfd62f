// terrain.rs - column-based terrain generation
//
// Each (x, z) column samples three noise fields sharing one permutation table:
//
//   height      -> surface `level`
//   temperature -> desert / snow surfaces
//   beach       -> sand near and below sea level
//
// and every y in the column is then assigned by layer, bottom up:
//
//   y == 0                      bedrock
//   y <  level - dirt_depth     stone
//   y <  level                  dirt (sand on shores)
//   y == level                  surface block
//   level < y <= sea_level      water (ice on cold surfaces)
//   above                       air
//
// The result is a pure function of (seed, config, x, y, z).

use super::block::{ids, BlockId};
use super::noise::{NoiseField, PermutationTable};
use crate::config::TerrainConfig;

/// Noise samples for one world column
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Column {
    pub level: i32,
    pub temperature: f64,
    pub beach: f64,
}

pub struct TerrainGenerator {
    config: TerrainConfig,
    table: PermutationTable,
    height: NoiseField,
    temperature: NoiseField,
    beach: NoiseField,
}

impl TerrainGenerator {
    pub fn new(seed: u64, config: TerrainConfig) -> Self {
        let height = NoiseField::new(
            config.ground_min_level,
            config.ground_max_level,
            [0.0, 0.0],
            config.octaves,
            config.amplitude,
            config.frequency,
        );
        let temperature = NoiseField::new(
            0.0,
            1.0,
            config.temperature_shift,
            config.octaves,
            config.amplitude,
            config.temperature_frequency,
        );
        let beach = NoiseField::new(
            0.0,
            1.0,
            config.beach_shift,
            config.octaves,
            config.amplitude,
            config.beach_frequency,
        );

        Self {
            config,
            table: PermutationTable::new(seed),
            height,
            temperature,
            beach,
        }
    }

    pub fn config(&self) -> &TerrainConfig {
        &self.config
    }

    pub fn column(&self, x: i32, z: i32) -> Column {
        let (fx, fz) = (x as f64, z as f64);
        Column {
            level: (self.height.sample(&self.table, fx, fz).floor() as i32).max(1),
            temperature: self.temperature.sample(&self.table, fx, fz),
            beach: self.beach.sample(&self.table, fx, fz),
        }
    }

    pub fn block_at(&self, column: &Column, y: i32) -> BlockId {
        let c = &self.config;
        let level = column.level;
        let shore = level <= c.sea_level + 1;

        if y == 0 {
            ids::BEDROCK
        } else if y < level - c.dirt_depth {
            ids::STONE
        } else if y < level {
            if shore && column.beach > c.beach_threshold { ids::SAND } else { ids::DIRT }
        } else if y == level {
            self.surface_block(column)
        } else if y <= c.sea_level {
            if y == c.sea_level && column.temperature < c.snow_temperature { ids::ICE } else { ids::WATER }
        } else {
            ids::AIR
        }
    }

    fn surface_block(&self, column: &Column) -> BlockId {
        let c = &self.config;
        let underwater = column.level < c.sea_level;
        let shore = column.level <= c.sea_level + 1;

        if underwater {
            if column.beach > c.beach_threshold { ids::SAND } else { ids::GRAVEL }
        } else if shore && column.beach > c.beach_threshold {
            ids::SAND
        } else if column.temperature > c.desert_temperature {
            ids::SAND
        } else if column.temperature < c.snow_temperature {
            ids::SNOW
        } else {
            ids::GRASS
        }
    }

    pub fn block_id(&self, x: i32, y: i32, z: i32) -> BlockId {
        self.block_at(&self.column(x, z), y)
    }
}
