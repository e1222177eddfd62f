use std::collections::HashMap;

use glam::Mat4;

use super::block::Direction;
use crate::utils::WorldCoord;

#[derive(Debug, Clone, PartialEq)]
pub struct FaceRenderInfo {
    pub direction: Direction,
    /// atlas tile offset, in tiles
    pub uv_offset: [f32; 2],
    pub ambient: f32,
    pub transform: Mat4,
    pub transparent: bool,
}

/// Visible faces of one block plus a hash of everything they were derived
/// from: face mask (bits 0..6), liquid surface (bit 6), block id (bits 8..)
#[derive(Debug, Clone, PartialEq)]
pub struct BlockRenderInfo {
    pub hash: u64,
    pub faces: Vec<FaceRenderInfo>,
}

/// Per-block visible faces keyed by world coordinate. `render_count` always
/// equals the sum of face counts over all entries.
#[derive(Debug, Clone, Default)]
pub struct RenderInfoCache {
    entries: HashMap<WorldCoord, BlockRenderInfo>,
    render_count: usize,
}

impl RenderInfoCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, coord: &WorldCoord) -> Option<&BlockRenderInfo> {
        self.entries.get(coord)
    }

    /// Stores `info` for `coord`, removing the entry when `None`, and returns
    /// whether the stored hash changed
    pub fn replace(&mut self, coord: WorldCoord, info: Option<BlockRenderInfo>) -> bool {
        let new_hash = info.as_ref().map(|i| i.hash);
        let added = info.as_ref().map_or(0, |i| i.faces.len());

        let old = match info {
            Some(info) => self.entries.insert(coord, info),
            None => self.entries.remove(&coord),
        };
        let removed = old.as_ref().map_or(0, |i| i.faces.len());

        self.render_count = self.render_count + added - removed;
        old.map(|i| i.hash) != new_hash
    }

    pub fn render_count(&self) -> usize {
        self.render_count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&WorldCoord, &BlockRenderInfo)> {
        self.entries.iter()
    }

    pub fn faces(&self) -> impl Iterator<Item = &FaceRenderInfo> {
        self.entries.values().flat_map(|info| info.faces.iter())
    }
}
