use super::block::{Block, BlockId, Direction};
use super::material::MaterialTable;
use super::render_info::RenderInfoCache;
use crate::utils::{ChunkIndex, LocalCoord, WorldCoord};

/// Inclusive horizontal extent of the generated world plus its height
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldBounds {
    pub min: i32,
    pub max: i32,
    pub depth: i32,
}

impl WorldBounds {
    pub fn contains(&self, coord: &WorldCoord) -> bool {
        (self.min..=self.max).contains(&coord.0)
            && (self.min..=self.max).contains(&coord.2)
            && (0..self.depth).contains(&coord.1)
    }
}

/// One column of `chunk_size x depth x chunk_size` cells. Cells outside the
/// world bounds stay `None` so worlds need not be chunk aligned.
#[derive(Clone, Debug)]
pub struct Chunk {
    index: ChunkIndex,
    chunk_size: i32,
    depth: i32,
    blocks: Vec<Option<Block>>,

    // tracks number of non-air blocks (for skipping empty chunks while rendering)
    n_active_blocks: usize,
}

impl Chunk {
    /// creates a chunk with every cell unallocated
    pub fn new(index: ChunkIndex, chunk_size: i32, depth: i32) -> Self {
        let n_blocks = (chunk_size * chunk_size * depth).max(0) as usize;
        Self {
            index,
            chunk_size,
            depth,
            blocks: vec![None; n_blocks],
            n_active_blocks: 0,
        }
    }

    /// Allocates an air block at its world position for every cell inside `bounds`
    pub fn generate(&mut self, bounds: &WorldBounds) {
        for x in 0..self.chunk_size {
            for z in 0..self.chunk_size {
                for y in 0..self.depth {
                    let local = LocalCoord(x, y, z);
                    let coord = self.world_coord(local);
                    if let Some(idx) = self.block_idx(local) {
                        self.blocks[idx] = bounds.contains(&coord).then(|| Block::air(coord));
                    }
                }
            }
        }
        self.n_active_blocks = 0;
    }

    pub fn index(&self) -> ChunkIndex {
        self.index
    }

    pub fn depth(&self) -> i32 {
        self.depth
    }

    pub fn is_empty(&self) -> bool {
        self.n_active_blocks == 0
    }

    pub fn n_active_blocks(&self) -> usize {
        self.n_active_blocks
    }

    pub fn world_coord(&self, local: LocalCoord) -> WorldCoord {
        let origin = self.index.to_world_coord(local.1, self.chunk_size);
        WorldCoord(origin.0 + local.0, origin.1, origin.2 + local.2)
    }

    fn block_idx(&self, local: LocalCoord) -> Option<usize> {
        let LocalCoord(x, y, z) = local;
        let in_range = (0..self.chunk_size).contains(&x)
            && (0..self.chunk_size).contains(&z)
            && (0..self.depth).contains(&y);
        in_range.then(|| ((x * self.depth + y) * self.chunk_size + z) as usize)
    }

    pub fn get_block(&self, local: LocalCoord) -> Option<&Block> {
        self.block_idx(local).and_then(|idx| self.blocks[idx].as_ref())
    }

    /// Sets the id of an allocated cell; out-of-range and placeholder cells are a no-op
    pub fn set_block(&mut self, local: LocalCoord, id: BlockId, materials: &MaterialTable) -> bool {
        let Some(idx) = self.block_idx(local) else {
            return false;
        };
        let Some(block) = self.blocks[idx].as_mut() else {
            return false;
        };

        // keep track of active blocks count
        match (block.is_active(), id != 0) {
            (false, true) => self.n_active_blocks += 1,
            (true, false) => self.n_active_blocks -= 1,
            _ => {}
        }

        block.set_block_id(id, materials);
        true
    }

    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter().flatten()
    }

    /// Adds render info for every visible block to `cache`, returning the face count added
    pub fn get_render_infos<'a, F>(&self, neighbor: F, tile_map_size: u32, cache: &mut RenderInfoCache) -> usize
    where
        F: Fn(WorldCoord) -> Option<&'a Block>,
    {
        if self.is_empty() {
            return 0;
        }

        let mut count = 0;
        for block in self.blocks().filter(|b| b.is_solid_voxel()) {
            let coord = block.coord();
            let info = block.compute_face_render_info(
                |direction: Direction| neighbor(coord.offset(direction.vector())),
                tile_map_size,
            );
            if let Some(info) = info {
                count += info.faces.len();
                cache.replace(coord, Some(info));
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::world::block::ids;

    fn chunk(bounds: &WorldBounds) -> Chunk {
        let mut chunk = Chunk::new(ChunkIndex(0, 0), 4, 3);
        chunk.generate(bounds);
        chunk
    }

    #[test]
    fn test_generate_places_blocks_at_world_coords() {
        let bounds = WorldBounds { min: -10, max: 10, depth: 3 };
        let chunk = chunk(&bounds);
        // chunk 0 of size 4 spans -1..=2
        let block = chunk.get_block(LocalCoord(0, 2, 3)).unwrap();
        assert_eq!(block.coord(), WorldCoord(-1, 2, 2));
        assert!(!block.is_active());
        assert_eq!(chunk.blocks().count(), 4 * 4 * 3);
    }

    #[test]
    fn test_cells_outside_bounds_are_placeholders() {
        let bounds = WorldBounds { min: 0, max: 1, depth: 3 };
        let chunk = chunk(&bounds);
        assert!(chunk.get_block(LocalCoord(0, 0, 0)).is_none(), "x = -1 is outside the world");
        assert!(chunk.get_block(LocalCoord(1, 0, 1)).is_some());
        assert_eq!(chunk.blocks().count(), 2 * 2 * 3);
    }

    #[test]
    fn test_out_of_range_access() {
        let bounds = WorldBounds { min: -10, max: 10, depth: 3 };
        let materials = MaterialTable::default();
        let mut chunk = chunk(&bounds);
        assert!(chunk.get_block(LocalCoord(4, 0, 0)).is_none());
        assert!(chunk.get_block(LocalCoord(0, 3, 0)).is_none());
        assert!(chunk.get_block(LocalCoord(0, -1, 0)).is_none());
        assert!(!chunk.set_block(LocalCoord(0, 3, 0), ids::STONE, &materials));
    }

    #[test]
    fn test_active_count() {
        let bounds = WorldBounds { min: -10, max: 10, depth: 3 };
        let materials = MaterialTable::default();
        let mut chunk = chunk(&bounds);
        assert!(chunk.is_empty());

        assert!(chunk.set_block(LocalCoord(1, 1, 1), ids::STONE, &materials));
        assert!(chunk.set_block(LocalCoord(1, 1, 1), ids::DIRT, &materials));
        assert!(chunk.set_block(LocalCoord(2, 1, 1), -1, &materials));
        assert_eq!(chunk.n_active_blocks(), 2);

        chunk.set_block(LocalCoord(1, 1, 1), ids::AIR, &materials);
        assert_eq!(chunk.n_active_blocks(), 1);
        assert_eq!(chunk.get_block(LocalCoord(2, 1, 1)).unwrap().id(), -1);
    }

    #[test]
    fn test_render_infos_single_block() {
        let bounds = WorldBounds { min: -10, max: 10, depth: 3 };
        let materials = MaterialTable::default();
        let mut chunk = chunk(&bounds);
        chunk.set_block(LocalCoord(1, 1, 1), ids::STONE, &materials);

        let mut cache = RenderInfoCache::new();
        let count = chunk.get_render_infos(|_| None, 16, &mut cache);
        assert_eq!(count, 6);
        assert_eq!(cache.render_count(), 6);
        assert!(cache.get(&chunk.world_coord(LocalCoord(1, 1, 1))).is_some());
    }
}
