use std::collections::{HashSet, VecDeque};

use glam::Vec3;
use tracing::{debug, info};

use super::block::{ids, Block, BlockId, Direction};
use super::chunk::{Chunk, WorldBounds};
use super::collision::{Body, Collision};
use super::material::MaterialTable;
use super::models::{Footprint, ModelTable, PlacedModel};
use super::raycast::{world_raycast, RayIntersection};
use super::render_info::{BlockRenderInfo, RenderInfoCache};
use super::terrain::TerrainGenerator;
use crate::config::{TerrainConfig, WorldConfig};
use crate::error::EngineError;
use crate::utils::{chunk_index, get_min_max, ChunkIndex, WorldCoord};
use crate::view::mesh::InstanceMesh;

/// Outcome of one render-cache recheck
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct RenderUpdate {
    pub changed: bool,
    pub checked: usize,
}

/// Block hit by a pick ray plus the cell a new block would go into
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickedBlock {
    pub intersection: RayIntersection,
    pub id: BlockId,
    pub place_coord: WorldCoord,
}

impl PickedBlock {
    pub fn coord(&self) -> WorldCoord {
        self.intersection.coord
    }
}

/// Square grid of chunk columns centred on the origin, with the render-info
/// cache and instance mesh kept in sync with every block edit
pub struct World {
    chunk_size: i32,
    bounds: WorldBounds,
    min_chunk: i32,
    max_chunk: i32,
    /// row-major [x][z]
    chunks: Vec<Chunk>,

    materials: MaterialTable,
    tile_map_size: u32,
    max_propagation_radius: u32,

    render_infos: RenderInfoCache,
    mesh: Option<InstanceMesh>,
    mesh_version: u64,

    models: ModelTable,
}

impl World {
    /// Allocates every chunk and fills all in-world cells with air
    pub fn new(config: &WorldConfig, materials: MaterialTable) -> Result<Self, EngineError> {
        let (min, max) =
            get_min_max(config.world_size).ok_or(EngineError::InvalidWorldSize(config.world_size))?;
        if config.chunk_size < 1 || config.map_height < 1 {
            return Err(EngineError::InvalidConfig(format!(
                "chunk_size {} and map_height {} must be positive",
                config.chunk_size, config.map_height
            )));
        }

        let bounds = WorldBounds { min, max, depth: config.map_height };
        let min_chunk = chunk_index(min, config.chunk_size);
        let max_chunk = chunk_index(max, config.chunk_size);

        info!("world size [{min} ~ {max}] ({})", config.world_size);
        info!("chunk range [{min_chunk} ~ {max_chunk}] ({})", config.chunk_size);

        let mut chunks = Vec::new();
        for x in min_chunk..=max_chunk {
            for z in min_chunk..=max_chunk {
                let mut chunk = Chunk::new(ChunkIndex(x, z), config.chunk_size, config.map_height);
                chunk.generate(&bounds);
                chunks.push(chunk);
            }
        }

        Ok(Self {
            chunk_size: config.chunk_size,
            bounds,
            min_chunk,
            max_chunk,
            chunks,
            materials,
            tile_map_size: config.tile_map_size.max(1),
            max_propagation_radius: config.max_propagation_radius.max(1),
            render_infos: RenderInfoCache::new(),
            mesh: None,
            mesh_version: 0,
            models: ModelTable::new(),
        })
    }

    /// Allocates the world and fills it with terrain for `config.seed`
    pub fn generate(
        config: &WorldConfig,
        terrain: &TerrainConfig,
        materials: MaterialTable,
    ) -> Result<Self, EngineError> {
        let mut world = Self::new(config, materials)?;
        world.fill_terrain(&TerrainGenerator::new(config.seed, terrain.clone()));
        Ok(world)
    }

    pub fn fill_terrain(&mut self, generator: &TerrainGenerator) {
        let WorldBounds { min, max, depth } = self.bounds;
        for x in min..=max {
            for z in min..=max {
                let column = generator.column(x, z);
                for y in 0..depth {
                    self.set_block_id(WorldCoord(x, y, z), generator.block_at(&column, y));
                }
            }
        }
    }

    pub fn bounds(&self) -> WorldBounds {
        self.bounds
    }

    pub fn chunk_size(&self) -> i32 {
        self.chunk_size
    }

    pub fn depth(&self) -> i32 {
        self.bounds.depth
    }

    pub fn materials(&self) -> &MaterialTable {
        &self.materials
    }

    // ========================================================================
    // CHUNK AND BLOCK ACCESS
    // ========================================================================

    fn chunk_slot(&self, index: ChunkIndex) -> Option<usize> {
        let range = self.min_chunk..=self.max_chunk;
        if !range.contains(&index.0) || !range.contains(&index.1) {
            return None;
        }
        let width = (self.max_chunk - self.min_chunk + 1) as usize;
        Some((index.0 - self.min_chunk) as usize * width + (index.1 - self.min_chunk) as usize)
    }

    /// Chunk holding world column (x, z)
    pub fn get_chunk(&self, x: i32, z: i32) -> Option<&Chunk> {
        let index = WorldCoord(x, 0, z).to_chunk_index(self.chunk_size);
        self.chunk_slot(index).map(|slot| &self.chunks[slot])
    }

    /// Replaces the chunk column holding world column (x, z). Returns false
    /// when the column is outside the grid or the chunk index does not match.
    pub fn set_chunk(&mut self, x: i32, z: i32, chunk: Chunk) -> bool {
        let index = WorldCoord(x, 0, z).to_chunk_index(self.chunk_size);
        match self.chunk_slot(index) {
            Some(slot) if chunk.index() == index && chunk.depth() == self.bounds.depth => {
                self.chunks[slot] = chunk;
                true
            }
            _ => false,
        }
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter()
    }

    pub fn get_block(&self, coord: WorldCoord) -> Option<&Block> {
        let chunk = self.get_chunk(coord.0, coord.2)?;
        chunk.get_block(coord.to_local_coord(self.chunk_size))
    }

    pub fn block_id(&self, coord: WorldCoord) -> Option<BlockId> {
        self.get_block(coord).map(Block::id)
    }

    pub fn neighbor(&self, coord: WorldCoord, direction: Direction) -> Option<&Block> {
        self.get_block(coord.offset(direction.vector()))
    }

    /// Sets the id without touching the render cache
    fn set_block_id(&mut self, coord: WorldCoord, id: BlockId) -> bool {
        let Some(slot) = self.chunk_slot(coord.to_chunk_index(self.chunk_size)) else {
            return false;
        };
        let local = coord.to_local_coord(self.chunk_size);
        self.chunks[slot].set_block(local, id, &self.materials)
    }

    /// Sets a block and incrementally updates the render cache and mesh.
    /// Out-of-world coordinates are a no-op returning false.
    pub fn set_block(&mut self, coord: WorldCoord, id: BlockId) -> bool {
        if !self.set_block_id(coord, id) {
            return false;
        }
        debug!("set block {:?} to {}", coord, id);
        self.update_render_at(coord);
        true
    }

    // ========================================================================
    // RENDER CACHE
    // ========================================================================

    pub fn render_infos(&self) -> &RenderInfoCache {
        &self.render_infos
    }

    pub fn render_count(&self) -> usize {
        self.render_infos.render_count()
    }

    pub fn mesh(&self) -> Option<&InstanceMesh> {
        self.mesh.as_ref()
    }

    /// Bumped on every mesh rebuild
    pub fn mesh_version(&self) -> u64 {
        self.mesh_version
    }

    /// Rebuilds the cache from every chunk within `view_distance` (Chebyshev,
    /// exclusive) of the viewer's chunk and builds a fresh mesh
    pub fn render(&mut self, viewer: WorldCoord, view_distance: i32) -> &InstanceMesh {
        let centre = viewer.to_chunk_index(self.chunk_size);
        let mut cache = RenderInfoCache::new();

        for chunk in self.chunks.iter().filter(|c| c.index().distance(&centre) < view_distance) {
            chunk.get_render_infos(|coord| self.get_block(coord), self.tile_map_size, &mut cache);
        }

        info!("render: {} blocks, {} faces", cache.len(), cache.render_count());
        self.render_infos = cache;
        self.build_mesh()
    }

    /// Rebuilds the instance mesh from the current cache
    pub fn build_mesh(&mut self) -> &InstanceMesh {
        self.mesh_version += 1;
        self.mesh.insert(InstanceMesh::build(&self.render_infos))
    }

    fn compute_render_info(&self, coord: WorldCoord) -> Option<BlockRenderInfo> {
        let block = self.get_block(coord)?;
        block.compute_face_render_info(|direction| self.neighbor(coord, direction), self.tile_map_size)
    }

    /// Rechecks the block at `coord` and its neighbourhood. Returns whether
    /// anything changed; the mesh is rebuilt if so.
    pub fn update_render_at(&mut self, coord: WorldCoord) -> bool {
        self.update_render_many(&[coord])
    }

    /// Breadth-first recheck seeded with `coords`; rebuilds the mesh if any
    /// cached face set changed
    pub fn update_render_many(&mut self, coords: &[WorldCoord]) -> bool {
        let update = self.recheck_render(coords);
        if update.changed {
            self.build_mesh();
        }
        update.changed
    }

    /// Seeds always expand to their six neighbours; any other block expands
    /// only if its hash changed, and nothing expands past
    /// `max_propagation_radius` steps from a seed
    pub(crate) fn recheck_render(&mut self, coords: &[WorldCoord]) -> RenderUpdate {
        let mut queue: VecDeque<(WorldCoord, u32)> = VecDeque::new();
        let mut visited: HashSet<WorldCoord> = HashSet::new();
        for coord in coords {
            if self.get_block(*coord).is_some() && visited.insert(*coord) {
                queue.push_back((*coord, 0));
            }
        }

        let mut update = RenderUpdate::default();
        while let Some((coord, level)) = queue.pop_front() {
            update.checked += 1;
            let info = self.compute_render_info(coord);
            let hash_changed = self.render_infos.replace(coord, info);
            update.changed |= hash_changed;

            let expand = level == 0 || hash_changed;
            if !expand || level >= self.max_propagation_radius {
                continue;
            }
            for direction in Direction::ALL {
                let next = coord.offset(direction.vector());
                if self.get_block(next).is_some() && visited.insert(next) {
                    queue.push_back((next, level + 1));
                }
            }
        }

        debug!("render update: {} blocks checked, changed: {}", update.checked, update.changed);
        update
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn raycast(&self, origin: Vec3, direction: Vec3, depth: usize) -> Vec<RayIntersection> {
        world_raycast(origin, direction, depth)
    }

    /// Nearest active block along the ray within `range`, optionally looking
    /// through liquids
    pub fn pick_block(
        &self,
        origin: Vec3,
        direction: Vec3,
        depth: usize,
        range: f32,
        skip_liquid: bool,
    ) -> Option<PickedBlock> {
        world_raycast(origin, direction, depth)
            .into_iter()
            .take_while(|hit| hit.distance <= range)
            .find_map(|hit| {
                let block = self.get_block(hit.coord)?;
                if !block.is_active() || (skip_liquid && block.is_liquid()) {
                    return None;
                }
                Some(PickedBlock {
                    intersection: hit,
                    id: block.id(),
                    place_coord: hit.coord.offset(hit.normal),
                })
            })
    }

    /// Contacts between a body with its eye at `eye` and every active block it overlaps
    pub fn check_collision(&self, eye: Vec3, body: &Body) -> Vec<Collision> {
        body.cells(eye)
            .into_iter()
            .filter_map(|coord| {
                let block = self.get_block(coord)?;
                if !block.is_active() {
                    return None;
                }
                let mut collision = body.block_collision(eye, coord)?;
                collision.liquid = block.is_liquid();
                Some(collision)
            })
            .collect()
    }

    // ========================================================================
    // PLACED MODELS
    // ========================================================================

    pub fn models(&self) -> &ModelTable {
        &self.models
    }

    /// True if any cell is outside the world or not air
    pub fn footprint_is_blocked(&self, footprint: &Footprint) -> bool {
        footprint
            .cells()
            .any(|coord| self.get_block(coord).map_or(true, Block::is_active))
    }

    /// Claims every cell of `footprint` for a new model
    pub fn place_model(&mut self, footprint: Footprint) -> Option<PlacedModel> {
        if self.footprint_is_blocked(&footprint) {
            return None;
        }
        let model = self.models.insert(footprint);
        let cells: Vec<WorldCoord> = footprint.cells().collect();
        for coord in &cells {
            self.set_block_id(*coord, model.block_id());
        }
        self.update_render_many(&cells);
        debug!("placed model {} at {:?}", model.index, footprint.min);
        Some(model)
    }

    /// Frees a model's cells, leaving cells it no longer owns untouched
    pub fn remove_model(&mut self, index: i32) -> Option<PlacedModel> {
        let model = self.models.remove(index)?;
        let cells: Vec<WorldCoord> = model
            .footprint
            .cells()
            .filter(|coord| self.block_id(*coord) == Some(model.block_id()))
            .collect();
        for coord in &cells {
            self.set_block_id(*coord, ids::AIR);
        }
        self.update_render_many(&cells);
        debug!("removed model {}", index);
        Some(model)
    }
}
