use glam::{IVec3, Vec3};

/// coordinates of a block in world space (block centres sit on integers)
#[derive(Debug, Eq, Hash, PartialEq, PartialOrd, Ord, Clone, Copy, Default)]
pub struct WorldCoord(pub i32, pub i32, pub i32);

impl WorldCoord {
    /// Block containing a point, using the centred-cube convention
    pub fn from_point(p: Vec3) -> Self {
        WorldCoord(p.x.round() as i32, p.y.round() as i32, p.z.round() as i32)
    }

    /// Convert to the index of the chunk column holding this block
    pub fn to_chunk_index(&self, chunk_size: i32) -> ChunkIndex {
        ChunkIndex(
            chunk_index(self.0, chunk_size),
            chunk_index(self.2, chunk_size),
        )
    }

    /// Convert to chunk-local coordinates
    pub fn to_local_coord(&self, chunk_size: i32) -> LocalCoord {
        LocalCoord(
            chunk_coordinate(self.0, chunk_size),
            self.1,
            chunk_coordinate(self.2, chunk_size),
        )
    }

    pub fn offset(&self, delta: IVec3) -> WorldCoord {
        WorldCoord(self.0 + delta.x, self.1 + delta.y, self.2 + delta.z)
    }

    pub fn as_vec3(&self) -> Vec3 {
        Vec3::new(self.0 as f32, self.1 as f32, self.2 as f32)
    }

    pub fn as_ivec3(&self) -> IVec3 {
        IVec3::new(self.0, self.1, self.2)
    }
}

impl From<IVec3> for WorldCoord {
    fn from(v: IVec3) -> Self {
        WorldCoord(v.x, v.y, v.z)
    }
}

/// index of a chunk column in chunk space (x, z)
#[derive(Debug, Eq, Hash, PartialEq, Clone, Copy)]
pub struct ChunkIndex(pub i32, pub i32);

impl ChunkIndex {
    /// Chebyshev distance in chunk units
    pub fn distance(&self, other: &ChunkIndex) -> i32 {
        (self.0 - other.0).abs().max((self.1 - other.1).abs())
    }

    /// World coordinate of the local (0, y, 0) block of this chunk
    pub fn to_world_coord(&self, y: i32, chunk_size: i32) -> WorldCoord {
        let offset = centering_offset(chunk_size);
        WorldCoord(
            self.0 * chunk_size - offset,
            y,
            self.1 * chunk_size - offset,
        )
    }
}

/// Chunk-local block coordinates, x/z in `[0, chunk_size)`, y in `[0, depth)`
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct LocalCoord(pub i32, pub i32, pub i32);

/// Shift that centres chunk (0, 0) on the world origin for any chunk size parity
pub fn centering_offset(chunk_size: i32) -> i32 {
    (chunk_size - 1).div_euclid(2)
}

/// world coordinate -> chunk index
pub fn chunk_index(value: i32, chunk_size: i32) -> i32 {
    (value + centering_offset(chunk_size)).div_euclid(chunk_size)
}

/// world coordinate -> position inside its chunk
pub fn chunk_coordinate(value: i32, chunk_size: i32) -> i32 {
    (value + centering_offset(chunk_size)).rem_euclid(chunk_size)
}

/// Inclusive world bounds for a world `size` blocks wide, centred on the origin.
///
/// Returns `None` for sizes below 1. For even sizes the positive side carries
/// the extra column: `16 -> (-7, 8)`.
pub fn get_min_max(size: i32) -> Option<(i32, i32)> {
    if size < 1 {
        return None;
    }
    let span = size - 1;
    let half = span / 2;
    Some((-half, half + span % 2))
}

/// Texture atlas tile offset for a texture id, in tile units
pub fn atlas_uv_offset(texture: u32, tile_map_size: u32) -> [f32; 2] {
    let u = texture % tile_map_size;
    let v = tile_map_size as i64 - (texture / tile_map_size) as i64 - 1;
    [u as f32, v as f32]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_conversion_round_trip() {
        for chunk_size in [1, 2, 3, 15, 16, 17] {
            let offset = centering_offset(chunk_size);
            for value in -100..100 {
                let index = chunk_index(value, chunk_size);
                let local = chunk_coordinate(value, chunk_size);
                assert!((0..chunk_size).contains(&local), "local {local} out of range for size {chunk_size}");
                assert_eq!(value, index * chunk_size + local - offset, "round trip failed for {value} / {chunk_size}");
            }
        }
    }

    #[test]
    fn test_chunk_zero_is_centred() {
        // odd size: chunk 0 spans -7..=7
        assert_eq!(chunk_index(-7, 15), 0);
        assert_eq!(chunk_index(7, 15), 0);
        assert_eq!(chunk_index(-8, 15), -1);
        assert_eq!(chunk_index(8, 15), 1);
        // even size: chunk 0 spans -7..=8
        assert_eq!(chunk_index(-7, 16), 0);
        assert_eq!(chunk_index(8, 16), 0);
        assert_eq!(chunk_index(-8, 16), -1);
        assert_eq!(chunk_coordinate(-7, 16), 0);
        assert_eq!(chunk_coordinate(8, 16), 15);
    }

    #[test]
    fn test_min_max() {
        assert_eq!(get_min_max(0), None);
        assert_eq!(get_min_max(1), Some((0, 0)));
        assert_eq!(get_min_max(2), Some((0, 1)));
        assert_eq!(get_min_max(3), Some((-1, 1)));
        assert_eq!(get_min_max(16), Some((-7, 8)));
        assert_eq!(get_min_max(320), Some((-159, 160)));
        for size in 1..50 {
            let (min, max) = get_min_max(size).unwrap();
            assert_eq!(max - min + 1, size, "world of size {size} has wrong extent");
        }
    }

    #[test]
    fn test_atlas_uv_offset() {
        assert_eq!(atlas_uv_offset(0, 16), [0.0, 15.0]);
        assert_eq!(atlas_uv_offset(3, 16), [3.0, 15.0]);
        assert_eq!(atlas_uv_offset(17, 16), [1.0, 14.0]);
        assert_eq!(atlas_uv_offset(255, 16), [15.0, 0.0]);
    }

    #[test]
    fn test_world_coord_chunk_helpers() {
        let coord = WorldCoord(-8, 5, 8);
        assert_eq!(coord.to_chunk_index(16), ChunkIndex(-1, 0));
        assert_eq!(coord.to_local_coord(16), LocalCoord(15, 5, 15));
        assert_eq!(ChunkIndex(-1, 0).to_world_coord(5, 16), WorldCoord(-23, 5, -7));
        assert_eq!(WorldCoord::from_point(Vec3::new(0.4, -0.6, 1.5)), WorldCoord(0, -1, 2));
    }
}
