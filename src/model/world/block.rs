use std::f32::consts::{FRAC_PI_2, PI};

use glam::{IVec3, Mat4, Quat, Vec3};

use super::material::{Material, MaterialTable};
use super::render_info::{BlockRenderInfo, FaceRenderInfo};
use crate::utils::{atlas_uv_offset, WorldCoord};

/// Block ids: 0 is air, positive ids are materials, negative ids mark cells
/// occupied by placed model `-id`
pub type BlockId = i32;

pub mod ids {
    use super::BlockId;

    pub const AIR: BlockId = 0;
    pub const STONE: BlockId = 1;
    pub const GRASS: BlockId = 2;
    pub const DIRT: BlockId = 3;
    pub const COBBLESTONE: BlockId = 4;
    pub const PLANKS: BlockId = 5;
    pub const BEDROCK: BlockId = 7;
    pub const WATER: BlockId = 9;
    pub const SAND: BlockId = 12;
    pub const GRAVEL: BlockId = 13;
    pub const LEAVES: BlockId = 18;
    pub const GLASS: BlockId = 20;
    pub const BRICKS: BlockId = 45;
    pub const ICE: BlockId = 79;
    pub const SNOW: BlockId = 80;
}

/// Vertical drop of a liquid surface below the full block height
pub const LIQUID_SURFACE_DROP: f32 = 0.1;

#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Up = 0,
    Down = 1,
    /// -X
    Left = 2,
    /// +X
    Right = 3,
    /// +Z
    Front = 4,
    /// -Z
    Back = 5,
}

impl Direction {
    pub const ALL: [Direction; 6] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
        Direction::Front,
        Direction::Back,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Unit offset towards the neighbour on this side
    pub fn vector(self) -> IVec3 {
        match self {
            Direction::Up => IVec3::Y,
            Direction::Down => IVec3::NEG_Y,
            Direction::Left => IVec3::NEG_X,
            Direction::Right => IVec3::X,
            Direction::Front => IVec3::Z,
            Direction::Back => IVec3::NEG_Z,
        }
    }

    pub fn normal(self) -> Vec3 {
        self.vector().as_vec3()
    }

    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
            Direction::Front => Direction::Back,
            Direction::Back => Direction::Front,
        }
    }

    pub fn from_vector(v: IVec3) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| d.vector() == v)
    }

    /// Rotation taking a unit quad that faces +Z onto this side
    pub fn rotation(self) -> Quat {
        match self {
            Direction::Front => Quat::IDENTITY,
            Direction::Back => Quat::from_rotation_y(PI),
            Direction::Right => Quat::from_rotation_y(FRAC_PI_2),
            Direction::Left => Quat::from_rotation_y(-FRAC_PI_2),
            Direction::Up => Quat::from_rotation_x(-FRAC_PI_2),
            Direction::Down => Quat::from_rotation_x(FRAC_PI_2),
        }
    }

    /// Fixed per-face shading term
    pub fn ambient(self) -> f32 {
        match self {
            Direction::Left | Direction::Back => 0.8,
            _ => 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Block {
    coord: WorldCoord,
    id: BlockId,
    // resolved for positive ids only
    material: Option<Material>,
}

impl Block {
    pub fn new(coord: WorldCoord, id: BlockId, materials: &MaterialTable) -> Self {
        let mut block = Self { coord, id: ids::AIR, material: None };
        block.set_block_id(id, materials);
        block
    }

    pub fn air(coord: WorldCoord) -> Self {
        Self { coord, id: ids::AIR, material: None }
    }

    pub fn set_block_id(&mut self, id: BlockId, materials: &MaterialTable) {
        self.id = id;
        self.material = (id > 0).then(|| materials.resolve(id));
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn coord(&self) -> WorldCoord {
        self.coord
    }

    pub fn material(&self) -> Option<&Material> {
        self.material.as_ref()
    }

    /// Anything but air, including model cells
    pub fn is_active(&self) -> bool {
        self.id != ids::AIR
    }

    pub fn is_model(&self) -> bool {
        self.id < 0
    }

    /// Renders through the voxel mesh
    pub fn is_solid_voxel(&self) -> bool {
        self.id > 0
    }

    pub fn is_transparent(&self) -> bool {
        self.material.is_some_and(|m| m.transparent)
    }

    pub fn is_liquid(&self) -> bool {
        self.material.is_some_and(|m| m.liquid)
    }

    pub fn texture(&self, direction: Direction) -> u32 {
        self.material.map_or(0, |m| m.texture.for_face(direction))
    }

    fn face_visible_against(&self, neighbor: Option<&Block>) -> bool {
        match neighbor {
            None => true,
            Some(n) if !n.is_solid_voxel() => true,
            Some(n) if n.is_transparent() => n.id != self.id,
            Some(_) => false,
        }
    }

    /// Liquid with no liquid of the same kind above it
    fn is_liquid_surface(&self, above: Option<&Block>) -> bool {
        self.is_liquid() && above.map_or(true, |b| b.id != self.id)
    }

    /// Visible faces of this block given its six neighbours. `None` for air,
    /// model cells and fully enclosed blocks.
    pub fn compute_face_render_info<'a, F>(&self, neighbor: F, tile_map_size: u32) -> Option<BlockRenderInfo>
    where
        F: Fn(Direction) -> Option<&'a Block>,
    {
        let material = self.material?;

        let mut mask = 0u64;
        let mut faces = Vec::new();
        let surface = self.is_liquid_surface(neighbor(Direction::Up));

        for direction in Direction::ALL {
            if !self.face_visible_against(neighbor(direction)) {
                continue;
            }
            mask |= 1 << direction.index();
            faces.push(FaceRenderInfo {
                direction,
                uv_offset: atlas_uv_offset(material.texture.for_face(direction), tile_map_size),
                ambient: direction.ambient(),
                transform: face_transform(self.coord, direction, surface),
                transparent: material.transparent,
            });
        }

        if faces.is_empty() {
            return None;
        }

        let hash = mask | (surface as u64) << 6 | (self.id as u32 as u64) << 8;
        Some(BlockRenderInfo { hash, faces })
    }
}

/// Model matrix placing a unit quad on `direction`'s side of the block at
/// `coord`. Liquid surfaces sit lower and their sides shrink to match.
pub fn face_transform(coord: WorldCoord, direction: Direction, liquid_surface: bool) -> Mat4 {
    let mut offset = direction.normal() * 0.5;
    let mut scale = Vec3::ONE;

    if liquid_surface {
        match direction {
            Direction::Up => offset.y -= LIQUID_SURFACE_DROP,
            Direction::Down => {}
            _ => {
                scale.y = 1.0 - LIQUID_SURFACE_DROP;
                offset.y -= LIQUID_SURFACE_DROP / 2.0;
            }
        }
    }

    Mat4::from_scale_rotation_translation(scale, direction.rotation(), coord.as_vec3() + offset)
}
