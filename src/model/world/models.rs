use glam::{IVec3, Vec3};

use super::block::BlockId;
use crate::utils::WorldCoord;

/// Box of block cells occupied by a placed model
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Footprint {
    pub min: WorldCoord,
    pub size: IVec3,
}

impl Footprint {
    pub fn new(min: WorldCoord, size: IVec3) -> Self {
        Self { min, size: size.max(IVec3::ONE) }
    }

    /// Footprint of a model whose base is centred at `position`. For even
    /// extents the extra cell goes to the positive side.
    pub fn from_centre(position: Vec3, size: IVec3) -> Self {
        let size = size.max(IVec3::ONE);
        let mut x = (position.x - (size.x / 2) as f32).round() as i32;
        let y = position.y.round() as i32;
        let mut z = (position.z - (size.z / 2) as f32).round() as i32;

        if size.x % 2 == 0 {
            x += 1;
        }
        if size.z % 2 == 0 {
            z += 1;
        }

        Self { min: WorldCoord(x, y, z), size }
    }

    /// Whole-block extent of a model measured in world units
    pub fn block_extent(model_size: Vec3) -> IVec3 {
        model_size.ceil().as_ivec3().max(IVec3::ONE)
    }

    /// Extent after rotating by `angle` degrees about Y: quarter turns swap X and Z
    pub fn rotated_extent(size: IVec3, angle: u32) -> IVec3 {
        if angle % 180 == 90 {
            IVec3::new(size.z, size.y, size.x)
        } else {
            size
        }
    }

    pub fn contains(&self, coord: &WorldCoord) -> bool {
        let local = coord.as_ivec3() - self.min.as_ivec3();
        local.cmpge(IVec3::ZERO).all() && local.cmplt(self.size).all()
    }

    pub fn cells(&self) -> impl Iterator<Item = WorldCoord> + '_ {
        let min = self.min;
        let size = self.size;
        (0..size.x).flat_map(move |x| {
            (0..size.y).flat_map(move |y| (0..size.z).map(move |z| WorldCoord(min.0 + x, min.1 + y, min.2 + z)))
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlacedModel {
    /// 1-based; occupied cells hold block id `-index`
    pub index: i32,
    pub footprint: Footprint,
}

impl PlacedModel {
    pub fn block_id(&self) -> BlockId {
        -self.index
    }
}

/// Placed models by index. Freed slots are reused by later placements.
#[derive(Clone, Debug, Default)]
pub struct ModelTable {
    slots: Vec<Option<PlacedModel>>,
}

impl ModelTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, footprint: Footprint) -> PlacedModel {
        let slot = match self.slots.iter().position(Option::is_none) {
            Some(slot) => slot,
            None => {
                self.slots.push(None);
                self.slots.len() - 1
            }
        };
        let model = PlacedModel { index: slot as i32 + 1, footprint };
        self.slots[slot] = Some(model);
        model
    }

    pub fn get(&self, index: i32) -> Option<&PlacedModel> {
        let slot = usize::try_from(index.checked_sub(1)?).ok()?;
        self.slots.get(slot)?.as_ref()
    }

    pub fn remove(&mut self, index: i32) -> Option<PlacedModel> {
        let slot = usize::try_from(index.checked_sub(1)?).ok()?;
        self.slots.get_mut(slot)?.take()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlacedModel> {
        self.slots.iter().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_centre_odd_and_even() {
        let odd = Footprint::from_centre(Vec3::new(10.0, 5.0, -3.0), IVec3::new(3, 2, 1));
        assert_eq!(odd.min, WorldCoord(9, 5, -3));
        assert!(odd.contains(&WorldCoord(11, 6, -3)));
        assert!(!odd.contains(&WorldCoord(12, 5, -3)));

        let even = Footprint::from_centre(Vec3::new(0.0, 0.0, 0.0), IVec3::new(2, 1, 4));
        assert_eq!(even.min, WorldCoord(0, 0, -1));
        assert_eq!(even.cells().count(), 8);
    }

    #[test]
    fn test_rotated_extent_swaps_xz() {
        let size = IVec3::new(3, 2, 1);
        assert_eq!(Footprint::rotated_extent(size, 0), size);
        assert_eq!(Footprint::rotated_extent(size, 90), IVec3::new(1, 2, 3));
        assert_eq!(Footprint::rotated_extent(size, 180), size);
        assert_eq!(Footprint::rotated_extent(size, 270), IVec3::new(1, 2, 3));
    }

    #[test]
    fn test_block_extent_rounds_up() {
        assert_eq!(Footprint::block_extent(Vec3::new(1.2, 0.4, 2.0)), IVec3::new(2, 1, 2));
    }

    #[test]
    fn test_table_reuses_indices() {
        let footprint = Footprint::new(WorldCoord(0, 0, 0), IVec3::ONE);
        let mut table = ModelTable::new();
        let a = table.insert(footprint);
        let b = table.insert(footprint);
        assert_eq!((a.index, b.index), (1, 2));
        assert_eq!(a.block_id(), -1);

        assert_eq!(table.remove(1), Some(a));
        assert!(table.get(1).is_none());
        assert_eq!(table.insert(footprint).index, 1, "freed slot is reused");
        assert_eq!(table.len(), 2);
        assert!(table.remove(0).is_none());
        assert!(table.remove(-4).is_none());
    }
}
