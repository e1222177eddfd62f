use std::collections::HashMap;

use serde::Deserialize;

use super::block::{ids, BlockId, Direction};
use crate::error::EngineError;

/// Atlas texture for a material: one tile for every face, or one per face in
/// `Direction::ALL` order (up, down, left, right, front, back)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Texture {
    Uniform(u32),
    PerFace([u32; 6]),
}

impl Texture {
    pub fn for_face(&self, direction: Direction) -> u32 {
        match self {
            Texture::Uniform(id) => *id,
            Texture::PerFace(faces) => faces[direction.index()],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Material {
    pub texture: Texture,
    #[serde(default)]
    pub transparent: bool,
    #[serde(default)]
    pub liquid: bool,
}

impl Material {
    pub const fn opaque(texture: u32) -> Self {
        Self { texture: Texture::Uniform(texture), transparent: false, liquid: false }
    }

    pub const fn transparent(texture: u32) -> Self {
        Self { texture: Texture::Uniform(texture), transparent: true, liquid: false }
    }

    /// Stand-in for ids missing from the table: the raw id is the texture of all faces
    pub fn fallback(id: BlockId) -> Self {
        Self::opaque(id.max(0) as u32)
    }
}

/// Read-only `block id -> material` lookup, loaded once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialTable {
    entries: HashMap<BlockId, Material>,
}

impl MaterialTable {
    pub fn empty() -> Self {
        Self { entries: HashMap::new() }
    }

    /// Parses a JSON object keyed by block id, e.g.
    /// `{ "1": { "texture": 1 }, "9": { "texture": 205, "transparent": true, "liquid": true } }`
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let entries: HashMap<BlockId, Material> = serde_json::from_str(json)?;
        if let Some(id) = entries.keys().find(|id| **id <= 0) {
            return Err(EngineError::InvalidConfig(format!(
                "material ids must be positive, got {id}"
            )));
        }
        Ok(Self { entries })
    }

    pub fn insert(&mut self, id: BlockId, material: Material) {
        self.entries.insert(id, material);
    }

    pub fn get(&self, id: BlockId) -> Option<&Material> {
        self.entries.get(&id)
    }

    /// Material for a positive id, degrading to `Material::fallback` for unknown ids
    pub fn resolve(&self, id: BlockId) -> Material {
        self.get(id).copied().unwrap_or_else(|| Material::fallback(id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for MaterialTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.insert(ids::STONE, Material::opaque(1));
        table.insert(ids::GRASS, Material {
            texture: Texture::PerFace([0, 2, 3, 3, 3, 3]),
            transparent: false,
            liquid: false,
        });
        table.insert(ids::DIRT, Material::opaque(2));
        table.insert(ids::COBBLESTONE, Material::opaque(16));
        table.insert(ids::PLANKS, Material::opaque(4));
        table.insert(ids::BEDROCK, Material::opaque(17));
        table.insert(ids::WATER, Material {
            texture: Texture::Uniform(205),
            transparent: true,
            liquid: true,
        });
        table.insert(ids::SAND, Material::opaque(18));
        table.insert(ids::GRAVEL, Material::opaque(19));
        table.insert(ids::LEAVES, Material::transparent(52));
        table.insert(ids::GLASS, Material::transparent(49));
        table.insert(ids::BRICKS, Material::opaque(7));
        table.insert(ids::ICE, Material::transparent(67));
        table.insert(ids::SNOW, Material::opaque(66));
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_id_falls_back_to_raw_texture() {
        let table = MaterialTable::default();
        let material = table.resolve(123);
        assert_eq!(material.texture, Texture::Uniform(123));
        assert!(!material.transparent);
        assert!(!material.liquid);
    }

    #[test]
    fn test_per_face_texture() {
        let table = MaterialTable::default();
        let grass = table.resolve(ids::GRASS);
        assert_eq!(grass.texture.for_face(Direction::Up), 0);
        assert_eq!(grass.texture.for_face(Direction::Down), 2);
        assert_eq!(grass.texture.for_face(Direction::Front), 3);
    }

    #[test]
    fn test_from_json() {
        let table = MaterialTable::from_json(
            r#"{
                "1": { "texture": 1 },
                "2": { "texture": [0, 2, 3, 3, 3, 3] },
                "9": { "texture": 205, "transparent": true, "liquid": true }
            }"#,
        )
        .unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.get(2).unwrap().texture, Texture::PerFace([0, 2, 3, 3, 3, 3]));
        let water = table.get(9).unwrap();
        assert!(water.transparent && water.liquid);
    }

    #[test]
    fn test_from_json_rejects_reserved_ids() {
        assert!(MaterialTable::from_json(r#"{ "0": { "texture": 1 } }"#).is_err());
        assert!(MaterialTable::from_json(r#"{ "-2": { "texture": 1 } }"#).is_err());
    }
}
