pub mod block;
pub mod chunk;
pub mod collision;
pub mod grid;
pub mod material;
pub mod models;
pub mod noise;
pub mod raycast;
pub mod render_info;
pub mod terrain;

pub use block::{ids, Block, BlockId, Direction};
pub use chunk::{Chunk, WorldBounds};
pub use collision::{Body, Collision};
pub use grid::{PickedBlock, World};
pub use material::{Material, MaterialTable, Texture};
pub use models::{Footprint, ModelTable, PlacedModel};
pub use raycast::{world_raycast, RayIntersection};
pub use render_info::{BlockRenderInfo, FaceRenderInfo, RenderInfoCache};
pub use terrain::TerrainGenerator;
