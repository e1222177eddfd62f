// MODEL: Game state and data
pub mod world;
pub mod camera;
pub mod player;

pub use world::{Block, BlockId, Chunk, World};
pub use camera::Camera;
pub use player::{MovementMode, Player, QuickSlots};
