// CONTROLLER: Input, game logic, and update loop
pub mod input;
pub mod physics;
pub mod player_controller;
pub mod entity;
pub mod frame_loop;

pub use input::{InputEvent, InputProcessor, InputState, KeyBindings, MouseButton, MovementIntent};
pub use physics::PhysicsSystem;
pub use player_controller::{BlockEdit, PlayerController};
pub use entity::{Entity, Lifecycle, PlayerEntity, Sky, UpdateContext};
pub use frame_loop::{FrameClock, FrameSteps, Game};
