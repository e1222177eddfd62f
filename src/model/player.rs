use glam::Vec3;

use super::camera::Camera;
use super::world::{Body, BlockId, PickedBlock};
use crate::config::PlayerConfig;
use crate::utils::WorldCoord;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MovementMode {
    Walking,
    Flying,
    Swimming,
}

/// Ordered list of placeable blocks with one active slot
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QuickSlots {
    slots: Vec<BlockId>,
    current: usize,
}

impl QuickSlots {
    pub fn new(slots: Vec<BlockId>) -> Self {
        Self { slots, current: 0 }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn slots(&self) -> &[BlockId] {
        &self.slots
    }

    pub fn equipped(&self) -> Option<BlockId> {
        self.slots.get(self.current).copied()
    }

    /// Moves `steps` slots forward (negative: backward), wrapping around
    pub fn cycle(&mut self, steps: i32) {
        if self.slots.is_empty() {
            return;
        }
        let len = self.slots.len() as i64;
        self.current = (self.current as i64 + steps as i64).rem_euclid(len) as usize;
    }

    pub fn select(&mut self, slot: usize) -> bool {
        if slot < self.slots.len() {
            self.current = slot;
            true
        } else {
            false
        }
    }
}

pub struct Player {
    /// eye position and view angles
    pub camera: Camera,
    /// blocks per second
    pub velocity: Vec3,
    pub flying: bool,
    pub swimming: bool,
    pub jumpable: bool,
    pub jump_delay: f32,
    pub block_delay: f32,
    pub quick_slots: QuickSlots,
    /// block under the crosshair, refreshed every frame
    pub selection: Option<PickedBlock>,
    pub body: Body,
}

impl Player {
    pub fn new(config: &PlayerConfig, width: u32, height: u32) -> Self {
        let mut camera = Camera::new(width, height);
        camera.eye = Vec3::new(0.0, config.spawn_height, 0.0);

        Self {
            camera,
            velocity: Vec3::ZERO,
            flying: config.start_flying,
            swimming: false,
            jumpable: false,
            jump_delay: 0.0,
            block_delay: 0.0,
            quick_slots: QuickSlots::new(config.quick_slots.clone()),
            selection: None,
            body: Body::from_size(config.size),
        }
    }

    pub fn position(&self) -> Vec3 {
        self.camera.eye
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.camera.eye = position;
    }

    /// Block containing the eye
    pub fn block_position(&self) -> WorldCoord {
        WorldCoord::from_point(self.camera.eye)
    }

    /// Position of the feet
    pub fn foot_position(&self) -> Vec3 {
        self.camera.eye - Vec3::Y * (self.body.height * 0.75)
    }

    pub fn mode(&self) -> MovementMode {
        if self.flying {
            MovementMode::Flying
        } else if self.swimming {
            MovementMode::Swimming
        } else {
            MovementMode::Walking
        }
    }

    pub fn toggle_flying(&mut self) {
        self.flying = !self.flying;
        self.jumpable = false;
    }

    pub fn equipped_block(&self) -> Option<BlockId> {
        self.quick_slots.equipped()
    }

    /// Cells the body currently overlaps
    pub fn occupied_cells(&self) -> Vec<WorldCoord> {
        self.body.cells(self.camera.eye)
    }
}
