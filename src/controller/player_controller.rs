use tracing::{debug, info};

use super::input::{InputProcessor, InputState, MouseButton};
use super::physics::PhysicsSystem;
use crate::config::PlayerConfig;
use crate::model::world::{ids, BlockId, World};
use crate::model::Player;
use crate::utils::WorldCoord;

/// A block change made by the player during a frame
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockEdit {
    pub coord: WorldCoord,
    pub id: BlockId,
}

/// Turns polled input into look, selection, block edits and movement
pub struct PlayerController {
    processor: InputProcessor,
    physics: PhysicsSystem,
}

impl PlayerController {
    pub fn new(processor: InputProcessor, config: PlayerConfig) -> Self {
        Self { processor, physics: PhysicsSystem::new(config) }
    }

    pub fn config(&self) -> &PlayerConfig {
        self.physics.config()
    }

    /// Per-frame work: view angles, quick slots, targeted block, timers,
    /// break/place and the edge-triggered toggles
    pub fn frame_update(
        &self,
        player: &mut Player,
        world: &mut World,
        input: &mut InputState,
        dt: f32,
    ) -> Option<BlockEdit> {
        let c = self.physics.config();

        let (dx, dy) = input.look_delta();
        if dx != 0.0 || dy != 0.0 {
            player.camera.rotate(-dx * c.look_speed, -dy * c.look_speed);
        }

        let wheel = input.wheel_delta();
        if wheel > 0.0 {
            player.quick_slots.cycle(1);
        } else if wheel < 0.0 {
            player.quick_slots.cycle(-1);
        }

        player.selection =
            world.pick_block(player.position(), player.camera.forward(), c.ray_depth, c.range, true);

        player.block_delay -= dt;
        player.jump_delay -= dt;

        let edit = self.edit_blocks(player, world, input);

        if self.processor.wants_debug(input) {
            info!(
                "player at {:?} ({:?}), velocity {:?}, target {:?}",
                player.position(),
                player.mode(),
                player.velocity,
                player.selection.map(|s| (s.coord(), s.id)),
            );
        }
        if self.processor.wants_toggle_pointer_lock(input) {
            let lock = !input.is_pointer_locked();
            input.request_pointer_lock(lock);
        }
        if self.processor.wants_toggle_fly(input) {
            player.toggle_flying();
            info!("flying: {}", player.flying);
        }

        edit
    }

    fn edit_blocks(&self, player: &mut Player, world: &mut World, input: &InputState) -> Option<BlockEdit> {
        let selection = player.selection?;
        let ready = player.block_delay <= 0.0;
        let triggered = |button| input.is_button_pressed(button) || (input.is_button_held(button) && ready);

        let edit = if triggered(MouseButton::Left) {
            BlockEdit { coord: selection.coord(), id: ids::AIR }
        } else if triggered(MouseButton::Right) {
            let id = player.equipped_block()?;
            if player.occupied_cells().contains(&selection.place_coord) {
                debug!("placement at {:?} rejected, player is in the way", selection.place_coord);
                return None;
            }
            BlockEdit { coord: selection.place_coord, id }
        } else {
            return None;
        };

        if !world.set_block(edit.coord, edit.id) {
            return None;
        }
        player.block_delay = self.physics.config().block_set_delay;
        player.selection = None;
        Some(edit)
    }

    /// One fixed physics step driven by the held movement keys
    pub fn fixed_update(&self, player: &mut Player, world: &World, input: &InputState, dt: f32) {
        let intent = self.processor.movement_intent(input, player.flying);
        self.physics.step(player, world, &intent, dt);
    }
}
