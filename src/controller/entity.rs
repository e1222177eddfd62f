use glam::Vec3;
use tracing::info;

use super::input::InputState;
use super::player_controller::{BlockEdit, PlayerController};
use crate::model::world::World;
use crate::model::Player;

/// Everything an entity may touch during one callback
pub struct UpdateContext<'a> {
    pub world: &'a mut World,
    pub input: &'a mut InputState,
    /// eye position of the player, refreshed after the player's own callback
    pub viewer: Vec3,
    pub dt: f32,
    /// block edits made during this callback round
    pub edits: Vec<BlockEdit>,
}

impl<'a> UpdateContext<'a> {
    pub fn new(world: &'a mut World, input: &'a mut InputState, viewer: Vec3, dt: f32) -> Self {
        Self { world, input, viewer, dt, edits: Vec::new() }
    }
}

/// Callbacks the frame loop drives on every entity, in entity order
pub trait Lifecycle {
    fn on_load(&mut self, _ctx: &mut UpdateContext) {}
    /// game-logic tick
    fn on_update(&mut self, _ctx: &mut UpdateContext) {}
    /// once per rendered frame
    fn on_frame_update(&mut self, _ctx: &mut UpdateContext) {}
    /// fixed physics step
    fn on_fixed_update(&mut self, _ctx: &mut UpdateContext) {}
    fn on_unload(&mut self, _ctx: &mut UpdateContext) {}
}

pub struct PlayerEntity {
    pub player: Player,
    pub controller: PlayerController,
}

impl Lifecycle for PlayerEntity {
    fn on_load(&mut self, ctx: &mut UpdateContext) {
        info!("player spawned at {:?}", self.player.position());
        ctx.viewer = self.player.position();
    }

    fn on_frame_update(&mut self, ctx: &mut UpdateContext) {
        if let Some(edit) = self.controller.frame_update(&mut self.player, ctx.world, ctx.input, ctx.dt) {
            ctx.edits.push(edit);
        }
        ctx.viewer = self.player.position();
    }

    fn on_fixed_update(&mut self, ctx: &mut UpdateContext) {
        self.controller.fixed_update(&mut self.player, ctx.world, ctx.input, ctx.dt);
        ctx.viewer = self.player.position();
    }

    fn on_unload(&mut self, ctx: &mut UpdateContext) {
        if ctx.input.is_pointer_locked() {
            ctx.input.request_pointer_lock(false);
        }
    }
}

/// Sky dome centred on the viewer
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sky {
    pub position: Vec3,
    pub radius: f32,
}

impl Sky {
    pub fn new(radius: f32) -> Self {
        Self { position: Vec3::ZERO, radius }
    }
}

impl Lifecycle for Sky {
    fn on_load(&mut self, ctx: &mut UpdateContext) {
        self.position = ctx.viewer;
    }

    fn on_frame_update(&mut self, ctx: &mut UpdateContext) {
        self.position = ctx.viewer;
    }
}

pub enum Entity {
    Player(Box<PlayerEntity>),
    Sky(Sky),
}

impl Entity {
    pub fn as_player(&self) -> Option<&PlayerEntity> {
        match self {
            Entity::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_player_mut(&mut self) -> Option<&mut PlayerEntity> {
        match self {
            Entity::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_sky(&self) -> Option<&Sky> {
        match self {
            Entity::Sky(s) => Some(s),
            _ => None,
        }
    }
}

impl Lifecycle for Entity {
    fn on_load(&mut self, ctx: &mut UpdateContext) {
        match self {
            Entity::Player(p) => p.on_load(ctx),
            Entity::Sky(s) => s.on_load(ctx),
        }
    }

    fn on_update(&mut self, ctx: &mut UpdateContext) {
        match self {
            Entity::Player(p) => p.on_update(ctx),
            Entity::Sky(s) => s.on_update(ctx),
        }
    }

    fn on_frame_update(&mut self, ctx: &mut UpdateContext) {
        match self {
            Entity::Player(p) => p.on_frame_update(ctx),
            Entity::Sky(s) => s.on_frame_update(ctx),
        }
    }

    fn on_fixed_update(&mut self, ctx: &mut UpdateContext) {
        match self {
            Entity::Player(p) => p.on_fixed_update(ctx),
            Entity::Sky(s) => s.on_fixed_update(ctx),
        }
    }

    fn on_unload(&mut self, ctx: &mut UpdateContext) {
        match self {
            Entity::Player(p) => p.on_unload(ctx),
            Entity::Sky(s) => s.on_unload(ctx),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PlayerConfig, WorldConfig};
    use crate::controller::input::InputProcessor;
    use crate::model::world::MaterialTable;

    #[test]
    fn test_sky_follows_player() {
        let config = WorldConfig { world_size: 8, map_height: 8, chunk_size: 4, ..Default::default() };
        let mut world = World::new(&config, MaterialTable::default()).unwrap();
        let mut input = InputState::new();

        let player_config = PlayerConfig::default();
        let mut player = Player::new(&player_config, 800, 600);
        player.set_position(Vec3::new(1.0, 5.0, -2.0));
        let mut entities = vec![
            Entity::Player(Box::new(PlayerEntity {
                player,
                controller: PlayerController::new(InputProcessor::default(), player_config),
            })),
            Entity::Sky(Sky::new(500.0)),
        ];

        let mut ctx = UpdateContext::new(&mut world, &mut input, Vec3::ZERO, 0.016);
        for entity in entities.iter_mut() {
            entity.on_load(&mut ctx);
        }
        assert_eq!(entities[1].as_sky().map(|s| s.position), Some(Vec3::new(1.0, 5.0, -2.0)));

        if let Some(p) = entities[0].as_player_mut() {
            p.player.set_position(Vec3::new(3.0, 5.0, 0.0));
        }
        for entity in entities.iter_mut() {
            entity.on_frame_update(&mut ctx);
        }
        assert_eq!(entities[1].as_sky().map(|s| s.position), Some(Vec3::new(3.0, 5.0, 0.0)));
        assert!(entities[0].as_player().is_some());
        assert!(entities[1].as_player().is_none());
    }
}
