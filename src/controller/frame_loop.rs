use glam::Vec3;
use tracing::{info, warn};

use super::entity::{Entity, Lifecycle, PlayerEntity, Sky, UpdateContext};
use super::input::{InputEvent, InputProcessor, InputState};
use super::player_controller::{BlockEdit, PlayerController};
use crate::config::{EngineConfig, TimingConfig};
use crate::error::EngineError;
use crate::model::world::{MaterialTable, World};
use crate::model::Player;
use crate::utils::{ChunkIndex, WorldCoord};

const SKY_RADIUS: f32 = 500.0;

/// Work due in one display-refresh callback
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameSteps {
    /// seconds since the last rendered frame, if a frame is due
    pub frame: Option<f32>,
    /// seconds since the last logic tick, if a tick is due
    pub tick: Option<f32>,
    pub fixed_steps: u32,
    /// fixed steps dropped by the backlog clamp
    pub dropped_steps: u32,
}

/// Three cadences on one clock: frames (uncapped or capped), logic ticks and
/// fixed physics steps with catch-up
#[derive(Clone, Debug)]
pub struct FrameClock {
    frame_interval: f64,
    tick_interval: f64,
    fixed_interval: f64,
    max_fixed_steps: u32,

    last_frame: f64,
    last_tick: f64,
    last_fixed: f64,
    accumulator: f64,
    started: bool,
}

impl FrameClock {
    pub fn new(timing: &TimingConfig) -> Self {
        let interval = |rate: f64| if rate > 0.0 { 1.0 / rate } else { 0.0 };
        Self {
            frame_interval: interval(timing.frames_per_second),
            tick_interval: interval(timing.ticks_per_second),
            fixed_interval: interval(timing.fixed_steps_per_second),
            max_fixed_steps: timing.max_fixed_steps_per_frame.max(1),
            last_frame: 0.0,
            last_tick: 0.0,
            last_fixed: 0.0,
            accumulator: 0.0,
            started: false,
        }
    }

    pub fn fixed_interval(&self) -> f64 {
        self.fixed_interval
    }

    /// Moves every anchor to `now` and forgets accumulated time
    pub fn reset(&mut self, now: f64) {
        self.last_frame = now;
        self.last_tick = now;
        self.last_fixed = now;
        self.accumulator = 0.0;
        self.started = true;
    }

    /// `now` in seconds, monotonic
    pub fn advance(&mut self, now: f64) -> FrameSteps {
        if !self.started {
            self.reset(now);
            return FrameSteps { frame: Some(0.0), ..Default::default() };
        }

        let mut steps = FrameSteps::default();

        let since_frame = now - self.last_frame;
        if since_frame >= self.frame_interval {
            steps.frame = Some(since_frame as f32);
            self.last_frame = now;
        }

        let since_tick = now - self.last_tick;
        if self.tick_interval > 0.0 && since_tick >= self.tick_interval {
            steps.tick = Some(since_tick as f32);
            self.last_tick = now;
        }

        if self.fixed_interval > 0.0 {
            self.accumulator += (now - self.last_fixed).max(0.0);
            self.last_fixed = now;
            while self.accumulator >= self.fixed_interval {
                if steps.fixed_steps == self.max_fixed_steps {
                    steps.dropped_steps = (self.accumulator / self.fixed_interval) as u32;
                    self.accumulator = 0.0;
                    warn!(
                        "physics backlog clamped: {} steps run, {} dropped",
                        steps.fixed_steps, steps.dropped_steps
                    );
                    break;
                }
                self.accumulator -= self.fixed_interval;
                steps.fixed_steps += 1;
            }
        }

        steps
    }
}

/// Owns the world, the input snapshot and the entities, and drives them from
/// a single clock
pub struct Game {
    config: EngineConfig,
    world: World,
    input: InputState,
    entities: Vec<Entity>,
    clock: FrameClock,
    rendered_chunk: Option<ChunkIndex>,
    edits: Vec<BlockEdit>,
}

impl Game {
    pub fn new(config: EngineConfig, materials: MaterialTable, width: u32, height: u32) -> Result<Self, EngineError> {
        config.validate()?;
        let world = World::generate(&config.world, &config.terrain, materials)?;
        Ok(Self::with_world(config, world, width, height))
    }

    /// Builds a game around an existing world
    pub fn with_world(config: EngineConfig, world: World, width: u32, height: u32) -> Self {
        let player = Player::new(&config.player, width, height);
        let controller = PlayerController::new(InputProcessor::default(), config.player.clone());
        let entities = vec![
            Entity::Player(Box::new(PlayerEntity { player, controller })),
            Entity::Sky(Sky::new(SKY_RADIUS)),
        ];

        let mut game = Self {
            clock: FrameClock::new(&config.timing),
            config,
            world,
            input: InputState::new(),
            entities,
            rendered_chunk: None,
            edits: Vec::new(),
        };
        game.dispatch(0.0, |entity, ctx| entity.on_load(ctx));
        game.refresh_render();
        game
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn player(&self) -> Option<&Player> {
        self.entities.iter().find_map(Entity::as_player).map(|p| &p.player)
    }

    pub fn player_mut(&mut self) -> Option<&mut Player> {
        self.entities.iter_mut().find_map(Entity::as_player_mut).map(|p| &mut p.player)
    }

    pub fn sky(&self) -> Option<&Sky> {
        self.entities.iter().find_map(Entity::as_sky)
    }

    fn viewer(&self) -> Vec3 {
        self.player().map_or(Vec3::ZERO, Player::position)
    }

    /// Block edits made by the player since the last call
    pub fn take_edits(&mut self) -> Vec<BlockEdit> {
        std::mem::take(&mut self.edits)
    }

    pub fn handle_event(&mut self, event: &InputEvent) {
        self.input.process_event(event, self.config.timing.pointer_lock_cooldown);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if let Some(player) = self.player_mut() {
            player.camera.set_aspect(width, height);
        }
    }

    /// Runs whatever is due at `now` (seconds): fixed steps first, then the
    /// logic tick, then the frame
    pub fn advance(&mut self, now: f64) -> FrameSteps {
        if self.input.take_visibility_change() {
            self.clock.reset(now);
            return FrameSteps::default();
        }

        let steps = self.clock.advance(now);
        let fixed_dt = self.clock.fixed_interval() as f32;
        for _ in 0..steps.fixed_steps {
            self.dispatch(fixed_dt, |entity, ctx| entity.on_fixed_update(ctx));
        }

        if let Some(dt) = steps.tick {
            self.input.tick(dt);
            self.dispatch(dt, |entity, ctx| entity.on_update(ctx));
            self.refresh_render();
        }

        if let Some(dt) = steps.frame {
            self.dispatch(dt, |entity, ctx| entity.on_frame_update(ctx));
            self.input.end_frame();
        }

        steps
    }

    /// Re-renders the world when the viewer has crossed into another chunk
    fn refresh_render(&mut self) {
        let viewer = WorldCoord::from_point(self.viewer());
        let chunk = viewer.to_chunk_index(self.world.chunk_size());
        if self.rendered_chunk == Some(chunk) {
            return;
        }
        info!("viewer entered chunk {:?}", chunk);
        self.world.render(viewer, self.config.world.view_distance);
        self.rendered_chunk = Some(chunk);
    }

    fn dispatch<F>(&mut self, dt: f32, mut callback: F)
    where
        F: FnMut(&mut Entity, &mut UpdateContext),
    {
        let viewer = self.viewer();
        let mut ctx = UpdateContext::new(&mut self.world, &mut self.input, viewer, dt);
        for entity in self.entities.iter_mut() {
            callback(entity, &mut ctx);
        }
        self.edits.append(&mut ctx.edits);
    }

    /// Unloads every entity; the game is inert afterwards
    pub fn shutdown(&mut self) {
        self.dispatch(0.0, |entity, ctx| entity.on_unload(ctx));
        self.entities.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WorldConfig;
    use crate::model::world::ids;

    fn timing() -> TimingConfig {
        TimingConfig {
            frames_per_second: 0.0,
            ticks_per_second: 60.0,
            fixed_steps_per_second: 100.0,
            max_fixed_steps_per_frame: 5,
            pointer_lock_cooldown: 1.5,
        }
    }

    #[test]
    fn test_first_advance_only_starts_clock() {
        let mut clock = FrameClock::new(&timing());
        let steps = clock.advance(10.0);
        assert_eq!(steps.frame, Some(0.0));
        assert_eq!(steps.tick, None);
        assert_eq!(steps.fixed_steps, 0);
    }

    #[test]
    fn test_fixed_steps_catch_up() {
        let mut clock = FrameClock::new(&timing());
        clock.advance(0.0);
        let steps = clock.advance(0.035);
        assert_eq!(steps.fixed_steps, 3);
        assert!(steps.tick.is_some());
        assert!(steps.frame.is_some());

        // the leftover 5ms carries into the next frame
        let steps = clock.advance(0.041);
        assert_eq!(steps.fixed_steps, 1);
        assert_eq!(steps.tick, None, "tick interval not reached yet");
    }

    #[test]
    fn test_backlog_is_clamped() {
        let mut clock = FrameClock::new(&timing());
        clock.advance(0.0);
        let steps = clock.advance(2.0);
        assert_eq!(steps.fixed_steps, 5);
        assert!(steps.dropped_steps >= 190);

        let steps = clock.advance(2.001);
        assert_eq!(steps.fixed_steps, 0, "dropped backlog does not come back");
    }

    #[test]
    fn test_reset_forgets_elapsed_time() {
        let mut clock = FrameClock::new(&timing());
        clock.advance(0.0);
        clock.reset(100.0);
        let steps = clock.advance(100.005);
        assert_eq!(steps.fixed_steps, 0);
        assert_eq!(steps.tick, None);
    }

    #[test]
    fn test_frame_cap() {
        let mut clock = FrameClock::new(&TimingConfig { frames_per_second: 30.0, ..timing() });
        clock.advance(0.0);
        assert_eq!(clock.advance(0.010).frame, None);
        assert!(clock.advance(0.034).frame.is_some());
    }

    fn small_game() -> Game {
        let mut config = EngineConfig::default();
        config.world = WorldConfig { world_size: 16, map_height: 32, chunk_size: 8, view_distance: 4, ..Default::default() };
        config.timing = timing();
        Game::new(config, MaterialTable::default(), 800, 600).unwrap()
    }

    #[test]
    fn test_game_renders_on_creation() {
        let game = small_game();
        assert!(game.world().render_count() > 0);
        assert!(game.world().mesh().is_some());
        assert_eq!(game.sky().map(|s| s.position), game.player().map(Player::position));
    }

    #[test]
    fn test_visibility_change_skips_catch_up() {
        let mut game = small_game();
        game.advance(0.0);
        game.handle_event(&InputEvent::VisibilityChanged { visible: false });
        game.handle_event(&InputEvent::VisibilityChanged { visible: true });
        let steps = game.advance(60.0);
        assert_eq!(steps, FrameSteps::default());
        let steps = game.advance(60.011);
        assert_eq!(steps.fixed_steps, 1);
    }

    #[test]
    fn test_flying_player_holds_position() {
        let mut game = small_game();
        let start = game.player().map(Player::position);
        let mut now = 0.0;
        for _ in 0..30 {
            now += 1.0 / 60.0;
            game.advance(now);
        }
        assert_eq!(game.player().map(Player::position), start, "default player flies and has no input");
    }

    #[test]
    fn test_walking_player_falls_onto_terrain() {
        let mut game = small_game();
        if let Some(player) = game.player_mut() {
            player.flying = false;
        }
        let mut now = 0.0;
        for _ in 0..600 {
            now += 1.0 / 60.0;
            game.advance(now);
        }
        let player = game.player().unwrap();
        assert!(player.jumpable, "player ends up standing on something");
        let below = WorldCoord::from_point(player.foot_position() - Vec3::Y * 0.5);
        assert_ne!(game.world().block_id(below), Some(ids::AIR));
    }

    #[test]
    fn test_shutdown_releases_pointer_lock() {
        let mut game = small_game();
        game.handle_event(&InputEvent::PointerLockChanged { locked: true });
        game.shutdown();
        assert_eq!(game.input_mut().take_pointer_lock_request(), Some(false));
        assert!(game.player().is_none());
    }
}
