//! Headless driver: generates a world, lets the player fall onto it, walk,
//! dig and build, and logs what happened. `voxelite [config.json]`

use std::env;

use tracing::info;

use voxelite::controller::{InputEvent, MouseButton};
use voxelite::{logging, EngineConfig, EngineError, Game, MaterialTable};

const STEP: f64 = 1.0 / 60.0;

struct Script<'a> {
    game: &'a mut Game,
    now: f64,
}

impl Script<'_> {
    fn run_for(&mut self, seconds: f64) {
        let end = self.now + seconds;
        while self.now < end {
            self.now += STEP;
            self.game.advance(self.now);
        }
    }

    fn send(&mut self, event: InputEvent) {
        self.game.handle_event(&event);
    }

    fn tap_key(&mut self, code: &str) {
        self.send(InputEvent::KeyDown(code.to_string()));
        self.run_for(STEP);
        self.send(InputEvent::KeyUp(code.to_string()));
    }

    fn click(&mut self, button: MouseButton) {
        self.send(InputEvent::MouseButton { button, is_down: true });
        self.run_for(STEP);
        self.send(InputEvent::MouseButton { button, is_down: false });
    }
}

fn main() -> Result<(), EngineError> {
    logging::init();

    let config = match env::args().nth(1) {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    let mut game = Game::new(config, MaterialTable::default(), 1280, 720)?;
    info!(
        "world ready: {} faces, mesh v{}",
        game.world().render_count(),
        game.world().mesh_version()
    );

    let mut script = Script { game: &mut game, now: 0.0 };
    script.run_for(0.5);

    // land on the terrain
    script.tap_key("KeyO");
    script.run_for(3.0);

    // look down a little and walk
    script.send(InputEvent::PointerLockChanged { locked: true });
    script.send(InputEvent::MouseMove { dx: 0.0, dy: 150.0 });
    script.send(InputEvent::KeyDown("KeyW".into()));
    script.run_for(1.5);
    script.send(InputEvent::KeyUp("KeyW".into()));
    script.tap_key("Space");
    script.run_for(1.0);

    // dig the targeted block, then put one back
    script.click(MouseButton::Left);
    script.run_for(0.5);
    script.send(InputEvent::MouseWheel { delta_y: 1.0 });
    script.click(MouseButton::Right);
    script.run_for(0.5);
    script.tap_key("Backquote");

    let edits = game.take_edits();
    for edit in &edits {
        info!("edit: {:?} -> {}", edit.coord, edit.id);
    }
    if let Some(player) = game.player() {
        info!(
            "player at {:?} ({:?}), {} edits, {} faces",
            player.position(),
            player.mode(),
            edits.len(),
            game.world().render_count()
        );
    }

    game.shutdown();
    Ok(())
}
