//! Entry points for the browser UI. The page owns the canvas, DOM events and
//! draw calls; it feeds input in, advances the clock once per animation frame
//! and pulls instance buffers out whenever `mesh_version` moves.

use js_sys::Float32Array;
use wasm_bindgen::prelude::*;

use crate::config::EngineConfig;
use crate::controller::{Game, InputEvent, MouseButton};
use crate::error::EngineError;
use crate::model::world::MaterialTable;
use crate::utils::WorldCoord;
use crate::view::FaceInstance;

fn js_error(err: EngineError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
pub struct WasmGame {
    game: Game,
}

#[wasm_bindgen]
impl WasmGame {
    /// Empty strings select the built-in config and material table
    #[wasm_bindgen(constructor)]
    pub fn new(config_json: &str, materials_json: &str, width: u32, height: u32) -> Result<WasmGame, JsValue> {
        let config = if config_json.trim().is_empty() {
            EngineConfig::default()
        } else {
            EngineConfig::from_json(config_json).map_err(js_error)?
        };
        let materials = if materials_json.trim().is_empty() {
            MaterialTable::default()
        } else {
            MaterialTable::from_json(materials_json).map_err(js_error)?
        };
        let game = Game::new(config, materials, width, height).map_err(js_error)?;
        Ok(WasmGame { game })
    }

    // ------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------

    pub fn key_down(&mut self, code: &str) {
        self.game.handle_event(&InputEvent::KeyDown(code.to_string()));
    }

    pub fn key_up(&mut self, code: &str) {
        self.game.handle_event(&InputEvent::KeyUp(code.to_string()));
    }

    pub fn mouse_move(&mut self, dx: f32, dy: f32) {
        self.game.handle_event(&InputEvent::MouseMove { dx, dy });
    }

    /// `button` as in `MouseEvent.button`
    pub fn mouse_button(&mut self, button: i16, is_down: bool) {
        if let Some(button) = MouseButton::from_web_button(button) {
            self.game.handle_event(&InputEvent::MouseButton { button, is_down });
        }
    }

    pub fn wheel(&mut self, delta_y: f32) {
        self.game.handle_event(&InputEvent::MouseWheel { delta_y });
    }

    pub fn focus_lost(&mut self) {
        self.game.handle_event(&InputEvent::FocusLost);
    }

    pub fn visibility_changed(&mut self, visible: bool) {
        self.game.handle_event(&InputEvent::VisibilityChanged { visible });
    }

    pub fn pointer_lock_changed(&mut self, locked: bool) {
        self.game.handle_event(&InputEvent::PointerLockChanged { locked });
    }

    /// `Some(true)` asks the page to request pointer lock, `Some(false)` to exit it
    pub fn take_pointer_lock_request(&mut self) -> Option<bool> {
        self.game.input_mut().take_pointer_lock_request()
    }

    // ------------------------------------------------------------------
    // Loop
    // ------------------------------------------------------------------

    /// `now` is the `requestAnimationFrame` timestamp in milliseconds.
    /// Returns true when a frame is due.
    pub fn advance(&mut self, now: f64) -> bool {
        self.game.advance(now / 1000.0).frame.is_some()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.game.resize(width, height);
    }

    // ------------------------------------------------------------------
    // World
    // ------------------------------------------------------------------

    pub fn get_block(&self, x: i32, y: i32, z: i32) -> Option<i32> {
        self.game.world().block_id(WorldCoord(x, y, z))
    }

    pub fn set_block(&mut self, x: i32, y: i32, z: i32, id: i32) -> bool {
        self.game.world_mut().set_block(WorldCoord(x, y, z), id)
    }

    pub fn render_count(&self) -> usize {
        self.game.world().render_count()
    }

    /// Changes whenever the instance buffers must be re-fetched
    pub fn mesh_version(&self) -> f64 {
        self.game.world().mesh_version() as f64
    }

    pub fn floats_per_instance(&self) -> usize {
        FaceInstance::FLOATS
    }

    pub fn opaque_instances(&self) -> Float32Array {
        let floats = self.game.world().mesh().map(|m| m.opaque_floats()).unwrap_or(&[]);
        Float32Array::from(floats)
    }

    pub fn transparent_instances(&self) -> Float32Array {
        let floats = self.game.world().mesh().map(|m| m.transparent_floats()).unwrap_or(&[]);
        Float32Array::from(floats)
    }

    // ------------------------------------------------------------------
    // Player
    // ------------------------------------------------------------------

    pub fn view_proj(&self) -> Float32Array {
        let matrix = self.game.player().map(|p| p.camera.view_proj()).unwrap_or_default();
        Float32Array::from(&matrix.to_cols_array()[..])
    }

    pub fn player_position(&self) -> Float32Array {
        let position = self.game.player().map(|p| p.position()).unwrap_or_default();
        Float32Array::from(&position.to_array()[..])
    }

    /// `[x, y, z, hit_x, hit_y, hit_z, distance]` of the targeted block
    pub fn selection(&self) -> Option<Float32Array> {
        let picked = self.game.player()?.selection?;
        let coord = picked.coord().as_vec3();
        let hit = picked.intersection.point;
        let values = [coord.x, coord.y, coord.z, hit.x, hit.y, hit.z, picked.intersection.distance];
        Some(Float32Array::from(&values[..]))
    }

    pub fn quick_slot(&self) -> usize {
        self.game.player().map_or(0, |p| p.quick_slots.current())
    }

    pub fn equipped_block(&self) -> Option<i32> {
        self.game.player()?.equipped_block()
    }

    pub fn flying(&self) -> bool {
        self.game.player().is_some_and(|p| p.flying)
    }
}
