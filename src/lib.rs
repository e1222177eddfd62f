pub mod config;
pub mod error;
pub mod logging;
pub mod utils;

// MVC Architecture
pub mod model;
pub mod view;
pub mod controller;

#[cfg(target_arch = "wasm32")]
pub mod wasm_api;

pub use config::EngineConfig;
pub use controller::Game;
pub use error::EngineError;
pub use model::world::{MaterialTable, World};

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    logging::init();
}
