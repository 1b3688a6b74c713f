//! Repeat core crate.
//!
//! A Simon-style memory game: the computer plays a pattern of four notes that grows by one
//! each round and the player plays it back. The state machine in [`game`] is headless; it
//! talks to the page only through the [`scheduler::Scheduler`] and [`presenter::Presenter`]
//! traits, and raw device events reach it through [`input::InputMapper`]. The [`web`] module
//! wires those to the DOM for the wasm build.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod game;
pub mod input;
pub mod logging;
pub mod note;
pub mod pattern;
pub mod presenter;
pub mod scheduler;
pub mod web;

pub use config::{Difficulty, GameConfig, Timing};
pub use error::{Error, Result};
pub use game::{Game, GameView, Phase};
pub use input::{Command, InputMapper};
pub use note::{Note, WIN_TUNE};
pub use pattern::{NoteSource, Pattern, RandomNotes};
pub use presenter::{Event, Marker, Presenter, Round};
pub use scheduler::{ManualScheduler, Scheduler, Timer, Wakeup};

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init(log::LevelFilter::Info);
}

// -----------------------------------------------------------------------------
// JS entrypoints (the page calls `mount()` once the DOM is ready)
// -----------------------------------------------------------------------------

#[wasm_bindgen]
pub fn start_game() -> std::result::Result<(), JsValue> {
    web::start_game()
}

#[wasm_bindgen]
pub fn teardown() {
    web::teardown();
}

/// Current phase, level and cursor as JSON, for page scripts and debugging.
#[cfg(feature = "serde_json")]
#[wasm_bindgen]
pub fn snapshot() -> std::result::Result<String, JsValue> {
    let view = web::view().ok_or_else(|| JsValue::from_str("game not mounted"))?;
    serde_json::to_string(&view).map_err(|e| JsValue::from_str(&e.to_string()))
}
