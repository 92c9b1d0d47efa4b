//! Dragon Maze core crate.
//!
//! Two canvas games share this crate. Dragon Maze is a procedurally generated
//! grid maze gated by riddles and paid doors. The platformer is a small
//! side-scroller. Everything outside [`dragon`], [`platformer`]'s page glue,
//! [`storage::BrowserStorage`] and [`logging`] is plain Rust and runs natively,
//! which is how the tests drive it.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod dragon;
pub mod error;
pub mod history;
pub mod logging;
pub mod maze;
pub mod platformer;
pub mod riddle;
pub mod session;
pub mod storage;

pub use config::GameConfig;
pub use error::{ConfigError, MazeError, StorageError};
pub use maze::{Cell, Difficulty, Door, Grid, LevelLayout, Pos, PuzzlePoint};
pub use session::Session;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    logging::init();
}

/// Start whichever game the page hosts, judged by its canvas id.
#[wasm_bindgen]
pub fn start_game() -> Result<(), JsValue> {
    let doc = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    if doc.get_element_by_id(dragon::CANVAS_ID).is_some() {
        dragon::start_dragon_maze()
    } else if doc.get_element_by_id(platformer::CANVAS_ID).is_some() {
        platformer::start_platformer()
    } else {
        Err(JsValue::from_str("page has neither #dragonCanvas nor #gameCanvas"))
    }
}
