//! Dragon Maze page (`#dragonCanvas`): keyboard input, the puzzle modal, door
//! prompts, persistence and the frame loop around a [`Session`].

mod modal;
pub mod render;

use std::cell::RefCell;
use std::rc::Rc;

use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{JsFuture, spawn_local};
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, KeyboardEvent, Request, Response,
    window,
};

use crate::config::{GameConfig, RiddleApi};
use crate::maze::{Direction, PuzzleId};
use crate::riddle::{Riddle, choice_for_key, random_bank_riddle};
use crate::session::{AnswerOutcome, DoorOffer, DoorOutcome, MoveOutcome, Session};
use crate::storage::{self, BrowserStorage, KeyValueStore, MemoryStore};

use render::Frame;

pub const CANVAS_ID: &str = "dragonCanvas";

/// How long answer feedback stays up before the modal closes.
const FEEDBACK_DELAY_MS: i32 = 2000;
const SKIP_DELAY_MS: i32 = 1500;

/// Chance per frame of drawing the dragon's flame.
const FLAME_CHANCE: f64 = 0.3;

struct DragonState {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    session: Session<StdRng>,
    store: Box<dyn KeyValueStore>,
    /// Cosmetic randomness, kept apart from the maze RNG.
    fx_rng: StdRng,
    /// A riddle request is in flight; movement waits for it.
    loading_puzzle: bool,
}

impl DragonState {
    fn save_score(&mut self) {
        if let Err(e) = storage::save_score(self.store.as_mut(), self.session.score()) {
            warn!("could not save score: {e}");
        }
    }

    fn save_history(&mut self) {
        if let Err(e) = storage::save_history(self.store.as_mut(), self.session.history()) {
            warn!("could not save riddle history: {e}");
        }
    }

    fn refresh_hud(&self, doc: &Document) {
        modal::update_hud(
            doc,
            self.session.level(),
            self.session.score(),
            self.session.lives(),
        );
    }
}

thread_local! {
    static DRAGON_STATE: RefCell<Option<DragonState>> = const { RefCell::new(None) };
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Run `f` against the live game, if one was started.
fn with_state<T>(f: impl FnOnce(&mut DragonState) -> T) -> Option<T> {
    DRAGON_STATE.with(|cell| cell.borrow_mut().as_mut().map(f))
}

fn document() -> Option<Document> {
    window().and_then(|w| w.document())
}

fn alert(message: &str) {
    if let Some(w) = window() {
        let _ = w.alert_with_message(message);
    }
}

fn confirm(message: &str) -> bool {
    window()
        .and_then(|w| w.confirm_with_message(message).ok())
        .unwrap_or(false)
}

fn after(ms: i32, f: fn()) {
    let Some(win) = window() else {
        return;
    };
    let callback = Closure::once_into_js(f);
    if let Err(e) =
        win.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), ms)
    {
        warn!("setTimeout failed: {e:?}");
    }
}

fn timestamp() -> String {
    String::from(js_sys::Date::new_0().to_iso_string())
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

// --- Startup -------------------------------------------------------------------

#[wasm_bindgen]
pub fn start_dragon_maze() -> Result<(), JsValue> {
    start(GameConfig::default())
}

/// Start with a JSON [`GameConfig`]; missing fields take their defaults.
#[wasm_bindgen]
pub fn start_dragon_maze_with_config(json: &str) -> Result<(), JsValue> {
    start(GameConfig::from_json(json).map_err(to_js)?)
}

fn start(mut config: GameConfig) -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas: HtmlCanvasElement = doc
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| JsValue::from_str("missing #dragonCanvas"))?
        .dyn_into()?;
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into()?;

    // The grid always fills the canvas actually on the page.
    config.canvas_width = canvas.width();
    config.canvas_height = canvas.height();
    config.validate().map_err(to_js)?;

    let store: Box<dyn KeyValueStore> = match BrowserStorage::open() {
        Ok(s) => Box::new(s),
        Err(e) => {
            warn!("{e}, progress will not be kept");
            Box::new(MemoryStore::default())
        }
    };
    let score = storage::load_score(store.as_ref());
    let history = storage::load_history(store.as_ref());
    let session =
        Session::new(config, StdRng::from_entropy(), score, history).map_err(to_js)?;
    info!(
        "dragon maze ready: {}x{} grid, score {score}",
        session.layout().grid.width(),
        session.layout().grid.height()
    );

    modal::ensure(&doc)?;
    let state = DragonState {
        canvas,
        ctx,
        session,
        store,
        fx_rng: StdRng::from_entropy(),
        loading_puzzle: false,
    };
    state.refresh_hud(&doc);
    let restarted = DRAGON_STATE.with(|s| s.replace(Some(state)).is_some());
    if restarted {
        return Ok(());
    }

    let closure = Closure::wrap(Box::new(move |evt: KeyboardEvent| {
        on_key(&evt);
    }) as Box<dyn FnMut(_)>);
    doc.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
    closure.forget();

    start_loop();
    Ok(())
}

fn start_loop() {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        with_state(|st| draw(st, ts));
        if let (Some(w), Some(cb)) = (window(), f.borrow().as_ref()) {
            let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut(f64)>));
    if let (Some(w), Some(cb)) = (window(), g.borrow().as_ref()) {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}

fn draw(st: &mut DragonState, now: f64) {
    let flame = st.fx_rng.gen_bool(FLAME_CHANCE);
    let frame = Frame {
        ctx: &st.ctx,
        width: st.canvas.width() as f64,
        height: st.canvas.height() as f64,
        cell: st.session.config().cell_size as f64,
        now,
        flame,
    };
    render::draw(&frame, &st.session);
}

// --- Input ---------------------------------------------------------------------

fn on_key(evt: &KeyboardEvent) {
    let busy = with_state(|st| st.loading_puzzle || st.session.active_puzzle().is_some())
        .unwrap_or(true);
    if busy {
        let key = evt.key();
        if key == "Enter" {
            evt.prevent_default();
            submit_selected_answer();
        } else if let Some(choice) = choice_for_key(&key) {
            evt.prevent_default();
            select_answer(choice);
        }
        return;
    }

    let Some(dir) = Direction::from_key_code(&evt.code()) else {
        return;
    };
    evt.prevent_default();
    let Some(doc) = document() else {
        return;
    };
    let outcome = with_state(|st| {
        let outcome = st.session.move_player(dir);
        st.refresh_hud(&doc);
        outcome
    });
    match outcome {
        Some(MoveOutcome::Puzzle(id)) => open_puzzle(id),
        Some(MoveOutcome::Door(offer)) => offer_door(offer),
        _ => {}
    }
}

// --- Puzzles -------------------------------------------------------------------

fn open_puzzle(id: PuzzleId) {
    let api = with_state(|st| {
        st.loading_puzzle = true;
        st.session.config().riddle_api.clone()
    })
    .flatten();
    match api {
        Some(api) => spawn_local(async move {
            let riddle = match fetch_riddle(&api).await {
                Ok(r) => Some(r),
                Err(e) => {
                    warn!("riddle API failed, using the built-in bank: {e:?}");
                    None
                }
            };
            present_puzzle(id, riddle);
        }),
        None => present_puzzle(id, None),
    }
}

/// One riddle from the configured API. Expects a JSON array of
/// `{question, answer}` objects.
async fn fetch_riddle(api: &RiddleApi) -> Result<Riddle, JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let request = Request::new_with_str(&api.url)?;
    request.headers().set("X-Api-Key", &api.api_key)?;
    let response: Response = JsFuture::from(win.fetch_with_request(&request))
        .await?
        .dyn_into()?;
    if !response.ok() {
        return Err(JsValue::from_str(&format!(
            "riddle API answered {}",
            response.status()
        )));
    }
    let body = JsFuture::from(response.text()?)
        .await?
        .as_string()
        .ok_or_else(|| JsValue::from_str("riddle API body is not text"))?;
    let riddles: Vec<Riddle> = serde_json::from_str(&body).map_err(to_js)?;
    riddles
        .into_iter()
        .next()
        .ok_or_else(|| JsValue::from_str("riddle API returned no riddles"))
}

fn present_puzzle(id: PuzzleId, riddle: Option<Riddle>) {
    let Some(doc) = document() else {
        return;
    };
    with_state(|st| {
        st.loading_puzzle = false;
        let riddle = riddle.unwrap_or_else(|| random_bank_riddle(st.session.rng()));
        let level = st.session.level();
        if let Some(active) = st.session.begin_puzzle(id, riddle) {
            modal::show(&doc, level, active);
        }
    });
}

#[wasm_bindgen]
pub fn select_answer(choice: usize) {
    let Some(doc) = document() else {
        return;
    };
    if with_state(|st| st.session.select_choice(choice)).unwrap_or(false) {
        modal::mark_selected(&doc, choice);
    }
}

#[wasm_bindgen]
pub fn submit_selected_answer() {
    let Some(doc) = document() else {
        return;
    };
    let ts = timestamp();
    let result = with_state(|st| {
        let outcome = st.session.submit_answer(&ts);
        if matches!(
            outcome,
            AnswerOutcome::Correct { .. } | AnswerOutcome::Wrong { .. }
        ) {
            st.save_history();
            st.refresh_hud(&doc);
        }
        let active = st.session.active_puzzle();
        (
            outcome,
            active.and_then(|a| a.riddle.correct_index),
            active.and_then(|a| a.selected),
            st.session.config().scoring.first_time_bonus,
        )
    });
    let Some((outcome, correct, selected, bonus)) = result else {
        return;
    };

    match outcome {
        AnswerOutcome::NotAccepting => {}
        AnswerOutcome::NoSelection => {
            modal::set_feedback(&doc, "Please select an answer first!", Some("feedback-wrong"));
        }
        AnswerOutcome::Correct {
            first_time_bonus, ..
        } => {
            modal::reveal(&doc, correct, None);
            let text = if first_time_bonus {
                format!("Correct! Well done! (+{bonus} first-time bonus)")
            } else {
                "Correct! Well done!".to_string()
            };
            modal::set_feedback(&doc, &text, Some("feedback-correct"));
            after(FEEDBACK_DELAY_MS, finish_puzzle);
        }
        AnswerOutcome::Wrong {
            correct_answer,
            lives_left,
        } => {
            modal::reveal(&doc, correct, selected);
            modal::set_feedback(
                &doc,
                &format!("Wrong! The correct answer was: {correct_answer}"),
                Some("feedback-wrong"),
            );
            if lives_left == 0 {
                after(FEEDBACK_DELAY_MS, game_over);
            } else {
                after(FEEDBACK_DELAY_MS, close_modal);
            }
        }
    }
}

#[wasm_bindgen]
pub fn skip_puzzle() {
    let Some(doc) = document() else {
        return;
    };
    let ts = timestamp();
    let penalty = with_state(|st| {
        st.session.skip_puzzle(&ts)?;
        st.save_history();
        st.refresh_hud(&doc);
        Some(st.session.config().scoring.skip_penalty)
    })
    .flatten();
    if let Some(penalty) = penalty {
        modal::set_feedback(
            &doc,
            &format!("Puzzle skipped! -{penalty} points"),
            Some("feedback-wrong"),
        );
        after(SKIP_DELAY_MS, finish_puzzle);
    }
}

fn close_modal() {
    if let Some(doc) = document() {
        modal::hide(&doc);
    }
    with_state(|st| st.session.close_puzzle());
}

/// Close the modal, then advance if that was the last puzzle of the level.
fn finish_puzzle() {
    close_modal();
    let Some(doc) = document() else {
        return;
    };
    let advance = with_state(|st| {
        let advance = st.session.check_level_complete();
        if let Ok(Some(_)) = advance {
            st.save_score();
        }
        st.refresh_hud(&doc);
        advance
    });
    match advance {
        Some(Ok(Some(adv))) => alert(&format!(
            "🎉 Level {} Complete! Bonus: {} points",
            adv.from_level, adv.bonus
        )),
        Some(Err(e)) => error!("could not build the next level: {e}"),
        _ => {}
    }
}

fn game_over() {
    close_modal();
    let Some((score, level)) = with_state(|st| (st.session.score(), st.session.level())) else {
        return;
    };
    alert(&format!("💀 Game Over! Final Score: {score}\nLevel Reached: {level}"));
    let Some(doc) = document() else {
        return;
    };
    with_state(|st| {
        if let Err(e) = st.session.restart() {
            error!("could not restart: {e}");
        }
        st.save_score();
        st.refresh_hud(&doc);
    });
}

// --- Doors ---------------------------------------------------------------------

fn offer_door(offer: DoorOffer) {
    if !offer.affordable() {
        alert(&offer.message());
        return;
    }
    if !confirm(&offer.message()) {
        return;
    }
    let Some(doc) = document() else {
        return;
    };
    let outcome = with_state(|st| {
        let outcome = st.session.pay_for_door(offer.door);
        if let Ok(DoorOutcome::Advanced(_)) = outcome {
            st.save_score();
        }
        st.refresh_hud(&doc);
        outcome
    });
    match outcome {
        Some(Ok(DoorOutcome::Advanced(adv))) => alert(&format!(
            "🚪 Advanced to Level {}! Door bonus: +{} points",
            adv.to_level, adv.bonus
        )),
        Some(Ok(DoorOutcome::CannotAfford)) => alert("You need more points!"),
        Some(Ok(DoorOutcome::Unavailable)) => {}
        Some(Err(e)) => error!("could not build the next level: {e}"),
        None => {}
    }
}

// --- Riddle statistics ---------------------------------------------------------

#[wasm_bindgen]
pub fn show_riddle_stats() {
    if let Some(report) = with_state(|st| st.session.history().stats_report()) {
        alert(&report);
    }
}

#[wasm_bindgen]
pub fn clear_riddle_history() {
    if !confirm("Are you sure you want to clear all riddle history? This cannot be undone!") {
        return;
    }
    let cleared = with_state(|st| {
        st.session.clear_history();
        st.save_history();
    });
    if cleared.is_some() {
        alert("Riddle history cleared!");
    }
}
