//! Side-scrolling platformer page (`#gameCanvas`). Simulation lives in
//! [`world`]; this module owns the canvas, keyboard state and frame loop.

pub mod world;

use std::cell::RefCell;
use std::rc::Rc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, window};

use world::{Enemy, Input, Player, Rect, World, WorldEvent};

pub const CANVAS_ID: &str = "gameCanvas";

struct PlatformerState {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    world: World,
    input: Input,
    rng: StdRng,
    /// Frames simulated since this run started.
    frames: u64,
}

thread_local! {
    static PLATFORMER_STATE: RefCell<Option<PlatformerState>> = const { RefCell::new(None) };
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

#[wasm_bindgen]
pub fn start_platformer() -> Result<(), JsValue> {
    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let canvas: HtmlCanvasElement = doc
        .get_element_by_id(CANVAS_ID)
        .ok_or_else(|| JsValue::from_str("missing #gameCanvas"))?
        .dyn_into()?;
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into()?;

    let state = PlatformerState {
        world: World::new(canvas.width() as f64),
        canvas,
        ctx,
        input: Input::default(),
        rng: StdRng::from_entropy(),
        frames: 0,
    };
    let restarted = PLATFORMER_STATE.with(|s| s.replace(Some(state)).is_some());
    if restarted {
        return Ok(());
    }

    for (event, down) in [("keydown", true), ("keyup", false)] {
        let closure = Closure::wrap(Box::new(move |evt: KeyboardEvent| {
            PLATFORMER_STATE.with(|cell| {
                if let Some(st) = cell.borrow_mut().as_mut() {
                    st.input.set_key(&evt.code(), down);
                }
            });
        }) as Box<dyn FnMut(_)>);
        doc.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    start_loop();
    Ok(())
}

fn start_loop() {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |_ts: f64| {
        PLATFORMER_STATE.with(|cell| {
            if let Some(st) = cell.borrow_mut().as_mut() {
                tick(st);
            }
        });
        if let (Some(w), Some(cb)) = (window(), f.borrow().as_ref()) {
            let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }) as Box<dyn FnMut(f64)>));
    if let (Some(w), Some(cb)) = (window(), g.borrow().as_ref()) {
        let _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
    }
}

/// Frames simulated in the current run, `None` before the first start.
pub fn frames() -> Option<u64> {
    PLATFORMER_STATE.with(|cell| cell.borrow().as_ref().map(|st| st.frames))
}

fn tick(st: &mut PlatformerState) {
    st.frames += 1;
    let events = st.world.step(st.input, &mut st.rng);
    update_hud(&st.world);
    for e in events {
        if let WorldEvent::GameOver { score } = e {
            if let Some(w) = window() {
                let _ = w.alert_with_message(&format!("Game Over! Final Score: {score}"));
            }
        }
    }
    render(st);
}

fn update_hud(world: &World) {
    let Some(doc) = window().and_then(|w| w.document()) else {
        return;
    };
    if let Some(el) = doc.get_element_by_id("score") {
        el.set_text_content(Some(&world.score.to_string()));
    }
    if let Some(el) = doc.get_element_by_id("lives") {
        el.set_text_content(Some(&world.lives.to_string()));
    }
}

// --- Rendering -----------------------------------------------------------------

fn fill(ctx: &CanvasRenderingContext2d, color: &str, x: f64, y: f64, w: f64, h: f64) {
    ctx.set_fill_style(&JsValue::from_str(color));
    ctx.fill_rect(x, y, w, h);
}

fn render(st: &mut PlatformerState) {
    let ctx = &st.ctx;
    ctx.clear_rect(0.0, 0.0, st.canvas.width() as f64, st.canvas.height() as f64);
    ctx.save();
    let _ = ctx.translate(-st.world.camera_x, 0.0);

    for p in &st.world.platforms {
        draw_platform(ctx, p);
    }
    for c in st.world.coins.iter_mut().filter(|c| !c.collected) {
        c.spin += 0.1;
        draw_coin(ctx, &c.rect, c.spin);
    }
    for e in st.world.enemies.iter().filter(|e| e.alive) {
        draw_enemy(ctx, e);
    }
    draw_player(ctx, &st.world.player);
    ctx.restore();
}

fn draw_platform(ctx: &CanvasRenderingContext2d, p: &Rect) {
    fill(ctx, "#8B4513", p.x, p.y, p.w, p.h);
    fill(ctx, "#228B22", p.x, p.y, p.w, 5.0);
    ctx.set_stroke_style(&JsValue::from_str("#654321"));
    ctx.set_line_width(2.0);
    ctx.stroke_rect(p.x, p.y, p.w, p.h);
}

fn draw_coin(ctx: &CanvasRenderingContext2d, r: &Rect, spin: f64) {
    ctx.save();
    let _ = ctx.translate(r.x + r.w / 2.0, r.y + r.h / 2.0);
    let _ = ctx.scale(spin.cos(), 1.0);
    ctx.set_fill_style(&JsValue::from_str("#FFD700"));
    ctx.begin_path();
    let _ = ctx.arc(0.0, 0.0, r.w / 2.0, 0.0, std::f64::consts::TAU);
    ctx.fill();
    ctx.set_fill_style(&JsValue::from_str("#FFF8DC"));
    ctx.begin_path();
    let _ = ctx.arc(-2.0, -2.0, r.w / 4.0, 0.0, std::f64::consts::TAU);
    ctx.fill();
    ctx.restore();
}

fn draw_enemy(ctx: &CanvasRenderingContext2d, e: &Enemy) {
    let Rect { x, y, w, h } = e.rect;
    fill(ctx, "#8B4513", x, y, w, h);
    fill(ctx, "#ffffff", x + 5.0, y + 5.0, 4.0, 4.0);
    fill(ctx, "#ffffff", x + 16.0, y + 5.0, 4.0, 4.0);
    fill(ctx, "#000000", x + 6.0, y + 6.0, 2.0, 2.0);
    fill(ctx, "#000000", x + 17.0, y + 6.0, 2.0, 2.0);
    // brows
    fill(ctx, "#000000", x + 4.0, y + 3.0, 6.0, 2.0);
    fill(ctx, "#000000", x + 15.0, y + 3.0, 6.0, 2.0);
}

fn draw_player(ctx: &CanvasRenderingContext2d, p: &Player) {
    let Rect { x, y, w, h } = p.rect;
    fill(ctx, "#ff0000", x, y, w, h);
    fill(ctx, "#cc0000", x + 2.0, y - 5.0, w - 4.0, 8.0);
    fill(ctx, "#ffdbac", x + 5.0, y + 5.0, w - 10.0, 15.0);
    fill(ctx, "#000000", x + 8.0, y + 8.0, 3.0, 3.0);
    fill(ctx, "#000000", x + 19.0, y + 8.0, 3.0, 3.0);
    fill(ctx, "#8B4513", x + 10.0, y + 15.0, 10.0, 3.0);
}
