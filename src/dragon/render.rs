//! Canvas drawing for Dragon Maze. Pure output: reads the session, never
//! changes it.

use std::f64::consts::TAU;

use rand::Rng;
use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::maze::{Cell, Pos};
use crate::session::Session;

/// Side of the dragon sprite in pixels; it sits centred in its cell.
pub const PLAYER_SIZE: f64 = 20.0;

/// Fraction of the canvas height painted as sky.
const SKY_FRACTION: f64 = 0.6;

pub struct Frame<'a> {
    pub ctx: &'a CanvasRenderingContext2d,
    pub width: f64,
    pub height: f64,
    pub cell: f64,
    /// `requestAnimationFrame` timestamp in milliseconds.
    pub now: f64,
    pub flame: bool,
}

impl Frame<'_> {
    fn fill(&self, color: &str, x: f64, y: f64, w: f64, h: f64) {
        self.ctx.set_fill_style(&JsValue::from_str(color));
        self.ctx.fill_rect(x, y, w, h);
    }

    fn origin(&self, pos: Pos) -> (f64, f64) {
        (pos.x as f64 * self.cell, pos.y as f64 * self.cell)
    }
}

pub fn draw<R: Rng>(frame: &Frame<'_>, session: &Session<R>) {
    frame.ctx.clear_rect(0.0, 0.0, frame.width, frame.height);
    draw_background(frame);
    draw_clouds(frame, session.level());

    let layout = session.layout();
    for (pos, cell) in layout.grid.cells() {
        if cell == Cell::Wall {
            let (x, y) = frame.origin(pos);
            draw_block(frame, x, y);
        }
    }
    for p in layout.puzzles.iter().filter(|p| !session.is_solved(p.id)) {
        draw_chest(frame, p.pos);
    }
    for d in layout.doors.iter().filter(|d| !session.is_door_used(d.id)) {
        draw_door(frame, d.pos, d.cost);
    }
    draw_dragon(frame, session.player());
    draw_sky_grid(frame);
}

fn draw_background(frame: &Frame<'_>) {
    let ctx = frame.ctx;
    let gradient = ctx.create_linear_gradient(0.0, 0.0, 0.0, frame.height);
    for (stop, color) in [
        (0.0, "#87CEEB"),
        (SKY_FRACTION, "#87CEEB"),
        (SKY_FRACTION, "#90EE90"),
        (1.0, "#228B22"),
    ] {
        let _ = gradient.add_color_stop(stop as f32, color);
    }
    ctx.set_fill_style(&gradient);
    ctx.fill_rect(0.0, 0.0, frame.width, frame.height);
}

fn draw_clouds(frame: &Frame<'_>, level: u32) {
    frame
        .ctx
        .set_fill_style(&JsValue::from_str("rgba(255, 255, 255, 0.8)"));
    // Shifted per level so consecutive mazes look different.
    let offset = (level as f64 * 50.0) % frame.width;
    draw_cloud(frame.ctx, 100.0 + offset, 50.0);
    draw_cloud(frame.ctx, 300.0 + offset, 80.0);
    draw_cloud(frame.ctx, 500.0 + offset, 40.0);
    draw_cloud(frame.ctx, (700.0 + offset) % frame.width, 70.0);
}

fn draw_cloud(ctx: &CanvasRenderingContext2d, x: f64, y: f64) {
    ctx.begin_path();
    for (dx, dy, r) in [
        (0.0, 0.0, 20.0),
        (25.0, 0.0, 25.0),
        (50.0, 0.0, 20.0),
        (15.0, -15.0, 15.0),
        (35.0, -15.0, 18.0),
    ] {
        let _ = ctx.arc(x + dx, y + dy, r, 0.0, TAU);
    }
    ctx.fill();
}

/// Brick block for a wall cell.
fn draw_block(frame: &Frame<'_>, x: f64, y: f64) {
    let s = frame.cell;
    frame.fill("#8B4513", x, y, s, s);
    frame.fill("#A0522D", x, y, s, 3.0);
    frame.fill("#A0522D", x, y, 3.0, s);
    frame.fill("#654321", x, y + s - 3.0, s, 3.0);
    frame.fill("#654321", x + s - 3.0, y, 3.0, s);

    let ctx = frame.ctx;
    ctx.set_stroke_style(&JsValue::from_str("#654321"));
    ctx.set_line_width(1.0);
    ctx.begin_path();
    ctx.move_to(x + 3.0, y + s / 2.0);
    ctx.line_to(x + s - 3.0, y + s / 2.0);
    ctx.move_to(x + s / 3.0, y + 3.0);
    ctx.line_to(x + s / 3.0, y + s / 2.0);
    ctx.move_to(x + 2.0 * s / 3.0, y + s / 2.0);
    ctx.line_to(x + 2.0 * s / 3.0, y + s - 3.0);
    ctx.stroke();
}

fn draw_chest(frame: &Frame<'_>, pos: Pos) {
    let (x, y) = frame.origin(pos);
    let s = frame.cell;
    let glow = (frame.now * 0.003).sin() * 0.3 + 0.7;
    frame.fill(&format!("rgba(255, 215, 0, {glow})"), x + 2.0, y + 2.0, s - 4.0, s - 4.0);

    let ctx = frame.ctx;
    ctx.set_fill_style(&JsValue::from_str("#000"));
    ctx.set_font("16px Arial");
    ctx.set_text_align("center");
    let _ = ctx.fill_text("?", x + s / 2.0, y + s / 2.0 + 6.0);
}

fn draw_door(frame: &Frame<'_>, pos: Pos, cost: i64) {
    let (x, y) = frame.origin(pos);
    let s = frame.cell;
    let pulse = (frame.now * 0.005).sin() * 0.2 + 0.8;
    frame.fill(&format!("rgba(139, 69, 19, {pulse})"), x + 1.0, y + 1.0, s - 2.0, s - 2.0);
    frame.fill(
        &format!("rgba(138, 43, 226, {})", 0.6 + pulse * 0.4),
        x + 4.0,
        y + 4.0,
        s - 8.0,
        s - 8.0,
    );

    let ctx = frame.ctx;
    ctx.set_text_align("center");
    ctx.set_fill_style(&JsValue::from_str("#FFD700"));
    ctx.set_font("12px Arial");
    let _ = ctx.fill_text("🚪", x + s / 2.0, y + s / 2.0 + 3.0);
    ctx.set_fill_style(&JsValue::from_str("#fff"));
    ctx.set_font("8px Arial");
    let _ = ctx.fill_text(&cost.to_string(), x + s / 2.0, y + s - 2.0);
}

fn draw_dragon(frame: &Frame<'_>, pos: Pos) {
    let (cx, cy) = frame.origin(pos);
    let inset = (frame.cell - PLAYER_SIZE) / 2.0;
    let (x, y) = (cx + inset, cy + inset);
    frame.fill("#d32f2f", x, y, PLAYER_SIZE, PLAYER_SIZE);
    frame.fill("#ffeb3b", x + 4.0, y + 4.0, 3.0, 3.0);
    frame.fill("#ffeb3b", x + 13.0, y + 4.0, 3.0, 3.0);
    if frame.flame {
        frame.fill("#ff5722", x - 5.0, y + 8.0, 8.0, 4.0);
    }
}

/// Faint grid over the sky band only.
fn draw_sky_grid(frame: &Frame<'_>) {
    let ctx = frame.ctx;
    ctx.set_stroke_style(&JsValue::from_str("rgba(135, 206, 235, 0.2)"));
    ctx.set_line_width(1.0);
    let sky = frame.height * SKY_FRACTION;

    let mut x = 0.0;
    while x <= frame.width {
        ctx.begin_path();
        ctx.move_to(x, 0.0);
        ctx.line_to(x, sky);
        ctx.stroke();
        x += frame.cell;
    }
    let mut y = 0.0;
    while y <= sky {
        ctx.begin_path();
        ctx.move_to(0.0, y);
        ctx.line_to(frame.width, y);
        ctx.stroke();
        y += frame.cell;
    }
}
