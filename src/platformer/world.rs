//! Side-scroller simulation: gravity, AABB collision, stomping, coins.
//! One call to [`World::step`] is one animation frame.

use rand::Rng;

pub const PLAYER_SPAWN: (f64, f64) = (100.0, 300.0);
/// Falling below this y kills the player.
pub const FALL_LIMIT: f64 = 500.0;
const GRAVITY: f64 = 0.8;
const FRICTION: f64 = 0.8;
const STOMP_BOUNCE: f64 = -10.0;
const STOMP_SCORE: i64 = 100;
const COIN_SCORE: i64 = 50;
/// Per-frame chance an enemy turns around on its own.
const ENEMY_TURN_CHANCE: f64 = 0.005;

/// Axis-aligned box, `y` grows downward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self { x, y, w, h }
    }

    pub fn overlaps(&self, o: &Rect) -> bool {
        self.x < o.x + o.w && self.x + self.w > o.x && self.y < o.y + o.h && self.y + self.h > o.y
    }
}

/// Keys held this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Input {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
}

impl Input {
    /// Update from a `KeyboardEvent.code`. Returns false for unrelated keys.
    pub fn set_key(&mut self, code: &str, down: bool) -> bool {
        match code {
            "ArrowLeft" => self.left = down,
            "ArrowRight" => self.right = down,
            "Space" | "ArrowUp" => self.jump = down,
            _ => return false,
        }
        true
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub rect: Rect,
    pub vx: f64,
    pub vy: f64,
    pub on_ground: bool,
    speed: f64,
    jump_power: f64,
}

impl Player {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            rect: Rect::new(x, y, 30.0, 30.0),
            vx: 0.0,
            vy: 0.0,
            on_ground: false,
            speed: 5.0,
            jump_power: 15.0,
        }
    }

    fn respawn(&mut self) {
        self.rect.x = PLAYER_SPAWN.0;
        self.rect.y = PLAYER_SPAWN.1;
        self.vx = 0.0;
        self.vy = 0.0;
    }

    pub fn update(&mut self, input: Input, platforms: &[Rect]) {
        if input.left {
            self.vx = -self.speed;
        } else if input.right {
            self.vx = self.speed;
        } else {
            self.vx *= FRICTION;
        }
        if input.jump && self.on_ground {
            self.vy = -self.jump_power;
            self.on_ground = false;
        }
        self.vy += GRAVITY;
        self.rect.x += self.vx;
        self.rect.y += self.vy;

        self.on_ground = false;
        for p in platforms {
            if !self.rect.overlaps(p) {
                continue;
            }
            let r = &mut self.rect;
            if self.vy > 0.0 && r.y - r.h < p.y {
                // landing
                r.y = p.y - r.h;
                self.vy = 0.0;
                self.on_ground = true;
            } else if self.vy < 0.0 && r.y > p.y + p.h {
                r.y = p.y + p.h;
                self.vy = 0.0;
            } else if self.vx > 0.0 && r.x - r.w < p.x {
                r.x = p.x - r.w;
            } else if self.vx < 0.0 && r.x > p.x + p.w {
                r.x = p.x + p.w;
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pub rect: Rect,
    pub vx: f64,
    pub vy: f64,
    pub alive: bool,
}

impl Enemy {
    /// `direction` is +1 (right) or -1 (left).
    pub fn new(x: f64, y: f64, direction: f64) -> Self {
        Self {
            rect: Rect::new(x, y, 25.0, 25.0),
            vx: direction,
            vy: 0.0,
            alive: true,
        }
    }

    pub fn update<R: Rng + ?Sized>(&mut self, platforms: &[Rect], rng: &mut R) {
        if !self.alive {
            return;
        }
        self.vy += GRAVITY;
        self.rect.x += self.vx;
        self.rect.y += self.vy;
        for p in platforms {
            if !self.rect.overlaps(p) {
                continue;
            }
            let r = &mut self.rect;
            if self.vy > 0.0 && r.y - r.h < p.y {
                r.y = p.y - r.h;
                self.vy = 0.0;
            } else if (self.vx > 0.0 && r.x - r.w < p.x) || (self.vx < 0.0 && r.x > p.x + p.w) {
                self.vx = -self.vx;
            }
        }
        if rng.gen_bool(ENEMY_TURN_CHANCE) {
            self.vx = -self.vx;
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Coin {
    pub rect: Rect,
    pub collected: bool,
    /// Spin phase, advanced by the renderer.
    pub spin: f64,
}

impl Coin {
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            rect: Rect::new(x, y, 15.0, 15.0),
            collected: false,
            spin: 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorldEvent {
    EnemyStomped(usize),
    CoinCollected(usize),
    PlayerDied { lives_left: u32 },
    GameOver { score: i64 },
}

pub struct World {
    pub player: Player,
    pub platforms: Vec<Rect>,
    pub enemies: Vec<Enemy>,
    pub coins: Vec<Coin>,
    pub score: i64,
    pub lives: u32,
    pub camera_x: f64,
    pub running: bool,
    view_width: f64,
}

impl World {
    /// The built-in course, viewed through a canvas `view_width` wide.
    pub fn new(view_width: f64) -> Self {
        let platforms = vec![
            // ground
            Rect::new(0.0, 350.0, 300.0, 50.0),
            Rect::new(400.0, 350.0, 300.0, 50.0),
            Rect::new(800.0, 350.0, 300.0, 50.0),
            Rect::new(1200.0, 350.0, 300.0, 50.0),
            // floating
            Rect::new(350.0, 280.0, 100.0, 20.0),
            Rect::new(550.0, 220.0, 100.0, 20.0),
            Rect::new(750.0, 160.0, 100.0, 20.0),
            Rect::new(950.0, 200.0, 100.0, 20.0),
            Rect::new(1100.0, 140.0, 100.0, 20.0),
            // high
            Rect::new(200.0, 180.0, 80.0, 20.0),
            Rect::new(600.0, 100.0, 120.0, 20.0),
            Rect::new(1000.0, 80.0, 100.0, 20.0),
        ];
        let enemies = vec![
            Enemy::new(450.0, 330.0, 1.0),
            Enemy::new(600.0, 200.0, -1.0),
            Enemy::new(850.0, 330.0, 1.0),
            Enemy::new(1150.0, 320.0, -1.0),
        ];
        let coins = [
            (380.0, 250.0),
            (580.0, 190.0),
            (780.0, 130.0),
            (980.0, 170.0),
            (1130.0, 110.0),
            (230.0, 150.0),
            (630.0, 70.0),
            (1030.0, 50.0),
        ]
        .into_iter()
        .map(|(x, y)| Coin::new(x, y))
        .collect();
        Self {
            player: Player::new(PLAYER_SPAWN.0, PLAYER_SPAWN.1),
            platforms,
            enemies,
            coins,
            score: 0,
            lives: 3,
            camera_x: 0.0,
            running: true,
            view_width,
        }
    }

    fn player_died(&mut self, events: &mut Vec<WorldEvent>) {
        self.lives = self.lives.saturating_sub(1);
        if self.lives > 0 {
            self.player.respawn();
        }
        events.push(WorldEvent::PlayerDied {
            lives_left: self.lives,
        });
    }

    /// Advance one frame. Does nothing once the game is over.
    pub fn step<R: Rng + ?Sized>(&mut self, input: Input, rng: &mut R) -> Vec<WorldEvent> {
        let mut events = Vec::new();
        if !self.running {
            return events;
        }
        self.player.update(input, &self.platforms);
        self.camera_x = (self.player.rect.x - self.view_width / 2.0).max(0.0);
        for e in &mut self.enemies {
            e.update(&self.platforms, rng);
        }
        self.check_collisions(&mut events);

        if self.lives == 0 {
            self.running = false;
            events.push(WorldEvent::GameOver { score: self.score });
            return events;
        }
        if self.player.rect.y > FALL_LIMIT {
            self.player_died(&mut events);
        }
        events
    }

    fn check_collisions(&mut self, events: &mut Vec<WorldEvent>) {
        for i in 0..self.enemies.len() {
            let enemy = &self.enemies[i];
            if !enemy.alive || !self.player.rect.overlaps(&enemy.rect) {
                continue;
            }
            if self.player.vy > 0.0 && self.player.rect.y < enemy.rect.y - 10.0 {
                self.enemies[i].alive = false;
                self.player.vy = STOMP_BOUNCE;
                self.score += STOMP_SCORE;
                events.push(WorldEvent::EnemyStomped(i));
            } else {
                self.player_died(events);
            }
        }
        for (i, coin) in self.coins.iter_mut().enumerate() {
            if !coin.collected && self.player.rect.overlaps(&coin.rect) {
                coin.collected = true;
                self.score += COIN_SCORE;
                events.push(WorldEvent::CoinCollected(i));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn idle(world: &mut World, frames: usize, rng: &mut StdRng) -> Vec<WorldEvent> {
        (0..frames).flat_map(|_| world.step(Input::default(), rng)).collect()
    }

    #[test]
    fn overlap_is_strict() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Rect::new(9.0, 9.0, 5.0, 5.0)));
        assert!(!a.overlaps(&Rect::new(10.0, 0.0, 5.0, 5.0)));
    }

    #[test]
    fn player_lands_on_ground() {
        let mut p = Player::new(100.0, 300.0);
        let ground = [Rect::new(0.0, 350.0, 300.0, 50.0)];
        for _ in 0..30 {
            p.update(Input::default(), &ground);
        }
        assert!(p.on_ground);
        assert_eq!(p.rect.y, 320.0);
        assert_eq!(p.vy, 0.0);
    }

    #[test]
    fn jump_only_from_ground() {
        let mut p = Player::new(100.0, 100.0);
        p.update(Input { jump: true, ..Input::default() }, &[]);
        assert!(p.vy > 0.0, "jumped in mid-air");
        let ground = [Rect::new(0.0, 350.0, 300.0, 50.0)];
        let mut p = Player::new(100.0, 320.0);
        p.update(Input::default(), &ground);
        assert!(p.on_ground);
        p.update(Input { jump: true, ..Input::default() }, &ground);
        assert!(p.vy < 0.0);
    }

    #[test]
    fn friction_slows_to_a_stop() {
        let mut p = Player::new(100.0, 320.0);
        p.update(Input { right: true, ..Input::default() }, &[]);
        assert_eq!(p.vx, 5.0);
        p.update(Input::default(), &[]);
        assert!((p.vx - 4.0).abs() < 1e-9);
    }

    #[test]
    fn stomping_an_enemy_scores_and_bounces() {
        let mut w = World::new(800.0);
        let mut rng = StdRng::seed_from_u64(1);
        w.enemies.truncate(1);
        w.enemies[0] = Enemy::new(100.0, 330.0, 0.0);
        w.player.rect.y = 290.0;
        w.player.vy = 5.0;
        let events = w.step(Input::default(), &mut rng);
        assert!(events.contains(&WorldEvent::EnemyStomped(0)));
        assert!(!w.enemies[0].alive);
        assert_eq!(w.player.vy, STOMP_BOUNCE);
        assert_eq!(w.score, 100);
    }

    #[test]
    fn walking_into_an_enemy_kills() {
        let mut w = World::new(800.0);
        let mut rng = StdRng::seed_from_u64(1);
        w.enemies.truncate(1);
        w.enemies[0] = Enemy::new(110.0, 305.0, 0.0);
        w.player.rect.y = 320.0;
        let events = w.step(Input::default(), &mut rng);
        assert!(events.contains(&WorldEvent::PlayerDied { lives_left: 2 }));
        assert_eq!(w.player.rect.x, PLAYER_SPAWN.0);
        assert_eq!(w.player.rect.y, PLAYER_SPAWN.1);
    }

    #[test]
    fn coins_count_once() {
        let mut w = World::new(800.0);
        let mut rng = StdRng::seed_from_u64(1);
        w.enemies.clear();
        w.coins = vec![Coin::new(105.0, 320.0)];
        let events = idle(&mut w, 40, &mut rng);
        let picked = events.iter().filter(|e| **e == WorldEvent::CoinCollected(0)).count();
        assert_eq!(picked, 1);
        assert_eq!(w.score, 50);
    }

    #[test]
    fn falling_off_the_world_ends_the_game() {
        let mut w = World::new(800.0);
        let mut rng = StdRng::seed_from_u64(1);
        w.enemies.clear();
        w.platforms.clear();
        let events = idle(&mut w, 400, &mut rng);
        let deaths = events.iter().filter(|e| matches!(e, WorldEvent::PlayerDied { .. })).count();
        assert_eq!(deaths, 3);
        assert!(events.contains(&WorldEvent::GameOver { score: 0 }));
        assert!(!w.running);
        assert!(w.step(Input::default(), &mut rng).is_empty());
    }

    #[test]
    fn camera_follows_but_not_past_origin() {
        let mut w = World::new(800.0);
        let mut rng = StdRng::seed_from_u64(1);
        w.step(Input::default(), &mut rng);
        assert_eq!(w.camera_x, 0.0);
        w.player.rect.x = 900.0;
        w.step(Input::default(), &mut rng);
        assert!((w.camera_x - 500.0).abs() < 1e-9);
    }

    #[test]
    fn key_codes_update_input() {
        let mut input = Input::default();
        assert!(input.set_key("Space", true));
        assert!(input.jump);
        assert!(input.set_key("ArrowUp", false));
        assert!(!input.jump);
        assert!(!input.set_key("KeyQ", true));
    }
}
