//! Procedural maze levels: the wall/floor grid plus the puzzle points and
//! doors scattered over it. A [`LevelLayout`] is generated fresh for every
//! level and never mutated afterwards; per-entity progress lives with the
//! caller (see [`crate::session`]).

pub mod generator;
pub mod grid;
pub mod placement;

use log::info;
use rand::Rng;

use crate::config::GameConfig;
use crate::error::MazeError;

pub use generator::{Difficulty, generate};
pub use grid::{Cell, Direction, Grid, Pos};
pub use placement::{Degraded, Door, DoorId, DoorRules, EntityKind, PuzzleId, PuzzlePoint};

/// Player spawn and carving origin.
pub const START: Pos = Pos::new(1, 1);

/// Smallest grid side that holds a border plus interior.
pub const MIN_GRID_SIDE: usize = 5;

/// Everything generated together when a level begins.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelLayout {
    pub difficulty: Difficulty,
    pub grid: Grid,
    pub puzzles: Vec<PuzzlePoint>,
    pub doors: Vec<Door>,
    /// Placements that hit their attempt cap.
    pub degraded: Vec<Degraded>,
}

impl LevelLayout {
    /// Grid first, then puzzles, then doors, all from the same RNG stream so a
    /// fixed seed reproduces the whole level.
    pub fn generate<R: Rng + ?Sized>(
        config: &GameConfig,
        level: u32,
        rng: &mut R,
    ) -> Result<Self, MazeError> {
        let (width, height) = config.grid_dimensions();
        let grid = generate(width, height, level, rng)?;
        let difficulty = Difficulty::new(level)?;

        let mut degraded = Vec::new();
        let puzzles = placement::place_puzzles(
            &grid,
            config.puzzles_per_level,
            config.puzzle_placement_attempts,
            rng,
            &mut degraded,
        );
        let doors = placement::place_doors(
            &grid,
            &puzzles,
            DoorRules {
                count: difficulty.door_count(),
                cost: difficulty.door_cost(config.door_base_cost, config.door_cost_per_level),
                buffer: config.door_buffer,
                max_attempts: config.door_placement_attempts,
            },
            rng,
            &mut degraded,
        );
        info!(
            "level {level}: {}x{} maze, {} puzzles, {} doors ({} degraded)",
            width,
            height,
            puzzles.len(),
            doors.len(),
            degraded.len()
        );
        Ok(Self {
            difficulty,
            grid,
            puzzles,
            doors,
            degraded,
        })
    }

    pub fn level(&self) -> u32 {
        self.difficulty.level()
    }

    /// Every puzzle on `pos`. Placement may stack several on one cell.
    pub fn puzzles_at(&self, pos: Pos) -> impl Iterator<Item = &PuzzlePoint> + '_ {
        self.puzzles.iter().filter(move |p| p.pos == pos)
    }

    pub fn doors_at(&self, pos: Pos) -> impl Iterator<Item = &Door> + '_ {
        self.doors.iter().filter(move |d| d.pos == pos)
    }

    pub fn puzzle(&self, id: PuzzleId) -> Option<&PuzzlePoint> {
        self.puzzles.iter().find(|p| p.id == id)
    }

    pub fn door(&self, id: DoorId) -> Option<&Door> {
        self.doors.iter().find(|d| d.id == id)
    }

    pub fn is_degraded(&self, kind: EntityKind, index: usize) -> bool {
        self.degraded.iter().any(|d| d.kind == kind && d.index == index)
    }
}
