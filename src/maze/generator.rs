//! Recursive-backtracking carver plus difficulty-scaled densification.
//!
//! Carving walks the odd-parity sub-lattice starting at `(1,1)`, jumping two
//! cells at a time and knocking out the wall cell in between. The result is a
//! loop-free spanning tree. From level 3 on, a number of random wall cells that
//! touch one or two floor cells are opened up, adding short loops and spurs
//! without turning corridors into rooms.

use log::debug;
use rand::Rng;

use super::grid::{Cell, Direction, Grid, Pos};
use super::{MIN_GRID_SIDE, START};
use crate::error::MazeError;

/// Difficulty level (1-based) and the parameters derived from it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Difficulty(u32);

impl Difficulty {
    pub fn new(level: u32) -> Result<Self, MazeError> {
        if level == 0 {
            return Err(MazeError::InvalidLevel);
        }
        Ok(Self(level))
    }

    pub fn level(self) -> u32 {
        self.0
    }

    /// Target wall density. Computed for display and tuning only; neither the
    /// carver nor densification read it.
    pub fn wall_density(self) -> f64 {
        (0.2 + (self.0 - 1) as f64 * 0.05).min(0.4)
    }

    /// Random densification trials, zero for levels 1 and 2.
    pub fn densify_trials(self) -> u32 {
        if self.0 > 2 { self.0.saturating_mul(5) } else { 0 }
    }

    /// One door on level 1, two from level 2 onward.
    pub fn door_count(self) -> usize {
        (self.0 as usize / 2 + 1).min(2)
    }

    pub fn door_cost(self, base: i64, per_level: i64) -> i64 {
        base + self.0 as i64 * per_level
    }
}

/// Generate a connected wall/floor grid for `level`.
///
/// Every floor cell is reachable from `(1,1)` and the outer ring is wall.
pub fn generate<R: Rng + ?Sized>(
    width: usize,
    height: usize,
    level: u32,
    rng: &mut R,
) -> Result<Grid, MazeError> {
    if width < MIN_GRID_SIDE || height < MIN_GRID_SIDE {
        return Err(MazeError::InvalidDimensions {
            width,
            height,
            min: MIN_GRID_SIDE,
        });
    }
    let difficulty = Difficulty::new(level)?;
    debug!(
        "generating {width}x{height} maze, level {level}, wall density target {:.2}, {} densify trials",
        difficulty.wall_density(),
        difficulty.densify_trials()
    );

    let mut grid = Grid::walled(width, height);
    carve(&mut grid, rng);
    let opened = densify(&mut grid, difficulty.densify_trials(), rng);
    stamp_border(&mut grid);
    debug!("maze carved: {} floor cells, {opened} opened by densification", grid.floor_count());
    Ok(grid)
}

fn carve<R: Rng + ?Sized>(grid: &mut Grid, rng: &mut R) {
    let (w, h) = (grid.width(), grid.height());
    let mut visited = vec![false; w * h];
    let mut stack = vec![START];
    grid.set(START, Cell::Floor);
    visited[START.y * w + START.x] = true;

    while let Some(&cur) = stack.last() {
        let mut options: [(Pos, Pos); 4] = [(START, START); 4];
        let mut count = 0;
        for dir in Direction::ALL {
            let (dx, dy) = dir.delta();
            let (Some(nx), Some(ny)) = (
                cur.x.checked_add_signed(dx * 2),
                cur.y.checked_add_signed(dy * 2),
            ) else {
                continue;
            };
            // strictly inside the border
            if nx == 0 || ny == 0 || nx >= w - 1 || ny >= h - 1 {
                continue;
            }
            if visited[ny * w + nx] {
                continue;
            }
            let between = Pos::new(
                cur.x.wrapping_add_signed(dx),
                cur.y.wrapping_add_signed(dy),
            );
            options[count] = (Pos::new(nx, ny), between);
            count += 1;
        }

        if count == 0 {
            stack.pop();
            continue;
        }
        let (next, between) = options[rng.gen_range(0..count)];
        grid.set(between, Cell::Floor);
        grid.set(next, Cell::Floor);
        visited[next.y * w + next.x] = true;
        stack.push(next);
    }
}

/// Returns how many cells were opened.
fn densify<R: Rng + ?Sized>(grid: &mut Grid, trials: u32, rng: &mut R) -> usize {
    let (w, h) = (grid.width(), grid.height());
    let mut opened = 0;
    for _ in 0..trials {
        let p = Pos::new(rng.gen_range(1..w - 1), rng.gen_range(1..h - 1));
        if grid.get(p) != Some(Cell::Wall) {
            continue;
        }
        // 1..=2 keeps new cells attached without merging corridors into rooms
        if (1..=2).contains(&grid.floor_neighbors(p)) {
            grid.set(p, Cell::Floor);
            opened += 1;
        }
    }
    opened
}

fn stamp_border(grid: &mut Grid) {
    let (w, h) = (grid.width(), grid.height());
    for x in 0..w {
        grid.set(Pos::new(x, 0), Cell::Wall);
        grid.set(Pos::new(x, h - 1), Cell::Wall);
    }
    for y in 0..h {
        grid.set(Pos::new(0, y), Cell::Wall);
        grid.set(Pos::new(w - 1, y), Cell::Wall);
    }
}
