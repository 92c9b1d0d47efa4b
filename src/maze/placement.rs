//! Scattering puzzle points and doors onto floor cells.
//!
//! Both kinds sample uniformly from the interior kept two cells away from the
//! outer edge. Sampling is capped; when the cap runs out the last sample is
//! taken as-is and a [`Degraded`] record is returned so callers can log it.

use log::warn;
use rand::Rng;

use super::START;
use super::grid::{Grid, Pos};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PuzzleId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DoorId(pub usize);

/// Riddle trigger on a floor cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PuzzlePoint {
    pub id: PuzzleId,
    pub pos: Pos,
}

/// Paid exit to the next level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Door {
    pub id: DoorId,
    pub pos: Pos,
    pub cost: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntityKind {
    Puzzle,
    Door,
}

/// A placement that ran out of attempts and kept its last sample, which may
/// be a wall, the start cell, or too close to a puzzle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Degraded {
    pub kind: EntityKind,
    pub index: usize,
    pub attempts: u32,
}

/// Door placement rules.
#[derive(Clone, Copy, Debug)]
pub struct DoorRules {
    pub count: usize,
    pub cost: i64,
    /// Doors must be strictly further than this from every puzzle.
    pub buffer: usize,
    pub max_attempts: u32,
}

fn sample<R: Rng + ?Sized>(grid: &Grid, rng: &mut R) -> Pos {
    Pos::new(
        rng.gen_range(2..grid.width() - 2),
        rng.gen_range(2..grid.height() - 2),
    )
}

/// Sample until `accept` holds or `max_attempts` samples were drawn. Returns
/// the position and whether it was accepted.
fn sample_until<R, F>(grid: &Grid, max_attempts: u32, rng: &mut R, accept: F) -> (Pos, bool)
where
    R: Rng + ?Sized,
    F: Fn(Pos) -> bool,
{
    let mut pos = sample(grid, rng);
    let mut attempts = 1;
    while !accept(pos) {
        if attempts >= max_attempts {
            return (pos, false);
        }
        pos = sample(grid, rng);
        attempts += 1;
    }
    (pos, true)
}

fn open_cell(grid: &Grid, pos: Pos) -> bool {
    grid.is_floor(pos) && pos != START
}

/// Place `count` puzzle points on floor cells other than the start.
pub fn place_puzzles<R: Rng + ?Sized>(
    grid: &Grid,
    count: usize,
    max_attempts: u32,
    rng: &mut R,
    degraded: &mut Vec<Degraded>,
) -> Vec<PuzzlePoint> {
    (0..count)
        .map(|i| {
            let (pos, ok) = sample_until(grid, max_attempts, rng, |p| open_cell(grid, p));
            if !ok {
                warn!("puzzle {i}: no valid cell after {max_attempts} attempts, using {pos:?}");
                degraded.push(Degraded {
                    kind: EntityKind::Puzzle,
                    index: i,
                    attempts: max_attempts,
                });
            }
            PuzzlePoint {
                id: PuzzleId(i),
                pos,
            }
        })
        .collect()
}

/// True when `pos` is within `buffer` (Chebyshev) of any puzzle.
pub fn near_puzzle(puzzles: &[PuzzlePoint], pos: Pos, buffer: usize) -> bool {
    puzzles.iter().any(|p| p.pos.chebyshev(pos) <= buffer)
}

/// Place doors on floor cells away from the start and clear of puzzles.
pub fn place_doors<R: Rng + ?Sized>(
    grid: &Grid,
    puzzles: &[PuzzlePoint],
    rules: DoorRules,
    rng: &mut R,
    degraded: &mut Vec<Degraded>,
) -> Vec<Door> {
    (0..rules.count)
        .map(|i| {
            let (pos, ok) = sample_until(grid, rules.max_attempts, rng, |p| {
                open_cell(grid, p) && !near_puzzle(puzzles, p, rules.buffer)
            });
            if !ok {
                warn!(
                    "door {i}: no valid cell after {} attempts, using {pos:?}",
                    rules.max_attempts
                );
                degraded.push(Degraded {
                    kind: EntityKind::Door,
                    index: i,
                    attempts: rules.max_attempts,
                });
            }
            Door {
                id: DoorId(i),
                pos,
                cost: rules.cost,
            }
        })
        .collect()
}
