// Generator and placement properties, checked over random sizes, levels and
// seeds.

use dragon_maze::maze::{self, Cell, Difficulty, EntityKind, LevelLayout, START};
use dragon_maze::GameConfig;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn config_for(width: usize, height: usize) -> GameConfig {
    let cell = 25;
    GameConfig {
        canvas_width: width as u32 * cell,
        canvas_height: height as u32 * cell,
        cell_size: cell,
        ..GameConfig::default()
    }
}

fn layout(width: usize, height: usize, level: u32, seed: u64) -> LevelLayout {
    let mut rng = StdRng::seed_from_u64(seed);
    LevelLayout::generate(&config_for(width, height), level, &mut rng).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn border_is_always_wall(w in 5usize..40, h in 5usize..30, level in 1u32..10, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let g = maze::generate(w, h, level, &mut rng).unwrap();
        for (pos, cell) in g.cells() {
            if g.is_border(pos) {
                prop_assert_eq!(cell, Cell::Wall, "{:?}", pos);
            }
        }
    }

    #[test]
    fn every_floor_cell_reachable_from_start(w in 5usize..40, h in 5usize..30, level in 1u32..10, seed: u64) {
        let mut rng = StdRng::seed_from_u64(seed);
        let g = maze::generate(w, h, level, &mut rng).unwrap();
        prop_assert!(g.is_floor(START));
        prop_assert_eq!(g.reachable_from(START), g.floor_count());
    }

    #[test]
    fn placements_respect_their_rules(w in 8usize..40, h in 8usize..30, level in 1u32..10, seed: u64) {
        let l = layout(w, h, level, seed);
        for p in &l.puzzles {
            if l.is_degraded(EntityKind::Puzzle, p.id.0) {
                continue;
            }
            prop_assert!(l.grid.is_floor(p.pos));
            prop_assert_ne!(p.pos, START);
        }
        for d in &l.doors {
            if l.is_degraded(EntityKind::Door, d.id.0) {
                continue;
            }
            prop_assert!(l.grid.is_floor(d.pos));
            prop_assert_ne!(d.pos, START);
            for p in &l.puzzles {
                prop_assert!(p.pos.chebyshev(d.pos) > 2, "door {:?} near puzzle {:?}", d.pos, p.pos);
            }
        }
    }

    #[test]
    fn same_seed_same_level(level in 1u32..10, seed: u64) {
        prop_assert_eq!(layout(32, 20, level, seed), layout(32, 20, level, seed));
    }
}

#[test]
fn densify_trials_never_decrease() {
    let trials: Vec<u32> = (1..=30)
        .map(|l| Difficulty::new(l).unwrap().densify_trials())
        .collect();
    assert!(trials.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(&trials[..4], &[0, 0, 15, 20]);
}

#[test]
fn level_one_on_the_default_canvas() {
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let l = LevelLayout::generate(&GameConfig::default(), 1, &mut rng).unwrap();
        assert_eq!((l.grid.width(), l.grid.height()), (32, 20));
        assert_eq!(l.puzzles.len(), 3);
        assert_eq!(l.doors.len(), 1);
        assert_eq!(l.doors[0].cost, 200);
    }
}

#[test]
fn level_four_has_two_pricier_doors() {
    for seed in 0..20 {
        let mut rng = StdRng::seed_from_u64(seed);
        let l = LevelLayout::generate(&GameConfig::default(), 4, &mut rng).unwrap();
        assert_eq!(l.doors.len(), 2);
        assert!(l.doors.iter().all(|d| d.cost == 350));
    }
}

#[test]
fn door_count_caps_at_two() {
    let counts: Vec<usize> = (1..=8).map(|l| Difficulty::new(l).unwrap().door_count()).collect();
    assert_eq!(counts, [1, 2, 2, 2, 2, 2, 2, 2]);
}

#[test]
fn tiny_grid_finishes_with_degraded_placements() {
    for seed in 0..5 {
        let l = layout(5, 5, 1, seed);
        assert_eq!(l.grid.floor_count(), 7);
        assert_eq!(l.puzzles.len(), 3);
        assert!(l.is_degraded(EntityKind::Puzzle, 0));
        assert!(l.is_degraded(EntityKind::Door, 0));
    }
}

#[test]
fn invalid_inputs_are_errors() {
    let mut rng = StdRng::seed_from_u64(0);
    assert!(maze::generate(4, 10, 1, &mut rng).is_err());
    assert!(maze::generate(10, 10, 0, &mut rng).is_err());
    assert!(Difficulty::new(0).is_err());
}
