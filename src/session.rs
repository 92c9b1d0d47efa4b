//! Dragon Maze rules, independent of the browser.
//!
//! The session owns the current [`LevelLayout`] and the per-entity progress
//! maps (`PuzzleId -> solved`, `DoorId -> used`). The layout itself is never
//! touched after generation; advancing a level swaps in a fresh one.

use std::collections::BTreeMap;

use log::info;
use rand::Rng;

use crate::config::GameConfig;
use crate::error::MazeError;
use crate::history::{HistoryEntry, Hint, RiddleHistory, SKIPPED};
use crate::maze::{Direction, DoorId, LevelLayout, Pos, PuzzleId, START};
use crate::riddle::{PreparedRiddle, Riddle};

/// Riddle currently shown in the modal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActivePuzzle {
    pub point: PuzzleId,
    pub riddle: PreparedRiddle,
    pub selected: Option<usize>,
    pub hint: Option<Hint>,
    /// Set once an answer or skip was accepted; the modal stays up for feedback.
    pub resolved: bool,
}

/// What the door prompt needs to show.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DoorOffer {
    pub door: DoorId,
    pub cost: i64,
    pub score: i64,
    pub next_level: u32,
}

impl DoorOffer {
    pub fn affordable(&self) -> bool {
        self.score >= self.cost
    }

    pub fn message(&self) -> String {
        format!(
            "🚪 Magic Door to Level {}\n\nCost: {} points\nYour Score: {}\n\n{}",
            self.next_level,
            self.cost,
            self.score,
            if self.affordable() {
                "Do you want to pay and advance?"
            } else {
                "You need more points!"
            }
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// A puzzle is open; movement is frozen.
    Ignored,
    Blocked,
    Moved,
    Puzzle(PuzzleId),
    Door(DoorOffer),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// No open puzzle, or it was already answered.
    NotAccepting,
    NoSelection,
    Correct { points: i64, first_time_bonus: bool },
    Wrong { correct_answer: String, lives_left: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelAdvance {
    pub from_level: u32,
    pub to_level: u32,
    pub bonus: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DoorOutcome {
    Advanced(LevelAdvance),
    CannotAfford,
    /// Unknown id or already used.
    Unavailable,
}

pub struct Session<R> {
    config: GameConfig,
    rng: R,
    layout: LevelLayout,
    solved: BTreeMap<PuzzleId, bool>,
    used_doors: BTreeMap<DoorId, bool>,
    score: i64,
    lives: u32,
    puzzles_solved: usize,
    player: Pos,
    history: RiddleHistory,
    active: Option<ActivePuzzle>,
}

impl<R: Rng> Session<R> {
    /// Start at level 1 with a carried-over score and answer history.
    pub fn new(
        config: GameConfig,
        mut rng: R,
        score: i64,
        history: RiddleHistory,
    ) -> Result<Self, MazeError> {
        let layout = LevelLayout::generate(&config, 1, &mut rng)?;
        let mut session = Self {
            lives: config.starting_lives,
            config,
            rng,
            layout,
            solved: BTreeMap::new(),
            used_doors: BTreeMap::new(),
            score,
            puzzles_solved: 0,
            player: START,
            history,
            active: None,
        };
        session.reset_progress();
        Ok(session)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn layout(&self) -> &LevelLayout {
        &self.layout
    }

    pub fn level(&self) -> u32 {
        self.layout.level()
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn puzzles_solved(&self) -> usize {
        self.puzzles_solved
    }

    pub fn player(&self) -> Pos {
        self.player
    }

    pub fn history(&self) -> &RiddleHistory {
        &self.history
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
    }

    pub fn active_puzzle(&self) -> Option<&ActivePuzzle> {
        self.active.as_ref()
    }

    pub fn is_solved(&self, id: PuzzleId) -> bool {
        self.solved.get(&id).copied().unwrap_or(false)
    }

    pub fn is_door_used(&self, id: DoorId) -> bool {
        self.used_doors.get(&id).copied().unwrap_or(false)
    }

    pub fn is_game_over(&self) -> bool {
        self.lives == 0
    }

    /// Shared RNG, e.g. for picking a fallback riddle.
    pub fn rng(&mut self) -> &mut R {
        &mut self.rng
    }

    fn reset_progress(&mut self) {
        self.solved = self.layout.puzzles.iter().map(|p| (p.id, false)).collect();
        self.used_doors = self.layout.doors.iter().map(|d| (d.id, false)).collect();
        self.puzzles_solved = 0;
        self.player = START;
        self.active = None;
    }

    fn load_level(&mut self, level: u32) -> Result<(), MazeError> {
        self.layout = LevelLayout::generate(&self.config, level, &mut self.rng)?;
        self.reset_progress();
        Ok(())
    }

    /// Move one cell. Walls and the edge block; landing on an unsolved puzzle
    /// or unused door reports it (puzzles take precedence).
    pub fn move_player(&mut self, dir: Direction) -> MoveOutcome {
        if self.active.is_some() || self.is_game_over() {
            return MoveOutcome::Ignored;
        }
        let Some(next) = self.player.step(dir) else {
            return MoveOutcome::Blocked;
        };
        if !self.layout.grid.is_floor(next) {
            return MoveOutcome::Blocked;
        }
        self.player = next;

        if let Some(p) = self
            .layout
            .puzzles_at(next)
            .find(|p| !self.is_solved(p.id))
        {
            return MoveOutcome::Puzzle(p.id);
        }
        if let Some(d) = self
            .layout
            .doors_at(next)
            .find(|d| !self.is_door_used(d.id))
        {
            return MoveOutcome::Door(DoorOffer {
                door: d.id,
                cost: d.cost,
                score: self.score,
                next_level: self.level() + 1,
            });
        }
        MoveOutcome::Moved
    }

    /// Open the modal for `point` with `riddle`. `None` if the point is
    /// unknown, already solved, or another puzzle is open.
    pub fn begin_puzzle(&mut self, point: PuzzleId, riddle: Riddle) -> Option<&ActivePuzzle> {
        if self.active.is_some() || self.layout.puzzle(point).is_none() || self.is_solved(point) {
            return None;
        }
        let hint = self.history.hint(&riddle.question);
        let riddle = PreparedRiddle::prepare(riddle, &mut self.rng);
        self.active = Some(ActivePuzzle {
            point,
            riddle,
            selected: None,
            hint,
            resolved: false,
        });
        self.active.as_ref()
    }

    pub fn select_choice(&mut self, choice: usize) -> bool {
        match self.active.as_mut() {
            Some(a) if !a.resolved && choice < a.riddle.choices.len() => {
                a.selected = Some(choice);
                true
            }
            _ => false,
        }
    }

    pub fn submit_answer(&mut self, timestamp: &str) -> AnswerOutcome {
        let level = self.level();
        let Some(active) = self.active.as_mut().filter(|a| !a.resolved) else {
            return AnswerOutcome::NotAccepting;
        };
        let Some(choice) = active.selected else {
            return AnswerOutcome::NoSelection;
        };
        active.resolved = true;
        let correct = active.riddle.is_correct(choice);
        let question = active.riddle.question.clone();
        let point = active.point;
        let entry = HistoryEntry {
            question: question.clone(),
            correct_answer: active.riddle.answer.clone(),
            user_answer: active.riddle.choices[choice].clone(),
            is_correct: correct,
            timestamp: timestamp.to_string(),
            level,
        };
        let correct_answer = active.riddle.answer.clone();
        self.history.record(entry, self.config.history_capacity);

        if correct {
            self.mark_solved(point);
            let mut points = self.config.scoring.correct_answer;
            let first_time_bonus = self.history.correct_count(&question) == 1;
            if first_time_bonus {
                points += self.config.scoring.first_time_bonus;
            }
            self.score += points;
            AnswerOutcome::Correct {
                points,
                first_time_bonus,
            }
        } else {
            self.lives = self.lives.saturating_sub(1);
            AnswerOutcome::Wrong {
                correct_answer,
                lives_left: self.lives,
            }
        }
    }

    /// Give up on the open puzzle: it counts as solved, logged as wrong, and
    /// costs points (never below zero). Returns the new score.
    pub fn skip_puzzle(&mut self, timestamp: &str) -> Option<i64> {
        let level = self.level();
        let active = self.active.as_mut().filter(|a| !a.resolved)?;
        active.resolved = true;
        let point = active.point;
        let entry = HistoryEntry {
            question: active.riddle.question.clone(),
            correct_answer: active.riddle.answer.clone(),
            user_answer: SKIPPED.to_string(),
            is_correct: false,
            timestamp: timestamp.to_string(),
            level,
        };
        self.history.record(entry, self.config.history_capacity);
        self.mark_solved(point);
        self.score = (self.score - self.config.scoring.skip_penalty).max(0);
        Some(self.score)
    }

    fn mark_solved(&mut self, id: PuzzleId) {
        if let Some(flag) = self.solved.get_mut(&id) {
            if !*flag {
                *flag = true;
                self.puzzles_solved += 1;
            }
        }
    }

    pub fn close_puzzle(&mut self) {
        self.active = None;
    }

    /// Advance when enough puzzles are solved on this level.
    pub fn check_level_complete(&mut self) -> Result<Option<LevelAdvance>, MazeError> {
        if self.puzzles_solved < self.config.puzzles_per_level {
            return Ok(None);
        }
        let bonus = self.config.scoring.level_bonus;
        self.advance(bonus).map(Some)
    }

    /// Pay for a door and move to the next level.
    pub fn pay_for_door(&mut self, id: DoorId) -> Result<DoorOutcome, MazeError> {
        let Some(door) = self.layout.door(id).copied() else {
            return Ok(DoorOutcome::Unavailable);
        };
        if self.is_door_used(id) {
            return Ok(DoorOutcome::Unavailable);
        }
        if self.score < door.cost {
            return Ok(DoorOutcome::CannotAfford);
        }
        self.score -= door.cost;
        self.used_doors.insert(id, true);
        let bonus = self.config.scoring.door_bonus;
        self.advance(bonus).map(DoorOutcome::Advanced)
    }

    fn advance(&mut self, bonus: i64) -> Result<LevelAdvance, MazeError> {
        let from_level = self.level();
        let to_level = from_level + 1;
        self.load_level(to_level)?;
        self.score += bonus;
        info!("advanced from level {from_level} to {to_level}, score {}", self.score);
        Ok(LevelAdvance {
            from_level,
            to_level,
            bonus,
        })
    }

    /// Back to level 1 with full lives. The score is kept.
    pub fn restart(&mut self) -> Result<(), MazeError> {
        info!("game over at level {} with score {}", self.level(), self.score);
        self.lives = self.config.starting_lives;
        self.load_level(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::maze::{Cell, Grid};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const TS: &str = "2026-10-19T12:00:00.000Z";

    fn session(score: i64) -> Session<StdRng> {
        Session::new(
            GameConfig::default(),
            StdRng::seed_from_u64(77),
            score,
            RiddleHistory::default(),
        )
        .unwrap()
    }

    fn riddle() -> Riddle {
        Riddle {
            question: "What gets wetter the more it dries?".into(),
            answer: "towel".into(),
            choices: Some(vec!["towel".into(), "sponge".into(), "cloth".into(), "mop".into()]),
        }
    }

    fn open(s: &mut Session<StdRng>, idx: usize) -> PuzzleId {
        let id = s.layout().puzzles[idx].id;
        assert!(s.begin_puzzle(id, riddle()).is_some());
        id
    }

    fn correct_choice(s: &Session<StdRng>) -> usize {
        s.active_puzzle().unwrap().riddle.correct_index.unwrap()
    }

    fn path_to(grid: &Grid, from: Pos, to: Pos) -> Vec<Direction> {
        // BFS over floor cells, returns the moves
        use std::collections::{HashMap, VecDeque};
        let mut prev: HashMap<Pos, (Pos, Direction)> = HashMap::new();
        let mut q = VecDeque::from([from]);
        while let Some(p) = q.pop_front() {
            if p == to {
                break;
            }
            for d in Direction::ALL {
                if let Some(n) = p.step(d) {
                    if grid.is_floor(n) && n != from && !prev.contains_key(&n) {
                        prev.insert(n, (p, d));
                        q.push_back(n);
                    }
                }
            }
        }
        let mut moves = Vec::new();
        let mut cur = to;
        while cur != from {
            let (p, d) = prev[&cur];
            moves.push(d);
            cur = p;
        }
        moves.reverse();
        moves
    }

    #[test]
    fn starts_at_origin_with_full_lives() {
        let s = session(120);
        assert_eq!(s.level(), 1);
        assert_eq!(s.lives(), 3);
        assert_eq!(s.score(), 120);
        assert_eq!(s.player(), START);
        assert!(s.layout().puzzles.iter().all(|p| !s.is_solved(p.id)));
    }

    #[test]
    fn walls_block_movement() {
        let mut s = session(0);
        // (1,0) is border
        assert_eq!(s.move_player(Direction::Up), MoveOutcome::Blocked);
        assert_eq!(s.move_player(Direction::Left), MoveOutcome::Blocked);
        assert_eq!(s.player(), START);
    }

    #[test]
    fn walking_onto_a_puzzle_reports_it() {
        let mut s = session(0);
        let target = s.layout().puzzles[0].pos;
        let moves = path_to(&s.layout().grid, START, target);
        let mut last = MoveOutcome::Moved;
        for d in moves {
            last = s.move_player(d);
            if matches!(last, MoveOutcome::Puzzle(_)) {
                break;
            }
        }
        assert!(matches!(last, MoveOutcome::Puzzle(_)));
        let MoveOutcome::Puzzle(id) = last else { unreachable!() };
        assert_eq!(s.layout().puzzle(id).unwrap().pos, s.player());
    }

    #[test]
    fn movement_frozen_while_puzzle_open() {
        let mut s = session(0);
        open(&mut s, 0);
        assert_eq!(s.move_player(Direction::Right), MoveOutcome::Ignored);
    }

    #[test]
    fn submit_without_selection_changes_nothing() {
        let mut s = session(0);
        open(&mut s, 0);
        assert_eq!(s.submit_answer(TS), AnswerOutcome::NoSelection);
        assert!(s.history().is_empty());
        assert_eq!(s.submit_answer(TS), AnswerOutcome::NoSelection);
    }

    #[test]
    fn first_correct_answer_earns_bonus_once() {
        let mut s = session(0);
        let id = open(&mut s, 0);
        let c = correct_choice(&s);
        assert!(s.select_choice(c));
        assert_eq!(
            s.submit_answer(TS),
            AnswerOutcome::Correct { points: 125, first_time_bonus: true }
        );
        assert!(s.is_solved(id));
        assert_eq!(s.puzzles_solved(), 1);
        // no double submission during feedback
        assert_eq!(s.submit_answer(TS), AnswerOutcome::NotAccepting);
        s.close_puzzle();
        assert_eq!(s.check_level_complete().unwrap(), None);

        // same riddle again at another point: no bonus, and a hint
        open(&mut s, 1);
        assert_eq!(s.active_puzzle().unwrap().hint.as_ref().unwrap().times_seen, 1);
        let c = correct_choice(&s);
        s.select_choice(c);
        assert_eq!(
            s.submit_answer(TS),
            AnswerOutcome::Correct { points: 100, first_time_bonus: false }
        );
        assert_eq!(s.score(), 225);
    }

    #[test]
    fn solved_puzzle_cannot_reopen() {
        let mut s = session(0);
        let id = open(&mut s, 0);
        s.skip_puzzle(TS);
        s.close_puzzle();
        assert!(s.begin_puzzle(id, riddle()).is_none());
    }

    #[test]
    fn wrong_answer_costs_a_life_and_leaves_puzzle_open() {
        let mut s = session(0);
        let id = open(&mut s, 0);
        let wrong = (correct_choice(&s) + 1) % 4;
        s.select_choice(wrong);
        assert_eq!(
            s.submit_answer(TS),
            AnswerOutcome::Wrong { correct_answer: "towel".into(), lives_left: 2 }
        );
        assert!(!s.is_solved(id));
        assert_eq!(s.history().wrong_answers, 1);
        s.close_puzzle();
        assert!(s.begin_puzzle(id, riddle()).is_some());
    }

    #[test]
    fn skip_penalty_floors_at_zero() {
        let mut s = session(30);
        open(&mut s, 0);
        assert_eq!(s.skip_puzzle(TS), Some(0));
        assert_eq!(s.puzzles_solved(), 1);
        assert_eq!(s.history().last_answer(&riddle().question).unwrap().user_answer, SKIPPED);
        assert_eq!(s.skip_puzzle(TS), None);
    }

    #[test]
    fn third_puzzle_completes_the_level() {
        let mut s = session(0);
        for i in 0..3 {
            open(&mut s, i);
            s.skip_puzzle(TS);
            s.close_puzzle();
        }
        let adv = s.check_level_complete().unwrap().unwrap();
        assert_eq!(adv, LevelAdvance { from_level: 1, to_level: 2, bonus: 200 });
        assert_eq!(s.level(), 2);
        assert_eq!(s.score(), 200);
        assert_eq!(s.puzzles_solved(), 0);
        assert_eq!(s.player(), START);
        assert_eq!(s.layout().doors.len(), 2);
        assert!(s.layout().puzzles.iter().all(|p| !s.is_solved(p.id)));
    }

    #[test]
    fn doors_need_enough_points() {
        let mut s = session(100);
        let door = s.layout().doors[0];
        assert_eq!(door.cost, 200);
        assert_eq!(s.pay_for_door(door.id).unwrap(), DoorOutcome::CannotAfford);
        assert_eq!(s.pay_for_door(DoorId(9)).unwrap(), DoorOutcome::Unavailable);

        let mut s = session(260);
        let door = s.layout().doors[0];
        let out = s.pay_for_door(door.id).unwrap();
        assert_eq!(
            out,
            DoorOutcome::Advanced(LevelAdvance { from_level: 1, to_level: 2, bonus: 50 })
        );
        assert_eq!(s.score(), 110);
        assert_eq!(s.level(), 2);
    }

    #[test]
    fn door_offer_message() {
        let offer = DoorOffer { door: DoorId(0), cost: 200, score: 150, next_level: 2 };
        assert!(!offer.affordable());
        assert!(offer.message().contains("You need more points!"));
        let offer = DoorOffer { score: 200, ..offer };
        assert!(offer.message().contains("Level 2"));
        assert!(offer.message().ends_with("Do you want to pay and advance?"));
    }

    #[test]
    fn losing_all_lives_then_restart_keeps_score() {
        let mut s = session(500);
        for i in 0..3 {
            open(&mut s, i);
            let wrong = (correct_choice(&s) + 1) % 4;
            s.select_choice(wrong);
            s.submit_answer(TS);
            s.close_puzzle();
        }
        assert!(s.is_game_over());
        assert_eq!(s.move_player(Direction::Right), MoveOutcome::Ignored);
        s.restart().unwrap();
        assert_eq!(s.lives(), 3);
        assert_eq!(s.level(), 1);
        assert_eq!(s.score(), 500);
        assert_eq!(s.history().total_riddles_answered, 3);
    }

    /// Walk from the current cell to `to`, returning the outcome of the last step.
    fn walk_to(s: &mut Session<StdRng>, to: Pos) -> MoveOutcome {
        let moves = path_to(&s.layout().grid, s.player(), to);
        let mut last = MoveOutcome::Moved;
        for d in moves {
            last = s.move_player(d);
        }
        assert_eq!(s.player(), to);
        last
    }

    /// Step onto a floor neighbour and straight back.
    fn step_off_and_back(s: &mut Session<StdRng>) -> MoveOutcome {
        let here = s.player();
        let (out, back) = Direction::ALL
            .into_iter()
            .find_map(|d| {
                let n = here.step(d).filter(|n| s.layout().grid.is_floor(*n))?;
                let back = Direction::ALL.into_iter().find(|b| n.step(*b) == Some(here))?;
                Some((d, back))
            })
            .unwrap();
        s.move_player(out);
        s.move_player(back)
    }

    /// A floor cell holding nothing, away from the start.
    fn empty_floor(s: &Session<StdRng>) -> Pos {
        let l = s.layout();
        l.grid
            .cells()
            .find(|&(p, c)| {
                c == Cell::Floor
                    && p != START
                    && l.puzzles_at(p).count() == 0
                    && l.doors_at(p).count() == 0
            })
            .map(|(p, _)| p)
            .unwrap()
    }

    #[test]
    fn stacked_puzzles_open_one_after_another() {
        // Placement does not forbid two puzzles on one cell; find a seed that stacks them.
        let (mut s, first, second) = (0..5000)
            .find_map(|seed| {
                let s = Session::new(
                    GameConfig::default(),
                    StdRng::seed_from_u64(seed),
                    0,
                    RiddleHistory::default(),
                )
                .unwrap();
                let ps = &s.layout().puzzles;
                let (i, j) = (0..ps.len())
                    .flat_map(|i| (i + 1..ps.len()).map(move |j| (i, j)))
                    .find(|&(i, j)| ps[i].pos == ps[j].pos && s.layout().grid.is_floor(ps[i].pos))?;
                let (a, b) = (ps[i].id, ps[j].id);
                Some((s, a, b))
            })
            .expect("some seed stacks two puzzles");
        let cell = s.layout().puzzle(first).unwrap().pos;

        assert_eq!(walk_to(&mut s, cell), MoveOutcome::Puzzle(first));
        assert!(s.begin_puzzle(first, riddle()).is_some());
        s.skip_puzzle(TS);
        s.close_puzzle();

        assert_eq!(step_off_and_back(&mut s), MoveOutcome::Puzzle(second));
        assert!(s.begin_puzzle(second, riddle()).is_some());
        s.skip_puzzle(TS);
        s.close_puzzle();
        assert!(s.is_solved(second));
        assert_eq!(step_off_and_back(&mut s), MoveOutcome::Moved);
    }

    #[test]
    fn walking_onto_a_door_offers_it() {
        let mut s = session(120);
        let target = empty_floor(&s);
        s.layout.doors[0].pos = target;
        let id = s.layout().doors[0].id;

        assert_eq!(
            walk_to(&mut s, target),
            MoveOutcome::Door(DoorOffer { door: id, cost: 200, score: 120, next_level: 2 })
        );
        // declining leaves it in place
        assert_eq!(
            step_off_and_back(&mut s),
            MoveOutcome::Door(DoorOffer { door: id, cost: 200, score: 120, next_level: 2 })
        );

        s.used_doors.insert(id, true);
        assert_eq!(step_off_and_back(&mut s), MoveOutcome::Moved);
    }

    #[test]
    fn puzzle_wins_over_door_on_the_same_cell() {
        let mut s = session(0);
        let target = empty_floor(&s);
        s.layout.puzzles[0].pos = target;
        s.layout.doors[0].pos = target;
        let (pid, did) = (s.layout().puzzles[0].id, s.layout().doors[0].id);

        assert_eq!(walk_to(&mut s, target), MoveOutcome::Puzzle(pid));
        s.begin_puzzle(pid, riddle());
        s.skip_puzzle(TS);
        s.close_puzzle();
        assert!(matches!(
            step_off_and_back(&mut s),
            MoveOutcome::Door(DoorOffer { door, .. }) if door == did
        ));
    }

    #[test]
    fn select_rejects_out_of_range() {
        let mut s = session(0);
        assert!(!s.select_choice(0));
        open(&mut s, 0);
        assert!(!s.select_choice(4));
        assert!(s.select_choice(3));
    }
}
