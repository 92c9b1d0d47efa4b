//! Game tuning knobs. Everything defaults to the values the shipped game uses;
//! a page may override any subset by passing JSON to
//! `start_dragon_maze_with_config`.

use serde::Deserialize;

use crate::error::ConfigError;
use crate::maze::MIN_GRID_SIDE;

/// Endpoint for fetching riddles over the network. When absent the built-in
/// riddle bank is used.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RiddleApi {
    pub url: String,
    pub api_key: String,
}

/// Points awarded or removed by puzzle and level events.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct Scoring {
    pub correct_answer: i64,
    pub first_time_bonus: i64,
    pub skip_penalty: i64,
    pub level_bonus: i64,
    pub door_bonus: i64,
}

impl Default for Scoring {
    fn default() -> Self {
        Self {
            correct_answer: 100,
            first_time_bonus: 25,
            skip_penalty: 50,
            level_bonus: 200,
            door_bonus: 50,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct GameConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub cell_size: u32,
    pub puzzles_per_level: usize,
    pub starting_lives: u32,
    pub door_base_cost: i64,
    pub door_cost_per_level: i64,
    /// Doors must be further than this (Chebyshev) from every puzzle point.
    pub door_buffer: usize,
    pub door_placement_attempts: u32,
    pub puzzle_placement_attempts: u32,
    pub history_capacity: usize,
    pub scoring: Scoring,
    pub riddle_api: Option<RiddleApi>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            canvas_width: 800,
            canvas_height: 500,
            cell_size: 25,
            puzzles_per_level: 3,
            starting_lives: 3,
            door_base_cost: 150,
            door_cost_per_level: 50,
            door_buffer: 2,
            door_placement_attempts: 50,
            puzzle_placement_attempts: 1000,
            history_capacity: 100,
            scoring: Scoring::default(),
            riddle_api: None,
        }
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON config and validate it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let cfg: GameConfig = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cell_size == 0 {
            return Err(ConfigError::Invalid("cellSize must be non-zero".into()));
        }
        let (w, h) = self.grid_dimensions();
        if w < MIN_GRID_SIDE || h < MIN_GRID_SIDE {
            return Err(ConfigError::Invalid(format!(
                "canvas {}x{} with cell size {} gives a {w}x{h} grid, need at least {MIN_GRID_SIDE}x{MIN_GRID_SIDE}",
                self.canvas_width, self.canvas_height, self.cell_size
            )));
        }
        if self.door_placement_attempts == 0 || self.puzzle_placement_attempts == 0 {
            return Err(ConfigError::Invalid("placement attempt caps must be non-zero".into()));
        }
        Ok(())
    }

    /// Grid size in cells: canvas size divided by cell size, rounded down.
    pub fn grid_dimensions(&self) -> (usize, usize) {
        if self.cell_size == 0 {
            return (0, 0);
        }
        (
            (self.canvas_width / self.cell_size) as usize,
            (self.canvas_height / self.cell_size) as usize,
        )
    }
}
