//! Riddles gating the puzzle points.
//!
//! Riddles come from an optional web API or, more commonly, the built-in bank
//! below. API riddles carry no multiple-choice options so distractors are
//! drawn from a fixed word list.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::Deserialize;

/// Number of options shown in the puzzle modal.
pub const CHOICE_COUNT: usize = 4;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Riddle {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub choices: Option<Vec<String>>,
}

impl Riddle {
    fn from_bank(question: &str, answer: &str, choices: [&str; CHOICE_COUNT]) -> Self {
        Self {
            question: question.to_string(),
            answer: answer.to_string(),
            choices: Some(choices.iter().map(|c| c.to_string()).collect()),
        }
    }
}

pub const RIDDLE_BANK: &[(&str, &str, [&str; CHOICE_COUNT])] = &[
    (
        "I speak without a mouth and hear without ears. I have no body, but I come alive with wind. What am I?",
        "echo",
        ["echo", "wind", "sound", "voice"],
    ),
    (
        "The more you take, the more you leave behind. What am I?",
        "footsteps",
        ["footsteps", "memories", "tracks", "time"],
    ),
    (
        "I have cities, but no houses. I have mountains, but no trees. I have water, but no fish. What am I?",
        "map",
        ["map", "painting", "book", "dream"],
    ),
    (
        "What has keys but no locks, space but no room, you can enter but not go inside?",
        "keyboard",
        ["keyboard", "piano", "computer", "typewriter"],
    ),
    (
        "I am not alive, but I grow; I don't have lungs, but I need air; I don't have a mouth, but water kills me. What am I?",
        "fire",
        ["fire", "plant", "balloon", "crystal"],
    ),
    (
        "What gets wetter the more it dries?",
        "towel",
        ["towel", "sponge", "cloth", "mop"],
    ),
    (
        "I have a heart that doesn't beat, a mouth that doesn't speak. What am I?",
        "artichoke",
        ["artichoke", "statue", "doll", "robot"],
    ),
    (
        "What can travel around the world while staying in a corner?",
        "stamp",
        ["stamp", "letter", "coin", "map"],
    ),
];

/// Distractor pool for riddles that arrive without choices.
pub const COMMON_WRONG_ANSWERS: [&str; 16] = [
    "water", "air", "fire", "earth", "time", "light", "shadow", "mirror", "book", "key", "door",
    "window", "clock", "coin", "ring", "box",
];

/// Uniformly random riddle from the built-in bank.
pub fn random_bank_riddle<R: Rng + ?Sized>(rng: &mut R) -> Riddle {
    let (q, a, c) = RIDDLE_BANK[rng.gen_range(0..RIDDLE_BANK.len())];
    Riddle::from_bank(q, a, c)
}

/// The answer plus distinct distractors (case-insensitive), answer first.
pub fn generate_choices<R: Rng + ?Sized>(answer: &str, rng: &mut R) -> Vec<String> {
    let mut choices = vec![answer.to_string()];
    let mut used = vec![answer.to_lowercase()];
    while choices.len() < CHOICE_COUNT {
        let candidate = COMMON_WRONG_ANSWERS[rng.gen_range(0..COMMON_WRONG_ANSWERS.len())];
        let lower = candidate.to_lowercase();
        if !used.contains(&lower) {
            used.push(lower);
            choices.push(candidate.to_string());
        }
    }
    choices
}

/// A riddle ready for display: shuffled choices and the index of the answer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreparedRiddle {
    pub question: String,
    pub answer: String,
    pub choices: Vec<String>,
    /// `None` if the answer is missing from the choices (malformed API data).
    pub correct_index: Option<usize>,
}

impl PreparedRiddle {
    pub fn prepare<R: Rng + ?Sized>(riddle: Riddle, rng: &mut R) -> Self {
        let mut choices = match riddle.choices {
            Some(c) if !c.is_empty() => c,
            _ => generate_choices(&riddle.answer, rng),
        };
        choices.shuffle(rng);
        let correct_index = choices.iter().position(|c| *c == riddle.answer);
        Self {
            question: riddle.question,
            answer: riddle.answer,
            choices,
            correct_index,
        }
    }

    pub fn is_correct(&self, choice: usize) -> bool {
        self.correct_index == Some(choice)
    }
}

/// Modal option labels.
pub fn choice_label(index: usize) -> char {
    (b'A' + index as u8) as char
}

/// Keyboard shortcut to choice index: `1`-`4` or `a`-`d` in either case.
pub fn choice_for_key(key: &str) -> Option<usize> {
    match key {
        "1" | "a" | "A" => Some(0),
        "2" | "b" | "B" => Some(1),
        "3" | "c" | "C" => Some(2),
        "4" | "d" | "D" => Some(3),
        _ => None,
    }
}
