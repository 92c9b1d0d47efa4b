//! Answer log for riddles. Persisted as JSON in the same shape the page has
//! always used, so existing players keep their history.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Marker stored as the user answer when a puzzle is skipped.
pub const SKIPPED: &str = "SKIPPED";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub question: String,
    pub correct_answer: String,
    pub user_answer: String,
    pub is_correct: bool,
    /// ISO-8601, supplied by the caller.
    pub timestamp: String,
    pub level: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RiddleHistory {
    /// Never written by the game; carried through for older saves.
    answered_riddles: Vec<serde_json::Value>,
    pub total_riddles_answered: u32,
    pub correct_answers: u32,
    pub wrong_answers: u32,
    riddle_history: VecDeque<HistoryEntry>,
}

/// Shown in the puzzle modal when a question comes up again.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hint {
    pub times_seen: usize,
    pub last_answer: String,
    pub last_correct: bool,
}

impl Hint {
    pub fn message(&self) -> String {
        format!(
            "You've seen this riddle {} time(s) before. Last answer: {} ({})",
            self.times_seen,
            self.last_answer,
            if self.last_correct { "✓ Correct" } else { "✗ Wrong" }
        )
    }
}

impl RiddleHistory {
    /// Append an entry, dropping the oldest beyond `capacity`. Counters are
    /// lifetime totals and are not trimmed.
    pub fn record(&mut self, entry: HistoryEntry, capacity: usize) {
        self.total_riddles_answered += 1;
        if entry.is_correct {
            self.correct_answers += 1;
        } else {
            self.wrong_answers += 1;
        }
        self.riddle_history.push_back(entry);
        while self.riddle_history.len() > capacity {
            self.riddle_history.pop_front();
        }
    }

    pub fn entries(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry> {
        self.riddle_history.iter()
    }

    pub fn len(&self) -> usize {
        self.riddle_history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.riddle_history.is_empty()
    }

    pub fn times_seen(&self, question: &str) -> usize {
        self.entries().filter(|e| e.question == question).count()
    }

    pub fn correct_count(&self, question: &str) -> usize {
        self.entries()
            .filter(|e| e.question == question && e.is_correct)
            .count()
    }

    pub fn last_answer(&self, question: &str) -> Option<&HistoryEntry> {
        self.entries().rev().find(|e| e.question == question)
    }

    /// Oldest retained entry for `question`.
    pub fn first_answer(&self, question: &str) -> Option<&HistoryEntry> {
        self.entries().find(|e| e.question == question)
    }

    /// The "last answer" shown is the oldest entry still in the log.
    pub fn hint(&self, question: &str) -> Option<Hint> {
        let last = self.first_answer(question)?;
        Some(Hint {
            times_seen: self.times_seen(question),
            last_answer: last.user_answer.clone(),
            last_correct: last.is_correct,
        })
    }

    /// Rounded percentage of correct answers, 0 when nothing was answered.
    pub fn accuracy_percent(&self) -> u32 {
        if self.total_riddles_answered == 0 {
            return 0;
        }
        (self.correct_answers as f64 / self.total_riddles_answered as f64 * 100.0).round() as u32
    }

    /// Newest first.
    pub fn recent(&self, n: usize) -> impl Iterator<Item = &HistoryEntry> {
        self.entries().rev().take(n)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn stats_report(&self) -> String {
        let recent: Vec<String> = self
            .recent(5)
            .map(|e| {
                let short: String = e.question.chars().take(40).collect();
                let date = e.timestamp.split('T').next().unwrap_or(&e.timestamp);
                format!(
                    "📝 {short}...\n   {} Your answer: {}\n   Level {} - {date}",
                    if e.is_correct { "✅" } else { "❌" },
                    e.user_answer,
                    e.level
                )
            })
            .collect();
        let recent = if recent.is_empty() {
            "No riddles answered yet!".to_string()
        } else {
            recent.join("\n\n")
        };
        format!(
            "🐉 Dragon Maze - Riddle Statistics\n\n\
             📊 Total Riddles: {}\n\
             ✅ Correct: {}\n\
             ❌ Wrong: {}\n\
             🎯 Accuracy: {}%\n\n\
             📚 Recent History (Last 5):\n{recent}",
            self.total_riddles_answered,
            self.correct_answers,
            self.wrong_answers,
            self.accuracy_percent()
        )
    }
}
