// Invariants of the built-in riddle data. Native-friendly, no browser APIs.

use std::collections::HashSet;

use dragon_maze::riddle::{CHOICE_COUNT, COMMON_WRONG_ANSWERS, RIDDLE_BANK};

#[test]
fn riddle_bank_nonempty() {
    assert!(!RIDDLE_BANK.is_empty());
}

#[test]
fn riddle_questions_are_unique() {
    let mut seen = HashSet::new();
    for (q, _, _) in RIDDLE_BANK {
        assert!(seen.insert(*q), "duplicate riddle '{q}'");
    }
}

#[test]
fn riddle_choices_are_distinct_and_hold_the_answer() {
    for (q, a, choices) in RIDDLE_BANK {
        assert!(!a.is_empty(), "empty answer for '{q}'");
        assert!(choices.contains(a), "answer '{a}' not offered for '{q}'");
        let lower: HashSet<_> = choices.iter().map(|c| c.to_lowercase()).collect();
        assert_eq!(lower.len(), CHOICE_COUNT, "repeated choice for '{q}'");
    }
}

#[test]
fn wrong_answer_pool_is_distinct_and_lowercase() {
    let set: HashSet<_> = COMMON_WRONG_ANSWERS.iter().collect();
    assert_eq!(set.len(), COMMON_WRONG_ANSWERS.len());
    for w in COMMON_WRONG_ANSWERS {
        assert!(w.chars().all(|c| c.is_ascii_lowercase()), "'{w}'");
    }
    // Enough distractors for any answer, even one that is itself in the pool.
    assert!(COMMON_WRONG_ANSWERS.len() > CHOICE_COUNT);
}
