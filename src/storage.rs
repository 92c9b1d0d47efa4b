//! Persisted state: the score counter and the riddle answer log.

use std::collections::HashMap;

use log::warn;

use crate::error::StorageError;
use crate::history::RiddleHistory;

pub const SCORE_KEY: &str = "dragonScore";
pub const HISTORY_KEY: &str = "dragonGameRiddles";

/// Minimal string key-value store, implemented over `localStorage` in the
/// browser and over a map in tests.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// `window.localStorage`.
pub struct BrowserStorage {
    inner: web_sys::Storage,
}

impl BrowserStorage {
    pub fn open() -> Result<Self, StorageError> {
        let inner = web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or(StorageError::Unavailable)?;
        Ok(Self { inner })
    }
}

impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.inner
            .set_item(key, value)
            .map_err(|_| StorageError::Write { key: key.to_string() })
    }
}

/// Stored score, or 0 when absent or not an integer.
pub fn load_score(store: &dyn KeyValueStore) -> i64 {
    match store.get(SCORE_KEY) {
        None => 0,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("ignoring unparsable stored score {raw:?}");
            0
        }),
    }
}

pub fn save_score(store: &mut dyn KeyValueStore, score: i64) -> Result<(), StorageError> {
    store.set(SCORE_KEY, &score.to_string())
}

/// Stored history, or an empty one when absent or corrupt.
pub fn load_history(store: &dyn KeyValueStore) -> RiddleHistory {
    let Some(raw) = store.get(HISTORY_KEY) else {
        return RiddleHistory::default();
    };
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!("discarding corrupt riddle history: {e}");
        RiddleHistory::default()
    })
}

pub fn save_history(
    store: &mut dyn KeyValueStore,
    history: &RiddleHistory,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(history)?;
    store.set(HISTORY_KEY, &json)
}
