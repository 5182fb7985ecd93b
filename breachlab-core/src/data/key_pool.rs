//! Rotating API key pool.
//!
//! The market-data API is rate limited per key, so requests spread across a
//! pool of keys. [`ApiKeyPool::next_key`] hands out the least recently used
//! key: never-used keys first (in insertion order), then the key with the
//! oldest use stamp. The pool is an explicit object injected into the
//! client; there is no process-global key state.

use super::provider::DataError;
use std::sync::{Mutex, PoisonError};

#[derive(Debug)]
struct KeyEntry {
    key: String,
    last_used: Option<u64>,
}

#[derive(Debug, Default)]
struct PoolState {
    entries: Vec<KeyEntry>,
    clock: u64,
}

/// Pool of API keys with least-recently-used selection.
#[derive(Debug, Default)]
pub struct ApiKeyPool {
    state: Mutex<PoolState>,
}

impl ApiKeyPool {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entries = keys
            .into_iter()
            .map(|k| KeyEntry {
                key: k.into(),
                last_used: None,
            })
            .collect();
        Self {
            state: Mutex::new(PoolState { entries, clock: 0 }),
        }
    }

    /// Pick the least recently used key and stamp it as used now.
    pub fn next_key(&self) -> Result<String, DataError> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.clock += 1;
        let now = state.clock;

        // None sorts before Some, so unused keys come first; min_by_key
        // returns the first minimum, keeping insertion order on ties.
        let entry = state
            .entries
            .iter_mut()
            .min_by_key(|e| e.last_used)
            .ok_or(DataError::NoApiKey)?;
        entry.last_used = Some(now);
        Ok(entry.key.clone())
    }

    /// Add a key to the pool as never used.
    pub fn add(&self, key: impl Into<String>) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.entries.push(KeyEntry {
            key: key.into(),
            last_used: None,
        });
    }

    pub fn len(&self) -> usize {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
