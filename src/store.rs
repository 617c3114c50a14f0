//! # Key-value substrate
//!
//! In-process stand-in for a managed document database. One arena of opaque
//! JSON blobs addressed by string key; each logical container persists itself
//! as a single blob under its own fixed key.
//!
//! ## Requirements
//!
//! - Tiny dataset, whole-container reads and writes
//! - Individual `load`/`save` calls serialized
//! - Atomic read-modify-write at the substrate boundary, so create-if-absent
//!   does not race between concurrent callers
//!
//! Swapping this for a real store (Cosmos, Redis, ...) only requires keeping
//! the same surface; callers never see the locking.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

pub struct MemoryStore {
    arena: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            arena: Mutex::new(HashMap::new()),
        }
    }

    /// Read the blob under `key`, falling back to the type's default when the
    /// key is absent or the blob does not decode.
    pub fn load<T>(&self, key: &str) -> T
    where
        T: DeserializeOwned + Default,
    {
        let arena = self.arena.lock().unwrap();
        arena
            .get(key)
            .cloned()
            .and_then(|raw| serde_json::from_value(raw).ok())
            .unwrap_or_default()
    }

    /// Overwrite the blob under `key` wholesale. Last writer wins at container
    /// granularity; there is no per-field merge.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) {
        let mut arena = self.arena.lock().unwrap();
        arena.insert(key.to_owned(), serde_json::to_value(value).unwrap());
    }

    /// Load, apply `apply`, and save back under one lock. This is the atomic
    /// create-if-absent hook: two concurrent updates to the same key observe
    /// each other's writes in some order, never a lost update.
    pub fn update<T, R>(&self, key: &str, apply: impl FnOnce(&mut T) -> R) -> R
    where
        T: DeserializeOwned + Serialize + Default,
    {
        let mut arena = self.arena.lock().unwrap();
        let mut value: T = arena
            .get(key)
            .cloned()
            .and_then(|raw| serde_json::from_value(raw).ok())
            .unwrap_or_default();
        let result = apply(&mut value);
        arena.insert(key.to_owned(), serde_json::to_value(&value).unwrap());
        result
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}
