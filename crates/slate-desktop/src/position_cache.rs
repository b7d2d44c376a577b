//! Session-lifetime window position cache

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// Side table mapping window id to its last known origin.
///
/// Entries persist for the life of the session and are never evicted; the
/// registry consults it to restore geometry across close/reopen and
/// maximize/restore cycles.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PositionCache {
    entries: BTreeMap<String, Vec2>,
}

impl PositionCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached position for `id`, or `fallback`, which is stored and returned.
    pub fn get(&mut self, id: &str, fallback: Vec2) -> Vec2 {
        if let Some(position) = self.entries.get(id) {
            return *position;
        }
        self.entries.insert(id.to_string(), fallback);
        fallback
    }

    /// Unconditionally record the position for `id`.
    pub fn set(&mut self, id: &str, position: Vec2) {
        self.entries.insert(id.to_string(), position);
    }

    /// Cached position for `id` without storing anything.
    pub fn peek(&self, id: &str) -> Option<Vec2> {
        self.entries.get(id).copied()
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries are cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
