//! Recently-practiced quiz tracking policy.
//!
//! An ordered, deduplicated, bounded list of quiz ids. Recording an id
//! that is already present moves it to the front instead of duplicating
//! it; once the list is full the least recently practiced id falls off.
//! Durability is the store's problem, not this type's.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default maximum number of remembered quiz ids.
pub const DEFAULT_CAPACITY: usize = 20;

/// Most-recent-first list of practiced quiz ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecencyList {
    ids: Vec<Uuid>,
    #[serde(default = "default_capacity")]
    capacity: usize,
}

fn default_capacity() -> usize {
    DEFAULT_CAPACITY
}

impl Default for RecencyList {
    fn default() -> Self {
        Self::new()
    }
}

impl RecencyList {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// `capacity` is clamped to at least 1.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            ids: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Mark a quiz as just practiced.
    ///
    /// Idempotent on membership: a repeated id is moved to the front
    /// rather than inserted twice.
    pub fn record(&mut self, id: Uuid) {
        self.ids.retain(|existing| *existing != id);
        self.ids.insert(0, id);
        self.ids.truncate(self.capacity);
    }

    /// Practiced ids, most recent first.
    pub fn ids(&self) -> &[Uuid] {
        &self.ids
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
