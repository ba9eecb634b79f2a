//! Unique string IDs for the dictionary-keyed schema

use std::collections::{HashMap, HashSet};

/// Generates IDs that are unique within one namespace
///
/// The first request for a prefix yields the bare prefix, later requests
/// yield `prefix_0`, `prefix_1`, ..., skipping strings that are already
/// taken. The suffix counter of a prefix only ever grows, so a suffix that
/// was skipped or released is never handed out again.
#[derive(Debug, Default, Clone)]
pub struct IdGenerator {
    taken: HashSet<String>,
    counters: HashMap<String, usize>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh ID derived from `prefix`
    pub fn generate(&mut self, prefix: &str) -> String {
        if self.taken.insert(prefix.to_string()) {
            return prefix.to_string();
        }
        let counter = self.counters.entry(prefix.to_string()).or_insert(0);
        loop {
            let candidate = format!("{}_{}", prefix, counter);
            *counter += 1;
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
        }
    }

    /// Mark an externally chosen ID as taken
    ///
    /// Returns `false` if it already was.
    pub fn reserve(&mut self, id: impl Into<String>) -> bool {
        self.taken.insert(id.into())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.taken.contains(id)
    }

    pub fn len(&self) -> usize {
        self.taken.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taken.is_empty()
    }
}
