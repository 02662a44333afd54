//! Per-key sequence numbers

use std::collections::HashMap;
use std::hash::Hash;

/// Monotonic per-key counter
///
/// Each key starts at 1 and grows by one on every [`next`](Self::next).
/// State lives only in memory and belongs to whoever owns the counter;
/// share it across threads behind a lock if needed.
#[derive(Debug, Clone)]
pub struct KeyedCounter<K> {
    counts: HashMap<K, u64>,
}

impl<K: Eq + Hash> KeyedCounter<K> {
    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
        }
    }

    /// Advance the sequence for `key` and return the new value
    pub fn next(&mut self, key: K) -> u64 {
        let count = self.counts.entry(key).or_insert(0);
        *count += 1;
        *count
    }

    /// Last value handed out for `key`, or 0
    pub fn current(&self, key: &K) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Forget every sequence
    pub fn reset(&mut self) {
        self.counts.clear();
    }

    /// Number of keys seen since the last reset
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
}

impl<K: Eq + Hash> Default for KeyedCounter<K> {
    fn default() -> Self {
        Self::new()
    }
}
