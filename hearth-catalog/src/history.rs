use serde::{Deserialize, Serialize};

pub const DEFAULT_RECENT_LIMIT: usize = 5;

/// Recently searched location strings, most recent first. Persisted and
/// loaded wholesale; never merged entry-by-entry, which keeps concurrent
/// writers (e.g. two tabs) to last-write-wins instead of interleaved state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentSearches {
    entries: Vec<String>,
    limit: usize,
}

impl Default for RecentSearches {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_LIMIT)
    }
}

impl RecentSearches {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: Vec::new(),
            limit,
        }
    }

    /// Rebuild from a persisted snapshot, re-applying the limit.
    pub fn from_entries(entries: Vec<String>, limit: usize) -> Self {
        let mut history = Self::new(limit);
        for entry in entries.into_iter().rev() {
            history.push(entry);
        }
        history
    }

    /// Record a search: de-duplicate, move to the front, trim to the limit.
    pub fn push(&mut self, entry: impl Into<String>) {
        let entry = entry.into();
        self.entries.retain(|existing| existing != &entry);
        self.entries.insert(0, entry);
        self.entries.truncate(self.limit);
    }

    pub fn remove(&mut self, entry: &str) {
        self.entries.retain(|existing| existing != entry);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }
}
