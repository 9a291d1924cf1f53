//! Materialized entry store.
//!
//! Owns the full parsed entry sequence for the process lifetime, read-only
//! after construction. Parsing runs to completion before the store is
//! queried; there is no partial or streaming materialization, and a single
//! reader is assumed.

use chrono::NaiveDate;
use palaver_core::Entry;
use tracing::info;

/// Ordered, indexed, immutable sequence of parsed entries
#[derive(Debug, Clone, PartialEq)]
pub struct EntryStore {
    entries: Vec<Entry>,
}

impl EntryStore {
    /// Materialize a store from already-parsed entries.
    pub fn new(entries: Vec<Entry>) -> Self {
        info!(total = entries.len(), "entry store materialized");
        Self { entries }
    }

    /// Drain a parser (or any entry iterator) to completion.
    pub fn from_entries(entries: impl IntoIterator<Item = Entry>) -> Self {
        Self::new(entries.into_iter().collect())
    }

    /// Count of all entries
    pub fn total(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Entry> {
        self.entries.get(index)
    }

    /// Entries with index in `[start, end)`.
    ///
    /// An out-of-range `end` clamps to `total()`; `start >= total()` yields
    /// an empty slice, not an error.
    pub fn slice(&self, start: usize, end: usize) -> &[Entry] {
        let end = end.min(self.entries.len());
        let start = start.min(end);
        &self.entries[start..end]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    /// Calendar dates of the first and last entries, when any exist
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.entries.first()?;
        let last = self.entries.last()?;
        Some((first.date(), last.date()))
    }

    /// Distinct sender names in first-seen order
    pub fn senders(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !seen.contains(&entry.sender.as_str()) {
                seen.push(&entry.sender);
            }
        }
        seen
    }
}
