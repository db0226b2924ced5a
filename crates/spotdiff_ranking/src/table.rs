//! # Ranking Table
//!
//! Top-N high scores, sorted descending by score.
//!
//! New entries are placed after every existing entry with an equal score, so
//! the earlier player keeps the higher rank on a tie.

use serde::{Deserialize, Serialize};
use spotdiff_shared::RANKING_CAPACITY;

/// Milliseconds since the Unix epoch, 0 if the clock is before it.
#[must_use]
pub fn unix_millis() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

/// One finished session on the leaderboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingEntry {
    /// Player display name.
    pub name: String,
    /// Final score.
    pub score: u32,
    /// When the session ended (Unix epoch ms).
    pub timestamp: u64,
}

impl RankingEntry {
    /// Creates an entry with an explicit timestamp.
    #[must_use]
    pub fn new(name: impl Into<String>, score: u32, timestamp: u64) -> Self {
        Self {
            name: name.into(),
            score,
            timestamp,
        }
    }

    /// Creates an entry stamped with the current wall-clock time.
    #[must_use]
    pub fn now(name: impl Into<String>, score: u32) -> Self {
        Self::new(name, score, unix_millis())
    }
}

/// Bounded, sorted leaderboard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankingTable {
    entries: Vec<RankingEntry>,
    capacity: usize,
}

impl Default for RankingTable {
    fn default() -> Self {
        Self::new(RANKING_CAPACITY)
    }
}

impl RankingTable {
    /// Creates an empty table holding at most `capacity` entries.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Builds a table from arbitrary entries, e.g. a stored record.
    ///
    /// Entries are sorted and truncated so the invariant holds even for
    /// hand-edited or foreign data.
    #[must_use]
    pub fn from_entries(mut entries: Vec<RankingEntry>, capacity: usize) -> Self {
        // Stable: equal scores keep their stored order
        entries.sort_by(|a, b| b.score.cmp(&a.score));
        entries.truncate(capacity);
        Self { entries, capacity }
    }

    /// Inserts a finished session.
    ///
    /// Returns the 0-based rank the entry landed on, or `None` if it did not
    /// make the cut.
    pub fn submit(&mut self, entry: RankingEntry) -> Option<usize> {
        let index = self
            .entries
            .iter()
            .position(|e| e.score < entry.score)
            .unwrap_or(self.entries.len());

        if index >= self.capacity {
            return None;
        }

        self.entries.insert(index, entry);
        self.entries.truncate(self.capacity);
        Some(index)
    }

    /// Entries, best first.
    #[must_use]
    pub fn entries(&self) -> &[RankingEntry] {
        &self.entries
    }

    /// Entries with their 1-based display rank.
    pub fn rows(&self) -> impl Iterator<Item = (usize, &RankingEntry)> {
        self.entries.iter().enumerate().map(|(i, e)| (i + 1, e))
    }

    /// The top entry, if any.
    #[must_use]
    pub fn best(&self) -> Option<&RankingEntry> {
        self.entries.first()
    }

    /// Maximum number of entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no session has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the table, returning its entries.
    #[must_use]
    pub fn into_entries(self) -> Vec<RankingEntry> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, score: u32) -> RankingEntry {
        RankingEntry::new(name, score, 0)
    }

    fn is_sorted(table: &RankingTable) -> bool {
        table.entries().windows(2).all(|w| w[0].score >= w[1].score)
    }

    #[test]
    fn test_submit_into_empty() {
        let mut table = RankingTable::new(10);
        assert_eq!(table.submit(entry("a", 300)), Some(0));
        assert_eq!(table.len(), 1);
        assert_eq!(table.best().unwrap().name, "a");
    }

    #[test]
    fn test_submit_keeps_descending_order() {
        let mut table = RankingTable::new(10);
        for (name, score) in [("a", 100), ("b", 500), ("c", 300), ("d", 0), ("e", 400)] {
            table.submit(entry(name, score));
        }
        assert!(is_sorted(&table));
        let names: Vec<_> = table.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["b", "e", "c", "a", "d"]);
    }

    #[test]
    fn test_tie_ranks_below_existing() {
        let mut table = RankingTable::new(10);
        table.submit(entry("first", 200));
        assert_eq!(table.submit(entry("second", 200)), Some(1));
        assert_eq!(table.entries()[0].name, "first");
    }

    #[test]
    fn test_truncates_to_capacity() {
        let mut table = RankingTable::new(10);
        for i in 0..10 {
            table.submit(entry("p", i * 100));
        }
        assert_eq!(table.len(), 10);

        // Better than the worst: enters, worst drops off
        assert_eq!(table.submit(entry("new", 450)), Some(5));
        assert_eq!(table.len(), 10);
        assert_eq!(table.entries().last().unwrap().score, 100);
        assert!(is_sorted(&table));

        // Worse than everything on a full board: rejected
        assert_eq!(table.submit(entry("low", 0)), None);
        assert_eq!(table.len(), 10);
    }

    #[test]
    fn test_from_entries_normalizes() {
        let raw = (0..15).map(|i| entry("x", i * 10)).collect();
        let table = RankingTable::from_entries(raw, 10);
        assert_eq!(table.len(), 10);
        assert!(is_sorted(&table));
        assert_eq!(table.best().unwrap().score, 140);
    }

    #[test]
    fn test_rows_are_one_based() {
        let mut table = RankingTable::default();
        table.submit(entry("a", 10));
        table.submit(entry("b", 20));
        let rows: Vec<_> = table.rows().map(|(rank, e)| (rank, e.name.clone())).collect();
        assert_eq!(rows, [(1, "b".to_string()), (2, "a".to_string())]);
        assert_eq!(table.capacity(), RANKING_CAPACITY);
    }
}
