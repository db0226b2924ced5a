//! # Session Context
//!
//! Everything that outlives a single round: who is playing, the running
//! score, and the leaderboard with its store. The context is handed to the
//! engine explicitly and can be taken back when the session ends.
//!
//! The leaderboard is read when the engine starts, sized by the engine's
//! `ranking_capacity`, so the table and the config can never disagree.

use spotdiff_ranking::{RankingEntry, RankingStore, RankingTable};

/// Reads the leaderboard, falling back to an empty table if storage fails.
///
/// Used at session start and by the leaderboard view.
pub fn load_ranking(store: &dyn RankingStore, capacity: usize) -> RankingTable {
    match store.read() {
        Ok(entries) => RankingTable::from_entries(entries, capacity),
        Err(e) => {
            tracing::warn!("Ranking unavailable, starting empty: {}", e);
            RankingTable::new(capacity)
        }
    }
}

/// Session-wide state.
pub struct SessionContext {
    player_name: String,
    score: u32,
    ranking: RankingTable,
    store: Box<dyn RankingStore>,
}

impl SessionContext {
    /// Starts a session for `player_name` with a zero score. The leaderboard
    /// is read through `store` once the engine takes the context.
    pub fn new(player_name: impl Into<String>, store: impl RankingStore + 'static) -> Self {
        Self {
            player_name: player_name.into(),
            score: 0,
            ranking: RankingTable::default(),
            store: Box::new(store),
        }
    }

    /// (Re)reads the leaderboard with room for `capacity` entries.
    pub(crate) fn load(&mut self, capacity: usize) {
        self.ranking = load_ranking(&*self.store, capacity);
    }

    /// Name as entered by the player (may be empty).
    #[must_use]
    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    /// Name to record: the player name, or `fallback` if it is blank.
    #[must_use]
    pub fn display_name(&self, fallback: &str) -> String {
        let name = self.player_name.trim();
        if name.is_empty() {
            fallback.to_string()
        } else {
            name.to_string()
        }
    }

    /// Running score.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Adds points. Saturates instead of overflowing.
    pub fn add_points(&mut self, points: u32) -> u32 {
        self.score = self.score.saturating_add(points);
        self.score
    }

    /// The leaderboard as loaded (and updated at session end).
    #[must_use]
    pub fn ranking(&self) -> &RankingTable {
        &self.ranking
    }

    /// Submits `entry` and persists the table.
    ///
    /// Returns the entry's 0-based rank and whether the write succeeded. A
    /// failed write keeps the updated table in memory.
    pub fn record(&mut self, entry: RankingEntry) -> (Option<usize>, bool) {
        let rank = self.ranking.submit(entry);
        let persisted = match self.store.write(self.ranking.entries()) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Ranking not saved, keeping it in memory: {}", e);
                false
            }
        };
        (rank, persisted)
    }
}

/// Result of a finished session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionOutcome {
    /// The submitted entry.
    pub entry: RankingEntry,
    /// 0-based rank, `None` if it did not make the board.
    pub rank: Option<usize>,
    /// Leaderboard after submission.
    pub ranking: RankingTable,
    /// False if the store rejected the write.
    pub persisted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use spotdiff_ranking::MemoryStore;

    fn loaded(player: &str, store: MemoryStore, capacity: usize) -> SessionContext {
        let mut session = SessionContext::new(player, store);
        session.load(capacity);
        session
    }

    #[test]
    fn test_display_name_fallback() {
        let named = loaded("  mina ", MemoryStore::new(), 10);
        assert_eq!(named.display_name("Anonymous"), "mina");

        let blank = loaded("   ", MemoryStore::new(), 10);
        assert_eq!(blank.display_name("Anonymous"), "Anonymous");
    }

    #[test]
    fn test_score_accumulates() {
        let mut session = loaded("p", MemoryStore::new(), 10);
        assert_eq!(session.score(), 0);
        session.add_points(100);
        assert_eq!(session.add_points(100), 200);
        session.add_points(u32::MAX);
        assert_eq!(session.score(), u32::MAX);
    }

    #[test]
    fn test_loads_existing_ranking() {
        let store = MemoryStore::new();
        store
            .write(&[RankingEntry::new("old", 500, 0), RankingEntry::new("older", 900, 0)])
            .unwrap();

        let session = loaded("p", store, 10);
        assert_eq!(session.ranking().len(), 2);
        assert_eq!(session.ranking().best().unwrap().name, "older");
    }

    #[test]
    fn test_load_uses_requested_capacity() {
        let store = MemoryStore::new();
        let entries: Vec<RankingEntry> =
            (0..5).map(|i| RankingEntry::new(format!("p{i}"), i * 10, 0)).collect();
        store.write(&entries).unwrap();

        let session = loaded("p", store, 3);
        assert_eq!(session.ranking().capacity(), 3);
        assert_eq!(session.ranking().len(), 3);
        assert_eq!(session.ranking().best().unwrap().score, 40);
    }

    #[test]
    fn test_unavailable_store_degrades() {
        let store = MemoryStore::new();
        store.write(&[RankingEntry::new("old", 500, 0)]).unwrap();
        store.set_available(false);

        let mut session = loaded("p", store.clone(), 10);
        assert!(session.ranking().is_empty());

        let (rank, persisted) = session.record(RankingEntry::new("p", 100, 0));
        assert_eq!(rank, Some(0));
        assert!(!persisted);
        assert_eq!(session.ranking().len(), 1);
    }

    #[test]
    fn test_corrupt_store_degrades() {
        let store = MemoryStore::new();
        store.set_raw("not a ranking");
        let session = loaded("p", store, 10);
        assert!(session.ranking().is_empty());
    }
}
