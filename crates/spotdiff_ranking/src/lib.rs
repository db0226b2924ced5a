//! # SPOTDIFF Ranking
//!
//! The local leaderboard shared across sessions.
//!
//! ## Design Principles
//!
//! 1. **Bounded** - At most `capacity` entries (10 by default), ever
//! 2. **Sorted** - Descending by score; ties keep insertion order
//! 3. **Pluggable storage** - The table never touches I/O itself, a
//!    [`RankingStore`] does
//!
//! ## Example
//!
//! ```rust,ignore
//! use spotdiff_ranking::{JsonFileStore, RankingEntry, RankingStore, RankingTable};
//!
//! let store = JsonFileStore::new("ranking.json");
//! let mut table = RankingTable::from_entries(store.read()?, 10);
//! let rank = table.submit(RankingEntry::now("mina", 1200));
//! store.write(table.entries())?;
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod store;
pub mod table;

pub use error::{RankingError, RankingResult};
pub use store::{JsonFileStore, MemoryStore, RankingStore, DEFAULT_KEY};
pub use table::{unix_millis, RankingEntry, RankingTable};
