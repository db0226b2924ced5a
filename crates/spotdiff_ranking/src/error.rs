//! # Ranking Error Types
//!
//! All errors that can occur while reading or writing the leaderboard.

use thiserror::Error;

/// Errors that can occur in the ranking system.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RankingError {
    /// The backing store could not be read or written.
    #[error("ranking storage unavailable: {0}")]
    StorageUnavailable(String),

    /// The stored record exists but is not a valid ranking list.
    #[error("ranking record corrupt: {0}")]
    Corrupt(String),
}

/// Result type for ranking operations.
pub type RankingResult<T> = Result<T, RankingError>;
