//! # Engine Error Types
//!
//! None of these are fatal: a rejected click leaves the engine untouched.

use spotdiff_shared::GeometryError;
use thiserror::Error;

/// Errors returned by round engine operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The click could not be mapped to image coordinates.
    #[error("click ignored: {0}")]
    InvalidGeometry(#[from] GeometryError),

    /// The round is over and waiting to advance.
    #[error("round {round} is not accepting input")]
    RoundNotActive {
        /// Round index.
        round: usize,
    },

    /// The session has ended; no further operations are valid.
    #[error("session already complete")]
    SessionComplete,
}

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
