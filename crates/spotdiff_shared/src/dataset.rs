//! # Round Dataset
//!
//! Static per-round difference targets. The data is fixed at build time or
//! loaded once at startup from a TOML file:
//!
//! ```toml
//! [[rounds]]
//! targets = [{ x = 120.0, y = 340.0 }, { x = 610.0, y = 95.0 }]
//!
//! [[rounds]]
//! targets = [{ x = 44.0, y = 402.0 }]
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::geometry::Point;

/// A difference location in the native coordinate space of a round's images.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifferenceTarget {
    /// Native X
    pub x: f64,
    /// Native Y
    pub y: f64,
}

impl DifferenceTarget {
    /// Creates a new target.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Target position as a point.
    #[inline]
    #[must_use]
    pub const fn point(self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// One round: the list of differences hidden in its image pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundSpec {
    /// All differences in this round.
    pub targets: Vec<DifferenceTarget>,
}

/// Errors raised while loading or validating a dataset.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// Dataset declares no rounds.
    #[error("dataset has no rounds")]
    Empty,

    /// A round has no targets and could never be played.
    #[error("round {0} has no targets")]
    EmptyRound(usize),

    /// A target has a NaN or infinite coordinate.
    #[error("round {round} target {target} has a non-finite coordinate")]
    NonFiniteTarget {
        /// Round index.
        round: usize,
        /// Target index within the round.
        target: usize,
    },

    /// TOML could not be parsed.
    #[error("invalid dataset: {0}")]
    Parse(#[from] toml::de::Error),

    /// Dataset file could not be read.
    #[error("cannot read dataset: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for dataset operations.
pub type DatasetResult<T> = Result<T, DatasetError>;

/// Source of per-round targets for the engine.
pub trait RoundSource {
    /// Total number of rounds in a session.
    fn round_count(&self) -> usize;

    /// Targets for `round`. Empty for an out-of-range index.
    fn targets_for_round(&self, round: usize) -> &[DifferenceTarget];
}

/// An immutable, validated list of rounds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundSet {
    rounds: Vec<RoundSpec>,
}

impl RoundSet {
    /// Builds a validated set from rounds.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no rounds, a round has no targets, or a
    /// coordinate is not finite.
    pub fn new(rounds: Vec<RoundSpec>) -> DatasetResult<Self> {
        let set = Self { rounds };
        set.validate()?;
        Ok(set)
    }

    /// Convenience constructor from raw coordinate lists.
    ///
    /// # Errors
    ///
    /// Same as [`RoundSet::new`].
    pub fn from_points(rounds: &[&[(f64, f64)]]) -> DatasetResult<Self> {
        Self::new(
            rounds
                .iter()
                .map(|targets| RoundSpec {
                    targets: targets.iter().map(|&(x, y)| DifferenceTarget::new(x, y)).collect(),
                })
                .collect(),
        )
    }

    /// Parses and validates a dataset from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Parse`] for malformed TOML, or a validation error.
    pub fn from_toml_str(text: &str) -> DatasetResult<Self> {
        let set: Self = toml::from_str(text)?;
        set.validate()?;
        Ok(set)
    }

    /// Loads a dataset file.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Io`] if the file cannot be read.
    pub fn from_file(path: impl AsRef<Path>) -> DatasetResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    fn validate(&self) -> DatasetResult<()> {
        if self.rounds.is_empty() {
            return Err(DatasetError::Empty);
        }
        for (round, spec) in self.rounds.iter().enumerate() {
            if spec.targets.is_empty() {
                return Err(DatasetError::EmptyRound(round));
            }
            if let Some(target) = spec.targets.iter().position(|t| !t.point().is_finite()) {
                return Err(DatasetError::NonFiniteTarget { round, target });
            }
        }
        Ok(())
    }

    /// All rounds.
    #[must_use]
    pub fn rounds(&self) -> &[RoundSpec] {
        &self.rounds
    }
}

impl RoundSource for RoundSet {
    fn round_count(&self) -> usize {
        self.rounds.len()
    }

    fn targets_for_round(&self, round: usize) -> &[DifferenceTarget] {
        match self.rounds.get(round) {
            Some(spec) => &spec.targets,
            None => &[],
        }
    }
}
