//! # SPOTDIFF Shared
//!
//! Common types used by the round engine and the ranking crate.
//!
//! ## Modules
//!
//! - `constants`: Default gameplay tuning values
//! - `geometry`: Points, rectangles and rendered-to-native conversion
//! - `dataset`: Per-round difference targets
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER know about timers, storage or rendering.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod dataset;
pub mod geometry;

pub use constants::{
    ADVANCE_DELAY_MS, HIT_RADIUS, MARK_TTL_MS, MISS_PENALTY_SECS, POINTS_PER_HIT,
    RANKING_CAPACITY, ROUND_TIME_LIMIT_SECS, TICK_INTERVAL_MS,
};
pub use dataset::{DatasetError, DatasetResult, DifferenceTarget, RoundSet, RoundSource, RoundSpec};
pub use geometry::{GeometryError, ImageGeometry, Point, PointerDown, Rect};
