//! # Gameplay Constants
//!
//! Default tuning for a session. `GameConfig` in the engine crate starts
//! from these values and may override any of them from TOML.

// =============================================================================
// ROUND TIMING
// =============================================================================

/// Time limit of every round, in seconds.
pub const ROUND_TIME_LIMIT_SECS: u32 = 90;

/// Seconds removed from the clock for a click that hits nothing.
pub const MISS_PENALTY_SECS: u32 = 10;

/// Period of the round countdown timer, in milliseconds.
pub const TICK_INTERVAL_MS: u64 = 1000;

/// How long a miss mark stays on screen, in milliseconds.
pub const MARK_TTL_MS: u64 = 1000;

/// Delay between finding the last difference and the next round, in milliseconds.
pub const ADVANCE_DELAY_MS: u64 = 1000;

// =============================================================================
// SCORING
// =============================================================================

/// Hit radius around a target, in native image pixels.
pub const HIT_RADIUS: f64 = 30.0;

/// Points awarded per unique difference found.
pub const POINTS_PER_HIT: u32 = 100;

/// Number of entries kept on the leaderboard.
pub const RANKING_CAPACITY: usize = 10;
