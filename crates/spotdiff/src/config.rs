//! # Game Configuration
//!
//! Tuning for a session, loaded once at startup from TOML. Every field is
//! optional in the file; missing fields fall back to the defaults in
//! `spotdiff_shared::constants`.
//!
//! ```toml
//! round_time_limit_secs = 60
//! miss_penalty_secs = 5
//! anonymous_name = "Guest"
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use spotdiff_shared::constants::{
    ADVANCE_DELAY_MS, HIT_RADIUS, MARK_TTL_MS, MISS_PENALTY_SECS, POINTS_PER_HIT,
    RANKING_CAPACITY, ROUND_TIME_LIMIT_SECS, TICK_INTERVAL_MS,
};

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// TOML could not be parsed.
    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file could not be read.
    #[error("cannot read config: {0}")]
    Io(#[from] std::io::Error),

    /// A value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Session tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Seconds on the clock at the start of every round.
    pub round_time_limit_secs: u32,
    /// Seconds removed for a miss.
    pub miss_penalty_secs: u32,
    /// Hit radius in native image pixels.
    pub hit_radius: f64,
    /// Points per unique difference found.
    pub points_per_hit: u32,
    /// Countdown timer period (ms).
    pub tick_interval_ms: u64,
    /// Lifetime of a miss mark (ms).
    pub mark_ttl_ms: u64,
    /// Delay between the last find and the next round (ms).
    pub advance_delay_ms: u64,
    /// Leaderboard size.
    pub ranking_capacity: usize,
    /// Name recorded when the player gave none.
    pub anonymous_name: String,
    /// Path prefix for round images.
    pub image_prefix: String,
    /// Event channel capacity.
    pub event_capacity: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            round_time_limit_secs: ROUND_TIME_LIMIT_SECS,
            miss_penalty_secs: MISS_PENALTY_SECS,
            hit_radius: HIT_RADIUS,
            points_per_hit: POINTS_PER_HIT,
            tick_interval_ms: TICK_INTERVAL_MS,
            mark_ttl_ms: MARK_TTL_MS,
            advance_delay_ms: ADVANCE_DELAY_MS,
            ranking_capacity: RANKING_CAPACITY,
            anonymous_name: "Anonymous".to_string(),
            image_prefix: "/images".to_string(),
            event_capacity: 256,
        }
    }
}

impl GameConfig {
    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Checks every value is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.round_time_limit_secs == 0 {
            return Err(ConfigError::Invalid("round_time_limit_secs must be > 0".into()));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid("tick_interval_ms must be > 0".into()));
        }
        if self.ranking_capacity == 0 {
            return Err(ConfigError::Invalid("ranking_capacity must be > 0".into()));
        }
        if self.event_capacity == 0 {
            return Err(ConfigError::Invalid("event_capacity must be > 0".into()));
        }
        if !(self.hit_radius.is_finite() && self.hit_radius > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "hit_radius must be positive, got {}",
                self.hit_radius
            )));
        }
        Ok(())
    }
}
