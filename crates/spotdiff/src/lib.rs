//! # SPOTDIFF
//!
//! The "spot the difference" round engine, integrating all systems.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                            SPOTDIFF                                 │
//! ├─────────────────────────────────────────────────────────────────────┤
//! │                                                                     │
//! │  ┌───────────────┐     ┌─────────────────┐     ┌───────────────┐    │
//! │  │ shared        │────>│  Round Engine   │────>│ ranking       │    │
//! │  │               │     │                 │     │               │    │
//! │  │  • Geometry   │     │  • Hit / miss   │     │  • Top 10     │    │
//! │  │  • Dataset    │     │  • Countdown    │     │  • JSON store │    │
//! │  │  • Constants  │     │  • Scheduler    │     │  • Memory KV  │    │
//! │  └───────────────┘     └────────┬────────┘     └───────────────┘    │
//! │                                 │                                   │
//! │                        ┌────────┴────────┐                          │
//! │                        │ Events / View   │──> display, navigation   │
//! │                        └─────────────────┘                          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `engine`: The round state machine
//! - `round`: Round state, marks and click classification
//! - `scheduler`: Simulated time and deferred tasks
//! - `session`: Player, score and leaderboard context
//! - `events`: Engine-to-collaborator event bus
//! - `view`: Props for the game and ranking views
//! - `driver`: Wall-clock adapter
//! - `config`: TOML tuning

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod driver;
pub mod engine;
pub mod error;
pub mod events;
pub mod round;
pub mod scheduler;
pub mod session;
pub mod view;

// Re-export the member crates
pub use spotdiff_ranking as ranking;
pub use spotdiff_shared as shared;

// Re-export commonly used types
pub use config::{ConfigError, GameConfig};
pub use driver::{DriverStats, RealtimeDriver};
pub use engine::{ClickOutcome, RoundEngine};
pub use error::{EngineError, EngineResult};
pub use events::{EventBus, EventReceiver, EventSender, GameEvent, Route};
pub use round::{
    classify, Classification, CompletionReason, Feedback, FoundDifference, Mark, MarkId, Phase,
    RoundState,
};
pub use scheduler::{GameTime, RoundTimer, Scheduler};
pub use session::{load_ranking, SessionContext, SessionOutcome};
pub use view::{
    found_pips, progress_color, progress_fraction, LeaderboardRow, LeaderboardView, ProgressColor,
    RoundView,
};
