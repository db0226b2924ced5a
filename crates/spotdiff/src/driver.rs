//! # Real-Time Driver
//!
//! Bridges the wall clock to the engine's simulated time. A host event loop
//! calls [`RealtimeDriver::pump`] every frame (or on a short interval) and
//! forwards pointer events through [`RealtimeDriver::click`], which pumps
//! first so deferred tasks that are already due run before the click.
//!
//! ```text
//! host loop ──pump()──> elapsed = now - origin ──advance_to(elapsed)──> engine
//!           ──click()─> pump() ──handle_pointer_down()───────────────> engine
//! ```

use std::time::{Duration, Instant};

use spotdiff_shared::{ImageGeometry, PointerDown, RoundSource};

use crate::engine::{ClickOutcome, RoundEngine};
use crate::error::EngineResult;
use crate::scheduler::GameTime;

/// Counters for the driver.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DriverStats {
    /// Number of pumps.
    pub pumps: u64,
    /// Deferred tasks run across all pumps.
    pub tasks_run: u64,
    /// Clicks forwarded.
    pub clicks: u64,
    /// Clicks the engine rejected.
    pub rejected_clicks: u64,
}

/// Drives a [`RoundEngine`] from a monotonic wall clock.
pub struct RealtimeDriver<S: RoundSource> {
    engine: RoundEngine<S>,
    origin: Instant,
    stats: DriverStats,
}

impl<S: RoundSource> RealtimeDriver<S> {
    /// Starts driving `engine`; engine time zero is now.
    #[must_use]
    pub fn new(engine: RoundEngine<S>) -> Self {
        Self::with_origin(engine, Instant::now())
    }

    /// Starts driving `engine` with engine time zero at `origin`.
    #[must_use]
    pub fn with_origin(engine: RoundEngine<S>, origin: Instant) -> Self {
        Self {
            engine,
            origin,
            stats: DriverStats::default(),
        }
    }

    /// Game time corresponding to the wall-clock instant `at`.
    #[must_use]
    pub fn game_time_at(&self, at: Instant) -> GameTime {
        let elapsed = at.saturating_duration_since(self.origin);
        GameTime::from_millis(u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX))
    }

    /// Runs everything due by `at`. Returns the number of tasks run.
    pub fn pump_at(&mut self, at: Instant) -> usize {
        let target = self.game_time_at(at);
        let fired = self.engine.advance_to(target);
        self.stats.pumps += 1;
        self.stats.tasks_run += fired as u64;
        fired
    }

    /// Runs everything due by now.
    pub fn pump(&mut self) -> usize {
        self.pump_at(Instant::now())
    }

    /// Forwards a click that happened at `at`.
    ///
    /// # Errors
    ///
    /// Whatever [`RoundEngine::handle_pointer_down`] returns.
    pub fn click_at(
        &mut self,
        at: Instant,
        pointer: PointerDown,
        geometry: &ImageGeometry,
    ) -> EngineResult<ClickOutcome> {
        self.pump_at(at);
        self.stats.clicks += 1;
        let result = self.engine.handle_pointer_down(pointer, geometry);
        if result.is_err() {
            self.stats.rejected_clicks += 1;
        }
        result
    }

    /// Forwards a click that happened now.
    ///
    /// # Errors
    ///
    /// Whatever [`RoundEngine::handle_pointer_down`] returns.
    pub fn click(
        &mut self,
        pointer: PointerDown,
        geometry: &ImageGeometry,
    ) -> EngineResult<ClickOutcome> {
        self.click_at(Instant::now(), pointer, geometry)
    }

    /// Wall-clock time until the next deferred task, if any.
    #[must_use]
    pub fn until_next_task(&self) -> Option<Duration> {
        self.engine
            .next_due()
            .map(|due| Duration::from_millis(due.since(self.engine.now())))
    }

    /// The engine.
    #[must_use]
    pub fn engine(&self) -> &RoundEngine<S> {
        &self.engine
    }

    /// Counters so far.
    #[must_use]
    pub fn stats(&self) -> DriverStats {
        self.stats
    }

    /// Stops driving and returns the engine.
    #[must_use]
    pub fn into_engine(self) -> RoundEngine<S> {
        self.engine
    }
}
