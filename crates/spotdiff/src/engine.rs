//! # Round Engine
//!
//! The gameplay state machine.
//!
//! ## Phases
//!
//! ```text
//!            all found / clock at 0             next round exists
//! Playing(n) ──────────────────────> RoundComplete(n) ──────────────> Playing(n+1)
//!                                          │
//!                                          │ last round
//!                                          v
//!                                   SessionComplete  (ranking saved, Navigate emitted)
//! ```
//!
//! ## Time
//!
//! All timing is simulated. The host calls [`RoundEngine::advance_to`] (or
//! [`RoundEngine::advance_by`]) and the engine runs every deferred task that
//! came due, in order:
//!
//! - `Tick`: the 1 s countdown, re-armed at the start of every round
//! - `RemoveMark`: expiry of a miss mark
//! - `AdvanceRound`: the short pause after the last difference is found
//!
//! Each task carries the round (or timer generation) it was scheduled for
//! and does nothing if that round is gone.
//!
//! ## Clock at zero
//!
//! Whether the clock runs out naturally or a miss penalty drains it, the
//! round is over the moment it reads 0: clicks are rejected and the next
//! timer tick moves on to the next round.

use spotdiff_ranking::RankingEntry;
use spotdiff_shared::{ImageGeometry, PointerDown, RoundSource};

use crate::config::{ConfigError, GameConfig};
use crate::error::{EngineError, EngineResult};
use crate::events::{EventBus, EventReceiver, EventSender, GameEvent, Route};
use crate::round::{
    classify, Classification, CompletionReason, Feedback, FoundDifference, Mark, MarkId, Phase,
    RoundState,
};
use crate::scheduler::{GameTime, RoundTimer, Scheduler};
use crate::session::{SessionContext, SessionOutcome};

/// Deferred work owned by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Task {
    /// Countdown tick under a timer generation.
    Tick { generation: u64 },
    /// Remove a miss mark placed in `round`.
    RemoveMark { round: usize, mark: MarkId },
    /// Leave `round` after all its differences were found.
    AdvanceRound { round: usize },
}

/// What a click did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    /// A new difference was found.
    Hit {
        /// Index of the target.
        target_index: usize,
        /// Id of the hit mark.
        mark: MarkId,
        /// Session score after the find.
        score: u32,
        /// True if this completed the round.
        round_complete: bool,
    },
    /// The difference was already found. Nothing changed.
    Duplicate {
        /// Index of the target.
        target_index: usize,
    },
    /// Nothing there. Time was deducted.
    Miss {
        /// Id of the (temporary) miss mark.
        mark: MarkId,
        /// Seconds left after the penalty.
        time_left: u32,
    },
}

/// The round engine.
pub struct RoundEngine<S: RoundSource> {
    config: GameConfig,
    rounds: S,
    session: SessionContext,
    state: RoundState,
    phase: Phase,
    now: GameTime,
    scheduler: Scheduler<Task>,
    timer: RoundTimer,
    next_mark: u64,
    bus: EventBus,
    events: EventSender,
    outcome: Option<SessionOutcome>,
}

impl<S: RoundSource> RoundEngine<S> {
    /// Starts a session at round 0 with the clock armed at time zero.
    ///
    /// Reads the leaderboard through the session's store, sized by
    /// `config.ranking_capacity`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Invalid`] if `config` fails [`GameConfig::validate`] or
    /// `rounds` is empty.
    pub fn new(
        config: GameConfig,
        rounds: S,
        mut session: SessionContext,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if rounds.round_count() == 0 {
            return Err(ConfigError::Invalid("no rounds to play".into()));
        }
        session.load(config.ranking_capacity);

        let bus = EventBus::new(config.event_capacity);
        let events = bus.sender();
        let timer = RoundTimer::new(config.tick_interval_ms);
        let state = RoundState::new(0, config.round_time_limit_secs);

        let mut engine = Self {
            config,
            rounds,
            session,
            state,
            phase: Phase::Playing,
            now: GameTime::ZERO,
            scheduler: Scheduler::new(),
            timer,
            next_mark: 0,
            bus,
            events,
            outcome: None,
        };
        engine.start_round();
        Ok(engine)
    }

    /// Where the host should go next, once the session is complete.
    ///
    /// Mirrors the `Navigate` event for hosts that poll instead of draining.
    #[must_use]
    pub fn navigation(&self) -> Option<Route> {
        self.outcome.as_ref().map(|_| Route::Ranking)
    }

    /// A receiver for engine events. All receivers share one queue.
    #[must_use]
    pub fn events(&self) -> EventReceiver {
        self.bus.receiver()
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Handles a pointer-down on one of the round's images.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidGeometry`] if the image rectangle or natural
    ///   size is degenerate; the click is ignored.
    /// - [`EngineError::RoundNotActive`] while the round is over.
    /// - [`EngineError::SessionComplete`] after the last round.
    pub fn handle_pointer_down(
        &mut self,
        pointer: PointerDown,
        geometry: &ImageGeometry,
    ) -> EngineResult<ClickOutcome> {
        self.ensure_playing()?;

        let native = geometry.to_native(pointer)?;
        let percent = geometry.to_percent(pointer)?;

        let round = self.state.round;
        let targets = self.rounds.targets_for_round(round);
        let total = targets.len();
        let classification = classify(targets, &self.state, native, self.config.hit_radius);

        tracing::debug!(
            "Click round {} at ({:.1}, {:.1}): {:?}",
            round,
            native.x,
            native.y,
            classification
        );

        match classification {
            Classification::Hit(target_index) => {
                self.state.found.push(FoundDifference {
                    target_index,
                    x: native.x,
                    y: native.y,
                });
                let score = self.session.add_points(self.config.points_per_hit);
                self.state.feedback = Feedback::Correct;
                let mark = self.place_mark(percent.x, percent.y, true);

                let found = self.state.found.len();
                self.emit(GameEvent::DifferenceFound {
                    round,
                    target_index,
                    found,
                    total,
                    score,
                });

                let round_complete = found == total;
                if round_complete {
                    self.complete_round(CompletionReason::AllFound);
                    self.timer.cancel();
                    let due = self.now.after(self.config.advance_delay_ms);
                    self.scheduler.schedule_at(due, Task::AdvanceRound { round });
                }

                Ok(ClickOutcome::Hit {
                    target_index,
                    mark,
                    score,
                    round_complete,
                })
            }
            Classification::Duplicate(target_index) => {
                self.state.feedback = Feedback::AlreadyFound;
                self.emit(GameEvent::AlreadyFound { round, target_index });
                Ok(ClickOutcome::Duplicate { target_index })
            }
            Classification::Miss => {
                let before = self.state.time_left;
                self.state.time_left = before.saturating_sub(self.config.miss_penalty_secs);
                self.state.feedback = Feedback::Incorrect;
                let mark = self.place_mark(percent.x, percent.y, false);

                let due = self.now.after(self.config.mark_ttl_ms);
                self.scheduler.schedule_at(due, Task::RemoveMark { round, mark });

                let time_left = self.state.time_left;
                self.emit(GameEvent::Missed {
                    round,
                    penalty: before - time_left,
                    time_left,
                });

                if time_left == 0 {
                    self.complete_round(CompletionReason::TimeUp);
                }

                Ok(ClickOutcome::Miss { mark, time_left })
            }
        }
    }

    /// One countdown step. Normally fired by the round timer.
    ///
    /// Decrements the clock, or advances the round if it already reads 0.
    ///
    /// # Errors
    ///
    /// [`EngineError::RoundNotActive`] while waiting out the pause after the
    /// last find, [`EngineError::SessionComplete`] after the last round.
    pub fn tick(&mut self) -> EngineResult<()> {
        match self.phase {
            Phase::SessionComplete => return Err(EngineError::SessionComplete),
            Phase::RoundComplete(CompletionReason::AllFound) => {
                return Err(EngineError::RoundNotActive {
                    round: self.state.round,
                })
            }
            Phase::Playing | Phase::RoundComplete(CompletionReason::TimeUp) => {}
        }

        if self.state.time_left == 0 {
            return self.advance_round();
        }

        self.state.time_left -= 1;
        self.emit(GameEvent::TimerTicked {
            round: self.state.round,
            time_left: self.state.time_left,
        });
        if self.state.time_left == 0 {
            self.complete_round(CompletionReason::TimeUp);
        }
        Ok(())
    }

    /// Leaves the current round.
    ///
    /// Moves to the next round with a fresh clock, or, after the last round,
    /// submits the ranking entry, emits `Navigate(Ranking)` and ends the
    /// session. Score carries over between rounds.
    ///
    /// # Errors
    ///
    /// [`EngineError::SessionComplete`] if the session already ended.
    pub fn advance_round(&mut self) -> EngineResult<()> {
        if self.phase == Phase::SessionComplete {
            return Err(EngineError::SessionComplete);
        }

        let next = self.state.round + 1;
        if next < self.rounds.round_count() {
            self.state = RoundState::new(next, self.config.round_time_limit_secs);
            self.phase = Phase::Playing;
            self.start_round();
        } else {
            self.finish_session();
        }
        Ok(())
    }

    /// Runs every task due at or before `target`, then sets the clock to `target`.
    ///
    /// Time never goes backwards; an earlier `target` only runs nothing.
    /// Returns the number of tasks run.
    pub fn advance_to(&mut self, target: GameTime) -> usize {
        let target = target.max(self.now);
        let mut fired = 0;
        while let Some((due, task)) = self.scheduler.pop_due(target) {
            self.now = due.max(self.now);
            self.run_task(task);
            fired += 1;
        }
        self.now = target;
        fired
    }

    /// Advances the clock by `ms` milliseconds.
    pub fn advance_by(&mut self, ms: u64) -> usize {
        self.advance_to(self.now.after(ms))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current round state.
    #[must_use]
    pub fn state(&self) -> &RoundState {
        &self.state
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// 0-based round index.
    #[must_use]
    pub fn round_index(&self) -> usize {
        self.state.round
    }

    /// Total rounds.
    #[must_use]
    pub fn round_count(&self) -> usize {
        self.rounds.round_count()
    }

    /// Targets of the current round.
    #[must_use]
    pub fn targets(&self) -> &[spotdiff_shared::DifferenceTarget] {
        self.rounds.targets_for_round(self.state.round)
    }

    /// Seconds left in the round.
    #[must_use]
    pub fn time_left(&self) -> u32 {
        self.state.time_left
    }

    /// Session score.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.session.score()
    }

    /// Current game time.
    #[must_use]
    pub fn now(&self) -> GameTime {
        self.now
    }

    /// Tuning in use.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// The session context.
    #[must_use]
    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Result of the session once it is complete.
    #[must_use]
    pub fn outcome(&self) -> Option<&SessionOutcome> {
        self.outcome.as_ref()
    }

    /// True once the session is complete.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase == Phase::SessionComplete
    }

    /// Number of deferred tasks waiting to run.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    /// When the next deferred task is due.
    #[must_use]
    pub fn next_due(&self) -> Option<GameTime> {
        self.scheduler.next_due()
    }

    /// Hands the session context back.
    #[must_use]
    pub fn into_session(self) -> SessionContext {
        self.session
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn ensure_playing(&self) -> EngineResult<()> {
        match self.phase {
            Phase::Playing => Ok(()),
            Phase::RoundComplete(_) => Err(EngineError::RoundNotActive {
                round: self.state.round,
            }),
            Phase::SessionComplete => Err(EngineError::SessionComplete),
        }
    }

    fn emit(&self, event: GameEvent) {
        self.events.send(event);
    }

    fn place_mark(&mut self, x: f64, y: f64, correct: bool) -> MarkId {
        let id = MarkId(self.next_mark);
        self.next_mark += 1;
        let mark = Mark {
            id,
            x,
            y,
            correct,
            created_at: self.now,
        };
        self.state.marks.push(mark);
        self.emit(GameEvent::MarkPlaced {
            round: self.state.round,
            mark,
        });
        id
    }

    fn complete_round(&mut self, reason: CompletionReason) {
        self.phase = Phase::RoundComplete(reason);
        tracing::info!(
            "Round {} complete ({:?}): {}/{} found, score {}",
            self.state.round,
            reason,
            self.state.found.len(),
            self.targets().len(),
            self.session.score()
        );
        self.emit(GameEvent::RoundCompleted {
            round: self.state.round,
            reason,
        });
    }

    /// Arms the timer for the current round and drops tasks left over from
    /// the previous one.
    fn start_round(&mut self) {
        let (due, generation) = self.timer.arm(self.now);
        self.purge_stale_tasks();
        self.scheduler.schedule_at(due, Task::Tick { generation });

        tracing::info!(
            "Round {}/{} started with {} differences",
            self.state.round + 1,
            self.rounds.round_count(),
            self.targets().len()
        );
        self.emit(GameEvent::RoundStarted {
            round: self.state.round,
            round_count: self.rounds.round_count(),
            time_left: self.state.time_left,
        });
    }

    fn purge_stale_tasks(&mut self) {
        let round = self.state.round;
        let generation = self.timer.generation();
        self.scheduler.retain(|task| match *task {
            Task::Tick { generation: g } => g == generation,
            Task::RemoveMark { round: r, .. } | Task::AdvanceRound { round: r } => r == round,
        });
    }

    fn finish_session(&mut self) {
        self.timer.cancel();
        self.scheduler.clear();

        let name = self.session.display_name(&self.config.anonymous_name);
        let entry = RankingEntry::now(name, self.session.score());
        let (rank, persisted) = self.session.record(entry.clone());
        self.phase = Phase::SessionComplete;

        tracing::info!(
            "Session complete: {} scored {} (rank {:?})",
            entry.name,
            entry.score,
            rank.map(|r| r + 1)
        );

        self.outcome = Some(SessionOutcome {
            entry: entry.clone(),
            rank,
            ranking: self.session.ranking().clone(),
            persisted,
        });
        self.emit(GameEvent::SessionCompleted {
            entry,
            rank,
            persisted,
        });
        self.emit(GameEvent::Navigate(Route::Ranking));
    }

    fn run_task(&mut self, task: Task) {
        match task {
            Task::Tick { generation } => {
                if !self.timer.accepts(generation) {
                    return;
                }
                let next = self.timer.reschedule(self.now);
                self.scheduler.schedule_at(next, Task::Tick { generation });
                if let Err(e) = self.tick() {
                    tracing::debug!("Tick skipped: {}", e);
                }
            }
            Task::RemoveMark { round, mark } => {
                if round != self.state.round || self.phase == Phase::SessionComplete {
                    return;
                }
                let before = self.state.marks.len();
                self.state.marks.retain(|m| m.id != mark);
                if self.state.marks.len() != before {
                    self.emit(GameEvent::MarkRemoved { round, mark });
                }
            }
            Task::AdvanceRound { round } => {
                let waiting = self.phase == Phase::RoundComplete(CompletionReason::AllFound);
                if round == self.state.round && waiting {
                    if let Err(e) = self.advance_round() {
                        tracing::debug!("Advance skipped: {}", e);
                    }
                }
            }
        }
    }
}
