//! # SPOTDIFF Event System
//!
//! One-way notifications from the round engine to its collaborators.
//!
//! ```text
//! ┌──────────────┐      ┌─────────────┐      ┌──────────────────┐
//! │ Round Engine │─────>│  Event Bus  │─────>│ Display (marks,  │
//! │              │      │  (bounded)  │      │ clock, feedback) │
//! └──────────────┘      └──────┬──────┘      └──────────────────┘
//!                              │             ┌──────────────────┐
//!                              └────────────>│ Navigation       │
//!                                            └──────────────────┘
//! ```
//!
//! Events travel on two lanes:
//!
//! - **lifecycle** (round started/completed, session completed, navigate):
//!   unbounded, never dropped
//! - **feed** (ticks, clicks, marks): bounded, the newest event is dropped
//!   when full and counted
//!
//! A host that drains rarely can lose feed events but never misses the end of
//! the session. Displays that need the full picture read `RoundView`.
//! Every event carries a sequence number so [`EventReceiver::drain`] returns
//! both lanes in emission order.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TrySendError};
use spotdiff_ranking::RankingEntry;

use crate::round::{CompletionReason, Mark, MarkId};

/// Where the engine sends the player when it is done with them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    /// The leaderboard view.
    Ranking,
}

impl Route {
    /// URL path of the route.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Ranking => "/ranking",
        }
    }
}

/// Events emitted by the round engine.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    // =========================================================================
    // Round lifecycle
    // =========================================================================
    /// A round began with a full clock.
    RoundStarted {
        /// 0-based round index.
        round: usize,
        /// Total rounds in the session.
        round_count: usize,
        /// Seconds on the clock.
        time_left: u32,
    },

    /// The countdown advanced by one second.
    TimerTicked {
        /// Round index.
        round: usize,
        /// Seconds left.
        time_left: u32,
    },

    /// The round ended and will advance.
    RoundCompleted {
        /// Round index.
        round: usize,
        /// Why it ended.
        reason: CompletionReason,
    },

    // =========================================================================
    // Clicks
    // =========================================================================
    /// A new difference was found.
    DifferenceFound {
        /// Round index.
        round: usize,
        /// Index of the target.
        target_index: usize,
        /// Differences found this round.
        found: usize,
        /// Differences in this round.
        total: usize,
        /// Session score after the find.
        score: u32,
    },

    /// The click hit a difference that was already found.
    AlreadyFound {
        /// Round index.
        round: usize,
        /// Index of the target.
        target_index: usize,
    },

    /// The click hit nothing; time was deducted.
    Missed {
        /// Round index.
        round: usize,
        /// Seconds deducted (after flooring at zero).
        penalty: u32,
        /// Seconds left.
        time_left: u32,
    },

    /// A mark appeared on the images.
    MarkPlaced {
        /// Round index.
        round: usize,
        /// The mark.
        mark: Mark,
    },

    /// A miss mark expired.
    MarkRemoved {
        /// Round index.
        round: usize,
        /// Id of the removed mark.
        mark: MarkId,
    },

    // =========================================================================
    // Session end
    // =========================================================================
    /// The last round ended and the ranking was submitted.
    SessionCompleted {
        /// Entry submitted to the leaderboard.
        entry: RankingEntry,
        /// 0-based rank, `None` if it did not make the board.
        rank: Option<usize>,
        /// False if the ranking could not be persisted.
        persisted: bool,
    },

    /// Leave the game view.
    Navigate(Route),
}

impl GameEvent {
    /// True for one-shot events that mark a phase change. These are never dropped.
    #[must_use]
    pub const fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            Self::RoundStarted { .. }
                | Self::RoundCompleted { .. }
                | Self::SessionCompleted { .. }
                | Self::Navigate(_)
        )
    }
}

/// An event stamped with its emission order.
#[derive(Debug)]
struct Sequenced {
    seq: u64,
    event: GameEvent,
}

/// State shared by every handle of one bus.
#[derive(Debug, Default)]
struct Counters {
    next_seq: AtomicU64,
    dropped: AtomicU64,
}

/// Two-lane event bus: lossless lifecycle events, bounded feed events.
pub struct EventBus {
    lifecycle: (Sender<Sequenced>, Receiver<Sequenced>),
    feed: (Sender<Sequenced>, Receiver<Sequenced>),
    counters: Arc<Counters>,
}

impl EventBus {
    /// Creates a bus holding at most `feed_capacity` undelivered feed events.
    #[must_use]
    pub fn new(feed_capacity: usize) -> Self {
        Self {
            lifecycle: unbounded(),
            feed: bounded(feed_capacity),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Creates a sender handle.
    #[must_use]
    pub fn sender(&self) -> EventSender {
        EventSender {
            lifecycle: self.lifecycle.0.clone(),
            feed: self.feed.0.clone(),
            counters: Arc::clone(&self.counters),
        }
    }

    /// Creates a receiver handle. Receivers compete for events.
    #[must_use]
    pub fn receiver(&self) -> EventReceiver {
        EventReceiver {
            lifecycle: self.lifecycle.1.clone(),
            feed: self.feed.1.clone(),
            counters: Arc::clone(&self.counters),
        }
    }
}

/// Handle for sending events.
#[derive(Clone)]
pub struct EventSender {
    lifecycle: Sender<Sequenced>,
    feed: Sender<Sequenced>,
    counters: Arc<Counters>,
}

impl EventSender {
    /// Sends an event without blocking, routed by [`GameEvent::is_lifecycle`].
    ///
    /// Returns `false` if a feed event was dropped because the feed is full.
    pub fn send(&self, event: GameEvent) -> bool {
        let seq = self.counters.next_seq.fetch_add(1, Ordering::Relaxed);
        let lane = if event.is_lifecycle() { &self.lifecycle } else { &self.feed };

        match lane.try_send(Sequenced { seq, event }) {
            Ok(()) => true,
            Err(TrySendError::Full(item)) => {
                let total = self.counters.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::debug!("Event feed full, dropped {:?} ({} total)", item.event, total);
                false
            }
            // The bus itself holds a receiver, so this only happens after teardown
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Handle for receiving events.
#[derive(Clone)]
pub struct EventReceiver {
    lifecycle: Receiver<Sequenced>,
    feed: Receiver<Sequenced>,
    counters: Arc<Counters>,
}

impl EventReceiver {
    /// Receives all pending events from both lanes, in emission order.
    pub fn drain(&self) -> Vec<GameEvent> {
        let mut pending: Vec<Sequenced> = self
            .lifecycle
            .try_iter()
            .chain(self.feed.try_iter())
            .collect();
        pending.sort_by_key(|s| s.seq);
        pending.into_iter().map(|s| s.event).collect()
    }

    /// Receives pending lifecycle events only, leaving the feed queued.
    pub fn drain_lifecycle(&self) -> Vec<GameEvent> {
        self.lifecycle.try_iter().map(|s| s.event).collect()
    }

    /// Number of pending events on both lanes.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.lifecycle.len() + self.feed.len()
    }

    /// True if any event is pending.
    #[must_use]
    pub fn has_events(&self) -> bool {
        !(self.lifecycle.is_empty() && self.feed.is_empty())
    }

    /// Feed events dropped so far because the feed was full.
    #[must_use]
    pub fn dropped_count(&self) -> u64 {
        self.counters.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tick(time_left: u32) -> GameEvent {
        GameEvent::TimerTicked { round: 0, time_left }
    }

    #[test]
    fn test_drain_preserves_emission_order() {
        let bus = EventBus::new(16);
        let sender = bus.sender();
        let receiver = bus.receiver();

        sender.send(GameEvent::RoundStarted { round: 0, round_count: 1, time_left: 90 });
        sender.send(tick(89));
        sender.send(GameEvent::RoundCompleted { round: 0, reason: CompletionReason::TimeUp });
        sender.send(tick(0));
        sender.send(GameEvent::Navigate(Route::Ranking));

        assert_eq!(receiver.pending_count(), 5);
        let events = receiver.drain();
        assert_eq!(events.len(), 5);
        assert_eq!(events[1], tick(89));
        assert_eq!(events[3], tick(0));
        assert_eq!(events[4], GameEvent::Navigate(Route::Ranking));
        assert!(!receiver.has_events());
    }

    #[test]
    fn test_full_feed_drops_ticks_only() {
        let bus = EventBus::new(2);
        let sender = bus.sender();
        let receiver = bus.receiver();

        for i in 0..10 {
            sender.send(tick(90 - i));
        }
        assert!(sender.send(GameEvent::Navigate(Route::Ranking)));
        assert!(!sender.send(tick(0)));

        assert_eq!(receiver.dropped_count(), 9);
        let events = receiver.drain();
        assert_eq!(events, [tick(90), tick(89), GameEvent::Navigate(Route::Ranking)]);
    }

    #[test]
    fn test_drain_lifecycle_leaves_feed() {
        let bus = EventBus::new(4);
        let sender = bus.sender();
        let receiver = bus.receiver();

        sender.send(tick(5));
        sender.send(GameEvent::Navigate(Route::Ranking));

        assert_eq!(receiver.drain_lifecycle(), [GameEvent::Navigate(Route::Ranking)]);
        assert_eq!(receiver.drain(), [tick(5)]);
    }

    #[test]
    fn test_route_path() {
        assert_eq!(Route::Ranking.path(), "/ranking");
    }
}
