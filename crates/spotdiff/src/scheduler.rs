//! # Deferred Task Scheduling
//!
//! The engine never reads a wall clock. It owns a [`GameTime`] and a queue
//! of tasks due at future game times; the host advances time and due tasks
//! run one at a time, in due order, each to completion.
//!
//! Tasks due at the same instant run in the order they were scheduled.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Milliseconds since the session started.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct GameTime(u64);

impl GameTime {
    /// Session start.
    pub const ZERO: Self = Self(0);

    /// Creates a time from milliseconds.
    #[must_use]
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Milliseconds since session start.
    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// The time `ms` milliseconds later.
    #[must_use]
    pub const fn after(self, ms: u64) -> Self {
        Self(self.0.saturating_add(ms))
    }

    /// Milliseconds elapsed since `earlier`, 0 if `earlier` is later.
    #[must_use]
    pub const fn since(self, earlier: Self) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

/// Queue entry. Ordered so the `BinaryHeap` (a max-heap) pops the earliest first.
struct Entry<T> {
    due: GameTime,
    seq: u64,
    task: T,
}

impl<T> PartialEq for Entry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl<T> Eq for Entry<T> {}

impl<T> PartialOrd for Entry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Entry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        other.due.cmp(&self.due).then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Time-ordered queue of deferred tasks.
pub struct Scheduler<T> {
    queue: BinaryHeap<Entry<T>>,
    next_seq: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            queue: BinaryHeap::new(),
            next_seq: 0,
        }
    }

    /// Schedules `task` to run at `due`.
    pub fn schedule_at(&mut self, due: GameTime, task: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Entry { due, seq, task });
    }

    /// Removes and returns the earliest task due at or before `now`.
    pub fn pop_due(&mut self, now: GameTime) -> Option<(GameTime, T)> {
        if self.queue.peek()?.due > now {
            return None;
        }
        self.queue.pop().map(|e| (e.due, e.task))
    }

    /// Due time of the earliest pending task.
    #[must_use]
    pub fn next_due(&self) -> Option<GameTime> {
        self.queue.peek().map(|e| e.due)
    }

    /// Drops every task for which `keep` returns false.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        self.queue.retain(|e| keep(&e.task));
    }

    /// Drops every pending task.
    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// True if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

/// Repeating countdown timer for one round.
///
/// Every (re-)arm or cancel bumps the generation. A tick task carries the
/// generation it was scheduled under and is ignored unless it still matches,
/// so ticks from an earlier round can never reach the current one.
#[derive(Clone, Debug)]
pub struct RoundTimer {
    interval_ms: u64,
    generation: u64,
    next_due: Option<GameTime>,
}

impl RoundTimer {
    /// Creates a disarmed timer with the given period.
    #[must_use]
    pub const fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms,
            generation: 0,
            next_due: None,
        }
    }

    /// Starts a fresh period at `now`. Returns the first due time and the new generation.
    pub fn arm(&mut self, now: GameTime) -> (GameTime, u64) {
        self.generation += 1;
        let due = now.after(self.interval_ms);
        self.next_due = Some(due);
        (due, self.generation)
    }

    /// Stops the timer. Pending ticks become stale.
    pub fn cancel(&mut self) {
        self.generation += 1;
        self.next_due = None;
    }

    /// True if a tick scheduled under `generation` should run.
    #[must_use]
    pub fn accepts(&self, generation: u64) -> bool {
        self.next_due.is_some() && generation == self.generation
    }

    /// Records that the tick due at `fired_at` ran. Returns the next due time.
    pub fn reschedule(&mut self, fired_at: GameTime) -> GameTime {
        let due = fired_at.after(self.interval_ms);
        self.next_due = Some(due);
        due
    }

    /// Current generation.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// When the next tick is due, if armed.
    #[must_use]
    pub const fn next_due(&self) -> Option<GameTime> {
        self.next_due
    }

    /// True while armed.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pops_in_due_order() {
        let mut s = Scheduler::new();
        s.schedule_at(GameTime::from_millis(300), "c");
        s.schedule_at(GameTime::from_millis(100), "a");
        s.schedule_at(GameTime::from_millis(200), "b");

        assert_eq!(s.next_due(), Some(GameTime::from_millis(100)));
        assert!(s.pop_due(GameTime::from_millis(50)).is_none());

        let now = GameTime::from_millis(1000);
        let order: Vec<_> = std::iter::from_fn(|| s.pop_due(now).map(|(_, t)| t)).collect();
        assert_eq!(order, ["a", "b", "c"]);
        assert!(s.is_empty());
    }

    #[test]
    fn test_ties_run_in_schedule_order() {
        let mut s = Scheduler::new();
        let due = GameTime::from_millis(1000);
        for i in 0..5 {
            s.schedule_at(due, i);
        }
        let order: Vec<_> = std::iter::from_fn(|| s.pop_due(due).map(|(_, t)| t)).collect();
        assert_eq!(order, [0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_retain_drops_tasks() {
        let mut s = Scheduler::new();
        for i in 0..10 {
            s.schedule_at(GameTime::from_millis(i), i);
        }
        s.retain(|t| t % 2 == 0);
        assert_eq!(s.len(), 5);
        s.clear();
        assert!(s.is_empty());
    }

    #[test]
    fn test_timer_generations() {
        let mut timer = RoundTimer::new(1000);
        assert!(!timer.is_armed());

        let (due, first) = timer.arm(GameTime::ZERO);
        assert_eq!(due, GameTime::from_millis(1000));
        assert!(timer.accepts(first));

        let next = timer.reschedule(due);
        assert_eq!(next, GameTime::from_millis(2000));

        let (_, second) = timer.arm(GameTime::from_millis(1500));
        assert!(!timer.accepts(first));
        assert!(timer.accepts(second));

        timer.cancel();
        assert!(!timer.accepts(second));
        assert_eq!(timer.next_due(), None);
    }

    #[test]
    fn test_game_time_arithmetic() {
        let t = GameTime::from_millis(500);
        assert_eq!(t.after(250).as_millis(), 750);
        assert_eq!(t.since(GameTime::from_millis(200)), 300);
        assert_eq!(GameTime::ZERO.since(t), 0);
        assert_eq!(GameTime::from_millis(u64::MAX).after(1).as_millis(), u64::MAX);
    }
}
