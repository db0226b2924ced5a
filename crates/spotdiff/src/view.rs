//! # View Model
//!
//! Props for the presentational components. Nothing here mutates the engine.

use spotdiff_ranking::{RankingStore, RankingTable};
use spotdiff_shared::RoundSource;

use crate::engine::RoundEngine;
use crate::round::Mark;
use crate::session::load_ranking;

/// Colour band of the countdown bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProgressColor {
    /// More than half the time left.
    Safe,
    /// More than a quarter left.
    Warning,
    /// A quarter or less.
    Danger,
}

impl ProgressColor {
    /// CSS colour for the band.
    #[must_use]
    pub const fn css(self) -> &'static str {
        match self {
            Self::Safe => "green",
            Self::Warning => "yellow",
            Self::Danger => "red",
        }
    }
}

/// Fraction of the round's time remaining, in `[0, 1]`.
#[must_use]
pub fn progress_fraction(time_left: u32, limit: u32) -> f64 {
    if limit == 0 {
        return 0.0;
    }
    (f64::from(time_left) / f64::from(limit)).clamp(0.0, 1.0)
}

/// Colour band for `time_left` out of `limit`.
#[must_use]
pub fn progress_color(time_left: u32, limit: u32) -> ProgressColor {
    let fraction = progress_fraction(time_left, limit);
    if fraction > 0.5 {
        ProgressColor::Safe
    } else if fraction > 0.25 {
        ProgressColor::Warning
    } else {
        ProgressColor::Danger
    }
}

/// One pip per difference; the first `found` are filled.
#[must_use]
pub fn found_pips(found: usize, total: usize) -> Vec<bool> {
    (0..total).map(|i| i < found).collect()
}

/// Everything the game view renders.
#[derive(Clone, Debug, PartialEq)]
pub struct RoundView {
    /// 1-based round number.
    pub round_number: usize,
    /// Total rounds.
    pub round_count: usize,
    /// Heading, e.g. "Round 2 (2/5)".
    pub title: String,
    /// Session score.
    pub score: u32,
    /// Seconds left.
    pub time_left: u32,
    /// Height of the countdown bar, `[0, 1]`.
    pub progress: f64,
    /// Colour of the countdown bar.
    pub color: ProgressColor,
    /// Found-difference indicators.
    pub pips: Vec<bool>,
    /// Marks to overlay on both images.
    pub marks: Vec<Mark>,
    /// Feedback line (may be empty).
    pub feedback: &'static str,
    /// Left image path.
    pub left_image: String,
    /// Right image path.
    pub right_image: String,
}

impl RoundView {
    /// Snapshot of `engine` for rendering.
    #[must_use]
    pub fn from_engine<S: RoundSource>(engine: &RoundEngine<S>) -> Self {
        let config = engine.config();
        let state = engine.state();
        let limit = config.round_time_limit_secs;
        let round_number = state.round + 1;
        let round_count = engine.round_count();
        let prefix = config.image_prefix.trim_end_matches('/');

        Self {
            round_number,
            round_count,
            title: format!("Round {round_number} ({round_number}/{round_count})"),
            score: engine.score(),
            time_left: state.time_left,
            progress: progress_fraction(state.time_left, limit),
            color: progress_color(state.time_left, limit),
            pips: found_pips(state.found.len(), engine.targets().len()),
            marks: state.marks.clone(),
            feedback: state.feedback.text(),
            left_image: format!("{prefix}/img{round_number}1.jpg"),
            right_image: format!("{prefix}/img{round_number}2.jpg"),
        }
    }
}

impl<S: RoundSource> RoundEngine<S> {
    /// Snapshot of the current round for rendering.
    #[must_use]
    pub fn view(&self) -> RoundView {
        RoundView::from_engine(self)
    }
}

/// One leaderboard row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LeaderboardRow {
    /// 1-based rank.
    pub rank: usize,
    /// Player name.
    pub name: String,
    /// Score.
    pub score: u32,
    /// Unix epoch ms.
    pub timestamp: u64,
}

/// The ranking page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LeaderboardView {
    /// Rows, best first.
    pub rows: Vec<LeaderboardRow>,
}

impl LeaderboardView {
    /// Builds the view from a table.
    #[must_use]
    pub fn from_table(table: &RankingTable) -> Self {
        Self {
            rows: table
                .rows()
                .map(|(rank, e)| LeaderboardRow {
                    rank,
                    name: e.name.clone(),
                    score: e.score,
                    timestamp: e.timestamp,
                })
                .collect(),
        }
    }

    /// Reads the leaderboard through `store`. Unreadable storage shows an empty board.
    pub fn load(store: &dyn RankingStore, capacity: usize) -> Self {
        Self::from_table(&load_ranking(store, capacity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spotdiff_ranking::{MemoryStore, RankingEntry};

    #[test]
    fn test_progress_color_bands() {
        assert_eq!(progress_color(90, 90), ProgressColor::Safe);
        assert_eq!(progress_color(46, 90), ProgressColor::Safe);
        assert_eq!(progress_color(45, 90), ProgressColor::Warning);
        assert_eq!(progress_color(23, 90), ProgressColor::Warning);
        assert_eq!(progress_color(22, 90), ProgressColor::Danger);
        assert_eq!(progress_color(0, 90), ProgressColor::Danger);
        assert_eq!(progress_color(5, 0), ProgressColor::Danger);
        assert_eq!(ProgressColor::Warning.css(), "yellow");
    }

    #[test]
    fn test_progress_fraction() {
        assert_eq!(progress_fraction(45, 90), 0.5);
        assert_eq!(progress_fraction(0, 90), 0.0);
        assert_eq!(progress_fraction(1, 0), 0.0);
    }

    #[test]
    fn test_found_pips() {
        assert_eq!(found_pips(2, 4), [true, true, false, false]);
        assert!(found_pips(0, 0).is_empty());
    }

    #[test]
    fn test_leaderboard_view() {
        let store = MemoryStore::new();
        store
            .write(&[RankingEntry::new("a", 100, 1), RankingEntry::new("b", 300, 2)])
            .unwrap();

        let view = LeaderboardView::load(&store, 10);
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.rows[0].rank, 1);
        assert_eq!(view.rows[0].name, "b");

        store.set_available(false);
        assert_eq!(LeaderboardView::load(&store, 10), LeaderboardView::default());
    }
}
