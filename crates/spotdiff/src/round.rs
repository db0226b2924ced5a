//! # Round State
//!
//! Per-round data and click classification.
//!
//! A round is complete exactly when every target is found or the clock hits
//! zero. Everything in [`RoundState`] is discarded when the round advances;
//! the score lives in the session, not here.

use serde::{Deserialize, Serialize};
use spotdiff_shared::{DifferenceTarget, Point};

use crate::scheduler::GameTime;

/// Unique id of a mark within a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MarkId(pub u64);

/// A visual annotation at a clicked location.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mark {
    /// Unique id.
    pub id: MarkId,
    /// X as a percentage of the rendered image width.
    pub x: f64,
    /// Y as a percentage of the rendered image height.
    pub y: f64,
    /// True for a hit. Hit marks stay for the round, miss marks expire.
    pub correct: bool,
    /// When the mark was placed.
    pub created_at: GameTime,
}

/// A target that has been found this round.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FoundDifference {
    /// Index of the matched target in the round's target list.
    pub target_index: usize,
    /// Native X of the click that found it.
    pub x: f64,
    /// Native Y of the click that found it.
    pub y: f64,
}

/// Feedback line shown under the images.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Feedback {
    /// Nothing to say (round start).
    #[default]
    None,
    /// New difference found.
    Correct,
    /// Clicked a difference that was already found.
    AlreadyFound,
    /// Clicked where there is no difference.
    Incorrect,
}

impl Feedback {
    /// Display text.
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            Self::None => "",
            Self::Correct => "Correct!",
            Self::AlreadyFound => "You already found that one!",
            Self::Incorrect => "Wrong!",
        }
    }
}

/// Why a round ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompletionReason {
    /// Every difference was found.
    AllFound,
    /// The clock reached zero.
    TimeUp,
}

/// Engine phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Accepting clicks, clock running.
    Playing,
    /// Round over, waiting for the transition to the next round.
    RoundComplete(CompletionReason),
    /// Last round over, ranking submitted. Terminal.
    SessionComplete,
}

/// Mutable state of the round being played.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundState {
    /// 0-based round index.
    pub round: usize,
    /// Targets found so far, in discovery order.
    pub found: Vec<FoundDifference>,
    /// Marks currently on screen.
    pub marks: Vec<Mark>,
    /// Seconds left on the clock.
    pub time_left: u32,
    /// Last feedback.
    pub feedback: Feedback,
}

impl RoundState {
    /// Fresh state for `round` with a full clock.
    #[must_use]
    pub fn new(round: usize, time_limit: u32) -> Self {
        Self {
            round,
            found: Vec::new(),
            marks: Vec::new(),
            time_left: time_limit,
            feedback: Feedback::None,
        }
    }

    /// True if the target at `index` has been found.
    #[must_use]
    pub fn is_found(&self, index: usize) -> bool {
        self.found.iter().any(|f| f.target_index == index)
    }
}

/// Result of testing a native-space click against a round's targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    /// Inside the radius of an unfound target (the nearest such target).
    Hit(usize),
    /// Inside the radius of targets that are all found already (the nearest one).
    Duplicate(usize),
    /// Outside every target's radius.
    Miss,
}

/// Classifies a click at native position `at`.
///
/// When several targets overlap the click, the nearest unfound one wins, so
/// two close differences can both be found even if their circles overlap.
#[must_use]
pub fn classify(
    targets: &[DifferenceTarget],
    state: &RoundState,
    at: Point,
    radius: f64,
) -> Classification {
    let mut nearest_unfound: Option<(usize, f64)> = None;
    let mut nearest_found: Option<(usize, f64)> = None;

    for (index, target) in targets.iter().enumerate() {
        let d2 = target.point().distance_squared(at);
        if d2 >= radius * radius {
            continue;
        }
        let slot = if state.is_found(index) {
            &mut nearest_found
        } else {
            &mut nearest_unfound
        };
        if slot.map_or(true, |(_, best)| d2 < best) {
            *slot = Some((index, d2));
        }
    }

    match (nearest_unfound, nearest_found) {
        (Some((index, _)), _) => Classification::Hit(index),
        (None, Some((index, _))) => Classification::Duplicate(index),
        (None, None) => Classification::Miss,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn targets() -> Vec<DifferenceTarget> {
        vec![
            DifferenceTarget::new(100.0, 100.0),
            DifferenceTarget::new(200.0, 200.0),
            DifferenceTarget::new(300.0, 300.0),
        ]
    }

    fn found(state: &mut RoundState, index: usize) {
        state.found.push(FoundDifference {
            target_index: index,
            x: 0.0,
            y: 0.0,
        });
    }

    #[test]
    fn test_hit_and_miss() {
        let state = RoundState::new(0, 90);
        let t = targets();
        assert_eq!(classify(&t, &state, Point::new(110.0, 95.0), 30.0), Classification::Hit(0));
        assert_eq!(classify(&t, &state, Point::new(300.0, 329.0), 30.0), Classification::Hit(2));
        assert_eq!(classify(&t, &state, Point::new(150.0, 150.0), 30.0), Classification::Miss);
        assert_eq!(classify(&t, &state, Point::new(130.0, 100.0), 30.0), Classification::Miss);
    }

    #[test]
    fn test_duplicate() {
        let mut state = RoundState::new(0, 90);
        found(&mut state, 0);
        let t = targets();
        assert_eq!(
            classify(&t, &state, Point::new(100.0, 101.0), 30.0),
            Classification::Duplicate(0)
        );
        // Far side of the same circle is still the same target
        assert_eq!(
            classify(&t, &state, Point::new(75.0, 100.0), 30.0),
            Classification::Duplicate(0)
        );
    }

    #[test]
    fn test_overlap_prefers_unfound() {
        let t = vec![DifferenceTarget::new(100.0, 100.0), DifferenceTarget::new(120.0, 100.0)];
        let mut state = RoundState::new(0, 90);
        let click = Point::new(105.0, 100.0);

        assert_eq!(classify(&t, &state, click, 30.0), Classification::Hit(0));
        found(&mut state, 0);
        assert_eq!(classify(&t, &state, click, 30.0), Classification::Hit(1));
        found(&mut state, 1);
        assert_eq!(classify(&t, &state, click, 30.0), Classification::Duplicate(0));
    }

    #[test]
    fn test_feedback_text() {
        assert_eq!(Feedback::None.text(), "");
        assert!(!Feedback::Correct.text().is_empty());
        assert_ne!(Feedback::AlreadyFound.text(), Feedback::Incorrect.text());
    }
}
