//! Match records and the status state machine.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{MatchId, ParticipantId};

/// Lifecycle status of a match.
///
/// Allowed moves are `Scheduled → Live → Completed` and the direct
/// `Scheduled → Completed`. `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Scheduled,
    Live,
    Completed,
}

impl MatchStatus {
    /// Returns true once the match has concluded.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        matches!(self, MatchStatus::Completed)
    }

    /// Whether a status update from `self` to `next` is allowed.
    ///
    /// Same-state updates are permitted (score refreshes, or the
    /// idempotent completed call). The forbidden moves are leaving
    /// `Completed` and winding `Live` back to `Scheduled`.
    #[must_use]
    pub fn can_transition_to(&self, next: MatchStatus) -> bool {
        match (self, next) {
            (MatchStatus::Completed, MatchStatus::Completed) => true,
            (MatchStatus::Completed, _) => false,
            (MatchStatus::Live, MatchStatus::Scheduled) => false,
            _ => true,
        }
    }

    /// Stable lowercase name, used for storage and display.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "scheduled",
            MatchStatus::Live => "live",
            MatchStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(MatchStatus::Scheduled),
            "live" => Ok(MatchStatus::Live),
            "completed" => Ok(MatchStatus::Completed),
            other => Err(format!("unknown match status: {other}")),
        }
    }
}

/// One of the two sides of a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    /// The opposing side.
    #[must_use]
    pub fn other(&self) -> Side {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }
}

/// What a concluded match resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A decided result; backers of this side win.
    Winner(Side),
    /// Level scores with no explicit winner.
    Draw,
}

/// A two-party match carrying the betting pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    id: MatchId,
    side_a: ParticipantId,
    side_b: ParticipantId,
    status: MatchStatus,
    winner: Option<ParticipantId>,
    score_a: Option<u32>,
    score_b: Option<u32>,
}

impl Match {
    /// Create a match record with explicit state.
    #[must_use]
    pub fn new(
        id: MatchId,
        side_a: ParticipantId,
        side_b: ParticipantId,
        status: MatchStatus,
        winner: Option<ParticipantId>,
        score_a: Option<u32>,
        score_b: Option<u32>,
    ) -> Self {
        Self {
            id,
            side_a,
            side_b,
            status,
            winner,
            score_a,
            score_b,
        }
    }

    /// Register a fresh match between two participants.
    #[must_use]
    pub fn scheduled(id: MatchId, side_a: ParticipantId, side_b: ParticipantId) -> Self {
        Self::new(id, side_a, side_b, MatchStatus::Scheduled, None, None, None)
    }

    /// Get the match ID.
    #[must_use]
    pub fn id(&self) -> &MatchId {
        &self.id
    }

    /// Get the first side's participant.
    #[must_use]
    pub fn side_a(&self) -> &ParticipantId {
        &self.side_a
    }

    /// Get the second side's participant.
    #[must_use]
    pub fn side_b(&self) -> &ParticipantId {
        &self.side_b
    }

    /// Get the current status.
    #[must_use]
    pub fn status(&self) -> MatchStatus {
        self.status
    }

    /// Get the recorded winner, if the match has one.
    #[must_use]
    pub fn winner(&self) -> Option<&ParticipantId> {
        self.winner.as_ref()
    }

    /// Get the recorded score for side A.
    #[must_use]
    pub fn score_a(&self) -> Option<u32> {
        self.score_a
    }

    /// Get the recorded score for side B.
    #[must_use]
    pub fn score_b(&self) -> Option<u32> {
        self.score_b
    }

    /// The participant on a given side.
    #[must_use]
    pub fn participant(&self, side: Side) -> &ParticipantId {
        match side {
            Side::A => &self.side_a,
            Side::B => &self.side_b,
        }
    }

    /// Which side a participant is on, if any.
    #[must_use]
    pub fn side_of(&self, participant: &ParticipantId) -> Option<Side> {
        if *participant == self.side_a {
            Some(Side::A)
        } else if *participant == self.side_b {
            Some(Side::B)
        } else {
            None
        }
    }

    /// Whether the match still takes stakes.
    #[must_use]
    pub fn accepts_stakes(&self) -> bool {
        !self.status.is_completed()
    }

    /// Record the current score.
    pub fn record_score(&mut self, score_a: u32, score_b: u32) {
        self.score_a = Some(score_a);
        self.score_b = Some(score_b);
    }

    /// Apply a status change.
    ///
    /// Returns false and changes nothing when the state machine forbids
    /// the move.
    #[must_use]
    pub fn transition(&mut self, next: MatchStatus) -> bool {
        if !self.status.can_transition_to(next) {
            return false;
        }
        self.status = next;
        true
    }

    /// Record the winning side.
    pub fn set_winner(&mut self, side: Side) {
        self.winner = Some(self.participant(side).clone());
    }

    /// Derive the outcome from recorded scores.
    ///
    /// None when either score is missing; `Outcome::Draw` on level scores.
    #[must_use]
    pub fn outcome_from_scores(&self) -> Option<Outcome> {
        match (self.score_a, self.score_b) {
            (Some(a), Some(b)) if a > b => Some(Outcome::Winner(Side::A)),
            (Some(a), Some(b)) if b > a => Some(Outcome::Winner(Side::B)),
            (Some(_), Some(_)) => Some(Outcome::Draw),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> Match {
        Match::scheduled(
            MatchId::new("m1"),
            ParticipantId::new("alpha"),
            ParticipantId::new("beta"),
        )
    }

    #[test]
    fn scheduled_match_accepts_stakes() {
        let mat = fresh();
        assert_eq!(mat.status(), MatchStatus::Scheduled);
        assert!(mat.accepts_stakes());
        assert!(mat.winner().is_none());
    }

    #[test]
    fn forward_transitions_are_allowed() {
        assert!(MatchStatus::Scheduled.can_transition_to(MatchStatus::Live));
        assert!(MatchStatus::Scheduled.can_transition_to(MatchStatus::Completed));
        assert!(MatchStatus::Live.can_transition_to(MatchStatus::Completed));
    }

    #[test]
    fn same_state_updates_are_allowed() {
        assert!(MatchStatus::Scheduled.can_transition_to(MatchStatus::Scheduled));
        assert!(MatchStatus::Live.can_transition_to(MatchStatus::Live));
        assert!(MatchStatus::Completed.can_transition_to(MatchStatus::Completed));
    }

    #[test]
    fn backward_and_reopening_transitions_are_rejected() {
        assert!(!MatchStatus::Live.can_transition_to(MatchStatus::Scheduled));
        assert!(!MatchStatus::Completed.can_transition_to(MatchStatus::Live));
        assert!(!MatchStatus::Completed.can_transition_to(MatchStatus::Scheduled));
    }

    #[test]
    fn transition_mutates_only_when_legal() {
        let mut mat = fresh();

        assert!(mat.transition(MatchStatus::Live));
        assert_eq!(mat.status(), MatchStatus::Live);

        assert!(!mat.transition(MatchStatus::Scheduled));
        assert_eq!(mat.status(), MatchStatus::Live);
    }

    #[test]
    fn completed_match_refuses_stakes() {
        let mut mat = fresh();
        assert!(mat.transition(MatchStatus::Completed));
        assert!(!mat.accepts_stakes());
    }

    #[test]
    fn side_of_maps_participants_to_sides() {
        let mat = fresh();
        assert_eq!(mat.side_of(&ParticipantId::new("alpha")), Some(Side::A));
        assert_eq!(mat.side_of(&ParticipantId::new("beta")), Some(Side::B));
        assert_eq!(mat.side_of(&ParticipantId::new("stranger")), None);
    }

    #[test]
    fn participant_is_inverse_of_side_of() {
        let mat = fresh();
        assert_eq!(mat.participant(Side::A).as_str(), "alpha");
        assert_eq!(mat.participant(Side::B).as_str(), "beta");
    }

    #[test]
    fn set_winner_records_the_sides_participant() {
        let mut mat = fresh();
        assert!(mat.winner().is_none());

        mat.set_winner(Side::B);
        assert_eq!(mat.winner().unwrap().as_str(), "beta");
    }

    #[test]
    fn outcome_from_scores_picks_the_higher_score() {
        let mut mat = fresh();
        assert_eq!(mat.outcome_from_scores(), None);

        mat.record_score(3, 1);
        assert_eq!(mat.outcome_from_scores(), Some(Outcome::Winner(Side::A)));

        mat.record_score(1, 3);
        assert_eq!(mat.outcome_from_scores(), Some(Outcome::Winner(Side::B)));

        mat.record_score(2, 2);
        assert_eq!(mat.outcome_from_scores(), Some(Outcome::Draw));
    }

    #[test]
    fn status_roundtrips_through_strings() {
        for status in [
            MatchStatus::Scheduled,
            MatchStatus::Live,
            MatchStatus::Completed,
        ] {
            let parsed: MatchStatus = status.as_str().parse().unwrap();
            assert_eq!(parsed, status);
        }
        assert!("paused".parse::<MatchStatus>().is_err());
    }

    #[test]
    fn side_other_flips() {
        assert_eq!(Side::A.other(), Side::B);
        assert_eq!(Side::B.other(), Side::A);
    }
}
