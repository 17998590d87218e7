//! Phase and player types shared across the game engine, plus the
//! read-only projections handed to the presentation layer.

use serde::Serialize;

use crate::config::schema::{ContextEntry, ThemeEntry, ThemeId};

/// Ordinal seat index, `0..player_count`.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct PlayerId(pub usize);

impl PlayerId {
    /// Returns the zero-based seat index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0 + 1)
    }
}

/// Hidden role of a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Knows the theme and their own context
    Regular,
    /// Knows neither; must deduce the theme
    Outsider,
}

/// The single authoritative game phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Waiting for a roster
    Setup,
    /// Players view their cards one at a time
    Reveal,
    /// Timed open questioning
    Discussion,
    /// Each player explains how they would handle their emotion
    SelfReview,
    /// The outsider names the theme
    OutsiderGuess,
    /// Round over; outcome decided
    Resolved,
}

impl Phase {
    /// Stable lowercase name, used for logs and metric labels.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Setup => "setup",
            Self::Reveal => "reveal",
            Self::Discussion => "discussion",
            Self::SelfReview => "self_review",
            Self::OutsiderGuess => "outsider_guess",
            Self::Resolved => "resolved",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a phase transition happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionReason {
    /// A roster was accepted
    RoundStarted,
    /// The last player finished viewing their card
    RevealComplete,
    /// The countdown reached zero
    TimerExpired,
    /// The countdown was skipped
    TimerSkipped,
    /// The table confirmed the self-review is over
    ReviewConfirmed,
    /// The outsider submitted a guess
    GuessSubmitted,
    /// Explicit restart
    Restarted,
}

/// Record of a phase transition for downstream processing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseTransition {
    /// Round the transition belongs to: the new round for `RoundStarted`,
    /// the abandoned one for `Restarted`, 0 before the first deal
    pub round: u64,
    /// Phase we transitioned from
    pub from: Phase,
    /// Phase we transitioned to
    pub to: Phase,
    /// What triggered the transition
    pub reason: TransitionReason,
}

/// Result of resolving the outsider's guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// `true` iff the guess named the true theme
    pub outsider_won: bool,
    /// The theme id the outsider named
    pub guess: ThemeId,
}

/// What the current player sees when looking at their cards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardView {
    /// Cards are face down
    FaceDown,
    /// The viewer is the outsider; no theme or context is shown
    Outsider,
    /// The viewer is a regular player
    Regular {
        /// The shared theme
        theme: ThemeEntry,
        /// This player's own context
        context: ContextEntry,
    },
}

/// Projection of the reveal phase for the player whose turn it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnView {
    /// Seat of the current player
    pub player: PlayerId,
    /// Display name of the current player
    pub name: String,
    /// Number of players at the table
    pub player_count: usize,
    /// The role-gated card contents
    pub card: CardView,
}

/// Everything about a finished round, visible only once it is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoundSummary {
    /// Round counter within the session
    pub round: u64,
    /// Who the outsider was
    pub outsider: String,
    /// The true theme
    pub theme: ThemeEntry,
    /// The decided outcome
    pub outcome: Outcome,
}

/// Formats seconds as `m:ss`.
#[must_use]
pub fn format_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
