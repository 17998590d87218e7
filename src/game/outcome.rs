//! Outcome resolver.

use crate::config::schema::{ThemeEntry, ThemeId};

use super::state::Outcome;

/// Decides the round from the outsider's guess.
///
/// The outsider wins iff `guess` names the true theme.
#[must_use]
pub fn resolve(guess: &ThemeId, truth: &ThemeEntry) -> Outcome {
    Outcome {
        outsider_won: *guess == truth.id,
        guess: guess.clone(),
    }
}
