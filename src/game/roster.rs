//! Player roster validation.

use crate::config::defaults::{MAX_PLAYERS, MIN_PLAYERS};
use crate::error::GameError;

use super::state::PlayerId;

/// Validated, immutable list of player names for one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    names: Vec<String>,
}

impl Roster {
    /// Builds a roster from the supplied names.
    ///
    /// Blank names become `"Player k"` placeholders and never block the
    /// start of a round.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidPlayerCount` if the table size is outside
    /// `3..=6`.
    pub fn new<S: AsRef<str>>(names: &[S]) -> Result<Self, GameError> {
        check_count(names.len())?;
        let names = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let trimmed = name.as_ref().trim();
                if trimmed.is_empty() {
                    placeholder(i)
                } else {
                    trimmed.to_string()
                }
            })
            .collect();
        Ok(Self { names })
    }

    /// Builds a roster for a declared table size.
    ///
    /// # Errors
    ///
    /// Returns `GameError::InvalidPlayerCount` if `declared` is outside
    /// `3..=6`, or `GameError::MissingPlayerNames` if the number of names
    /// supplied differs from `declared`.
    pub fn declared<S: AsRef<str>>(declared: usize, names: &[S]) -> Result<Self, GameError> {
        check_count(declared)?;
        if names.len() != declared {
            return Err(GameError::MissingPlayerNames {
                declared,
                supplied: names.len(),
            });
        }
        Self::new(names)
    }

    /// Number of players.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always `false`; a valid roster has at least three players.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name of the given player.
    #[must_use]
    pub fn name(&self, player: PlayerId) -> &str {
        &self.names[player.index()]
    }

    /// All names in seat order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Placeholder label for the seat at `index`.
#[must_use]
pub fn placeholder(index: usize) -> String {
    format!("Player {}", index + 1)
}

const fn check_count(count: usize) -> Result<(), GameError> {
    if count < MIN_PLAYERS || count > MAX_PLAYERS {
        return Err(GameError::InvalidPlayerCount {
            count,
            min: MIN_PLAYERS,
            max: MAX_PLAYERS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_supported_sizes() {
        for n in MIN_PLAYERS..=MAX_PLAYERS {
            let names: Vec<String> = (0..n).map(|i| format!("p{i}")).collect();
            assert_eq!(Roster::new(&names).unwrap().len(), n);
        }
    }

    #[test]
    fn rejects_out_of_range() {
        for n in [0, 1, 2, 7, 10] {
            let names = vec!["x"; n];
            assert_eq!(
                Roster::new(&names).unwrap_err(),
                GameError::InvalidPlayerCount {
                    count: n,
                    min: 3,
                    max: 6
                }
            );
        }
    }

    #[test]
    fn blank_names_get_placeholders() {
        let roster = Roster::new(&["Ann", "", "  "]).unwrap();
        assert_eq!(roster.names(), ["Ann", "Player 2", "Player 3"]);
    }

    #[test]
    fn names_are_trimmed() {
        let roster = Roster::new(&[" Ann ", "Bo", "Cy"]).unwrap();
        assert_eq!(roster.name(PlayerId(0)), "Ann");
    }

    #[test]
    fn declared_mismatch() {
        assert_eq!(
            Roster::declared(4, &["a", "b", "c"]).unwrap_err(),
            GameError::MissingPlayerNames {
                declared: 4,
                supplied: 3
            }
        );
        assert!(Roster::declared(2, &["a", "b"]).unwrap_err().is_invalid_player_count());
        assert_eq!(Roster::declared(3, &["a", "b", "c"]).unwrap().len(), 3);
    }
}
