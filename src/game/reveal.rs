//! Reveal sequencer
//!
//! Walks the table one seat at a time. Only the current player's cards
//! can be face up, and they are turned face down again before the next
//! player takes the device.

use super::state::PlayerId;

/// Result of advancing the reveal sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealStep {
    /// The next player's turn has begun
    Next(PlayerId),
    /// Every player has had a turn
    Complete,
}

/// One-player-at-a-time reveal state.
///
/// Players may advance without ever looking at their cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevealSequencer {
    player_count: usize,
    current: usize,
    revealed: bool,
    complete: bool,
}

impl RevealSequencer {
    /// Starts a sequence at seat 0, face down.
    #[must_use]
    pub const fn new(player_count: usize) -> Self {
        Self {
            player_count,
            current: 0,
            revealed: false,
            complete: false,
        }
    }

    /// The player whose turn it is.
    #[must_use]
    pub const fn current_player(&self) -> PlayerId {
        PlayerId(self.current)
    }

    /// Whether the current player's cards are face up.
    #[must_use]
    pub const fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Whether every player has had a turn.
    #[cfg(test)]
    const fn is_complete(&self) -> bool {
        self.complete
    }

    /// Flips the current player's cards. Returns the new face-up state.
    pub fn toggle(&mut self) -> bool {
        self.revealed = !self.revealed;
        self.revealed
    }

    /// Ends the current turn and hides the cards.
    ///
    /// After the last seat this reports [`RevealStep::Complete`] and the
    /// current player stays on the last seat; the sequence never wraps.
    pub fn advance(&mut self) -> RevealStep {
        self.revealed = false;
        if self.complete || self.current + 1 >= self.player_count {
            self.complete = true;
            return RevealStep::Complete;
        }
        self.current += 1;
        RevealStep::Next(PlayerId(self.current))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_face_down_at_seat_zero() {
        let seq = RevealSequencer::new(4);
        assert_eq!(seq.current_player(), PlayerId(0));
        assert!(!seq.is_revealed());
        assert!(!seq.is_complete());
    }

    #[test]
    fn toggle_flips() {
        let mut seq = RevealSequencer::new(3);
        assert!(seq.toggle());
        assert!(!seq.toggle());
        assert!(seq.toggle());
    }

    #[test]
    fn visits_every_seat_in_order() {
        let mut seq = RevealSequencer::new(5);
        let mut visited = vec![seq.current_player()];
        loop {
            match seq.advance() {
                RevealStep::Next(p) => visited.push(p),
                RevealStep::Complete => break,
            }
        }
        assert_eq!(visited, (0..5).map(PlayerId).collect::<Vec<_>>());
        assert!(seq.is_complete());
    }

    #[test]
    fn advance_hides_cards() {
        let mut seq = RevealSequencer::new(3);
        seq.toggle();
        assert_eq!(seq.advance(), RevealStep::Next(PlayerId(1)));
        assert!(!seq.is_revealed());
    }

    #[test]
    fn never_wraps() {
        let mut seq = RevealSequencer::new(3);
        seq.advance();
        seq.advance();
        assert_eq!(seq.advance(), RevealStep::Complete);
        assert_eq!(seq.advance(), RevealStep::Complete);
        assert_eq!(seq.current_player(), PlayerId(2));
    }
}
