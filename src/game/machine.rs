//! Phase state machine
//!
//! [`PhaseMachine`] owns the single authoritative [`Phase`] together with
//! the records that only exist while that phase is active: the reveal
//! sequence during `Reveal`, the countdown during `Discussion`, and the
//! outcome once `Resolved`. Leaving a phase drops its record, so a
//! countdown's tick task never outlives the discussion that started it.
//!
//! Every intent validates before it mutates. A rejected intent returns a
//! [`GameError`] and leaves the machine exactly as it was.
//!
//! Transitions are queued as [`PhaseTransition`] records; the driver
//! drains them with [`PhaseMachine::take_transitions`].

use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::config::schema::{Catalog, GameConfig, ThemeEntry, ThemeId};
use crate::error::GameError;
use crate::observability::metrics;

use super::assignment::{self, RoundAssignment};
use super::countdown::{Countdown, TimerSignal};
use super::outcome;
use super::reveal::{RevealSequencer, RevealStep};
use super::roster::Roster;
use super::state::{
    CardView, Outcome, Phase, PhaseTransition, Role, RoundSummary, TransitionReason, TurnView,
};
use super::ticker::{ManualTicks, Tick, TickScheduler};

/// Everything dealt for one round.
#[derive(Debug)]
struct Round {
    number: u64,
    roster: Roster,
    catalog: Arc<Catalog>,
    assignment: RoundAssignment,
}

/// The active phase and its phase-scoped state.
#[derive(Debug)]
enum Stage {
    Setup,
    Reveal { round: Round, reveal: RevealSequencer },
    Discussion { round: Round, countdown: Countdown },
    SelfReview { round: Round },
    OutsiderGuess { round: Round },
    Resolved { round: Round, outcome: Outcome },
}

impl Stage {
    const fn phase(&self) -> Phase {
        match self {
            Self::Setup => Phase::Setup,
            Self::Reveal { .. } => Phase::Reveal,
            Self::Discussion { .. } => Phase::Discussion,
            Self::SelfReview { .. } => Phase::SelfReview,
            Self::OutsiderGuess { .. } => Phase::OutsiderGuess,
            Self::Resolved { .. } => Phase::Resolved,
        }
    }

    const fn round(&self) -> Option<&Round> {
        match self {
            Self::Setup => None,
            Self::Reveal { round, .. }
            | Self::Discussion { round, .. }
            | Self::SelfReview { round }
            | Self::OutsiderGuess { round }
            | Self::Resolved { round, .. } => Some(round),
        }
    }
}

/// Game orchestrator: routes player intents to the assignment engine,
/// the reveal sequencer, the countdown, and the outcome resolver.
#[derive(Debug)]
pub struct PhaseMachine {
    config: Arc<GameConfig>,
    rng: StdRng,
    scheduler: Arc<dyn TickScheduler>,
    round_number: u64,
    epoch: u64,
    stage: Stage,
    transitions: Vec<PhaseTransition>,
}

impl PhaseMachine {
    /// Creates a machine in `Setup`, seeded from the OS and driven by
    /// manual ticks.
    #[must_use]
    pub fn new(config: Arc<GameConfig>) -> Self {
        Self {
            config,
            rng: StdRng::from_os_rng(),
            scheduler: Arc::new(ManualTicks),
            round_number: 0,
            epoch: 0,
            stage: Stage::Setup,
            transitions: Vec::new(),
        }
    }

    /// Replaces the random source with a seeded one.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Replaces the tick scheduler used for discussion countdowns.
    #[must_use]
    pub fn with_scheduler(mut self, scheduler: Arc<dyn TickScheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    // ========================================================================
    // Intents
    // ========================================================================

    /// Starts a round for the given names and enters `Reveal`.
    ///
    /// # Errors
    ///
    /// - `GameError::IllegalPhaseTransition` outside `Setup`
    /// - `GameError::InvalidPlayerCount` for fewer than 3 or more than 6 names
    /// - `GameError::EmptyCatalog` / `GameError::InsufficientContexts` for an
    ///   unusable catalog
    pub fn start_round<S: AsRef<str>>(
        &mut self,
        names: &[S],
        catalog: Arc<Catalog>,
    ) -> Result<(), GameError> {
        if self.phase() != Phase::Setup {
            return Err(self.illegal("start a round"));
        }
        let roster = Roster::new(names)?;
        self.start_roster(roster, catalog)
    }

    /// Starts a round for an already validated roster.
    ///
    /// # Errors
    ///
    /// Same as [`start_round`](Self::start_round), minus roster validation.
    pub fn start_roster(&mut self, roster: Roster, catalog: Arc<Catalog>) -> Result<(), GameError> {
        if self.phase() != Phase::Setup {
            return Err(self.illegal("start a round"));
        }
        let round = self.deal(roster, catalog)?;
        let players = round.roster.len();
        self.round_number = round.number;
        self.transition(TransitionReason::RoundStarted, |stage| match stage {
            Stage::Setup => Stage::Reveal {
                round,
                reveal: RevealSequencer::new(players),
            },
            other => other,
        });
        Ok(())
    }

    /// Flips the current player's cards. Returns `true` when face up.
    ///
    /// # Errors
    ///
    /// `GameError::IllegalPhaseTransition` outside `Reveal`.
    pub fn toggle_current_reveal(&mut self) -> Result<bool, GameError> {
        let Stage::Reveal { reveal, .. } = &mut self.stage else {
            return Err(self.illegal("toggle a card"));
        };
        let revealed = reveal.toggle();
        debug!(player = reveal.current_player().index(), revealed, "card toggled");
        Ok(revealed)
    }

    /// Hands the device to the next player, or ends the reveal after the
    /// last one and starts the discussion countdown.
    ///
    /// # Errors
    ///
    /// `GameError::IllegalPhaseTransition` outside `Reveal`.
    pub fn advance_turn(&mut self) -> Result<RevealStep, GameError> {
        let Stage::Reveal { reveal, .. } = &mut self.stage else {
            return Err(self.illegal("advance the turn"));
        };
        let step = reveal.advance();
        match step {
            RevealStep::Next(player) => debug!(player = player.index(), "next turn"),
            RevealStep::Complete => self.begin_discussion(),
        }
        Ok(step)
    }

    /// Counts the discussion clock down by one second.
    ///
    /// # Errors
    ///
    /// `GameError::IllegalPhaseTransition` outside `Discussion`.
    pub fn tick(&mut self) -> Result<TimerSignal, GameError> {
        let Stage::Discussion { countdown, .. } = &mut self.stage else {
            return Err(self.illegal("tick the countdown"));
        };
        let signal = countdown.tick();
        if signal == TimerSignal::Complete {
            self.end_discussion(TransitionReason::TimerExpired);
        }
        Ok(signal)
    }

    /// Applies a tick delivered by the scheduler.
    ///
    /// Ticks from a countdown that no longer runs (a finished discussion or
    /// an earlier round) are dropped.
    pub fn handle_scheduled_tick(&mut self, tick: Tick) -> TimerSignal {
        let live = matches!(
            &self.stage,
            Stage::Discussion { countdown, .. } if countdown.accepts(tick)
        );
        if !live {
            debug!(epoch = tick.epoch, phase = %self.phase(), "dropping stale tick");
            return TimerSignal::Pending;
        }
        self.tick().unwrap_or(TimerSignal::Pending)
    }

    /// Ends the discussion early and enters `SelfReview`.
    ///
    /// # Errors
    ///
    /// `GameError::IllegalPhaseTransition` outside `Discussion`.
    pub fn skip_timer(&mut self) -> Result<(), GameError> {
        let Stage::Discussion { countdown, .. } = &mut self.stage else {
            return Err(self.illegal("skip the timer"));
        };
        if countdown.skip() == TimerSignal::Complete {
            metrics::record_discussion_skipped();
            self.end_discussion(TransitionReason::TimerSkipped);
        }
        Ok(())
    }

    /// Confirms the self-review is over and hands the device to the
    /// outsider.
    ///
    /// # Errors
    ///
    /// `GameError::IllegalPhaseTransition` outside `SelfReview`.
    pub fn confirm_review(&mut self) -> Result<(), GameError> {
        if self.phase() != Phase::SelfReview {
            return Err(self.illegal("confirm the review"));
        }
        self.transition(TransitionReason::ReviewConfirmed, |stage| match stage {
            Stage::SelfReview { round } => Stage::OutsiderGuess { round },
            other => other,
        });
        Ok(())
    }

    /// Resolves the round on the outsider's guess and enters `Resolved`.
    ///
    /// # Errors
    ///
    /// - `GameError::IllegalPhaseTransition` outside `OutsiderGuess`
    /// - `GameError::UnknownTheme` if `guess` is not in the round's catalog
    pub fn submit_outsider_guess(&mut self, guess: &ThemeId) -> Result<Outcome, GameError> {
        let Stage::OutsiderGuess { round } = &self.stage else {
            return Err(self.illegal("submit a guess"));
        };
        if round.catalog.theme(guess).is_none() {
            return Err(GameError::UnknownTheme { id: guess.clone() });
        }

        let outcome = outcome::resolve(guess, round.assignment.theme());
        info!(
            round = round.number,
            outsider = %round.assignment.outsider(),
            theme = %round.assignment.theme().id,
            guess = %guess,
            outsider_won = outcome.outsider_won,
            "round resolved"
        );
        metrics::record_round_resolved(outcome.outsider_won);

        let resolved = outcome.clone();
        self.transition(TransitionReason::GuessSubmitted, |stage| match stage {
            Stage::OutsiderGuess { round } => Stage::Resolved {
                round,
                outcome: resolved,
            },
            other => other,
        });
        Ok(outcome)
    }

    /// Discards all round state and returns to `Setup`. Always succeeds.
    pub fn restart(&mut self) {
        if let Stage::Discussion { countdown, .. } = &mut self.stage {
            countdown.stop();
        }
        self.transition(TransitionReason::Restarted, |_| Stage::Setup);
    }

    /// Deals a fresh round for the same table and catalog.
    ///
    /// # Errors
    ///
    /// `GameError::IllegalPhaseTransition` outside `Resolved`.
    pub fn play_again(&mut self) -> Result<(), GameError> {
        let Stage::Resolved { round, .. } = &self.stage else {
            return Err(self.illegal("play again"));
        };
        let roster = round.roster.clone();
        let catalog = Arc::clone(&round.catalog);

        let next = self.deal(roster, catalog)?;
        let players = next.roster.len();
        self.restart();
        self.round_number = next.number;
        self.transition(TransitionReason::RoundStarted, |stage| match stage {
            Stage::Setup => Stage::Reveal {
                round: next,
                reveal: RevealSequencer::new(players),
            },
            other => other,
        });
        Ok(())
    }

    // ========================================================================
    // Projections
    // ========================================================================

    /// The active phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.stage.phase()
    }

    /// The current player's turn, with role-gated card contents.
    /// `None` outside `Reveal`.
    #[must_use]
    pub fn current_turn(&self) -> Option<TurnView> {
        let Stage::Reveal { round, reveal } = &self.stage else {
            return None;
        };
        let player = reveal.current_player();
        let card = if !reveal.is_revealed() {
            CardView::FaceDown
        } else {
            match round.assignment.role_of(player) {
                Role::Outsider => CardView::Outsider,
                Role::Regular => CardView::Regular {
                    theme: round.assignment.theme().clone(),
                    context: round.assignment.context_of(player).clone(),
                },
            }
        };
        Some(TurnView {
            player,
            name: round.roster.name(player).to_string(),
            player_count: round.roster.len(),
            card,
        })
    }

    /// Seconds left on the discussion clock.
    ///
    /// `None` before the discussion starts; `Some(0)` once it is over.
    #[must_use]
    pub const fn remaining_seconds(&self) -> Option<u64> {
        match &self.stage {
            Stage::Setup | Stage::Reveal { .. } => None,
            Stage::Discussion { countdown, .. } => Some(countdown.remaining_seconds()),
            Stage::SelfReview { .. } | Stage::OutsiderGuess { .. } | Stage::Resolved { .. } => {
                Some(0)
            }
        }
    }

    /// The decided outcome. `None` until `Resolved`.
    #[must_use]
    pub const fn outcome(&self) -> Option<&Outcome> {
        match &self.stage {
            Stage::Resolved { outcome, .. } => Some(outcome),
            _ => None,
        }
    }

    /// Full reveal of the finished round. `None` until `Resolved`.
    #[must_use]
    pub fn summary(&self) -> Option<RoundSummary> {
        let Stage::Resolved { round, outcome } = &self.stage else {
            return None;
        };
        Some(RoundSummary {
            round: round.number,
            outsider: round.roster.name(round.assignment.outsider()).to_string(),
            theme: round.assignment.theme().clone(),
            outcome: outcome.clone(),
        })
    }

    /// Themes the outsider may choose from. `None` outside `OutsiderGuess`.
    #[must_use]
    pub fn guess_options(&self) -> Option<&[ThemeEntry]> {
        match &self.stage {
            Stage::OutsiderGuess { round } => Some(&round.catalog.themes),
            _ => None,
        }
    }

    /// Number of rounds dealt in this session.
    #[must_use]
    pub const fn round_number(&self) -> u64 {
        self.round_number
    }

    /// Names of the players in the current round, in seat order. Empty in
    /// `Setup`.
    #[must_use]
    pub fn player_names(&self) -> &[String] {
        match self.stage.round() {
            Some(round) => round.roster.names(),
            None => &[],
        }
    }

    /// Catalog of the current round, or the configured one in `Setup`.
    #[must_use]
    pub fn catalog(&self) -> &Arc<Catalog> {
        self.stage
            .round()
            .map_or(&self.config.catalog, |round| &round.catalog)
    }

    /// The session configuration.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Drains the transitions recorded since the last call.
    pub fn take_transitions(&mut self) -> Vec<PhaseTransition> {
        std::mem::take(&mut self.transitions)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn illegal(&self, operation: &'static str) -> GameError {
        GameError::IllegalPhaseTransition {
            operation,
            phase: self.phase(),
        }
    }

    /// Draws the next round without touching the current stage or the
    /// round counter; the caller commits `number` when it enters `Reveal`.
    fn deal(&mut self, roster: Roster, catalog: Arc<Catalog>) -> Result<Round, GameError> {
        let assignment = assignment::create_round(roster.len(), &catalog, &mut self.rng)?;
        let number = self.round_number + 1;
        info!(
            round = number,
            players = roster.len(),
            "round dealt"
        );
        metrics::record_round_started(roster.len());
        Ok(Round {
            number,
            roster,
            catalog,
            assignment,
        })
    }

    fn begin_discussion(&mut self) {
        self.epoch += 1;
        let mut countdown = Countdown::new();
        let signal = countdown.start(
            self.config.discussion_seconds(),
            self.epoch,
            self.scheduler.as_ref(),
        );
        self.transition(TransitionReason::RevealComplete, |stage| match stage {
            Stage::Reveal { round, .. } => Stage::Discussion { round, countdown },
            other => other,
        });
        if signal == TimerSignal::Complete {
            self.end_discussion(TransitionReason::TimerExpired);
        }
    }

    fn end_discussion(&mut self, reason: TransitionReason) {
        self.transition(reason, |stage| match stage {
            Stage::Discussion { round, .. } => Stage::SelfReview { round },
            other => other,
        });
    }

    /// Replaces the stage and records the transition if the phase changed.
    /// The previous stage's records are dropped inside `next`.
    fn transition(&mut self, reason: TransitionReason, next: impl FnOnce(Stage) -> Stage) {
        let from = self.phase();
        let stage = std::mem::replace(&mut self.stage, Stage::Setup);
        self.stage = next(stage);
        let to = self.phase();
        if from == to {
            return;
        }

        info!(%from, %to, ?reason, round = self.round_number, "phase transition");
        metrics::record_phase_transition(from, to);
        self.transitions.push(PhaseTransition {
            round: self.round_number,
            from,
            to,
            reason,
        });
    }
}
