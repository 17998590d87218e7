//! Game engine
//!
//! One round runs `Setup → Reveal → Discussion → SelfReview →
//! OutsiderGuess → Resolved`, and `restart` returns to `Setup`. The
//! [`PhaseMachine`] is the only entry point that mutates state; the other
//! modules are the pieces it orchestrates.

pub mod assignment;
pub mod countdown;
pub mod machine;
pub mod outcome;
pub mod reveal;
pub mod roster;
pub mod state;
pub mod ticker;

pub use assignment::{RoundAssignment, create_round};
pub use countdown::{Countdown, TimerSignal};
pub use machine::PhaseMachine;
pub use outcome::resolve;
pub use reveal::{RevealSequencer, RevealStep};
pub use roster::Roster;
pub use state::{
    CardView, Outcome, Phase, PhaseTransition, PlayerId, Role, RoundSummary, TransitionReason,
    TurnView, format_clock,
};
pub use ticker::{IntervalTicks, ManualTicks, TICK_PERIOD, Tick, TickScheduler, TickTask};
