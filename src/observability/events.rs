//! Structured game event stream.
//!
//! Discrete, typed events emitted while a session runs, serialized as
//! newline-delimited JSON (JSONL) with a monotonically increasing sequence
//! number. No event carries a hidden assignment until the round it belongs
//! to is resolved.

use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::schema::ThemeId;
use crate::game::state::{Phase, PhaseTransition, RoundSummary, TransitionReason};
use crate::observability::metrics::winner_label;

// ---------------------------------------------------------------------------
// Event variants
// ---------------------------------------------------------------------------

/// A discrete event emitted during a game session.
///
/// Tagged with `"type"` when serialized so consumers can dispatch on the
/// event kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum Event {
    /// A round was dealt.
    RoundStarted {
        /// When the round started.
        timestamp: DateTime<Utc>,
        /// Round counter within the session.
        round: u64,
        /// Players at the table.
        players: usize,
    },

    /// A new phase has been entered.
    PhaseEntered {
        /// When the transition occurred.
        timestamp: DateTime<Utc>,
        /// Round counter within the session.
        round: u64,
        /// Phase that was left.
        from: Phase,
        /// Phase that was entered.
        phase: Phase,
        /// What triggered the transition.
        reason: TransitionReason,
    },

    /// The discussion countdown was skipped.
    DiscussionSkipped {
        /// When the timer was skipped.
        timestamp: DateTime<Utc>,
        /// Round counter within the session.
        round: u64,
        /// Seconds that were left on the clock.
        remaining_seconds: u64,
    },

    /// The outsider's guess decided the round.
    RoundResolved {
        /// When the round was resolved.
        timestamp: DateTime<Utc>,
        /// Round counter within the session.
        round: u64,
        /// Name of the outsider.
        outsider: String,
        /// The true theme.
        theme: ThemeId,
        /// The outsider's guess.
        guess: ThemeId,
        /// `"outsider"` or `"regulars"`.
        winner: &'static str,
    },

    /// The session has ended.
    SessionEnded {
        /// When the session ended.
        timestamp: DateTime<Utc>,
        /// Rounds dealt during the session.
        rounds: u64,
        /// Why the session ended.
        reason: EndReason,
    },
}

impl Event {
    /// A round was dealt now.
    #[must_use]
    pub fn round_started(round: u64, players: usize) -> Self {
        Self::RoundStarted {
            timestamp: Utc::now(),
            round,
            players,
        }
    }

    /// A transition happened now.
    #[must_use]
    pub fn phase_entered(transition: &PhaseTransition) -> Self {
        Self::PhaseEntered {
            timestamp: Utc::now(),
            round: transition.round,
            from: transition.from,
            phase: transition.to,
            reason: transition.reason,
        }
    }

    /// The timer was skipped now.
    #[must_use]
    pub fn discussion_skipped(round: u64, remaining_seconds: u64) -> Self {
        Self::DiscussionSkipped {
            timestamp: Utc::now(),
            round,
            remaining_seconds,
        }
    }

    /// A round was resolved now.
    #[must_use]
    pub fn round_resolved(summary: &RoundSummary) -> Self {
        Self::RoundResolved {
            timestamp: Utc::now(),
            round: summary.round,
            outsider: summary.outsider.clone(),
            theme: summary.theme.id.clone(),
            guess: summary.outcome.guess.clone(),
            winner: winner_label(summary.outcome.outsider_won),
        }
    }

    /// The session ended now.
    #[must_use]
    pub fn session_ended(rounds: u64, reason: EndReason) -> Self {
        Self::SessionEnded {
            timestamp: Utc::now(),
            rounds,
            reason,
        }
    }
}

/// Why a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// The players chose to quit
    Quit,
    /// The input stream was closed
    InputClosed,
    /// Interrupted by a signal
    Cancelled,
}

impl std::fmt::Display for EndReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Quit => f.write_str("quit"),
            Self::InputClosed => f.write_str("input closed"),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

// ---------------------------------------------------------------------------
// Envelope (adds sequence number via serde flatten)
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct EventEnvelope {
    sequence: u64,
    #[serde(flatten)]
    event: Event,
}

// ---------------------------------------------------------------------------
// Emitter
// ---------------------------------------------------------------------------

/// Thread-safe, buffered JSONL event writer.
///
/// Each call to [`emit`](Self::emit) increments the sequence counter,
/// serializes the event as one JSON line, and flushes. Serialization and
/// I/O failures are dropped; the event stream never interrupts a game.
pub struct EventEmitter {
    writer: Mutex<BufWriter<Box<dyn Write + Send>>>,
    sequence: AtomicU64,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("sequence", &self.sequence.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl EventEmitter {
    /// Creates an emitter that writes to the given writer.
    #[must_use]
    pub fn new(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer: Mutex::new(BufWriter::new(writer)),
            sequence: AtomicU64::new(0),
        }
    }

    /// Creates an emitter that discards every event.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(Box::new(std::io::sink()))
    }

    /// Creates an emitter that writes to a file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be created.
    pub fn from_file(path: &Path) -> std::io::Result<Self> {
        let file = std::fs::File::create(path)?;
        Ok(Self::new(Box::new(file)))
    }

    /// Emits an event as a single JSONL line.
    pub fn emit(&self, event: Event) {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst);
        let envelope = EventEnvelope {
            sequence: seq,
            event,
        };

        if let Ok(mut w) = self.writer.lock()
            && let Ok(line) = serde_json::to_string(&envelope)
        {
            let _ = writeln!(w, "{line}");
            let _ = w.flush();
        }
    }

    /// Number of events emitted so far.
    #[must_use]
    pub fn event_count(&self) -> u64 {
        self.sequence.load(Ordering::Relaxed)
    }
}
