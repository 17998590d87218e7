//! Interactive pass-and-play session
//!
//! Drives a [`PhaseMachine`] from line-oriented input and the countdown's
//! scheduled ticks, and renders each screen as plain text. One device is
//! passed around the table, so the screen is cleared whenever it changes
//! hands.
//!
//! Commands (one per line):
//!
//! | command | effect |
//! |---|---|
//! | `f`, `flip` | flip the current player's cards |
//! | `n`, `next` | pass the device on / confirm the self-review |
//! | `s`, `skip` | end the discussion early |
//! | `t`, `time` | show the time left |
//! | `g <theme>`, `guess <theme>` | outsider's guess (a theme id or menu number) |
//! | `a`, `again` | deal a new round after the reveal |
//! | `r`, `restart` | abandon the round and deal a new one |
//! | `h`, `help` | list commands |
//! | `q`, `quit` | end the session |
//!
//! During the outsider's guess a bare theme id or menu number is accepted.

use std::fmt::Write as _;
use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::schema::ThemeId;
use crate::error::{EmoSpyError, GameError};
use crate::game::countdown::TimerSignal;
use crate::game::machine::PhaseMachine;
use crate::game::reveal::RevealStep;
use crate::game::roster::Roster;
use crate::game::state::{CardView, Phase, TransitionReason, format_clock};
use crate::game::ticker::Tick;
use crate::observability::events::{EndReason, Event, EventEmitter};

/// ANSI sequence that clears the terminal and homes the cursor.
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// Remaining seconds at or below which every tick is shown.
const FINAL_COUNTDOWN: u64 = 10;

/// Session presentation options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    /// Clear the terminal whenever the device changes hands
    pub clear_screen: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self { clear_screen: true }
    }
}

/// How a session finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionReport {
    /// Rounds dealt
    pub rounds: u64,
    /// Rounds that reached `Resolved`
    pub resolved: u64,
    /// Why the session ended
    pub reason: EndReason,
}

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Flip,
    Next,
    Skip,
    Time,
    Guess(String),
    Again,
    Restart,
    Help,
    Rules,
    Quit,
    Empty,
    Unknown(String),
}

impl Command {
    fn parse(line: &str, phase: Phase) -> Self {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, r)| (w, r.trim()));

        match word.to_ascii_lowercase().as_str() {
            "" => Self::Empty,
            "f" | "flip" => Self::Flip,
            "n" | "next" => Self::Next,
            "s" | "skip" => Self::Skip,
            "t" | "time" => Self::Time,
            "g" | "guess" => Self::Guess(rest.to_string()),
            "a" | "again" => Self::Again,
            "r" | "restart" => Self::Restart,
            "h" | "help" | "?" => Self::Help,
            "rules" => Self::Rules,
            "q" | "quit" | "exit" => Self::Quit,
            _ if phase == Phase::OutsiderGuess => Self::Guess(line.to_string()),
            _ => Self::Unknown(line.to_string()),
        }
    }
}

/// What a command asks of the loop.
enum Flow {
    Redraw,
    Stay,
    Quit,
}

/// One interactive session over a fixed roster.
pub struct Session<R, W> {
    machine: PhaseMachine,
    roster: Roster,
    input: Lines<R>,
    output: W,
    ticks: Option<mpsc::UnboundedReceiver<Tick>>,
    events: Arc<EventEmitter>,
    cancel: CancellationToken,
    options: SessionOptions,
    resolved: u64,
}

impl<R, W> std::fmt::Debug for Session<R, W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("machine", &self.machine)
            .field("roster", &self.roster)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<R, W> Session<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a session for `roster` reading commands from `input`.
    #[must_use]
    pub fn new(machine: PhaseMachine, roster: Roster, input: R, output: W) -> Self {
        Self {
            machine,
            roster,
            input: input.lines(),
            output,
            ticks: None,
            events: Arc::new(EventEmitter::noop()),
            cancel: CancellationToken::new(),
            options: SessionOptions::default(),
            resolved: 0,
        }
    }

    /// Receives scheduled countdown ticks from `ticks`.
    #[must_use]
    pub fn with_ticks(mut self, ticks: mpsc::UnboundedReceiver<Tick>) -> Self {
        self.ticks = Some(ticks);
        self
    }

    /// Emits game events to `events`.
    #[must_use]
    pub fn with_events(mut self, events: Arc<EventEmitter>) -> Self {
        self.events = events;
        self
    }

    /// Ends the session when `cancel` fires.
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Sets presentation options.
    #[must_use]
    pub const fn with_options(mut self, options: SessionOptions) -> Self {
        self.options = options;
        self
    }

    /// The machine being driven.
    #[must_use]
    pub const fn machine(&self) -> &PhaseMachine {
        &self.machine
    }

    /// The output sink.
    #[must_use]
    pub const fn output(&self) -> &W {
        &self.output
    }

    /// Runs rounds until the players quit, the input closes, or the
    /// session is cancelled.
    ///
    /// # Errors
    ///
    /// Returns `EmoSpyError::Game` if the first round cannot be dealt, or
    /// `EmoSpyError::Io` if reading input or writing output fails.
    pub async fn run(&mut self) -> Result<SessionReport, EmoSpyError> {
        let catalog = Arc::clone(&self.machine.config().catalog);
        self.machine.start_roster(self.roster.clone(), catalog)?;
        self.publish_transitions();
        self.render().await?;

        let reason = loop {
            tokio::select! {
                biased;

                () = self.cancel.cancelled() => {
                    info!("session cancelled");
                    break EndReason::Cancelled;
                }

                Some(tick) = recv_tick(self.ticks.as_mut()) => {
                    self.on_tick(tick).await?;
                }

                line = self.input.next_line() => {
                    let Some(line) = line? else {
                        debug!("input closed");
                        break EndReason::InputClosed;
                    };
                    match self.on_line(&line).await? {
                        Flow::Quit => break EndReason::Quit,
                        Flow::Redraw => {
                            self.publish_transitions();
                            self.render().await?;
                        }
                        Flow::Stay => self.publish_transitions(),
                    }
                }
            }
        };

        // Leaving the loop tears down any running countdown.
        self.machine.restart();
        self.machine.take_transitions();

        let report = SessionReport {
            rounds: self.machine.round_number(),
            resolved: self.resolved,
            reason,
        };
        self.events
            .emit(Event::session_ended(report.rounds, report.reason));
        info!(rounds = report.rounds, reason = %report.reason, "session ended");
        self.write(&format!("\nThanks for playing! ({reason})\n"))
            .await?;
        Ok(report)
    }

    async fn on_tick(&mut self, tick: Tick) -> Result<(), EmoSpyError> {
        match self.machine.handle_scheduled_tick(tick) {
            TimerSignal::Complete => {
                self.publish_transitions();
                self.write("\nTime's up!\n").await?;
                self.render().await
            }
            TimerSignal::Pending => {
                if let Some(remaining) = self.machine.remaining_seconds()
                    && self.machine.phase() == Phase::Discussion
                    && (remaining % 60 == 0 || remaining <= FINAL_COUNTDOWN)
                {
                    self.write(&format!("Time left: {}\n", format_clock(remaining)))
                        .await?;
                }
                Ok(())
            }
        }
    }

    async fn on_line(&mut self, line: &str) -> Result<Flow, EmoSpyError> {
        let command = Command::parse(line, self.machine.phase());
        debug!(?command, phase = %self.machine.phase(), "command");

        let result = match command {
            Command::Empty => return Ok(Flow::Stay),
            Command::Quit => return Ok(Flow::Quit),
            Command::Help => {
                self.write(HELP).await?;
                return Ok(Flow::Stay);
            }
            Command::Rules => {
                let text = rules(self.machine.config().discussion_seconds());
                self.write(&text).await?;
                return Ok(Flow::Stay);
            }
            Command::Time => {
                let text = self.machine.remaining_seconds().map_or_else(
                    || "The discussion has not started yet.\n".to_string(),
                    |secs| format!("Time left: {}\n", format_clock(secs)),
                );
                self.write(&text).await?;
                return Ok(Flow::Stay);
            }
            Command::Unknown(text) => {
                self.write(&format!("Unknown command '{text}'. Type 'h' for help.\n"))
                    .await?;
                return Ok(Flow::Stay);
            }
            Command::Flip => self.machine.toggle_current_reveal().map(|_| ()),
            Command::Next => self.next(),
            Command::Skip => self.skip(),
            Command::Guess(guess) => self.guess(&guess),
            Command::Again => self.machine.play_again(),
            Command::Restart => {
                self.machine.restart();
                let catalog = Arc::clone(&self.machine.config().catalog);
                self.machine.start_roster(self.roster.clone(), catalog)
            }
        };

        match result {
            Ok(()) => Ok(Flow::Redraw),
            Err(e) => {
                warn!(error = %e, "intent rejected");
                self.write(&format!("{e}\n")).await?;
                Ok(Flow::Stay)
            }
        }
    }

    fn next(&mut self) -> Result<(), GameError> {
        if self.machine.phase() == Phase::SelfReview {
            return self.machine.confirm_review();
        }
        match self.machine.advance_turn()? {
            RevealStep::Next(player) => debug!(player = player.index(), "device passed"),
            RevealStep::Complete => debug!("reveal complete"),
        }
        Ok(())
    }

    fn skip(&mut self) -> Result<(), GameError> {
        let remaining = self.machine.remaining_seconds();
        self.machine.skip_timer()?;
        self.events.emit(Event::discussion_skipped(
            self.machine.round_number(),
            remaining.unwrap_or_default(),
        ));
        Ok(())
    }

    fn guess(&mut self, raw: &str) -> Result<(), GameError> {
        let raw = raw.trim();
        // Menu numbers are 1-based.
        let id = raw
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| self.machine.guess_options()?.get(i))
            .map_or_else(|| ThemeId::new(raw), |entry| entry.id.clone());
        self.machine.submit_outsider_guess(&id)?;
        self.resolved += 1;
        Ok(())
    }

    /// Emits an event for every transition since the last call.
    fn publish_transitions(&mut self) {
        for transition in self.machine.take_transitions() {
            if transition.reason == TransitionReason::RoundStarted {
                self.events
                    .emit(Event::round_started(transition.round, self.roster.len()));
            }
            self.events.emit(Event::phase_entered(&transition));
            if transition.to == Phase::Resolved
                && let Some(summary) = self.machine.summary()
            {
                self.events.emit(Event::round_resolved(&summary));
            }
        }
    }

    async fn render(&mut self) -> Result<(), EmoSpyError> {
        let screen = self.screen();
        let mut text = String::new();
        if self.options.clear_screen {
            text.push_str(CLEAR_SCREEN);
        }
        text.push_str(&screen);
        self.write(&text).await
    }

    fn screen(&self) -> String {
        let mut out = String::new();
        let catalog = self.machine.catalog();
        match self.machine.phase() {
            Phase::Setup => {
                let _ = writeln!(out, "Setting up...");
            }
            Phase::Reveal => {
                if let Some(turn) = self.machine.current_turn() {
                    let _ = writeln!(
                        out,
                        "Round {}: player {} of {}: {}",
                        self.machine.round_number(),
                        turn.player.index() + 1,
                        turn.player_count,
                        turn.name
                    );
                    match turn.card {
                        CardView::FaceDown => {
                            let _ = writeln!(
                                out,
                                "Pass the device to {}. Type 'f' to flip your cards in private.",
                                turn.name
                            );
                        }
                        CardView::Outsider => {
                            let _ = writeln!(out, "You are the OUTSIDER.");
                            let _ = writeln!(
                                out,
                                "Listen closely and work out which emotion the others share."
                            );
                        }
                        CardView::Regular { theme, context } => {
                            let _ = writeln!(out, "Emotion:   {}", theme.label());
                            let _ = writeln!(out, "Situation: {}", context.label());
                        }
                    }
                    let _ = writeln!(out, "Type 'n' when you are done.");
                }
            }
            Phase::Discussion => {
                let remaining = self.machine.remaining_seconds().unwrap_or_default();
                let _ = writeln!(out, "Discussion: {} on the clock.", format_clock(remaining));
                if !catalog.prompts.is_empty() {
                    let _ = writeln!(out, "Ask each other:");
                    for prompt in &catalog.prompts {
                        let _ = writeln!(out, "  - {prompt}");
                    }
                }
                let _ = writeln!(out, "Type 's' to skip the timer, 't' for the time left.");
            }
            Phase::SelfReview => {
                let _ = writeln!(out, "Self-review: in turn, each player finishes the sentence:");
                if let Some(review) = &catalog.review_prompt {
                    let _ = writeln!(out, "  \"{review}\"");
                }
                let _ = writeln!(out, "Type 'n' when everyone has had a turn.");
            }
            Phase::OutsiderGuess => {
                let _ = writeln!(out, "Outsider, which emotion did the others share?");
                for (i, theme) in self.machine.guess_options().unwrap_or_default().iter().enumerate() {
                    let _ = writeln!(out, "  {}) {} [{}]", i + 1, theme.label(), theme.id);
                }
                let _ = writeln!(out, "Type the number or the id of your guess.");
            }
            Phase::Resolved => {
                if let Some(summary) = self.machine.summary() {
                    let guessed = catalog
                        .theme(&summary.outcome.guess)
                        .map_or_else(|| summary.outcome.guess.to_string(), |t| t.label().to_string());
                    let _ = writeln!(out, "The outsider was {}.", summary.outsider);
                    let _ = writeln!(out, "The emotion was {}.", summary.theme.label());
                    let _ = writeln!(out, "{} guessed {}.", summary.outsider, guessed);
                    if summary.outcome.outsider_won {
                        let _ = writeln!(out, "The outsider wins!");
                    } else {
                        let _ = writeln!(out, "The regular players win!");
                    }
                }
                let _ = writeln!(out, "Type 'a' to play again or 'q' to quit.");
            }
        }
        out
    }

    async fn write(&mut self, text: &str) -> Result<(), EmoSpyError> {
        self.output.write_all(text.as_bytes()).await?;
        self.output.flush().await?;
        Ok(())
    }
}

async fn recv_tick(ticks: Option<&mut mpsc::UnboundedReceiver<Tick>>) -> Option<Tick> {
    match ticks {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}

const HELP: &str = "\
Commands:
  f, flip          flip your cards
  n, next          pass the device on / finish the self-review
  s, skip          end the discussion early
  t, time          show the time left
  g, guess <id>    outsider's guess (id or menu number)
  a, again         play another round
  r, restart       abandon this round and deal a new one
  rules            how the game is played
  q, quit          end the session
";

/// How to play, with the configured discussion length.
fn rules(discussion_seconds: u64) -> String {
    format!(
        "\
How to play
  Players: 3 to 6. One of you is secretly the OUTSIDER; everyone else
  shares the same emotion, each with a different situation.

  Dealing: pass the device around. Flip your cards in private, remember
  them, then pass on. The outsider sees neither emotion nor situation.

  Discussion ({clock}): take turns asking each other questions, such as
  \"Have you been in that situation?\" or \"Did it happen recently?\".
  Never name the emotion or the situation outright. The outsider has to
  blend in and pick up hints from the answers.

  Self-review: in turn, each player explains how they would deal with
  their emotion in their situation.

  Guess: the outsider names the emotion. A correct guess wins the round
  for the outsider; a wrong one wins it for everyone else.
",
        clock = format_clock(discussion_seconds)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_forms() {
        assert_eq!(Command::parse("f", Phase::Reveal), Command::Flip);
        assert_eq!(Command::parse("  NEXT ", Phase::Reveal), Command::Next);
        assert_eq!(Command::parse("skip", Phase::Discussion), Command::Skip);
        assert_eq!(Command::parse("", Phase::Reveal), Command::Empty);
        assert_eq!(Command::parse("q", Phase::Resolved), Command::Quit);
    }

    #[test]
    fn rules_is_its_own_command() {
        assert_eq!(Command::parse("rules", Phase::Reveal), Command::Rules);
        assert_eq!(Command::parse("RULES", Phase::Discussion), Command::Rules);
        assert_eq!(Command::parse("r", Phase::Reveal), Command::Restart);
    }

    #[test]
    fn rules_show_configured_discussion() {
        let text = rules(420);
        assert!(text.starts_with("How to play"));
        assert!(text.contains("Discussion (7:00)"));
        assert!(rules(90).contains("Discussion (1:30)"));
    }

    #[test]
    fn guess_takes_argument() {
        assert_eq!(
            Command::parse("guess worried", Phase::OutsiderGuess),
            Command::Guess("worried".to_string())
        );
        assert_eq!(
            Command::parse("g 3", Phase::Discussion),
            Command::Guess("3".to_string())
        );
    }

    #[test]
    fn bare_words_are_guesses_only_when_guessing() {
        assert_eq!(
            Command::parse("jealous", Phase::OutsiderGuess),
            Command::Guess("jealous".to_string())
        );
        assert_eq!(
            Command::parse("jealous", Phase::Discussion),
            Command::Unknown("jealous".to_string())
        );
    }
}
