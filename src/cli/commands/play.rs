//! `play` command handler
//!
//! Builds the roster and configuration from the command line, wires the
//! countdown's tick scheduler and the event stream into a [`Session`],
//! and runs it over stdin/stdout.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::args::PlayArgs;
use crate::config::defaults::{MAX_PLAYERS, MIN_PLAYERS};
use crate::config::loader::{ConfigLoader, LoaderOptions};
use crate::config::schema::GameConfig;
use crate::error::{EmoSpyError, GameError};
use crate::game::machine::PhaseMachine;
use crate::game::roster::Roster;
use crate::game::ticker::IntervalTicks;
use crate::observability::events::EventEmitter;
use crate::session::{Session, SessionOptions};

/// Play interactive rounds until the table quits.
///
/// # Errors
///
/// Returns a game error for an invalid roster, a config error if the
/// configuration cannot be loaded, or an I/O error from the terminal or
/// the event file.
pub async fn run(args: &PlayArgs, cancel: CancellationToken) -> Result<(), EmoSpyError> {
    let roster = build_roster(args.players, &args.names)?;

    if let Some(port) = args.metrics_port {
        crate::observability::init_metrics(Some(port))?;
        info!(port, "Prometheus metrics endpoint started");
    }

    let config = load_config(args.config.as_deref(), args.discussion)?;
    info!(
        players = roster.len(),
        discussion_secs = config.discussion_seconds(),
        themes = config.catalog.themes.len(),
        contexts = config.catalog.contexts.len(),
        "starting session"
    );

    let events = match &args.events {
        Some(path) => EventEmitter::from_file(path)?,
        None => EventEmitter::noop(),
    };

    let (scheduler, ticks) = IntervalTicks::new();
    let mut machine = PhaseMachine::new(config).with_scheduler(Arc::new(scheduler));
    if let Some(seed) = args.seed {
        machine = machine.with_seed(seed);
    }

    let mut session = Session::new(
        machine,
        roster,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .with_ticks(ticks)
    .with_events(Arc::new(events))
    .with_cancel(cancel)
    .with_options(SessionOptions {
        clear_screen: !args.no_clear,
    });

    let report = session.run().await?;
    info!(
        rounds = report.rounds,
        resolved = report.resolved,
        reason = %report.reason,
        "play finished"
    );
    Ok(())
}

/// Builds the roster from `--players` and `--name`.
///
/// Without `--players` the table is exactly the names given. With it,
/// missing names are filled with placeholders, and more names than
/// players is rejected.
///
/// # Errors
///
/// Returns `GameError::InvalidPlayerCount` for a table outside `3..=6`,
/// or `GameError::MissingPlayerNames` when more names than players are
/// given.
pub fn build_roster(players: Option<usize>, names: &[String]) -> Result<Roster, GameError> {
    let Some(declared) = players else {
        return Roster::new(names);
    };
    if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&declared) || names.len() > declared {
        return Roster::declared(declared, names);
    }
    let mut padded = names.to_vec();
    padded.resize(declared, String::new());
    Roster::declared(declared, &padded)
}

/// Loads the configuration file (or the built-in defaults) and applies
/// the `--discussion` override.
///
/// # Errors
///
/// Returns a config error if loading or validation fails.
pub fn load_config(
    path: Option<&Path>,
    discussion: Option<Duration>,
) -> Result<Arc<GameConfig>, EmoSpyError> {
    let loader = ConfigLoader::new(LoaderOptions::default());
    let result = match path {
        Some(path) => {
            info!(config = %path.display(), "loading configuration");
            loader.load(path)?
        }
        None => loader.finish(GameConfig::default(), "<built-in>")?,
    };

    for warning in &result.warnings {
        warn!(path = %warning.path, "{}", warning.message);
    }

    let Some(discussion) = discussion else {
        return Ok(result.config);
    };
    let mut config = GameConfig::clone(&result.config);
    config.discussion = discussion;
    Ok(Arc::new(config))
}
