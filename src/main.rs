//! `EmoSpy` - pass-and-play social deduction game

use clap::Parser;
use tokio_util::sync::CancellationToken;

use emospy::cli::args::{Cli, OutputFormat};
use emospy::cli::commands;
use emospy::error::ExitCode;
use emospy::observability::{LogFormat, LogSettings, init_logging};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_logging(&LogSettings {
        format: match cli.log_format {
            OutputFormat::Human => LogFormat::Human,
            OutputFormat::Json => LogFormat::Json,
        },
        verbosity: cli.verbose,
        quiet: cli.quiet,
        color: cli.color,
    });

    let cancel = CancellationToken::new();

    // First signal cancels the session; a second one exits immediately.
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to register SIGTERM handler");

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }

        eprintln!("\nEnding the game... (press Ctrl+C again to force)");
        shutdown.cancel();

        tokio::select! {
            _ = tokio::signal::ctrl_c() => std::process::exit(ExitCode::INTERRUPTED),
            _ = sigterm.recv() => std::process::exit(ExitCode::TERMINATED),
        }
    });

    let result = commands::dispatch(cli, cancel).await;

    match result {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
