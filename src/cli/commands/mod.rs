//! CLI command dispatch and handlers
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod catalog;
pub mod play;
pub mod version;

use tokio_util::sync::CancellationToken;

use crate::cli::args::{CatalogSubcommand, Cli, Commands};
use crate::error::EmoSpyError;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// `cancel` is fired on the first SIGINT/SIGTERM.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli, cancel: CancellationToken) -> Result<(), EmoSpyError> {
    match cli.command {
        Commands::Play(args) => play::run(&args, cancel).await,
        Commands::Catalog(cmd) => match cmd.subcommand {
            CatalogSubcommand::Validate(args) => catalog::validate(&args),
            CatalogSubcommand::Show(args) => catalog::show(&args),
        },
        Commands::Version(args) => {
            version::run(&args)?;
            Ok(())
        }
    }
}
