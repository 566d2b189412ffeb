//! CLI command dispatch and handlers.
//!
//! Routes parsed CLI arguments to the appropriate command handler.

pub mod completions;
pub mod gateway;
pub mod session;
pub mod version;

use tokio_util::sync::CancellationToken;

use crate::cli::args::{Cli, Commands, GatewaySubcommand, SessionSubcommand};
use crate::error::BreathboxError;

/// Dispatch a parsed CLI invocation to the appropriate command handler.
///
/// The cancellation token is cancelled by the signal handler in `main`;
/// long-running commands use it for graceful shutdown.
///
/// # Errors
///
/// Returns an error if the dispatched command handler fails.
pub async fn dispatch(cli: Cli, cancel: CancellationToken) -> Result<(), BreathboxError> {
    match cli.command {
        Commands::Session(cmd) => match cmd.subcommand {
            SessionSubcommand::Run(args) => session::run(&args, cancel).await,
        },
        Commands::Gateway(cmd) => match cmd.subcommand {
            GatewaySubcommand::Run(args) => gateway::run(&args, cancel).await,
            GatewaySubcommand::Validate(args) => gateway::validate(&args),
        },
        Commands::Completions(args) => {
            completions::run(&args);
            Ok(())
        }
        Commands::Version(args) => {
            version::run(&args);
            Ok(())
        }
    }
}
