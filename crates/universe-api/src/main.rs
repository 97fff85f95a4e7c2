//! UniVerse command-line client.
//!
//! Binary name: `uni`
//!
//! Parses CLI arguments, initializes tracing and the session, then dispatches
//! to the appropriate command handler.

mod cli;
mod state;

use clap::Parser;
use clap_complete::generate;
use console::style;

use universe_observe::tracing_setup::{TracingOptions, init_tracing, shutdown_tracing};
use universe_types::error::{AdminError, ChatError, GateError};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let tracing_options = TracingOptions {
        verbosity: cli.verbose,
        quiet: cli.quiet,
        json: cli.json,
        otel: cli.otel,
    };
    if let Err(e) = init_tracing(&tracing_options) {
        eprintln!("Warning: failed to initialize tracing: {e}");
    }

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "uni", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init().await?;
    let result = cli::dispatch(&state, cli.command, cli.json).await;
    shutdown_tracing();

    if let Err(err) = &result {
        if ended_session(err) {
            eprintln!(
                "  {} Your session has ended. Log in again with {}",
                style("!").yellow().bold(),
                style("uni login").yellow()
            );
        }
    }
    result
}

/// Whether `err` comes from a call that tore the session down, directly or
/// through a chat channel that could not authenticate.
fn ended_session(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        if let Some(gate) = cause.downcast_ref::<GateError>() {
            return gate.ends_session();
        }
        if let Some(admin) = cause.downcast_ref::<AdminError>() {
            return admin.ends_session();
        }
        matches!(
            cause.downcast_ref::<ChatError>(),
            Some(ChatError::Gate(gate)) if gate.ends_session()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn gate_errors_that_end_the_session_are_detected() {
        assert!(ended_session(&anyhow::Error::from(GateError::SessionExpired)));
        assert!(ended_session(&anyhow::Error::from(GateError::Unauthorized)));
        let api = GateError::Api {
            status: 500,
            body: String::new(),
        };
        assert!(!ended_session(&anyhow::Error::from(api)));
    }

    #[test]
    fn chat_open_failure_from_expired_session_is_detected() {
        let err = anyhow::Error::from(ChatError::Gate(GateError::SessionExpired));
        assert!(ended_session(&err));
        assert!(!ended_session(&anyhow::Error::from(ChatError::NotConnected)));
    }

    #[test]
    fn admin_call_rejected_by_backend_is_detected() {
        assert!(ended_session(&anyhow::Error::from(AdminError::Gate(GateError::Unauthorized))));
        let denied = AdminError::MissingCapability(universe_types::user::Capability::AccessAdminPanel);
        assert!(!ended_session(&anyhow::Error::from(denied)));
    }

    #[test]
    fn context_wrapping_is_looked_through() {
        let err: anyhow::Result<()> =
            Err(GateError::Unauthorized).context("could not start a conversation with bob");
        assert!(ended_session(&err.unwrap_err()));
    }
}
