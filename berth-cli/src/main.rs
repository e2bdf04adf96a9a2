//! Berth: workspace and provider registry CLI.
//!
//! # Usage
//!
//! ```text
//! berth [--context <name>] [--debug] provider add <name> [--source S] [--option K=V]... [--use]
//! berth provider list [--json]
//! berth provider use <name>
//! berth provider delete <name> [--ignore-not-found]
//! berth provider rename <old-name> <new-name>
//! berth workspace add <name> [--provider P] [--source S]
//! berth workspace list [--json]
//! berth workspace rebind <workspace-name> <new-provider-name>
//! berth workspace delete <name> [--ignore-not-found]
//! ```

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use commands::{provider::ProviderCommand, workspace::WorkspaceCommand};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "berth",
    version,
    about = "Manage development workspaces and the providers that host them",
    long_about = None,
)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Flags accepted by every subcommand.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Operate on this context instead of the configured default.
    #[arg(long, global = true, value_name = "NAME")]
    pub context: Option<String>,

    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage providers in the active context.
    Provider {
        #[command(subcommand)]
        command: ProviderCommand,
    },

    /// Manage workspaces in the active context.
    Workspace {
        #[command(subcommand)]
        command: WorkspaceCommand,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.global.debug);
    match cli.command {
        Commands::Provider { command } => commands::provider::run(command, &cli.global),
        Commands::Workspace { command } => commands::workspace::run(command, &cli.global),
    }
}

/// Logs go to stderr so stdout stays parseable (`--json`).
fn init_tracing(debug: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let fallback = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
