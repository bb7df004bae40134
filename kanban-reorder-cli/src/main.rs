//! kanban-reorder CLI - drag cards around a file-backed kanban board.
//!
//! Commands:
//! - `kanban-reorder init [--name N] [--sample]`: Create a board in `--board` (default `.`)
//! - `kanban-reorder show [--json]`: Print lanes and cards
//! - `kanban-reorder drag <item> [--onto <item-or-lane>] [--over <lane>]`: One drag gesture
//! - `kanban-reorder compact <lane>`: Respace a lane's sort keys
//! - `kanban-reorder check`: Verify the board
//!
//! Exit codes:
//! - 0: Success (including a cancelled drag)
//! - 1: Error
//! - 2: Bad usage (clap)

mod cli;
mod commands;
mod table;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing with appropriate level
    let filter = if cli.verbose {
        EnvFilter::new("kanban_reorder=debug,kanban_reorder_cli=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = dispatch_command(cli).await;
    std::process::exit(exit_code);
}

/// Dispatch a parsed CLI to the appropriate command handler.
async fn dispatch_command(cli: Cli) -> i32 {
    let dir = cli.board.as_path();
    let result = match cli.command {
        Commands::Init { name, sample } => commands::init(dir, &name, sample).await,
        Commands::Show { json } => commands::show(dir, json).await,
        Commands::Drag { item, onto, over } => {
            commands::drag(dir, &item, onto.as_deref(), over.as_deref()).await
        }
        Commands::Compact { lane } => commands::compact(dir, &lane).await,
        Commands::Check => commands::check(dir).await,
    };
    result_to_exit(result)
}

/// Convert a `Result<(), E: Display>` to an exit code.
fn result_to_exit<E: std::fmt::Display>(result: Result<(), E>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("Error: {}", e);
            1
        }
    }
}
