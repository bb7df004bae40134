//! CLI definition for the kanban-reorder command-line interface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Reorder cards on a file-backed kanban board
///
/// Each `drag` is one full gesture: start, optional hover, drop. The move is
/// applied, written to the board directory, and the resulting board printed.
#[derive(Parser, Debug)]
#[command(name = "kanban-reorder")]
#[command(version)]
#[command(about = "Drag-and-drop reordering for file-backed kanban boards")]
pub struct Cli {
    /// Enable debug logging to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Board directory
    #[arg(long, global = true, default_value = ".")]
    pub board: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new board with the default lanes
    Init {
        /// Board name
        #[arg(long, default_value = "Board")]
        name: String,
        /// Add demo cards
        #[arg(long)]
        sample: bool,
    },
    /// Print the board
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Drag a card and drop it
    Drag {
        /// Card to pick up
        item: String,
        /// Card or lane the card is released on; omit to cancel
        #[arg(long)]
        onto: Option<String>,
        /// Lane hovered before the drop
        #[arg(long)]
        over: Option<String>,
    },
    /// Respace the sort keys of one lane
    Compact {
        /// Lane to compact
        lane: String,
    },
    /// Verify board consistency and sort keys
    Check,
}
