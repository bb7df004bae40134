//! Drag-and-drop reordering engine for kanban boards
//!
//! This crate keeps an in-memory board of lanes and work items, turns raw
//! drag-end events into precise moves, and writes the new order through to a
//! store. The UI is updated optimistically; when a write fails the engine
//! throws its local state away and re-reads the board.
//!
//! ## Overview
//!
//! - **Dense positions, sparse ranks** - items are ordered by their index in
//!   a lane vector; the persisted sort key is a fractional [`Ordinal`]
//! - **One drag at a time** - a [`DragSession`] state machine owns the gesture
//! - **Reconcile by reload** - any persistence failure replaces the local
//!   board with the server's
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use kanban_reorder::{BoardEngine, DropOutcome, EngineConfig, FileStore};
//!
//! # async fn example() -> kanban_reorder::Result<()> {
//! let store = FileStore::new("/path/to/board");
//! let board_id = store.board_id().await?;
//! let mut engine = BoardEngine::load(store, board_id, EngineConfig::default()).await?;
//!
//! engine.start_drag("1")?;
//! engine.hover(Some("done"))?;
//! match engine.drop_on(Some("done")).await? {
//!     DropOutcome::Moved(report) => println!("wrote {} keys", report.writes.len()),
//!     DropOutcome::Cancelled { reason } => println!("cancelled: {reason:?}"),
//!     DropOutcome::Reloaded { cause } => println!("resynced: {cause}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Storage Structure
//!
//! ```text
//! board-dir/
//! ├── board.yaml      # Board id, name and lanes (YAML)
//! ├── items/
//! │   └── {id}.json   # One work item per file, carrying lane and rank
//! └── reorder.toml    # Optional engine configuration
//! ```

pub mod board;
pub mod config;
pub mod defaults;
mod engine;
mod error;
pub mod position;
pub mod resolver;
pub mod session;
pub mod store;
pub mod sync;
pub mod types;

pub use board::{Board, ItemLocation, MoveOutcome};
pub use config::{load_config, EngineConfig, RankStrategy, WriteMode};
pub use engine::{BoardEngine, DropOutcome, EngineEvent, MoveReport};
pub use error::{ErrorClass, ReorderError, Result};
pub use resolver::{resolve_drop, Anchor, DropResolution, DropTarget, NoOpReason};
pub use session::DragSession;
pub use store::{BoardLock, BoardStore, FileStore, MemoryStore};
pub use sync::{PositionWrite, Synchronizer};

// Re-export commonly used types
pub use types::{
    BoardId, BoardSnapshot, ItemId, ItemKind, ItemSnapshot, Lane, LaneId, LaneSnapshot, Ordinal,
    Priority, StoredBoard, WorkItem,
};
