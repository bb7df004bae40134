//! Core types for the reordering engine

mod board;
mod ids;
mod item;
mod ordinal;

// Re-export all types
pub use board::{BoardSnapshot, ItemSnapshot, Lane, LaneSnapshot, StoredBoard};
pub use ids::{BoardId, ItemId, LaneId};
pub use item::{ItemKind, Priority, WorkItem};
pub use ordinal::Ordinal;
