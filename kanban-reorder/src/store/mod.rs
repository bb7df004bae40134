//! Persistence collaborator.
//!
//! The engine needs exactly two remote operations: write one item's lane and
//! rank, and read a whole board back. Everything else about storage (CRUD,
//! auth, scoping) belongs to the host application.

mod file;
mod memory;

pub use file::{BoardLock, FileStore};
pub use memory::MemoryStore;

use crate::error::Result;
use crate::types::{BoardId, ItemId, LaneId, Ordinal, StoredBoard};
use async_trait::async_trait;
use std::sync::Arc;

/// Remote store the synchronizer writes through to
#[async_trait]
pub trait BoardStore: Send + Sync {
    /// Persist an item's lane membership and rank
    async fn update_item_position(&self, item: &ItemId, lane: &LaneId, rank: &Ordinal)
        -> Result<()>;

    /// Read the authoritative state of a board
    async fn read_board(&self, board: &BoardId) -> Result<StoredBoard>;
}

#[async_trait]
impl<S: BoardStore + ?Sized> BoardStore for Arc<S> {
    async fn update_item_position(
        &self,
        item: &ItemId,
        lane: &LaneId,
        rank: &Ordinal,
    ) -> Result<()> {
        (**self).update_item_position(item, lane, rank).await
    }

    async fn read_board(&self, board: &BoardId) -> Result<StoredBoard> {
        (**self).read_board(board).await
    }
}
