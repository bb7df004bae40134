//! Persistence synchronizer.
//!
//! Plans the minimal set of writes for a move, issues them with a bounded
//! wait, and fetches a fresh board when the engine needs to reconcile.

mod plan;

pub use plan::{compact_lane, plan_move, PositionWrite};

use crate::board::{Board, MoveOutcome};
use crate::config::{EngineConfig, WriteMode};
use crate::error::{ReorderError, Result};
use crate::store::BoardStore;
use crate::types::{BoardId, LaneId};
use futures::future::try_join_all;
use std::future::Future;
use tracing::{debug, trace};

/// Writes local moves through to a [`BoardStore`]
pub struct Synchronizer<S> {
    store: S,
    config: EngineConfig,
}

impl<S: BoardStore> Synchronizer<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Assign new ranks on `board` for a move and return the writes needed
    pub fn plan(&self, board: &mut Board, outcome: &MoveOutcome) -> Result<Vec<PositionWrite>> {
        plan_move(board, outcome, &self.config)
    }

    /// Respace a lane's keys and return the writes needed
    pub fn plan_compaction(&self, board: &mut Board, lane: &LaneId) -> Result<Vec<PositionWrite>> {
        compact_lane(board, lane, None)
    }

    /// Issue every write and wait for all of them.
    ///
    /// Sequential mode stops at the first failure; writes already applied stay
    /// applied. Parallel mode fails as soon as any write fails.
    pub async fn persist(&self, writes: &[PositionWrite]) -> Result<()> {
        if writes.is_empty() {
            return Ok(());
        }
        debug!(count = writes.len(), mode = ?self.config.write_mode, "persisting writes");

        match self.config.write_mode {
            WriteMode::Sequential => {
                for write in writes {
                    self.write_one(write).await?;
                }
            }
            WriteMode::Parallel => {
                try_join_all(writes.iter().map(|w| self.write_one(w))).await?;
            }
        }
        Ok(())
    }

    /// Read the authoritative board and rebuild the model from it
    pub async fn fetch(&self, board: &BoardId) -> Result<Board> {
        let stored = self.bounded(self.store.read_board(board)).await?;
        Board::from_stored(stored)
    }

    async fn write_one(&self, write: &PositionWrite) -> Result<()> {
        trace!(item = %write.item, lane = %write.lane, rank = %write.rank, "write");
        self.bounded(
            self.store
                .update_item_position(&write.item, &write.lane, &write.rank),
        )
        .await
    }

    async fn bounded<T>(&self, op: impl Future<Output = Result<T>>) -> Result<T> {
        let limit = self.config.write_timeout();
        match tokio::time::timeout(limit, op).await {
            Ok(result) => result,
            Err(_) => Err(ReorderError::PersistenceTimeout {
                elapsed_ms: limit.as_millis() as u64,
            }),
        }
    }
}
