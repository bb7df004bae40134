//! In-memory store with failure injection.
//!
//! Stands in for the remote server in tests and demos. Writes land in the
//! authoritative state only when they succeed, so a reload after a failure
//! returns exactly the last successfully persisted data.

use super::BoardStore;
use crate::error::{ReorderError, Result};
use crate::sync::PositionWrite;
use crate::types::{BoardId, ItemId, LaneId, Ordinal, StoredBoard};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Inner {
    boards: HashMap<BoardId, StoredBoard>,
    fail_next_writes: usize,
    fail_next_reads: usize,
    failing_items: HashSet<ItemId>,
    latency: Option<Duration>,
    writes: Vec<PositionWrite>,
    reads: usize,
}

/// Shared, cloneable in-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding one board
    pub fn with_board(board: StoredBoard) -> Self {
        let mut inner = Inner::default();
        inner.boards.insert(board.id.clone(), board);
        Self {
            inner: Arc::new(Mutex::new(inner)),
        }
    }

    /// Add or replace a board
    pub async fn insert_board(&self, board: StoredBoard) {
        self.inner.lock().await.boards.insert(board.id.clone(), board);
    }

    /// Current authoritative copy of a board
    pub async fn board(&self, id: &BoardId) -> Option<StoredBoard> {
        self.inner.lock().await.boards.get(id).cloned()
    }

    /// Fail the next `n` writes
    pub async fn fail_next_writes(&self, n: usize) {
        self.inner.lock().await.fail_next_writes = n;
    }

    /// Fail the next `n` reads
    pub async fn fail_next_reads(&self, n: usize) {
        self.inner.lock().await.fail_next_reads = n;
    }

    /// Fail every write touching this item until cleared
    pub async fn fail_item(&self, item: impl Into<ItemId>) {
        self.inner.lock().await.failing_items.insert(item.into());
    }

    /// Drop all injected failures
    pub async fn clear_failures(&self) {
        let mut inner = self.inner.lock().await;
        inner.fail_next_writes = 0;
        inner.fail_next_reads = 0;
        inner.failing_items.clear();
    }

    /// Delay every operation by `latency`
    pub async fn set_latency(&self, latency: Option<Duration>) {
        self.inner.lock().await.latency = latency;
    }

    /// Successful writes, in the order they were applied
    pub async fn writes(&self) -> Vec<PositionWrite> {
        self.inner.lock().await.writes.clone()
    }

    /// Forget the write log
    pub async fn clear_writes(&self) {
        self.inner.lock().await.writes.clear();
    }

    /// Number of successful board reads
    pub async fn reads(&self) -> usize {
        self.inner.lock().await.reads
    }

    async fn simulate_latency(&self) {
        let latency = self.inner.lock().await.latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl BoardStore for MemoryStore {
    async fn update_item_position(
        &self,
        item: &ItemId,
        lane: &LaneId,
        rank: &Ordinal,
    ) -> Result<()> {
        self.simulate_latency().await;

        let mut inner = self.inner.lock().await;
        if inner.fail_next_writes > 0 {
            inner.fail_next_writes -= 1;
            return Err(ReorderError::persistence(format!(
                "injected failure writing item '{item}'"
            )));
        }
        if inner.failing_items.contains(item) {
            return Err(ReorderError::persistence(format!(
                "item '{item}' rejected by server"
            )));
        }

        let board = inner
            .boards
            .values_mut()
            .find(|b| b.items.iter().any(|i| &i.id == item))
            .ok_or_else(|| ReorderError::ItemNotFound {
                id: item.to_string(),
            })?;
        if !board.lanes.iter().any(|l| &l.id == lane) {
            return Err(ReorderError::LaneNotFound {
                id: lane.to_string(),
            });
        }
        if let Some(stored) = board.items.iter_mut().find(|i| &i.id == item) {
            stored.lane = lane.clone();
            stored.rank = rank.clone();
            stored.updated_at = Utc::now();
        }

        inner.writes.push(PositionWrite {
            item: item.clone(),
            lane: lane.clone(),
            rank: rank.clone(),
        });
        Ok(())
    }

    async fn read_board(&self, board: &BoardId) -> Result<StoredBoard> {
        self.simulate_latency().await;

        let mut inner = self.inner.lock().await;
        if inner.fail_next_reads > 0 {
            inner.fail_next_reads -= 1;
            return Err(ReorderError::persistence(format!(
                "injected failure reading board '{board}'"
            )));
        }
        let stored = inner
            .boards
            .get(board)
            .cloned()
            .ok_or_else(|| ReorderError::BoardNotFound {
                id: board.to_string(),
            })?;
        inner.reads += 1;
        Ok(stored)
    }
}
