//! FileStore - file-backed board storage
//!
//! One board per directory:
//!
//! ```text
//! board-dir/
//! ├── board.yaml        # id, name, lanes
//! ├── items/
//! │   └── {id}.json     # one work item per file
//! └── .lock             # held while a process is mutating the board
//! ```

use super::BoardStore;
use crate::error::{ReorderError, Result};
use crate::types::{BoardId, ItemId, Lane, LaneId, Ordinal, StoredBoard, WorkItem};
use async_trait::async_trait;
use chrono::Utc;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, trace};

/// Board header persisted as `board.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
struct BoardFile {
    id: BoardId,
    name: String,
    lanes: Vec<Lane>,
}

/// Store keeping a board as YAML/JSON files in a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at the given board directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    // =========================================================================
    // Path helpers
    // =========================================================================

    /// Get the board directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path to board.yaml
    pub fn board_path(&self) -> PathBuf {
        self.root.join("board.yaml")
    }

    /// Path to items directory
    pub fn items_dir(&self) -> PathBuf {
        self.root.join("items")
    }

    /// Path to a specific item file
    pub fn item_path(&self, id: &ItemId) -> Result<PathBuf> {
        let raw = id.as_str();
        if raw.is_empty() || raw.contains(['/', '\\']) || raw.starts_with('.') {
            return Err(ReorderError::ItemNotFound { id: raw.to_string() });
        }
        Ok(self.items_dir().join(format!("{raw}.json")))
    }

    /// Path to the lock file
    pub fn lock_path(&self) -> PathBuf {
        self.root.join(".lock")
    }

    /// Check if a board has been written here
    pub fn is_initialized(&self) -> bool {
        self.board_path().exists()
    }

    // =========================================================================
    // Board I/O
    // =========================================================================

    /// Write a new board with its items. Fails if one already exists.
    pub async fn init(&self, board: &StoredBoard) -> Result<()> {
        if self.is_initialized() {
            return Err(ReorderError::AlreadyExists {
                path: self.root.clone(),
            });
        }

        fs::create_dir_all(self.items_dir()).await?;
        let header = BoardFile {
            id: board.id.clone(),
            name: board.name.clone(),
            lanes: board.lanes.clone(),
        };
        atomic_write(&self.board_path(), serde_yaml_ng::to_string(&header)?.as_bytes()).await?;

        for item in &board.items {
            self.write_item(item).await?;
        }
        debug!(path = %self.root.display(), items = board.items.len(), "initialized board");
        Ok(())
    }

    /// Id of the board stored here
    pub async fn board_id(&self) -> Result<BoardId> {
        Ok(self.read_header().await?.id)
    }

    async fn read_header(&self) -> Result<BoardFile> {
        let path = self.board_path();
        if !path.exists() {
            return Err(ReorderError::NotInitialized {
                path: self.root.clone(),
            });
        }
        let content = fs::read_to_string(&path).await?;
        Ok(serde_yaml_ng::from_str(&content)?)
    }

    // =========================================================================
    // Item I/O
    // =========================================================================

    /// Add an item to the board. Its lane must exist.
    pub async fn create_item(&self, item: &WorkItem) -> Result<()> {
        let header = self.read_header().await?;
        if !header.lanes.iter().any(|l| l.id == item.lane) {
            return Err(ReorderError::LaneNotFound {
                id: item.lane.to_string(),
            });
        }
        self.write_item(item).await
    }

    /// Read an item file
    pub async fn read_item(&self, id: &ItemId) -> Result<WorkItem> {
        let path = self.item_path(id)?;
        if !path.exists() {
            return Err(ReorderError::ItemNotFound { id: id.to_string() });
        }
        let content = fs::read_to_string(&path).await?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write an item file (atomic write via temp file)
    pub async fn write_item(&self, item: &WorkItem) -> Result<()> {
        let path = self.item_path(&item.id)?;
        let content = serde_json::to_string_pretty(item)?;
        atomic_write(&path, content.as_bytes()).await
    }

    /// List all item IDs by reading the items directory
    pub async fn list_item_ids(&self) -> Result<Vec<ItemId>> {
        let items_dir = self.items_dir();
        if !items_dir.exists() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::new();
        let mut entries = fs::read_dir(&items_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(ItemId::from_string(stem));
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    // =========================================================================
    // Locking
    // =========================================================================

    /// Try to acquire an exclusive lock (non-blocking)
    pub async fn lock(&self) -> Result<BoardLock> {
        let lock_path = self.lock_path();
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&lock_path)?;

        match file.try_lock_exclusive() {
            Ok(()) => Ok(BoardLock { file }),
            Err(_) => Err(ReorderError::persistence(format!(
                "board at {} is locked by another process",
                self.root.display()
            ))),
        }
    }
}

/// RAII lock guard - releases on drop
pub struct BoardLock {
    file: std::fs::File,
}

impl Drop for BoardLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

#[async_trait]
impl BoardStore for FileStore {
    async fn update_item_position(
        &self,
        item: &ItemId,
        lane: &LaneId,
        rank: &Ordinal,
    ) -> Result<()> {
        let header = self.read_header().await?;
        if !header.lanes.iter().any(|l| &l.id == lane) {
            return Err(ReorderError::LaneNotFound {
                id: lane.to_string(),
            });
        }

        let mut stored = self.read_item(item).await?;
        stored.lane = lane.clone();
        stored.rank = rank.clone();
        stored.updated_at = Utc::now();
        self.write_item(&stored).await?;
        trace!(item = %item, lane = %lane, rank = %rank, "wrote item position");
        Ok(())
    }

    async fn read_board(&self, board: &BoardId) -> Result<StoredBoard> {
        let header = self.read_header().await?;
        if &header.id != board {
            return Err(ReorderError::BoardNotFound {
                id: board.to_string(),
            });
        }

        let ids = self.list_item_ids().await?;
        let mut items = Vec::with_capacity(ids.len());
        for id in ids {
            items.push(self.read_item(&id).await?);
        }

        Ok(StoredBoard {
            id: header.id,
            name: header.name,
            lanes: header.lanes,
            items,
        })
    }
}

/// Atomic write via temp file and rename
async fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content).await?;
    fs::rename(&temp_path, path).await?;

    Ok(())
}
