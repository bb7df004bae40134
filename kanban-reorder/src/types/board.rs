//! Board-level types: Lane, StoredBoard, BoardSnapshot

use super::ids::{BoardId, ItemId, LaneId};
use super::item::WorkItem;
use serde::{Deserialize, Serialize};

/// A lane (kanban column) defines a workflow stage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Lane {
    pub id: LaneId,
    pub name: String,
    pub order: usize,
}

impl Lane {
    /// Create a lane
    pub fn new(id: impl Into<LaneId>, name: impl Into<String>, order: usize) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            order,
        }
    }
}

/// The board as the store keeps it: lane definitions plus a flat item list.
///
/// Item order is carried only by each item's `rank`; the engine derives lane
/// contents from it on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredBoard {
    pub id: BoardId,
    pub name: String,
    pub lanes: Vec<Lane>,
    #[serde(default)]
    pub items: Vec<WorkItem>,
}

/// Render model of a board after a transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardSnapshot {
    pub id: BoardId,
    pub name: String,
    pub lanes: Vec<LaneSnapshot>,
}

/// One lane in a [`BoardSnapshot`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaneSnapshot {
    pub id: LaneId,
    pub name: String,
    pub items: Vec<ItemSnapshot>,
}

/// One card in a [`LaneSnapshot`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemSnapshot {
    pub id: ItemId,
    pub title: String,
    /// Dense position, 0..n-1 within the lane
    pub position: usize,
}

impl BoardSnapshot {
    /// Item ids of one lane, in order
    pub fn lane_ids(&self, lane: &str) -> Option<Vec<&str>> {
        self.lanes
            .iter()
            .find(|l| l.id.as_str() == lane)
            .map(|l| l.items.iter().map(|i| i.id.as_str()).collect())
    }
}
