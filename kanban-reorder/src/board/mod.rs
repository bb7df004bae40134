//! Board model: lanes and their ordered items.
//!
//! Pure in-memory state. Lane contents are vectors in display order, so the
//! dense position of an item is simply its index. Ranks ride along on each
//! item and are only rewritten by the synchronizer's planner.

mod moves;

pub use moves::{ItemLocation, MoveOutcome};

use crate::error::{ReorderError, Result};
use crate::types::{
    BoardId, BoardSnapshot, ItemId, ItemSnapshot, Lane, LaneId, LaneSnapshot, Ordinal, StoredBoard,
    WorkItem,
};
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
struct LaneState {
    lane: Lane,
    items: Vec<WorkItem>,
}

/// The in-memory board the engine mutates optimistically
#[derive(Debug, Clone, PartialEq)]
pub struct Board {
    id: BoardId,
    name: String,
    lanes: Vec<LaneState>,
}

impl Board {
    /// Build the model from the store's flat representation.
    ///
    /// Lanes are ordered by `order`, items by `(rank, id)`. Fails if an item
    /// names a lane that does not exist or an id appears twice.
    pub fn from_stored(stored: StoredBoard) -> Result<Self> {
        let mut lane_defs = stored.lanes;
        lane_defs.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));

        let mut seen_lanes = HashSet::new();
        let mut lanes = Vec::with_capacity(lane_defs.len());
        for lane in lane_defs {
            if !seen_lanes.insert(lane.id.clone()) {
                return Err(ReorderError::corrupt(format!("duplicate lane id '{}'", lane.id)));
            }
            lanes.push(LaneState {
                lane,
                items: Vec::new(),
            });
        }

        let mut seen_items = HashSet::new();
        for item in stored.items {
            if !seen_items.insert(item.id.clone()) {
                return Err(ReorderError::DuplicateItem {
                    id: item.id.to_string(),
                });
            }
            let state = lanes
                .iter_mut()
                .find(|s| s.lane.id == item.lane)
                .ok_or_else(|| ReorderError::UnknownLane {
                    item: item.id.to_string(),
                    lane: item.lane.to_string(),
                })?;
            state.items.push(item);
        }

        for state in &mut lanes {
            state
                .items
                .sort_by(|a, b| a.rank.cmp(&b.rank).then_with(|| a.id.cmp(&b.id)));
        }

        Ok(Self {
            id: stored.id,
            name: stored.name,
            lanes,
        })
    }

    /// Flatten back into the store's representation
    pub fn to_stored(&self) -> StoredBoard {
        StoredBoard {
            id: self.id.clone(),
            name: self.name.clone(),
            lanes: self.lanes.iter().map(|s| s.lane.clone()).collect(),
            items: self
                .lanes
                .iter()
                .flat_map(|s| s.items.iter().cloned())
                .collect(),
        }
    }

    pub fn id(&self) -> &BoardId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lane definitions in display order
    pub fn lanes(&self) -> impl Iterator<Item = &Lane> {
        self.lanes.iter().map(|s| &s.lane)
    }

    /// Whether a lane with this id exists
    pub fn has_lane(&self, id: &LaneId) -> bool {
        self.lanes.iter().any(|s| &s.lane.id == id)
    }

    /// Items of a lane in display order
    pub fn lane_items(&self, id: &LaneId) -> Result<&[WorkItem]> {
        self.lane_state(id).map(|s| s.items.as_slice())
    }

    /// Number of items in a lane
    pub fn lane_len(&self, id: &LaneId) -> Result<usize> {
        self.lane_items(id).map(|items| items.len())
    }

    /// Item ids of a lane in display order
    pub fn lane_ids(&self, id: &LaneId) -> Result<Vec<&ItemId>> {
        self.lane_items(id)
            .map(|items| items.iter().map(|i| &i.id).collect())
    }

    /// Dense position of an item within its lane
    pub fn position_of(&self, id: &ItemId) -> Option<usize> {
        self.find_item(id).map(|location| location.index)
    }

    /// Look up an item anywhere on the board
    pub fn item(&self, id: &ItemId) -> Option<&WorkItem> {
        let location = self.find_item(id)?;
        self.lane_state(&location.lane)
            .ok()
            .and_then(|s| s.items.get(location.index))
    }

    /// Total number of items across all lanes
    pub fn item_count(&self) -> usize {
        self.lanes.iter().map(|s| s.items.len()).sum()
    }

    /// Every item id on the board, sorted
    pub fn item_ids(&self) -> Vec<ItemId> {
        let mut ids: Vec<ItemId> = self
            .lanes
            .iter()
            .flat_map(|s| s.items.iter().map(|i| i.id.clone()))
            .collect();
        ids.sort();
        ids
    }

    /// Overwrite the rank of one item. Display order is not touched.
    pub fn set_rank(&mut self, id: &ItemId, rank: Ordinal) -> Result<()> {
        let location = self
            .find_item(id)
            .ok_or_else(|| ReorderError::ItemNotFound { id: id.to_string() })?;
        let state = self.lane_state_mut(&location.lane)?;
        state.items[location.index].rank = rank;
        Ok(())
    }

    /// Check every structural invariant.
    ///
    /// Each id appears exactly once, each item's lane field names the lane
    /// holding it, and every lane exists once.
    pub fn verify(&self) -> Result<()> {
        let mut lanes = HashSet::new();
        let mut items = HashSet::new();
        for state in &self.lanes {
            if !lanes.insert(&state.lane.id) {
                return Err(ReorderError::corrupt(format!(
                    "lane '{}' appears twice",
                    state.lane.id
                )));
            }
            for item in &state.items {
                if !items.insert(&item.id) {
                    return Err(ReorderError::DuplicateItem {
                        id: item.id.to_string(),
                    });
                }
                if item.lane != state.lane.id {
                    return Err(ReorderError::corrupt(format!(
                        "item '{}' is held by lane '{}' but records lane '{}'",
                        item.id, state.lane.id, item.lane
                    )));
                }
            }
        }
        Ok(())
    }

    /// Render model with dense positions
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            lanes: self
                .lanes
                .iter()
                .map(|s| LaneSnapshot {
                    id: s.lane.id.clone(),
                    name: s.lane.name.clone(),
                    items: s
                        .items
                        .iter()
                        .enumerate()
                        .map(|(position, item)| ItemSnapshot {
                            id: item.id.clone(),
                            title: item.title.clone(),
                            position,
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    fn lane_state(&self, id: &LaneId) -> Result<&LaneState> {
        self.lanes
            .iter()
            .find(|s| &s.lane.id == id)
            .ok_or_else(|| ReorderError::LaneNotFound { id: id.to_string() })
    }

    fn lane_state_mut(&mut self, id: &LaneId) -> Result<&mut LaneState> {
        self.lanes
            .iter_mut()
            .find(|s| &s.lane.id == id)
            .ok_or_else(|| ReorderError::LaneNotFound { id: id.to_string() })
    }
}
