//! Move operations on the board model

use super::Board;
use crate::error::{ReorderError, Result};
use crate::position;
use crate::types::{ItemId, LaneId};
use serde::Serialize;

/// Where an item sits: lane plus dense index
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemLocation {
    pub lane: LaneId,
    pub index: usize,
}

/// The effect of a completed move, consumed by the synchronizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveOutcome {
    pub item: ItemId,
    pub from: ItemLocation,
    pub to: ItemLocation,
}

impl MoveOutcome {
    /// Nothing moved
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }

    /// The item changed lanes
    pub fn crossed_lanes(&self) -> bool {
        self.from.lane != self.to.lane
    }
}

impl Board {
    /// Locate an item by linear scan across lanes
    pub fn find_item(&self, id: &ItemId) -> Option<ItemLocation> {
        self.lanes.iter().find_map(|s| {
            position::index_of(&s.items, id).map(|index| ItemLocation {
                lane: s.lane.id.clone(),
                index,
            })
        })
    }

    /// Move the item at `from` to `to` within one lane.
    ///
    /// `to` is interpreted after removal, so in `[A, B, C]` moving 0 to 2
    /// yields `[B, C, A]`. Both indices must be inside the lane.
    pub fn move_within_lane(&mut self, lane: &LaneId, from: usize, to: usize) -> Result<MoveOutcome> {
        let state = self.lane_state_mut(lane)?;
        let len = state.items.len();
        for index in [from, to] {
            if index >= len {
                return Err(ReorderError::IndexOutOfRange {
                    lane: lane.to_string(),
                    index,
                    len,
                });
            }
        }

        let item = state.items.remove(from);
        let id = item.id.clone();
        state.items.insert(to, item);

        Ok(MoveOutcome {
            item: id,
            from: ItemLocation {
                lane: lane.clone(),
                index: from,
            },
            to: ItemLocation {
                lane: lane.clone(),
                index: to,
            },
        })
    }

    /// Transfer an item into another lane at `to_index`, clamped to the
    /// destination length. Rewrites the item's lane membership.
    pub fn move_across_lanes(
        &mut self,
        item: &ItemId,
        from_lane: &LaneId,
        to_lane: &LaneId,
        to_index: usize,
    ) -> Result<MoveOutcome> {
        // Validate both lanes before touching either.
        self.lane_state(from_lane)?;
        self.lane_state(to_lane)?;

        let source = self.lane_state_mut(from_lane)?;
        let (mut moved, from_index) =
            position::remove_from(&mut source.items, item).ok_or_else(|| {
                ReorderError::ItemNotInLane {
                    item: item.to_string(),
                    lane: from_lane.to_string(),
                }
            })?;
        moved.lane = to_lane.clone();

        let dest = self.lane_state_mut(to_lane)?;
        let clamped = to_index.min(dest.items.len());
        let landed = position::insert_at(&mut dest.items, clamped as isize, moved)?;

        Ok(MoveOutcome {
            item: item.clone(),
            from: ItemLocation {
                lane: from_lane.clone(),
                index: from_index,
            },
            to: ItemLocation {
                lane: to_lane.clone(),
                index: landed,
            },
        })
    }
}
