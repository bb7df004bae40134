//! Drop target resolution.
//!
//! Turns "released on id X" into a lane and insertion index, computed against
//! the board as it stands before the dragged item is removed.

use crate::board::Board;
use crate::types::{ItemId, LaneId};
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// What the drop point was anchored to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum Anchor {
    /// Insert before this item
    BeforeItem(ItemId),
    /// Released on empty lane space
    EndOfLane,
}

/// Normalized destination of a drop
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropTarget {
    pub lane: LaneId,
    pub index: usize,
    pub anchor: Anchor,
}

/// Why a drop resolved to nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoOpReason {
    /// Released with nothing under the pointer
    NothingUnderPointer,
    /// Released on the dragged item itself
    DroppedOnSelf,
    /// Released on an id that is neither an item nor a lane
    UnknownTarget,
}

impl fmt::Display for NoOpReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoOpReason::NothingUnderPointer => write!(f, "nothing under pointer"),
            NoOpReason::DroppedOnSelf => write!(f, "dropped on itself"),
            NoOpReason::UnknownTarget => write!(f, "not a card or lane"),
        }
    }
}

/// Result of resolving a drop
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DropResolution {
    NoOp(NoOpReason),
    Target(DropTarget),
}

/// Resolve a drag-end event.
///
/// Item ids win over lane ids when both match. A miss is a cancellation,
/// never "append to the source lane".
pub fn resolve_drop(board: &Board, dragged: &ItemId, released_on: Option<&str>) -> DropResolution {
    let Some(released_on) = released_on else {
        return DropResolution::NoOp(NoOpReason::NothingUnderPointer);
    };
    if released_on == dragged.as_str() {
        return DropResolution::NoOp(NoOpReason::DroppedOnSelf);
    }

    let over_item = ItemId::from(released_on);
    if let Some(location) = board.find_item(&over_item) {
        let target = DropTarget {
            lane: location.lane,
            index: location.index,
            anchor: Anchor::BeforeItem(over_item),
        };
        debug!(dragged = %dragged, lane = %target.lane, index = target.index, "drop resolved onto item");
        return DropResolution::Target(target);
    }

    let over_lane = LaneId::from(released_on);
    if let Ok(len) = board.lane_len(&over_lane) {
        debug!(dragged = %dragged, lane = %over_lane, index = len, "drop resolved onto lane");
        return DropResolution::Target(DropTarget {
            lane: over_lane,
            index: len,
            anchor: Anchor::EndOfLane,
        });
    }

    debug!(dragged = %dragged, released_on, "drop target unknown");
    DropResolution::NoOp(NoOpReason::UnknownTarget)
}
