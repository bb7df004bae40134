//! Drag session state machine.
//!
//! ```text
//! Idle --start--> Dragging --drop(target)--> Dropped --finish--> Idle
//!                    |  ^                                        ^
//!                  hover|                                        |
//!                    +--+--drop(no-op) / cancel--> Cancelled ----+
//! ```
//!
//! The hovered lane lives inside `Dragging`, so leaving that state drops it.

use crate::error::{ReorderError, Result};
use crate::resolver::{DropResolution, DropTarget, NoOpReason};
use crate::types::{ItemId, LaneId};
use serde::Serialize;

/// Lifecycle of a single drag gesture
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum DragSession {
    #[default]
    Idle,
    Dragging {
        item: ItemId,
        /// Lane under the pointer, for highlighting only
        over: Option<LaneId>,
    },
    Dropped {
        item: ItemId,
        target: DropTarget,
    },
    Cancelled {
        item: ItemId,
        reason: NoOpReason,
    },
}

impl DragSession {
    /// Begin dragging `item`. Only valid from `Idle`.
    pub fn start(&mut self, item: ItemId) -> Result<()> {
        match self {
            Self::Idle => {
                *self = Self::Dragging { item, over: None };
                Ok(())
            }
            other => Err(ReorderError::SessionActive {
                item: other
                    .item()
                    .map(ToString::to_string)
                    .unwrap_or_default(),
            }),
        }
    }

    /// Record the lane currently under the pointer
    pub fn hover(&mut self, lane: Option<LaneId>) -> Result<()> {
        match self {
            Self::Dragging { over, .. } => {
                *over = lane;
                Ok(())
            }
            _ => Err(ReorderError::NoActiveDrag),
        }
    }

    /// Apply a resolved drop. Returns the new state.
    pub fn drop_with(&mut self, resolution: DropResolution) -> Result<&DragSession> {
        let Self::Dragging { item, .. } = self else {
            return Err(ReorderError::NoActiveDrag);
        };
        let item = item.clone();
        *self = match resolution {
            DropResolution::Target(target) => Self::Dropped { item, target },
            DropResolution::NoOp(reason) => Self::Cancelled { item, reason },
        };
        Ok(self)
    }

    /// Abandon the drag (escape key, focus loss)
    pub fn cancel(&mut self) -> Result<()> {
        self.drop_with(DropResolution::NoOp(NoOpReason::NothingUnderPointer))
            .map(|_| ())
    }

    /// Return to `Idle` once the drop has been dispatched
    pub fn finish(&mut self) {
        *self = Self::Idle;
    }

    /// Item being dragged or just dropped
    pub fn item(&self) -> Option<&ItemId> {
        match self {
            Self::Idle => None,
            Self::Dragging { item, .. }
            | Self::Dropped { item, .. }
            | Self::Cancelled { item, .. } => Some(item),
        }
    }

    /// Lane to highlight as a drop target
    pub fn highlighted_lane(&self) -> Option<&LaneId> {
        match self {
            Self::Dragging { over, .. } => over.as_ref(),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
