//! Work item types: WorkItem, Priority, ItemKind

use super::ids::{ItemId, LaneId};
use super::ordinal::Ordinal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Urgency of a work item
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// What sort of work an item tracks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    #[default]
    Task,
    Bug,
    Feature,
    Improvement,
}

/// A card on the board.
///
/// The engine only ever changes `lane` and `rank`. Everything else is payload
/// carried through for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub id: ItemId,
    pub title: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub kind: ItemKind,
    /// Lane membership, written by persistence on cross-lane moves
    pub lane: LaneId,
    /// Sort key within the lane
    pub rank: Ordinal,
    /// Last time a store wrote this item
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl WorkItem {
    /// Create a new item in a lane with the given rank
    pub fn new(title: impl Into<String>, lane: impl Into<LaneId>, rank: Ordinal) -> Self {
        Self {
            id: ItemId::new(),
            title: title.into(),
            description: String::new(),
            priority: Priority::default(),
            kind: ItemKind::default(),
            lane: lane.into(),
            rank,
            updated_at: Utc::now(),
        }
    }

    /// Use a specific id instead of a fresh ULID
    pub fn with_id(mut self, id: impl Into<ItemId>) -> Self {
        self.id = id.into();
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the priority
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Set the kind
    pub fn with_kind(mut self, kind: ItemKind) -> Self {
        self.kind = kind;
        self
    }
}
