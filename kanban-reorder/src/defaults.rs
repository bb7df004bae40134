//! Built-in lanes and demo cards for new boards.

use crate::types::{BoardId, ItemKind, Lane, Ordinal, Priority, StoredBoard, WorkItem};

/// The four workflow lanes every new board starts with
pub fn default_lanes() -> Vec<Lane> {
    vec![
        Lane::new("todo", "To Do", 0),
        Lane::new("in-progress", "In Progress", 1),
        Lane::new("review", "In Review", 2),
        Lane::new("done", "Done", 3),
    ]
}

/// Demo cards spread across the default lanes, ranked densely
pub fn sample_items() -> Vec<WorkItem> {
    let cards: [(&str, &str, &str, ItemKind, Priority); 10] = [
        ("1", "todo", "Optimize experience for mobile web", ItemKind::Improvement, Priority::High),
        ("2", "todo", "Onboard workout options", ItemKind::Feature, Priority::Medium),
        ("3", "todo", "Multi-destination search UI", ItemKind::Feature, Priority::Medium),
        ("6", "todo", "Account settings defaults", ItemKind::Task, Priority::Low),
        ("4", "in-progress", "Fast trip search", ItemKind::Feature, Priority::High),
        ("5", "in-progress", "Affiliate links integration", ItemKind::Task, Priority::Medium),
        ("7", "review", "Revise and streamline booking flow", ItemKind::Improvement, Priority::Medium),
        ("8", "review", "Travel suggestion experiments", ItemKind::Task, Priority::Low),
        ("9", "done", "Fix outage in checkout", ItemKind::Bug, Priority::Urgent),
        ("10", "done", "Store purchasing performance fix", ItemKind::Bug, Priority::High),
    ];

    let mut items = Vec::with_capacity(cards.len());
    let mut lane = "";
    let mut index = 0;
    for (id, card_lane, title, kind, priority) in cards {
        if card_lane != lane {
            lane = card_lane;
            index = 0;
        }
        items.push(
            WorkItem::new(title, card_lane, Ordinal::dense(index))
                .with_id(id)
                .with_kind(kind)
                .with_priority(priority),
        );
        index += 1;
    }
    items
}

/// An empty board with the default lanes
pub fn new_board(id: impl Into<BoardId>, name: impl Into<String>) -> StoredBoard {
    StoredBoard {
        id: id.into(),
        name: name.into(),
        lanes: default_lanes(),
        items: Vec::new(),
    }
}
