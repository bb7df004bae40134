//! Table rendering for board output.

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use kanban_reorder::Board;

/// Create a table with dynamic column widths
pub fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Truncate a string to `max` characters, appending "..." if truncated.
///
/// Safe for multi-byte (UTF-8) strings.
pub fn truncate_str(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let truncated: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", truncated)
    }
}

/// One row per card, grouped by lane in display order
pub fn board_table(board: &Board) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Lane", "#", "Id", "Title", "Rank"]);

    for lane in board.lanes() {
        let items = board.lane_items(&lane.id).unwrap_or_default();
        if items.is_empty() {
            table.add_row(vec![lane.name.clone(), "-".into(), "".into(), "".into(), "".into()]);
            continue;
        }
        for (position, item) in items.iter().enumerate() {
            table.add_row(vec![
                lane.name.clone(),
                position.to_string(),
                item.id.to_string(),
                truncate_str(&item.title, 48),
                item.rank.to_string(),
            ]);
        }
    }
    table
}
