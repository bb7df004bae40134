//! Command handlers. Each opens the board directory, does one thing, and
//! prints the result to stdout.

use std::path::Path;

use kanban_reorder::{
    defaults::{new_board, sample_items},
    load_config, BoardEngine, BoardId, BoardLock, DropOutcome, FileStore, ReorderError, Result,
};
use tracing::{debug, info};

use crate::table::board_table;

/// Create a board in `dir`
pub async fn init(dir: &Path, name: &str, sample: bool) -> Result<()> {
    let store = FileStore::new(dir);
    let mut board = new_board(BoardId::new(), name);
    if sample {
        board.items = sample_items();
    }
    store.init(&board).await?;
    info!(board = %board.id, path = %dir.display(), "board created");
    println!(
        "Initialized board '{}' ({} lanes, {} cards) in {}",
        board.name,
        board.lanes.len(),
        board.items.len(),
        dir.display()
    );
    Ok(())
}

/// Print the board as a table or JSON
pub async fn show(dir: &Path, json: bool) -> Result<()> {
    let engine = open(dir).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&engine.snapshot())?);
    } else {
        println!("{}", engine.board().name());
        println!("{}", board_table(engine.board()));
    }
    Ok(())
}

/// Run one full drag gesture
pub async fn drag(dir: &Path, item: &str, onto: Option<&str>, over: Option<&str>) -> Result<()> {
    let (_lock, mut engine) = open_locked(dir).await?;

    engine.start_drag(item)?;
    if over.is_some() {
        engine.hover(over)?;
        debug!(lane = ?engine.session().highlighted_lane(), "hovering");
    }

    match engine.drop_on(onto).await? {
        DropOutcome::Moved(report) => {
            let to = &report.outcome.to;
            println!(
                "Moved {} to {} at position {} ({} write{})",
                item,
                to.lane,
                to.index,
                report.writes.len(),
                if report.writes.len() == 1 { "" } else { "s" }
            );
            Ok(())
        }
        DropOutcome::Cancelled { reason } => {
            println!("Cancelled: {}", reason);
            Ok(())
        }
        DropOutcome::Reloaded { cause } => Err(ReorderError::persistence(format!(
            "move not saved, board reloaded: {cause}"
        ))),
    }
}

/// Respace one lane's keys
pub async fn compact(dir: &Path, lane: &str) -> Result<()> {
    let (_lock, mut engine) = open_locked(dir).await?;
    let writes = engine.compact_lane(lane).await?;
    println!("Compacted {}: {} key(s) rewritten", lane, writes.len());
    Ok(())
}

/// Verify the board and report sort key problems
pub async fn check(dir: &Path) -> Result<()> {
    let engine = open(dir).await?;
    let board = engine.board();
    board.verify()?;

    let mut problems = Vec::new();
    for lane in board.lanes() {
        let items = board.lane_items(&lane.id)?;
        for item in items {
            if !item.rank.is_valid() {
                problems.push(format!(
                    "{}: card {} has invalid key '{}'",
                    lane.id, item.id, item.rank
                ));
            }
        }
        for pair in items.windows(2) {
            if pair[0].rank == pair[1].rank {
                problems.push(format!(
                    "{}: cards {} and {} share key '{}'",
                    lane.id, pair[0].id, pair[1].id, pair[0].rank
                ));
            }
        }
    }

    if problems.is_empty() {
        println!(
            "OK: {} cards in {} lanes",
            board.item_count(),
            board.lanes().count()
        );
        return Ok(());
    }
    for problem in &problems {
        println!("{problem}");
    }
    Err(ReorderError::corrupt(format!(
        "{} problem(s) found; run `compact` on the affected lanes",
        problems.len()
    )))
}

async fn open(dir: &Path) -> Result<BoardEngine<FileStore>> {
    let store = FileStore::new(dir);
    let config = load_config(Some(dir))?;
    let board_id = store.board_id().await?;
    BoardEngine::load(store, board_id, config).await
}

/// Open for mutation, holding the board lock until the guard drops
async fn open_locked(dir: &Path) -> Result<(BoardLock, BoardEngine<FileStore>)> {
    let store = FileStore::new(dir);
    if !store.is_initialized() {
        return Err(ReorderError::NotInitialized {
            path: dir.to_path_buf(),
        });
    }
    let lock = store.lock().await?;
    Ok((lock, open(dir).await?))
}
