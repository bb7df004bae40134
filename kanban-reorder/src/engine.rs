//! BoardEngine - the drag-and-drop facade the UI talks to.
//!
//! Gesture events come in (`start_drag`, `hover`, `drop_on`), the board is
//! mutated optimistically, the move is written through, and any failure is
//! answered by replacing the local board with a fresh read.

use crate::board::{Board, ItemLocation, MoveOutcome};
use crate::config::EngineConfig;
use crate::error::{ReorderError, Result};
use crate::resolver::{resolve_drop, DropResolution, DropTarget, NoOpReason};
use crate::session::DragSession;
use crate::store::BoardStore;
use crate::sync::{PositionWrite, Synchronizer};
use crate::types::{BoardId, BoardSnapshot, ItemId, LaneId};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument, warn};

const EVENT_CAPACITY: usize = 64;

/// Notifications for the UI layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EngineEvent {
    DragStarted { item: ItemId },
    Moved { item: ItemId, to: ItemLocation },
    Cancelled { item: ItemId, reason: NoOpReason },
    /// Local state is being discarded; show a syncing indicator
    ReloadStarted { reason: String },
    Reloaded,
    ReloadFailed { reason: String },
}

/// A move that was applied and persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveReport {
    pub outcome: MoveOutcome,
    pub writes: Vec<PositionWrite>,
}

/// What a drop ended up doing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum DropOutcome {
    /// No valid target; nothing changed, nothing written
    Cancelled { reason: NoOpReason },
    Moved(MoveReport),
    /// The move could not be completed and the board was re-read
    Reloaded { cause: String },
}

/// One board, one drag at a time
pub struct BoardEngine<S> {
    board_id: BoardId,
    board: Board,
    session: DragSession,
    sync: Synchronizer<S>,
    events: broadcast::Sender<EngineEvent>,
    stale: bool,
}

impl<S: BoardStore> BoardEngine<S> {
    /// Read a board from the store and start an engine on it
    #[instrument(skip(store, config), fields(board = %board_id))]
    pub async fn load(store: S, board_id: BoardId, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let sync = Synchronizer::new(store, config);
        let board = sync.fetch(&board_id).await?;
        board.verify()?;
        info!(items = board.item_count(), "board loaded");
        Ok(Self::assemble(board_id, board, sync))
    }

    /// Start an engine on a board the caller already holds
    pub fn with_board(board: Board, store: S, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        board.verify()?;
        let board_id = board.id().clone();
        Ok(Self::assemble(board_id, board, Synchronizer::new(store, config)))
    }

    fn assemble(board_id: BoardId, board: Board, sync: Synchronizer<S>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            board_id,
            board,
            session: DragSession::Idle,
            sync,
            events,
            stale: false,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Render model of the current board
    pub fn snapshot(&self) -> BoardSnapshot {
        self.board.snapshot()
    }

    /// Current drag state, for drop-target highlighting
    pub fn session(&self) -> &DragSession {
        &self.session
    }

    /// Subscribe to engine notifications
    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    /// The last reload failed and the local board is not trustworthy
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn store(&self) -> &S {
        self.sync.store()
    }

    pub fn config(&self) -> &EngineConfig {
        self.sync.config()
    }

    // =========================================================================
    // Gestures
    // =========================================================================

    /// Begin dragging an item
    pub fn start_drag(&mut self, item: &str) -> Result<()> {
        if self.stale {
            return Err(ReorderError::StaleBoard);
        }
        let item = ItemId::from(item);
        if self.board.find_item(&item).is_none() {
            return Err(ReorderError::ItemNotFound {
                id: item.to_string(),
            });
        }
        self.session.start(item.clone())?;
        debug!(item = %item, "drag started");
        self.emit(EngineEvent::DragStarted { item });
        Ok(())
    }

    /// Report the lane under the pointer. Unknown lanes clear the highlight.
    pub fn hover(&mut self, lane: Option<&str>) -> Result<()> {
        let lane = lane
            .map(LaneId::from)
            .filter(|l| self.board.has_lane(l));
        self.session.hover(lane)
    }

    /// Abandon the current drag without moving anything
    pub fn cancel_drag(&mut self) -> Result<()> {
        self.session.cancel()?;
        self.finish_cancelled();
        Ok(())
    }

    /// Release the dragged item on `released_on` (an item id, a lane id, or
    /// nothing). Returns once every write has completed or the board has been
    /// reloaded; the session is back to `Idle` either way.
    #[instrument(skip(self), fields(board = %self.board_id))]
    pub async fn drop_on(&mut self, released_on: Option<&str>) -> Result<DropOutcome> {
        let item = match &self.session {
            DragSession::Dragging { item, .. } => item.clone(),
            _ => return Err(ReorderError::NoActiveDrag),
        };

        let resolution = resolve_drop(&self.board, &item, released_on);
        self.session.drop_with(resolution.clone())?;
        let target = match resolution {
            DropResolution::Target(target) => target,
            DropResolution::NoOp(reason) => {
                self.finish_cancelled();
                return Ok(DropOutcome::Cancelled { reason });
            }
        };

        let result = self.dispatch(&item, &target).await;
        self.session.finish();
        result
    }

    /// Respace the keys of one lane and write them through
    #[instrument(skip(self), fields(board = %self.board_id))]
    pub async fn compact_lane(&mut self, lane: &str) -> Result<Vec<PositionWrite>> {
        if self.stale {
            return Err(ReorderError::StaleBoard);
        }
        if let Some(item) = self.session.item() {
            return Err(ReorderError::SessionActive {
                item: item.to_string(),
            });
        }

        let lane = LaneId::from(lane);
        let writes = self.sync.plan_compaction(&mut self.board, &lane)?;
        if let Err(e) = self.sync.persist(&writes).await {
            warn!(lane = %lane, error = %e, "compaction write failed");
            self.reload_because(&e.to_string()).await?;
            return Err(e);
        }
        info!(lane = %lane, writes = writes.len(), "lane compacted");
        Ok(writes)
    }

    /// Discard the local board and read it again from the store
    pub async fn reload(&mut self) -> Result<()> {
        self.reload_because("requested").await
    }

    // =========================================================================
    // Internals
    // =========================================================================

    async fn dispatch(&mut self, item: &ItemId, target: &DropTarget) -> Result<DropOutcome> {
        let outcome = match self.apply_move(item, target) {
            Ok(outcome) => outcome,
            Err(e) if e.requires_reload() => return self.recover(e).await,
            Err(e) => {
                error!(item = %item, error = %e, "move rejected by board model");
                return Err(e);
            }
        };
        debug_assert!(self.board.verify().is_ok());

        let writes = match self.sync.plan(&mut self.board, &outcome) {
            Ok(writes) => writes,
            Err(e) => return self.recover(e).await,
        };

        if let Err(e) = self.sync.persist(&writes).await {
            warn!(item = %item, error = %e, "persisting move failed");
            return self.recover(e).await;
        }

        info!(
            item = %item,
            lane = %outcome.to.lane,
            index = outcome.to.index,
            writes = writes.len(),
            "move persisted"
        );
        self.emit(EngineEvent::Moved {
            item: item.clone(),
            to: outcome.to.clone(),
        });
        Ok(DropOutcome::Moved(MoveReport { outcome, writes }))
    }

    fn apply_move(&mut self, item: &ItemId, target: &DropTarget) -> Result<MoveOutcome> {
        let from = self
            .board
            .find_item(item)
            .ok_or_else(|| ReorderError::ItemNotFound {
                id: item.to_string(),
            })?;

        if from.lane == target.lane {
            // Dropping on the item's own lane means "move to the end".
            let last = self.board.lane_len(&target.lane)?.saturating_sub(1);
            self.board
                .move_within_lane(&target.lane, from.index, target.index.min(last))
        } else {
            self.board
                .move_across_lanes(item, &from.lane, &target.lane, target.index)
        }
    }

    async fn recover(&mut self, cause: ReorderError) -> Result<DropOutcome> {
        let cause = cause.to_string();
        self.reload_because(&cause).await?;
        Ok(DropOutcome::Reloaded { cause })
    }

    async fn reload_because(&mut self, reason: &str) -> Result<()> {
        warn!(board = %self.board_id, reason, "reloading board");
        self.emit(EngineEvent::ReloadStarted {
            reason: reason.to_string(),
        });

        match self.sync.fetch(&self.board_id).await {
            Ok(board) => {
                self.board = board;
                self.stale = false;
                info!(board = %self.board_id, items = self.board.item_count(), "board reloaded");
                self.emit(EngineEvent::Reloaded);
                Ok(())
            }
            Err(e) => {
                self.stale = true;
                error!(board = %self.board_id, error = %e, "reload failed");
                self.emit(EngineEvent::ReloadFailed {
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Leave `Cancelled` for `Idle`, announcing the cancellation
    fn finish_cancelled(&mut self) {
        let DragSession::Cancelled { item, reason } = std::mem::take(&mut self.session) else {
            return;
        };
        debug!(item = %item, ?reason, "drag cancelled");
        self.emit(EngineEvent::Cancelled { item, reason });
    }

    fn emit(&self, event: EngineEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::defaults::{new_board, sample_items};
    use crate::store::MemoryStore;

    async fn engine() -> BoardEngine<MemoryStore> {
        let mut board = new_board("demo", "Demo");
        board.items = sample_items();
        BoardEngine::load(MemoryStore::with_board(board), "demo".into(), EngineConfig::default())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_drop_on_item_moves_and_persists() {
        let mut engine = engine().await;
        engine.start_drag("1").unwrap();
        let outcome = engine.drop_on(Some("5")).await.unwrap();

        let DropOutcome::Moved(report) = outcome else {
            panic!("expected move");
        };
        assert_eq!(report.outcome.to.lane.as_str(), "in-progress");
        assert_eq!(report.outcome.to.index, 1);
        assert_eq!(report.writes.len(), 1);
        assert!(engine.session().is_idle());

        let snap = engine.snapshot();
        assert_eq!(snap.lane_ids("in-progress").unwrap(), vec!["4", "1", "5"]);
        assert_eq!(snap.lane_ids("todo").unwrap(), vec!["2", "3", "6"]);

        let server = engine.store().board(&"demo".into()).await.unwrap();
        let reread = Board::from_stored(server).unwrap().snapshot();
        assert_eq!(reread, snap);
    }

    #[tokio::test]
    async fn test_drop_on_own_lane_moves_to_end() {
        let mut engine = engine().await;
        engine.start_drag("2").unwrap();
        engine.drop_on(Some("todo")).await.unwrap();
        assert_eq!(
            engine.snapshot().lane_ids("todo").unwrap(),
            vec!["1", "3", "6", "2"]
        );
    }

    #[tokio::test]
    async fn test_cancelled_drop_writes_nothing() {
        let mut engine = engine().await;
        let before = engine.snapshot();
        let mut events = engine.subscribe();

        engine.start_drag("1").unwrap();
        let outcome = engine.drop_on(Some("nowhere")).await.unwrap();
        assert_eq!(
            outcome,
            DropOutcome::Cancelled {
                reason: NoOpReason::UnknownTarget
            }
        );
        assert_eq!(engine.snapshot(), before);
        assert!(engine.store().writes().await.is_empty());
        assert!(engine.session().is_idle());

        assert!(matches!(events.recv().await.unwrap(), EngineEvent::DragStarted { .. }));
        assert!(matches!(events.recv().await.unwrap(), EngineEvent::Cancelled { .. }));
    }

    #[tokio::test]
    async fn test_cancel_drag() {
        let mut engine = engine().await;
        engine.start_drag("1").unwrap();
        engine.hover(Some("done")).unwrap();
        assert_eq!(engine.session().highlighted_lane().unwrap().as_str(), "done");
        engine.cancel_drag().unwrap();
        assert!(engine.session().is_idle());
        assert!(engine.cancel_drag().is_err());
    }

    #[tokio::test]
    async fn test_hover_unknown_lane_clears_highlight() {
        let mut engine = engine().await;
        engine.start_drag("1").unwrap();
        engine.hover(Some("done")).unwrap();
        engine.hover(Some("sidebar")).unwrap();
        assert!(engine.session().highlighted_lane().is_none());
    }

    #[tokio::test]
    async fn test_start_drag_validation() {
        let mut engine = engine().await;
        assert!(matches!(
            engine.start_drag("missing"),
            Err(ReorderError::ItemNotFound { .. })
        ));
        engine.start_drag("1").unwrap();
        assert!(matches!(
            engine.start_drag("2"),
            Err(ReorderError::SessionActive { .. })
        ));
    }

    #[tokio::test]
    async fn test_drop_without_drag() {
        let mut engine = engine().await;
        assert!(matches!(
            engine.drop_on(Some("1")).await,
            Err(ReorderError::NoActiveDrag)
        ));
    }

    #[tokio::test]
    async fn test_failed_write_reloads_from_server() {
        let mut engine = engine().await;
        let server_before = engine.store().board(&"demo".into()).await.unwrap();
        engine.store().fail_next_writes(1).await;
        let mut events = engine.subscribe();

        engine.start_drag("1").unwrap();
        let outcome = engine.drop_on(Some("done")).await.unwrap();
        assert!(matches!(outcome, DropOutcome::Reloaded { .. }));
        assert!(engine.session().is_idle());
        assert!(!engine.is_stale());

        let expected = Board::from_stored(server_before).unwrap();
        assert_eq!(engine.board(), &expected);

        let kinds: Vec<_> = std::iter::from_fn(|| events.try_recv().ok()).collect();
        assert!(kinds.contains(&EngineEvent::Reloaded));
    }

    #[tokio::test]
    async fn test_failed_reload_marks_stale() {
        let mut engine = engine().await;
        engine.store().fail_next_writes(1).await;
        engine.store().fail_next_reads(1).await;

        engine.start_drag("1").unwrap();
        let err = engine.drop_on(Some("done")).await.unwrap_err();
        assert!(matches!(err, ReorderError::Persistence { .. }));
        assert!(engine.is_stale());
        assert!(engine.session().is_idle());
        assert!(matches!(engine.start_drag("2"), Err(ReorderError::StaleBoard)));

        engine.reload().await.unwrap();
        assert!(!engine.is_stale());
        engine.start_drag("2").unwrap();
    }

    #[tokio::test]
    async fn test_compact_lane() {
        let mut engine = engine().await;
        let writes = engine.compact_lane("todo").await.unwrap();
        assert_eq!(writes.len(), 4);
        assert_eq!(
            engine.snapshot().lane_ids("todo").unwrap(),
            vec!["1", "2", "3", "6"]
        );
        assert!(matches!(
            engine.compact_lane("nope").await,
            Err(ReorderError::LaneNotFound { .. })
        ));
    }
}
