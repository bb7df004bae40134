//! Integration tests for optimistic moves and reload reconciliation

use kanban_reorder::{
    defaults::{new_board, sample_items},
    Board, BoardEngine, DropOutcome, EngineConfig, EngineEvent, Lane, MemoryStore, NoOpReason,
    Ordinal, RankStrategy, ReorderError, StoredBoard, WorkItem, WriteMode,
};
use std::time::Duration;

fn sample_store() -> MemoryStore {
    let mut board = new_board("demo", "Demo");
    board.items = sample_items();
    MemoryStore::with_board(board)
}

/// Two lanes from the cross-lane example: A=[T1,T2,T3], B=[T4]
fn two_lane_store() -> MemoryStore {
    let items = [("T1", "A", 0), ("T2", "A", 1), ("T3", "A", 2), ("T4", "B", 0)]
        .into_iter()
        .map(|(id, lane, i)| WorkItem::new(id, lane, Ordinal::dense(i)).with_id(id))
        .collect();
    MemoryStore::with_board(StoredBoard {
        id: "ab".into(),
        name: "A/B".into(),
        lanes: vec![Lane::new("A", "Lane A", 0), Lane::new("B", "Lane B", 1)],
        items,
    })
}

async fn engine_with(store: MemoryStore, board: &str, config: EngineConfig) -> BoardEngine<MemoryStore> {
    BoardEngine::load(store, board.into(), config).await.unwrap()
}

/// The board the server would hand out right now
async fn server_board(engine: &BoardEngine<MemoryStore>) -> Board {
    let stored = engine.store().board(engine.board().id()).await.unwrap();
    Board::from_stored(stored).unwrap()
}

async fn drag(engine: &mut BoardEngine<MemoryStore>, item: &str, onto: &str) -> DropOutcome {
    engine.start_drag(item).unwrap();
    engine.drop_on(Some(onto)).await.unwrap()
}

#[tokio::test]
async fn test_cross_lane_transfer_to_front() {
    let mut engine = engine_with(two_lane_store(), "ab", EngineConfig::default()).await;

    let outcome = drag(&mut engine, "T2", "T4").await;
    assert!(matches!(outcome, DropOutcome::Moved(_)));

    let snap = engine.snapshot();
    assert_eq!(snap.lane_ids("A").unwrap(), vec!["T1", "T3"]);
    assert_eq!(snap.lane_ids("B").unwrap(), vec!["T2", "T4"]);
    assert_eq!(server_board(&engine).await.snapshot(), snap);
}

#[tokio::test]
async fn test_cross_lane_never_writes_source_lane() {
    for strategy in [RankStrategy::Dense, RankStrategy::Sparse] {
        let config = EngineConfig::default().with_rank_strategy(strategy);
        let mut engine = engine_with(two_lane_store(), "ab", config).await;

        let DropOutcome::Moved(report) = drag(&mut engine, "T1", "B").await else {
            panic!("expected move with {strategy:?}");
        };
        assert!(report.writes.iter().all(|w| w.lane.as_str() == "B"));
        assert!(report.writes.iter().any(|w| w.item.as_str() == "T1"));

        let writes = engine.store().writes().await;
        assert!(writes.iter().all(|w| w.item.as_str() != "T2" && w.item.as_str() != "T3"));
    }
}

#[tokio::test]
async fn test_successful_moves_keep_local_and_server_equal() {
    for mode in [WriteMode::Sequential, WriteMode::Parallel] {
        for strategy in [RankStrategy::Dense, RankStrategy::Sparse] {
            let config = EngineConfig::default()
                .with_write_mode(mode)
                .with_rank_strategy(strategy);
            let mut engine = engine_with(sample_store(), "demo", config).await;

            for (item, onto) in [("1", "5"), ("6", "todo"), ("9", "2"), ("4", "review"), ("3", "1")] {
                let outcome = drag(&mut engine, item, onto).await;
                assert!(matches!(outcome, DropOutcome::Moved(_)), "{item} onto {onto}");
                assert_eq!(
                    server_board(&engine).await.snapshot(),
                    engine.snapshot(),
                    "diverged after {item} onto {onto} ({mode:?}, {strategy:?})"
                );
            }
        }
    }
}

#[tokio::test]
async fn test_sparse_writes_one_key_per_move() {
    let mut engine = engine_with(sample_store(), "demo", EngineConfig::default()).await;
    drag(&mut engine, "6", "1").await;
    drag(&mut engine, "3", "6").await;
    assert_eq!(engine.store().writes().await.len(), 2);
}

#[tokio::test]
async fn test_dense_rewrites_every_shifted_item() {
    let config = EngineConfig::default().with_rank_strategy(RankStrategy::Dense);
    let mut engine = engine_with(sample_store(), "demo", config).await;

    // todo = [1, 2, 3, 6]; 6 onto 1 gives [6, 1, 2, 3], every key shifts.
    let DropOutcome::Moved(report) = drag(&mut engine, "6", "1").await else {
        panic!("expected move");
    };
    assert_eq!(report.writes.len(), 4);
}

#[tokio::test]
async fn test_cancellation_touches_nothing() {
    let store = sample_store();
    let mut engine = engine_with(store.clone(), "demo", EngineConfig::default()).await;
    let before = engine.snapshot();
    let server_before = store.board(&"demo".into()).await;

    for (item, onto) in [("1", None), ("1", Some("1")), ("1", Some("sidebar"))] {
        engine.start_drag(item).unwrap();
        let outcome = engine.drop_on(onto).await.unwrap();
        assert!(matches!(outcome, DropOutcome::Cancelled { .. }));
        assert!(engine.session().is_idle());
    }

    engine.start_drag("2").unwrap();
    engine.cancel_drag().unwrap();

    assert_eq!(engine.snapshot(), before);
    assert!(store.writes().await.is_empty());
    assert_eq!(store.board(&"demo".into()).await, server_before);
}

#[tokio::test]
async fn test_reload_matches_last_good_server_state() {
    let config = EngineConfig::default().with_rank_strategy(RankStrategy::Dense);
    let store = sample_store();
    let mut engine = engine_with(store.clone(), "demo", config).await;

    drag(&mut engine, "2", "review").await;
    let last_good = server_board(&engine).await;

    // todo = [1, 3, 6]; 6 onto 1 rewrites 6 then 1, and the write for 1 fails.
    store.fail_item("1").await;
    let outcome = drag(&mut engine, "6", "1").await;
    let DropOutcome::Reloaded { cause } = outcome else {
        panic!("expected reload, got {outcome:?}");
    };
    assert!(cause.contains("rejected"));

    // The first write of the batch landed; the reload reflects exactly that.
    let server_now = server_board(&engine).await;
    assert_ne!(server_now, last_good);
    assert_eq!(engine.board(), &server_now);
    engine.board().verify().unwrap();
    assert!(engine.session().is_idle());
    assert!(!engine.is_stale());
}

#[tokio::test]
async fn test_reload_discards_optimistic_move() {
    let store = sample_store();
    let mut engine = engine_with(store.clone(), "demo", EngineConfig::default()).await;
    let server_before = server_board(&engine).await;

    store.fail_next_writes(1).await;
    let outcome = drag(&mut engine, "1", "done").await;
    assert!(matches!(outcome, DropOutcome::Reloaded { .. }));
    assert_eq!(engine.board(), &server_before);
    assert_eq!(
        engine.snapshot().lane_ids("todo").unwrap(),
        vec!["1", "2", "3", "6"]
    );
}

#[tokio::test(start_paused = true)]
async fn test_write_timeout_triggers_reload() {
    let store = sample_store();
    let config = EngineConfig::default().with_write_timeout(Duration::from_millis(50));
    let mut engine = engine_with(store.clone(), "demo", config).await;
    let server_before = server_board(&engine).await;

    store.set_latency(Some(Duration::from_secs(30))).await;
    engine.start_drag("1").unwrap();
    let outcome = engine.drop_on(Some("done")).await;

    // The reload read is slowed by the same latency and times out too.
    assert!(matches!(outcome, Err(ReorderError::PersistenceTimeout { .. })));
    assert!(engine.is_stale());

    store.set_latency(None).await;
    engine.reload().await.unwrap();
    assert!(!engine.is_stale());
    assert_eq!(engine.board(), &server_before);
}

#[tokio::test]
async fn test_stale_engine_refuses_work_until_reloaded() {
    let store = sample_store();
    let mut engine = engine_with(store.clone(), "demo", EngineConfig::default()).await;

    store.fail_next_writes(1).await;
    store.fail_next_reads(1).await;
    let before = engine.snapshot();
    engine.start_drag("1").unwrap();
    assert!(engine.drop_on(Some("done")).await.is_err());

    assert!(engine.is_stale());
    assert!(matches!(engine.start_drag("2"), Err(ReorderError::StaleBoard)));
    assert!(matches!(
        engine.compact_lane("todo").await,
        Err(ReorderError::StaleBoard)
    ));
    // The optimistic move is still visible; the UI shows it as unsynced.
    assert_ne!(engine.snapshot(), before);

    engine.reload().await.unwrap();
    assert_eq!(engine.snapshot(), before);
    assert!(matches!(drag(&mut engine, "2", "done").await, DropOutcome::Moved(_)));
}

#[tokio::test]
async fn test_desync_recovers_by_reload() {
    let store = sample_store();
    let mut engine = engine_with(store.clone(), "demo", EngineConfig::default()).await;

    // Someone else removed item 4 from the server.
    let mut stored = store.board(&"demo".into()).await.unwrap();
    stored.items.retain(|i| i.id.as_str() != "4");
    store.insert_board(stored).await;

    let outcome = drag(&mut engine, "4", "done").await;
    assert!(matches!(outcome, DropOutcome::Reloaded { .. }));
    assert!(engine.board().item(&"4".into()).is_none());
    assert_eq!(engine.board().item_count(), 9);
}

#[tokio::test]
async fn test_events_announce_reload() {
    let store = sample_store();
    let mut engine = engine_with(store.clone(), "demo", EngineConfig::default()).await;
    let mut events = engine.subscribe();

    drag(&mut engine, "1", "done").await;
    store.fail_next_writes(1).await;
    drag(&mut engine, "2", "done").await;

    let received: Vec<EngineEvent> = std::iter::from_fn(|| events.try_recv().ok()).collect();
    let kinds: Vec<&str> = received
        .iter()
        .map(|e| match e {
            EngineEvent::DragStarted { .. } => "started",
            EngineEvent::Moved { .. } => "moved",
            EngineEvent::Cancelled { .. } => "cancelled",
            EngineEvent::ReloadStarted { .. } => "reload_started",
            EngineEvent::Reloaded => "reloaded",
            EngineEvent::ReloadFailed { .. } => "reload_failed",
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["started", "moved", "started", "reload_started", "reloaded"]
    );
}

#[tokio::test]
async fn test_cancel_reason_is_reported() {
    let mut engine = engine_with(sample_store(), "demo", EngineConfig::default()).await;
    engine.start_drag("7").unwrap();
    assert_eq!(
        engine.drop_on(Some("7")).await.unwrap(),
        DropOutcome::Cancelled {
            reason: NoOpReason::DroppedOnSelf
        }
    );
}
