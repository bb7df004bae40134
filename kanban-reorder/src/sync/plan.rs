//! Rank planning: decide which items need new keys after a move.
//!
//! The planner rewrites ranks on the in-memory board and returns the writes
//! that bring the store in line. Display order is never changed here.

use crate::board::{Board, MoveOutcome};
use crate::config::{EngineConfig, RankStrategy};
use crate::error::Result;
use crate::types::{ItemId, LaneId, Ordinal};
use serde::Serialize;
use tracing::debug;

/// One remote write: an item's lane membership and rank
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PositionWrite {
    pub item: ItemId,
    pub lane: LaneId,
    pub rank: Ordinal,
}

/// Plan the writes for a completed move. Only the destination lane is ever
/// touched; the source lane keeps its keys.
pub fn plan_move(
    board: &mut Board,
    outcome: &MoveOutcome,
    config: &EngineConfig,
) -> Result<Vec<PositionWrite>> {
    if outcome.is_noop() {
        return Ok(Vec::new());
    }

    let lane = &outcome.to.lane;
    let forced = outcome.crossed_lanes().then_some(&outcome.item);

    match config.rank_strategy {
        RankStrategy::Dense => {
            let keys = (0..board.lane_len(lane)?).map(Ordinal::dense).collect();
            rekey_lane(board, lane, keys, forced)
        }
        RankStrategy::Sparse => {
            let items = board.lane_items(lane)?;
            let index = outcome.to.index;
            let prev = index.checked_sub(1).and_then(|i| items.get(i)).map(|i| &i.rank);
            let next = items.get(index + 1).map(|i| &i.rank);

            match Ordinal::between(prev, next) {
                Ok(rank) if rank.len() <= config.max_rank_len => {
                    board.set_rank(&outcome.item, rank.clone())?;
                    Ok(vec![PositionWrite {
                        item: outcome.item.clone(),
                        lane: lane.clone(),
                        rank,
                    }])
                }
                Ok(rank) => {
                    debug!(lane = %lane, len = rank.len(), "rank too long, compacting lane");
                    compact_lane(board, lane, forced)
                }
                Err(e) => {
                    debug!(lane = %lane, error = %e, "no room between neighbours, compacting lane");
                    compact_lane(board, lane, forced)
                }
            }
        }
    }
}

/// Respace every key in a lane evenly. `forced` is written even if its key
/// happens to be unchanged (its lane membership changed).
pub fn compact_lane(
    board: &mut Board,
    lane: &LaneId,
    forced: Option<&ItemId>,
) -> Result<Vec<PositionWrite>> {
    let keys = Ordinal::spread(board.lane_len(lane)?);
    rekey_lane(board, lane, keys, forced)
}

fn rekey_lane(
    board: &mut Board,
    lane: &LaneId,
    keys: Vec<Ordinal>,
    forced: Option<&ItemId>,
) -> Result<Vec<PositionWrite>> {
    let changed: Vec<(ItemId, Ordinal)> = board
        .lane_items(lane)?
        .iter()
        .zip(keys)
        .filter(|(item, key)| &item.rank != key || Some(&item.id) == forced)
        .map(|(item, key)| (item.id.clone(), key))
        .collect();

    let mut writes = Vec::with_capacity(changed.len());
    for (item, rank) in changed {
        board.set_rank(&item, rank.clone())?;
        writes.push(PositionWrite {
            item,
            lane: lane.clone(),
            rank,
        });
    }
    debug!(lane = %lane, writes = writes.len(), "rekeyed lane");
    Ok(writes)
}
