//! Position index: ordered-sequence primitives for a single lane.
//!
//! Plain O(n) operations on a `Vec`. No I/O and no knowledge of other lanes;
//! the board model turns a `None` from here into a desync error.

use crate::error::{ReorderError, Result};
use crate::types::{ItemId, WorkItem};

/// Anything stored in a lane sequence that carries an item identity
pub trait LaneEntry {
    fn item_id(&self) -> &ItemId;
}

impl LaneEntry for ItemId {
    fn item_id(&self) -> &ItemId {
        self
    }
}

impl LaneEntry for WorkItem {
    fn item_id(&self) -> &ItemId {
        &self.id
    }
}

/// Index of `id` within the lane, or `None` if it is not a member
pub fn index_of<T: LaneEntry>(entries: &[T], id: &ItemId) -> Option<usize> {
    entries.iter().position(|e| e.item_id() == id)
}

/// Insert `entry` before position `index`, appending when `index >= len`.
///
/// Returns the index the entry actually landed at. Negative indices are
/// rejected with [`ReorderError::InvalidIndex`].
pub fn insert_at<T>(entries: &mut Vec<T>, index: isize, entry: T) -> Result<usize> {
    if index < 0 {
        return Err(ReorderError::InvalidIndex { index });
    }
    let at = (index as usize).min(entries.len());
    entries.insert(at, entry);
    Ok(at)
}

/// Remove `id` from the lane, returning the entry and the index it held.
///
/// `None` means the id was not a member and nothing changed.
pub fn remove_from<T: LaneEntry>(entries: &mut Vec<T>, id: &ItemId) -> Option<(T, usize)> {
    let index = index_of(entries, id)?;
    Some((entries.remove(index), index))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lane(ids: &[&str]) -> Vec<ItemId> {
        ids.iter().map(|s| ItemId::from(*s)).collect()
    }

    #[test]
    fn test_index_of() {
        let l = lane(&["a", "b", "c"]);
        assert_eq!(index_of(&l, &"b".into()), Some(1));
        assert_eq!(index_of(&l, &"z".into()), None);
    }

    #[test]
    fn test_insert_at_middle_and_past_end() {
        let mut l = lane(&["a", "c"]);
        assert_eq!(insert_at(&mut l, 1, "b".into()).unwrap(), 1);
        assert_eq!(l, lane(&["a", "b", "c"]));

        assert_eq!(insert_at(&mut l, 99, "d".into()).unwrap(), 3);
        assert_eq!(l, lane(&["a", "b", "c", "d"]));
    }

    #[test]
    fn test_insert_at_negative_is_invalid() {
        let mut l = lane(&["a"]);
        let err = insert_at(&mut l, -1, "b".into()).unwrap_err();
        assert!(matches!(err, ReorderError::InvalidIndex { index: -1 }));
        assert_eq!(l, lane(&["a"]));
    }

    #[test]
    fn test_remove_from() {
        let mut l = lane(&["a", "b", "c"]);
        let (removed, index) = remove_from(&mut l, &"b".into()).unwrap();
        assert_eq!(removed.as_str(), "b");
        assert_eq!(index, 1);
        assert_eq!(l, lane(&["a", "c"]));
    }

    #[test]
    fn test_remove_non_member_is_noop() {
        let mut l = lane(&["a", "b"]);
        assert!(remove_from(&mut l, &"z".into()).is_none());
        assert_eq!(l, lane(&["a", "b"]));
    }
}
