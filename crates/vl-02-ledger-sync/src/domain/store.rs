//! # Video Catalog Store
//!
//! The in-memory catalog: newest first, one entry per id. `replace` installs
//! a completed snapshot scan; `merge` folds in a single append and is
//! idempotent, so the watcher poll and the upload confirmation path can both
//! report the same video without duplicating it.

use shared_types::entities::{BlockNumber, Video, VideoId};
use std::cmp::Reverse;

/// Summary of a completed catalog scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotInfo {
    /// Videos in the snapshot after unassigned slots were skipped.
    pub count: u64,
    /// Block the scan was pinned to.
    pub block_number: BlockNumber,
}

/// In-memory video catalog, newest first.
///
/// Ids come from the contract's append-only counter, so "newest first" is
/// simply descending id order. Id zero marks an unassigned mapping slot and
/// is never stored.
#[derive(Debug, Clone, Default)]
pub struct VideoLedger {
    videos: Vec<Video>,
    snapshot_block: BlockNumber,
}

impl VideoLedger {
    /// Empty catalog pinned to block 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole catalog with a snapshot pinned at `block`.
    /// Entries are reordered newest first; duplicate and zero ids are
    /// dropped.
    pub fn replace(&mut self, mut videos: Vec<Video>, block: BlockNumber) {
        videos.retain(|video| video.id != 0);
        videos.sort_unstable_by_key(|video| Reverse(video.id));
        videos.dedup_by_key(|video| video.id);
        self.videos = videos;
        self.snapshot_block = block;
    }

    /// Merge one appended video, keeping the newest-first order.
    ///
    /// Returns `false` when the id is already present (or zero), leaving the
    /// catalog untouched.
    pub fn merge(&mut self, video: Video) -> bool {
        if video.id == 0 {
            return false;
        }
        match self
            .videos
            .binary_search_by_key(&Reverse(video.id), |held| Reverse(held.id))
        {
            Ok(_) => false,
            Err(position) => {
                self.videos.insert(position, video);
                true
            }
        }
    }

    /// All videos, newest first.
    #[must_use]
    pub fn videos(&self) -> &[Video] {
        &self.videos
    }

    /// Look up a video by id.
    #[must_use]
    pub fn get(&self, id: VideoId) -> Option<&Video> {
        self.videos.iter().find(|video| video.id == id)
    }

    /// True when `id` is already in the catalog.
    #[must_use]
    pub fn contains(&self, id: VideoId) -> bool {
        self.get(id).is_some()
    }

    /// Number of videos held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.videos.len()
    }

    /// True when the catalog holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    /// Block the current snapshot was pinned to. Merged appends do not move
    /// it; only [`replace`](Self::replace) does.
    #[must_use]
    pub fn snapshot_block(&self) -> BlockNumber {
        self.snapshot_block
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use shared_types::entities::Address;

    fn video(id: VideoId) -> Video {
        Video {
            id,
            hash: format!("Qm{id}"),
            title: format!("video {id}"),
            author: Address::repeat_byte(0x11),
        }
    }

    #[test]
    fn test_merge_keeps_newest_first() {
        let mut ledger = VideoLedger::new();
        assert!(ledger.merge(video(2)));
        assert!(ledger.merge(video(5)));
        assert!(ledger.merge(video(3)));

        let ids: Vec<_> = ledger.videos().iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![5, 3, 2]);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut ledger = VideoLedger::new();
        assert!(ledger.merge(video(3)));
        assert!(!ledger.merge(video(3)));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_merge_rejects_unassigned_id() {
        let mut ledger = VideoLedger::new();
        assert!(!ledger.merge(video(0)));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_replace_sorts_and_drops_holes() {
        let mut ledger = VideoLedger::new();
        ledger.replace(vec![video(2), video(5), video(0), video(2)], 9);

        let ids: Vec<_> = ledger.videos().iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![5, 2]);
        assert_eq!(ledger.snapshot_block(), 9);
    }

    #[test]
    fn test_replace_discards_previous_contents() {
        let mut ledger = VideoLedger::new();
        ledger.merge(video(1));
        ledger.merge(video(2));
        ledger.replace(vec![video(9)], 4);

        assert_eq!(ledger.len(), 1);
        assert!(ledger.contains(9));
        assert!(!ledger.contains(1));
    }

    #[test]
    fn test_lookup_by_id() {
        let mut ledger = VideoLedger::new();
        ledger.merge(video(7));

        assert_eq!(ledger.get(7).map(|v| v.hash.as_str()), Some("Qm7"));
        assert!(ledger.get(8).is_none());
        assert!(ledger.contains(7));
        assert!(!ledger.contains(8));
    }

    proptest! {
        /// Merging any sequence of appends lands in the same catalog no
        /// matter the order, and replaying the whole sequence changes
        /// nothing.
        #[test]
        fn merge_is_order_insensitive_and_idempotent(
            ids in proptest::collection::vec(1u64..64, 0..24),
        ) {
            let mut forward = VideoLedger::new();
            for id in &ids {
                forward.merge(video(*id));
            }

            let mut backward = VideoLedger::new();
            for id in ids.iter().rev() {
                backward.merge(video(*id));
            }
            prop_assert_eq!(forward.videos(), backward.videos());

            let before = forward.videos().to_vec();
            for id in &ids {
                prop_assert!(!forward.merge(video(*id)));
            }
            prop_assert_eq!(forward.videos(), &before[..]);

            let held: Vec<_> = forward.videos().iter().map(|v| v.id).collect();
            prop_assert!(held.windows(2).all(|pair| pair[0] > pair[1]));

            let mut expected = ids.clone();
            expected.sort_unstable_by_key(|id| Reverse(*id));
            expected.dedup();
            prop_assert_eq!(held, expected);
        }
    }
}
