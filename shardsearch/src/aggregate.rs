//! Coordinator-side collection of worker match lists.
//!
//! Workers already report ordered offsets, cross-worker duplication is
//! precluded by the ownership filter, and partitions are ordered by
//! `owned_min`. The p-way merge therefore reduces to concatenation in
//! worker-id order; no sort of the offsets themselves is needed.

use crate::results::WorkerMatches;

/// Merges per-worker match lists into the single global result sequence.
///
/// The output is strictly increasing: worker `k`'s smallest offset is at
/// least its `owned_min`, which is past worker `k−1`'s ownership range.
/// That invariant is structural, so it is asserted rather than handled.
pub fn merge_worker_matches(mut lists: Vec<WorkerMatches>) -> Vec<u64> {
    lists.sort_unstable_by_key(|list| list.worker_id);
    let total = lists.iter().map(|list| list.offsets.len()).sum();
    let mut merged = Vec::with_capacity(total);
    for list in lists {
        merged.extend(list.offsets);
    }
    debug_assert!(
        is_strictly_increasing(&merged),
        "worker match lists violated the partition ordering invariant"
    );
    merged
}

/// True when every offset is strictly larger than its predecessor.
pub fn is_strictly_increasing(offsets: &[u64]) -> bool {
    offsets.windows(2).all(|pair| pair[0] < pair[1])
}
