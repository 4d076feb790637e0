//! Splits the corpus byte range across workers.
//!
//! Worker `k` of `p` owns `[k·n/p, (k+1)·n/p)` in floor division, so the
//! ownership ranges tile `[0, n)` exactly: no gaps, no double ownership.
//! Each partition additionally loads up to `m − 1` trailing overlap bytes so
//! that a match starting inside the owned range but extending past its end
//! is still fully visible to the owning worker.

use std::num::NonZeroUsize;

/// One worker's slice of the corpus.
///
/// The **load range** is `[owned_min, overlap_max)`. The **ownership
/// range**, the sub-range for which this worker is the sole reporter of
/// matches, is `[owned_min, owned_max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Partition {
    pub worker_id: usize,
    pub owned_min: u64,
    pub owned_max: u64,
    pub overlap_max: u64,
}

impl Partition {
    /// Number of bytes this worker loads, overlap included.
    pub fn load_len(&self) -> usize {
        (self.overlap_max - self.owned_min) as usize
    }

    /// Number of bytes this worker owns for match reporting.
    pub fn owned_len(&self) -> u64 {
        self.owned_max - self.owned_min
    }
}

/// Computes the partition set for a corpus of `corpus_len` bytes, a pattern
/// of `pattern_len` bytes, and `worker_count` workers.
///
/// Pure and deterministic: identical inputs always yield identical
/// partitions. The last partition's owned range always ends at
/// `corpus_len`; every `overlap_max` is clamped to `corpus_len`.
///
/// Precondition: `pattern_len ≥ 1` and `pattern_len ≤ corpus_len`, enforced
/// by the coordinator before partitioning.
pub fn plan_partitions(
    corpus_len: u64,
    pattern_len: usize,
    worker_count: NonZeroUsize,
) -> Vec<Partition> {
    debug_assert!(pattern_len >= 1);
    let p = worker_count.get() as u64;
    let overlap = pattern_len as u64 - 1;

    (0..p)
        .map(|k| {
            let owned_min = floor_share(k, corpus_len, p);
            let owned_max = if k + 1 == p {
                corpus_len
            } else {
                floor_share(k + 1, corpus_len, p)
            };
            Partition {
                worker_id: k as usize,
                owned_min,
                owned_max,
                overlap_max: (owned_max + overlap).min(corpus_len),
            }
        })
        .collect()
}

/// `⌊k·n/p⌋` without overflow for corpus sizes near `u64::MAX`.
fn floor_share(k: u64, n: u64, p: u64) -> u64 {
    (u128::from(k) * u128::from(n) / u128::from(p)) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nz(p: usize) -> NonZeroUsize {
        NonZeroUsize::new(p).unwrap()
    }

    #[test]
    fn test_single_worker_owns_everything() {
        let parts = plan_partitions(100, 5, nz(1));
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].owned_min, 0);
        assert_eq!(parts[0].owned_max, 100);
        // No trailing bytes exist, so no overlap is possible.
        assert_eq!(parts[0].overlap_max, 100);
    }

    #[test]
    fn test_ownership_ranges_tile_the_corpus() {
        for n in [0u64, 1, 2, 3, 9, 10, 97, 1000] {
            for p in [1usize, 2, 3, 4, 7, 16, 33] {
                let parts = plan_partitions(n, 3, nz(p));
                assert_eq!(parts.len(), p);
                assert_eq!(parts[0].owned_min, 0, "n={n} p={p}");
                assert_eq!(parts[p - 1].owned_max, n, "n={n} p={p}");
                for pair in parts.windows(2) {
                    assert_eq!(
                        pair[0].owned_max, pair[1].owned_min,
                        "gap or double ownership at n={n} p={p}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_overlap_is_bounded_by_pattern_length() {
        for m in [1usize, 2, 3, 8] {
            let parts = plan_partitions(100, m, nz(4));
            for part in &parts {
                assert!(part.overlap_max >= part.owned_max);
                assert!(part.overlap_max - part.owned_max <= m as u64 - 1);
                assert!(part.overlap_max <= 100);
            }
        }
    }

    #[test]
    fn test_overlap_covers_any_boundary_straddling_match() {
        // A match starting at the last owned byte must fit in the load range.
        let m = 5usize;
        let n = 103u64;
        for p in 1..=10 {
            for part in plan_partitions(n, m, nz(p)) {
                if part.owned_len() == 0 {
                    continue;
                }
                let last_start = part.owned_max - 1;
                if last_start + m as u64 <= n {
                    assert!(
                        last_start + m as u64 <= part.overlap_max,
                        "worker {} cannot see its own boundary match",
                        part.worker_id
                    );
                }
            }
        }
    }

    #[test]
    fn test_deterministic() {
        let a = plan_partitions(12345, 7, nz(9));
        let b = plan_partitions(12345, 7, nz(9));
        assert_eq!(a, b);
    }

    #[test]
    fn test_more_workers_than_bytes() {
        let parts = plan_partitions(2, 1, nz(5));
        assert_eq!(parts.len(), 5);
        assert_eq!(parts.iter().map(Partition::owned_len).sum::<u64>(), 2);
        // Empty ownership ranges are legal; those workers report nothing.
        assert!(parts.iter().any(|part| part.owned_len() == 0));
    }

    #[test]
    fn test_load_len_matches_range() {
        let parts = plan_partitions(9, 3, nz(3));
        assert_eq!(parts[0].load_len(), 5); // [0, 3) plus 2 overlap bytes
        assert_eq!(parts[1].load_len(), 5); // [3, 6) plus 2 overlap bytes
        assert_eq!(parts[2].load_len(), 3); // [6, 9), overlap clamped at n
    }

    #[test]
    fn test_no_overflow_near_u64_max() {
        let n = u64::MAX - 1;
        let parts = plan_partitions(n, 2, nz(3));
        assert_eq!(parts[2].owned_max, n);
        assert_eq!(parts[0].owned_max, parts[1].owned_min);
    }
}
