//! Naive substring scan over one worker's local buffer.
//!
//! The scan is opaque to the surrounding orchestration: it takes a buffer,
//! a pattern, and the partition's ownership bounds, and returns global
//! offsets. A linear-time matcher (Knuth–Morris–Pratt, a rolling hash) can
//! replace the body without touching partitioning or aggregation.

use crate::partition::Partition;

/// Scans `buffer` for `pattern` and returns the global offsets of every
/// match whose first byte lies in the partition's ownership range.
///
/// Offsets are emitted in strictly increasing order. Candidates are global
/// offset `owned_min + i` for each local start `i`; a candidate at or past
/// `owned_max` belongs to the next worker, and since candidates increase
/// monotonically the scan stops at the first one. The overlap bytes at the
/// tail of the buffer exist only so an owned candidate can complete a
/// comparison that extends past `owned_max`.
///
/// Worst case O(len(buffer) × len(pattern)); byte-exact comparison only.
pub fn scan_partition(buffer: &[u8], pattern: &[u8], partition: &Partition) -> Vec<u64> {
    let m = pattern.len();
    let mut offsets = Vec::new();
    if m == 0 || buffer.len() < m {
        return offsets;
    }
    for i in 0..=buffer.len() - m {
        let global = partition.owned_min + i as u64;
        if global >= partition.owned_max {
            break;
        }
        if matches_at(buffer, i, pattern) {
            offsets.push(global);
        }
    }
    offsets
}

/// Byte-by-byte comparison, short-circuiting on the first mismatch.
#[inline]
fn matches_at(buffer: &[u8], start: usize, pattern: &[u8]) -> bool {
    for (j, &expected) in pattern.iter().enumerate() {
        if buffer[start + j] != expected {
            return false;
        }
    }
    true
}
