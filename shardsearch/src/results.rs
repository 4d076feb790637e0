//! Result types for a distributed search.
//!
//! Match offsets flow in exactly one direction: each worker produces one
//! ordered [`WorkerMatches`] list, the coordinator consumes all of them
//! once, and the merged [`SearchReport`] is the terminal artifact of a
//! search; nothing mutates it afterwards.

/// The ordered match offsets one worker found inside its ownership range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerMatches {
    pub worker_id: usize,
    /// Global byte offsets, strictly increasing within this list.
    pub offsets: Vec<u64>,
}

/// The complete result of a search that reached `Done`.
#[derive(Debug, Clone, Default)]
pub struct SearchReport {
    /// Every global offset where the pattern occurs, strictly increasing.
    pub offsets: Vec<u64>,
    /// Size of the corpus in bytes.
    pub corpus_len: u64,
    /// Total bytes loaded into worker buffers, overlap included.
    pub bytes_loaded: u64,
    /// Number of workers that scanned a partition.
    pub worker_count: usize,
}

impl SearchReport {
    pub fn total_matches(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}
