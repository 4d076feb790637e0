//! Orchestrates a search: validates inputs, partitions the corpus,
//! distributes buffers, triggers scans, and aggregates results.
//!
//! One coordinator drives `p` workers on a dedicated rayon pool. All
//! coordination happens over channels: every worker reports on a shared
//! event channel, and the coordinator holds one command channel per worker.
//! There are exactly two synchronization barriers (all buffers loaded, all
//! match lists reported) and no partial or streaming aggregation: the full
//! set of local results must be in hand before the global order is
//! established by concatenation.
//!
//! Cancellation is by channel teardown. When any worker fails to load, the
//! coordinator drops every command sender; peers blocked on `recv` see the
//! disconnect and return without scanning, so a single fatal error never
//! leaves the rest of the pool hanging.

use rayon::ThreadPoolBuilder;
use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, info, trace, warn};

use crate::aggregate::merge_worker_matches;
use crate::config::{DistributionMode, SearchConfig};
use crate::errors::{SearchError, SearchResult};
use crate::loader::{self, CorpusReader};
use crate::metrics::ScanMetrics;
use crate::partition::{plan_partitions, Partition};
use crate::pattern::normalize_pattern;
use crate::results::{SearchReport, WorkerMatches};
use crate::scanner::scan_partition;

/// Runs a complete search described by `config`.
pub fn search(config: &SearchConfig) -> SearchResult<SearchReport> {
    Coordinator::new(config.clone()).run()
}

/// Coordinator lifecycle. `Failed` is terminal and reachable from every
/// state except `Done`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Init,
    Partitioned,
    Distributing,
    Scanning,
    Aggregating,
    Done,
    Failed,
}

/// Coordinator-to-worker messages, one channel per worker.
enum WorkerCommand {
    /// A complete local buffer, sent only in ship mode.
    Buffer(Vec<u8>),
    /// The go signal: every peer holds a complete buffer, start scanning.
    Proceed,
}

/// Worker-to-coordinator messages on the shared event channel.
enum WorkerEvent {
    /// Load confirmation: the buffer size on success, the fatal load error
    /// otherwise.
    Loaded {
        worker_id: usize,
        result: SearchResult<usize>,
    },
    /// The worker's complete local match list, possibly empty.
    Scanned {
        worker_id: usize,
        offsets: Vec<u64>,
    },
}

pub struct Coordinator {
    config: SearchConfig,
    phase: Phase,
    metrics: ScanMetrics,
}

impl Coordinator {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            phase: Phase::Init,
            metrics: ScanMetrics::new(),
        }
    }

    pub fn run(mut self) -> SearchResult<SearchReport> {
        let outcome = self.execute();
        match &outcome {
            Ok(report) => info!(
                "Search complete. Found {} matches across {} workers",
                report.total_matches(),
                report.worker_count
            ),
            Err(e) => {
                self.transition(Phase::Failed);
                warn!("Search failed: {e}");
            }
        }
        outcome
    }

    fn execute(&mut self) -> SearchResult<SearchReport> {
        // Init: validate m >= 1, the corpus, and m <= n before any worker
        // exists. Worker count >= 1 is enforced by the config type.
        let pattern = normalize_pattern(&self.config.pattern).into_bytes();
        if pattern.is_empty() {
            return Err(SearchError::invalid_argument("empty search pattern"));
        }
        if self.config.corpus_path.as_os_str().is_empty() {
            return Err(SearchError::invalid_argument("no corpus file given"));
        }
        let corpus_len = loader::corpus_len(&self.config.corpus_path)?;
        if pattern.len() as u64 > corpus_len {
            return Err(SearchError::pattern_too_long(pattern.len(), corpus_len));
        }

        self.transition(Phase::Partitioned);
        let partitions = plan_partitions(corpus_len, pattern.len(), self.config.worker_count);
        debug!(
            "Partitioned {} bytes across {} workers (pattern of {} bytes)",
            corpus_len,
            partitions.len(),
            pattern.len()
        );

        let lists = self.run_workers(&pattern, corpus_len, &partitions)?;

        self.transition(Phase::Aggregating);
        let offsets = merge_worker_matches(lists);
        self.metrics.log_stats();

        let report = SearchReport {
            offsets,
            corpus_len,
            bytes_loaded: self.metrics.bytes_loaded(),
            worker_count: partitions.len(),
        };
        self.transition(Phase::Done);
        Ok(report)
    }

    /// Spawns one task per partition on a dedicated pool and drives the
    /// distribution and collection barriers from the current thread.
    fn run_workers(
        &mut self,
        pattern: &[u8],
        corpus_len: u64,
        partitions: &[Partition],
    ) -> SearchResult<Vec<WorkerMatches>> {
        let worker_count = partitions.len();
        // One extra slot: the coordinator parks inside the scope while every
        // worker is running, and must not starve the last of them.
        let pool = ThreadPoolBuilder::new()
            .num_threads(worker_count + 1)
            .thread_name(|i| format!("shardsearch-worker-{i}"))
            .build()
            .map_err(|e| {
                SearchError::worker_unreachable(format!("failed to start worker pool: {e}"))
            })?;

        let (event_tx, event_rx) = mpsc::channel();
        let mut command_txs = Vec::with_capacity(worker_count);
        let mut command_rxs = Vec::with_capacity(worker_count);
        for _ in 0..worker_count {
            let (tx, rx) = mpsc::channel();
            command_txs.push(tx);
            command_rxs.push(rx);
        }

        let mode = self.config.distribution;
        let corpus_path = self.config.corpus_path.clone();
        let coordinator = &mut *self;

        pool.scope(move |scope| {
            for (partition, command_rx) in partitions.iter().zip(command_rxs) {
                let event_tx = event_tx.clone();
                let partition = *partition;
                let corpus_path = corpus_path.clone();
                let metrics = coordinator.metrics.clone();
                scope.spawn(move |_| {
                    run_worker(
                        partition,
                        pattern,
                        mode,
                        &corpus_path,
                        corpus_len,
                        command_rx,
                        event_tx,
                        metrics,
                    )
                });
            }
            // Only workers may hold event senders now; a disconnect on the
            // event channel then means every worker is gone.
            drop(event_tx);

            coordinator.drive(partitions, &mut command_txs, &event_rx)
        })
    }

    /// The coordinator side of the worker protocol: ship buffers if asked,
    /// wait for every load confirmation, release the scan, collect every
    /// match list.
    fn drive(
        &mut self,
        partitions: &[Partition],
        command_txs: &mut Vec<Sender<WorkerCommand>>,
        events: &Receiver<WorkerEvent>,
    ) -> SearchResult<Vec<WorkerMatches>> {
        self.transition(Phase::Distributing);
        let worker_count = partitions.len();

        if self.config.distribution == DistributionMode::Ship {
            if let Err(e) = self.ship_buffers(partitions, command_txs) {
                command_txs.clear();
                return Err(e);
            }
        }

        // Barrier 1: every worker confirms a complete local buffer. A load
        // failure aborts all peers instead of letting them block forever.
        for _ in 0..worker_count {
            match events.recv() {
                Ok(WorkerEvent::Loaded {
                    worker_id,
                    result: Ok(bytes),
                }) => trace!(worker_id, bytes, "buffer confirmed"),
                Ok(WorkerEvent::Loaded {
                    result: Err(e), ..
                }) => {
                    command_txs.clear();
                    return Err(e);
                }
                Ok(WorkerEvent::Scanned { worker_id, .. }) => {
                    command_txs.clear();
                    return Err(SearchError::worker_unreachable(format!(
                        "worker {worker_id} scanned before the go signal"
                    )));
                }
                Err(_) => {
                    command_txs.clear();
                    return Err(SearchError::worker_unreachable(
                        "a worker exited before confirming its buffer",
                    ));
                }
            }
        }

        self.transition(Phase::Scanning);
        for tx in command_txs.iter() {
            tx.send(WorkerCommand::Proceed).map_err(|_| {
                SearchError::worker_unreachable("a worker exited before the go signal")
            })?;
        }

        // Barrier 2: every worker reports its match list, empty included.
        let mut lists = Vec::with_capacity(worker_count);
        for _ in 0..worker_count {
            match events.recv() {
                Ok(WorkerEvent::Scanned { worker_id, offsets }) => {
                    trace!(worker_id, matches = offsets.len(), "match list received");
                    lists.push(WorkerMatches { worker_id, offsets });
                }
                Ok(WorkerEvent::Loaded { worker_id, .. }) => {
                    return Err(SearchError::worker_unreachable(format!(
                        "unexpected load report from worker {worker_id}"
                    )));
                }
                Err(_) => {
                    return Err(SearchError::worker_unreachable(
                        "a worker exited before reporting matches",
                    ));
                }
            }
        }
        Ok(lists)
    }

    /// Ship mode: read every worker's range over one handle and send each
    /// buffer through that worker's command channel.
    fn ship_buffers(
        &self,
        partitions: &[Partition],
        command_txs: &[Sender<WorkerCommand>],
    ) -> SearchResult<()> {
        let mut reader = CorpusReader::open(&self.config.corpus_path)?;
        for (partition, tx) in partitions.iter().zip(command_txs) {
            let buffer = reader.load_partition(partition)?;
            self.metrics.record_shipped_load(buffer.len() as u64);
            tx.send(WorkerCommand::Buffer(buffer)).map_err(|_| {
                SearchError::worker_unreachable(format!(
                    "worker {} exited before receiving its buffer",
                    partition.worker_id
                ))
            })?;
        }
        Ok(())
    }

    fn transition(&mut self, next: Phase) {
        debug!("coordinator: {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }
}

/// One worker's life: obtain a complete local buffer, confirm it, wait for
/// the go signal, scan, report. A disconnected command channel at any wait
/// point means the coordinator aborted the search; the worker just returns.
#[allow(clippy::too_many_arguments)]
fn run_worker(
    partition: Partition,
    pattern: &[u8],
    mode: DistributionMode,
    corpus_path: &Path,
    corpus_len: u64,
    commands: Receiver<WorkerCommand>,
    events: Sender<WorkerEvent>,
    metrics: ScanMetrics,
) {
    let worker_id = partition.worker_id;

    let buffer = match mode {
        DistributionMode::SelfLoad => {
            match loader::load_for_worker(corpus_path, corpus_len, &partition, &metrics) {
                Ok(buffer) => {
                    let _ = events.send(WorkerEvent::Loaded {
                        worker_id,
                        result: Ok(buffer.len()),
                    });
                    buffer
                }
                Err(e) => {
                    let _ = events.send(WorkerEvent::Loaded {
                        worker_id,
                        result: Err(e),
                    });
                    return;
                }
            }
        }
        DistributionMode::Ship => match commands.recv() {
            Ok(WorkerCommand::Buffer(buffer)) => {
                let result = if buffer.len() == partition.load_len() {
                    Ok(buffer.len())
                } else {
                    Err(SearchError::short_read(
                        worker_id,
                        partition.load_len(),
                        buffer.len(),
                    ))
                };
                let failed = result.is_err();
                let _ = events.send(WorkerEvent::Loaded { worker_id, result });
                if failed {
                    return;
                }
                buffer
            }
            Ok(WorkerCommand::Proceed) => {
                let _ = events.send(WorkerEvent::Loaded {
                    worker_id,
                    result: Err(SearchError::worker_unreachable(format!(
                        "worker {worker_id} received the go signal before its buffer"
                    ))),
                });
                return;
            }
            // Coordinator aborted before shipping anything to us.
            Err(_) => return,
        },
    };

    // Block until every peer holds a complete buffer.
    match commands.recv() {
        Ok(WorkerCommand::Proceed) => {}
        // Aborted, or a protocol violation the coordinator will notice.
        Ok(WorkerCommand::Buffer(_)) | Err(_) => return,
    }

    let offsets = scan_partition(&buffer, pattern, &partition);
    metrics.record_scan(offsets.len() as u64);
    let _ = events.send(WorkerEvent::Scanned { worker_id, offsets });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::num::NonZeroUsize;
    use tempfile::NamedTempFile;

    fn corpus_file(contents: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    fn config_for(pattern: &str, file: &NamedTempFile, workers: usize) -> SearchConfig {
        SearchConfig {
            worker_count: NonZeroUsize::new(workers).unwrap(),
            ..SearchConfig::new(pattern, file.path())
        }
    }

    #[test]
    fn test_single_worker_finds_all_matches() {
        let file = corpus_file(b"abcabcabc");
        let report = search(&config_for("abc", &file, 1)).unwrap();
        assert_eq!(report.offsets, vec![0, 3, 6]);
        assert_eq!(report.worker_count, 1);
        assert_eq!(report.corpus_len, 9);
    }

    #[test]
    fn test_partition_boundaries_neither_miss_nor_duplicate() {
        // p = 3 cuts exactly at offsets 3 and 6, the match starts.
        let file = corpus_file(b"abcabcabc");
        let report = search(&config_for("abc", &file, 3)).unwrap();
        assert_eq!(report.offsets, vec![0, 3, 6]);
    }

    #[test]
    fn test_match_straddling_a_boundary_reported_once() {
        // p = 2 splits "xxabcxx" between the 'a' and the 'b'.
        let file = corpus_file(b"xxabcxx");
        let report = search(&config_for("abc", &file, 2)).unwrap();
        assert_eq!(report.offsets, vec![2]);
    }

    #[test]
    fn test_no_match_is_success() {
        let file = corpus_file(b"abcabcabc");
        let report = search(&config_for("zzz", &file, 2)).unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_pattern_longer_than_corpus_rejected() {
        let file = corpus_file(b"ab");
        let err = search(&config_for("abcdef", &file, 2)).unwrap_err();
        assert!(matches!(err, SearchError::PatternTooLong { .. }));
    }

    #[test]
    fn test_empty_pattern_rejected() {
        let file = corpus_file(b"abc");
        let err = search(&config_for("", &file, 1)).unwrap_err();
        assert!(matches!(err, SearchError::InvalidArgument(_)));
        // Quoting noise that normalizes to nothing is rejected the same way.
        let err = search(&config_for("\"\"", &file, 1)).unwrap_err();
        assert!(matches!(err, SearchError::InvalidArgument(_)));
    }

    #[test]
    fn test_missing_corpus_rejected() {
        let config = SearchConfig::new("abc", "definitely-not-here.txt");
        let err = search(&config).unwrap_err();
        assert!(matches!(err, SearchError::FileNotFound(_)));
    }

    #[test]
    fn test_quoted_pattern_is_normalized() {
        let file = corpus_file(b"abcabcabc");
        let report = search(&config_for("\"abc\"", &file, 2)).unwrap();
        assert_eq!(report.offsets, vec![0, 3, 6]);
    }

    #[test]
    fn test_worker_count_exceeding_corpus_len() {
        let file = corpus_file(b"ab");
        let report = search(&config_for("a", &file, 8)).unwrap();
        assert_eq!(report.offsets, vec![0]);
        assert_eq!(report.worker_count, 8);
    }

    #[test]
    fn test_ship_mode_matches_self_load() {
        let file = corpus_file(b"the cat sat on the mat, the end");
        let self_load = search(&config_for("the", &file, 4)).unwrap();
        let ship = search(&SearchConfig {
            distribution: DistributionMode::Ship,
            ..config_for("the", &file, 4)
        })
        .unwrap();
        assert_eq!(self_load.offsets, ship.offsets);
        assert_eq!(self_load.offsets, vec![0, 15, 24]);
    }

    #[test]
    fn test_result_independent_of_worker_count() {
        let corpus = b"aababaabbaabaabababbaaabab".repeat(20);
        let file = corpus_file(&corpus);
        let baseline = search(&config_for("abab", &file, 1)).unwrap();
        assert!(!baseline.is_empty());
        for p in [2usize, 3, 5, 8, 13] {
            let report = search(&config_for("abab", &file, p)).unwrap();
            assert_eq!(report.offsets, baseline.offsets, "p = {p}");
        }
    }
}
