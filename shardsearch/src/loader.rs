//! Fills worker buffers from the backing corpus file.
//!
//! Reads are exact: a partition buffer either contains every byte of the
//! load range `[owned_min, overlap_max)` or the search fails with
//! `ShortRead`. A silently short buffer would break the boundary-overlap
//! guarantee the scanner depends on, so there is no best-effort mode.

use memmap2::Mmap;
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::trace;

use crate::errors::{SearchError, SearchResult};
use crate::metrics::ScanMetrics;
use crate::partition::Partition;

/// Corpora at or above this size are loaded through a memory map; smaller
/// ones go through buffered positioned reads.
pub(crate) const MMAP_THRESHOLD: u64 = 10 * 1024 * 1024; // 10MB

/// Stats the corpus file and returns its size in bytes.
pub fn corpus_len(path: &Path) -> SearchResult<u64> {
    match std::fs::metadata(path) {
        Ok(metadata) if metadata.is_file() => Ok(metadata.len()),
        Ok(_) => Err(SearchError::invalid_argument(format!(
            "{} is not a regular file",
            path.display()
        ))),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(SearchError::file_not_found(path)),
        Err(e) => Err(SearchError::stat_error(path, e)),
    }
}

/// A read-only handle on the corpus with its own file-position state.
///
/// Each worker that self-loads opens its own `CorpusReader`, and the
/// coordinator's ship loop uses a single one sequentially; in both cases no
/// read ever depends on where a previous read left the file position.
#[derive(Debug)]
pub struct CorpusReader {
    file: File,
}

impl CorpusReader {
    pub fn open(path: &Path) -> SearchResult<Self> {
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => SearchError::file_not_found(path),
            _ => SearchError::stat_error(path, e),
        })?;
        Ok(Self { file })
    }

    /// Reads exactly the partition's load range into a fresh buffer.
    ///
    /// Always seeks to `owned_min` first. When partitions overlap, the
    /// previous range's read ends up to `m − 1` bytes past the next range's
    /// start, so trusting the inherited position would corrupt every
    /// partition after the first.
    pub fn load_partition(&mut self, partition: &Partition) -> SearchResult<Vec<u8>> {
        let requested = partition.load_len();
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(requested)
            .map_err(|_| SearchError::allocation_failure(requested))?;
        buffer.resize(requested, 0);

        self.file.seek(SeekFrom::Start(partition.owned_min))?;
        let mut received = 0;
        while received < requested {
            match self.file.read(&mut buffer[received..]) {
                Ok(0) => break,
                Ok(count) => received += count,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        if received != requested {
            return Err(SearchError::short_read(
                partition.worker_id,
                requested,
                received,
            ));
        }
        trace!(
            worker_id = partition.worker_id,
            offset = partition.owned_min,
            bytes = requested,
            "partition loaded"
        );
        Ok(buffer)
    }
}

/// Copies the partition's load range out of a memory-mapped corpus.
///
/// The file may have been truncated since it was stated; a map shorter than
/// the load range is the same fatal condition as a short positioned read.
pub fn load_partition_mmap(path: &Path, partition: &Partition) -> SearchResult<Vec<u8>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => SearchError::file_not_found(path),
        _ => SearchError::stat_error(path, e),
    })?;
    let mmap = unsafe { Mmap::map(&file) }?;

    let start = partition.owned_min as usize;
    let end = partition.overlap_max as usize;
    let requested = partition.load_len();
    if mmap.len() < end {
        return Err(SearchError::short_read(
            partition.worker_id,
            requested,
            mmap.len().saturating_sub(start),
        ));
    }

    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(requested)
        .map_err(|_| SearchError::allocation_failure(requested))?;
    buffer.extend_from_slice(&mmap[start..end]);
    Ok(buffer)
}

/// Self-load entry point for a worker: picks the strategy from the corpus
/// size, mirroring the small/large split used for the corpus as a whole.
pub fn load_for_worker(
    path: &Path,
    corpus_len: u64,
    partition: &Partition,
    metrics: &ScanMetrics,
) -> SearchResult<Vec<u8>> {
    if corpus_len >= MMAP_THRESHOLD {
        let buffer = load_partition_mmap(path, partition)?;
        metrics.record_mmap_load(buffer.len() as u64);
        Ok(buffer)
    } else {
        let buffer = CorpusReader::open(path)?.load_partition(partition)?;
        metrics.record_buffered_load(buffer.len() as u64);
        Ok(buffer)
    }
}
