use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for search operations
pub type SearchResult<T> = Result<T, SearchError>;

/// Errors that can occur during a distributed search.
///
/// Every error is fatal to the whole search: the coordinator performs one
/// atomic global computation, so a failure in any component aborts all
/// peers and surfaces exactly one of these to the caller. There is no
/// partial-success mode and no retry on load or scan failures.
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Pattern of {pattern_len} bytes cannot fit in a {corpus_len}-byte corpus")]
    PatternTooLong { pattern_len: usize, corpus_len: u64 },
    #[error("Corpus file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Could not stat corpus file {path}: {source}")]
    StatError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Worker {worker_id} short read: requested {requested} bytes, received {received}")]
    ShortRead {
        worker_id: usize,
        requested: usize,
        received: usize,
    },
    #[error("Worker unreachable: {0}")]
    WorkerUnreachable(String),
    #[error("Failed to allocate a {requested}-byte partition buffer")]
    AllocationFailure { requested: usize },
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl SearchError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn pattern_too_long(pattern_len: usize, corpus_len: u64) -> Self {
        Self::PatternTooLong {
            pattern_len,
            corpus_len,
        }
    }

    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound(path.into())
    }

    pub fn stat_error(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::StatError {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn short_read(worker_id: usize, requested: usize, received: usize) -> Self {
        Self::ShortRead {
            worker_id,
            requested,
            received,
        }
    }

    pub fn worker_unreachable(msg: impl Into<String>) -> Self {
        Self::WorkerUnreachable(msg.into())
    }

    pub fn allocation_failure(requested: usize) -> Self {
        Self::AllocationFailure { requested }
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Process exit code for this error: 1 for input problems diagnosed
    /// before any worker runs, 2 for failures mid-run.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidArgument(_)
            | Self::PatternTooLong { .. }
            | Self::FileNotFound(_)
            | Self::StatError { .. }
            | Self::ConfigError(_) => 1,
            Self::ShortRead { .. }
            | Self::WorkerUnreachable(_)
            | Self::AllocationFailure { .. }
            | Self::IoError(_) => 2,
        }
    }
}
