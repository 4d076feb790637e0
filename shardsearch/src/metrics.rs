use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Counters for one search run, shared between the coordinator and its
/// workers. Cloning is cheap and all clones observe the same counters.
#[derive(Debug, Clone)]
pub struct ScanMetrics {
    bytes_loaded: Arc<AtomicU64>,
    buffered_loads: Arc<AtomicU64>,
    mmap_loads: Arc<AtomicU64>,
    shipped_loads: Arc<AtomicU64>,
    partitions_scanned: Arc<AtomicU64>,
    matches_found: Arc<AtomicU64>,
}

impl ScanMetrics {
    pub fn new() -> Self {
        Self {
            bytes_loaded: Arc::new(AtomicU64::new(0)),
            buffered_loads: Arc::new(AtomicU64::new(0)),
            mmap_loads: Arc::new(AtomicU64::new(0)),
            shipped_loads: Arc::new(AtomicU64::new(0)),
            partitions_scanned: Arc::new(AtomicU64::new(0)),
            matches_found: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Records a partition buffer filled by buffered read.
    pub fn record_buffered_load(&self, bytes: u64) {
        self.bytes_loaded.fetch_add(bytes, Ordering::Relaxed);
        self.buffered_loads.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a partition buffer copied out of a memory map.
    pub fn record_mmap_load(&self, bytes: u64) {
        self.bytes_loaded.fetch_add(bytes, Ordering::Relaxed);
        self.mmap_loads.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a partition buffer read by the coordinator and shipped to a
    /// worker over its command channel.
    pub fn record_shipped_load(&self, bytes: u64) {
        self.bytes_loaded.fetch_add(bytes, Ordering::Relaxed);
        self.shipped_loads.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a completed partition scan and its match count.
    pub fn record_scan(&self, matches: u64) {
        self.partitions_scanned.fetch_add(1, Ordering::Relaxed);
        self.matches_found.fetch_add(matches, Ordering::Relaxed);
    }

    pub fn bytes_loaded(&self) -> u64 {
        self.bytes_loaded.load(Ordering::Relaxed)
    }

    /// Gets a snapshot of the current counters
    pub fn get_stats(&self) -> ScanStats {
        ScanStats {
            bytes_loaded: self.bytes_loaded.load(Ordering::Relaxed),
            buffered_loads: self.buffered_loads.load(Ordering::Relaxed),
            mmap_loads: self.mmap_loads.load(Ordering::Relaxed),
            shipped_loads: self.shipped_loads.load(Ordering::Relaxed),
            partitions_scanned: self.partitions_scanned.load(Ordering::Relaxed),
            matches_found: self.matches_found.load(Ordering::Relaxed),
        }
    }

    /// Logs the current counters
    pub fn log_stats(&self) {
        let stats = self.get_stats();
        info!(
            "Search stats:\n\
             Bytes loaded: {}\n\
             Loads (buffered/mmap/shipped): {}/{}/{}\n\
             Partitions scanned: {}\n\
             Matches found: {}",
            stats.bytes_loaded,
            stats.buffered_loads,
            stats.mmap_loads,
            stats.shipped_loads,
            stats.partitions_scanned,
            stats.matches_found
        );
    }
}

impl Default for ScanMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of a run's counters
#[derive(Debug, Clone, Copy)]
pub struct ScanStats {
    pub bytes_loaded: u64,
    pub buffered_loads: u64,
    pub mmap_loads: u64,
    pub shipped_loads: u64,
    pub partitions_scanned: u64,
    pub matches_found: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_tracking() {
        let metrics = ScanMetrics::new();
        metrics.record_buffered_load(100);
        metrics.record_mmap_load(2000);
        metrics.record_shipped_load(30);

        let stats = metrics.get_stats();
        assert_eq!(stats.bytes_loaded, 2130);
        assert_eq!(stats.buffered_loads, 1);
        assert_eq!(stats.mmap_loads, 1);
        assert_eq!(stats.shipped_loads, 1);
    }

    #[test]
    fn test_scan_tracking() {
        let metrics = ScanMetrics::new();
        metrics.record_scan(3);
        metrics.record_scan(0);

        let stats = metrics.get_stats();
        assert_eq!(stats.partitions_scanned, 2);
        assert_eq!(stats.matches_found, 3);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = ScanMetrics::new();
        let clone = metrics.clone();
        clone.record_buffered_load(64);
        assert_eq!(metrics.bytes_loaded(), 64);
    }
}
