use std::sync::atomic::{AtomicUsize, Ordering};

/// Shared progress counters for one ingestion run.
///
/// Files and batches accumulate for the run's duration; the measurement and
/// station counters are per-file and reset when a worker begins a new file.
/// All reads are observational (relaxed, possibly stale under the
/// concurrent strategy) — authoritative totals come from the store counts.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    files_completed: AtomicUsize,
    measurements_flushed: AtomicUsize,
    stations_flushed: AtomicUsize,
    batches_completed: AtomicUsize,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_file(&self) {
        self.measurements_flushed.store(0, Ordering::Relaxed);
        self.stations_flushed.store(0, Ordering::Relaxed);
    }

    pub fn add_measurements(&self, count: usize) {
        self.measurements_flushed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_stations(&self, count: usize) {
        self.stations_flushed.fetch_add(count, Ordering::Relaxed);
    }

    pub fn complete_file(&self) {
        self.files_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn complete_batch(&self) {
        self.batches_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn files(&self) -> usize {
        self.files_completed.load(Ordering::Relaxed)
    }

    pub fn measurements(&self) -> usize {
        self.measurements_flushed.load(Ordering::Relaxed)
    }

    pub fn stations(&self) -> usize {
        self.stations_flushed.load(Ordering::Relaxed)
    }

    pub fn batches(&self) -> usize {
        self.batches_completed.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_counters_accumulate() {
        let tracker = ProgressTracker::new();

        tracker.complete_file();
        tracker.complete_file();
        tracker.complete_batch();

        assert_eq!(tracker.files(), 2);
        assert_eq!(tracker.batches(), 1);
    }

    #[test]
    fn test_begin_file_resets_per_file_counters() {
        let tracker = ProgressTracker::new();

        tracker.begin_file();
        tracker.add_measurements(120);
        tracker.add_stations(3);
        tracker.complete_file();

        assert_eq!(tracker.measurements(), 120);
        assert_eq!(tracker.stations(), 3);

        tracker.begin_file();
        assert_eq!(tracker.measurements(), 0);
        assert_eq!(tracker.stations(), 0);
        assert_eq!(tracker.files(), 1);
    }
}
