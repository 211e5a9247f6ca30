use crate::error::{LoadError, Result};
use crate::models::{Measurement, Station};
use crate::processors::{ProgressTracker, StationDeduplicator};
use crate::readers::{FileScanner, RecordParser};
use crate::store::SqliteStore;
use crate::utils::constants::{DEFAULT_BATCH_SIZE, DEFAULT_FILE_LIMIT, HEADER_SENTINEL};
use crate::utils::progress::ProgressReporter;
use memmap2::Mmap;
use rayon::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How the file set is grouped and scheduled. Per-file behavior is
/// identical across all three.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One group holding every file; flush after each file.
    Sequential,
    /// Contiguous groups of `batch_size` files, processed in order.
    Batched,
    /// Same grouping, consumed by a bounded worker pool.
    Concurrent,
}

/// Configuration surface for one ingestion run.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub path: PathBuf,
    pub limit: usize,
    pub batch_size: usize,
    pub batch: bool,
    pub use_async: bool,
    pub workers: usize,
    pub use_mmap: bool,
}

impl LoadOptions {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            limit: DEFAULT_FILE_LIMIT,
            batch_size: DEFAULT_BATCH_SIZE,
            batch: false,
            use_async: false,
            workers: num_cpus::get(),
            use_mmap: false,
        }
    }

    /// The `batch` and `async` flags are mutually exclusive; both set is a
    /// configuration error reported to the caller, never silently resolved.
    pub fn strategy(&self) -> Result<Strategy> {
        match (self.batch, self.use_async) {
            (true, true) => Err(LoadError::Config(
                "--batch and --async are mutually exclusive".to_string(),
            )),
            (true, false) => Ok(Strategy::Batched),
            (false, true) => Ok(Strategy::Concurrent),
            (false, false) => Ok(Strategy::Sequential),
        }
    }

    fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }
}

/// What a completed run actually did. Measurement and station totals come
/// from the store counts, not the progress counters.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub files_processed: usize,
    pub batches_completed: usize,
    pub measurements_persisted: i64,
    pub stations_persisted: i64,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn summary(&self) -> String {
        format!(
            "Ingestion complete\n  Files processed: {}\n  Batches completed: {}\n  Measurements persisted: {}\n  Stations persisted: {}\n  Elapsed: {:.2}s",
            self.files_processed,
            self.batches_completed,
            self.measurements_persisted,
            self.stations_persisted,
            self.elapsed.as_secs_f64(),
        )
    }
}

/// Everything one file contributed: measurements in input line order, plus
/// the stations this file was first to see.
struct FileRecords {
    measurements: Vec<Measurement>,
    stations: Vec<Station>,
    degraded: usize,
}

/// The ingestion orchestrator. Each file moves through open → parsed →
/// flushed; the strategies only differ in how files are grouped and
/// scheduled. The store connection, the dedup set, and the tracker are the
/// only state shared across concurrent workers, and each guards itself.
pub struct Ingestor {
    store: SqliteStore,
    options: LoadOptions,
    strategy: Strategy,
    parser: RecordParser,
    dedup: StationDeduplicator,
    tracker: ProgressTracker,
}

impl Ingestor {
    /// Validates the strategy selection before touching the store, then
    /// drops and recreates the tables: every run starts from a clean store.
    pub fn new(store: SqliteStore, options: LoadOptions) -> Result<Self> {
        let strategy = options.strategy()?;

        store.clean_all()?;
        store.init()?;

        Ok(Self {
            store,
            options,
            strategy,
            parser: RecordParser::new(),
            dedup: StationDeduplicator::new(),
            tracker: ProgressTracker::new(),
        })
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn tracker(&self) -> &ProgressTracker {
        &self.tracker
    }

    /// Enumerate the eligible input files, so callers that render a
    /// bounded progress bar know the total before ingestion starts.
    pub fn scan_files(&self) -> Result<Vec<PathBuf>> {
        let scanner = FileScanner::new();
        let files = scanner.scan(&self.options.path, self.options.limit)?;
        info!(
            files = files.len(),
            strategy = ?self.strategy,
            path = %self.options.path.display(),
            "scanned input directory"
        );

        Ok(files)
    }

    /// Scan, ingest with the configured strategy, and report.
    pub fn run(&self, progress: Option<&ProgressReporter>) -> Result<RunReport> {
        let files = self.scan_files()?;
        self.run_files(&files, progress)
    }

    /// Ingest an already-scanned file set with the configured strategy.
    pub fn run_files(
        &self,
        files: &[PathBuf],
        progress: Option<&ProgressReporter>,
    ) -> Result<RunReport> {
        let started = Instant::now();

        match self.strategy {
            Strategy::Sequential => self.load(files, progress)?,
            Strategy::Batched => self.load_batch(files, progress)?,
            Strategy::Concurrent => self.load_concurrent(files, progress)?,
        }

        Ok(RunReport {
            files_processed: self.tracker.files(),
            batches_completed: self.tracker.batches(),
            measurements_persisted: self.store.count_measurements()?,
            stations_persisted: self.store.count_stations()?,
            elapsed: started.elapsed(),
        })
    }

    /// Sequential: the whole file set is one group, flushed file by file.
    fn load(&self, files: &[PathBuf], progress: Option<&ProgressReporter>) -> Result<()> {
        for path in files {
            self.process_file(path)?;
            if let Some(p) = progress {
                p.increment(1);
            }
        }
        self.tracker.complete_batch();

        Ok(())
    }

    /// Fixed-batch: contiguous groups of `batch_size` files, each group
    /// fully processed (files in order) before the next starts.
    fn load_batch(&self, files: &[PathBuf], progress: Option<&ProgressReporter>) -> Result<()> {
        for group in files.chunks(self.options.effective_batch_size()) {
            for path in group {
                self.process_file(path)?;
                if let Some(p) = progress {
                    p.increment(1);
                }
            }
            self.tracker.complete_batch();
        }

        Ok(())
    }

    /// Concurrent: the same groups, consumed by a bounded worker pool. All
    /// groups are queued before any completes and the call returns only
    /// after the final join; the first store error stops further groups
    /// from being scheduled and propagates.
    fn load_concurrent(&self, files: &[PathBuf], progress: Option<&ProgressReporter>) -> Result<()> {
        let workers = self.options.workers.max(1);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| LoadError::Config(e.to_string()))?;

        pool.install(|| {
            files
                .par_chunks(self.options.effective_batch_size())
                .try_for_each(|group| {
                    for path in group {
                        self.process_file(path)?;
                        if let Some(p) = progress {
                            p.increment(1);
                        }
                    }
                    self.tracker.complete_batch();
                    Ok(())
                })
        })
    }

    /// Open → parsed → flushed for one file. An unreadable file is skipped
    /// with a warning; a store failure propagates.
    fn process_file(&self, path: &Path) -> Result<()> {
        let content = match self.read_file(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable file");
                return Ok(());
            }
        };

        self.tracker.begin_file();
        let records = self.parse_content(path, &content);
        self.flush(path, &records)
    }

    /// The whole file is read before any station id is marked seen, so a
    /// read failure cannot leak ids of records that never flush.
    fn read_file(&self, path: &Path) -> Result<String> {
        if self.options.use_mmap {
            let file = File::open(path)?;
            let mmap = unsafe { Mmap::map(&file)? };
            std::str::from_utf8(&mmap)
                .map(str::to_owned)
                .map_err(|e| LoadError::InvalidFormat(format!("Invalid UTF-8: {}", e)))
        } else {
            Ok(std::fs::read_to_string(path)?)
        }
    }

    fn parse_content(&self, path: &Path, content: &str) -> FileRecords {
        let mut measurements = Vec::new();
        let mut stations = Vec::new();
        let mut degraded = 0;

        for line in content.lines() {
            if line.trim().is_empty() || line.contains(HEADER_SENTINEL) {
                continue;
            }

            let parsed = self.parser.parse_line(line);
            if parsed.is_degraded() {
                degraded += 1;
                for diagnostic in &parsed.diagnostics {
                    debug!(path = %path.display(), %diagnostic, "degraded record");
                }
            }

            // The global seen-set also catches repeats within this file.
            if self.dedup.mark_seen(&parsed.station.id) {
                stations.push(parsed.station);
            }
            measurements.push(parsed.measurement);
        }

        if degraded > 0 {
            warn!(path = %path.display(), degraded, "file contained degraded records");
        }

        FileRecords {
            measurements,
            stations,
            degraded,
        }
    }

    fn flush(&self, path: &Path, records: &FileRecords) -> Result<()> {
        let ids = self.store.insert_measurements(&records.measurements)?;
        self.tracker.add_measurements(ids.len());

        self.store.insert_stations(&records.stations)?;
        self.tracker.add_stations(records.stations.len());

        self.tracker.complete_file();
        debug!(
            path = %path.display(),
            measurements = records.measurements.len(),
            stations = records.stations.len(),
            degraded = records.degraded,
            "flushed file"
        );

        Ok(())
    }
}
