pub mod dedup;
pub mod ingestor;
pub mod tracker;

pub use dedup::StationDeduplicator;
pub use ingestor::{Ingestor, LoadOptions, RunReport, Strategy};
pub use tracker::ProgressTracker;
