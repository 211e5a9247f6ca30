/// Input format
pub const CSV_EXTENSION: &str = "csv";
pub const HEADER_SENTINEL: &str = "STATION";

/// Ingestion defaults
pub const DEFAULT_DATABASE_FILE: &str = "weather.db";
pub const DEFAULT_BATCH_SIZE: usize = 10;
pub const DEFAULT_FILE_LIMIT: usize = usize::MAX;

/// Store row ids are fixed-length random alphanumeric tokens
pub const ID_LENGTH: usize = 16;

/// Query rendering
pub const DEFAULT_QUERY_ROW_CAP: usize = 50;
