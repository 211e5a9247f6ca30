pub mod file_scanner;
pub mod record_parser;

pub use file_scanner::FileScanner;
pub use record_parser::{ParseDiagnostic, ParsedRecord, RecordParser};
