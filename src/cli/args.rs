use crate::utils::constants::{DEFAULT_BATCH_SIZE, DEFAULT_DATABASE_FILE, DEFAULT_QUERY_ROW_CAP};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Query output rendering. Parsed by clap, so a typo surfaces as a usage
/// error before any SQL runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

#[derive(Parser)]
#[command(name = "isd-loader")]
#[command(about = "Loads NOAA ISD Global Hourly weather observation archives into SQLite")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest a directory of observation CSV files into the store
    Load {
        #[arg(short, long, help = "Directory containing .csv observation files")]
        path: PathBuf,

        #[arg(short, long, help = "Maximum number of files to ingest")]
        limit: Option<usize>,

        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE, help = "Files per batch group")]
        batch_size: usize,

        #[arg(long, help = "Flush files in fixed-size batch groups")]
        batch: bool,

        #[arg(
            long = "async",
            help = "Process batch groups on a concurrent worker pool"
        )]
        use_async: bool,

        #[arg(long, default_value_t = num_cpus::get(), help = "Worker threads for --async")]
        workers: usize,

        #[arg(short, long, default_value = DEFAULT_DATABASE_FILE, help = "SQLite database file")]
        database: PathBuf,

        #[arg(long, help = "Memory-map input files instead of buffered reads")]
        mmap: bool,

        #[arg(short, long, help = "Suppress the progress bar")]
        quiet: bool,
    },

    /// Run a raw SQL query against the store
    Query {
        #[arg(help = "SQL statement to execute")]
        sql: String,

        #[arg(short, long, default_value = DEFAULT_DATABASE_FILE, help = "SQLite database file")]
        database: PathBuf,

        #[arg(
            short,
            long,
            value_enum,
            default_value = "table",
            help = "Output format"
        )]
        format: OutputFormat,

        #[arg(long, default_value_t = DEFAULT_QUERY_ROW_CAP, help = "Maximum rows to render")]
        max_rows: usize,

        #[arg(long, help = "Print row count and timing after the results")]
        stats: bool,
    },

    /// Show persisted measurement and station counts
    Stats {
        #[arg(short, long, default_value = DEFAULT_DATABASE_FILE, help = "SQLite database file")]
        database: PathBuf,
    },
}
