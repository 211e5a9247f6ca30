use crate::cli::args::{Cli, Commands, OutputFormat};
use crate::error::{LoadError, Result};
use crate::processors::{Ingestor, LoadOptions};
use crate::store::{QueryRow, SqliteStore};
use crate::utils::constants::DEFAULT_FILE_LIMIT;
use crate::utils::progress::ProgressReporter;
use comfy_table::Table;
use std::path::Path;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

pub fn run(cli: Cli) -> Result<()> {
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Load {
            path,
            limit,
            batch_size,
            batch,
            use_async,
            workers,
            database,
            mmap,
            quiet,
        } => {
            let mut options = LoadOptions::new(path);
            options.limit = limit.unwrap_or(DEFAULT_FILE_LIMIT);
            options.batch_size = batch_size;
            options.batch = batch;
            options.use_async = use_async;
            options.workers = workers;
            options.use_mmap = mmap;

            run_load(&database, options, quiet)
        }

        Commands::Query {
            sql,
            database,
            format,
            max_rows,
            stats,
        } => run_query(&database, &sql, format, max_rows, stats),

        Commands::Stats { database } => run_stats(&database),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn run_load(database: &Path, options: LoadOptions, quiet: bool) -> Result<()> {
    let store = SqliteStore::open(database)?;
    let ingestor = Ingestor::new(store, options)?;

    // Scan up front so the bar knows its total.
    let files = ingestor.scan_files()?;
    let progress = ProgressReporter::new(
        files.len() as u64,
        "Ingesting observation files...",
        quiet,
    );
    let report = ingestor.run_files(&files, Some(&progress))?;
    progress.finish_with_message(&format!(
        "Ingested {} files in {:.2}s",
        report.files_processed,
        report.elapsed.as_secs_f64()
    ));

    println!("\n{}", report.summary());

    Ok(())
}

fn run_query(
    database: &Path,
    sql: &str,
    format: OutputFormat,
    max_rows: usize,
    stats: bool,
) -> Result<()> {
    let store = SqliteStore::open(database)?;

    let started = Instant::now();
    let rows = store.execute_query(sql)?;
    let elapsed = started.elapsed();

    match format {
        OutputFormat::Table => print_table(&rows, max_rows),
        OutputFormat::Json => print_json(&rows, max_rows)?,
        OutputFormat::Csv => print_csv(&rows, max_rows),
    }

    if stats {
        println!("\nRows returned: {}", rows.len());
        println!("Query: {}", sql);
        println!("Elapsed: {:.3}s", elapsed.as_secs_f64());
    }

    Ok(())
}

fn run_stats(database: &Path) -> Result<()> {
    let store = SqliteStore::open(database)?;

    println!("Database: {}", database.display());
    println!("Measurements: {}", store.count_measurements()?);
    println!("Stations: {}", store.count_stations()?);

    Ok(())
}

fn print_table(rows: &[QueryRow], max_rows: usize) {
    if rows.is_empty() {
        println!("No rows returned");
        return;
    }

    let mut table = Table::new();
    table.set_header(rows[0].iter().map(|(name, _)| name.clone()));

    for row in rows.iter().take(max_rows) {
        table.add_row(row.iter().map(|(_, value)| value.clone()));
    }

    println!("{table}");

    if rows.len() > max_rows {
        println!("(showing first {} of {} rows)", max_rows, rows.len());
    }
}

fn print_json(rows: &[QueryRow], max_rows: usize) -> Result<()> {
    let objects: Vec<serde_json::Value> = rows
        .iter()
        .take(max_rows)
        .map(|row| {
            serde_json::Value::Object(
                row.iter()
                    .map(|(name, value)| (name.clone(), serde_json::Value::String(value.clone())))
                    .collect(),
            )
        })
        .collect();

    let rendered = serde_json::to_string_pretty(&objects)
        .map_err(|e| LoadError::InvalidFormat(e.to_string()))?;
    println!("{rendered}");

    Ok(())
}

fn print_csv(rows: &[QueryRow], max_rows: usize) {
    if rows.is_empty() {
        return;
    }

    let header: Vec<String> = rows[0].iter().map(|(name, _)| csv_escape(name)).collect();
    println!("{}", header.join(","));

    for row in rows.iter().take(max_rows) {
        let values: Vec<String> = row.iter().map(|(_, value)| csv_escape(value)).collect();
        println!("{}", values.join(","));
    }
}

fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
