//! CLI entry point: `sqlcsv <database_dir> <input_query_file> <output_file>`.
//!
//! Reads one SELECT statement from `input_query_file`, plans and executes
//! it against the database at `database_dir`, and writes one CSV line per
//! output row (fields separated by `", "`, no header) to `output_file`.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser as ClapParser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sqlcsv::catalog::Catalog;
use sqlcsv::config::EngineConfig;
use sqlcsv::operators::drain_all;
use sqlcsv::planner::plan;
use sqlcsv::sql::parse_select;

/// A single-process SQL query engine over CSV-resident tables.
#[derive(ClapParser, Debug)]
#[command(name = "sqlcsv", version, about)]
struct Cli {
    /// Directory containing `schema.txt` and `data/<Table>.csv`.
    database_dir: PathBuf,

    /// Path to a file containing exactly one SELECT statement.
    input_query_file: PathBuf,

    /// Path to write CSV output to (truncated/created if necessary).
    output_file: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = EngineConfig::load(&cli.database_dir).unwrap_or_default();
    init_logging(&config);

    info!(database_dir = %cli.database_dir.display(), "loading catalog");
    let catalog = Catalog::load(&cli.database_dir)
        .with_context(|| format!("loading database at {}", cli.database_dir.display()))?;

    let query_text = fs::read_to_string(&cli.input_query_file)
        .with_context(|| format!("reading query file {}", cli.input_query_file.display()))?;

    info!("parsing query");
    let statement = parse_select(query_text.trim()).context("parsing query")?;

    info!("planning query");
    let mut root = plan(&catalog, &statement).context("planning query")?;

    info!("executing query");
    let rows = drain_all(&mut *root).context("executing query")?;

    let mut output = String::new();
    for row in &rows {
        output.push_str(&row.to_csv_line());
        output.push('\n');
    }
    fs::write(&cli.output_file, output)
        .with_context(|| format!("writing output to {}", cli.output_file.display()))?;

    info!(rows = rows.len(), "query complete");
    Ok(())
}

fn init_logging(config: &EngineConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}
