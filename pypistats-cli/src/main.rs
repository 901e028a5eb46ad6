//! pypistats - PyPI download statistics from the command line
//!
//! Fetches per-package download counts from the public warehouse (or a
//! previously saved CSV file) and prints them as CSV or renders a
//! terminal chart.

mod chart;

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pypistats_core::chart::ChartRenderer;
use pypistats_core::warehouse::bigquery::BigQueryExecutor;
use pypistats_core::{
    aggregate, config, csv, Config, FetchRequest, FieldCatalog, InstallerFilter, QueryOutcome,
    StatsFetcher,
};

#[derive(Parser, Debug)]
#[command(name = "pypistats")]
#[command(about = "PyPI download statistics as CSV or terminal charts")]
#[command(version)]
struct Args {
    /// Package to look up
    package: String,

    /// Field names to group by (repeatable; default from config)
    #[arg(short = 'f', long = "field", value_name = "NAME")]
    fields: Vec<String>,

    /// Print the CSV header line
    #[arg(long)]
    header: bool,

    /// Render a chart instead of printing CSV
    #[arg(long)]
    graph: bool,

    /// Read a previously saved CSV file instead of querying the warehouse
    #[arg(long, value_name = "PATH")]
    input: Option<PathBuf>,

    /// Query timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout: Option<u64>,

    /// Days of history to include (0 = all time)
    #[arg(long, value_name = "N")]
    days: Option<u32>,

    /// Count only pip-originated downloads
    #[arg(long)]
    pip_only: bool,

    /// Maximum number of result groups
    #[arg(long, value_name = "N")]
    limit: Option<u32>,

    /// Field to split chart lines by
    #[arg(long, value_name = "NAME", default_value = "country")]
    category: String,

    /// Field providing the x axis
    #[arg(long, value_name = "NAME", default_value = "date")]
    date_field: String,

    /// Field providing the y axis
    #[arg(long, value_name = "NAME", default_value = "download_count")]
    measure: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load().context("failed to load configuration")?;
    let _log_guard = pypistats_core::logging::init(&config.logging).ok();

    let catalog = FieldCatalog::new();

    let outcome = if let Some(path) = &args.input {
        csv::read_csv(path).with_context(|| format!("failed to read {}", path.display()))?
    } else {
        fetch_live(&catalog, &config, &args)?
    };

    let table = match outcome {
        QueryOutcome::Data(table) => table,
        QueryOutcome::Empty { .. } => {
            eprintln!("no data returned, check the package name");
            return Ok(());
        }
    };

    if args.graph {
        let category = resolve_column(&catalog, &args.category);
        let x_column = resolve_column(&catalog, &args.date_field);
        let y_column = resolve_column(&catalog, &args.measure);

        let series =
            aggregate(&table, &category, &x_column, &y_column).context("failed to pivot result")?;

        let mut renderer = chart::TerminalChart::new(&args.package);
        renderer
            .render(&series, &x_column, &y_column)
            .context("failed to render chart")?;
    } else {
        let stdout = io::stdout();
        csv::write_csv(&mut stdout.lock(), &table, args.header)
            .context("failed to write CSV")?;
    }

    Ok(())
}

/// Query the warehouse for download stats.
fn fetch_live(catalog: &FieldCatalog, config: &Config, args: &Args) -> Result<QueryOutcome> {
    let secret = config::service_account_json()?;
    let executor = BigQueryExecutor::from_service_account(&secret)
        .context("failed to create warehouse client")?;
    let fetcher = StatsFetcher::new(catalog, executor);

    let request = FetchRequest {
        package: args.package.clone(),
        fields: if args.fields.is_empty() {
            config.query.fields.clone()
        } else {
            args.fields.clone()
        },
        limit: args.limit.or(config.query.limit),
        days: args.days.unwrap_or(config.query.days),
        installers: if args.pip_only {
            InstallerFilter::PipOnly
        } else {
            InstallerFilter::All
        },
        timeout_ms: args.timeout.unwrap_or(config.query.timeout_ms),
    };

    tracing::info!(package = %request.package, fields = ?request.fields, "fetching download stats");
    let outcome = fetcher
        .fetch(&request)
        .context("failed to fetch download stats")?;
    Ok(outcome)
}

/// Map a user-facing field name to its result column, passing unknown
/// names through untouched (`--input` CSVs may carry arbitrary headers).
fn resolve_column(catalog: &FieldCatalog, name: &str) -> String {
    catalog
        .get(name)
        .map(|f| f.column.to_string())
        .unwrap_or_else(|| name.to_string())
}
