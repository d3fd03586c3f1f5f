//! CLI entry point for the vacancy dashboard.

use anyhow::{Result, anyhow};
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};
use vacancy_dashboard::{
    Dashboard, DashboardConfig, DashboardConfigBuilder, DashboardView, FrequencyEntry,
    RecordLoader, Scalar, TableCache,
};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "HR job-vacancy dashboard",
    long_about = "Summarises an HR vacancy export: totals, stores, open vacancies, \
                  status and recruiter breakdowns, and the most requested positions.\n\n\
                  EXAMPLES:\n  \
                  # Summarise the default file in the current folder\n  \
                  vacancy-dashboard\n\n  \
                  # Only the North area, one recruiter\n  \
                  vacancy-dashboard --filter Area=North --filter Recruiter=Somchai\n\n  \
                  # Machine-readable output\n  \
                  vacancy-dashboard -i ALL_AREA.csv --json | jq .metrics"
)]
struct Args {
    /// Path to the vacancy CSV file
    ///
    /// Defaults to "Vacancy File-Store&Area Hr 2026.xlsx - ALL_AREA.csv"
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// JSON configuration file; command line flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Filter as COLUMN=VALUE, may be repeated (VALUE "All" clears it)
    #[arg(short, long = "filter", value_parser = parse_filter)]
    filters: Vec<(String, String)>,

    /// Number of positions in the top positions chart
    #[arg(long)]
    top_n: Option<usize>,

    /// Status value counted as an open vacancy
    #[arg(long)]
    vacant_value: Option<String>,

    /// Encoding tried when the file is not UTF-8 (e.g. windows-874, windows-1252)
    #[arg(long)]
    fallback_encoding: Option<String>,

    /// Field delimiter
    #[arg(short, long)]
    delimiter: Option<char>,

    /// Maximum number of data grid rows to output
    #[arg(short, long)]
    rows: Option<usize>,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all logs; only outputs the dashboard view as JSON.
    #[arg(long)]
    json: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,
}

fn parse_filter(raw: &str) -> std::result::Result<(String, String), String> {
    let (column, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected COLUMN=VALUE, got '{raw}'"))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(format!("missing column name in '{raw}'"));
    }
    Ok((column.to_string(), value.trim().to_string()))
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

/// Merge the optional config file with command line overrides.
fn build_config(args: &Args) -> Result<DashboardConfig> {
    let base = match args.config {
        Some(ref path) => {
            info!("Reading configuration from: {}", path.display());
            DashboardConfig::from_json_file(path)?
        }
        None => DashboardConfig::default(),
    };

    let mut builder = DashboardConfigBuilder::from_config(base);
    if let Some(ref input) = args.input {
        builder = builder.input_path(input);
    }
    if let Some(n) = args.top_n {
        builder = builder.top_n(n);
    }
    if let Some(ref value) = args.vacant_value {
        builder = builder.vacant_value(value);
    }
    if let Some(ref label) = args.fallback_encoding {
        builder = builder.fallback_encoding(label);
    }
    if let Some(delimiter) = args.delimiter {
        builder = builder.delimiter(delimiter);
    }
    if let Some(rows) = args.rows {
        builder = builder.grid_row_limit(rows);
    }

    Ok(builder.build()?)
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let config = build_config(&args)?;
    let loader = RecordLoader::new(&config)?;

    info!("Loading vacancies from: {}", config.input_path.display());
    let table = TableCache::global().load(&loader, &config.input_path);
    if let Some(message) = table.status.user_message() {
        return Err(anyhow!(message));
    }

    let dashboard = Dashboard::new(table, &config)?;
    let mut selection = dashboard.default_selection();
    for (column, value) in &args.filters {
        debug!("Applying filter {} = {}", column, value);
        selection = selection.choose_text(&dashboard.table().df, column, value)?;
    }

    let view = dashboard.render(&selection)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    print_human_readable_summary(&view);
    Ok(())
}

/// Truncate a string to `max_chars` characters with ellipsis
fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

fn cell_text(cell: &Option<Scalar>) -> String {
    cell.as_ref().map(|v| v.to_string()).unwrap_or_default()
}

const BAR_WIDTH: usize = 40;

/// Print a frequency table with proportional text bars.
fn print_frequency_table(title: &str, entries: &[FrequencyEntry]) {
    println!("{title}:");
    if entries.is_empty() {
        println!("  (no data)");
        println!();
        return;
    }

    let max_count = entries.iter().map(|e| e.count).max().unwrap_or(1).max(1);
    let label_width = entries
        .iter()
        .map(|e| e.value.to_string().chars().count())
        .max()
        .unwrap_or(0)
        .min(30);

    for entry in entries {
        let label = truncate_str(&entry.value.to_string(), 30);
        let padding = label_width.saturating_sub(label.chars().count());
        let bar_len = (entry.count * BAR_WIDTH).div_ceil(max_count);
        println!(
            "  {}{} {:>6}  {}",
            label,
            " ".repeat(padding),
            entry.count,
            "#".repeat(bar_len)
        );
    }
    println!();
}

/// Print the dashboard view for a terminal.
///
/// This is the default output when `--json` is not specified.
fn print_human_readable_summary(view: &DashboardView) {
    println!();
    println!("{}", "=".repeat(80));
    println!("HR VACANCY DASHBOARD");
    println!("{}", "=".repeat(80));
    println!();

    let source = &view.source;
    println!(
        "Input:  {} ({} rows x {} columns, {})",
        source.name,
        source.row_count,
        source.column_count,
        source.encoding.as_deref().unwrap_or("unknown encoding")
    );
    if source.unparseable_dates > 0 {
        println!("  ! {} date values could not be read", source.unparseable_dates);
    }

    let active: Vec<String> = view
        .selection
        .active()
        .map(|(column, value)| format!("{column} = {value}"))
        .collect();
    if active.is_empty() {
        println!("Filters: none");
    } else {
        println!("Filters: {}", active.join(", "));
    }
    println!();

    let metrics = &view.metrics;
    println!("Metrics:");
    println!("  Total Positions: {}", metrics.total_positions);
    if let Some(stores) = metrics.store_count {
        println!("  Stores:          {}", stores);
    }
    if let Some(vacant) = metrics.vacant_count {
        println!("  Vacant:          {}", vacant);
    }
    println!();

    if let Some(ref entries) = view.status_distribution {
        print_frequency_table("Status Distribution", entries);
    }
    if let Some(ref entries) = view.recruiter_workload {
        print_frequency_table("Recruiter Workload", entries);
    }
    if let Some(ref entries) = view.top_positions {
        print_frequency_table("Top Positions", entries);
    }

    if !view.missing_columns.is_empty() {
        println!("Missing Columns:");
        for column in &view.missing_columns {
            println!("  ! {}", column);
        }
        println!();
    }

    println!("Data ({} of {} rows):", view.rows.len(), view.shown_rows);
    println!(
        "  {}",
        view.columns
            .iter()
            .map(|c| truncate_str(c, 16))
            .collect::<Vec<_>>()
            .join(" | ")
    );
    for row in &view.rows {
        println!(
            "  {}",
            row.iter()
                .map(|cell| truncate_str(&cell_text(cell), 16))
                .collect::<Vec<_>>()
                .join(" | ")
        );
    }
    if view.is_truncated() {
        println!("  ... and {} more rows", view.shown_rows - view.rows.len());
    }
    println!();

    println!("Use --json for machine-readable output");
    println!("{}", "=".repeat(80));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_filter("Area=North").unwrap(),
            ("Area".to_string(), "North".to_string())
        );
        assert_eq!(
            parse_filter("Sta_Area HR = Vacant").unwrap(),
            ("Sta_Area HR".to_string(), "Vacant".to_string())
        );
        assert!(parse_filter("Area").is_err());
        assert!(parse_filter("=North").is_err());
    }

    #[test]
    fn test_truncate_str_counts_chars() {
        assert_eq!(truncate_str("North", 10), "North");
        assert_eq!(truncate_str("ภาคตะวันออกเฉียงเหนือ", 6), "ภาค...");
    }

    #[test]
    fn test_cli_overrides_config() {
        let args = Args::parse_from([
            "vacancy-dashboard",
            "--input",
            "data.csv",
            "--top-n",
            "3",
            "--delimiter",
            ";",
            "--filter",
            "Area=North",
        ]);

        let config = build_config(&args).unwrap();

        assert_eq!(config.input_path, PathBuf::from("data.csv"));
        assert_eq!(config.top_n, 3);
        assert_eq!(config.delimiter, ';');
        assert_eq!(args.filters.len(), 1);
    }
}
