//! Argument parsing and text output for the `run`, `validate` and `metrics`
//! subcommands.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;
use tabclean::config::{self, AppConfig};
use tabclean::flows;
use tabclean::loader::Source;
use tabclean::metrics::{ColumnStats, ColumnSummary, CorrelationMatrix, TableMetrics};
use tabclean::pipeline::{Pipeline, StepKind};
use tabclean::validator::missing_values_report;

#[derive(Parser)]
#[command(
    name = "tabclean",
    version,
    about = "Clean, validate and profile tabular data files"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// File name inside the data directory, or "all" for every file
    #[arg(short, long, default_value = "all")]
    source: String,

    /// Directory holding the raw files. Overrides the config file and TABCLEAN_DATA_DIR.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Print results as JSON instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load, clean, validate and report metrics
    Run {
        #[command(flatten)]
        source: SourceArgs,

        /// Comma-separated cleaning steps to run, in order (default: from config)
        #[arg(long, value_delimiter = ',')]
        steps: Option<Vec<StepKind>>,
    },
    /// Load and validate without cleaning
    Validate {
        #[command(flatten)]
        source: SourceArgs,
    },
    /// Load and report metrics without cleaning
    Metrics {
        #[command(flatten)]
        source: SourceArgs,
    },
}

fn resolve_config(args: &SourceArgs) -> AppConfig {
    let mut config = config::load_app_config();
    if let Some(dir) = &args.data_dir {
        config.raw_data_dir.clone_from(dir);
    }
    config
}

pub fn run_command(command: Commands) -> Result<()> {
    match command {
        Commands::Run { source, steps } => handle_run(&source, steps),
        Commands::Validate { source } => handle_validate(&source),
        Commands::Metrics { source } => handle_metrics(&source),
    }
}

fn handle_run(args: &SourceArgs, steps: Option<Vec<StepKind>>) -> Result<()> {
    let mut config = resolve_config(args);
    if let Some(steps) = steps {
        config.steps = steps;
    }
    let pipeline: Pipeline = config.pipeline();

    let report = flows::run_quality_flow(&config, &Source::parse(&args.source), &pipeline)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for (name, df) in &report.cleaned {
        println!("DataFrame name: {name}");
        if let Some(execution) = report.executions.get(name) {
            for record in execution.records() {
                println!("  {record}");
            }
        }
        println!("{}", df.head(Some(config.preview_rows)));
        if let Some(metrics) = report.metrics.get(name) {
            println!("Metrics for {name}:");
            print!("{}", render_metrics(metrics)?);
        }
        println!();
    }

    let failed: Vec<&str> = report.failed_datasets().collect();
    if !failed.is_empty() {
        println!("Cleaning stopped early for: {}", failed.join(", "));
    }
    Ok(())
}

fn handle_validate(args: &SourceArgs) -> Result<()> {
    let config = resolve_config(args);
    let datasets = flows::validate_flow(&config, &Source::parse(&args.source))?;

    if args.json {
        let summary: BTreeMap<&str, String> = datasets
            .iter()
            .map(|(name, df)| (name.as_str(), missing_values_report(df)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    for (name, df) in &datasets {
        println!("DataFrame {name} is valid. {}", missing_values_report(df));
    }
    Ok(())
}

fn handle_metrics(args: &SourceArgs) -> Result<()> {
    let config = resolve_config(args);
    let metrics = flows::metrics_flow(&config, &Source::parse(&args.source))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&metrics)?);
        return Ok(());
    }

    for (name, table) in &metrics {
        println!("Metrics for {name}:");
        print!("{}", render_metrics(table)?);
        println!();
    }
    Ok(())
}

fn render_metrics(metrics: &TableMetrics) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "Summary statistics:")?;
    for summary in &metrics.summary_statistics {
        writeln!(out, "  {}", render_summary(summary))?;
    }
    writeln!(out, "Correlation matrix:")?;
    out.push_str(&render_correlation(&metrics.correlation_matrix)?);
    writeln!(out, "Missing values:")?;
    for (column, missing) in &metrics.missing_values_count {
        writeln!(out, "  {column}: {missing}")?;
    }
    Ok(out)
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_owned(), |v| format!("{v:.4}"))
}

fn render_summary(summary: &ColumnSummary) -> String {
    let head = format!(
        "{} [{}] count={} missing={}",
        summary.name,
        summary.kind.as_str(),
        summary.count,
        summary.missing
    );
    let detail = match &summary.stats {
        Some(ColumnStats::Numeric(s)) => format!(
            "mean={} std={} min={} 25%={} 50%={} 75%={} max={}",
            fmt_opt(s.mean),
            fmt_opt(s.std),
            fmt_opt(s.min),
            fmt_opt(s.q1),
            fmt_opt(s.median),
            fmt_opt(s.q3),
            fmt_opt(s.max)
        ),
        Some(ColumnStats::Text(s)) => match &s.top_value {
            Some((value, freq)) => format!("unique={} top={value:?} freq={freq}", s.distinct),
            None => format!("unique={}", s.distinct),
        },
        Some(ColumnStats::Temporal(s)) => format!(
            "min={} max={}",
            s.min.as_deref().unwrap_or("-"),
            s.max.as_deref().unwrap_or("-")
        ),
        Some(ColumnStats::Boolean(s)) => {
            format!("true={} false={}", s.true_count, s.false_count)
        }
        None => String::new(),
    };
    format!("{head} {detail}").trim_end().to_owned()
}

fn render_correlation(matrix: &CorrelationMatrix) -> Result<String> {
    let mut out = String::new();
    if matrix.is_empty() {
        writeln!(out, "  (no numeric columns)")?;
        return Ok(out);
    }

    let width = matrix
        .columns
        .iter()
        .map(String::len)
        .max()
        .unwrap_or(0)
        .max(8);
    write!(out, "  {:width$}", "")?;
    for column in &matrix.columns {
        write!(out, " {column:>width$}")?;
    }
    writeln!(out)?;
    for (column, row) in matrix.columns.iter().zip(&matrix.data) {
        write!(out, "  {column:width$}")?;
        for value in row {
            write!(out, " {:>width$}", fmt_opt(*value))?;
        }
        writeln!(out)?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory as _;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_step_list() -> Result<()> {
        let cli = Cli::try_parse_from([
            "tabclean",
            "run",
            "--steps",
            "remove_duplicates,clean_text_columns",
            "--json",
        ])?;

        let Commands::Run { source, steps } = cli.command else {
            anyhow::bail!("expected run command");
        };
        assert_eq!(
            steps,
            Some(vec![StepKind::RemoveDuplicates, StepKind::CleanTextColumns])
        );
        assert_eq!(source.source, "all");
        assert!(source.json);
        Ok(())
    }

    #[test]
    fn test_unknown_step_is_rejected() {
        let result = Cli::try_parse_from(["tabclean", "run", "--steps", "shred"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_render_empty_correlation() -> Result<()> {
        let rendered = render_correlation(&CorrelationMatrix::default())?;
        assert!(rendered.contains("no numeric columns"));
        Ok(())
    }
}
