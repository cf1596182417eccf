use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use tabular_report::aggregate::{AdvancedOptions, BasicOptions, Metric, MetricSpec};
use tabular_report::error::PipelineResult;
use tabular_report::ingest::{IngestReport, StdErrObserver};
use tabular_report::parsers::ParserRegistry;
use tabular_report::pipeline::{run_advanced, run_basic};

#[derive(Parser)]
#[command(
    name = "tabular-report",
    about = "Aggregate a directory of tabular data files into a TSV report",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Merge every file's rows and sort them by key columns.
    Basic {
        /// Path the TSV report is written to.
        result_file: PathBuf,
        /// Directory containing the data files.
        data_dir: PathBuf,
        /// Comma-separated columns to sort by (default: every column).
        #[arg(long, value_delimiter = ',')]
        sort_by: Vec<String>,
    },
    /// Group rows by key columns and summarize the rest.
    Advanced {
        /// Path the TSV report is written to.
        result_file: PathBuf,
        /// Directory containing the data files.
        data_dir: PathBuf,
        /// Comma-separated columns forming the group key.
        #[arg(long, value_delimiter = ',')]
        group_by: Vec<String>,
        /// Metrics as column:op pairs (op: count|sum|min|max).
        /// Default: sum over every non-key numeric column.
        #[arg(long, value_delimiter = ',', value_parser = parse_metric)]
        metric: Vec<MetricSpec>,
    },
}

fn parse_metric(raw: &str) -> Result<MetricSpec, String> {
    let (column, op) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected column:op, got '{raw}'"))?;
    let metric = match op.to_ascii_lowercase().as_str() {
        "count" => Metric::Count,
        "sum" => Metric::Sum,
        "min" => Metric::Min,
        "max" => Metric::Max,
        other => return Err(format!("unknown metric op '{other}'")),
    };
    Ok(MetricSpec::new(column, metric))
}

fn run(cli: Cli) -> PipelineResult<IngestReport> {
    let registry = ParserRegistry::with_builtin_formats();
    let observer = StdErrObserver;

    match cli.command {
        Command::Basic {
            result_file,
            data_dir,
            sort_by,
        } => {
            let options = BasicOptions { sort_by };
            run_basic(data_dir, result_file, &registry, &options, &observer)
        }
        Command::Advanced {
            result_file,
            data_dir,
            group_by,
            metric,
        } => {
            let options = AdvancedOptions {
                group_by,
                metrics: metric,
            };
            run_advanced(data_dir, result_file, &registry, &options, &observer)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(report) => {
            if report.skipped.is_empty() {
                eprintln!("done: {} files, {} rows", report.files_ingested, report.rows_ingested);
            } else {
                eprintln!(
                    "done with {} skipped file(s) out of {}:",
                    report.skipped.len(),
                    report.files_ingested + report.skipped.len()
                );
                for record in &report.skipped {
                    eprintln!(" - {}: {}", record.path.display(), record.reason);
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}
