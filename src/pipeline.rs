//! End-to-end entry points: ingest a directory, unify, aggregate, report.

use std::path::Path;

use crate::aggregate::{
    AdvancedAggregator, AdvancedOptions, AggregationResult, BasicAggregator, BasicOptions,
};
use crate::error::PipelineResult;
use crate::ingest::{IngestObserver, IngestReport, ingest_dir};
use crate::parsers::ParserRegistry;
use crate::report::write_tsv_to_path;
use crate::unify::SchemaUnifier;

/// Run the basic aggregation over every file in `input_dir`: merge all rows
/// under the unified schema and sort them by the configured key columns.
pub fn basic_report(
    input_dir: impl AsRef<Path>,
    registry: &ParserRegistry,
    options: &BasicOptions,
    observer: &dyn IngestObserver,
) -> PipelineResult<(AggregationResult, IngestReport)> {
    let mut unifier = SchemaUnifier::new();
    let report = ingest_dir(input_dir, registry, &mut unifier, observer)?;
    let (schema, rows) = unifier.finish();

    let mut aggregator = BasicAggregator::new(schema, options);
    for row in rows {
        aggregator.push(row)?;
    }
    Ok((aggregator.finish(), report))
}

/// Run the advanced aggregation over every file in `input_dir`: group unified
/// rows by the configured composite key and summarize per group.
pub fn advanced_report(
    input_dir: impl AsRef<Path>,
    registry: &ParserRegistry,
    options: &AdvancedOptions,
    observer: &dyn IngestObserver,
) -> PipelineResult<(AggregationResult, IngestReport)> {
    let mut unifier = SchemaUnifier::new();
    let report = ingest_dir(input_dir, registry, &mut unifier, observer)?;
    let (schema, rows) = unifier.finish();

    let mut aggregator = AdvancedAggregator::new(schema, options);
    for row in rows {
        aggregator.push(row)?;
    }
    Ok((aggregator.finish(), report))
}

/// [`basic_report`] plus a TSV written to `output_path`.
pub fn run_basic(
    input_dir: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    registry: &ParserRegistry,
    options: &BasicOptions,
    observer: &dyn IngestObserver,
) -> PipelineResult<IngestReport> {
    let (result, report) = basic_report(input_dir, registry, options, observer)?;
    write_tsv_to_path(output_path, &result)?;
    Ok(report)
}

/// [`advanced_report`] plus a TSV written to `output_path`.
pub fn run_advanced(
    input_dir: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    registry: &ParserRegistry,
    options: &AdvancedOptions,
    observer: &dyn IngestObserver,
) -> PipelineResult<IngestReport> {
    let (result, report) = advanced_report(input_dir, registry, options, observer)?;
    write_tsv_to_path(output_path, &result)?;
    Ok(report)
}
