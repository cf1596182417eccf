//! `tabular-report` ingests a directory of heterogeneous tabular data files,
//! unifies their per-file schemas into one, and writes an aggregated
//! tab-separated report.
//!
//! The format of each file is inferred from its extension via a
//! [`parsers::ParserRegistry`]; built-in parsers cover CSV/TSV, JSON/NDJSON
//! and fixed-width text. Files with no registered parser or malformed content
//! are skipped and reported, never fatal; I/O failures and internal pipeline
//! bugs abort the run.
//!
//! Two aggregation variants consume the unified row stream:
//!
//! - **basic** ([`aggregate::BasicAggregator`]): every row, sorted by
//!   configured key columns
//! - **advanced** ([`aggregate::AdvancedAggregator`]): grouped by a composite
//!   key with per-group summary metrics
//!
//! ## Quick example
//!
//! ```no_run
//! use tabular_report::aggregate::BasicOptions;
//! use tabular_report::ingest::StdErrObserver;
//! use tabular_report::parsers::ParserRegistry;
//! use tabular_report::pipeline::run_basic;
//!
//! # fn main() -> tabular_report::PipelineResult<()> {
//! let registry = ParserRegistry::with_builtin_formats();
//! let options = BasicOptions { sort_by: vec!["id".to_string()] };
//! let report = run_basic("data/", "report.tsv", &registry, &options, &StdErrObserver)?;
//! println!("ingested {} files, skipped {}", report.files_ingested, report.skipped.len());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`parsers`]: format parsers and the extension registry
//! - [`ingest`]: the per-directory ingestion loop and skip diagnostics
//! - [`unify`]: schema unification (first-seen column order, type widening,
//!   null padding)
//! - [`aggregate`]: the two aggregation variants
//! - [`report`]: the TSV sink
//! - [`pipeline`]: end-to-end entry points
//! - [`types`] and [`error`]: shared data model and error taxonomy

pub mod aggregate;
pub mod error;
pub mod ingest;
pub mod parsers;
pub mod pipeline;
pub mod report;
pub mod types;
pub mod unify;

pub use error::{ParseError, PipelineError, PipelineResult, SourceError};
