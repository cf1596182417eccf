//! Directory ingestion: one pass over every file, dispatching to parsers.
//!
//! Recoverable conditions (no parser for an extension, malformed content) are
//! recorded as skips and never cross this module. Everything else is fatal and
//! aborts the run.

pub mod observability;

pub use observability::{IngestObserver, NullObserver, StdErrObserver};

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{PipelineError, PipelineResult, SourceError};
use crate::parsers::{FormatParser, ParserRegistry};
use crate::types::{Row, Schema};
use crate::unify::SchemaUnifier;

/// Why a file was skipped rather than ingested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No parser registered for the file's extension.
    UnsupportedFormat {
        /// The (unnormalized) extension, empty if the file has none.
        extension: String,
    },
    /// The parser rejected the file's content.
    Malformed {
        /// Human-readable cause from the parser.
        message: String,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::UnsupportedFormat { extension } => {
                write!(f, "no parser registered for extension '{extension}'")
            }
            SkipReason::Malformed { message } => write!(f, "{message}"),
        }
    }
}

/// One skipped file, kept for diagnostics.
#[derive(Debug, Clone)]
pub struct SkipRecord {
    /// The skipped file.
    pub path: PathBuf,
    /// Why it was skipped.
    pub reason: SkipReason,
}

/// Summary of one ingestion pass.
#[derive(Debug, Default)]
pub struct IngestReport {
    /// Files parsed and folded into the unifier.
    pub files_ingested: usize,
    /// Total rows folded in across those files.
    pub rows_ingested: usize,
    /// Files skipped, with reasons.
    pub skipped: Vec<SkipRecord>,
}

/// Ingest every regular file directly under `dir`, folding each parsed source
/// into `unifier`.
///
/// Files are visited in file-name order so repeated runs enumerate
/// identically; aggregation correctness does not depend on that order. The
/// handle for each file is opened just before parsing and released when its
/// row stream is dropped, on every exit path.
pub fn ingest_dir(
    dir: impl AsRef<Path>,
    registry: &ParserRegistry,
    unifier: &mut SchemaUnifier,
    observer: &dyn IngestObserver,
) -> PipelineResult<IngestReport> {
    let mut report = IngestReport::default();

    for entry in WalkDir::new(dir.as_ref())
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(walk_error)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();

        let extension = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_owned();
        let Some(parser) = registry.resolve(&extension) else {
            skip(&mut report, observer, path, SkipReason::UnsupportedFormat { extension });
            continue;
        };

        let reader: Box<dyn BufRead> = Box::new(BufReader::new(File::open(path)?));
        match ingest_one(parser.as_ref(), reader) {
            Ok((schema, rows)) => {
                observer.on_source(path, rows.len());
                report.files_ingested += 1;
                report.rows_ingested += rows.len();
                unifier.fold_source(schema, rows);
            }
            Err(SourceError::Parse(e)) => {
                skip(&mut report, observer, path, SkipReason::Malformed { message: e.to_string() });
            }
            Err(SourceError::Io(e)) => return Err(PipelineError::Io(e)),
        }
    }

    Ok(report)
}

/// Parse one file and drain its row stream.
///
/// Rows are buffered per file so a mid-stream parse failure discards the whole
/// file instead of leaving a partial source in the unifier.
fn ingest_one(
    parser: &dyn FormatParser,
    reader: Box<dyn BufRead>,
) -> Result<(Schema, Vec<Row>), SourceError> {
    let parsed = parser.parse(reader)?;
    let mut rows = Vec::new();
    for row in parsed.rows {
        rows.push(row?);
    }
    Ok((parsed.schema, rows))
}

fn skip(report: &mut IngestReport, observer: &dyn IngestObserver, path: &Path, reason: SkipReason) {
    let record = SkipRecord {
        path: path.to_path_buf(),
        reason,
    };
    observer.on_skip(&record);
    report.skipped.push(record);
}

fn walk_error(e: walkdir::Error) -> PipelineError {
    let message = e.to_string();
    PipelineError::Io(
        e.into_io_error()
            .unwrap_or_else(|| std::io::Error::other(message)),
    )
}
