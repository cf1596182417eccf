use thiserror::Error;

/// Convenience result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Recoverable parse failure reported by a format parser.
///
/// The ingestion loop catches this, records a skip for the offending file, and
/// continues with the next one. Anything else raised while reading a file
/// aborts the run.
#[derive(Debug, Clone, Error)]
#[error("{message}{}", .line.map(|l| format!(" (line {l})")).unwrap_or_default())]
pub struct ParseError {
    /// Human-readable cause.
    pub message: String,
    /// 1-based line number where the problem was detected, when known.
    pub line: Option<u64>,
}

impl ParseError {
    /// Create a parse error without position information.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
        }
    }

    /// Create a parse error carrying a 1-based line number.
    pub fn at_line(message: impl Into<String>, line: u64) -> Self {
        Self {
            message: message.into(),
            line: Some(line),
        }
    }
}

/// Error produced by a parser or its row stream while reading one file.
///
/// The two variants mark the recoverability boundary: `Parse` never crosses
/// the ingestion loop, `Io` always does.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Malformed content. Recoverable: the file is skipped.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Underlying read failure. Fatal: the run aborts.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fatal error that aborts a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Underlying I/O error (directory walk, file open, report write).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A row reached the aggregator with the wrong number of values.
    ///
    /// This indicates a unifier bug, never a data problem, and is therefore
    /// not skippable.
    #[error("aggregation integrity error: row has {got} values, unified schema has {want} columns")]
    Integrity { got: usize, want: usize },
}
