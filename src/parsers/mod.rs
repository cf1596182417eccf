//! Format parsers and the registry that dispatches to them.
//!
//! A parser turns an open readable handle into a [`ParsedSource`]: the file's
//! [`Schema`] plus a lazy stream of [`Row`]s aligned to it. The built-in set
//! covers delimiter-separated text ([`csv`]), JSON/NDJSON ([`json`]) and
//! fixed-width text ([`fixed`]); [`registry::ParserRegistry`] maps file
//! extensions to parsers.

pub mod csv;
pub mod fixed;
pub mod infer;
pub mod json;
pub mod registry;

pub use registry::ParserRegistry;

use std::io::BufRead;

use crate::error::SourceError;
use crate::types::{Row, Schema};

/// Lazy row stream produced by a parser. Finite, single-pass, not restartable.
pub type RowIter = Box<dyn Iterator<Item = Result<Row, SourceError>>>;

/// Schema plus the row stream extracted from one file.
pub struct ParsedSource {
    /// Column names and types, in the file's declared order.
    pub schema: Schema,
    /// Rows aligned to `schema`. Each row has exactly `schema.width()` values.
    pub rows: RowIter,
}

impl std::fmt::Debug for ParsedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedSource")
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// A format-specific parser.
///
/// Implementations take ownership of the handle; it is released when the row
/// stream is dropped. Malformed content is reported as [`SourceError::Parse`]
/// (either up front or from the row stream), read failures as
/// [`SourceError::Io`]. Parsers must not assume the file fits in memory where
/// the format permits streaming.
pub trait FormatParser: Send + Sync {
    /// Parse a file, producing its schema and a lazy row stream.
    fn parse(&self, input: Box<dyn BufRead>) -> Result<ParsedSource, SourceError>;
}
