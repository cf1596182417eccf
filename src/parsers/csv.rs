//! Delimiter-separated text parsing (CSV and TSV).
//!
//! Rules:
//!
//! - A header row is required; it defines column names and count.
//! - Column types are inferred from the first data row, which is then replayed
//!   into the stream.
//! - A header-only file yields an all-string schema and an empty stream.
//!
//! Rows are streamed record-by-record; the file never has to fit in memory.

use std::io::BufRead;

use crate::error::{ParseError, SourceError};
use crate::types::{DataType, Field, Schema};

use super::infer::{infer_type, typed_row};
use super::{FormatParser, ParsedSource};

/// Parser for delimiter-separated text with a header row.
pub struct CsvParser {
    delimiter: u8,
}

impl CsvParser {
    /// Comma-separated variant (`.csv`).
    pub fn comma() -> Self {
        Self { delimiter: b',' }
    }

    /// Tab-separated variant (`.tsv`).
    pub fn tab() -> Self {
        Self { delimiter: b'\t' }
    }
}

impl FormatParser for CsvParser {
    fn parse(&self, input: Box<dyn BufRead>) -> Result<ParsedSource, SourceError> {
        let mut rdr = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .from_reader(input);

        let headers: Vec<String> = rdr
            .headers()
            .map_err(classify)?
            .iter()
            .map(str::to_owned)
            .collect();
        if headers.is_empty() {
            return Err(ParseError::new("missing header row").into());
        }

        let mut records = rdr.into_records();
        let first = records.next().transpose().map_err(classify)?;

        let schema = match &first {
            Some(record) => Schema::new(
                headers
                    .iter()
                    .zip(record.iter())
                    .map(|(name, raw)| Field::new(name, infer_type(raw)))
                    .collect(),
            ),
            None => Schema::new(
                headers
                    .iter()
                    .map(|name| Field::new(name, DataType::Utf8))
                    .collect(),
            ),
        };

        let row_schema = schema.clone();
        let rows = first.map(Ok).into_iter().chain(records).map(move |result| {
            let record = result.map_err(classify)?;
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            // StringRecordIter is not ExactSizeIterator; collect so typed_row can check arity.
            let cells: Vec<&str> = record.iter().collect();
            typed_row(line, &row_schema, cells.into_iter()).map_err(SourceError::from)
        });

        Ok(ParsedSource {
            schema,
            rows: Box::new(rows),
        })
    }
}

/// Split a `csv` crate error into the recoverable/fatal taxonomy: underlying
/// I/O failures abort the run, everything else is malformed content.
fn classify(e: ::csv::Error) -> SourceError {
    let line = e.position().map(|p| p.line());
    let message = e.to_string();
    match e.into_kind() {
        ::csv::ErrorKind::Io(io) => SourceError::Io(io),
        _ => SourceError::Parse(ParseError { message, line }),
    }
}
