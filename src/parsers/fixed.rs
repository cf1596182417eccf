//! Fixed-width text parsing.
//!
//! Column boundaries come from the header line: each column starts at its
//! header token's offset and runs to the start of the next token (the last
//! column runs to end of line). Cells are trimmed, so values narrower than
//! their column are fine; values must not spill into the next column.
//!
//! ```text
//! id  name    amount
//! 1   widget  10.5
//! 2   gadget  3
//! ```
//!
//! Types are inferred from the first data line; lines are streamed one at a
//! time and blank lines are ignored.

use std::io::BufRead;

use crate::error::{ParseError, SourceError};
use crate::types::{DataType, Field, Schema};

use super::infer::{infer_type, typed_row};
use super::{FormatParser, ParsedSource};

/// Parser for fixed-width text with a header line (`.fwf`).
pub struct FixedWidthParser;

impl FormatParser for FixedWidthParser {
    fn parse(&self, input: Box<dyn BufRead>) -> Result<ParsedSource, SourceError> {
        let mut lines = input.lines();

        let header = match lines.next() {
            Some(line) => line?,
            None => return Err(ParseError::new("missing header line").into()),
        };
        let columns = header_columns(&header);
        if columns.is_empty() {
            return Err(ParseError::new("header line has no column names").into());
        }
        let starts: Vec<usize> = columns.iter().map(|(_, start)| *start).collect();

        let first = lines.next().transpose()?;

        let schema = match &first {
            Some(line) => {
                let cells = split_at_offsets(line, &starts);
                Schema::new(
                    columns
                        .iter()
                        .zip(&cells)
                        .map(|((name, _), raw)| Field::new(name.clone(), infer_type(raw)))
                        .collect(),
                )
            }
            None => Schema::new(
                columns
                    .iter()
                    .map(|(name, _)| Field::new(name.clone(), DataType::Utf8))
                    .collect(),
            ),
        };

        let row_schema = schema.clone();
        let rows = first
            .map(Ok)
            .into_iter()
            .chain(lines)
            .enumerate()
            .filter_map(move |(idx0, result)| {
                let line = match result {
                    Ok(line) => line,
                    Err(e) => return Some(Err(SourceError::Io(e))),
                };
                if line.trim().is_empty() {
                    return None;
                }
                let cells = split_at_offsets(&line, &starts);
                Some(
                    typed_row(
                        idx0 as u64 + 2,
                        &row_schema,
                        cells.iter().map(String::as_str),
                    )
                    .map_err(SourceError::from),
                )
            });

        Ok(ParsedSource {
            schema,
            rows: Box::new(rows),
        })
    }
}

/// Header tokens with their starting character offsets.
fn header_columns(header: &str) -> Vec<(String, usize)> {
    let mut columns = Vec::new();
    let mut current: Option<(String, usize)> = None;
    for (offset, ch) in header.chars().enumerate() {
        if ch.is_whitespace() {
            if let Some(col) = current.take() {
                columns.push(col);
            }
        } else {
            match current.as_mut() {
                Some((name, _)) => name.push(ch),
                None => current = Some((ch.to_string(), offset)),
            }
        }
    }
    if let Some(col) = current {
        columns.push(col);
    }
    columns
}

/// Slice a line into trimmed cells at the given character offsets.
///
/// A line shorter than the header produces empty (null) trailing cells, so the
/// cell count always matches the column count.
fn split_at_offsets(line: &str, starts: &[usize]) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let start = start.min(chars.len());
            let end = starts
                .get(i + 1)
                .copied()
                .unwrap_or(chars.len())
                .clamp(start, chars.len());
            chars[start..end].iter().collect::<String>().trim().to_owned()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_columns_tracks_token_offsets() {
        let cols = header_columns("id  name    amount");
        assert_eq!(
            cols,
            vec![
                ("id".to_string(), 0),
                ("name".to_string(), 4),
                ("amount".to_string(), 12)
            ]
        );
    }

    #[test]
    fn split_pads_short_lines_with_empty_cells() {
        let cells = split_at_offsets("1   wid", &[0, 4, 12]);
        assert_eq!(cells, vec!["1", "wid", ""]);
    }
}
