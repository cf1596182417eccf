//! Column type inference and cell coercion for text formats.
//!
//! CSV and fixed-width files carry no type declarations, so those parsers
//! guess each column's type from the first data row. Integer is tried before
//! float because every integer literal also parses as a float.

use chrono::NaiveDate;

use crate::error::ParseError;
use crate::types::{DATE_FORMAT, DataType, Row, Schema, Value};

/// Guess the type of one raw cell.
///
/// Empty cells give no information and default to [`DataType::Utf8`].
pub fn infer_type(raw: &str) -> DataType {
    let trimmed = raw.trim();
    if trimmed.parse::<i64>().is_ok() {
        return DataType::Int64;
    }
    if trimmed.parse::<f64>().is_ok() {
        return DataType::Float64;
    }
    if trimmed.eq_ignore_ascii_case("true") || trimmed.eq_ignore_ascii_case("false") {
        return DataType::Bool;
    }
    if NaiveDate::parse_from_str(trimmed, DATE_FORMAT).is_ok() {
        return DataType::Date;
    }
    DataType::Utf8
}

/// Convert one raw cell into a typed value. Empty cells become null.
pub fn parse_cell(
    line: u64,
    column: &str,
    data_type: DataType,
    raw: &str,
) -> Result<Value, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }

    let mismatch = |expected: &str| {
        ParseError::at_line(
            format!("column '{column}': expected {expected}, got '{trimmed}'"),
            line,
        )
    };

    match data_type {
        DataType::Utf8 => Ok(Value::Utf8(trimmed.to_owned())),
        DataType::Int64 => trimmed
            .parse::<i64>()
            .map(Value::Int64)
            .map_err(|_| mismatch("integer")),
        DataType::Float64 => trimmed
            .parse::<f64>()
            .map(Value::Float64)
            .map_err(|_| mismatch("number")),
        DataType::Bool => {
            if trimmed.eq_ignore_ascii_case("true") {
                Ok(Value::Bool(true))
            } else if trimmed.eq_ignore_ascii_case("false") {
                Ok(Value::Bool(false))
            } else {
                Err(mismatch("bool (true/false)"))
            }
        }
        DataType::Date => NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
            .map(Value::Date)
            .map_err(|_| mismatch("date (yyyy-mm-dd)")),
    }
}

/// Convert a full raw row against a schema, checking arity.
pub fn typed_row<'a, I>(line: u64, schema: &Schema, cells: I) -> Result<Row, ParseError>
where
    I: ExactSizeIterator<Item = &'a str>,
{
    if cells.len() != schema.width() {
        return Err(ParseError::at_line(
            format!("expected {} values, found {}", schema.width(), cells.len()),
            line,
        ));
    }
    schema
        .fields
        .iter()
        .zip(cells)
        .map(|(field, raw)| parse_cell(line, &field.name, field.data_type, raw))
        .collect()
}
