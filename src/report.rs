//! TSV report serialization.
//!
//! The first line is the header (output schema column names in order);
//! each following line is one row, fields separated by a tab. Values use
//! their default string conversion; null renders as an empty field.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::aggregate::AggregationResult;
use crate::error::PipelineResult;

/// Write an aggregation result as tab-separated text.
pub fn write_tsv<W: Write>(mut out: W, result: &AggregationResult) -> PipelineResult<()> {
    let header: Vec<&str> = result.schema.field_names().collect();
    writeln!(out, "{}", header.join("\t"))?;
    for row in &result.rows {
        let fields: Vec<String> = row.iter().map(ToString::to_string).collect();
        writeln!(out, "{}", fields.join("\t"))?;
    }
    out.flush()?;
    Ok(())
}

/// Write an aggregation result as a TSV file at `path`, replacing any
/// existing file.
pub fn write_tsv_to_path(path: impl AsRef<Path>, result: &AggregationResult) -> PipelineResult<()> {
    let file = File::create(path)?;
    write_tsv(BufWriter::new(file), result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DataType, Field, Schema, Value};

    #[test]
    fn header_then_rows_with_empty_fields_for_null() {
        let result = AggregationResult {
            schema: Schema::new(vec![
                Field::new("id", DataType::Int64),
                Field::new("name", DataType::Utf8),
            ]),
            rows: vec![
                vec![Value::Int64(1), Value::Utf8("x".into())],
                vec![Value::Int64(2), Value::Null],
            ],
        };

        let mut buf = Vec::new();
        write_tsv(&mut buf, &result).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "id\tname\n1\tx\n2\t\n");
    }
}
