//! JSON and NDJSON parsing.
//!
//! Supported inputs:
//!
//! - a JSON array of objects: `[{"a":1}, {"a":2}]`
//! - an object wrapping the rows under a `fields` key: `{"fields": [...]}`
//! - a single object (one row)
//! - newline-delimited objects (NDJSON)
//!
//! The schema comes from the first object: key order defines column order and
//! each value's JSON type maps onto a column type. Strings in the `yyyy-mm-dd`
//! format become date columns. Objects after the first may omit keys; missing
//! keys yield null.

use std::io::BufRead;

use serde_json::Value as JsonValue;

use chrono::NaiveDate;

use crate::error::{ParseError, SourceError};
use crate::types::{DATE_FORMAT, DataType, Field, Row, Schema, Value};

use super::{FormatParser, ParsedSource};

/// Parser for JSON array-of-objects / NDJSON files.
pub struct JsonParser;

impl FormatParser for JsonParser {
    fn parse(&self, mut input: Box<dyn BufRead>) -> Result<ParsedSource, SourceError> {
        let mut text = String::new();
        input.read_to_string(&mut text).map_err(|e| {
            if e.kind() == std::io::ErrorKind::InvalidData {
                SourceError::Parse(ParseError::new("file is not valid utf-8"))
            } else {
                SourceError::Io(e)
            }
        })?;

        let objects = parse_document(&text)?;
        if objects.is_empty() {
            return Err(ParseError::new("no rows to infer a schema from").into());
        }

        let schema = infer_schema(&objects[0])?;

        let row_schema = schema.clone();
        let rows = objects
            .into_iter()
            .enumerate()
            .map(move |(idx0, obj)| row_from_object(idx0 + 1, &row_schema, &obj).map_err(SourceError::from));

        Ok(ParsedSource {
            schema,
            rows: Box::new(rows),
        })
    }
}

type JsonObject = serde_json::Map<String, JsonValue>;

fn parse_document(text: &str) -> Result<Vec<JsonObject>, ParseError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ParseError::new("json input is empty"));
    }

    // A single JSON value first; fall back to NDJSON if that fails.
    if let Ok(v) = serde_json::from_str::<JsonValue>(trimmed) {
        match v {
            JsonValue::Array(items) => objects_from_items(items),
            JsonValue::Object(mut map) => match map.remove("fields") {
                Some(JsonValue::Array(items)) => objects_from_items(items),
                Some(_) => Err(ParseError::new("'fields' must be an array of objects")),
                None => Ok(vec![map]),
            },
            _ => Err(ParseError::new(
                "json must be an object, an array of objects, or NDJSON",
            )),
        }
    } else {
        let mut objects = Vec::new();
        for (i, line) in trimmed.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<JsonValue>(line) {
                Ok(JsonValue::Object(map)) => objects.push(map),
                Ok(_) => {
                    return Err(ParseError::at_line(
                        "ndjson line is not an object".to_string(),
                        i as u64 + 1,
                    ));
                }
                Err(e) => {
                    return Err(ParseError::at_line(format!("invalid ndjson: {e}"), i as u64 + 1));
                }
            }
        }
        Ok(objects)
    }
}

fn objects_from_items(items: Vec<JsonValue>) -> Result<Vec<JsonObject>, ParseError> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, v)| match v {
            JsonValue::Object(map) => Ok(map),
            _ => Err(ParseError::new(format!("row {} is not a json object", i + 1))),
        })
        .collect()
}

fn infer_schema(first: &JsonObject) -> Result<Schema, ParseError> {
    let mut fields = Vec::with_capacity(first.len());
    for (name, value) in first {
        let data_type = match value {
            JsonValue::Null => DataType::Utf8,
            JsonValue::Bool(_) => DataType::Bool,
            JsonValue::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    DataType::Int64
                } else {
                    DataType::Float64
                }
            }
            JsonValue::String(s) => {
                if NaiveDate::parse_from_str(s, DATE_FORMAT).is_ok() {
                    DataType::Date
                } else {
                    DataType::Utf8
                }
            }
            JsonValue::Array(_) | JsonValue::Object(_) => {
                return Err(ParseError::new(format!(
                    "column '{name}': nested values are not supported"
                )));
            }
        };
        fields.push(Field::new(name.clone(), data_type));
    }
    Ok(Schema::new(fields))
}

fn row_from_object(row_num: usize, schema: &Schema, obj: &JsonObject) -> Result<Row, ParseError> {
    schema
        .fields
        .iter()
        .map(|field| match obj.get(&field.name) {
            None | Some(JsonValue::Null) => Ok(Value::Null),
            Some(v) => convert_value(row_num, &field.name, field.data_type, v),
        })
        .collect()
}

fn convert_value(
    row_num: usize,
    column: &str,
    data_type: DataType,
    v: &JsonValue,
) -> Result<Value, ParseError> {
    let mismatch = |expected: &str| {
        ParseError::new(format!("row {row_num} column '{column}': expected {expected}, got {v}"))
    };

    match data_type {
        DataType::Utf8 => v
            .as_str()
            .map(|s| Value::Utf8(s.to_owned()))
            .ok_or_else(|| mismatch("string")),
        DataType::Bool => v.as_bool().map(Value::Bool).ok_or_else(|| mismatch("bool")),
        DataType::Int64 => v
            .as_i64()
            .map(Value::Int64)
            .ok_or_else(|| mismatch("integer")),
        DataType::Float64 => v
            .as_f64()
            .map(Value::Float64)
            .ok_or_else(|| mismatch("number")),
        DataType::Date => v
            .as_str()
            .and_then(|s| NaiveDate::parse_from_str(s, DATE_FORMAT).ok())
            .map(Value::Date)
            .ok_or_else(|| mismatch("date (yyyy-mm-dd)")),
    }
}
