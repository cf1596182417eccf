//! Basic aggregation: merge-and-sort pass-through.
//!
//! Every unified row appears in the output once, sorted ascending by the
//! configured key columns. The sort is stable, so ties keep first-seen order.

use crate::error::PipelineResult;
use crate::types::{Row, Schema};

use super::{AggregationResult, OrdValue, check_arity, key_indices, key_of};

/// Configuration for the basic variant.
#[derive(Debug, Clone, Default)]
pub struct BasicOptions {
    /// Columns to sort by, in precedence order. Empty means sort by every
    /// unified column left-to-right.
    pub sort_by: Vec<String>,
}

/// Accumulates the unified row stream and emits it sorted.
pub struct BasicAggregator {
    schema: Schema,
    indices: Vec<Option<usize>>,
    rows: Vec<(Vec<OrdValue>, Row)>,
}

impl BasicAggregator {
    /// Create an aggregator for the given unified schema.
    pub fn new(schema: Schema, options: &BasicOptions) -> Self {
        let keys: Vec<String> = if options.sort_by.is_empty() {
            schema.field_names().map(str::to_owned).collect()
        } else {
            options.sort_by.clone()
        };
        let indices = key_indices(&schema, &keys);
        Self {
            schema,
            indices,
            rows: Vec::new(),
        }
    }

    /// Fold one unified row into the accumulator.
    pub fn push(&mut self, row: Row) -> PipelineResult<()> {
        check_arity(&row, &self.schema)?;
        let key = key_of(&row, &self.indices);
        self.rows.push((key, row));
        Ok(())
    }

    /// Finalize: rows sorted ascending by key, ties in first-seen order.
    pub fn finish(mut self) -> AggregationResult {
        self.rows.sort_by(|a, b| a.0.cmp(&b.0));
        AggregationResult {
            schema: self.schema,
            rows: self.rows.into_iter().map(|(_, row)| row).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::types::{DataType, Field, Value};

    fn schema() -> Schema {
        Schema::new(vec![
            Field::new("id", DataType::Int64),
            Field::new("name", DataType::Utf8),
        ])
    }

    #[test]
    fn output_is_sorted_by_configured_key() {
        let options = BasicOptions {
            sort_by: vec!["id".to_string()],
        };
        let mut agg = BasicAggregator::new(schema(), &options);
        agg.push(vec![Value::Int64(2), Value::Utf8("b".into())]).unwrap();
        agg.push(vec![Value::Int64(1), Value::Utf8("a".into())]).unwrap();

        let result = agg.finish();
        assert_eq!(result.rows[0][0], Value::Int64(1));
        assert_eq!(result.rows[1][0], Value::Int64(2));
    }

    #[test]
    fn ties_keep_first_seen_order() {
        let options = BasicOptions {
            sort_by: vec!["id".to_string()],
        };
        let mut agg = BasicAggregator::new(schema(), &options);
        agg.push(vec![Value::Int64(1), Value::Utf8("first".into())]).unwrap();
        agg.push(vec![Value::Int64(1), Value::Utf8("second".into())]).unwrap();

        let result = agg.finish();
        assert_eq!(result.rows[0][1], Value::Utf8("first".into()));
        assert_eq!(result.rows[1][1], Value::Utf8("second".into()));
    }

    #[test]
    fn null_keys_sort_before_values() {
        let options = BasicOptions {
            sort_by: vec!["id".to_string()],
        };
        let mut agg = BasicAggregator::new(schema(), &options);
        agg.push(vec![Value::Int64(1), Value::Utf8("a".into())]).unwrap();
        agg.push(vec![Value::Null, Value::Utf8("padded".into())]).unwrap();

        let result = agg.finish();
        assert_eq!(result.rows[0][0], Value::Null);
    }

    #[test]
    fn wrong_arity_is_a_fatal_integrity_error() {
        let mut agg = BasicAggregator::new(schema(), &BasicOptions::default());
        let err = agg.push(vec![Value::Int64(1)]).unwrap_err();
        assert!(matches!(err, PipelineError::Integrity { got: 1, want: 2 }));
    }

    #[test]
    fn unknown_sort_column_leaves_input_order() {
        let options = BasicOptions {
            sort_by: vec!["missing".to_string()],
        };
        let mut agg = BasicAggregator::new(schema(), &options);
        agg.push(vec![Value::Int64(2), Value::Utf8("b".into())]).unwrap();
        agg.push(vec![Value::Int64(1), Value::Utf8("a".into())]).unwrap();

        let result = agg.finish();
        assert_eq!(result.rows[0][0], Value::Int64(2));
    }
}
