//! Aggregation over the unified row stream.
//!
//! Two variants share the same input contract (unified schema + single-pass
//! row stream) and differ in output: [`basic`] merges and sorts, [`advanced`]
//! groups by a composite key and summarizes. Which columns act as keys and
//! which metrics apply is configuration, not inference.

pub mod advanced;
pub mod basic;

pub use advanced::{AdvancedAggregator, AdvancedOptions, Metric, MetricSpec};
pub use basic::{BasicAggregator, BasicOptions};

use std::cmp::Ordering;

use crate::error::{PipelineError, PipelineResult};
use crate::types::{Row, Schema, Value};

/// Final output of an aggregation run: output schema plus ordered rows, ready
/// for serialization.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregationResult {
    /// Output column names and types.
    pub schema: Schema,
    /// Result rows aligned to `schema`, in output order.
    pub rows: Vec<Row>,
}

/// A [`Value`] with the total order of [`Value::cmp_total`], usable as a sort
/// or `BTreeMap` key.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct OrdValue(pub Value);

impl Eq for OrdValue {}

impl PartialOrd for OrdValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrdValue {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp_total(&other.0)
    }
}

/// Resolve key column names to unified-schema indices.
///
/// A configured key column absent from the schema stays `None` and compares as
/// null for every row, so a bad key sorts everything equal instead of failing.
pub(crate) fn key_indices(schema: &Schema, keys: &[String]) -> Vec<Option<usize>> {
    keys.iter().map(|k| schema.index_of(k)).collect()
}

/// Extract the composite key of one row.
pub(crate) fn key_of(row: &Row, indices: &[Option<usize>]) -> Vec<OrdValue> {
    indices
        .iter()
        .map(|idx| OrdValue(idx.and_then(|i| row.get(i).cloned()).unwrap_or(Value::Null)))
        .collect()
}

/// Enforce the unified-schema arity invariant. A violation is a unifier bug
/// and aborts the run.
pub(crate) fn check_arity(row: &Row, schema: &Schema) -> PipelineResult<()> {
    if row.len() != schema.width() {
        return Err(PipelineError::Integrity {
            got: row.len(),
            want: schema.width(),
        });
    }
    Ok(())
}
