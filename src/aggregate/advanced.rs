//! Advanced aggregation: composite-key grouping with summary metrics.
//!
//! One pass over the unified row stream maintains a map from composite group
//! key to per-metric accumulators; finalization turns each group into one
//! output row. Groups are kept in a `BTreeMap` over the total value order, so
//! output rows come out sorted by key and the result is identical for equal
//! input multisets regardless of row arrival order.

use std::collections::BTreeMap;

use crate::error::PipelineResult;
use crate::types::{DataType, Field, Row, Schema, Value};

use super::{AggregationResult, OrdValue, check_arity, key_indices, key_of};

/// Summary metric applied to one column within each group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Count of rows in the group (nulls included).
    Count,
    /// Sum of numeric values, ignoring nulls. All-null groups yield null.
    Sum,
    /// Minimum non-null value under the total value order.
    Min,
    /// Maximum non-null value under the total value order.
    Max,
}

impl Metric {
    fn suffix(self) -> &'static str {
        match self {
            Metric::Count => "count",
            Metric::Sum => "sum",
            Metric::Min => "min",
            Metric::Max => "max",
        }
    }
}

/// One configured metric: which column, which summary.
#[derive(Debug, Clone)]
pub struct MetricSpec {
    /// Input column the metric reads.
    pub column: String,
    /// Summary to compute.
    pub metric: Metric,
}

impl MetricSpec {
    /// Create a metric spec.
    pub fn new(column: impl Into<String>, metric: Metric) -> Self {
        Self {
            column: column.into(),
            metric,
        }
    }
}

/// Configuration for the advanced variant.
///
/// Which columns form the group key and which metrics are computed is a
/// configuration decision; nothing is inferred from column names.
#[derive(Debug, Clone, Default)]
pub struct AdvancedOptions {
    /// Columns forming the composite group key, in output order. Empty groups
    /// every row into one global group.
    pub group_by: Vec<String>,
    /// Metrics to compute per group. Empty defaults to [`Metric::Sum`] over
    /// every non-key numeric column, sorted by column name so the output
    /// schema does not depend on file processing order.
    pub metrics: Vec<MetricSpec>,
}

/// Accumulates the unified row stream into per-group metric state.
pub struct AdvancedAggregator {
    input_schema: Schema,
    key_columns: Vec<String>,
    key_indices: Vec<Option<usize>>,
    metrics: Vec<BoundMetric>,
    groups: BTreeMap<Vec<OrdValue>, Vec<MetricAcc>>,
}

struct BoundMetric {
    index: Option<usize>,
    metric: Metric,
    column_type: DataType,
    output_field: Field,
}

impl AdvancedAggregator {
    /// Create an aggregator for the given unified schema.
    pub fn new(schema: Schema, options: &AdvancedOptions) -> Self {
        let key_columns = options.group_by.clone();
        let indices = key_indices(&schema, &key_columns);

        let specs = if options.metrics.is_empty() {
            default_metrics(&schema, &key_columns)
        } else {
            options.metrics.clone()
        };
        let metrics = specs.iter().map(|spec| bind_metric(&schema, spec)).collect();

        Self {
            input_schema: schema,
            key_columns,
            key_indices: indices,
            metrics,
            groups: BTreeMap::new(),
        }
    }

    /// Output schema: key columns in configured order, then one column per
    /// metric named `{column}_{metric}`.
    pub fn output_schema(&self) -> Schema {
        let mut fields: Vec<Field> = self
            .key_columns
            .iter()
            .zip(&self.key_indices)
            .map(|(name, idx)| {
                let data_type = idx
                    .map(|i| self.input_schema.fields[i].data_type)
                    .unwrap_or(DataType::Utf8);
                Field::new(name.clone(), data_type)
            })
            .collect();
        fields.extend(self.metrics.iter().map(|m| m.output_field.clone()));
        Schema::new(fields)
    }

    /// Fold one unified row into its group's accumulators.
    pub fn push(&mut self, row: Row) -> PipelineResult<()> {
        check_arity(&row, &self.input_schema)?;
        let key = key_of(&row, &self.key_indices);
        let accs = self
            .groups
            .entry(key)
            .or_insert_with(|| self.metrics.iter().map(BoundMetric::fresh_acc).collect());
        for (bound, acc) in self.metrics.iter().zip(accs.iter_mut()) {
            let value = bound
                .index
                .and_then(|i| row.get(i))
                .unwrap_or(&Value::Null);
            acc.update(value);
        }
        Ok(())
    }

    /// Finalize: one row per group, sorted ascending by composite key.
    pub fn finish(self) -> AggregationResult {
        let schema = self.output_schema();
        let rows = self
            .groups
            .into_iter()
            .map(|(key, accs)| {
                let mut row: Row = key.into_iter().map(|k| k.0).collect();
                row.extend(accs.into_iter().map(MetricAcc::finish));
                row
            })
            .collect();
        AggregationResult { schema, rows }
    }
}

/// Default metric set: sum every non-key numeric column, sorted by name.
fn default_metrics(schema: &Schema, key_columns: &[String]) -> Vec<MetricSpec> {
    let mut columns: Vec<&str> = schema
        .fields
        .iter()
        .filter(|f| f.data_type.is_numeric() && !key_columns.contains(&f.name))
        .map(|f| f.name.as_str())
        .collect();
    columns.sort_unstable();
    columns
        .into_iter()
        .map(|c| MetricSpec::new(c, Metric::Sum))
        .collect()
}

fn bind_metric(schema: &Schema, spec: &MetricSpec) -> BoundMetric {
    let index = schema.index_of(&spec.column);
    let column_type = index
        .map(|i| schema.fields[i].data_type)
        .unwrap_or(DataType::Utf8);
    let output_type = match spec.metric {
        Metric::Count => DataType::Int64,
        Metric::Sum => {
            if column_type == DataType::Int64 {
                DataType::Int64
            } else {
                DataType::Float64
            }
        }
        Metric::Min | Metric::Max => column_type,
    };
    BoundMetric {
        index,
        metric: spec.metric,
        column_type,
        output_field: Field::new(
            format!("{}_{}", spec.column, spec.metric.suffix()),
            output_type,
        ),
    }
}

impl BoundMetric {
    fn fresh_acc(&self) -> MetricAcc {
        match self.metric {
            Metric::Count => MetricAcc::Count(0),
            Metric::Sum => {
                if self.column_type == DataType::Int64 {
                    MetricAcc::SumInt(None)
                } else {
                    MetricAcc::SumFloat(None)
                }
            }
            Metric::Min => MetricAcc::Min(None),
            Metric::Max => MetricAcc::Max(None),
        }
    }
}

/// Per-group mutable metric state.
enum MetricAcc {
    Count(i64),
    SumInt(Option<i64>),
    SumFloat(Option<f64>),
    Min(Option<Value>),
    Max(Option<Value>),
}

impl MetricAcc {
    fn update(&mut self, value: &Value) {
        match self {
            MetricAcc::Count(n) => *n += 1,
            MetricAcc::SumInt(acc) => {
                if let Value::Int64(v) = value {
                    *acc = Some(acc.unwrap_or(0) + v);
                }
            }
            MetricAcc::SumFloat(acc) => {
                if let Some(v) = value.as_f64() {
                    *acc = Some(acc.unwrap_or(0.0) + v);
                }
            }
            MetricAcc::Min(best) => {
                if !value.is_null()
                    && best
                        .as_ref()
                        .is_none_or(|b| value.cmp_total(b).is_lt())
                {
                    *best = Some(value.clone());
                }
            }
            MetricAcc::Max(best) => {
                if !value.is_null()
                    && best
                        .as_ref()
                        .is_none_or(|b| value.cmp_total(b).is_gt())
                {
                    *best = Some(value.clone());
                }
            }
        }
    }

    fn finish(self) -> Value {
        match self {
            MetricAcc::Count(n) => Value::Int64(n),
            MetricAcc::SumInt(acc) => acc.map(Value::Int64).unwrap_or(Value::Null),
            MetricAcc::SumFloat(acc) => acc.map(Value::Float64).unwrap_or(Value::Null),
            MetricAcc::Min(best) | MetricAcc::Max(best) => best.unwrap_or(Value::Null),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    fn sales_schema() -> Schema {
        Schema::new(vec![
            Field::new("region", DataType::Utf8),
            Field::new("product", DataType::Utf8),
            Field::new("amount", DataType::Int64),
            Field::new("score", DataType::Float64),
        ])
    }

    fn row(region: &str, product: &str, amount: i64, score: f64) -> Row {
        vec![
            Value::Utf8(region.into()),
            Value::Utf8(product.into()),
            Value::Int64(amount),
            Value::Float64(score),
        ]
    }

    #[test]
    fn groups_by_composite_key_and_sums() {
        let options = AdvancedOptions {
            group_by: vec!["region".into(), "product".into()],
            metrics: vec![],
        };
        let mut agg = AdvancedAggregator::new(sales_schema(), &options);
        agg.push(row("east", "widget", 10, 1.0)).unwrap();
        agg.push(row("east", "widget", 5, 2.0)).unwrap();
        agg.push(row("west", "widget", 7, 3.0)).unwrap();

        let result = agg.finish();
        let names: Vec<&str> = result.schema.field_names().collect();
        // Default metrics sort by column name: amount before score.
        assert_eq!(names, vec!["region", "product", "amount_sum", "score_sum"]);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(
            result.rows[0],
            vec![
                Value::Utf8("east".into()),
                Value::Utf8("widget".into()),
                Value::Int64(15),
                Value::Float64(3.0)
            ]
        );
    }

    #[test]
    fn explicit_metrics_apply_in_config_order() {
        let options = AdvancedOptions {
            group_by: vec!["region".into()],
            metrics: vec![
                MetricSpec::new("amount", Metric::Count),
                MetricSpec::new("amount", Metric::Max),
                MetricSpec::new("score", Metric::Min),
            ],
        };
        let mut agg = AdvancedAggregator::new(sales_schema(), &options);
        agg.push(row("east", "widget", 10, 1.5)).unwrap();
        agg.push(row("east", "gadget", 3, 0.5)).unwrap();

        let result = agg.finish();
        let names: Vec<&str> = result.schema.field_names().collect();
        assert_eq!(names, vec!["region", "amount_count", "amount_max", "score_min"]);
        assert_eq!(
            result.rows[0],
            vec![
                Value::Utf8("east".into()),
                Value::Int64(2),
                Value::Int64(10),
                Value::Float64(0.5)
            ]
        );
    }

    #[test]
    fn result_is_invariant_under_row_order() {
        let options = AdvancedOptions {
            group_by: vec!["region".into()],
            metrics: vec![],
        };
        let rows = vec![
            row("west", "w", 1, 1.0),
            row("east", "w", 2, 2.0),
            row("east", "w", 3, 3.0),
        ];

        let mut forward = AdvancedAggregator::new(sales_schema(), &options);
        for r in rows.clone() {
            forward.push(r).unwrap();
        }
        let mut backward = AdvancedAggregator::new(sales_schema(), &options);
        for r in rows.into_iter().rev() {
            backward.push(r).unwrap();
        }

        assert_eq!(forward.finish(), backward.finish());
    }

    #[test]
    fn sum_ignores_nulls_and_all_null_groups_yield_null() {
        let schema = Schema::new(vec![
            Field::new("k", DataType::Utf8),
            Field::new("v", DataType::Int64),
        ]);
        let options = AdvancedOptions {
            group_by: vec!["k".into()],
            metrics: vec![MetricSpec::new("v", Metric::Sum)],
        };
        let mut agg = AdvancedAggregator::new(schema, &options);
        agg.push(vec![Value::Utf8("a".into()), Value::Int64(1)]).unwrap();
        agg.push(vec![Value::Utf8("a".into()), Value::Null]).unwrap();
        agg.push(vec![Value::Utf8("b".into()), Value::Null]).unwrap();

        let result = agg.finish();
        assert_eq!(result.rows[0][1], Value::Int64(1));
        assert_eq!(result.rows[1][1], Value::Null);
    }

    #[test]
    fn empty_group_by_collapses_to_one_global_group() {
        let options = AdvancedOptions {
            group_by: vec![],
            metrics: vec![MetricSpec::new("amount", Metric::Sum)],
        };
        let mut agg = AdvancedAggregator::new(sales_schema(), &options);
        agg.push(row("east", "w", 1, 0.0)).unwrap();
        agg.push(row("west", "w", 2, 0.0)).unwrap();

        let result = agg.finish();
        assert_eq!(result.rows, vec![vec![Value::Int64(3)]]);
    }

    #[test]
    fn wrong_arity_is_a_fatal_integrity_error() {
        let mut agg = AdvancedAggregator::new(sales_schema(), &AdvancedOptions::default());
        let err = agg.push(vec![Value::Int64(1)]).unwrap_err();
        assert!(matches!(err, PipelineError::Integrity { got: 1, want: 4 }));
    }
}
