//! Core data model types shared by the whole pipeline.
//!
//! Parsers produce a per-file [`Schema`] plus [`Row`]s aligned to it; the
//! unifier reconciles those schemas into one; aggregators consume rows that
//! conform to the unified schema.

use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;

/// On-wire format for [`DataType::Date`] values.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Logical data type for a schema column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// 64-bit signed integer.
    Int64,
    /// 64-bit floating point number.
    Float64,
    /// Boolean.
    Bool,
    /// Calendar date (no time component).
    Date,
    /// UTF-8 string.
    Utf8,
}

impl DataType {
    /// Resolve a type conflict between two declarations of the same column.
    ///
    /// The more general type wins: equal types are kept, integer and float
    /// widen to float, and any other mixed pair falls back to [`Self::Utf8`].
    pub fn widen(self, other: DataType) -> DataType {
        match (self, other) {
            (a, b) if a == b => a,
            (DataType::Int64, DataType::Float64) | (DataType::Float64, DataType::Int64) => {
                DataType::Float64
            }
            _ => DataType::Utf8,
        }
    }

    /// Whether values of this type participate in numeric aggregation.
    pub fn is_numeric(self) -> bool {
        matches!(self, DataType::Int64 | DataType::Float64)
    }
}

/// A single named, typed column in a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Column name. Unique within a schema.
    pub name: String,
    /// Declared column type.
    pub data_type: DataType,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
        }
    }
}

/// An ordered list of columns describing the shape of one data source.
///
/// Insertion order is significant: it defines output column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    /// Ordered list of fields.
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema from fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Self { fields }
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.fields.len()
    }

    /// Iterate column names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }

    /// Returns the index of a column by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }
}

/// A single typed cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Missing/empty value. Renders as an empty field in TSV output.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// Calendar date.
    Date(NaiveDate),
    /// UTF-8 string.
    Utf8(String),
}

impl Value {
    /// Whether this value is the null sentinel.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int64(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            _ => None,
        }
    }

    /// Total order over values, used for report sorting and group keys.
    ///
    /// Null sorts before everything. Integers and floats compare numerically
    /// across the two types (a widened float column can still hold integer
    /// values from an integer-typed source). Otherwise values order by type,
    /// then by payload; floats use `total_cmp`.
    pub fn cmp_total(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Null, Value::Null) => Ordering::Equal,
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Int64(a), Value::Int64(b)) => a.cmp(b),
            (Value::Float64(a), Value::Float64(b)) => a.total_cmp(b),
            (Value::Int64(a), Value::Float64(b)) => (*a as f64).total_cmp(b),
            (Value::Float64(a), Value::Int64(b)) => a.total_cmp(&(*b as f64)),
            (Value::Date(a), Value::Date(b)) => a.cmp(b),
            (Value::Utf8(a), Value::Utf8(b)) => a.cmp(b),
            _ => self.type_rank().cmp(&other.type_rank()),
        }
    }

    fn type_rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Int64(_) | Value::Float64(_) => 2,
            Value::Date(_) => 3,
            Value::Utf8(_) => 4,
        }
    }
}

impl fmt::Display for Value {
    /// Default string conversion used by the TSV sink. Null is empty.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Int64(v) => write!(f, "{v}"),
            Value::Float64(v) => write!(f, "{v}"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Date(v) => write!(f, "{}", v.format(DATE_FORMAT)),
            Value::Utf8(v) => f.write_str(v),
        }
    }
}

/// One record's values, positionally aligned to a schema.
pub type Row = Vec<Value>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widen_keeps_equal_types() {
        assert_eq!(DataType::Int64.widen(DataType::Int64), DataType::Int64);
        assert_eq!(DataType::Date.widen(DataType::Date), DataType::Date);
    }

    #[test]
    fn widen_promotes_int_and_float_to_float() {
        assert_eq!(DataType::Int64.widen(DataType::Float64), DataType::Float64);
        assert_eq!(DataType::Float64.widen(DataType::Int64), DataType::Float64);
    }

    #[test]
    fn widen_falls_back_to_utf8_for_other_conflicts() {
        assert_eq!(DataType::Int64.widen(DataType::Bool), DataType::Utf8);
        assert_eq!(DataType::Date.widen(DataType::Float64), DataType::Utf8);
        assert_eq!(DataType::Utf8.widen(DataType::Int64), DataType::Utf8);
    }

    #[test]
    fn cmp_total_orders_null_first() {
        assert_eq!(Value::Null.cmp_total(&Value::Int64(-5)), Ordering::Less);
        assert_eq!(
            Value::Utf8("a".into()).cmp_total(&Value::Null),
            Ordering::Greater
        );
    }

    #[test]
    fn cmp_total_compares_int_and_float_numerically() {
        assert_eq!(Value::Int64(2).cmp_total(&Value::Float64(2.5)), Ordering::Less);
        assert_eq!(Value::Float64(3.0).cmp_total(&Value::Int64(3)), Ordering::Equal);
    }

    #[test]
    fn display_renders_null_as_empty_and_dates_iso() {
        assert_eq!(Value::Null.to_string(), "");
        let d = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(Value::Date(d).to_string(), "2024-01-31");
    }
}
