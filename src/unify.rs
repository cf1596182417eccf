//! Schema unification across heterogeneous sources.
//!
//! Each ingested file contributes a `(Schema, rows)` pair. The unifier interns
//! columns by name in first-seen order, widens conflicting types, and projects
//! every row into unified column space with nulls for columns the row's source
//! does not have.

use std::collections::HashMap;

use crate::types::{Field, Row, Schema, Value};

/// Folds per-file `(Schema, rows)` pairs into one unified schema and one
/// logical row stream.
///
/// Policy:
///
/// - Column identity is by name; a column present in any source is present in
///   the unified schema.
/// - Type conflicts widen via [`crate::types::DataType::widen`]; they are
///   never errors.
/// - Output column order is first-seen order across sources in processing
///   order.
#[derive(Debug, Default)]
pub struct SchemaUnifier {
    fields: Vec<Field>,
    index: HashMap<String, usize>,
    // Each stored row is aligned to `fields` as of when it was added; rows are
    // padded to the final width when the stream is drained.
    rows: Vec<Row>,
}

impl SchemaUnifier {
    /// Create an empty unifier.
    pub fn new() -> Self {
        Self::default()
    }

    /// Unified schema as seen so far.
    pub fn schema(&self) -> Schema {
        Schema::new(self.fields.clone())
    }

    /// Rows folded in so far.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Merge one source's schema and append its rows, projected into unified
    /// column space.
    ///
    /// Rows must be aligned to `schema`; parsers guarantee that arity.
    pub fn fold_source(&mut self, schema: Schema, rows: Vec<Row>) {
        let mapping: Vec<usize> = schema.fields.iter().map(|f| self.intern(f)).collect();
        let width = self.fields.len();
        for row in rows {
            let mut unified = vec![Value::Null; width];
            for (src_idx, value) in row.into_iter().enumerate() {
                if let Some(&uni_idx) = mapping.get(src_idx) {
                    unified[uni_idx] = value;
                }
            }
            self.rows.push(unified);
        }
    }

    fn intern(&mut self, field: &Field) -> usize {
        match self.index.get(&field.name) {
            Some(&idx) => {
                self.fields[idx].data_type = self.fields[idx].data_type.widen(field.data_type);
                idx
            }
            None => {
                let idx = self.fields.len();
                self.index.insert(field.name.clone(), idx);
                self.fields.push(field.clone());
                idx
            }
        }
    }

    /// Finish unification: the final schema plus a single-pass stream of rows,
    /// each padded with nulls to the final column count.
    pub fn finish(self) -> (Schema, UnifiedRows) {
        let width = self.fields.len();
        let schema = Schema::new(self.fields);
        (
            schema,
            UnifiedRows {
                inner: self.rows.into_iter(),
                width,
            },
        )
    }
}

/// Single-pass iterator over unified rows. Finite, not restartable.
pub struct UnifiedRows {
    inner: std::vec::IntoIter<Row>,
    width: usize,
}

impl Iterator for UnifiedRows {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        let mut row = self.inner.next()?;
        row.resize(self.width, Value::Null);
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for UnifiedRows {}
