// src/store/mod.rs

pub mod export;
pub mod schema;

use arrow::{
    array::{Array, ArrayRef, BooleanArray, Scalar, StringArray, StringBuilder},
    compute::{filter_record_batch, kernels::cmp::eq},
    record_batch::RecordBatch,
};
use std::{collections::BTreeMap, sync::Arc};
use tracing::debug;

use crate::error::{LoadError, StoreError};
pub use schema::{clean_header, TableDescriptor, BYTE_ORDER_MARK};

/// A loaded table: its descriptor plus every row as one text-only batch.
#[derive(Debug, Clone)]
pub struct Relation {
    descriptor: TableDescriptor,
    batch: RecordBatch,
}

impl Relation {
    /// Build a relation in one go from a descriptor and a row iterator.
    pub fn from_rows<R, S>(
        descriptor: TableDescriptor,
        rows: impl IntoIterator<Item = R>,
    ) -> Result<Self, LoadError>
    where
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = RelationBuilder::new(descriptor);
        for row in rows {
            builder.push_row(row)?;
        }
        builder.finish()
    }

    pub fn name(&self) -> &str {
        self.descriptor.name()
    }

    pub fn descriptor(&self) -> &TableDescriptor {
        &self.descriptor
    }

    pub fn batch(&self) -> &RecordBatch {
        &self.batch
    }

    pub fn num_rows(&self) -> usize {
        self.batch.num_rows()
    }

    /// Borrow a column by name as text.
    pub fn text_column(&self, column: &str) -> Result<&StringArray, StoreError> {
        text_column(&self.batch, self.name(), column)
    }

    /// Row mask of cells in `column` exactly equal to `value`.
    pub fn equal_mask(&self, column: &str, value: &str) -> Result<BooleanArray, StoreError> {
        let col = self.text_column(column)?;
        let needle = Scalar::new(StringArray::from(vec![value]));
        Ok(eq(col, &needle)?)
    }

    /// Count rows whose `column` equals `value`.
    pub fn count_equal(&self, column: &str, value: &str) -> Result<usize, StoreError> {
        Ok(self.equal_mask(column, value)?.true_count())
    }

    /// Rows whose `column` equals `value`, in source order.
    pub fn filter_equal(&self, column: &str, value: &str) -> Result<RecordBatch, StoreError> {
        let mask = self.equal_mask(column, value)?;
        Ok(filter_record_batch(&self.batch, &mask)?)
    }
}

/// Look up `column` in `batch` and view it as a string array.
pub fn text_column<'b>(
    batch: &'b RecordBatch,
    table: &str,
    column: &str,
) -> Result<&'b StringArray, StoreError> {
    let arr = batch
        .column_by_name(column)
        .ok_or_else(|| StoreError::MissingColumn {
            table: table.to_string(),
            column: column.to_string(),
        })?;
    arr.as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| StoreError::NotText {
            table: table.to_string(),
            column: column.to_string(),
        })
}

/// Positional bulk-insert into a fixed descriptor.
///
/// Every row must carry exactly `descriptor.width()` fields. A row that does
/// not fails with [`LoadError::MalformedRow`] and leaves the builder as it
/// was before the call.
pub struct RelationBuilder {
    descriptor: TableDescriptor,
    columns: Vec<StringBuilder>,
    rows: u64,
}

impl RelationBuilder {
    pub fn new(descriptor: TableDescriptor) -> Self {
        let columns = (0..descriptor.width()).map(|_| StringBuilder::new()).collect();
        Self {
            descriptor,
            columns,
            rows: 0,
        }
    }

    pub fn push_row<S: AsRef<str>>(
        &mut self,
        fields: impl IntoIterator<Item = S>,
    ) -> Result<(), LoadError> {
        let width = self.columns.len();
        let fields: Vec<S> = fields.into_iter().collect();
        if fields.len() != width {
            return Err(LoadError::MalformedRow {
                table: self.descriptor.name().to_string(),
                row: self.rows + 1,
                expected: width,
                found: fields.len(),
            });
        }
        for (col, field) in self.columns.iter_mut().zip(&fields) {
            col.append_value(field.as_ref());
        }
        self.rows += 1;
        Ok(())
    }

    pub fn finish(self) -> Result<Relation, LoadError> {
        let Self {
            descriptor,
            columns,
            ..
        } = self;
        let arrays: Vec<ArrayRef> = columns
            .into_iter()
            .map(|mut b| Arc::new(b.finish()) as ArrayRef)
            .collect();
        let batch =
            RecordBatch::try_new(descriptor.schema(), arrays).map_err(|source| LoadError::Arrow {
                table: descriptor.name().to_string(),
                source,
            })?;
        Ok(Relation { descriptor, batch })
    }
}

/// Every relation materialized for one query cycle.
///
/// A `Store` is a plain owned value: build it, query it, drop it. Nothing
/// is shared between stores.
#[derive(Debug, Default, Clone)]
pub struct Store {
    relations: BTreeMap<String, Relation>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a relation. Table names are unique within a store.
    pub fn insert(&mut self, relation: Relation) -> Result<(), LoadError> {
        let name = relation.name().to_string();
        if self.relations.contains_key(&name) {
            return Err(LoadError::DuplicateTable { table: name });
        }
        debug!(table = %name, rows = relation.num_rows(), "table created");
        self.relations.insert(name, relation);
        Ok(())
    }

    pub fn relation(&self, table: &str) -> Result<&Relation, StoreError> {
        self.relations
            .get(table)
            .ok_or_else(|| StoreError::MissingTable {
                table: table.to_string(),
            })
    }

    pub fn contains(&self, table: &str) -> bool {
        self.relations.contains_key(table)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.relations.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}
