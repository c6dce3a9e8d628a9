// src/store/schema.rs

use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use std::{collections::HashSet, sync::Arc};

use crate::error::LoadError;

/// Marker some exporters put in front of the first header name.
pub const BYTE_ORDER_MARK: char = '\u{feff}';

/// Strip any leading byte-order marks from a header name. Nothing else is
/// touched: whitespace and case are kept verbatim.
pub fn clean_header(raw: &str) -> &str {
    raw.trim_start_matches(BYTE_ORDER_MARK)
}

/// Immutable description of one relation: its name plus the ordered,
/// all-text column list taken from a header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDescriptor {
    name: String,
    schema: SchemaRef,
}

impl TableDescriptor {
    /// Build a descriptor for `table` from the raw header fields.
    ///
    /// Every column is declared `Utf8`; no sampling or type inference is
    /// done. An empty header means the source carries no table at all and
    /// is reported as [`LoadError::EmptyDataset`].
    pub fn from_header<'a, I>(table: &str, header: I) -> Result<Self, LoadError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = HashSet::new();
        let mut fields = Vec::new();
        for raw in header {
            let name = clean_header(raw);
            if !seen.insert(name.to_string()) {
                return Err(LoadError::DuplicateColumn {
                    table: table.to_string(),
                    column: name.to_string(),
                });
            }
            fields.push(Field::new(name, DataType::Utf8, false));
        }

        if fields.is_empty() {
            return Err(LoadError::EmptyDataset {
                table: table.to_string(),
            });
        }

        Ok(Self {
            name: table.to_string(),
            schema: Arc::new(Schema::new(fields)),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> SchemaRef {
        Arc::clone(&self.schema)
    }

    /// Number of columns every row must carry.
    pub fn width(&self) -> usize {
        self.schema.fields().len()
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.schema.fields().iter().map(|f| f.name().as_str())
    }
}
