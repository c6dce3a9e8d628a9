// src/error.rs

use arrow::error::ArrowError;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while building a store from source files. Any of these aborts
/// the whole load; no partial store is ever returned.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("source `{table}` unavailable at {}: {reason}", path.display())]
    SourceUnavailable {
        table: String,
        path: PathBuf,
        reason: String,
    },

    #[error("malformed row {row} in `{table}`: expected {expected} fields, found {found}")]
    MalformedRow {
        table: String,
        /// 1-based index of the data row (the header is not counted).
        row: u64,
        expected: usize,
        found: usize,
    },

    #[error("table `{table}` has no data rows")]
    EmptyDataset { table: String },

    #[error("table `{table}` was requested but is not in the store")]
    MissingTable { table: String },

    #[error("table `{table}` is listed more than once")]
    DuplicateTable { table: String },

    #[error("header of `{table}` repeats column `{column}`")]
    DuplicateColumn { table: String, column: String },

    #[error("building table `{table}`: {source}")]
    Arrow {
        table: String,
        #[source]
        source: ArrowError,
    },
}

/// Failures while querying an otherwise valid store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no table named `{table}`")]
    MissingTable { table: String },

    #[error("table `{table}` has no column `{column}`")]
    MissingColumn { table: String, column: String },

    #[error("column `{column}` of `{table}` is not text")]
    NotText { table: String, column: String },

    #[error("{rows} result rows exceed the 32-bit row index")]
    TooManyRows { rows: usize },

    #[error(transparent)]
    Arrow(#[from] ArrowError),
}

/// A full query cycle failed: either the store could not be built or it
/// could not answer.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl CycleError {
    /// True when the datasets themselves are missing, as opposed to
    /// present but unusable.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            CycleError::Load(LoadError::SourceUnavailable { .. } | LoadError::MissingTable { .. })
        )
    }
}
