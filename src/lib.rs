//! Postal-code → county health time series.
//!
//! Two CSV datasets are loaded into an all-text, in-memory [`store::Store`]
//! per query cycle and joined on (county, state abbreviation).

pub mod api;
pub mod config;
pub mod cycle;
pub mod error;
pub mod load;
pub mod measure;
pub mod query;
pub mod store;

#[cfg(test)]
pub(crate) mod fixtures;

pub use error::{CycleError, LoadError, StoreError};
pub use load::{load, Source};
pub use query::{lookup, Absent, Lookup, ResultRow};
pub use store::Store;
