// src/query/mod.rs

pub mod join;
pub mod row;

use arrow::{
    array::{Array, ArrayRef, StringArray, UInt32Array},
    compute::{filter_record_batch, take},
    record_batch::RecordBatch,
};
use tracing::{debug, info, instrument};

use crate::error::StoreError;
use crate::store::{text_column, Store};
pub use row::ResultRow;

pub const ZIP_COUNTY_TABLE: &str = "zip_county";
pub const RANKINGS_TABLE: &str = "county_health_rankings";

// postal relation columns
const ZIP: &str = "zip";
const COUNTY: &str = "county";
const COUNTY_STATE: &str = "county_state";
const STATE_ABBREVIATION: &str = "state_abbreviation";

// ranking relation columns
const RANK_COUNTY: &str = "County";
const RANK_STATE: &str = "State";
const MEASURE_NAME: &str = "Measure_name";
const YEAR_SPAN: &str = "Year_span";

/// Outcome of a lookup that reached the store without failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// At least one row, ordered by year span.
    Found(Vec<ResultRow>),
    NotFound(Absent),
}

/// Which step came up empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Absent {
    /// The postal code is not in the postal relation.
    Zip,
    /// No ranking row carries the measure.
    Measure,
    /// Both keys exist but no county of the zip has the measure.
    NoOverlap,
}

impl Lookup {
    pub fn rows(&self) -> Option<&[ResultRow]> {
        match self {
            Lookup::Found(rows) => Some(rows),
            Lookup::NotFound(_) => None,
        }
    }

    pub fn into_rows(self) -> Option<Vec<ResultRow>> {
        match self {
            Lookup::Found(rows) => Some(rows),
            Lookup::NotFound(_) => None,
        }
    }
}

/// Time series of `measure_name` for every county `zip_code` belongs to.
///
/// 1. the zip must appear in the postal relation,
/// 2. the measure must appear in the ranking relation,
/// 3. postal rows join ranking rows on (county, state abbreviation),
/// 4. rows are ordered by `Year_span` as plain strings,
/// 5. column names are lowercased.
///
/// The store is only read. Every missing piece of data comes back as
/// [`Lookup::NotFound`]; [`StoreError`] means the store itself could not
/// answer (missing table or column).
#[instrument(level = "info", skip(store))]
pub fn lookup(store: &Store, zip_code: &str, measure_name: &str) -> Result<Lookup, StoreError> {
    let zips = store.relation(ZIP_COUNTY_TABLE)?;
    let rankings = store.relation(RANKINGS_TABLE)?;

    let zip_mask = zips.equal_mask(ZIP, zip_code)?;
    let zip_count = zip_mask.true_count();
    debug!(zip_count, "entries for zip {}", zip_code);
    if zip_count == 0 {
        return Ok(Lookup::NotFound(Absent::Zip));
    }

    let measure_mask = rankings.equal_mask(MEASURE_NAME, measure_name)?;
    let measure_count = measure_mask.true_count();
    debug!(measure_count, "entries for measure {}", measure_name);
    if measure_count == 0 {
        return Ok(Lookup::NotFound(Absent::Measure));
    }

    let left = filter_record_batch(zips.batch(), &zip_mask)?;
    let right = filter_record_batch(rankings.batch(), &measure_mask)?;

    let mut pairs = join::inner_join_indices(
        &[
            text_column(&left, ZIP_COUNTY_TABLE, COUNTY)?,
            text_column(&left, ZIP_COUNTY_TABLE, STATE_ABBREVIATION)?,
        ],
        &[
            text_column(&right, RANKINGS_TABLE, RANK_COUNTY)?,
            text_column(&right, RANKINGS_TABLE, RANK_STATE)?,
        ],
    );
    if pairs.is_empty() {
        info!("keys present but join matched nothing");
        return Ok(Lookup::NotFound(Absent::NoOverlap));
    }

    // stable, so ties keep join order
    let years = text_column(&right, RANKINGS_TABLE, YEAR_SPAN)?;
    pairs.sort_by(|a, b| years.value(a.1).cmp(years.value(b.1)));

    let columns = project(&left, &right, &pairs)?;
    let rows = shape(&columns, pairs.len())?;
    info!(rows = rows.len(), "query returned results");
    Ok(Lookup::Found(rows))
}

/// Gather the projected columns for the joined `pairs`:
/// postal `county`, `county_state`, `state_abbreviation`, then every ranking
/// column, all names lowercased.
fn project(
    left: &RecordBatch,
    right: &RecordBatch,
    pairs: &[(usize, usize)],
) -> Result<Vec<(String, ArrayRef)>, StoreError> {
    let left_idx = take_indices(pairs.iter().map(|p| p.0))?;
    let right_idx = take_indices(pairs.iter().map(|p| p.1))?;

    let schema = right.schema();
    let mut columns = Vec::with_capacity(3 + schema.fields().len());
    for name in [COUNTY, COUNTY_STATE, STATE_ABBREVIATION] {
        let col = text_column(left, ZIP_COUNTY_TABLE, name)?;
        columns.push((name.to_lowercase(), take(col, &left_idx, None)?));
    }
    for (field, col) in schema.fields().iter().zip(right.columns()) {
        columns.push((field.name().to_lowercase(), take(col.as_ref(), &right_idx, None)?));
    }
    Ok(columns)
}

/// Row positions as a `take` index array.
fn take_indices(rows: impl ExactSizeIterator<Item = usize>) -> Result<UInt32Array, StoreError> {
    let n = rows.len();
    let indices = rows
        .map(u32::try_from)
        .collect::<Result<Vec<u32>, _>>()
        .map_err(|_| StoreError::TooManyRows { rows: n })?;
    Ok(UInt32Array::from(indices))
}

/// Turn projected columns into `n` result rows.
fn shape(columns: &[(String, ArrayRef)], n: usize) -> Result<Vec<ResultRow>, StoreError> {
    let texts = columns
        .iter()
        .map(|(name, arr)| {
            arr.as_any()
                .downcast_ref::<StringArray>()
                .map(|s| (name.as_str(), s))
                .ok_or_else(|| StoreError::NotText {
                    table: RANKINGS_TABLE.to_string(),
                    column: name.clone(),
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok((0..n)
        .map(|i| {
            let mut row = ResultRow::with_capacity(texts.len());
            for (name, col) in &texts {
                row.insert(*name, col.value(i));
            }
            row
        })
        .collect())
}
