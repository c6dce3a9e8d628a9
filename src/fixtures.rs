// src/fixtures.rs
//
// Shared CSV fixtures for unit tests.

use std::{fs, path::Path};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::load::Source;
use crate::query::{RANKINGS_TABLE, ZIP_COUNTY_TABLE};

/// Postal relation. The first header carries a byte-order mark, as the
/// real export does. 10463 spans two counties; 02801 maps to two counties
/// that have no ranking data under RI.
pub const ZIP_COUNTY_CSV: &str = "\u{feff}zip,county,county_state,state_abbreviation
10001,New York County,\"New York County, New York\",NY
10463,Bronx County,\"Bronx County, New York\",NY
10463,New York County,\"New York County, New York\",NY
11201,Kings County,\"Kings County, New York\",NY
02801,Newport County,\"Newport County, Rhode Island\",RI
02801,Bristol County,\"Bristol County, Rhode Island\",RI
";

pub const RANKINGS_CSV: &str = "State,County,Measure_name,Year_span,value,Confidence_Interval_Lower_Bound
NY,New York County,Adult obesity,2019-2020,24.5,23.1
NY,New York County,Unemployment,2021,5.1,
NY,New York County,Unemployment,2019,3.9,
NY,New York County,Unemployment,2020,11.2,
NY,Bronx County,Unemployment,2020,15.3,
NY,Bronx County,Unemployment,2019,5.6,
NY,Kings County,Adult obesity,2019-2020,27.0,26.2
MA,Bristol County,Adult obesity,2019-2020,30.1,28.7
RI,Providence County,Adult obesity,2019-2020,29.0,27.5
";

pub fn init_test_logging() {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,countyhealth=debug")),
        )
        .with_test_writer()
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Write both datasets into `dir` under their usual file names and return
/// the matching sources.
pub fn write_datasets(dir: &Path) -> Vec<Source> {
    write_custom(dir, ZIP_COUNTY_CSV, RANKINGS_CSV)
}

pub fn write_custom(dir: &Path, zip_county: &str, rankings: &str) -> Vec<Source> {
    let zip_path = dir.join("zip_county.csv");
    let rankings_path = dir.join("county_health_rankings.csv");
    fs::write(&zip_path, zip_county).expect("writing zip_county fixture");
    fs::write(&rankings_path, rankings).expect("writing rankings fixture");
    vec![
        Source::new(ZIP_COUNTY_TABLE, zip_path),
        Source::new(RANKINGS_TABLE, rankings_path),
    ]
}
