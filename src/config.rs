// src/config.rs

use clap::Args;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

use crate::load::Source;
use crate::query::{RANKINGS_TABLE, ZIP_COUNTY_TABLE};

pub const ZIP_COUNTY_FILE: &str = "zip_county.csv";
pub const RANKINGS_FILE: &str = "county_health_rankings.csv";

/// Where the two source datasets live.
#[derive(Args, Debug, Clone)]
pub struct DataConfig {
    /// Directory holding zip_county.csv and county_health_rankings.csv
    #[arg(long, env = "COUNTY_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,
}

impl DataConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// The two fixed logical datasets, in load order.
    pub fn sources(&self) -> Vec<Source> {
        vec![
            Source::new(ZIP_COUNTY_TABLE, self.data_dir.join(ZIP_COUNTY_FILE)),
            Source::new(RANKINGS_TABLE, self.data_dir.join(RANKINGS_FILE)),
        ]
    }
}

#[derive(Args, Debug, Clone)]
pub struct LogConfig {
    /// Default filter when RUST_LOG is unset
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl LogConfig {
    /// Install the global fmt subscriber. `RUST_LOG` wins over `--log-level`.
    pub fn init(&self) {
        let env = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.log_level.as_str()));
        fmt::Subscriber::builder()
            .with_env_filter(env)
            .with_span_events(fmt::format::FmtSpan::CLOSE)
            .init();
    }
}
