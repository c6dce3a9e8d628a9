use anyhow::{Context, Result};
use clap::Parser;
use countyhealth::{
    config::{DataConfig, LogConfig},
    cycle,
    measure::{Measure, ZipCode},
    Lookup,
};
use std::process::exit;
use tracing::info;

/// Run a single zip + measure lookup against the CSV datasets.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Five-digit postal code
    #[arg(short, long)]
    zip: ZipCode,

    /// One of the twelve measure names, e.g. "Adult obesity"
    #[arg(short, long)]
    measure: Measure,

    #[command(flatten)]
    data: DataConfig,

    #[command(flatten)]
    log: LogConfig,
}

fn main() -> Result<()> {
    let args = Args::parse();
    args.log.init();

    let outcome = cycle::run(
        &args.data.sources(),
        args.zip.as_str(),
        args.measure.as_str(),
    )
    .context("query cycle failed")?;

    match outcome {
        Lookup::Found(rows) => {
            info!(rows = rows.len(), "lookup finished");
            println!("{}", serde_json::to_string_pretty(&rows)?);
            Ok(())
        }
        Lookup::NotFound(absent) => {
            eprintln!(
                "No data found for zip={}, measure={} ({:?})",
                args.zip, args.measure, absent
            );
            exit(1);
        }
    }
}
