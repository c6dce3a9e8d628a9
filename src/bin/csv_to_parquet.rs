use anyhow::{anyhow, Context, Result};
use countyhealth::{load::load_table, store::export::write_relation, Source};
use std::{env, path::Path, process::exit};
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    // Expect exactly two CLI arguments: output file and CSV file.
    let args: Vec<String> = env::args().collect();
    if args.len() != 3 {
        eprintln!("Usage: {} <PARQUET_OUTPUT> <CSV_FILE>", args[0]);
        exit(1);
    }
    let output = Path::new(&args[1]);
    let csv_file = Path::new(&args[2]);

    match convert(csv_file, output) {
        Ok(rows) => println!(
            "Successfully created table from {} in {} ({} rows)",
            csv_file.display(),
            output.display(),
            rows
        ),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit(1);
        }
    }
}

/// Load `csv_file` as a table named after its file stem and write it out.
fn convert(csv_file: &Path, output: &Path) -> Result<usize> {
    let source = Source::from_file_stem(csv_file)
        .ok_or_else(|| anyhow!("cannot derive a table name from {}", csv_file.display()))?;
    let relation = load_table(&source.table, &source.path)
        .with_context(|| format!("loading {}", csv_file.display()))?;
    write_relation(&relation, output)?;
    Ok(relation.num_rows())
}
