// src/store/export.rs

use anyhow::{Context, Result};
use parquet::{arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties};
use std::{
    fs::{self, File},
    path::Path,
};
use tracing::info;

use super::Relation;

/// Write `relation` to a single Parquet file at `output_path`, returning the
/// file size in bytes.
pub fn write_relation(relation: &Relation, output_path: &Path) -> Result<u64> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory {}", parent.display()))?;
    }

    let file = File::create(output_path)
        .with_context(|| format!("creating file {}", output_path.display()))?;

    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let mut writer = ArrowWriter::try_new(file, relation.descriptor().schema(), Some(props))
        .context("creating parquet writer")?;
    writer
        .write(relation.batch())
        .context("writing batch to parquet")?;
    writer.close().context("closing parquet writer")?;

    let size = fs::metadata(output_path)
        .context("getting file metadata")?
        .len();
    info!(
        table = relation.name(),
        rows = relation.num_rows(),
        bytes = size,
        path = %output_path.display(),
        "wrote parquet"
    );
    Ok(size)
}
