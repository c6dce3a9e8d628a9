// src/load/mod.rs

use csv::{ReaderBuilder, StringRecord};
use std::{
    fs::File,
    io::{BufReader, Read},
    path::{Path, PathBuf},
};
use tracing::{debug, info, instrument};

use crate::error::LoadError;
use crate::store::{Relation, RelationBuilder, Store, TableDescriptor};

/// One dataset to load: the logical table name and where its CSV lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub table: String,
    pub path: PathBuf,
}

impl Source {
    pub fn new(table: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            table: table.into(),
            path: path.into(),
        }
    }

    /// Use the file stem as the table name (`data/zip_county.csv` → `zip_county`).
    /// Only for standalone conversions; the service always names its tables.
    pub fn from_file_stem(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        let table = path.file_stem()?.to_str()?.to_string();
        Some(Self { table, path })
    }
}

/// Build a fresh store from `sources`, in order, then verify it.
///
/// Any failure aborts the whole load: a missing file, a row whose field count
/// differs from its header, or a table left without data rows.
#[instrument(level = "info", skip(sources), fields(sources = sources.len()))]
pub fn load(sources: &[Source]) -> Result<Store, LoadError> {
    let mut store = Store::new();
    for source in sources {
        if store.contains(&source.table) {
            return Err(LoadError::DuplicateTable {
                table: source.table.clone(),
            });
        }
        let relation = load_table(&source.table, &source.path)?;
        store.insert(relation)?;
    }

    verify(&store, sources)?;
    info!(
        tables = ?store.table_names().collect::<Vec<_>>(),
        "store ready"
    );
    Ok(store)
}

/// Read one CSV file into a relation named `table`.
#[instrument(level = "debug", skip(path), fields(path = %path.display()))]
pub fn load_table(table: &str, path: &Path) -> Result<Relation, LoadError> {
    let file = File::open(path).map_err(|e| LoadError::SourceUnavailable {
        table: table.to_string(),
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    read_relation(table, BufReader::new(file)).map_err(|e| match e {
        // reader errors carry no path; fill it in here
        LoadError::SourceUnavailable { table, reason, .. } => LoadError::SourceUnavailable {
            table,
            path: path.to_path_buf(),
            reason,
        },
        other => other,
    })
}

/// Parse CSV text from `reader`: the first record is the header, every
/// following record is inserted positionally as text.
///
/// A blank line is a row with no fields, so it fails the arity check like
/// any other short row.
pub fn read_relation<R: Read>(table: &str, mut reader: R) -> Result<Relation, LoadError> {
    let unreadable = |reason: String| LoadError::SourceUnavailable {
        table: table.to_string(),
        path: PathBuf::new(),
        reason,
    };

    let mut input = Vec::new();
    reader
        .read_to_end(&mut input)
        .map_err(|e| unreadable(e.to_string()))?;

    // flexible: arity is checked by the builder so the error names the row
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input.as_slice());

    let header = rdr.headers().map_err(|e| unreadable(e.to_string()))?;
    let descriptor = if blank_lines(&input, 0) > 0 {
        TableDescriptor::from_header(table, std::iter::empty::<&str>())?
    } else {
        TableDescriptor::from_header(table, header)?
    };
    debug!(
        table,
        columns = descriptor.width(),
        "found {} columns",
        descriptor.width()
    );

    let mut builder = RelationBuilder::new(descriptor);
    let mut record = StringRecord::new();
    loop {
        // the reader skips blank lines on its next read; count them first
        let at = usize::try_from(rdr.position().byte()).unwrap_or(input.len());
        for _ in 0..blank_lines(&input, at) {
            builder.push_row(std::iter::empty::<&str>())?;
        }
        if !rdr
            .read_record(&mut record)
            .map_err(|e| unreadable(e.to_string()))?
        {
            break;
        }
        builder.push_row(&record)?;
    }
    let relation = builder.finish()?;
    info!(table, rows = relation.num_rows(), "loaded rows");
    Ok(relation)
}

/// Number of empty lines starting at byte `at`, where the previous record
/// ended. A `\n` right after a `\r` finishes that record's terminator.
fn blank_lines(input: &[u8], at: usize) -> usize {
    let mut rest = input.get(at..).unwrap_or_default();
    if at > 0 && input.get(at - 1) == Some(&b'\r') {
        rest = rest.strip_prefix(b"\n").unwrap_or(rest);
    }
    let mut count = 0;
    while let Some(tail) = rest
        .strip_prefix(b"\r\n")
        .or(rest.strip_prefix(b"\n"))
        .or(rest.strip_prefix(b"\r"))
    {
        rest = tail;
        count += 1;
    }
    count
}

/// Every requested table must be present and hold at least one row.
pub fn verify(store: &Store, sources: &[Source]) -> Result<(), LoadError> {
    for source in sources {
        let relation = store
            .relation(&source.table)
            .map_err(|_| LoadError::MissingTable {
                table: source.table.clone(),
            })?;
        if relation.num_rows() == 0 {
            return Err(LoadError::EmptyDataset {
                table: source.table.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{init_test_logging, write_custom, write_datasets, ZIP_COUNTY_CSV};
    use crate::query::{RANKINGS_TABLE, ZIP_COUNTY_TABLE};
    use std::io::Cursor;
    use tempfile::tempdir;

    #[test]
    fn loads_both_datasets() {
        init_test_logging();
        let dir = tempdir().unwrap();
        let sources = write_datasets(dir.path());

        let store = load(&sources).unwrap();
        assert_eq!(store.len(), 2);

        let zips = store.relation(ZIP_COUNTY_TABLE).unwrap();
        assert_eq!(zips.num_rows(), 6);
        let cols: Vec<&str> = zips.descriptor().column_names().collect();
        assert_eq!(
            cols,
            vec!["zip", "county", "county_state", "state_abbreviation"]
        );
        // quoted commas stay inside one field, leading zeros survive
        let labels = zips.text_column("county_state").unwrap();
        assert_eq!(labels.value(0), "New York County, New York");
        assert_eq!(zips.count_equal("zip", "02801").unwrap(), 2);

        let rankings = store.relation(RANKINGS_TABLE).unwrap();
        assert_eq!(rankings.num_rows(), 9);
        assert_eq!(rankings.descriptor().width(), 6);
    }

    #[test]
    fn table_name_comes_from_source_not_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("export-2024.final.csv");
        std::fs::write(&path, "a,b\n1,2\n").unwrap();

        let store = load(&[Source::new("things", &path)]).unwrap();
        assert_eq!(store.table_names().collect::<Vec<_>>(), vec!["things"]);

        let from_stem = Source::from_file_stem(&path).unwrap();
        assert_eq!(from_stem.table, "export-2024.final");
    }

    #[test]
    fn missing_file_is_source_unavailable() {
        let dir = tempdir().unwrap();
        let mut sources = write_datasets(dir.path());
        sources[1].path = dir.path().join("nope.csv");

        match load(&sources).unwrap_err() {
            LoadError::SourceUnavailable { table, path, .. } => {
                assert_eq!(table, RANKINGS_TABLE);
                assert_eq!(path, dir.path().join("nope.csv"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn arity_mismatch_names_table_and_row() {
        let dir = tempdir().unwrap();
        let rankings = "State,County,Measure_name,Year_span\n\
                        NY,Kings County,Adult obesity,2019\n\
                        NY,Kings County,Adult obesity\n";
        let sources = write_custom(dir.path(), ZIP_COUNTY_CSV, rankings);

        match load(&sources).unwrap_err() {
            LoadError::MalformedRow {
                table,
                row,
                expected,
                found,
            } => {
                assert_eq!(table, RANKINGS_TABLE);
                assert_eq!(row, 2);
                assert_eq!(expected, 4);
                assert_eq!(found, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn header_only_table_is_empty_dataset() {
        let dir = tempdir().unwrap();
        let sources = write_custom(
            dir.path(),
            ZIP_COUNTY_CSV,
            "State,County,Measure_name,Year_span\n",
        );
        assert!(matches!(
            load(&sources).unwrap_err(),
            LoadError::EmptyDataset { table } if table == RANKINGS_TABLE
        ));
    }

    #[test]
    fn empty_file_is_empty_dataset() {
        let err = read_relation("blank", Cursor::new("")).unwrap_err();
        assert!(matches!(err, LoadError::EmptyDataset { table } if table == "blank"));
    }

    #[test]
    fn same_table_twice_is_rejected() {
        let dir = tempdir().unwrap();
        let sources = write_datasets(dir.path());
        let doubled = vec![sources[0].clone(), sources[0].clone()];
        assert!(matches!(
            load(&doubled).unwrap_err(),
            LoadError::DuplicateTable { table } if table == ZIP_COUNTY_TABLE
        ));
    }

    #[test]
    fn invalid_utf8_is_unreadable() {
        let bytes: &[u8] = b"a,b\n1,\xff\xfe\n";
        let err = read_relation("bad", Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, LoadError::SourceUnavailable { table, .. } if table == "bad"));
    }

    #[test]
    fn blank_line_is_malformed_row() {
        for text in [
            "a,b\n1,2\n\n3,4\n",
            "a,b\r\n1,2\r\n\r\n3,4\r\n",
            "a,b\n1,2\n\n",
        ] {
            match read_relation("t", Cursor::new(text)).unwrap_err() {
                LoadError::MalformedRow {
                    row,
                    expected,
                    found,
                    ..
                } => assert_eq!((row, expected, found), (2, 2, 0), "{text:?}"),
                other => panic!("unexpected error for {text:?}: {other}"),
            }
        }

        // one column: the empty line still has no field at all
        let err = read_relation("t", Cursor::new("a\n1\n\n2\n")).unwrap_err();
        assert!(matches!(err, LoadError::MalformedRow { row: 2, found: 0, .. }));

        // leading blank line means the header itself is empty
        let err = read_relation("t", Cursor::new("\na,b\n1,2\n")).unwrap_err();
        assert!(matches!(err, LoadError::EmptyDataset { .. }));
    }

    #[test]
    fn line_breaks_inside_rows_are_not_blank_lines() {
        let crlf = read_relation("t", Cursor::new("a,b\r\n1,2\r\n3,4\r\n")).unwrap();
        assert_eq!(crlf.num_rows(), 2);

        let quoted = read_relation("t", Cursor::new("a,b\n\"x\n\ny\",2\n3,4")).unwrap();
        assert_eq!(quoted.num_rows(), 2);
        assert_eq!(quoted.text_column("a").unwrap().value(0), "x\n\ny");
    }

    #[test]
    fn verify_flags_missing_tables() {
        let store = Store::new();
        let err = verify(&store, &[Source::new("ghost", "ghost.csv")]).unwrap_err();
        assert!(matches!(err, LoadError::MissingTable { table } if table == "ghost"));
    }
}
