// src/cycle.rs

use tracing::instrument;

use crate::error::CycleError;
use crate::load::{load, Source};
use crate::query::{lookup, Lookup};

/// One complete query cycle: build a private store from `sources`, answer a
/// single lookup against it, drop it.
///
/// Blocking; async callers should run it on the blocking pool.
#[instrument(level = "info", skip(sources))]
pub fn run(sources: &[Source], zip_code: &str, measure_name: &str) -> Result<Lookup, CycleError> {
    let store = load(sources)?;
    Ok(lookup(&store, zip_code, measure_name)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LoadError;
    use crate::fixtures::{init_test_logging, write_datasets};
    use crate::query::Absent;
    use tempfile::tempdir;

    #[test]
    fn cycle_loads_and_answers() {
        init_test_logging();
        let dir = tempdir().unwrap();
        let sources = write_datasets(dir.path());

        let found = run(&sources, "11201", "Adult obesity").unwrap();
        assert_eq!(found.rows().map(|r| r.len()), Some(1));

        let missing = run(&sources, "99999", "Adult obesity").unwrap();
        assert_eq!(missing, Lookup::NotFound(Absent::Zip));
    }

    #[test]
    fn missing_dataset_is_a_configuration_error() {
        let dir = tempdir().unwrap();
        let err = run(&[Source::new("zip_county", dir.path().join("absent.csv"))], "10001", "x")
            .unwrap_err();
        assert!(err.is_configuration());
        assert!(matches!(err, CycleError::Load(LoadError::SourceUnavailable { .. })));
    }
}
