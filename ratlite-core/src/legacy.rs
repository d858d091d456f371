//! Reading old-style cutout directories
//!
//! Before single-file stores, a cutout was a directory holding a `meta` file
//! with the grid and attributes, plus one file per period with the data
//! variables for that period:
//!
//! ```text
//! europe-2013/
//!     meta.json
//!     201301.json
//!     201302.json
//! ```
//!
//! The result of a migration is always treated as a view.

use crate::config::Config;
use crate::dataset::{Coordinates, Dataset};
use crate::errors::{CutoutError, CutoutResult};
use crate::params::NormalizedParams;
use crate::store::DatasetStore;
use log::debug;
use ndarray::{concatenate, Array3, ArrayView3, Axis};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

/// Stem of the file holding grid and attributes of an old-style cutout
pub const META_STEM: &str = "meta";

/// Turns an old-style cutout directory into a dataset
pub trait LegacyMigration: Debug + Send + Sync {
    fn migrate(
        &self,
        path: &Path,
        params: &NormalizedParams,
        config: &Config,
        store: &dyn DatasetStore,
    ) -> CutoutResult<Dataset>;
}

/// Concatenates the period files of a cutout directory along time
#[derive(Debug, Clone, Default)]
pub struct DirectoryMigration;

impl DirectoryMigration {
    fn period_files(dir: &Path, suffix: &str) -> CutoutResult<Vec<PathBuf>> {
        let mut files = vec![];
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let matches_suffix = path.extension().and_then(|e| e.to_str()) == Some(suffix);
            let is_meta = path.file_stem().and_then(|s| s.to_str()) == Some(META_STEM);
            if path.is_file() && matches_suffix && !is_meta {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

impl LegacyMigration for DirectoryMigration {
    fn migrate(
        &self,
        path: &Path,
        _params: &NormalizedParams,
        _config: &Config,
        store: &dyn DatasetStore,
    ) -> CutoutResult<Dataset> {
        let meta_path = path.join(format!("{}.{}", META_STEM, store.suffix()));
        let meta = store.open_partial(&meta_path)?;

        let periods = Self::period_files(path, store.suffix())?
            .iter()
            .map(|file| store.open_partial(file))
            .collect::<CutoutResult<Vec<_>>>()?;
        debug!(
            "Migrating cutout directory {} with {} period files",
            path.display(),
            periods.len()
        );

        let mut time = vec![];
        let mut pieces: BTreeMap<String, Vec<ArrayView3<f64>>> = BTreeMap::new();
        for period in &periods {
            time.extend(period.coords.time.iter().copied());
            for (name, values) in &period.variables {
                pieces.entry(name.clone()).or_default().push(values.view());
            }
        }
        if periods.is_empty() {
            time = meta.coords.time.clone();
        }

        let mut variables: BTreeMap<String, Array3<f64>> = BTreeMap::new();
        for (name, views) in pieces {
            if views.len() != periods.len() {
                return Err(CutoutError::InvalidCoordinate {
                    axis: "time".to_string(),
                    details: format!("variable `{}` is missing from some period files", name),
                });
            }
            let joined = concatenate(Axis(0), &views).map_err(|e| {
                CutoutError::InvalidCoordinate {
                    axis: "time".to_string(),
                    details: format!("cannot join `{}`: {}", name, e),
                }
            })?;
            variables.insert(name, joined);
        }

        let coords = Coordinates::new(meta.coords.x.clone(), meta.coords.y.clone(), time);
        let mut dataset = Dataset::new(coords, meta.metadata);
        for (name, values) in variables {
            dataset.insert_variable(&name, values)?;
        }
        Ok(dataset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::CutoutMetadata;
    use crate::store::JsonStore;
    use chrono::{NaiveDate, NaiveDateTime};
    use ndarray::array;

    fn month_start(month: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2013, month, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn write_legacy_dir(dir: &Path, store: &JsonStore) {
        let grid = |time| Coordinates::new(array![0.0, 0.25], array![50.0], time);
        let meta = Dataset::new(
            grid(vec![]),
            CutoutMetadata {
                module: Some("era5".to_string()),
                ..CutoutMetadata::default()
            },
        );
        store.write(&dir.join("meta.json"), &meta).unwrap();

        for (month, value) in [(1, 1.0), (2, 2.0)] {
            let mut period = Dataset::new(grid(vec![month_start(month)]), CutoutMetadata::default());
            period
                .insert_variable("temperature", array![[[value, value]]])
                .unwrap();
            store
                .write(&dir.join(format!("20130{}.json", month)), &period)
                .unwrap();
        }
    }

    #[test]
    fn migrate_directory() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new();
        write_legacy_dir(dir.path(), &store);

        let dataset = DirectoryMigration
            .migrate(
                dir.path(),
                &NormalizedParams::default(),
                &Config::default(),
                &store,
            )
            .unwrap();

        assert_eq!(dataset.metadata.module.as_deref(), Some("era5"));
        assert_eq!(dataset.coords.time, vec![month_start(1), month_start(2)]);
        let temperature = &dataset.variables["temperature"];
        assert_eq!(temperature.dim(), (2, 1, 2));
        assert_eq!(temperature[[1, 0, 1]], 2.0);
    }

    #[test]
    fn missing_meta_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = DirectoryMigration.migrate(
            dir.path(),
            &NormalizedParams::default(),
            &Config::default(),
            &JsonStore::new(),
        );
        assert!(matches!(result, Err(CutoutError::Io(_))));
    }
}
