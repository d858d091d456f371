//! Single-file dataset stores
//!
//! The on-disk format is pluggable through [`DatasetStore`]. [`JsonStore`] keeps
//! the coordinates, data variables and attributes of a dataset in one JSON
//! document. Attributes go through the metadata codec on the way in and out.

use crate::dataset::{Coordinates, Dataset};
use crate::errors::CutoutResult;
use crate::metadata::{Attributes, CutoutMetadata};
use ndarray::Array3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Reads and writes single-file cutout stores
pub trait DatasetStore: Debug + Send + Sync {
    /// File suffix of stores handled by this implementation, without the dot
    fn suffix(&self) -> &str;

    /// Open the store at `path`
    ///
    /// # Errors
    ///
    /// Fails on I/O or decoding errors, and with
    /// [`CutoutError::MissingAttribute`](crate::errors::CutoutError::MissingAttribute)
    /// when the store lacks `prepared_features`.
    fn open(&self, path: &Path) -> CutoutResult<Dataset>;

    /// Read a store whose attributes need not be complete
    ///
    /// Used for the pieces of old-style cutout directories.
    fn open_partial(&self, path: &Path) -> CutoutResult<Dataset>;

    fn write(&self, path: &Path, dataset: &Dataset) -> CutoutResult<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredDataset {
    coords: Coordinates,
    #[serde(default)]
    variables: BTreeMap<String, Array3<f64>>,
    #[serde(default)]
    attrs: Attributes,
}

#[derive(Debug, Clone)]
pub struct JsonStore {
    suffix: String,
}

impl Default for JsonStore {
    fn default() -> Self {
        Self {
            suffix: "json".to_string(),
        }
    }
}

impl JsonStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_suffix(suffix: &str) -> Self {
        Self {
            suffix: suffix.to_string(),
        }
    }

    fn read(&self, path: &Path) -> CutoutResult<StoredDataset> {
        let reader = BufReader::new(File::open(path)?);
        Ok(serde_json::from_reader(reader)?)
    }

    /// Assemble the dataset, rejecting variables that do not fit the grid
    fn assemble(stored: StoredDataset, metadata: CutoutMetadata) -> CutoutResult<Dataset> {
        let mut dataset = Dataset::new(stored.coords, metadata);
        for (name, values) in stored.variables {
            dataset.insert_variable(&name, values)?;
        }
        Ok(dataset)
    }
}

impl DatasetStore for JsonStore {
    fn suffix(&self) -> &str {
        &self.suffix
    }

    fn open(&self, path: &Path) -> CutoutResult<Dataset> {
        let stored = self.read(path)?;
        let metadata = CutoutMetadata::decode(&stored.attrs, &path.display().to_string())?;
        Self::assemble(stored, metadata)
    }

    fn open_partial(&self, path: &Path) -> CutoutResult<Dataset> {
        let stored = self.read(path)?;
        let metadata = CutoutMetadata::decode_lenient(&stored.attrs)?;
        Self::assemble(stored, metadata)
    }

    fn write(&self, path: &Path, dataset: &Dataset) -> CutoutResult<()> {
        let stored = StoredDataset {
            coords: dataset.coords.clone(),
            variables: dataset.variables.clone(),
            attrs: dataset.metadata.encode(),
        };
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, &stored)?;
        Ok(())
    }
}
