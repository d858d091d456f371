//! The [`Cutout`]: a named grid of weather data over a time range
//!
//! A cutout is constructed through a [`CutoutBuilder`]:
//!
//! 1. The construction parameters are normalized (see [`crate::params`]).
//! 2. The name is resolved to a location (see [`crate::path::ensure_path`]).
//! 3. The dataset is loaded by one of the [`LoadStrategy`] variants and the
//!    governing module is resolved.
//!
//! Cutouts made from caller data or migrated from an old-style directory are
//! views. Views cannot be persisted and report no available features.

use crate::config::{ensure_config, Config};
use crate::dataset::{Coordinates, Dataset, Indexer};
use crate::diagnostics::Diagnostic;
use crate::errors::{CutoutError, CutoutResult};
use crate::gis::{GridCells, IndicatorMatrix};
use crate::legacy::{DirectoryMigration, LegacyMigration};
use crate::loader::{load, LoadContext, LoadStrategy};
use crate::module::{DatasetModule, MODULE_REGISTRY};
use crate::params::{normalize, Bounds, CoordSlice, CutoutParams, TimeSlice};
use crate::path::ensure_path;
use crate::store::{DatasetStore, JsonStore};
use geo_types::{MultiPolygon, Polygon};
use log::{debug, info, warn};
use ndarray::Array2;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// Projection assumed for shapes when none is given
pub const DEFAULT_SHAPES_PROJECTION: &str = "latlong";

/// Name used by [`Cutout::from_dataset`] when the dataset does not carry one
pub const UNNAMED: &str = "unnamed";

/// Build a new [`Cutout`]
///
/// ```rust,no_run
/// use ratlite_core::cutout::CutoutBuilder;
/// use ratlite_core::params::CutoutParams;
///
/// let cutout = CutoutBuilder::new("western-europe-2011-01")
///     .with_params(
///         CutoutParams::new()
///             .with_module("era5")
///             .with_x(-12.18, 41.56)
///             .with_y(33.56, 72.09)
///             .with_time("2011-01", "2011-01"),
///     )
///     .build()
///     .unwrap();
/// println!("{}", cutout);
/// ```
#[derive(Debug, Clone)]
pub struct CutoutBuilder {
    name: String,
    params: CutoutParams,
    config: Option<Config>,
    data: Option<Dataset>,
    store: Arc<dyn DatasetStore>,
    migration: Arc<dyn LegacyMigration>,
    working_dir: Option<PathBuf>,
}

impl CutoutBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: CutoutParams::default(),
            config: None,
            data: None,
            store: Arc::new(JsonStore::new()),
            migration: Arc::new(DirectoryMigration),
            working_dir: None,
        }
    }

    pub fn with_params(&mut self, params: CutoutParams) -> &mut Self {
        self.params = params;
        self
    }

    /// Use an explicit configuration instead of the one named by `RATLITE_CONFIG`
    pub fn with_config(&mut self, config: Config) -> &mut Self {
        self.config = Some(config);
        self
    }

    /// Wrap an in-memory dataset. The resulting cutout is a view.
    pub fn with_data(&mut self, data: Dataset) -> &mut Self {
        self.data = Some(data);
        self
    }

    pub fn with_store(&mut self, store: Arc<dyn DatasetStore>) -> &mut Self {
        self.store = store;
        self
    }

    pub fn with_migration(&mut self, migration: Arc<dyn LegacyMigration>) -> &mut Self {
        self.migration = migration;
        self
    }

    /// Directory relative names are resolved against. Defaults to the current directory.
    pub fn with_working_dir(&mut self, working_dir: impl Into<PathBuf>) -> &mut Self {
        self.working_dir = Some(working_dir.into());
        self
    }

    pub fn build(&self) -> CutoutResult<Cutout> {
        let config = ensure_config(self.config.clone());
        let (params, mut diagnostics) = normalize(self.params.clone())?;
        diagnostics.iter().for_each(Diagnostic::emit);

        let working_dir = match &self.working_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?,
        };
        let path = ensure_path(
            &self.name,
            self.data.is_some(),
            config.cutout_dir.as_deref(),
            &working_dir,
            self.store.suffix(),
        );

        let ctx = LoadContext {
            config: &config,
            store: self.store.as_ref(),
            migration: self.migration.as_ref(),
            registry: &MODULE_REGISTRY,
        };
        let loaded = load(&path, params, self.data.clone(), ctx)?;
        loaded.diagnostics.iter().for_each(Diagnostic::emit);
        diagnostics.extend(loaded.diagnostics.iter().cloned());

        let is_view = loaded.is_view();
        if loaded.strategy == LoadStrategy::LegacyMigrate {
            info!(
                "Cutout {} uses the old directory layout. It is opened as a view.",
                path.display()
            );
        }

        Ok(Cutout {
            path,
            is_view,
            data: loaded.dataset,
            module: loaded.module,
            config,
            store: self.store.clone(),
            migration: self.migration.clone(),
            diagnostics,
            grid_cells: OnceLock::new(),
        })
    }
}

/// Label-based subset of a cutout, see [`Cutout::sel`]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Selection {
    pub x: Option<CoordSlice>,
    pub y: Option<CoordSlice>,
    pub time: Option<TimeSlice>,
    /// Replaces `x` and `y` when given
    pub bounds: Option<Bounds>,
    /// Grows `bounds` on every side
    pub buffer: Option<f64>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_x(mut self, start: f64, stop: f64) -> Self {
        self.x = Some(CoordSlice::new(start, stop));
        self
    }

    pub fn with_y(mut self, start: f64, stop: f64) -> Self {
        self.y = Some(CoordSlice::new(start, stop));
        self
    }

    pub fn with_time(mut self, start: impl Into<String>, stop: impl Into<String>) -> Self {
        self.time = Some(TimeSlice::new(start, stop));
        self
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_buffer(mut self, buffer: f64) -> Self {
        self.buffer = Some(buffer);
        self
    }

    fn indexer(&self) -> Indexer {
        match self.bounds {
            Some(bounds) => {
                let bounds = bounds.buffered(self.buffer.unwrap_or(0.0));
                Indexer {
                    x: Some(bounds.x()),
                    y: Some(bounds.y()),
                    time: self.time.clone(),
                }
            }
            None => Indexer {
                x: self.x,
                y: self.y,
                time: self.time.clone(),
            },
        }
    }
}

#[derive(Debug)]
pub struct Cutout {
    path: PathBuf,
    is_view: bool,
    data: Dataset,
    module: &'static DatasetModule,
    config: Config,
    store: Arc<dyn DatasetStore>,
    migration: Arc<dyn LegacyMigration>,
    diagnostics: Vec<Diagnostic>,
    grid_cells: OnceLock<GridCells>,
}

impl Cutout {
    /// Wrap an in-memory dataset as a view
    ///
    /// The name is taken from the dataset's metadata, falling back to [`UNNAMED`].
    pub fn from_dataset(data: Dataset) -> CutoutResult<Self> {
        let name = data
            .metadata
            .name
            .clone()
            .unwrap_or_else(|| UNNAMED.to_string());
        CutoutBuilder::new(name).with_data(data).build()
    }

    /// Stem of the cutout's location
    pub fn name(&self) -> &str {
        self.path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
    }

    /// Location of the store. It does not exist until the cutout is persisted.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_view(&self) -> bool {
        self.is_view
    }

    pub fn data(&self) -> &Dataset {
        &self.data
    }

    pub fn coords(&self) -> &Coordinates {
        &self.data.coords
    }

    /// `(rows, columns)` of the grid
    pub fn shape(&self) -> (usize, usize) {
        self.data.coords.shape()
    }

    /// `[x first, x last, y first, y last]` in storage order
    ///
    /// `None` while either spatial axis is empty.
    pub fn extent(&self) -> Option<[f64; 4]> {
        let Coordinates { x, y, .. } = &self.data.coords;
        let ends = |axis: &ndarray::Array1<f64>| {
            let last = axis.len().checked_sub(1)?;
            Some((axis[0], axis[last]))
        };
        let (x0, x1) = ends(x)?;
        let (y0, y1) = ends(y)?;
        Some([x0, x1, y0, y1])
    }

    /// Projection of the grid: the dataset's own, else the module's default
    pub fn projection(&self) -> &str {
        self.data
            .metadata
            .projection
            .as_deref()
            .unwrap_or(self.module.projection)
    }

    pub fn module(&self) -> &'static DatasetModule {
        self.module
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Features the governing module can prepare into this cutout. Empty for views.
    pub fn available_features(&self) -> BTreeSet<String> {
        if self.is_view {
            BTreeSet::new()
        } else {
            self.module.feature_names()
        }
    }

    /// Features recorded as prepared. Not checked against the stored variables.
    pub fn prepared_features(&self) -> BTreeSet<String> {
        self.data
            .metadata
            .prepared_features
            .iter()
            .cloned()
            .collect()
    }

    #[deprecated(note = "Compare `prepared_features()` with `available_features()` instead")]
    pub fn prepared(&self) -> bool {
        self.prepared_features() == self.available_features()
    }

    #[deprecated(note = "Use `data()` instead")]
    pub fn meta(&self) -> Dataset {
        Dataset::new(self.data.coords.clone(), self.data.metadata.clone())
    }

    /// Findings made while constructing this cutout, in the order they were made
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Grid points as an `(n, 2)` array of `(x, y)`, with y outer and x inner
    pub fn grid_coordinates(&self) -> Array2<f64> {
        self.data.coords.grid_coordinates()
    }

    /// Location of the grid-cell cache next to the store
    pub fn sindex_path(&self) -> PathBuf {
        self.path.with_file_name(format!(
            "{}.sindex.{}",
            self.name(),
            self.config.sindex_suffix
        ))
    }

    /// Grid cells of the cutout, computed on first access and kept afterwards
    ///
    /// A non-view cutout first tries the cache file at [`Cutout::sindex_path`].
    /// A cache that cannot be read, or that belongs to a different grid, is
    /// logged and the cells are built from the coordinates instead. The cache
    /// file is never written here.
    ///
    /// Axes with a single label take the module's native spacing for their cells.
    pub fn grid_cells_index(&self) -> &GridCells {
        self.grid_cells.get_or_init(|| self.load_grid_cells())
    }

    fn load_grid_cells(&self) -> GridCells {
        let Coordinates { x, y, .. } = &self.data.coords;
        if !self.is_view {
            let cache = self.sindex_path();
            if cache.is_file() {
                match GridCells::from_file(&cache) {
                    Ok(cells) if cells.matches_axes(x, y) => {
                        debug!("Read grid cells from {}", cache.display());
                        return cells;
                    }
                    Ok(cells) => warn!(
                        "Grid cells in {} do not match the {:?} grid of the cutout ({} cells). Rebuilding them.",
                        cache.display(),
                        self.shape(),
                        cells.len()
                    ),
                    Err(e) => warn!(
                        "Could not read grid cells from {}: {}. Rebuilding them.",
                        cache.display(),
                        e
                    ),
                }
            }
        }
        GridCells::from_grid(x, y, (self.module.dx, self.module.dy))
    }

    pub fn grid_cells(&self) -> &[Polygon<f64>] {
        self.grid_cells_index().cells()
    }

    /// Overlap of `shapes` with the grid cells
    ///
    /// `shapes_projection` is not checked against [`Cutout::projection`].
    pub fn indicatormatrix(
        &self,
        shapes: &[MultiPolygon<f64>],
        shapes_projection: &str,
    ) -> IndicatorMatrix {
        self.grid_cells_index()
            .indicatormatrix(shapes, shapes_projection)
    }

    /// [`Cutout::indicatormatrix`] for shapes in [`DEFAULT_SHAPES_PROJECTION`]
    pub fn indicatormatrix_latlong(&self, shapes: &[MultiPolygon<f64>]) -> IndicatorMatrix {
        self.indicatormatrix(shapes, DEFAULT_SHAPES_PROJECTION)
    }

    /// Select a subset by coordinate labels
    ///
    /// The result is a view with the same name. `self` is not modified.
    pub fn sel(&self, selection: &Selection) -> CutoutResult<Cutout> {
        let data = self.data.sel(&selection.indexer())?;
        let mut builder = CutoutBuilder::new(self.name());
        builder
            .with_data(data)
            .with_config(self.config.clone())
            .with_store(self.store.clone())
            .with_migration(self.migration.clone());
        if let Some(parent) = self.path.parent() {
            builder.with_working_dir(parent);
        }
        builder.build()
    }

    /// Write the dataset to [`Cutout::path`]
    ///
    /// # Errors
    ///
    /// Views are refused with [`CutoutError::View`].
    pub fn persist(&self) -> CutoutResult<()> {
        if self.is_view {
            return Err(CutoutError::View {
                name: self.name().to_string(),
                operation: "persisted".to_string(),
            });
        }
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        self.store.write(&self.path, &self.data)?;
        info!("Persisted cutout {} to {}", self.name(), self.path.display());
        Ok(())
    }
}

impl fmt::Display for Cutout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "<Cutout \"{}\">", self.name())?;
        match self.extent() {
            Some([x0, x1, y0, y1]) => {
                let (ny, nx) = self.shape();
                writeln!(f, " x = {:.2} to {:.2} ({} points)", x0, x1, nx)?;
                writeln!(f, " y = {:.2} to {:.2} ({} points)", y0, y1, ny)?;
            }
            None => writeln!(f, " no grid")?,
        }
        let time = &self.data.coords.time;
        match (time.first(), time.last()) {
            (Some(first), Some(last)) => writeln!(
                f,
                " time = {} to {} ({} steps)",
                first,
                last,
                time.len()
            )?,
            _ => writeln!(f, " no time steps")?,
        }
        writeln!(f, " module = {}", self.module.name)?;
        let prepared: Vec<String> = self.prepared_features().into_iter().collect();
        write!(f, " prepared_features = [{}]", prepared.join(", "))?;
        if self.is_view {
            write!(f, " (view)")?;
        }
        Ok(())
    }
}
