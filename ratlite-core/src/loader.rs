//! Producing the dataset behind a cutout
//!
//! Exactly one [`LoadStrategy`] applies to a construction request. It is
//! chosen by [`classify`] from what exists at the resolved path and whether
//! the caller supplied a dataset. After loading, the governing module is
//! reconciled the same way for every strategy (see [`reconcile_module`]).

use crate::config::Config;
use crate::dataset::{Coordinates, Dataset};
use crate::diagnostics::Diagnostic;
use crate::errors::{CutoutError, CutoutResult};
use crate::legacy::LegacyMigration;
use crate::metadata::CutoutMetadata;
use crate::module::{DatasetModule, ModuleRegistry, DEFAULT_MODULE};
use crate::params::{CoordSlice, NormalizedParams};
use crate::store::DatasetStore;
use crate::time::time_range;
use log::debug;
use ndarray::Array1;
use std::path::Path;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoadStrategy {
    /// Open an existing single-file store
    FileLoad,
    /// Migrate an old-style cutout directory
    LegacyMigrate,
    /// Nothing exists yet; declare a new cutout from the parameters
    FreshDeclare,
    /// Use the dataset handed in by the caller
    CallerSupplied,
}

impl LoadStrategy {
    /// Whether the resulting dataset must be treated as read-only
    pub fn is_view(&self) -> bool {
        matches!(self, LoadStrategy::LegacyMigrate | LoadStrategy::CallerSupplied)
    }
}

/// Pick the strategy for a request. Caller data takes precedence over anything on disk.
pub fn classify(is_file: bool, is_dir: bool, has_data: bool) -> LoadStrategy {
    match (has_data, is_file, is_dir) {
        (true, _, _) => LoadStrategy::CallerSupplied,
        (false, true, _) => LoadStrategy::FileLoad,
        (false, false, true) => LoadStrategy::LegacyMigrate,
        (false, false, false) => LoadStrategy::FreshDeclare,
    }
}

/// Collaborators needed to load a dataset
#[derive(Debug, Clone, Copy)]
pub struct LoadContext<'a> {
    pub config: &'a Config,
    pub store: &'a dyn DatasetStore,
    pub migration: &'a dyn LegacyMigration,
    pub registry: &'a ModuleRegistry,
}

/// Outcome of loading, before it is wrapped in a cutout
#[derive(Debug)]
pub struct Loaded {
    pub strategy: LoadStrategy,
    pub dataset: Dataset,
    pub module: &'static DatasetModule,
    pub diagnostics: Vec<Diagnostic>,
}

impl Loaded {
    pub fn is_view(&self) -> bool {
        self.strategy.is_view()
    }
}

/// Load the dataset for `path` and resolve its governing module
///
/// # Errors
///
/// - [`CutoutError::MissingParameters`] when a new cutout lacks `x`, `y` or `time`
/// - [`CutoutError::MissingAttribute`] when a store lacks `prepared_features`
/// - [`CutoutError::UnknownModule`] when the module name is not registered
/// - [`CutoutError::InvalidCoordinate`] when a data variable does not fit the grid
/// - I/O and decoding errors from the store or the migration
pub fn load(
    path: &Path,
    mut params: NormalizedParams,
    data: Option<Dataset>,
    ctx: LoadContext<'_>,
) -> CutoutResult<Loaded> {
    let mut diagnostics = vec![];
    let strategy = classify(path.is_file(), path.is_dir(), data.is_some());
    debug!("Loading {} using {:?}", path.display(), strategy);

    let mut dataset = match (strategy, data) {
        (LoadStrategy::CallerSupplied, Some(data)) => data,
        (LoadStrategy::FileLoad, _) => ctx.store.open(path)?,
        (LoadStrategy::LegacyMigrate, _) => {
            ctx.migration
                .migrate(path, &params, ctx.config, ctx.store)?
        }
        _ => {
            diagnostics.push(Diagnostic::NewCutout {
                path: path.to_path_buf(),
            });
            fresh_declare(&mut params, ctx.registry, &mut diagnostics)?
        }
    };
    dataset.validate()?;

    let module_name = reconcile_module(params.module.take(), &mut dataset, &mut diagnostics);
    let module = ctx.registry.get(&module_name)?;

    Ok(Loaded {
        strategy,
        dataset,
        module,
        diagnostics,
    })
}

/// Declare a new, not yet prepared, cutout
///
/// The module parameter is consumed here, so it is not reconciled again.
fn fresh_declare(
    params: &mut NormalizedParams,
    registry: &ModuleRegistry,
    diagnostics: &mut Vec<Diagnostic>,
) -> CutoutResult<Dataset> {
    let missing = params.missing_required();
    let (Some(x), Some(y), Some(time)) = (params.x, params.y, params.time.clone()) else {
        return Err(CutoutError::MissingParameters { missing });
    };

    let module_name = match params.module.take() {
        Some(name) => name,
        None => {
            diagnostics.push(Diagnostic::ModuleDefaulted {
                module: DEFAULT_MODULE.to_string(),
            });
            DEFAULT_MODULE.to_string()
        }
    };
    let module = registry.get(&module_name)?;

    let period = time.period()?;
    let coords = Coordinates::new(
        axis_labels("x", &x, module.dx)?,
        axis_labels("y", &y, module.dy)?,
        time_range(period.start, period.end, module.dt_minutes),
    );
    let metadata = CutoutMetadata {
        module: Some(module_name),
        prepared_features: vec![],
        creation_parameters: Some(format!("{:?}", params)),
        ..CutoutMetadata::default()
    };
    Ok(Dataset::new(coords, metadata))
}

/// Most labels a declared axis may have
pub const MAX_AXIS_LABELS: usize = 1 << 20;

/// Labels on a grid of spacing `step` that fall inside `slice`
///
/// Ordered like the slice: descending when `start > stop`.
fn axis_labels(axis: &str, slice: &CoordSlice, step: f64) -> CutoutResult<Array1<f64>> {
    let invalid = |details: String| CutoutError::InvalidCoordinate {
        axis: axis.to_string(),
        details,
    };
    let finite = slice.start.is_finite() && slice.stop.is_finite();
    if step.is_nan() || step <= 0.0 || !finite {
        return Err(invalid(format!(
            "cannot place {:?} on a grid of spacing {}",
            slice, step
        )));
    }
    let eps = 1e-9;
    let first = (slice.min() / step - eps).ceil();
    let last = (slice.max() / step + eps).floor();
    // Grid indices must stay exact in f64 and in i64
    let max_index = (1u64 << 53) as f64;
    if first.abs() > max_index || last.abs() > max_index {
        return Err(invalid(format!(
            "{:?} is too far from the origin for a grid of spacing {}",
            slice, step
        )));
    }
    if last - first + 1.0 > MAX_AXIS_LABELS as f64 {
        return Err(invalid(format!(
            "{:?} would need more than {} labels at spacing {}",
            slice, MAX_AXIS_LABELS, step
        )));
    }
    let (first, last) = (first as i64, last as i64);
    let mut labels: Vec<f64> = (first..=last).map(|k| k as f64 * step).collect();
    if slice.start > slice.stop {
        labels.reverse();
    }
    Ok(Array1::from(labels))
}

/// Settle on the governing module and mirror it into the dataset's metadata
///
/// A declared module wins over the recorded one. Without either, the default
/// module is used.
pub fn reconcile_module(
    declared: Option<String>,
    dataset: &mut Dataset,
    diagnostics: &mut Vec<Diagnostic>,
) -> String {
    let recorded = dataset.metadata.module.clone();
    let module = match (declared, recorded) {
        (Some(declared), recorded) => {
            if recorded.as_deref() != Some(declared.as_str()) {
                diagnostics.push(Diagnostic::ModuleOverride {
                    declared: declared.clone(),
                    recorded,
                });
            }
            declared
        }
        (None, Some(recorded)) => recorded,
        (None, None) => {
            diagnostics.push(Diagnostic::ModuleDefaulted {
                module: DEFAULT_MODULE.to_string(),
            });
            DEFAULT_MODULE.to_string()
        }
    };
    dataset.metadata.module = Some(module.clone());
    module
}
