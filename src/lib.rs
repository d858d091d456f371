//! Cutouts of weather data for renewable energy modelling
//!
//! This crate bundles the cutout machinery of [`ratlite_core`] with the
//! dataset modules of [`ratlite_datasets`]. Depending on it guarantees that
//! `era5`, `sarah`, `ncep` and `cordex` are available in the module registry.
//!
//! ```rust,no_run
//! use ratlite::params::CutoutParams;
//!
//! let cutout = ratlite::open_cutout(
//!     "iberia-2013",
//!     CutoutParams::new()
//!         .with_x(-10.0, 3.5)
//!         .with_y(36.0, 44.0)
//!         .with_time("2013", "2013"),
//! )
//! .unwrap();
//! assert!(cutout.prepared_features().is_empty());
//! ```

pub use ratlite_core::{
    config, cutout, dataset, diagnostics, errors, gis, legacy, loader, metadata, module, params,
    path, store, time,
};
pub use ratlite_core::{Cutout, CutoutBuilder, CutoutError, CutoutResult, Selection};
pub use ratlite_datasets::{datasets, BUILTIN_MODULES};

use log::debug;

/// Open the cutout `name`, or declare it from `params` if it does not exist yet
///
/// Uses the configuration named by `RATLITE_CONFIG` and the current directory.
pub fn open_cutout(name: &str, params: params::CutoutParams) -> CutoutResult<Cutout> {
    debug!(
        "Opening cutout {} (built-in modules: {})",
        name,
        BUILTIN_MODULES.join(", ")
    );
    CutoutBuilder::new(name).with_params(params).build()
}
