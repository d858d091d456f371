//! Dataset modules and their registry
//!
//! A dataset module (ERA5, SARAH, ...) governs a cutout: it declares which
//! features can be prepared into it, the default projection and the native
//! resolution of its grid.
//!
//! Modules are looked up by name in the global [`MODULE_REGISTRY`]. Modules
//! shipped with a crate are registered at compile time with
//! [`define_dataset_module!`]; others can be added at runtime.
//!
//! ```rust
//! use ratlite_core::module::{DatasetModule, MODULE_REGISTRY};
//!
//! static TOY: DatasetModule = DatasetModule::new(
//!     "toy",
//!     "latlong",
//!     &[("wind", &["wnd100m"])],
//!     0.5,
//!     0.5,
//!     60,
//! );
//!
//! MODULE_REGISTRY.register(&TOY).unwrap();
//! let module = MODULE_REGISTRY.get("toy").unwrap();
//! assert_eq!(module.projection, "latlong");
//! assert!(module.feature_names().contains("wind"));
//! ```

use crate::errors::{CutoutError, CutoutResult};
use std::collections::{BTreeSet, HashMap};
use std::sync::{LazyLock, RwLock};

/// Name of the module used when neither the caller nor the dataset names one
pub const DEFAULT_MODULE: &str = "era5";

/// Capabilities of a dataset module
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatasetModule {
    pub name: &'static str,
    /// Default projection of cutouts governed by this module
    pub projection: &'static str,
    /// Preparable features and the data variables each one provides
    pub features: &'static [(&'static str, &'static [&'static str])],
    /// Native grid spacing along x
    pub dx: f64,
    /// Native grid spacing along y
    pub dy: f64,
    /// Native time step in minutes
    pub dt_minutes: i64,
}

impl DatasetModule {
    pub const fn new(
        name: &'static str,
        projection: &'static str,
        features: &'static [(&'static str, &'static [&'static str])],
        dx: f64,
        dy: f64,
        dt_minutes: i64,
    ) -> Self {
        Self {
            name,
            projection,
            features,
            dx,
            dy,
            dt_minutes,
        }
    }

    pub fn feature_names(&self) -> BTreeSet<String> {
        self.features
            .iter()
            .map(|(feature, _)| feature.to_string())
            .collect()
    }

    /// Data variables provided by `feature`
    pub fn variables(&self, feature: &str) -> Option<&'static [&'static str]> {
        self.features
            .iter()
            .find(|(name, _)| *name == feature)
            .map(|(_, variables)| *variables)
    }
}

inventory::collect!(DatasetModule);

/// Lookup of dataset modules by name
///
/// Static modules (submitted via `inventory`) take precedence over those
/// registered at runtime.
#[derive(Debug)]
pub struct ModuleRegistry {
    runtime_modules: RwLock<HashMap<&'static str, &'static DatasetModule>>,
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self {
            runtime_modules: RwLock::new(HashMap::new()),
        }
    }

    fn get_static(name: &str) -> Option<&'static DatasetModule> {
        inventory::iter::<DatasetModule>
            .into_iter()
            .find(|module| module.name == name)
    }

    /// Look a module up by name
    ///
    /// # Errors
    ///
    /// [`CutoutError::UnknownModule`] if no module of that name is registered.
    pub fn get(&self, name: &str) -> CutoutResult<&'static DatasetModule> {
        if let Some(module) = Self::get_static(name) {
            return Ok(module);
        }
        let runtime = self.runtime_modules.read().expect("Registry lock poisoned");
        runtime
            .get(name)
            .copied()
            .ok_or_else(|| CutoutError::UnknownModule(name.to_string()))
    }

    /// Register a module at runtime
    ///
    /// # Errors
    ///
    /// [`CutoutError::DuplicateModule`] if the name is already taken.
    pub fn register(&self, module: &'static DatasetModule) -> CutoutResult<()> {
        if Self::get_static(module.name).is_some() {
            return Err(CutoutError::DuplicateModule(module.name.to_string()));
        }
        let mut runtime = self.runtime_modules.write().expect("Registry lock poisoned");
        if runtime.contains_key(module.name) {
            return Err(CutoutError::DuplicateModule(module.name.to_string()));
        }
        runtime.insert(module.name, module);
        Ok(())
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.get(name).is_ok()
    }

    /// Names of all registered modules, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = inventory::iter::<DatasetModule>
            .into_iter()
            .map(|module| module.name)
            .collect();
        let runtime = self.runtime_modules.read().expect("Registry lock poisoned");
        names.extend(runtime.keys().copied());
        names.sort_unstable();
        names.dedup();
        names
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Global module registry
pub static MODULE_REGISTRY: LazyLock<ModuleRegistry> = LazyLock::new(ModuleRegistry::new);

/// Define a dataset module and register it with [`MODULE_REGISTRY`] at compile time
///
/// ```rust,ignore
/// use ratlite_core::define_dataset_module;
///
/// define_dataset_module!(
///     ERA5,
///     name = "era5",
///     projection = "latlong",
///     features = &[("wind", &["wnd100m", "roughness"])],
///     dx = 0.25,
///     dy = 0.25,
///     dt_minutes = 60,
/// );
/// ```
#[macro_export]
macro_rules! define_dataset_module {
    (
        $var_name:ident,
        name = $name:expr,
        projection = $projection:expr,
        features = $features:expr,
        dx = $dx:expr,
        dy = $dy:expr,
        dt_minutes = $dt:expr $(,)?
    ) => {
        #[doc = concat!("Dataset module `", $name, "`")]
        pub static $var_name: $crate::module::DatasetModule =
            $crate::module::DatasetModule::new($name, $projection, $features, $dx, $dy, $dt);

        ::inventory::submit! {
            $crate::module::DatasetModule::new($name, $projection, $features, $dx, $dy, $dt)
        }
    };
}

pub use crate::define_dataset_module;
