//! Built-in dataset modules
//!
//! Linking this crate registers the modules below with
//! [`ratlite_core::module::MODULE_REGISTRY`]:
//!
//! | name     | projection        | grid        | time step |
//! |----------|-------------------|-------------|-----------|
//! | `era5`   | `latlong`         | 0.25°       | 1 h       |
//! | `sarah`  | `latlong`         | 0.05°       | 30 min    |
//! | `ncep`   | `latlong`         | 0.5°        | 1 h       |
//! | `cordex` | `rotated_latlong` | 0.44°       | 3 h       |

pub mod datasets;

pub use datasets::{CORDEX, ERA5, NCEP, SARAH};

/// Names of the modules shipped with this crate
pub const BUILTIN_MODULES: [&str; 4] = ["cordex", "era5", "ncep", "sarah"];
