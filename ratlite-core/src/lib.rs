//! Cutouts: named grids of weather data over a time range
//!
//! The entry point is [`CutoutBuilder`], which resolves a cutout name to a
//! location, loads or declares its dataset and resolves the dataset module
//! governing it.

pub mod config;
pub mod cutout;
pub mod dataset;
pub mod diagnostics;
pub mod gis;
pub mod legacy;
pub mod loader;
pub mod metadata;
pub mod module;
pub mod params;
pub mod path;
pub mod store;
pub mod time;

pub mod errors;

#[cfg(test)]
mod testing;

pub use crate::cutout::{Cutout, CutoutBuilder, Selection};
pub use crate::errors::{CutoutError, CutoutResult};
