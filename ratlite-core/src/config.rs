//! Runtime configuration for locating cutouts
//!
//! A [`Config`] is normally read from a TOML file:
//!
//! ```toml
//! cutout_dir = "/data/cutouts"
//! sindex_suffix = "json"
//! ```
//!
//! The file named by the `RATLITE_CONFIG` environment variable is used when
//! no configuration is passed explicitly (see [`ensure_config`]).

use crate::errors::{CutoutError, CutoutResult};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the configuration file
pub const CONFIG_ENV_VAR: &str = "RATLITE_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Secondary directory searched for cutouts, and the default location of new ones
    pub cutout_dir: Option<PathBuf>,
    /// File suffix of the grid-cell cache artifact (`<name>.sindex.<suffix>`)
    pub sindex_suffix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cutout_dir: None,
            sindex_suffix: "json".to_string(),
        }
    }
}

impl Config {
    pub fn with_cutout_dir(cutout_dir: impl Into<PathBuf>) -> Self {
        Self {
            cutout_dir: Some(cutout_dir.into()),
            ..Self::default()
        }
    }

    pub fn from_toml_str(contents: &str) -> CutoutResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Read a configuration from a TOML file
    pub fn from_file(path: &Path) -> CutoutResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| CutoutError::Config {
            path: path.to_path_buf(),
            details: e.to_string(),
        })?;
        toml::from_str(&contents).map_err(|e| CutoutError::Config {
            path: path.to_path_buf(),
            details: e.to_string(),
        })
    }

    /// Read the configuration named by `RATLITE_CONFIG`, or the defaults if it is unset
    pub fn from_env() -> CutoutResult<Self> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }
}

/// Use the given configuration, falling back to the environment and then the defaults
pub fn ensure_config(config: Option<Config>) -> Config {
    match config {
        Some(config) => config,
        None => Config::from_env().unwrap_or_else(|e| {
            warn!("{}. Falling back to the default configuration.", e);
            Config::default()
        }),
    }
}
