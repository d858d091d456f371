use std::path::PathBuf;
use thiserror::Error;

/// Error type for cutout construction and access.
#[derive(Error, Debug)]
pub enum CutoutError {
    #[error("Arguments {} need to be specified (or `bounds` instead of `x` and `y`)", .missing.join(", "))]
    MissingParameters { missing: Vec<String> },
    #[error("Invalid construction parameters: {0}")]
    InvalidParameters(String),
    #[error("{path} does not have the required attribute `{attribute}`")]
    MissingAttribute { path: String, attribute: String },
    #[error("Attribute `{attribute}` has an unexpected value: {details}")]
    InvalidAttribute { attribute: String, details: String },
    #[error("Unknown dataset module '{0}'")]
    UnknownModule(String),
    #[error("Dataset module '{0}' is already registered")]
    DuplicateModule(String),
    #[error("Cutout '{name}' is a view and cannot be {operation}")]
    View { name: String, operation: String },
    #[error("Coordinate `{axis}` is invalid: {details}")]
    InvalidCoordinate { axis: String, details: String },
    #[error("Could not parse time label '{0}'")]
    InvalidTime(String),
    #[error("Failed to read configuration file {path}: {details}")]
    Config { path: PathBuf, details: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

/// Convenience type for `Result<T, CutoutError>`.
pub type CutoutResult<T> = Result<T, CutoutError>;
