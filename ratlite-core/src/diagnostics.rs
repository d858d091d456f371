//! Non-fatal findings made while constructing a cutout
//!
//! Deprecated call shapes and module reconciliation never abort construction.
//! Each finding is logged and also kept on the cutout, so callers can inspect
//! them without parsing log output.

use log::Level;
use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// `xs`/`ys` were used instead of `x`/`y`
    DeprecatedAxisNames,
    /// `years`/`months` were used instead of `time`
    DeprecatedYearsMonths,
    /// No store exists yet at the resolved location
    NewCutout { path: PathBuf },
    /// No module was given nor recorded, so the default was taken
    ModuleDefaulted { module: String },
    /// The requested module replaced the one recorded in the dataset
    ModuleOverride {
        declared: String,
        recorded: Option<String>,
    },
}

impl Diagnostic {
    /// Stable identifier of the diagnostic kind
    pub fn code(&self) -> &'static str {
        match self {
            Diagnostic::DeprecatedAxisNames => "deprecated-axis-names",
            Diagnostic::DeprecatedYearsMonths => "deprecated-years-months",
            Diagnostic::NewCutout { .. } => "new-cutout",
            Diagnostic::ModuleDefaulted { .. } => "module-defaulted",
            Diagnostic::ModuleOverride { .. } => "module-override",
        }
    }

    pub fn is_deprecation(&self) -> bool {
        matches!(
            self,
            Diagnostic::DeprecatedAxisNames | Diagnostic::DeprecatedYearsMonths
        )
    }

    pub fn level(&self) -> Level {
        match self {
            Diagnostic::NewCutout { .. } => Level::Info,
            _ => Level::Warn,
        }
    }

    /// Write the diagnostic to the log
    pub fn emit(&self) {
        log::log!(self.level(), "{}", self);
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DeprecatedAxisNames => write!(
                f,
                "The arguments `xs` and `ys` have been deprecated in favour of `x` and `y`"
            ),
            Diagnostic::DeprecatedYearsMonths => write!(
                f,
                "The arguments `years` and `months` have been deprecated in favour of `time`"
            ),
            Diagnostic::NewCutout { path } => {
                write!(f, "Cutout not found at {}, building new one", path.display())
            }
            Diagnostic::ModuleDefaulted { module } => write!(
                f,
                "No module given as argument nor in the dataset. Falling back to '{}'.",
                module
            ),
            Diagnostic::ModuleOverride { declared, recorded } => write!(
                f,
                "Selected module '{}' disagrees with specification in dataset '{}'. Taking your choice.",
                declared,
                recorded.as_deref().unwrap_or("None")
            ),
        }
    }
}
