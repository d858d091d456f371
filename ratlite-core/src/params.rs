//! Cutout construction parameters
//!
//! Older call shapes are still accepted. [`normalize`] rewrites them into the
//! current form before any loading happens and reports what it rewrote:
//!
//! - `bounds` (optionally grown by `buffer`) becomes the `x` and `y` ranges
//! - `xs`/`ys` become `x`/`y`
//! - `years` (and optionally `months`) become a `time` range
//!
//! ```rust
//! use ratlite_core::params::{normalize, CutoutParams, YearSlice};
//!
//! let params = CutoutParams {
//!     years: Some(YearSlice::new(2010, 2012)),
//!     ..CutoutParams::default()
//! };
//! let (normalized, diagnostics) = normalize(params).unwrap();
//! let time = normalized.time.unwrap();
//! assert_eq!(time.start, "2010-1");
//! assert_eq!(time.stop, "2012-12");
//! assert_eq!(diagnostics[0].code(), "deprecated-years-months");
//! ```

use crate::diagnostics::Diagnostic;
use crate::errors::{CutoutError, CutoutResult};
use crate::time::Period;
use std::collections::BTreeMap;

/// An inclusive range of coordinate labels on one spatial axis
///
/// `start` may be larger than `stop` for axes stored in descending order.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CoordSlice {
    pub start: f64,
    pub stop: f64,
}

impl CoordSlice {
    pub fn new(start: f64, stop: f64) -> Self {
        Self { start, stop }
    }

    pub fn min(&self) -> f64 {
        self.start.min(self.stop)
    }

    pub fn max(&self) -> f64 {
        self.start.max(self.stop)
    }

    pub fn contains(&self, value: f64) -> bool {
        let eps = 1e-9 * (1.0 + self.max().abs().max(self.min().abs()));
        value >= self.min() - eps && value <= self.max() + eps
    }

    /// True if `self` covers `other` with room to spare on both ends
    pub fn strictly_contains(&self, other: &CoordSlice) -> bool {
        self.min() < other.min() && self.max() > other.max()
    }
}

/// A range of partial time labels, inclusive of the whole `stop` period
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeSlice {
    pub start: String,
    pub stop: String,
}

impl TimeSlice {
    pub fn new(start: impl Into<String>, stop: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            stop: stop.into(),
        }
    }

    /// The covered interval, from the start of `start` to the end of `stop`
    pub fn period(&self) -> CutoutResult<Period> {
        let start = Period::parse(&self.start)?;
        let stop = Period::parse(&self.stop)?;
        Ok(Period {
            start: start.start,
            end: stop.end,
        })
    }
}

/// A bounding box `(x1, y1, x2, y2)`
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Bounds {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl Bounds {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Grow the box by `buffer` on every side
    ///
    /// Only the extent of the buffered shape matters here, so rounding of the
    /// corners is irrelevant.
    pub fn buffered(&self, buffer: f64) -> Self {
        if buffer <= 0.0 {
            return *self;
        }
        Self {
            x1: self.x1.min(self.x2) - buffer,
            y1: self.y1.min(self.y2) - buffer,
            x2: self.x1.max(self.x2) + buffer,
            y2: self.y1.max(self.y2) + buffer,
        }
    }

    pub fn x(&self) -> CoordSlice {
        CoordSlice::new(self.x1, self.x2)
    }

    pub fn y(&self) -> CoordSlice {
        CoordSlice::new(self.y1, self.y2)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct YearSlice {
    pub start: i32,
    pub stop: i32,
}

impl YearSlice {
    pub fn new(start: i32, stop: i32) -> Self {
        Self { start, stop }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct MonthSlice {
    pub start: u32,
    pub stop: u32,
}

impl MonthSlice {
    pub fn new(start: u32, stop: u32) -> Self {
        Self { start, stop }
    }
}

impl Default for MonthSlice {
    fn default() -> Self {
        Self::new(1, 12)
    }
}

/// Parameters accepted when constructing a cutout
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CutoutParams {
    pub x: Option<CoordSlice>,
    pub y: Option<CoordSlice>,
    pub time: Option<TimeSlice>,
    pub bounds: Option<Bounds>,
    /// Margin added around `bounds`
    pub buffer: Option<f64>,
    #[deprecated(since = "0.1.0", note = "Use `x` instead")]
    pub xs: Option<CoordSlice>,
    #[deprecated(since = "0.1.0", note = "Use `y` instead")]
    pub ys: Option<CoordSlice>,
    #[deprecated(since = "0.1.0", note = "Use `time` instead")]
    pub years: Option<YearSlice>,
    #[deprecated(since = "0.1.0", note = "Use `time` instead")]
    pub months: Option<MonthSlice>,
    pub module: Option<String>,
    /// Additional parameters, passed through to module specific code
    pub extra: BTreeMap<String, String>,
}

impl CutoutParams {
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

    pub fn with_module(mut self, module: impl Into<String>) -> Self {
        self.module = Some(module.into());
        self
    }
}

/// Parameters after deprecated forms have been rewritten
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NormalizedParams {
    pub x: Option<CoordSlice>,
    pub y: Option<CoordSlice>,
    pub time: Option<TimeSlice>,
    pub module: Option<String>,
    pub extra: BTreeMap<String, String>,
}

impl NormalizedParams {
    /// Names of the required `x`, `y` and `time` parameters which are absent
    pub fn missing_required(&self) -> Vec<String> {
        let mut missing = vec![];
        if self.x.is_none() {
            missing.push("`x`".to_string());
        }
        if self.y.is_none() {
            missing.push("`y`".to_string());
        }
        if self.time.is_none() {
            missing.push("`time`".to_string());
        }
        missing
    }
}

/// Rewrite deprecated parameter forms into [`NormalizedParams`]
///
/// # Errors
///
/// Returns [`CutoutError::InvalidParameters`] if `months` is given without `years`.
#[allow(deprecated)]
pub fn normalize(params: CutoutParams) -> CutoutResult<(NormalizedParams, Vec<Diagnostic>)> {
    let mut diagnostics = vec![];
    let CutoutParams {
        mut x,
        mut y,
        mut time,
        bounds,
        buffer,
        xs,
        ys,
        years,
        months,
        module,
        extra,
    } = params;

    if let Some(bounds) = bounds {
        let bounds = bounds.buffered(buffer.unwrap_or(0.0));
        x = Some(bounds.x());
        y = Some(bounds.y());
    }

    if xs.is_some() || ys.is_some() {
        diagnostics.push(Diagnostic::DeprecatedAxisNames);
        if let Some(xs) = xs {
            x = Some(xs);
        }
        if let Some(ys) = ys {
            y = Some(ys);
        }
    }

    if years.is_some() || months.is_some() {
        diagnostics.push(Diagnostic::DeprecatedYearsMonths);
        let years = years.ok_or_else(|| {
            CutoutError::InvalidParameters("`months` requires `years` to be given".to_string())
        })?;
        let months = months.unwrap_or_default();
        time = Some(TimeSlice::new(
            format!("{}-{}", years.start, months.start),
            format!("{}-{}", years.stop, months.stop),
        ));
    }

    let normalized = NormalizedParams {
        x,
        y,
        time,
        module,
        extra,
    };
    Ok((normalized, diagnostics))
}
