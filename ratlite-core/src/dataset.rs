//! In-memory dataset handle: coordinates, data variables and metadata
//!
//! Data variables are laid out as `(time, y, x)`.

use crate::errors::{CutoutError, CutoutResult};
use crate::metadata::CutoutMetadata;
use crate::params::{CoordSlice, TimeSlice};
use chrono::NaiveDateTime;
use ndarray::{s, Array1, Array2, Array3};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;

/// Coordinate labels of a cutout grid
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: Array1<f64>,
    pub y: Array1<f64>,
    pub time: Vec<NaiveDateTime>,
}

impl Coordinates {
    pub fn new(x: Array1<f64>, y: Array1<f64>, time: Vec<NaiveDateTime>) -> Self {
        Self { x, y, time }
    }

    /// True until the grid has been materialized
    pub fn is_empty(&self) -> bool {
        self.x.is_empty() && self.y.is_empty() && self.time.is_empty()
    }

    /// `(rows, columns)`, i.e. the lengths of the y and x axes
    pub fn shape(&self) -> (usize, usize) {
        (self.y.len(), self.x.len())
    }

    /// Grid points as an `(n, 2)` array of `(x, y)`, with y outer and x inner
    pub fn grid_coordinates(&self) -> Array2<f64> {
        let (ny, nx) = self.shape();
        Array2::from_shape_fn((ny * nx, 2), |(i, j)| {
            if j == 0 {
                self.x[i % nx]
            } else {
                self.y[i / nx]
            }
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub coords: Coordinates,
    pub variables: BTreeMap<String, Array3<f64>>,
    pub metadata: CutoutMetadata,
}

/// Label-based selection on a dataset
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Indexer {
    pub x: Option<CoordSlice>,
    pub y: Option<CoordSlice>,
    pub time: Option<TimeSlice>,
}

impl Dataset {
    pub fn new(coords: Coordinates, metadata: CutoutMetadata) -> Self {
        Self {
            coords,
            variables: BTreeMap::new(),
            metadata,
        }
    }

    /// `(time, y, x)` lengths every data variable must have
    pub fn grid_dim(&self) -> (usize, usize, usize) {
        (
            self.coords.time.len(),
            self.coords.y.len(),
            self.coords.x.len(),
        )
    }

    fn check_dim(&self, name: &str, values: &Array3<f64>) -> CutoutResult<()> {
        let expected = self.grid_dim();
        if values.dim() != expected {
            return Err(CutoutError::InvalidCoordinate {
                axis: name.to_string(),
                details: format!(
                    "variable has shape {:?}, grid is {:?}",
                    values.dim(),
                    expected
                ),
            });
        }
        Ok(())
    }

    /// Add a data variable, checking that it matches the `(time, y, x)` grid
    pub fn insert_variable(&mut self, name: &str, values: Array3<f64>) -> CutoutResult<()> {
        self.check_dim(name, &values)?;
        self.variables.insert(name.to_string(), values);
        Ok(())
    }

    /// Check that every data variable matches the grid
    ///
    /// Needed for datasets assembled field by field, since `variables` is public.
    pub fn validate(&self) -> CutoutResult<()> {
        self.variables
            .iter()
            .try_for_each(|(name, values)| self.check_dim(name, values))
    }

    /// Select by coordinate labels
    ///
    /// Spatial ranges are inclusive and work for ascending and descending axes.
    /// A time range covers the whole period named by its `stop` label.
    pub fn sel(&self, indexer: &Indexer) -> CutoutResult<Dataset> {
        let x = match &indexer.x {
            Some(slice) => label_range(self.coords.x.iter().copied(), |v| slice.contains(v)),
            None => 0..self.coords.x.len(),
        };
        let y = match &indexer.y {
            Some(slice) => label_range(self.coords.y.iter().copied(), |v| slice.contains(v)),
            None => 0..self.coords.y.len(),
        };
        let time = match &indexer.time {
            Some(slice) => {
                let period = slice.period()?;
                label_range(self.coords.time.iter(), |t| period.contains(t))
            }
            None => 0..self.coords.time.len(),
        };

        let coords = Coordinates {
            x: self.coords.x.slice(s![x.clone()]).to_owned(),
            y: self.coords.y.slice(s![y.clone()]).to_owned(),
            time: self.coords.time[time.clone()].to_vec(),
        };
        let variables = self
            .variables
            .iter()
            .map(|(name, values)| {
                let selected = values
                    .slice(s![time.clone(), y.clone(), x.clone()])
                    .to_owned();
                (name.clone(), selected)
            })
            .collect();

        Ok(Dataset {
            coords,
            variables,
            metadata: self.metadata.clone(),
        })
    }
}

/// Smallest contiguous index range covering every label accepted by `keep`
fn label_range<T>(labels: impl Iterator<Item = T>, keep: impl Fn(T) -> bool) -> Range<usize> {
    let mut first = None;
    let mut last = 0;
    for (i, label) in labels.enumerate() {
        if keep(label) {
            first.get_or_insert(i);
            last = i;
        }
    }
    match first {
        Some(first) => first..last + 1,
        None => 0..0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ndarray::array;

    fn hour(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2013, 1, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn sample() -> Dataset {
        let coords = Coordinates::new(
            array![0.0, 0.25, 0.5, 0.75],
            array![51.0, 50.75, 50.5],
            vec![hour(1, 0), hour(1, 1), hour(2, 0)],
        );
        let mut ds = Dataset::new(coords, CutoutMetadata::default());
        let values = Array3::from_shape_fn((3, 3, 4), |(t, y, x)| (t * 100 + y * 10 + x) as f64);
        ds.insert_variable("temperature", values).unwrap();
        ds
    }

    #[test]
    fn grid_coordinates_are_row_major() {
        let ds = sample();
        let grid = ds.coords.grid_coordinates();
        assert_eq!(grid.dim(), (12, 2));
        assert_eq!(grid.row(0).to_vec(), vec![0.0, 51.0]);
        assert_eq!(grid.row(1).to_vec(), vec![0.25, 51.0]);
        assert_eq!(grid.row(4).to_vec(), vec![0.0, 50.75]);
        assert_eq!(grid.row(11).to_vec(), vec![0.75, 50.5]);
    }

    #[test]
    fn select_spatial_ranges() {
        let ds = sample();
        let indexer = Indexer {
            x: Some(CoordSlice::new(0.25, 0.5)),
            // Order of the bounds does not matter on a descending axis
            y: Some(CoordSlice::new(50.5, 50.75)),
            time: None,
        };
        let selected = ds.sel(&indexer).unwrap();
        assert_eq!(selected.coords.x, array![0.25, 0.5]);
        assert_eq!(selected.coords.y, array![50.75, 50.5]);
        assert_eq!(selected.coords.time.len(), 3);

        let values = &selected.variables["temperature"];
        assert_eq!(values.dim(), (3, 2, 2));
        assert_eq!(values[[0, 0, 0]], 11.0);
        // The source is untouched
        assert_eq!(ds.coords.shape(), (3, 4));
    }

    #[test]
    fn select_time_period() {
        let ds = sample();
        let indexer = Indexer {
            time: Some(TimeSlice::new("2013-01-01", "2013-01-01")),
            ..Indexer::default()
        };
        let selected = ds.sel(&indexer).unwrap();
        assert_eq!(selected.coords.time, vec![hour(1, 0), hour(1, 1)]);
        assert_eq!(selected.variables["temperature"].dim(), (2, 3, 4));
    }

    #[test]
    fn empty_selection() {
        let ds = sample();
        let indexer = Indexer {
            x: Some(CoordSlice::new(10.0, 11.0)),
            ..Indexer::default()
        };
        let selected = ds.sel(&indexer).unwrap();
        assert!(selected.coords.x.is_empty());
        assert_eq!(selected.variables["temperature"].dim(), (3, 3, 0));
    }

    #[test]
    fn variable_shape_is_checked() {
        let mut ds = sample();
        let result = ds.insert_variable("wrong", Array3::zeros((1, 1, 1)));
        assert!(matches!(result, Err(CutoutError::InvalidCoordinate { .. })));
    }

    #[test]
    fn validate_catches_direct_insertion() {
        let mut ds = sample();
        assert!(ds.validate().is_ok());
        ds.variables
            .insert("wrong".to_string(), Array3::zeros((1, 1, 1)));
        match ds.validate() {
            Err(CutoutError::InvalidCoordinate { axis, .. }) => assert_eq!(axis, "wrong"),
            other => panic!("unexpected {:?}", other),
        }
    }
}
