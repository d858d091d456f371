//! Grid cells of a cutout and their overlap with arbitrary shapes
//!
//! Every grid point owns a rectangular cell reaching half a grid spacing in
//! each direction. The [`IndicatorMatrix`] maps shapes onto these cells and is
//! used to aggregate gridded values over regions.
//!
//! # Examples
//!
//! ```rust
//! use geo_types::{polygon, MultiPolygon};
//! use ndarray::array;
//! use ratlite_core::gis::GridCells;
//!
//! let cells = GridCells::from_axes(&array![0.0, 1.0], &array![0.0, 1.0]);
//! assert_eq!(cells.len(), 4);
//!
//! // A shape covering the left half of the first cell
//! let shape: MultiPolygon<f64> =
//!     polygon![(x: -0.5, y: -0.5), (x: 0.0, y: -0.5), (x: 0.0, y: 0.5), (x: -0.5, y: 0.5)].into();
//! let matrix = cells.indicatormatrix(&[shape], "latlong");
//! assert!((matrix.get(0, 0) - 0.5).abs() < 1e-12);
//! assert_eq!(matrix.get(0, 1), 0.0);
//! ```

use crate::errors::CutoutResult;
use geo::{Area, BooleanOps, BoundingRect, Intersects};
use geo_types::{coord, MultiPolygon, Polygon, Rect};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Where a set of grid cells came from
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum GridCellsOrigin {
    /// Built from the coordinate grid
    #[default]
    Built,
    /// Read from a cache file
    Cache,
}

/// Cell footprints of a coordinate grid, in row-major order (y outer, x inner)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCells {
    /// Grid points as `(x, y)`
    coords: Vec<(f64, f64)>,
    cells: Vec<Polygon<f64>>,
    #[serde(skip)]
    origin: GridCellsOrigin,
}

impl GridCells {
    /// Build cells around the cross product of the `x` and `y` labels
    ///
    /// Axes with a single label give zero-area cells, see [`GridCells::from_grid`].
    pub fn from_axes(x: &Array1<f64>, y: &Array1<f64>) -> Self {
        Self::from_grid(x, y, (0.0, 0.0))
    }

    /// Like [`GridCells::from_axes`], using `fallback` as the `(dx, dy)` spacing
    /// of axes with fewer than two labels
    pub fn from_grid(x: &Array1<f64>, y: &Array1<f64>, fallback: (f64, f64)) -> Self {
        let half_dx = half_spacing(x, fallback.0);
        let half_dy = half_spacing(y, fallback.1);

        let mut coords = Vec::with_capacity(x.len() * y.len());
        let mut cells = Vec::with_capacity(x.len() * y.len());
        for &yv in y.iter() {
            for &xv in x.iter() {
                coords.push((xv, yv));
                let rect = Rect::new(
                    coord! { x: xv - half_dx, y: yv - half_dy },
                    coord! { x: xv + half_dx, y: yv + half_dy },
                );
                cells.push(rect.to_polygon());
            }
        }

        Self {
            coords,
            cells,
            origin: GridCellsOrigin::Built,
        }
    }

    /// Read cells from a cache file written by [`GridCells::to_file`]
    pub fn from_file(path: &Path) -> CutoutResult<Self> {
        let reader = BufReader::new(File::open(path)?);
        let mut cells: GridCells = serde_json::from_reader(reader)?;
        cells.origin = GridCellsOrigin::Cache;
        Ok(cells)
    }

    pub fn to_file(&self, path: &Path) -> CutoutResult<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(writer, self)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cells(&self) -> &[Polygon<f64>] {
        &self.cells
    }

    pub fn coords(&self) -> &[(f64, f64)] {
        &self.coords
    }

    pub fn origin(&self) -> GridCellsOrigin {
        self.origin
    }

    /// True if the cells sit on the grid spanned by `x` and `y`
    pub fn matches_axes(&self, x: &Array1<f64>, y: &Array1<f64>) -> bool {
        let n = x.len() * y.len();
        if self.coords.len() != n || self.cells.len() != n {
            return false;
        }
        let grid = y.iter().flat_map(|&yv| x.iter().map(move |&xv| (xv, yv)));
        self.coords.iter().copied().eq(grid)
    }

    /// True if both hold the same cells, wherever they came from
    pub fn same_cells(&self, other: &GridCells) -> bool {
        self.coords == other.coords && self.cells == other.cells
    }

    /// Overlap of `shapes` with the cells, using [`AreaOverlap`]
    ///
    /// `shapes_projection` is handed to the kernel as is. No reprojection or
    /// validation against the cutout's projection happens here.
    pub fn indicatormatrix(
        &self,
        shapes: &[MultiPolygon<f64>],
        shapes_projection: &str,
    ) -> IndicatorMatrix {
        self.indicatormatrix_with(&AreaOverlap, shapes, shapes_projection)
    }

    pub fn indicatormatrix_with(
        &self,
        kernel: &dyn OverlapKernel,
        shapes: &[MultiPolygon<f64>],
        shapes_projection: &str,
    ) -> IndicatorMatrix {
        kernel.overlap(&self.cells, shapes, shapes_projection)
    }
}

fn half_spacing(axis: &Array1<f64>, fallback: f64) -> f64 {
    if axis.len() < 2 {
        fallback.abs() / 2.0
    } else {
        (axis[1] - axis[0]).abs() / 2.0
    }
}

/// Sparse weights from shapes (rows) to grid cells (columns)
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorMatrix {
    shape: (usize, usize),
    entries: Vec<(usize, usize, f64)>,
}

impl IndicatorMatrix {
    pub fn new(shape: (usize, usize)) -> Self {
        Self {
            shape,
            entries: vec![],
        }
    }

    /// Set a weight. Zero weights are not stored.
    pub fn push(&mut self, row: usize, col: usize, weight: f64) {
        assert!(
            row < self.shape.0 && col < self.shape.1,
            "Entry ({}, {}) is outside a {:?} matrix",
            row,
            col,
            self.shape
        );
        if weight != 0.0 {
            self.entries.push((row, col, weight));
        }
    }

    /// `(number of shapes, number of cells)`
    pub fn shape(&self) -> (usize, usize) {
        self.shape
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.entries
            .iter()
            .filter(|(r, c, _)| *r == row && *c == col)
            .map(|(_, _, w)| w)
            .sum()
    }

    /// Non-zero `(column, weight)` pairs of one shape
    pub fn row(&self, row: usize) -> Vec<(usize, f64)> {
        self.entries
            .iter()
            .filter(|(r, _, _)| *r == row)
            .map(|(_, c, w)| (*c, *w))
            .collect()
    }

    pub fn entries(&self) -> &[(usize, usize, f64)] {
        &self.entries
    }

    pub fn to_dense(&self) -> Array2<f64> {
        let mut dense = Array2::zeros(self.shape);
        for &(r, c, w) in &self.entries {
            dense[[r, c]] += w;
        }
        dense
    }
}

/// Computes the weights linking shapes to grid cells
pub trait OverlapKernel: Debug {
    fn overlap(
        &self,
        cells: &[Polygon<f64>],
        shapes: &[MultiPolygon<f64>],
        shapes_projection: &str,
    ) -> IndicatorMatrix;
}

/// Weight is the share of a cell's area covered by a shape
#[derive(Debug, Clone, Copy, Default)]
pub struct AreaOverlap;

impl OverlapKernel for AreaOverlap {
    fn overlap(
        &self,
        cells: &[Polygon<f64>],
        shapes: &[MultiPolygon<f64>],
        _shapes_projection: &str,
    ) -> IndicatorMatrix {
        let mut matrix = IndicatorMatrix::new((shapes.len(), cells.len()));
        let cell_bounds: Vec<Option<Rect<f64>>> =
            cells.iter().map(|cell| cell.bounding_rect()).collect();

        for (row, shape) in shapes.iter().enumerate() {
            let Some(shape_bounds) = shape.bounding_rect() else {
                continue;
            };
            for (col, cell) in cells.iter().enumerate() {
                let Some(bounds) = cell_bounds[col] else {
                    continue;
                };
                if !bounds.intersects(&shape_bounds) {
                    continue;
                }
                let cell_area = cell.unsigned_area();
                if cell_area == 0.0 {
                    continue;
                }
                let cell = MultiPolygon::new(vec![cell.clone()]);
                let covered = cell.intersection(shape).unsigned_area();
                matrix.push(row, col, covered / cell_area);
            }
        }
        matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::polygon;
    use is_close::is_close;
    use ndarray::array;

    fn square(x0: f64, y0: f64, x1: f64, y1: f64) -> MultiPolygon<f64> {
        Rect::new(coord! { x: x0, y: y0 }, coord! { x: x1, y: y1 })
            .to_polygon()
            .into()
    }

    #[test]
    fn cells_are_row_major() {
        let cells = GridCells::from_axes(&array![0.0, 0.5, 1.0], &array![10.0, 9.5]);
        assert_eq!(cells.len(), 6);
        assert_eq!(cells.coords()[0], (0.0, 10.0));
        assert_eq!(cells.coords()[1], (0.5, 10.0));
        assert_eq!(cells.coords()[3], (0.0, 9.5));
        assert_eq!(cells.origin(), GridCellsOrigin::Built);

        let rect = cells.cells()[4].bounding_rect().unwrap();
        assert!(is_close!(rect.min().x, 0.25));
        assert!(is_close!(rect.max().y, 9.75));
        assert!(is_close!(cells.cells()[4].unsigned_area(), 0.25));
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("europe.sindex.json");
        let cells = GridCells::from_axes(&array![0.0, 0.5], &array![1.0, 1.5]);

        cells.to_file(&path).unwrap();
        let loaded = GridCells::from_file(&path).unwrap();
        assert_eq!(loaded.origin(), GridCellsOrigin::Cache);
        assert!(loaded.same_cells(&cells));
    }

    #[test]
    fn truncated_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("europe.sindex.json");
        GridCells::from_axes(&array![0.0, 0.5], &array![1.0, 1.5])
            .to_file(&path)
            .unwrap();
        let contents = std::fs::read(&path).unwrap();
        std::fs::write(&path, &contents[..contents.len() / 2]).unwrap();

        assert!(GridCells::from_file(&path).is_err());
    }

    #[test]
    fn indicator_weights() {
        let cells = GridCells::from_axes(&array![0.0, 1.0], &array![0.0, 1.0]);
        // Covers the whole first cell and a quarter of the second, touching the upper row
        let shape = square(-0.5, -0.5, 0.75, 0.5);
        let matrix = cells.indicatormatrix(&[shape], "latlong");

        assert_eq!(matrix.shape(), (1, 4));
        assert_eq!(matrix.nnz(), 2);
        assert!(is_close!(matrix.get(0, 0), 1.0));
        assert!(is_close!(matrix.get(0, 1), 0.25));

        let dense = matrix.to_dense();
        assert!(is_close!(dense[[0, 1]], 0.25));
    }

    #[test]
    fn disjoint_shapes_have_no_entries() {
        let cells = GridCells::from_axes(&array![0.0, 1.0], &array![0.0, 1.0]);
        let far = square(10.0, 10.0, 11.0, 11.0);
        let triangle: MultiPolygon<f64> =
            polygon![(x: -0.5, y: -0.5), (x: 0.5, y: -0.5), (x: -0.5, y: 0.5)].into();
        let matrix = cells.indicatormatrix(&[far, triangle], "latlong");

        assert_eq!(matrix.shape(), (2, 4));
        assert!(matrix.row(0).is_empty());
        assert_eq!(matrix.row(1).len(), 1);
        assert!(is_close!(matrix.get(1, 0), 0.5));
    }

    #[test]
    fn single_point_axes_use_fallback_spacing() {
        let cells = GridCells::from_grid(&array![0.0], &array![0.0], (0.5, 0.5));
        assert!(is_close!(cells.cells()[0].unsigned_area(), 0.25));
        let matrix = cells.indicatormatrix(&[square(-1.0, -1.0, 1.0, 1.0)], "latlong");
        assert_eq!(matrix.nnz(), 1);
        assert!(is_close!(matrix.get(0, 0), 1.0));

        // A single column next to a regular y axis
        let column = GridCells::from_grid(&array![2.0], &array![0.0, 1.0], (0.5, 0.5));
        let rect = column.cells()[1].bounding_rect().unwrap();
        assert!(is_close!(rect.min().x, 1.75));
        assert!(is_close!(rect.max().y, 1.5));
    }

    #[test]
    fn matching_axes() {
        let x = array![0.0, 0.5, 1.0];
        let y = array![10.0, 9.5];
        let cells = GridCells::from_axes(&x, &y);
        assert!(cells.matches_axes(&x, &y));
        assert!(!cells.matches_axes(&y, &x));
        assert!(!cells.matches_axes(&array![0.0, 0.5, 1.5], &y));
        assert!(!cells.matches_axes(&x, &array![10.0]));
    }
}
