//! Density grid produced by 2-D histogram binning.
//!
//! Counts are stored row-major with a map-like orientation: row 0 holds the
//! bins with the largest y values and columns run west to east. Edge arrays
//! stay ascending on both axes; the per-row mids and heights are already in
//! north-up order so downstream code never has to re-apply the flip.

use serde::{Deserialize, Serialize};

use crate::error::{ContourError, Result};

/// Number of rows and columns of a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridShape {
    pub rows: usize,
    pub cols: usize,
}

impl GridShape {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Total number of cells.
    pub fn cells(&self) -> usize {
        self.rows * self.cols
    }
}

/// A fractional position in grid space.
///
/// Integer values land on bin centres; `row = 1.5` lies halfway between the
/// centres of rows 1 and 2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    pub row: f64,
    pub col: f64,
}

impl GridPoint {
    pub fn new(row: f64, col: f64) -> Self {
        Self { row, col }
    }
}

/// Two-dimensional array of sample counts with its bin geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DensityGrid {
    shape: GridShape,
    counts: Vec<u32>,
    x_edges: Vec<f64>,
    y_edges: Vec<f64>,
    col_mids: Vec<f64>,
    col_widths: Vec<f64>,
    row_mids: Vec<f64>,
    row_heights: Vec<f64>,
    samples: usize,
}

impl DensityGrid {
    /// Build a grid from externally computed counts.
    ///
    /// `counts` is row-major with row 0 the northernmost row. Both edge
    /// arrays must be ascending with one more entry than bins on their axis.
    pub fn from_counts(
        rows: usize,
        cols: usize,
        counts: Vec<u32>,
        x_edges: Vec<f64>,
        y_edges: Vec<f64>,
    ) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(ContourError::invalid_argument(
                "counts",
                format!("grid must have at least one row and column, got {rows}x{cols}"),
            ));
        }
        if counts.len() != rows * cols {
            return Err(ContourError::invalid_argument(
                "counts",
                format!("expected {} counts for a {rows}x{cols} grid, got {}", rows * cols, counts.len()),
            ));
        }
        if x_edges.len() != cols + 1 {
            return Err(ContourError::invalid_argument(
                "x_edges",
                format!("expected {} edges, got {}", cols + 1, x_edges.len()),
            ));
        }
        if y_edges.len() != rows + 1 {
            return Err(ContourError::invalid_argument(
                "y_edges",
                format!("expected {} edges, got {}", rows + 1, y_edges.len()),
            ));
        }
        crate::histogram::validate_edges("x_edges", &x_edges)?;
        crate::histogram::validate_edges("y_edges", &y_edges)?;

        let samples = counts.iter().map(|&c| c as usize).sum();
        Ok(Self::from_validated(counts, x_edges, y_edges, samples))
    }

    /// Assemble a grid whose inputs were already checked by the caller.
    pub(crate) fn from_validated(
        counts: Vec<u32>,
        x_edges: Vec<f64>,
        y_edges: Vec<f64>,
        samples: usize,
    ) -> Self {
        let shape = GridShape::new(y_edges.len() - 1, x_edges.len() - 1);

        let col_mids = x_edges.windows(2).map(|w| (w[0] + w[1]) / 2.0).collect();
        let col_widths = x_edges.windows(2).map(|w| w[1] - w[0]).collect();

        // Rows run north to south, so walk the y bins from the top down.
        let row_mids = y_edges.windows(2).rev().map(|w| (w[0] + w[1]) / 2.0).collect();
        let row_heights = y_edges.windows(2).rev().map(|w| w[1] - w[0]).collect();

        Self {
            shape,
            counts,
            x_edges,
            y_edges,
            col_mids,
            col_widths,
            row_mids,
            row_heights,
            samples,
        }
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    pub fn rows(&self) -> usize {
        self.shape.rows
    }

    pub fn cols(&self) -> usize {
        self.shape.cols
    }

    /// Count in the bin at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics when the position is outside the grid.
    pub fn count(&self, row: usize, col: usize) -> u32 {
        assert!(
            row < self.shape.rows && col < self.shape.cols,
            "bin ({row}, {col}) outside {}x{} grid",
            self.shape.rows,
            self.shape.cols
        );
        self.counts[row * self.shape.cols + col]
    }

    /// All counts, row-major, north row first.
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Counts of a single row.
    pub fn row(&self, row: usize) -> &[u32] {
        let start = row * self.shape.cols;
        &self.counts[start..start + self.shape.cols]
    }

    /// Ascending x bin edges (`cols + 1` values).
    pub fn x_edges(&self) -> &[f64] {
        &self.x_edges
    }

    /// Ascending y bin edges (`rows + 1` values).
    pub fn y_edges(&self) -> &[f64] {
        &self.y_edges
    }

    /// X coordinate of each column centre.
    pub fn col_mids(&self) -> &[f64] {
        &self.col_mids
    }

    /// Y coordinate of each row centre, north row first.
    pub fn row_mids(&self) -> &[f64] {
        &self.row_mids
    }

    pub fn col_width(&self, col: usize) -> f64 {
        self.col_widths[col]
    }

    pub fn row_height(&self, row: usize) -> f64 {
        self.row_heights[row]
    }

    /// Index into `y_edges` of the lower edge of `row`.
    pub fn y_bin_for_row(&self, row: usize) -> usize {
        self.shape.rows - 1 - row
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// Number of samples that were binned, including dropped outliers.
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Number of samples that fell outside the outer edges.
    pub fn outliers(&self) -> usize {
        self.samples.saturating_sub(self.total() as usize)
    }

    pub fn min_count(&self) -> u32 {
        self.counts.iter().copied().min().unwrap_or(0)
    }

    pub fn max_count(&self) -> u32 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Map a fractional grid position to domain `(x, y)` by interpolating
    /// between bin centres.
    pub fn grid_to_domain(&self, point: GridPoint) -> (f64, f64) {
        (
            interpolate_mids(&self.col_mids, point.col),
            interpolate_mids(&self.row_mids, point.row),
        )
    }
}

fn interpolate_mids(mids: &[f64], position: f64) -> f64 {
    let last = mids.len() - 1;
    if position <= 0.0 {
        return mids[0];
    }
    let index = (position.floor() as usize).min(last);
    let t = position - index as f64;
    if index == last || t == 0.0 {
        return mids[index];
    }
    mids[index] + t * (mids[index + 1] - mids[index])
}
