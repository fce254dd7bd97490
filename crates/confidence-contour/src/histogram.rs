//! Two-dimensional histogram binning.
//!
//! Binning follows numpy's `histogram2d`: linearly spaced edges, one outlier
//! bin added on each side of every axis, right-closed insertion search, and a
//! sample equal to the last edge folded back into the last inner bin. The
//! outlier ring is stripped before the grid is returned.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ContourError, Result};
use crate::grid::DensityGrid;

/// Bins per axis when neither `bins` nor `edges` is supplied.
pub const DEFAULT_BINS: usize = 50;

/// A value applied to both axes, or one value per axis (x first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisPair<T> {
    Both(T),
    PerAxis(T, T),
}

impl<T> AxisPair<T> {
    pub fn x(&self) -> &T {
        match self {
            AxisPair::Both(value) => value,
            AxisPair::PerAxis(x, _) => x,
        }
    }

    pub fn y(&self) -> &T {
        match self {
            AxisPair::Both(value) => value,
            AxisPair::PerAxis(_, y) => y,
        }
    }
}

/// How samples are divided into bins.
///
/// `bins` and `edges` are mutually exclusive. `range` only applies to
/// `bins` (or the default bin count) and is ignored when `edges` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BinningOptions {
    /// Number of bins, for both axes or per axis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bins: Option<AxisPair<usize>>,
    /// Explicit ascending bin edges, for both axes or per axis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edges: Option<AxisPair<Vec<f64>>>,
    /// Outer `(min, max)` limits for x and y.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[(f64, f64); 2]>,
}

impl BinningOptions {
    pub fn with_bins(bins: usize) -> Self {
        Self {
            bins: Some(AxisPair::Both(bins)),
            ..Default::default()
        }
    }

    pub fn with_bins_xy(x_bins: usize, y_bins: usize) -> Self {
        Self {
            bins: Some(AxisPair::PerAxis(x_bins, y_bins)),
            ..Default::default()
        }
    }

    pub fn with_edges(edges: Vec<f64>) -> Self {
        Self {
            edges: Some(AxisPair::Both(edges)),
            ..Default::default()
        }
    }

    pub fn with_edges_xy(x_edges: Vec<f64>, y_edges: Vec<f64>) -> Self {
        Self {
            edges: Some(AxisPair::PerAxis(x_edges, y_edges)),
            ..Default::default()
        }
    }

    /// Set the outer limits for both axes.
    pub fn range(mut self, x: (f64, f64), y: (f64, f64)) -> Self {
        self.range = Some([x, y]);
        self
    }
}

/// Bin two coordinate arrays into a [`DensityGrid`].
///
/// # Arguments
/// * `array_x` - X coordinate of every sample
/// * `array_y` - Y coordinate of every sample (same length as `array_x`)
/// * `options` - Bin counts or edges, and optional outer range
///
/// # Errors
///
/// Fails before allocating anything when the arrays differ in length, when
/// `bins` and `edges` are both given, when a bin count is zero, when edges are
/// not strictly increasing, or when a range has `max <= min`.
pub fn histogram2d(array_x: &[f64], array_y: &[f64], options: &BinningOptions) -> Result<DensityGrid> {
    if array_x.len() != array_y.len() {
        return Err(ContourError::LengthMismatch {
            x_len: array_x.len(),
            y_len: array_y.len(),
        });
    }

    let (x_edges, y_edges) = resolve_edges(array_x, array_y, options)?;
    let counts = count_samples(array_x, array_y, &x_edges, &y_edges);
    let grid = DensityGrid::from_validated(counts, x_edges, y_edges, array_x.len());

    debug!(
        samples = grid.samples(),
        in_range = grid.total(),
        outliers = grid.outliers(),
        rows = grid.rows(),
        cols = grid.cols(),
        "Built density grid"
    );

    Ok(grid)
}

/// Work out the x and y edge arrays for a set of samples.
pub fn resolve_edges(
    array_x: &[f64],
    array_y: &[f64],
    options: &BinningOptions,
) -> Result<(Vec<f64>, Vec<f64>)> {
    match (&options.bins, &options.edges) {
        (Some(_), Some(_)) => Err(ContourError::conflicting("bins", "edges")),
        (None, Some(edges)) => {
            if options.range.is_some() {
                warn!("range is ignored when explicit bin edges are supplied");
            }
            validate_edges("edges", edges.x())?;
            validate_edges("edges", edges.y())?;
            Ok((edges.x().clone(), edges.y().clone()))
        }
        (bins, None) => {
            let (x_bins, y_bins) = match bins {
                Some(bins) => (*bins.x(), *bins.y()),
                None => (DEFAULT_BINS, DEFAULT_BINS),
            };
            if x_bins == 0 || y_bins == 0 {
                return Err(ContourError::invalid_argument(
                    "bins",
                    format!("bin counts must be positive integers, got ({x_bins}, {y_bins})"),
                ));
            }

            let (x_range, y_range) = match options.range {
                Some([x, y]) => (Some(x), Some(y)),
                None => (None, None),
            };
            let (x_first, x_last) = outer_edges("array_x", array_x, x_range)?;
            let (y_first, y_last) = outer_edges("array_y", array_y, y_range)?;

            Ok((
                linspace(x_first, x_last, x_bins + 1),
                linspace(y_first, y_last, y_bins + 1),
            ))
        }
    }
}

/// Check that an edge array has at least two finite, strictly increasing values.
pub(crate) fn validate_edges(param: &'static str, edges: &[f64]) -> Result<()> {
    if edges.len() < 2 {
        return Err(ContourError::invalid_argument(
            param,
            format!("at least two edges are required, got {}", edges.len()),
        ));
    }
    if let Some(bad) = edges.iter().find(|e| !e.is_finite()) {
        return Err(ContourError::invalid_argument(
            param,
            format!("edges must be finite, found {bad}"),
        ));
    }
    if edges.windows(2).any(|w| w[0] >= w[1]) {
        return Err(ContourError::invalid_argument(param, "edges must be strictly increasing"));
    }
    Ok(())
}

/// Outer edges of one axis, from an explicit range or from the samples.
///
/// A zero-width span is widened by 0.5 on each side.
fn outer_edges(param: &'static str, values: &[f64], range: Option<(f64, f64)>) -> Result<(f64, f64)> {
    let (mut first, mut last) = match range {
        Some((min, max)) => {
            if !min.is_finite() || !max.is_finite() {
                return Err(ContourError::invalid_argument(
                    "range",
                    format!("bounds must be finite, got ({min}, {max})"),
                ));
            }
            if max <= min {
                return Err(ContourError::invalid_argument(
                    "range",
                    format!("max must be larger than min, got ({min}, {max})"),
                ));
            }
            (min, max)
        }
        None if values.is_empty() => (0.0, 1.0),
        None => {
            if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
                return Err(ContourError::invalid_argument(
                    param,
                    format!("autodetected range is not finite (found {bad})"),
                ));
            }
            values
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
        }
    };

    if first == last {
        first -= 0.5;
        last += 0.5;
    }
    Ok((first, last))
}

/// `num` evenly spaced values over `[start, stop]`, endpoint included.
pub fn linspace(start: f64, stop: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (num - 1) as f64;
            let mut values: Vec<f64> = (0..num).map(|i| i as f64 * step + start).collect();
            if let Some(last) = values.last_mut() {
                *last = stop;
            }
            values
        }
    }
}

/// Insertion index of `value` in ascending `edges`, placing ties to the right.
pub fn search_sorted_right(edges: &[f64], value: f64) -> usize {
    edges.partition_point(|&edge| edge <= value)
}

/// Bin index including the outlier bins: 0 is below the first edge,
/// `edges.len()` is above the last.
fn bin_index(edges: &[f64], value: f64) -> usize {
    let index = search_sorted_right(edges, value);
    match edges.last() {
        Some(&last) if value == last => index - 1,
        _ => index,
    }
}

fn count_samples(array_x: &[f64], array_y: &[f64], x_edges: &[f64], y_edges: &[f64]) -> Vec<u32> {
    // One outlier bin on each side of both axes.
    let x_bins = x_edges.len() + 1;
    let y_bins = y_edges.len() + 1;

    let flat: Vec<usize> = array_x
        .iter()
        .zip(array_y)
        .map(|(&x, &y)| bin_index(x_edges, x) * y_bins + bin_index(y_edges, y))
        .collect();

    let occurrences = bincount(&flat, x_bins * y_bins);
    strip_outliers_north_up(&occurrences, x_bins, y_bins)
}

fn bincount(indices: &[usize], len: usize) -> Vec<u32> {
    let mut counts = vec![0u32; len];
    for &index in indices {
        counts[index] += 1;
    }
    counts
}

/// Drop the outlier ring and transpose the x-major counts into north-up rows.
fn strip_outliers_north_up(flat: &[u32], x_bins: usize, y_bins: usize) -> Vec<u32> {
    let cols = x_bins - 2;
    let rows = y_bins - 2;

    let mut counts = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        // Inner y bins are 1..=rows; row 0 is the topmost one.
        let y_index = rows - row;
        for col in 0..cols {
            counts.push(flat[(col + 1) * y_bins + y_index]);
        }
    }
    counts
}
