//! One-dimensional histograms and tolerance levels for scalar ensembles.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ContourError, Result};
use crate::histogram::{linspace, validate_edges};
use crate::levels::validate_percentages;

/// Steps used when widening the tolerance around the mean.
const TOLERANCE_STEPS: usize = 100;

/// Bin layout for [`histogram1d`]. Unset fields are derived from the data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Histogram1dOptions {
    pub bins: Option<usize>,
    pub bin_size: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

/// Counts over equally sized bins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram1d {
    counts: Vec<u32>,
    edges: Vec<f64>,
}

impl Histogram1d {
    /// Build a histogram from externally computed counts.
    ///
    /// `edges` must be ascending with one more entry than `counts`.
    pub fn from_counts(counts: Vec<u32>, edges: Vec<f64>) -> Result<Self> {
        validate_edges("edges", &edges)?;
        if edges.len() != counts.len() + 1 {
            return Err(ContourError::invalid_argument(
                "counts",
                format!("expected {} counts for {} edges, got {}", edges.len() - 1, edges.len(), counts.len()),
            ));
        }
        Ok(Self { counts, edges })
    }

    /// One count per bin.
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// Ascending edges, one more than the bin count.
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    pub fn bins(&self) -> usize {
        self.counts.len()
    }

    pub fn bin_size(&self) -> f64 {
        self.edges[1] - self.edges[0]
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// Closed stair-step outline of the bars, starting and ending on zero.
    pub fn step_outline(&self) -> Vec<(f64, f64)> {
        let mut outline = Vec::with_capacity(2 * self.counts.len() + 2);
        outline.push((self.edges[0], 0.0));
        for (bin, &count) in self.counts.iter().enumerate() {
            outline.push((self.edges[bin], count as f64));
            outline.push((self.edges[bin + 1], count as f64));
        }
        outline.push((self.edges[self.counts.len()], 0.0));
        outline
    }
}

/// Bin scalar values into a [`Histogram1d`].
///
/// `bins` together with `bin_size` needs exactly one of `min`/`max`. With
/// `bin_size` alone the bin count covers the span and the open end is pushed
/// out to a whole bin. Without either, `ceil(sqrt(n))` bins are used.
pub fn histogram1d(values: &[f64], options: &Histogram1dOptions) -> Result<Histogram1d> {
    validate_options(options)?;

    let (lo, hi, bins) = match (options.bins, options.bin_size) {
        (Some(bins), Some(size)) => match (options.min, options.max) {
            (Some(min), None) => (min, min + bins as f64 * size, bins),
            (None, Some(max)) => (max - bins as f64 * size, max, bins),
            (Some(_), Some(_)) => {
                return Err(ContourError::invalid_argument(
                    "bin_size",
                    "bins, bin_size, min and max together over-determine the histogram",
                ))
            }
            (None, None) => {
                return Err(ContourError::invalid_argument(
                    "bin_size",
                    "bins with bin_size needs either min or max",
                ))
            }
        },
        (None, Some(size)) => {
            let (lo, hi) = bounds(values, options)?;
            let bins = ((hi - lo) / size).ceil().max(1.0) as usize;
            match (options.min, options.max) {
                (_, None) => (lo, lo + bins as f64 * size, bins),
                (None, Some(_)) => (hi - bins as f64 * size, hi, bins),
                (Some(_), Some(_)) => (lo, lo + bins as f64 * size, bins),
            }
        }
        (bins, None) => {
            let (lo, hi) = bounds(values, options)?;
            let bins = bins.unwrap_or_else(|| ((values.len() as f64).sqrt().ceil() as usize).max(1));
            (lo, hi, bins)
        }
    };

    let edges = linspace(lo, hi, bins + 1);
    let size = (hi - lo) / bins as f64;
    let mut counts = vec![0u32; bins];
    let mut dropped = 0usize;

    for &value in values {
        if !(lo..=hi).contains(&value) {
            dropped += 1;
            continue;
        }
        let bin = (((value - lo) / size).floor() as usize).min(bins - 1);
        counts[bin] += 1;
    }

    debug!(values = values.len(), bins, dropped, lo, hi, "Built 1-D histogram");

    Ok(Histogram1d { counts, edges })
}

fn validate_options(options: &Histogram1dOptions) -> Result<()> {
    if options.bins == Some(0) {
        return Err(ContourError::invalid_argument("bins", "bin count must be > 0"));
    }
    if let Some(size) = options.bin_size {
        if !size.is_finite() || size <= 0.0 {
            return Err(ContourError::invalid_argument(
                "bin_size",
                format!("bin size must be a positive number, got {size}"),
            ));
        }
    }
    if let Some(min) = options.min {
        if !min.is_finite() {
            return Err(ContourError::invalid_argument("min", format!("min must be finite, got {min}")));
        }
    }
    if let Some(max) = options.max {
        if !max.is_finite() {
            return Err(ContourError::invalid_argument("max", format!("max must be finite, got {max}")));
        }
    }
    if let (Some(min), Some(max)) = (options.min, options.max) {
        if max <= min {
            return Err(ContourError::invalid_argument(
                "max",
                format!("max must be larger than min, got ({min}, {max})"),
            ));
        }
    }
    Ok(())
}

/// Lower and upper bound from the options, falling back to the data extent.
fn bounds(values: &[f64], options: &Histogram1dOptions) -> Result<(f64, f64)> {
    let extent = if options.min.is_none() || options.max.is_none() {
        if values.is_empty() {
            return Err(ContourError::invalid_argument(
                "values",
                "cannot derive histogram bounds from no values",
            ));
        }
        if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
            return Err(ContourError::invalid_argument(
                "values",
                format!("values must be finite to derive bounds, found {bad}"),
            ));
        }
        values
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
    } else {
        (f64::NAN, f64::NAN)
    };

    let lo = options.min.unwrap_or(extent.0);
    let hi = options.max.unwrap_or(extent.1);

    if hi <= lo {
        let param = if options.min.is_none() && options.max.is_none() { "values" } else { "max" };
        return Err(ContourError::invalid_argument(
            param,
            format!("histogram span is empty ({lo} to {hi})"),
        ));
    }
    Ok((lo, hi))
}

/// Distance from the mean enclosing more than each percentage of the values.
///
/// The distance grows in steps of 1% of the largest deviation, for at most
/// 100 steps. Returns zeros when every value is equal.
pub fn tolerance_levels(values: &[f64], percentages: &[f64]) -> Result<Vec<f64>> {
    validate_percentages(percentages)?;
    if values.is_empty() {
        return Err(ContourError::invalid_argument("values", "at least one value is required"));
    }
    if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(ContourError::invalid_argument(
            "values",
            format!("values must be finite, found {bad}"),
        ));
    }

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let deviations: Vec<f64> = values.iter().map(|v| (v - mean).abs()).collect();
    let max_deviation = deviations.iter().copied().fold(0.0, f64::max);

    if max_deviation == 0.0 {
        return Ok(vec![0.0; percentages.len()]);
    }

    let step = 0.01 * max_deviation;
    let share_within = |tolerance: f64| {
        deviations.iter().filter(|&&d| d <= tolerance).count() as f64 / values.len() as f64
    };

    Ok(percentages
        .iter()
        .map(|&percentage| {
            let target = percentage / 100.0;
            (1..=TOLERANCE_STEPS)
                .map(|k| k as f64 * step)
                .find(|&tolerance| share_within(tolerance) > target)
                .unwrap_or(TOLERANCE_STEPS as f64 * step)
        })
        .collect())
}
