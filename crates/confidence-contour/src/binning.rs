//! Grid-step binning.
//!
//! Derives histogram parameters from a grid resolution instead of a bin count.
//! Without bounds, the sample extent is snapped outward to multiples of the
//! step. With bounds, edges are laid out from the lower bound in whole steps,
//! adding one edge past the upper bound when the span does not divide evenly.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ContourError, Result};
use crate::histogram::{AxisPair, BinningOptions};

/// Number of bins the default step aims for across the x extent.
const DEFAULT_STEPS_UNBOUNDED: f64 = 99.0;
const DEFAULT_STEPS_BOUNDED: f64 = 100.0;

/// Relative slack when deciding whether a span is a whole number of steps.
const STEP_TOLERANCE: f64 = 1e-9;

/// Grid resolution and optional outer bounds for x and y.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridStep {
    /// Bin width on both axes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub step: Option<f64>,
    /// `(min, max)` for x then y.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounds: Option<[(f64, f64); 2]>,
}

/// Histogram parameters derived from a [`GridStep`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedGridStep {
    /// The step actually used.
    pub step: f64,
    /// The bounds actually used, x then y.
    pub bounds: [(f64, f64); 2],
    pub options: BinningOptions,
}

impl GridStep {
    pub fn new(step: f64) -> Self {
        Self {
            step: Some(step),
            bounds: None,
        }
    }

    pub fn bounded(step: Option<f64>, x: (f64, f64), y: (f64, f64)) -> Self {
        Self {
            step,
            bounds: Some([x, y]),
        }
    }

    /// Check the step and bounds without looking at any samples.
    pub fn validate(&self) -> Result<()> {
        if let Some(step) = self.step {
            if !step.is_finite() || step <= 0.0 {
                return Err(ContourError::invalid_argument(
                    "grid_step",
                    format!("step must be a positive number, got {step}"),
                ));
            }
        }

        if let Some(bounds) = &self.bounds {
            for (axis, (min, max)) in ["x", "y"].iter().zip(bounds) {
                if !min.is_finite() || !max.is_finite() || max <= min {
                    return Err(ContourError::invalid_argument(
                        "bounds",
                        format!("{axis} bounds must be finite with max > min, got ({min}, {max})"),
                    ));
                }
                if let Some(step) = self.step {
                    if step > max - min {
                        return Err(ContourError::invalid_argument(
                            "grid_step",
                            format!("step {step} exceeds the {axis} span {}", max - min),
                        ));
                    }
                }
            }
        }

        Ok(())
    }

    /// Work out bins, range or edges for the given samples.
    pub fn resolve(&self, array_x: &[f64], array_y: &[f64]) -> Result<ResolvedGridStep> {
        self.validate()?;

        let resolved = match self.bounds {
            Some(bounds) => self.resolve_bounded(bounds),
            None => self.resolve_unbounded(array_x, array_y)?,
        };

        debug!(
            step = resolved.step,
            x_min = resolved.bounds[0].0,
            x_max = resolved.bounds[0].1,
            y_min = resolved.bounds[1].0,
            y_max = resolved.bounds[1].1,
            "Resolved grid step"
        );

        Ok(resolved)
    }

    fn resolve_bounded(&self, bounds: [(f64, f64); 2]) -> ResolvedGridStep {
        let [(x_min, x_max), (y_min, y_max)] = bounds;
        let step = self
            .step
            .unwrap_or((x_max - x_min) / DEFAULT_STEPS_BOUNDED);

        for (axis, (min, max)) in ["x", "y"].iter().zip(&bounds) {
            if !divides(max - min, step) {
                warn!(axis, step, min, max, "Bounds are not divisible by the grid step");
            }
        }

        let x_edges = stepped_edges(x_min, x_max, step);
        let y_edges = stepped_edges(y_min, y_max, step);

        ResolvedGridStep {
            step,
            bounds,
            options: BinningOptions {
                edges: Some(AxisPair::PerAxis(x_edges, y_edges)),
                ..Default::default()
            },
        }
    }

    fn resolve_unbounded(&self, array_x: &[f64], array_y: &[f64]) -> Result<ResolvedGridStep> {
        let (x_lo, x_hi) = extent("array_x", array_x)?;
        let (y_lo, y_hi) = extent("array_y", array_y)?;

        let step = match self.step {
            Some(step) => step,
            None => default_step(x_hi - x_lo),
        };

        let x_bounds = snap_outward(x_lo, x_hi, step);
        let y_bounds = snap_outward(y_lo, y_hi, step);
        let x_bins = whole_steps(x_bounds.1 - x_bounds.0, step).max(1);
        let y_bins = whole_steps(y_bounds.1 - y_bounds.0, step).max(1);

        Ok(ResolvedGridStep {
            step,
            bounds: [x_bounds, y_bounds],
            options: BinningOptions::with_bins_xy(x_bins, y_bins).range(x_bounds, y_bounds),
        })
    }
}

/// Default step for an unbounded grid: the x extent over 99, rounded to one
/// decimal. Falls back to the unrounded value when rounding gives zero.
fn default_step(span: f64) -> f64 {
    let raw = span / DEFAULT_STEPS_UNBOUNDED;
    let rounded = (raw * 10.0).round() / 10.0;
    if rounded > 0.0 {
        rounded
    } else if raw > 0.0 {
        raw
    } else {
        1.0
    }
}

fn extent(param: &'static str, values: &[f64]) -> Result<(f64, f64)> {
    if values.is_empty() {
        return Err(ContourError::invalid_argument(
            param,
            "cannot derive grid bounds from an empty sample set",
        ));
    }
    if let Some(bad) = values.iter().find(|v| !v.is_finite()) {
        return Err(ContourError::invalid_argument(
            param,
            format!("samples must be finite to derive grid bounds, found {bad}"),
        ));
    }
    Ok(values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v))))
}

/// Widen `[lo, hi]` to the enclosing multiples of `step`.
fn snap_outward(lo: f64, hi: f64, step: f64) -> (f64, f64) {
    let min = (lo / step).floor() * step;
    let mut max = (hi / step).ceil() * step;
    if max <= min {
        max = min + step;
    }
    (min, max)
}

/// Number of steps covering `span`, counting a near-exact fit as exact.
fn whole_steps(span: f64, step: f64) -> usize {
    let ratio = span / step;
    let nearest = ratio.round();
    if (ratio - nearest).abs() <= STEP_TOLERANCE * nearest.max(1.0) {
        nearest as usize
    } else {
        ratio.ceil() as usize
    }
}

fn divides(span: f64, step: f64) -> bool {
    let ratio = span / step;
    (ratio - ratio.round()).abs() <= STEP_TOLERANCE * ratio.round().max(1.0)
}

/// `min, min + step, ...` until `max` is reached or passed.
fn stepped_edges(min: f64, max: f64, step: f64) -> Vec<f64> {
    let steps = whole_steps(max - min, step).max(1);
    let mut edges: Vec<f64> = (0..=steps).map(|i| min + i as f64 * step).collect();
    if divides(max - min, step) {
        if let Some(last) = edges.last_mut() {
            *last = max;
        }
    }
    edges
}
