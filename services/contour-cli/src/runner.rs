//! Contour and histogram runs.

use std::path::Path;

use confidence_contour::{
    contours_with_grid_step, histogram1d, Contour, Histogram1d, Histogram1dOptions, ResolvedGridStep,
};
use serde::Serialize;
use tracing::info;

use crate::config::RunConfig;
use crate::samples::read_columns;

/// Output of one contour run.
#[derive(Debug, Clone, Serialize)]
pub struct ContourRun {
    /// Number of sample pairs read.
    pub samples: usize,
    /// Step and bounds used when the run was configured with a grid step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_step: Option<ResolvedGridStep>,
    pub contours: Vec<Contour>,
}

/// Read the configured samples and compute their confidence contours.
pub fn run_contours(config: &RunConfig) -> anyhow::Result<ContourRun> {
    config.validate()?;

    let mut columns = read_columns(&config.input, config.delimiter, &[config.x_column, config.y_column])?;
    let ys = columns.pop().unwrap_or_default();
    let xs = columns.pop().unwrap_or_default();

    contours_for_samples(&xs, &ys, config)
}

/// Compute confidence contours for samples already in memory.
pub fn contours_for_samples(xs: &[f64], ys: &[f64], config: &RunConfig) -> anyhow::Result<ContourRun> {
    let (contours, grid_step) = contours_with_grid_step(xs, ys, &config.contour)?;

    if let Some(resolved) = &grid_step {
        info!(
            step = resolved.step,
            x_min = resolved.bounds[0].0,
            x_max = resolved.bounds[0].1,
            y_min = resolved.bounds[1].0,
            y_max = resolved.bounds[1].1,
            "Using grid step binning"
        );
    }
    info!(
        samples = xs.len(),
        contours = contours.len(),
        unresolved = contours.iter().filter(|c| !c.resolved()).count(),
        "Computed confidence contours"
    );

    Ok(ContourRun {
        samples: xs.len(),
        grid_step,
        contours,
    })
}

/// Read one column of a delimited file and bin it.
pub fn run_histogram(
    input: &Path,
    delimiter: char,
    column: usize,
    options: &Histogram1dOptions,
) -> anyhow::Result<Histogram1d> {
    let values = read_columns(input, delimiter, &[column])?
        .pop()
        .unwrap_or_default();
    let histogram = histogram1d(&values, options)?;

    info!(
        values = values.len(),
        bins = histogram.bins(),
        binned = histogram.total(),
        "Computed histogram"
    );

    Ok(histogram)
}
