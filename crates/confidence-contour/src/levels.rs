//! Highest-density level search.
//!
//! The solver walks a count threshold upward from the smallest bin count to
//! the largest in fixed increments. At each threshold it measures how much of
//! the total mass sits in bins at or above it, and a percentage resolves at
//! the first threshold whose enclosed mass no longer exceeds the target.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ContourError, Result};
use crate::grid::DensityGrid;

/// Number of increments between the smallest and largest bin count.
pub const LEVEL_SCAN_STEPS: usize = 100;

/// The count threshold resolved for one requested percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityLevel {
    /// Requested percentage in `(0, 100]`.
    pub percentage: f64,
    /// Count threshold; bins with `count >= level` form the region.
    pub level: f64,
    /// Share of the grid mass in bins at or above `level`.
    pub enclosed_fraction: f64,
    /// False when the scan ran out before the target was met.
    pub resolved: bool,
}

/// Reject empty lists and percentages outside `(0, 100]`.
pub fn validate_percentages(percentages: &[f64]) -> Result<()> {
    if percentages.is_empty() {
        return Err(ContourError::invalid_argument(
            "percentages",
            "at least one percentage is required",
        ));
    }
    if let Some(bad) = percentages
        .iter()
        .find(|p| !p.is_finite() || **p <= 0.0 || **p > 100.0)
    {
        return Err(ContourError::invalid_argument(
            "percentages",
            format!("percentages must lie in (0, 100], got {bad}"),
        ));
    }
    Ok(())
}

/// Share of the grid mass held by bins whose count is at least `level`.
///
/// Returns 0 for a grid without any counts.
pub fn mass_fraction_at(grid: &DensityGrid, level: f64) -> f64 {
    let total = grid.total();
    if total == 0 {
        return 0.0;
    }
    let enclosed: u64 = grid
        .counts()
        .iter()
        .filter(|&&count| count as f64 >= level)
        .map(|&count| count as u64)
        .sum();
    enclosed as f64 / total as f64
}

/// Resolve one level per percentage in a single upward scan.
///
/// Results come back in the order the percentages were given.
pub fn solve_levels(grid: &DensityGrid, percentages: &[f64]) -> Result<Vec<DensityLevel>> {
    validate_percentages(percentages)?;

    let min = grid.min_count() as f64;
    let max = grid.max_count() as f64;
    let dl = (max - min) / LEVEL_SCAN_STEPS as f64;

    let mut solved: Vec<Option<DensityLevel>> = vec![None; percentages.len()];

    for step in 0..=LEVEL_SCAN_STEPS {
        let cl = min + step as f64 * dl;
        let fraction = mass_fraction_at(grid, cl);

        for (slot, &percentage) in solved.iter_mut().zip(percentages) {
            if slot.is_none() && fraction <= percentage / 100.0 {
                *slot = Some(DensityLevel {
                    percentage,
                    level: cl,
                    enclosed_fraction: fraction,
                    resolved: true,
                });
            }
        }

        if solved.iter().all(Option::is_some) {
            break;
        }
    }

    // Only reached for unresolved percentages, i.e. after the full scan.
    let last_level = min + LEVEL_SCAN_STEPS as f64 * dl;
    let last_fraction = mass_fraction_at(grid, last_level);

    let levels: Vec<DensityLevel> = solved
        .into_iter()
        .zip(percentages)
        .map(|(slot, &percentage)| {
            slot.unwrap_or_else(|| {
                warn!(
                    percentage,
                    level = last_level,
                    enclosed_fraction = last_fraction,
                    "Level scan exhausted before reaching target; using last threshold"
                );
                DensityLevel {
                    percentage,
                    level: last_level,
                    enclosed_fraction: last_fraction,
                    resolved: false,
                }
            })
        })
        .collect();

    debug!(
        percentages = levels.len(),
        min_count = min,
        max_count = max,
        "Solved density levels"
    );

    Ok(levels)
}
