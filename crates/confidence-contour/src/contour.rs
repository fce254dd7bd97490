//! Confidence contour assembly.
//!
//! A [`Contour`] bundles one requested percentage with its density level and
//! the traced isolines mapped back to domain coordinates. Separate loops are
//! concatenated into one coordinate sequence with a `(NaN, NaN)` gap between
//! them.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::binning::ResolvedGridStep;
use crate::config::ContourConfig;
use crate::error::Result;
use crate::grid::DensityGrid;
use crate::histogram::{histogram2d, BinningOptions};
use crate::isoline::trace_isolines;
use crate::levels::{solve_levels, validate_percentages, DensityLevel};

/// A point in domain coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    /// Separator between loops.
    pub const GAP: Coordinate = Coordinate {
        x: f64::NAN,
        y: f64::NAN,
    };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_gap(&self) -> bool {
        self.x.is_nan() && self.y.is_nan()
    }
}

/// The confidence contour of one percentage.
#[derive(Debug, Clone, Serialize)]
pub struct Contour {
    percentage: f64,
    level: f64,
    enclosed_fraction: f64,
    resolved: bool,
    coordinates: Vec<Coordinate>,
    closed_flags: Vec<bool>,
}

impl Contour {
    fn trace(grid: &DensityGrid, level: &DensityLevel) -> Self {
        let isolines = trace_isolines(grid, level.level);

        let mut coordinates = Vec::with_capacity(isolines.iter().map(|i| i.len() + 1).sum());
        let mut closed_flags = Vec::with_capacity(isolines.len());

        for (index, isoline) in isolines.iter().enumerate() {
            if index > 0 {
                coordinates.push(Coordinate::GAP);
            }
            coordinates.extend(isoline.points().map(|point| {
                let (x, y) = grid.grid_to_domain(point);
                Coordinate::new(x, y)
            }));
            closed_flags.push(isoline.closed);
        }

        Self {
            percentage: level.percentage,
            level: level.level,
            enclosed_fraction: level.enclosed_fraction,
            resolved: level.resolved,
            coordinates,
            closed_flags,
        }
    }

    pub fn percentage(&self) -> f64 {
        self.percentage
    }

    /// Count threshold the contour was traced at.
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Share of grid mass at or above the level.
    pub fn enclosed_fraction(&self) -> f64 {
        self.enclosed_fraction
    }

    /// False when the level scan did not reach the requested percentage.
    pub fn resolved(&self) -> bool {
        self.resolved
    }

    /// All loops, separated by [`Coordinate::GAP`]. No trailing gap.
    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    pub fn loop_count(&self) -> usize {
        self.closed_flags.len()
    }

    /// Whether each loop, in order, is closed.
    pub fn closed_flags(&self) -> &[bool] {
        &self.closed_flags
    }

    pub fn closed_loop_count(&self) -> usize {
        self.closed_flags.iter().filter(|&&closed| closed).count()
    }

    pub fn is_empty(&self) -> bool {
        self.closed_flags.is_empty()
    }

    /// Each loop as its own slice, in trace order.
    pub fn loops(&self) -> impl Iterator<Item = &[Coordinate]> + '_ {
        self.coordinates
            .split(|c| c.is_gap())
            .filter(|segment| !segment.is_empty())
    }

    /// Even-odd point test against the closed loops.
    ///
    /// Open loops do not bound a region and are ignored.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.loops()
            .zip(&self.closed_flags)
            .filter(|(_, &closed)| closed)
            .filter(|(ring, _)| ring_contains(ring, x, y))
            .count()
            % 2
            == 1
    }

    /// Fraction of the given points that fall inside the contour.
    pub fn enclosed_share(&self, xs: &[f64], ys: &[f64]) -> f64 {
        let total = xs.len().min(ys.len());
        if total == 0 {
            return 0.0;
        }
        let inside = xs
            .iter()
            .zip(ys)
            .filter(|(&x, &y)| self.contains(x, y))
            .count();
        inside as f64 / total as f64
    }
}

fn ring_contains(ring: &[Coordinate], x: f64, y: f64) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;

    for i in 0..n {
        let (xi, yi) = (ring[i].x, ring[i].y);
        let (xj, yj) = (ring[j].x, ring[j].y);

        if ((yi > y) != (yj > y)) && (x < (xj - xi) * (y - yi) / (yj - yi) + xi) {
            inside = !inside;
        }
        j = i;
    }

    inside
}

/// Solve levels for all percentages and trace one contour per percentage.
///
/// The grid is shared read-only; each percentage gets its own crossing arena.
/// With the `parallel` feature the percentages are traced on rayon tasks; the
/// output order always follows `percentages`.
pub fn assemble(grid: &DensityGrid, percentages: &[f64]) -> Result<Vec<Contour>> {
    let levels = solve_levels(grid, percentages)?;

    #[cfg(feature = "parallel")]
    let contours: Vec<Contour> = {
        use rayon::prelude::*;
        levels
            .par_iter()
            .map(|level| Contour::trace(grid, level))
            .collect()
    };

    #[cfg(not(feature = "parallel"))]
    let contours: Vec<Contour> = levels
        .iter()
        .map(|level| Contour::trace(grid, level))
        .collect();

    debug!(
        contours = contours.len(),
        loops = contours.iter().map(Contour::loop_count).sum::<usize>(),
        points = contours.iter().map(|c| c.coordinates().len()).sum::<usize>(),
        "Assembled confidence contours"
    );

    Ok(contours)
}

/// Bin the samples and assemble their confidence contours.
///
/// Percentages are checked before any binning work starts.
pub fn confidence_contours(
    array_x: &[f64],
    array_y: &[f64],
    binning: &BinningOptions,
    percentages: &[f64],
) -> Result<Vec<Contour>> {
    validate_percentages(percentages)?;
    let grid = histogram2d(array_x, array_y, binning)?;
    assemble(&grid, percentages)
}

/// Same as [`confidence_contours`], with binning and percentages taken from a
/// [`ContourConfig`].
pub fn contours_from_config(array_x: &[f64], array_y: &[f64], config: &ContourConfig) -> Result<Vec<Contour>> {
    Ok(contours_with_grid_step(array_x, array_y, config)?.0)
}

/// Same as [`contours_from_config`], also returning the grid step the samples
/// were binned with when the config uses one.
pub fn contours_with_grid_step(
    array_x: &[f64],
    array_y: &[f64],
    config: &ContourConfig,
) -> Result<(Vec<Contour>, Option<ResolvedGridStep>)> {
    config.validate()?;
    let (binning, grid_step) = config.resolve_grid_step(array_x, array_y)?;
    let contours = confidence_contours(array_x, array_y, &binning, &config.percentages)?;
    Ok((contours, grid_step))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Coordinate> {
        vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(2.0, 0.0),
            Coordinate::new(2.0, 2.0),
            Coordinate::new(0.0, 2.0),
        ]
    }

    #[test]
    fn test_ring_contains() {
        let ring = square();
        assert!(ring_contains(&ring, 1.0, 1.0));
        assert!(!ring_contains(&ring, 3.0, 1.0));
        assert!(!ring_contains(&ring[..2], 1.0, 0.0));
    }

    #[test]
    fn test_gap_coordinate() {
        assert!(Coordinate::GAP.is_gap());
        assert!(!Coordinate::new(f64::NAN, 1.0).is_gap());
    }

    #[test]
    fn test_contains_ignores_open_loops_and_nests_even_odd() {
        let mut coordinates = square();
        coordinates.push(Coordinate::GAP);
        coordinates.extend([
            Coordinate::new(0.5, 0.5),
            Coordinate::new(1.5, 0.5),
            Coordinate::new(1.5, 1.5),
            Coordinate::new(0.5, 1.5),
        ]);
        coordinates.push(Coordinate::GAP);
        coordinates.extend([
            Coordinate::new(5.0, 5.0),
            Coordinate::new(6.0, 5.0),
            Coordinate::new(6.0, 6.0),
        ]);

        let contour = Contour {
            percentage: 68.0,
            level: 1.0,
            enclosed_fraction: 0.68,
            resolved: true,
            coordinates,
            closed_flags: vec![true, true, false],
        };

        assert_eq!(contour.loops().count(), 3);
        assert_eq!(contour.closed_loop_count(), 2);
        assert!(contour.contains(0.25, 0.25));
        assert!(!contour.contains(1.0, 1.0));
        assert!(!contour.contains(5.8, 5.2));
        assert_eq!(contour.enclosed_share(&[0.25, 1.0, 9.0, 1.9], &[0.25, 1.0, 9.0, 0.1]), 0.5);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_assemble_matches_sequential_trace() {
        use test_utils::{grids, stratified_gaussian_ensemble, unit_edges};

        let crater = DensityGrid::from_counts(5, 5, grids::CRATER_5X5.to_vec(), unit_edges(5), unit_edges(5)).unwrap();
        let (xs, ys) = stratified_gaussian_ensemble(4000, (0.0, 0.0), 1.0);
        let gaussian = histogram2d(&xs, &ys, &BinningOptions::with_bins(24)).unwrap();
        let percentages = [99.0, 10.0, 68.0, 95.0, 50.0, 30.0, 80.0, 90.0];

        for grid in [&crater, &gaussian] {
            let parallel = assemble(grid, &percentages).unwrap();
            let sequential: Vec<Contour> = solve_levels(grid, &percentages)
                .unwrap()
                .iter()
                .map(|level| Contour::trace(grid, level))
                .collect();

            assert_eq!(parallel.len(), sequential.len());
            for (p, s) in parallel.iter().zip(&sequential) {
                assert_eq!(p.percentage(), s.percentage());
                assert_eq!(p.level(), s.level());
                assert_eq!(p.closed_flags(), s.closed_flags());
                let bits = |c: &Contour| -> Vec<(u64, u64)> {
                    c.coordinates().iter().map(|c| (c.x.to_bits(), c.y.to_bits())).collect()
                };
                assert_eq!(bits(p), bits(s));
            }
        }
    }
}
