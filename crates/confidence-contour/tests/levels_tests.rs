//! Tests for the density-level solver.

use confidence_contour::levels::mass_fraction_at;
use confidence_contour::{histogram2d, solve_levels, BinningOptions, DensityGrid};
use test_utils::{
    assert_approx_eq, gaussian_ensemble, grids, stratified_gaussian_ensemble, unit_edges,
};

fn grid_from(rows: usize, cols: usize, counts: &[u32]) -> DensityGrid {
    DensityGrid::from_counts(rows, cols, counts.to_vec(), unit_edges(cols), unit_edges(rows)).unwrap()
}

#[test]
fn test_hand_computed_level() {
    let grid = grid_from(1, 4, &[1, 2, 3, 4]);
    let levels = solve_levels(&grid, &[70.0]).unwrap();

    // dl = 0.03; the first threshold above 2 is 1 + 34 * 0.03.
    assert_approx_eq!(levels[0].level, 2.02, 1e-9);
    assert_eq!(levels[0].enclosed_fraction, 0.7);
    assert!(levels[0].resolved);
}

#[test]
fn test_twin_peaks_levels() {
    let grid = grid_from(5, 7, &grids::TWIN_PEAKS_5X7);
    let levels = solve_levels(&grid, &[50.0, 20.0, 100.0]).unwrap();

    assert_approx_eq!(levels[0].level, 1.07, 1e-9);
    assert_approx_eq!(levels[0].enclosed_fraction, 14.0 / 47.0, 1e-12);
    assert_approx_eq!(levels[1].level, 6.04, 1e-9);
    assert_approx_eq!(levels[1].enclosed_fraction, 8.0 / 47.0, 1e-12);
    assert_eq!(levels[2].level, 1.0);
    assert_eq!(levels[2].enclosed_fraction, 1.0);
}

#[test]
fn test_results_follow_request_order() {
    let (xs, ys) = stratified_gaussian_ensemble(5000, (0.0, 0.0), 1.0);
    let grid = histogram2d(&xs, &ys, &BinningOptions::with_bins(25)).unwrap();

    let levels = solve_levels(&grid, &[95.0, 50.0, 68.0]).unwrap();
    let percentages: Vec<f64> = levels.iter().map(|l| l.percentage).collect();
    assert_eq!(percentages, vec![95.0, 50.0, 68.0]);
    assert!(levels[1].level >= levels[2].level);
    assert!(levels[2].level >= levels[0].level);
}

#[test]
fn test_levels_are_monotone_in_percentage() {
    for seed in 0..5 {
        let (xs, ys) = gaussian_ensemble(3000, (2.0, -1.0), (0.8, 1.3), seed);
        let grid = histogram2d(&xs, &ys, &BinningOptions::with_bins(20)).unwrap();

        let percentages: Vec<f64> = (1..=20).map(|i| i as f64 * 5.0).collect();
        let levels = solve_levels(&grid, &percentages).unwrap();

        for pair in levels.windows(2) {
            assert!(
                pair[0].level >= pair[1].level,
                "seed {seed}: level({}) = {} < level({}) = {}",
                pair[0].percentage,
                pair[0].level,
                pair[1].percentage,
                pair[1].level
            );
        }
    }
}

#[test]
fn test_resolved_levels_do_not_exceed_target() {
    let (xs, ys) = gaussian_ensemble(4000, (0.0, 0.0), (1.0, 1.0), 21);
    let grid = histogram2d(&xs, &ys, &BinningOptions::with_bins(30)).unwrap();

    for level in solve_levels(&grid, &[25.0, 50.0, 68.0, 90.0, 95.0, 99.0]).unwrap() {
        if level.resolved {
            assert!(level.enclosed_fraction <= level.percentage / 100.0);
            assert_eq!(level.enclosed_fraction, mass_fraction_at(&grid, level.level));
        }
    }
}

#[test]
fn test_unresolved_level_uses_last_threshold() {
    // All mass sits at one count value; only 100% can be met.
    let grid = grid_from(3, 3, &grids::CRATER_5X5[..9]);
    let levels = solve_levels(&grid, &[50.0]).unwrap();
    assert!(!levels[0].resolved);
    assert_eq!(levels[0].level, grid.max_count() as f64);
}

#[test]
fn test_empty_grid_resolves_at_zero() {
    let grid = grid_from(2, 2, &[0, 0, 0, 0]);
    let levels = solve_levels(&grid, &[68.0]).unwrap();
    assert_eq!(levels[0].level, 0.0);
    assert_eq!(levels[0].enclosed_fraction, 0.0);
    assert!(levels[0].resolved);
}

#[test]
fn test_invalid_percentages() {
    let grid = grid_from(1, 2, &[1, 2]);
    for bad in [vec![], vec![0.0], vec![-5.0], vec![101.0], vec![f64::INFINITY]] {
        let err = solve_levels(&grid, &bad).unwrap_err();
        assert_eq!(err.param(), "percentages");
    }
}
