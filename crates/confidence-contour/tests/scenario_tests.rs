//! End-to-end scenarios on Gaussian ensembles.
//!
//! For an isotropic 2-D Gaussian the highest-density region of a given
//! probability is a disc around the mean, so the traced contour should be a
//! single closed loop centred on the mean that holds roughly the requested
//! share of the samples.

use confidence_contour::{confidence_contours, histogram2d, BinningOptions, Contour};
use test_utils::samples::{SCENARIO_CENTER, SCENARIO_SAMPLES, SCENARIO_SIGMA};
use test_utils::{
    assert_coords_approx_eq, assert_in_range, gaussian_ensemble, stratified_gaussian_ensemble,
};

fn scenario() -> (Vec<f64>, Vec<f64>) {
    stratified_gaussian_ensemble(SCENARIO_SAMPLES, SCENARIO_CENTER, SCENARIO_SIGMA)
}

fn vertex_centroid(contour: &Contour) -> (f64, f64) {
    let points: Vec<_> = contour.coordinates().iter().filter(|c| !c.is_gap()).collect();
    let n = points.len() as f64;
    (
        points.iter().map(|c| c.x).sum::<f64>() / n,
        points.iter().map(|c| c.y).sum::<f64>() / n,
    )
}

// ============================================================================
// Reference scenario: 10k samples around (10, 20), sigma 0.5, 30 bins
// ============================================================================

#[test]
fn test_68_percent_single_closed_loop() {
    let (xs, ys) = scenario();
    let contours = confidence_contours(&xs, &ys, &BinningOptions::with_bins(30), &[68.0]).unwrap();
    let contour = &contours[0];

    assert!(contour.resolved());
    assert_eq!(contour.loop_count(), 1);
    assert_eq!(contour.closed_loop_count(), 1);
    let (cx, cy) = vertex_centroid(contour);
    assert_coords_approx_eq!((cx, cy), (SCENARIO_CENTER.0, SCENARIO_CENTER.1), 0.1);
    assert_in_range!(contour.enclosed_share(&xs, &ys), 0.66..=0.70);
    assert_in_range!(contour.enclosed_fraction(), 0.64..=0.68);
}

#[test]
fn test_95_and_50_percent_shares() {
    let (xs, ys) = scenario();
    let contours = confidence_contours(&xs, &ys, &BinningOptions::with_bins(30), &[95.0, 50.0]).unwrap();

    assert!(contours[0].closed_loop_count() >= 1);
    assert_in_range!(contours[0].enclosed_share(&xs, &ys), 0.92..=0.97);

    assert!(contours[1].closed_loop_count() >= 1);
    assert_in_range!(contours[1].enclosed_share(&xs, &ys), 0.47..=0.53);
}

#[test]
fn test_levels_shrink_as_percentage_grows() {
    let (xs, ys) = scenario();
    let percentages = [10.0, 30.0, 50.0, 68.0, 80.0, 90.0, 95.0, 99.0];
    let contours = confidence_contours(&xs, &ys, &BinningOptions::with_bins(30), &percentages).unwrap();

    for pair in contours.windows(2) {
        assert!(pair[0].level() >= pair[1].level());
        assert!(pair[0].enclosed_fraction() <= pair[1].enclosed_fraction());
    }
}

#[test]
fn test_histogram_conserves_samples() {
    let (xs, ys) = scenario();
    let grid = histogram2d(&xs, &ys, &BinningOptions::with_bins(30)).unwrap();
    assert_eq!(grid.total(), SCENARIO_SAMPLES as u64);
    assert_eq!(grid.outliers(), 0);
}

#[test]
fn test_repeated_runs_are_bit_identical() {
    let (xs, ys) = scenario();
    let options = BinningOptions::with_bins(30);
    let a = confidence_contours(&xs, &ys, &options, &[68.0, 95.0]).unwrap();
    let b = confidence_contours(&xs, &ys, &options, &[68.0, 95.0]).unwrap();

    for (left, right) in a.iter().zip(&b) {
        assert_eq!(left.level().to_bits(), right.level().to_bits());
        let bits = |c: &Contour| -> Vec<(u64, u64)> {
            c.coordinates()
                .iter()
                .map(|p| (p.x.to_bits(), p.y.to_bits()))
                .collect()
        };
        assert_eq!(bits(left), bits(right));
        assert_eq!(left.closed_flags(), right.closed_flags());
    }
}

// ============================================================================
// Random draws
// ============================================================================

#[test]
fn test_random_ensembles_hold_their_share() {
    for seed in [1, 7, 42, 1234] {
        let (xs, ys) = gaussian_ensemble(
            SCENARIO_SAMPLES,
            SCENARIO_CENTER,
            (SCENARIO_SIGMA, SCENARIO_SIGMA),
            seed,
        );
        let contours = confidence_contours(&xs, &ys, &BinningOptions::with_bins(20), &[68.0]).unwrap();
        let contour = &contours[0];

        assert!(contour.closed_loop_count() >= 1, "seed {seed}");
        assert_in_range!(contour.enclosed_share(&xs, &ys), 0.62..=0.74);
    }
}

#[test]
fn test_anisotropic_ensemble_is_wider_in_x() {
    let (xs, ys) = gaussian_ensemble(8000, (0.0, 0.0), (2.0, 0.5), 5);
    let options = BinningOptions::with_bins(30).range((-8.0, 8.0), (-8.0, 8.0));
    let contours = confidence_contours(&xs, &ys, &options, &[68.0]).unwrap();

    let points: Vec<_> = contours[0].coordinates().iter().filter(|c| !c.is_gap()).collect();
    let x_span = points.iter().map(|c| c.x).fold(f64::NEG_INFINITY, f64::max)
        - points.iter().map(|c| c.x).fold(f64::INFINITY, f64::min);
    let y_span = points.iter().map(|c| c.y).fold(f64::NEG_INFINITY, f64::max)
        - points.iter().map(|c| c.y).fold(f64::INFINITY, f64::min);
    assert!(x_span > 2.0 * y_span, "x span {x_span}, y span {y_span}");
}

#[test]
fn test_diagonal_samples_edge_case() {
    let contours = confidence_contours(
        &test_utils::samples::DIAGONAL_X,
        &test_utils::samples::DIAGONAL_Y,
        &BinningOptions::with_bins(2),
        &[50.0, 100.0],
    )
    .unwrap();

    // Two equal bins on the diagonal: every threshold either keeps both or none.
    assert_eq!(contours[0].level(), 2.0);
    assert!(!contours[0].resolved());
    assert_eq!(contours[1].level(), 0.0);
    assert_eq!(contours[1].enclosed_fraction(), 1.0);
}
