//! Common test fixtures for contour tests.
//!
//! Count grids are row-major with row 0 the northernmost row, matching the
//! layout a density grid stores.

/// Small count grids whose isolines can be worked out by hand.
pub mod grids {
    /// Every cell equal; no level crosses anything.
    pub const FLAT_3X3: [u32; 9] = [4, 4, 4, 4, 4, 4, 4, 4, 4];

    /// One interior peak; any level in (0, 10] gives a single closed loop.
    #[rustfmt::skip]
    pub const CENTRAL_PEAK_3X3: [u32; 9] = [
        0, 0, 0,
        0, 10, 0,
        0, 0, 0,
    ];

    /// Peak in the north-west corner; any level in (0, 10] gives one open line.
    #[rustfmt::skip]
    pub const CORNER_PEAK_3X3: [u32; 9] = [
        10, 0, 0,
        0, 0, 0,
        0, 0, 0,
    ];

    /// Two separated interior peaks of different height over a background of 1.
    #[rustfmt::skip]
    pub const TWIN_PEAKS_5X7: [u32; 35] = [
        1, 1, 1, 1, 1, 1, 1,
        1, 8, 1, 1, 1, 6, 1,
        1, 1, 1, 1, 1, 1, 1,
        1, 1, 1, 1, 1, 1, 1,
        1, 1, 1, 1, 1, 1, 1,
    ];

    /// Diagonal saddle: two high cells touching at a corner.
    #[rustfmt::skip]
    pub const SADDLE_4X4: [u32; 16] = [
        0, 0, 0, 0,
        0, 9, 0, 0,
        0, 0, 9, 0,
        0, 0, 0, 0,
    ];

    /// Ring of high cells around a low centre.
    #[rustfmt::skip]
    pub const CRATER_5X5: [u32; 25] = [
        0, 0, 0, 0, 0,
        0, 6, 6, 6, 0,
        0, 6, 1, 6, 0,
        0, 6, 6, 6, 0,
        0, 0, 0, 0, 0,
    ];
}

/// Sample sets with known binning results.
pub mod samples {
    /// Four points on the diagonal; with two bins per axis they land in the
    /// south-west and north-east bins, two each.
    pub const DIAGONAL_X: [f64; 4] = [0.0, 1.0, 2.0, 3.0];
    pub const DIAGONAL_Y: [f64; 4] = [0.0, 1.0, 2.0, 3.0];

    /// Centre and spread of the reference Gaussian scenario.
    pub const SCENARIO_CENTER: (f64, f64) = (10.0, 20.0);
    pub const SCENARIO_SIGMA: f64 = 0.5;
    pub const SCENARIO_SAMPLES: usize = 10_000;
}
