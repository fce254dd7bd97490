//! Confidence contours for 2-D sample ensembles.
//!
//! This crate turns a cloud of `(x, y)` samples into highest-density
//! confidence regions:
//!
//! - [`histogram`] bins the samples into a [`DensityGrid`] with numpy-style
//!   edge and outlier handling
//! - [`levels`] finds the count threshold whose super-level set encloses each
//!   requested percentage of the mass
//! - [`isoline`] traces the threshold into ordered open and closed polylines
//! - [`contour`] maps the polylines back to sample coordinates
//!
//! # Example
//!
//! ```
//! use confidence_contour::{confidence_contours, BinningOptions};
//!
//! // A cone of samples peaking in the middle of a 20 x 20 lattice.
//! let (mut xs, mut ys) = (Vec::new(), Vec::new());
//! for i in 0..20 {
//!     for j in 0..20 {
//!         let r = ((i as f64 - 9.5).powi(2) + (j as f64 - 9.5).powi(2)).sqrt();
//!         for _ in 0..(10.0 - r).max(1.0) as usize {
//!             xs.push(i as f64);
//!             ys.push(j as f64);
//!         }
//!     }
//! }
//!
//! let contours = confidence_contours(&xs, &ys, &BinningOptions::with_bins(10), &[68.0, 95.0])?;
//! assert_eq!(contours.len(), 2);
//! assert!(contours[0].level() >= contours[1].level());
//! assert!(contours[0].closed_loop_count() >= 1);
//! # Ok::<(), confidence_contour::ContourError>(())
//! ```
//!
//! The supplementary [`binning`] and [`histogram1d`] modules cover grid-step
//! binning and scalar histograms for magnitude statistics.

pub mod binning;
pub mod config;
pub mod contour;
pub mod error;
pub mod grid;
pub mod histogram;
pub mod histogram1d;
pub mod isoline;
pub mod levels;

pub use binning::{GridStep, ResolvedGridStep};
pub use config::{ContourConfig, DEFAULT_PERCENTAGES};
pub use contour::{
    assemble, confidence_contours, contours_from_config, contours_with_grid_step, Contour, Coordinate,
};
pub use error::{ContourError, Result};
pub use grid::{DensityGrid, GridPoint, GridShape};
pub use histogram::{histogram2d, AxisPair, BinningOptions, DEFAULT_BINS};
pub use histogram1d::{histogram1d, tolerance_levels, Histogram1d, Histogram1dOptions};
pub use isoline::{neighbors, trace_isolines, Candidate, Crossing, CrossingGrid, CrossingId, Direction, Isoline};
pub use levels::{solve_levels, DensityLevel, LEVEL_SCAN_STEPS};
