//! Command-line driver for confidence contours.
//!
//! This crate provides tools to:
//! - Load a YAML run configuration and delimited sample files
//! - Compute confidence contours or a 1-D histogram
//! - Output results as a console table, JSON or CSV

pub mod config;
pub mod report;
pub mod runner;
pub mod samples;

pub use config::RunConfig;
pub use report::{ContourReport, HistogramReport};
pub use runner::{contours_for_samples, run_contours, run_histogram, ContourRun};
pub use samples::{parse_columns, read_columns};
