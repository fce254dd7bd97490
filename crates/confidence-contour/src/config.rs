//! Configuration for contour extraction.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::binning::{GridStep, ResolvedGridStep};
use crate::error::{ContourError, Result};
use crate::histogram::{AxisPair, BinningOptions};
use crate::levels::validate_percentages;

/// Percentages requested when none are configured.
pub const DEFAULT_PERCENTAGES: [f64; 2] = [68.0, 95.0];

/// Binning and percentages for one contour run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourConfig {
    /// Bin counts, edges and range for the density grid.
    pub binning: BinningOptions,

    /// Confidence percentages in (0, 100].
    pub percentages: Vec<f64>,

    /// Derive binning from a grid step instead of `binning`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_step: Option<GridStep>,
}

impl Default for ContourConfig {
    fn default() -> Self {
        Self {
            binning: BinningOptions::default(),
            percentages: DEFAULT_PERCENTAGES.to_vec(),
            grid_step: None,
        }
    }
}

impl ContourConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads `CONTOUR_BINS` (`"30"` or `"30,40"`), `CONTOUR_PERCENTAGES`
    /// (`"68,95"`) and `CONTOUR_GRID_STEP`. Values that fail to parse are
    /// skipped with a warning.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(val) = lookup("CONTOUR_BINS") {
            match parse_list::<usize>(&val).as_deref() {
                Some([bins]) => config.binning.bins = Some(AxisPair::Both(*bins)),
                Some([x, y]) => config.binning.bins = Some(AxisPair::PerAxis(*x, *y)),
                _ => warn!(value = %val, "Ignoring unparseable CONTOUR_BINS"),
            }
        }

        if let Some(val) = lookup("CONTOUR_PERCENTAGES") {
            match parse_list::<f64>(&val) {
                Some(percentages) if !percentages.is_empty() => config.percentages = percentages,
                _ => warn!(value = %val, "Ignoring unparseable CONTOUR_PERCENTAGES"),
            }
        }

        if let Some(val) = lookup("CONTOUR_GRID_STEP") {
            match val.trim().parse::<f64>() {
                Ok(step) => {
                    config.grid_step = Some(GridStep {
                        step: Some(step),
                        bounds: None,
                    })
                }
                Err(_) => warn!(value = %val, "Ignoring unparseable CONTOUR_GRID_STEP"),
            }
        }

        config
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        validate_percentages(&self.percentages)?;

        if self.binning.bins.is_some() && self.binning.edges.is_some() {
            return Err(ContourError::conflicting("bins", "edges"));
        }
        if let Some(bins) = &self.binning.bins {
            if *bins.x() == 0 || *bins.y() == 0 {
                return Err(ContourError::invalid_argument("bins", "bin counts must be > 0"));
            }
        }
        if let Some(grid_step) = &self.grid_step {
            if self.binning.bins.is_some() || self.binning.edges.is_some() {
                return Err(ContourError::conflicting("binning", "grid_step"));
            }
            grid_step.validate()?;
        }

        Ok(())
    }

    /// Binning options for a set of samples, resolving `grid_step` if set.
    pub fn resolve_binning(&self, array_x: &[f64], array_y: &[f64]) -> Result<BinningOptions> {
        Ok(self.resolve_grid_step(array_x, array_y)?.0)
    }

    /// Like [`resolve_binning`](Self::resolve_binning), also returning the
    /// resolved grid step when one is configured.
    pub fn resolve_grid_step(
        &self,
        array_x: &[f64],
        array_y: &[f64],
    ) -> Result<(BinningOptions, Option<ResolvedGridStep>)> {
        match &self.grid_step {
            Some(grid_step) => {
                let resolved = grid_step.resolve(array_x, array_y)?;
                Ok((resolved.options.clone(), Some(resolved)))
            }
            None => Ok((self.binning.clone(), None)),
        }
    }
}

fn parse_list<T: std::str::FromStr>(value: &str) -> Option<Vec<T>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| part.parse().ok())
        .collect()
}
