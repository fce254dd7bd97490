//! Run configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use confidence_contour::{AxisPair, ContourConfig};
use serde::{Deserialize, Serialize};

/// One contour run, loaded from YAML.
///
/// ```yaml
/// input: poles.csv
/// delimiter: ","
/// x_column: 0
/// y_column: 1
/// contour:
///   percentages: [68, 95]
///   binning:
///     bins: 30
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Delimited sample file. Relative paths resolve against the config file.
    pub input: PathBuf,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default)]
    pub x_column: usize,
    #[serde(default = "default_y_column")]
    pub y_column: usize,
    #[serde(default)]
    pub contour: ContourConfig,
}

fn default_delimiter() -> char {
    ','
}

fn default_y_column() -> usize {
    1
}

impl RunConfig {
    /// Config for a sample file with default columns and contour settings.
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            delimiter: default_delimiter(),
            x_column: 0,
            y_column: default_y_column(),
            contour: ContourConfig::default(),
        }
    }

    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config: RunConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;

        if config.input.is_relative() {
            if let Some(dir) = path.parent() {
                config.input = dir.join(&config.input);
            }
        }
        Ok(config)
    }

    /// Replace percentages and bin counts with command-line values.
    ///
    /// Bins given here also drop any configured edges or grid step.
    pub fn apply_overrides(&mut self, percentages: Option<Vec<f64>>, bins: Option<usize>) {
        if let Some(percentages) = percentages {
            self.contour.percentages = percentages;
        }
        if let Some(bins) = bins {
            self.contour.binning.bins = Some(AxisPair::Both(bins));
            self.contour.binning.edges = None;
            self.contour.grid_step = None;
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.x_column == self.y_column {
            bail!("x_column and y_column must differ, both are {}", self.x_column);
        }
        if self.delimiter == '#' {
            bail!("'#' starts a comment and cannot be the delimiter");
        }
        self.contour.validate()?;
        Ok(())
    }
}
