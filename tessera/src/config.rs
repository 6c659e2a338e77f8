use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::{ChannelError, Rgba8};

/// Policy mapping the per-channel error score to the scalar compared against
/// the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ErrorMetric {
    /// Mean of the R/G/B squared errors, alpha excluded. The default.
    #[default]
    MeanRgb,
    /// Mean of all four channel errors, alpha folded in.
    MeanRgba,
}

impl ErrorMetric {
    pub fn scalar(&self, error: &ChannelError) -> f64 {
        match self {
            ErrorMetric::MeanRgb => (error.r + error.g + error.b) / 3.0,
            ErrorMetric::MeanRgba => (error.r + error.g + error.b + error.a) / 4.0,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("error threshold must be a non-negative finite number, got {0}")]
    InvalidThreshold(f64),
    #[error("work budget must be at least 1")]
    ZeroWorkBudget,
}

/// Configuration of one decomposition build.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Regions whose scalar error falls below this become leaves.
    pub error_threshold: f64,
    /// Upper bound on total node creations.
    pub work_budget: u64,
    /// Fill color for raster cells no leaf covers.
    pub background: Rgba8,
    /// Channel policy for the scalar error.
    pub error_metric: ErrorMetric,
    /// Cap on simultaneously running statistics passes. `None` uses the
    /// available parallelism.
    pub max_parallel_tasks: Option<usize>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            error_threshold: 1.0,
            work_budget: 5000,
            background: Rgba8::TRANSPARENT,
            error_metric: ErrorMetric::default(),
            max_parallel_tasks: None,
        }
    }
}

impl BuildConfig {
    /// Rejects invalid values synchronously, before any tree construction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.error_threshold.is_finite() || self.error_threshold < 0.0 {
            return Err(ConfigError::InvalidThreshold(self.error_threshold));
        }
        if self.work_budget == 0 {
            return Err(ConfigError::ZeroWorkBudget);
        }
        Ok(())
    }
}
