//! Tolerance configuration.
//!
//! Two tolerance sources exist and are kept apart:
//! - `delta` (`KINDBENCH_DELTA`, default 0.15): the band used by the six
//!   registered scenarios.
//! - `tolerance` + `confidence` (`KINDBENCH_TOLERANCE`, default 0.10, and
//!   `KINDBENCH_CONFIDENCE`, default 0.05): the band used by the generic
//!   fixture run for ad-hoc workloads.
//!
//! CLI flags override the environment.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_DELTA: f64 = 0.15;
pub const DEFAULT_TOLERANCE: f64 = 0.10;
pub const DEFAULT_CONFIDENCE: f64 = 0.05;

/// Tolerance band applied by one comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ComparisonTolerance {
    /// Literal scenario delta.
    Delta { delta: f64 },
    /// Tolerance widened by a confidence margin.
    Band { tolerance: f64, confidence: f64 },
}

impl ComparisonTolerance {
    /// Fraction passed to the comparator.
    #[must_use]
    pub fn fraction(self) -> f64 {
        match self {
            Self::Delta { delta } => delta,
            Self::Band {
                tolerance,
                confidence,
            } => tolerance + confidence,
        }
    }

    /// Short human-readable description.
    #[must_use]
    pub fn describe(self) -> String {
        match self {
            Self::Delta { delta } => format!("delta={delta}"),
            Self::Band {
                tolerance,
                confidence,
            } => format!("tolerance={tolerance}+confidence={confidence}"),
        }
    }
}

/// Harness-wide tolerance settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HarnessConfig {
    pub delta: f64,
    pub tolerance: f64,
    pub confidence: f64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            delta: DEFAULT_DELTA,
            tolerance: DEFAULT_TOLERANCE,
            confidence: DEFAULT_CONFIDENCE,
        }
    }
}

impl HarnessConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read overrides through `lookup` (variable name -> value).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            delta: read_var(&lookup, "KINDBENCH_DELTA", defaults.delta)?,
            tolerance: read_var(&lookup, "KINDBENCH_TOLERANCE", defaults.tolerance)?,
            confidence: read_var(&lookup, "KINDBENCH_CONFIDENCE", defaults.confidence)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject negative or non-finite values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_fraction("delta", self.delta)?;
        check_fraction("tolerance", self.tolerance)?;
        check_fraction("confidence", self.confidence)?;
        Ok(())
    }

    /// Band used by the registered scenarios.
    #[must_use]
    pub fn scenario_tolerance(&self) -> ComparisonTolerance {
        ComparisonTolerance::Delta { delta: self.delta }
    }

    /// Band used by the generic fixture run.
    #[must_use]
    pub fn band_tolerance(&self) -> ComparisonTolerance {
        ComparisonTolerance::Band {
            tolerance: self.tolerance,
            confidence: self.confidence,
        }
    }
}

/// Validate one tolerance fraction.
pub fn check_fraction(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ConfigError::InvalidTolerance { name, value })
    }
}

fn read_var(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: f64,
) -> Result<f64, ConfigError> {
    match lookup(var) {
        Some(raw) if !raw.trim().is_empty() => {
            raw.trim().parse::<f64>().map_err(|_| ConfigError::InvalidEnv { var, value: raw })
        }
        _ => Ok(default),
    }
}
