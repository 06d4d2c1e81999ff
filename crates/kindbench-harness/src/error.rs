//! Harness error taxonomy.
//!
//! Configuration errors are raised before any timing starts. Allocation
//! errors abort the workload that hit them. Neither covers performance
//! regressions, which are verdicts, not errors.

use kindbench_alloc::{AllocError, Kind};
use thiserror::Error;

/// Invalid workload or tolerance configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("operation count must be at least 1")]
    ZeroOperations,
    #[error("iteration count must be at least 1")]
    ZeroIterations,
    #[error("allocation size must be at least 1 byte")]
    ZeroAllocationSize,
    #[error("kind list must not be empty")]
    EmptyKinds,
    #[error("unknown kind '{0}'")]
    UnknownKind(String),
    #[error("kind '{kind}' cannot be served: {source}")]
    KindUnavailable {
        kind: Kind,
        #[source]
        source: AllocError,
    },
    #[error("{name} must be a finite value >= 0, got {value}")]
    InvalidTolerance { name: &'static str, value: f64 },
    #[error("{var}: cannot parse '{value}' as a number")]
    InvalidEnv { var: &'static str, value: String },
    #[error("unknown scenario '{0}'")]
    UnknownScenario(String),
}

/// Any failure that prevents a scenario from reaching a verdict.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("{operation} allocation of {size} bytes ({kind}) failed: {source}")]
    Allocation {
        operation: &'static str,
        kind: Kind,
        size: usize,
        #[source]
        source: AllocError,
    },
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl HarnessError {
    /// True for errors raised before timing (setup failures).
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// Parse a comma-separated kind list, rejecting unknown names.
pub fn parse_kinds(raw: &str) -> Result<Vec<Kind>, ConfigError> {
    let kinds = raw
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(|name| Kind::from_str_loose(name).ok_or_else(|| ConfigError::UnknownKind(name.into())))
        .collect::<Result<Vec<_>, _>>()?;
    if kinds.is_empty() {
        return Err(ConfigError::EmptyKinds);
    }
    Ok(kinds)
}
