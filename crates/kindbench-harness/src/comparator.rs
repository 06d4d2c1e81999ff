//! Tolerance-band comparison of measured metrics against a reference.
//!
//! Throughput may not drop below `reference * (1 - delta)` and latency may
//! not rise above `reference * (1 + delta)`. Improvements never fail. Both
//! checks are always evaluated so one run surfaces every regressed metric.
//!
//! Evaluation is pure; [`Comparison::diagnostics`] renders the lines the
//! fixture prints.

use serde::{Deserialize, Serialize};

use crate::metrics::Metrics;

/// Which side of the reference is acceptable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Observed must be >= reference * (1 - delta).
    NotLessThan,
    /// Observed must be <= reference * (1 + delta).
    NotGreaterThan,
}

impl Direction {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::NotLessThan => ">=",
            Self::NotGreaterThan => "<=",
        }
    }

    /// Sign applied to the raw relative difference so that a positive
    /// relative delta always points in the regression direction.
    const fn regression_sign(self) -> f64 {
        match self {
            Self::NotLessThan => -1.0,
            Self::NotGreaterThan => 1.0,
        }
    }
}

/// Result of one per-metric check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaCheck {
    pub metric: String,
    pub direction: Direction,
    pub reference: f64,
    pub threshold: f64,
    pub observed: f64,
    pub delta: f64,
    /// Signed relative difference; positive means worse than the reference.
    pub relative_delta: f64,
    pub passed: bool,
}

impl DeltaCheck {
    /// Diagnostic line describing the check.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        format!(
            "Metric: {}. Reference value: {}. Expected: {} {} (delta = {}). Actual: {} (delta = {}).",
            self.metric,
            self.reference,
            self.direction.symbol(),
            self.threshold,
            self.delta,
            self.observed,
            self.relative_delta,
        )
    }

    /// Error line for a failed check.
    #[must_use]
    pub fn failure_line(&self) -> Option<String> {
        (!self.passed).then(|| format!("ERROR: Value of '{}' outside expected bounds!", self.metric))
    }
}

/// Check `value` against `reference` widened by `delta` in `direction`.
#[must_use]
pub fn check_delta(
    value: f64,
    reference: f64,
    metric: &str,
    delta: f64,
    direction: Direction,
) -> DeltaCheck {
    let threshold = match direction {
        Direction::NotLessThan => reference * (1.0 - delta),
        Direction::NotGreaterThan => reference * (1.0 + delta),
    };
    let passed = match direction {
        Direction::NotLessThan => value >= threshold,
        Direction::NotGreaterThan => value <= threshold,
    };
    let relative_delta = (value - reference) * direction.regression_sign() / reference;
    DeltaCheck {
        metric: metric.to_string(),
        direction,
        reference,
        threshold,
        observed: value,
        delta,
        relative_delta,
        passed,
    }
}

/// Both per-metric checks of one comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub operations_per_second: DeltaCheck,
    pub avg_operation_duration: DeltaCheck,
}

impl Comparison {
    /// Overall verdict: every check passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.checks().iter().all(|c| c.passed)
    }

    #[must_use]
    pub fn checks(&self) -> [&DeltaCheck; 2] {
        [&self.operations_per_second, &self.avg_operation_duration]
    }

    /// Names of the metrics outside their band.
    #[must_use]
    pub fn regressed_metrics(&self) -> Vec<&str> {
        self.checks()
            .iter()
            .filter(|c| !c.passed)
            .map(|c| c.metric.as_str())
            .collect()
    }

    /// One diagnostic line per check, each followed by its error line when
    /// the check failed.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(4);
        for check in self.checks() {
            lines.push(check.diagnostic());
            lines.extend(check.failure_line());
        }
        lines
    }
}

/// Compare `measured` against `reference` with tolerance fraction `delta`.
#[must_use]
pub fn compare_metrics(measured: &Metrics, reference: &Metrics, delta: f64) -> Comparison {
    Comparison {
        operations_per_second: check_delta(
            measured.operations_per_second,
            reference.operations_per_second,
            "operationsPerSecond",
            delta,
            Direction::NotLessThan,
        ),
        avg_operation_duration: check_delta(
            measured.avg_operation_duration_ns,
            reference.avg_operation_duration_ns,
            "avgOperationDuration",
            delta,
            Direction::NotGreaterThan,
        ),
    }
}
