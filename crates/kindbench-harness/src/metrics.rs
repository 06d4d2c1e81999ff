//! Throughput/latency aggregate of one timed run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Derived measurements of one timed run.
///
/// One operation is one allocate+deallocate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub operations_per_second: f64,
    pub avg_operation_duration_ns: f64,
}

impl Metrics {
    #[must_use]
    pub const fn new(operations_per_second: f64, avg_operation_duration_ns: f64) -> Self {
        Self {
            operations_per_second,
            avg_operation_duration_ns,
        }
    }

    /// Derive metrics from an operation count and the time it took.
    ///
    /// Elapsed time below clock granularity is floored at 1 ns so both fields
    /// stay strictly positive.
    pub fn from_run(total_operations: u64, elapsed: Duration) -> Result<Self, ConfigError> {
        if total_operations == 0 {
            return Err(ConfigError::ZeroOperations);
        }
        let elapsed_ns = (elapsed.as_nanos() as f64).max(1.0);
        let ops = total_operations as f64;
        Ok(Self {
            operations_per_second: ops * NANOS_PER_SEC / elapsed_ns,
            avg_operation_duration_ns: elapsed_ns / ops,
        })
    }
}

impl std::fmt::Display for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.1} ops/s, {:.1} ns/op",
            self.operations_per_second, self.avg_operation_duration_ns
        )
    }
}
