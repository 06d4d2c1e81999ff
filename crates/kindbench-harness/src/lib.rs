//! Comparative allocator micro-benchmark harness for kindbench.
//!
//! This crate provides:
//! - Workload execution: timed allocate/free loops over a configurable shape
//!   (operations, iterations, allocation size, allocation kinds)
//! - Comparison: tolerance-band check of measured metrics against the
//!   platform allocator, with per-metric diagnostics
//! - Scenario registry: six fixed workload shapes run against both allocators
//! - Reporting: trend properties, markdown/JSON suite reports, JSONL logs

#![forbid(unsafe_code)]

pub mod comparator;
pub mod config;
pub mod error;
pub mod fixture;
pub mod metrics;
pub mod operation;
pub mod properties;
pub mod report;
pub mod runner;
pub mod scenario;
pub mod structured_log;
pub mod workload;

pub use comparator::{Comparison, DeltaCheck, Direction, check_delta, compare_metrics};
pub use config::{ComparisonTolerance, HarnessConfig};
pub use error::{ConfigError, HarnessError};
pub use fixture::PerformanceFixture;
pub use metrics::Metrics;
pub use operation::{KindOperation, Operation, ReferenceOperation};
pub use properties::{PropertySink, RecordedProperties, write_metrics};
pub use report::{ScenarioResult, ScenarioVerdict, SuiteReport, SuiteSummary};
pub use runner::SuiteRunner;
pub use scenario::{SCENARIOS, Scenario};
pub use workload::{Preset, WorkloadCase, WorkloadParams};
