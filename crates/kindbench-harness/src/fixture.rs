//! Paired reference/test execution of one workload.
//!
//! A [`PerformanceFixture`] holds two identically configured workload cases,
//! one per allocator. Both sides are validated before anything is timed,
//! then the reference runs to completion before the test side starts. Once both produced metrics the diagnostics are printed and the
//! four trend properties recorded, whatever the verdict.

use std::io::Write;
use std::time::Instant;

use kindbench_alloc::Kind;
use serde_json::json;

use crate::comparator::compare_metrics;
use crate::config::{ComparisonTolerance, check_fraction};
use crate::error::HarnessError;
use crate::metrics::Metrics;
use crate::operation::Operation;
use crate::properties::{RecordedProperties, write_metrics};
use crate::report::{ScenarioResult, ScenarioVerdict};
use crate::scenario::Scenario;
use crate::structured_log::{LogEmitter, LogEntry, LogLevel, Outcome, Side};
use crate::workload::{WorkloadCase, WorkloadParams};

/// Reference and system-under-test cases for one scenario.
#[derive(Debug)]
pub struct PerformanceFixture<R: Operation, T: Operation> {
    reference: WorkloadCase<R>,
    test: WorkloadCase<T>,
}

impl<R: Operation, T: Operation> PerformanceFixture<R, T> {
    #[must_use]
    pub fn new(reference: R, test: T) -> Self {
        Self {
            reference: WorkloadCase::new(reference),
            test: WorkloadCase::new(test),
        }
    }

    #[must_use]
    pub fn reference(&self) -> &WorkloadCase<R> {
        &self.reference
    }

    #[must_use]
    pub fn test(&self) -> &WorkloadCase<T> {
        &self.test
    }

    /// Split into the reference and test operations.
    #[must_use]
    pub fn into_operations(self) -> (R, T) {
        (self.reference.into_operation(), self.test.into_operation())
    }

    /// Run a registered scenario.
    ///
    /// Setup and allocation failures become verdicts; only log I/O errors
    /// are returned as `Err`.
    pub fn run_scenario<W: Write>(
        &mut self,
        scenario: &Scenario,
        tolerance: ComparisonTolerance,
        log: &mut LogEmitter<W>,
    ) -> Result<ScenarioResult, HarnessError> {
        self.reference.apply_preset(scenario.preset);
        self.test.apply_preset(scenario.preset);
        self.execute(scenario.name, scenario.kinds, tolerance, log)
    }

    /// Run an ad-hoc workload under `name`.
    pub fn run<W: Write>(
        &mut self,
        name: &str,
        params: WorkloadParams,
        tolerance: ComparisonTolerance,
        log: &mut LogEmitter<W>,
    ) -> Result<ScenarioResult, HarnessError> {
        self.reference.configure(params.clone());
        self.test.configure(params);
        self.execute(name, None, tolerance, log)
    }

    fn execute<W: Write>(
        &mut self,
        name: &str,
        kinds: Option<&[Kind]>,
        tolerance: ComparisonTolerance,
        log: &mut LogEmitter<W>,
    ) -> Result<ScenarioResult, HarnessError> {
        let started = Instant::now();
        let params = self.test.params();
        let used_kinds = kinds.unwrap_or(&params.kinds);

        let mut result = ScenarioResult {
            scenario: name.to_string(),
            operations: params.operation_count,
            iterations: params.iteration_count,
            allocation_size: params.allocation_size,
            kinds: used_kinds.iter().map(|k| k.as_str().to_string()).collect(),
            tolerance,
            verdict: ScenarioVerdict::Passed,
            reference: None,
            measured: None,
            comparison: None,
            diagnostics: Vec::new(),
            properties: RecordedProperties::new(),
        };

        log.emit_entry(
            LogEntry::new("", LogLevel::Info, "scenario_start")
                .with_scenario(name)
                .with_tolerance(tolerance.fraction())
                .with_details(json!({
                    "operations": result.operations,
                    "iterations": result.iterations,
                    "allocation_size": result.allocation_size,
                    "kinds": result.kinds,
                })),
        )?;

        let tolerance_name = match tolerance {
            ComparisonTolerance::Delta { .. } => "delta",
            ComparisonTolerance::Band { .. } => "tolerance",
        };
        let setup = check_fraction(tolerance_name, tolerance.fraction())
            .and_then(|_| self.reference.check(kinds))
            .and_then(|()| self.test.check(kinds));
        if let Err(err) = setup {
            return finish(fail(result, &HarnessError::from(err)), started, log);
        }

        let reference = match self.reference.run_test(kinds) {
            Ok(metrics) => metrics,
            Err(err) => return finish(fail(result, &err), started, log),
        };
        log_workload(log, name, Side::Reference, R::LABEL, &reference)?;
        result.reference = Some(reference);

        let measured = match self.test.run_test(kinds) {
            Ok(metrics) => metrics,
            Err(err) => return finish(fail(result, &err), started, log),
        };
        log_workload(log, name, Side::Test, T::LABEL, &measured)?;
        result.measured = Some(measured);

        let comparison = compare_metrics(&measured, &reference, tolerance.fraction());
        result.diagnostics = comparison.diagnostics();
        println!("[{name}] {} vs {}", T::LABEL, R::LABEL);
        for line in &result.diagnostics {
            println!("{line}");
        }
        write_metrics(&mut result.properties, &measured, &reference);

        let regressed: Vec<String> = comparison
            .regressed_metrics()
            .into_iter()
            .map(str::to_string)
            .collect();
        log.emit_entry(
            LogEntry::new(
                "",
                if regressed.is_empty() {
                    LogLevel::Info
                } else {
                    LogLevel::Warn
                },
                "comparison",
            )
            .with_scenario(name)
            .with_tolerance(tolerance.fraction())
            .with_details(json!({
                "passed": comparison.passed(),
                "regressed": regressed,
            })),
        )?;

        if !regressed.is_empty() {
            result.verdict = ScenarioVerdict::Regressed { metrics: regressed };
        }
        result.comparison = Some(comparison);
        finish(result, started, log)
    }
}

fn fail(mut result: ScenarioResult, err: &HarnessError) -> ScenarioResult {
    let message = err.to_string();
    println!("[{}] ERROR: {message}", result.scenario);
    result.verdict = if err.is_config() {
        ScenarioVerdict::SetupFailed { message }
    } else {
        ScenarioVerdict::ExecutionFailed { message }
    };
    result
}

fn log_workload<W: Write>(
    log: &mut LogEmitter<W>,
    scenario: &str,
    side: Side,
    label: &str,
    metrics: &Metrics,
) -> std::io::Result<()> {
    log.emit_entry(
        LogEntry::new("", LogLevel::Info, "workload_complete")
            .with_scenario(scenario)
            .with_side(side)
            .with_details(json!({
                "operation": label,
                "operations_per_second": metrics.operations_per_second,
                "avg_operation_duration_ns": metrics.avg_operation_duration_ns,
            })),
    )?;
    Ok(())
}

fn finish<W: Write>(
    result: ScenarioResult,
    started: Instant,
    log: &mut LogEmitter<W>,
) -> Result<ScenarioResult, HarnessError> {
    let (level, outcome) = match &result.verdict {
        ScenarioVerdict::Passed => (LogLevel::Info, Outcome::Pass),
        ScenarioVerdict::Regressed { .. } => (LogLevel::Warn, Outcome::Regressed),
        ScenarioVerdict::SetupFailed { message } | ScenarioVerdict::ExecutionFailed { message } => {
            log.emit_entry(
                LogEntry::new("", LogLevel::Error, "scenario_error")
                    .with_scenario(result.scenario.clone())
                    .with_details(json!({ "status": result.verdict.label(), "message": message })),
            )?;
            (LogLevel::Error, Outcome::Error)
        }
    };
    let elapsed = u64::try_from(started.elapsed().as_nanos()).unwrap_or(u64::MAX);
    log.emit_entry(
        LogEntry::new("", level, "scenario_end")
            .with_scenario(result.scenario.clone())
            .with_outcome(outcome)
            .with_duration_ns(elapsed),
    )?;
    Ok(result)
}
