//! Suite execution engine.

use std::io::Write;

use kindbench_alloc::KindAllocator;
use serde_json::json;

use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::fixture::PerformanceFixture;
use crate::operation::{KindOperation, ReferenceOperation};
use crate::report::{ScenarioResult, SuiteReport, SuiteSummary};
use crate::scenario::Scenario;
use crate::structured_log::{LogEmitter, LogEntry, LogLevel, now_utc};
use crate::workload::WorkloadParams;

/// Runs scenarios against the platform allocator and a kind allocator.
pub struct SuiteRunner<'a> {
    allocator: &'a KindAllocator,
    config: HarnessConfig,
    /// Identifier stamped on the report and every log line.
    pub run_id: String,
    pub title: String,
}

impl SuiteRunner<'static> {
    /// Runner over the process-wide allocator.
    #[must_use]
    pub fn global(config: HarnessConfig) -> Self {
        Self::new(KindAllocator::global(), config)
    }
}

impl<'a> SuiteRunner<'a> {
    #[must_use]
    pub fn new(allocator: &'a KindAllocator, config: HarnessConfig) -> Self {
        Self {
            allocator,
            config,
            run_id: default_run_id(),
            title: "kindbench allocator comparison".to_string(),
        }
    }

    #[must_use]
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.run_id = run_id.into();
        self
    }

    #[must_use]
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run `scenarios` in order, each on a fresh fixture.
    ///
    /// A failing scenario does not stop the ones after it.
    pub fn run<W: Write>(
        &self,
        scenarios: &[&Scenario],
        log: &mut LogEmitter<W>,
    ) -> Result<SuiteReport, HarnessError> {
        self.suite(log, scenarios.len(), |runner, log| {
            let tolerance = runner.config.scenario_tolerance();
            let mut results = Vec::with_capacity(scenarios.len());
            for scenario in scenarios {
                eprintln!("kindbench: running {}", scenario.name);
                let mut fixture = runner.fixture();
                results.push(fixture.run_scenario(scenario, tolerance, log)?);
            }
            Ok(results)
        })
    }

    /// Run one ad-hoc workload compared with the tolerance + confidence band.
    pub fn run_custom<W: Write>(
        &self,
        name: &str,
        params: WorkloadParams,
        log: &mut LogEmitter<W>,
    ) -> Result<SuiteReport, HarnessError> {
        self.suite(log, 1, |runner, log| {
            eprintln!("kindbench: running {name}");
            let mut fixture = runner.fixture();
            let result = fixture.run(name, params, runner.config.band_tolerance(), log)?;
            Ok(vec![result])
        })
    }

    fn fixture(&self) -> PerformanceFixture<ReferenceOperation, KindOperation<'a>> {
        PerformanceFixture::new(ReferenceOperation::new(), KindOperation::new(self.allocator))
    }

    fn suite<W: Write>(
        &self,
        log: &mut LogEmitter<W>,
        planned: usize,
        body: impl FnOnce(&Self, &mut LogEmitter<W>) -> Result<Vec<ScenarioResult>, HarnessError>,
    ) -> Result<SuiteReport, HarnessError> {
        let hbw_available = self.allocator.registry().hbw_available();
        log.emit_entry(
            LogEntry::new("", LogLevel::Info, "suite_start").with_details(json!({
                "scenarios": planned,
                "hbw_available": hbw_available,
                "config": self.config,
            })),
        )?;

        let summary = SuiteSummary::from_results(body(self, log)?);

        log.emit_entry(
            LogEntry::new(
                "",
                if summary.all_passed() {
                    LogLevel::Info
                } else {
                    LogLevel::Error
                },
                "suite_end",
            )
            .with_details(json!({
                "total": summary.total,
                "passed": summary.passed,
                "regressed": summary.regressed,
                "errored": summary.errored,
            })),
        )?;
        log.flush()?;

        Ok(SuiteReport {
            title: self.title.clone(),
            run_id: self.run_id.clone(),
            timestamp: now_utc(),
            hbw_available,
            summary,
        })
    }
}

fn default_run_id() -> String {
    let millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    format!("kindbench-{millis}")
}
