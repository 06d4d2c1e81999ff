//! Scenario results and suite report rendering.

use serde::{Deserialize, Serialize};

use crate::comparator::Comparison;
use crate::config::ComparisonTolerance;
use crate::metrics::Metrics;
use crate::properties::RecordedProperties;

/// Terminal state of one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScenarioVerdict {
    Passed,
    /// At least one metric fell outside the tolerance band.
    Regressed { metrics: Vec<String> },
    /// Configuration rejected before timing.
    SetupFailed { message: String },
    /// An allocation failed inside the timed region.
    ExecutionFailed { message: String },
}

impl ScenarioVerdict {
    #[must_use]
    pub fn passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Passed => "PASS",
            Self::Regressed { .. } => "REGRESSED",
            Self::SetupFailed { .. } => "SETUP_FAILED",
            Self::ExecutionFailed { .. } => "EXEC_FAILED",
        }
    }
}

/// Everything one scenario produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario: String,
    pub operations: usize,
    pub iterations: usize,
    pub allocation_size: usize,
    pub kinds: Vec<String>,
    pub tolerance: ComparisonTolerance,
    pub verdict: ScenarioVerdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<Metrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measured: Option<Metrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<Comparison>,
    pub diagnostics: Vec<String>,
    pub properties: RecordedProperties,
}

/// Aggregate counts over a suite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteSummary {
    pub total: usize,
    pub passed: usize,
    pub regressed: usize,
    pub errored: usize,
    pub results: Vec<ScenarioResult>,
}

impl SuiteSummary {
    #[must_use]
    pub fn from_results(results: Vec<ScenarioResult>) -> Self {
        let total = results.len();
        let passed = results.iter().filter(|r| r.verdict.passed()).count();
        let regressed = results
            .iter()
            .filter(|r| matches!(r.verdict, ScenarioVerdict::Regressed { .. }))
            .count();
        Self {
            total,
            passed,
            regressed,
            errored: total - passed - regressed,
            results,
        }
    }

    /// Exit status of the run: every scenario passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }
}

/// Suite report combining run metadata and results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub title: String,
    pub run_id: String,
    pub timestamp: String,
    pub hbw_available: bool,
    pub summary: SuiteSummary,
}

impl SuiteReport {
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.summary.all_passed()
    }

    /// Render the report as markdown.
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("# {}\n\n", self.title));
        out.push_str(&format!("- Run: {}\n", self.run_id));
        out.push_str(&format!("- Timestamp: {}\n", self.timestamp));
        out.push_str(&format!("- HBW available: {}\n", self.hbw_available));
        out.push_str(&format!("- Total: {}\n", self.summary.total));
        out.push_str(&format!("- Passed: {}\n", self.summary.passed));
        out.push_str(&format!("- Regressed: {}\n", self.summary.regressed));
        out.push_str(&format!("- Errored: {}\n\n", self.summary.errored));

        out.push_str("| Scenario | Tolerance | ops/s | vs ref % | ns/op | vs ref % | Status |\n");
        out.push_str("|----------|-----------|-------|----------|-------|----------|--------|\n");
        for r in &self.summary.results {
            let cell = |name: &str| {
                r.properties
                    .get(name)
                    .map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
            };
            out.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} |\n",
                r.scenario,
                r.tolerance.describe(),
                cell(crate::properties::OPS_PER_SEC),
                cell(crate::properties::OPS_PER_SEC_VS_REF),
                cell(crate::properties::AVG_OP_TIME_NSEC),
                cell(crate::properties::AVG_OP_TIME_NSEC_VS_REF),
                r.verdict.label(),
            ));
        }

        let failures: Vec<&ScenarioResult> = self
            .summary
            .results
            .iter()
            .filter(|r| !r.verdict.passed())
            .collect();
        if !failures.is_empty() {
            out.push_str("\n## Failures\n");
            for r in failures {
                out.push_str(&format!("\n### {}\n\n", r.scenario));
                match &r.verdict {
                    ScenarioVerdict::SetupFailed { message }
                    | ScenarioVerdict::ExecutionFailed { message } => {
                        out.push_str(&format!("- {message}\n"));
                    }
                    _ => {}
                }
                for line in &r.diagnostics {
                    out.push_str(&format!("- {line}\n"));
                }
            }
        }
        out
    }

    /// Render the report as JSON.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
    }
}
