//! Registry of named workload scenarios.

use kindbench_alloc::Kind;

use crate::error::ConfigError;
use crate::workload::Preset;

/// A named workload shape compared between both allocators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scenario {
    pub name: &'static str,
    pub preset: Preset,
    /// Kinds passed to `run_test`; `None` uses the case default.
    pub kinds: Option<&'static [Kind]>,
    pub description: &'static str,
}

const MANY_KINDS: &[Kind] = &[Kind::Default, Kind::HbwPreferred];

pub const SCENARIOS: [Scenario; 6] = [
    Scenario {
        name: "single_op_single_iter",
        preset: Preset::SingleOpSingleIter,
        kinds: None,
        description: "fixed per-call overhead",
    },
    Scenario {
        name: "many_ops_single_iter",
        preset: Preset::ManyOpsSingleIter,
        kinds: None,
        description: "steady-state throughput",
    },
    Scenario {
        name: "many_ops_single_iter_huge_alloc",
        preset: Preset::ManyOpsSingleIterHugeAlloc,
        kinds: None,
        description: "large-allocation path cost",
    },
    Scenario {
        name: "single_op_many_iters",
        preset: Preset::SingleOpManyIters,
        kinds: None,
        description: "overhead stability across repeated single calls",
    },
    Scenario {
        name: "many_ops_many_iters",
        preset: Preset::ManyOpsManyIters,
        kinds: None,
        description: "sustained throughput",
    },
    Scenario {
        name: "many_ops_many_iters_many_kinds",
        preset: Preset::ManyOpsManyIters,
        kinds: Some(MANY_KINDS),
        description: "multi-kind selection and fallback overhead",
    },
];

/// Look up a scenario by name.
pub fn find(name: &str) -> Result<&'static Scenario, ConfigError> {
    SCENARIOS
        .iter()
        .find(|s| s.name == name)
        .ok_or_else(|| ConfigError::UnknownScenario(name.to_string()))
}

/// Resolve a list of names (empty selects every scenario), keeping registry order.
pub fn select(names: &[String]) -> Result<Vec<&'static Scenario>, ConfigError> {
    if names.is_empty() {
        return Ok(SCENARIOS.iter().collect());
    }
    for name in names {
        find(name)?;
    }
    Ok(SCENARIOS
        .iter()
        .filter(|s| names.iter().any(|n| n == s.name))
        .collect())
}
