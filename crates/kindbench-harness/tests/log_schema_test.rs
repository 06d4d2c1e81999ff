//! Integration test: JSONL log schema (suite run)
//!
//! Validates that:
//! 1. A suite run emits one valid JSONL object per line.
//! 2. Trace ids are unique and carry the run id prefix.
//! 3. Events follow suite_start, per-scenario brackets, suite_end.
//! 4. The written report renders markdown and parseable JSON.
//!
//! Run: cargo test -p kindbench-harness --test log_schema_test

use std::collections::HashSet;

use kindbench_alloc::{KindAllocator, KindRegistry};
use kindbench_harness::scenario::select;
use kindbench_harness::structured_log::{LogEmitter, LogEntry, Outcome, Side, validate_log_line};
use kindbench_harness::{HarnessConfig, SuiteReport, SuiteRunner};

fn run_suite(names: &[&str]) -> (SuiteReport, Vec<LogEntry>) {
    let allocator = KindAllocator::new(KindRegistry::new(false));
    let config = HarnessConfig {
        delta: 1e12,
        ..HarnessConfig::default()
    };
    let runner = SuiteRunner::new(&allocator, config).with_run_id("schema");
    let mut log = LogEmitter::to_buffer("schema");
    let names: Vec<String> = names.iter().map(|n| (*n).to_string()).collect();
    let report = runner.run(&select(&names).unwrap(), &mut log).unwrap();

    let text = String::from_utf8(log.into_inner()).unwrap();
    let entries = text
        .lines()
        .enumerate()
        .map(|(i, line)| {
            validate_log_line(line, i + 1)
                .unwrap_or_else(|errs| panic!("invalid log line: {}", errs[0]))
        })
        .collect();
    (report, entries)
}

#[test]
fn every_line_is_valid_with_unique_trace_ids() {
    let (_, entries) = run_suite(&["single_op_single_iter", "single_op_many_iters"]);
    assert!(!entries.is_empty());

    let mut ids = HashSet::new();
    for e in &entries {
        assert!(e.trace_id.starts_with("schema::"), "{}", e.trace_id);
        assert!(ids.insert(e.trace_id.clone()), "duplicate {}", e.trace_id);
        assert_eq!(e.run_id.as_deref(), Some("schema"));
        assert!(e.timestamp.ends_with('Z'));
    }
}

#[test]
fn events_bracket_each_scenario() {
    let (report, entries) = run_suite(&["single_op_single_iter", "single_op_many_iters"]);
    assert!(report.all_passed());

    let events: Vec<&str> = entries.iter().map(|e| e.event.as_str()).collect();
    assert_eq!(
        events,
        vec![
            "suite_start",
            "scenario_start",
            "workload_complete",
            "workload_complete",
            "comparison",
            "scenario_end",
            "scenario_start",
            "workload_complete",
            "workload_complete",
            "comparison",
            "scenario_end",
            "suite_end",
        ]
    );

    let sides: Vec<Side> = entries.iter().filter_map(|e| e.side).collect();
    assert_eq!(
        sides,
        vec![Side::Reference, Side::Test, Side::Reference, Side::Test]
    );
    for end in entries.iter().filter(|e| e.event == "scenario_end") {
        assert_eq!(end.outcome, Some(Outcome::Pass));
        assert!(end.duration_ns.is_some());
    }
    for cmp in entries.iter().filter(|e| e.event == "comparison") {
        assert_eq!(cmp.tolerance, Some(1e12));
    }
}

#[test]
fn report_renders_markdown_and_json() {
    let (report, _) = run_suite(&["many_ops_single_iter"]);
    let md = report.to_markdown();
    assert!(md.contains("| many_ops_single_iter |"));
    assert!(md.contains("PASS"));
    assert!(!md.contains("## Failures"));

    let json: serde_json::Value = serde_json::from_str(&report.to_json()).unwrap();
    assert_eq!(json["run_id"], "schema");
    let result = &json["summary"]["results"][0];
    assert_eq!(result["verdict"]["status"], "passed");
    assert_eq!(result["properties"].as_array().unwrap().len(), 4);
    assert!(result["measured"]["operations_per_second"].as_f64().unwrap() > 0.0);
}
