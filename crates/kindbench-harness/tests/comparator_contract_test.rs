//! Integration test: metric comparison contract
//!
//! Validates that:
//! 1. A measurement compared with itself passes for every non-negative delta.
//! 2. A pass at some delta stays a pass at every larger delta.
//! 3. A reference 10x faster fails throughput while duration is still reported.
//! 4. Trend percentages are derivable from the recorded absolutes.
//!
//! Run: cargo test -p kindbench-harness --test comparator_contract_test

use kindbench_harness::properties::{
    AVG_OP_TIME_NSEC, AVG_OP_TIME_NSEC_VS_REF, OPS_PER_SEC, OPS_PER_SEC_VS_REF,
};
use kindbench_harness::{Metrics, RecordedProperties, compare_metrics, write_metrics};

fn from_throughput(ops_per_sec: f64) -> Metrics {
    Metrics::new(ops_per_sec, 1e9 / ops_per_sec)
}

#[test]
fn self_comparison_always_passes() {
    for ops in [1.0, 37.5, 1_000.0, 2.5e6, 8e8] {
        let m = from_throughput(ops);
        for delta in [0.0, 0.001, 0.05, 0.15, 0.5, 1.0, 3.0] {
            let c = compare_metrics(&m, &m, delta);
            assert!(c.passed(), "ops={ops} delta={delta}");
            assert!(c.regressed_metrics().is_empty());
        }
    }
}

#[test]
fn verdict_is_monotonic_in_delta() {
    let reference = from_throughput(1_000.0);
    let deltas: Vec<f64> = (0..=40).map(|i| f64::from(i) * 0.025).collect();
    for measured_ops in [500.0, 800.0, 880.0, 900.0, 990.0, 1_200.0] {
        let measured = from_throughput(measured_ops);
        let mut seen_pass = false;
        for &delta in &deltas {
            let passed = compare_metrics(&measured, &reference, delta).passed();
            assert!(
                passed || !seen_pass,
                "measured={measured_ops}: pass at a smaller delta, fail at {delta}"
            );
            seen_pass |= passed;
        }
    }
}

#[test]
fn tenfold_reference_fails_and_reports_both_checks() {
    let measured = Metrics::new(1_000.0, 1_000.0);
    let reference = Metrics::new(10_000.0, 1_000.0);
    let c = compare_metrics(&measured, &reference, 0.15);
    assert!(!c.passed());
    assert_eq!(c.regressed_metrics(), vec!["operationsPerSecond"]);

    let lines = c.diagnostics();
    assert!(
        lines
            .iter()
            .any(|l| l.contains("'operationsPerSecond' outside expected bounds!"))
    );
    assert!(
        lines
            .iter()
            .any(|l| l.starts_with("Metric: avgOperationDuration.")),
        "duration check must still be evaluated: {lines:?}"
    );
    assert!(c.avg_operation_duration.passed);
    assert_eq!(lines.len(), 3);
}

#[test]
fn overhead_within_fifteen_percent_passes_single_shape() {
    let reference = Metrics::new(1_000_000.0, 1_000.0);
    let measured = Metrics::new(1_000_000.0 / 1.14, 1_140.0);
    assert!(compare_metrics(&measured, &reference, 0.15).passed());

    let measured = Metrics::new(1_000_000.0 / 1.2, 1_200.0);
    let c = compare_metrics(&measured, &reference, 0.15);
    assert!(!c.passed());
    assert_eq!(
        c.regressed_metrics(),
        vec!["operationsPerSecond", "avgOperationDuration"]
    );
}

#[test]
fn trend_percentages_follow_from_absolutes() {
    let reference = Metrics::new(2_000.0, 500_000.0);
    let measured = Metrics::new(1_500.0, 666_666.0);
    let mut sink = RecordedProperties::new();
    write_metrics(&mut sink, &measured, &reference);
    assert_eq!(sink.len(), 4);

    let ops = sink.get(OPS_PER_SEC).unwrap();
    let ops_vs = sink.get(OPS_PER_SEC_VS_REF).unwrap();
    assert!((ops_vs - (2_000.0 - ops) * 100.0 / 2_000.0).abs() < 1e-9);

    let ns = sink.get(AVG_OP_TIME_NSEC).unwrap();
    let ns_vs = sink.get(AVG_OP_TIME_NSEC_VS_REF).unwrap();
    assert!((ns_vs - (ns - 500_000.0) * 100.0 / 500_000.0).abs() < 1e-9);
    assert!(ops_vs > 0.0 && ns_vs > 0.0);
}
