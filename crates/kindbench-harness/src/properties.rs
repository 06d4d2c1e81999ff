//! Named trend properties recorded for every compared scenario.
//!
//! Recorded whether the scenario passed or not, so borderline runs stay
//! visible to whatever tracks results over time.

use serde::{Deserialize, Serialize};

use crate::metrics::Metrics;

pub const OPS_PER_SEC: &str = "ops_per_sec";
pub const OPS_PER_SEC_VS_REF: &str = "ops_per_sec_vs_ref";
pub const AVG_OP_TIME_NSEC: &str = "avg_op_time_nsec";
pub const AVG_OP_TIME_NSEC_VS_REF: &str = "avg_op_time_nsec_vs_ref";

/// Receiver of named numeric properties.
pub trait PropertySink {
    fn record_property(&mut self, name: &str, value: f64);
}

/// One recorded property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub name: String,
    pub value: f64,
}

/// In-memory sink preserving record order.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordedProperties {
    entries: Vec<Property>,
}

impl RecordedProperties {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Most recent value recorded under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .rev()
            .find(|p| p.name == name)
            .map(|p| p.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.entries.iter()
    }
}

impl PropertySink for RecordedProperties {
    fn record_property(&mut self, name: &str, value: f64) {
        self.entries.push(Property {
            name: name.to_string(),
            value,
        });
    }
}

/// Record the four trend properties of `measured` against `reference`.
///
/// `ops_per_sec_vs_ref` is positive when throughput dropped and
/// `avg_op_time_nsec_vs_ref` is positive when latency grew, both in percent.
pub fn write_metrics(sink: &mut impl PropertySink, measured: &Metrics, reference: &Metrics) {
    sink.record_property(OPS_PER_SEC, measured.operations_per_second);
    sink.record_property(
        OPS_PER_SEC_VS_REF,
        (reference.operations_per_second - measured.operations_per_second) * 100.0
            / reference.operations_per_second,
    );
    sink.record_property(AVG_OP_TIME_NSEC, measured.avg_operation_duration_ns);
    sink.record_property(
        AVG_OP_TIME_NSEC_VS_REF,
        (measured.avg_operation_duration_ns - reference.avg_operation_duration_ns) * 100.0
            / reference.avg_operation_duration_ns,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_exactly_four_properties() {
        let mut sink = RecordedProperties::new();
        write_metrics(
            &mut sink,
            &Metrics::new(900.0, 1_100.0),
            &Metrics::new(1_000.0, 1_000.0),
        );
        assert_eq!(sink.len(), 4);
        let names: Vec<&str> = sink.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(
            names,
            vec![OPS_PER_SEC, OPS_PER_SEC_VS_REF, AVG_OP_TIME_NSEC, AVG_OP_TIME_NSEC_VS_REF]
        );
    }

    #[test]
    fn percentages_follow_from_absolutes() {
        let measured = Metrics::new(900.0, 1_100.0);
        let reference = Metrics::new(1_000.0, 1_000.0);
        let mut sink = RecordedProperties::new();
        write_metrics(&mut sink, &measured, &reference);

        let ops = sink.get(OPS_PER_SEC).unwrap();
        let ops_vs = sink.get(OPS_PER_SEC_VS_REF).unwrap();
        assert!((ops_vs - (reference.operations_per_second - ops) * 100.0 / 1_000.0).abs() < 1e-9);
        assert!((ops_vs - 10.0).abs() < 1e-9);

        let ns = sink.get(AVG_OP_TIME_NSEC).unwrap();
        let ns_vs = sink.get(AVG_OP_TIME_NSEC_VS_REF).unwrap();
        assert!((ns - 1_100.0).abs() < 1e-9);
        assert!((ns_vs - 10.0).abs() < 1e-9);
    }

    #[test]
    fn serializes_as_list() {
        let mut sink = RecordedProperties::new();
        sink.record_property("x", 1.5);
        let json = serde_json::to_value(&sink).unwrap();
        assert_eq!(json, serde_json::json!([{"name": "x", "value": 1.5}]));
    }
}
