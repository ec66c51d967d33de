use crate::domain::model::{DataPoint, FieldValue, Report};
use std::collections::BTreeMap;

pub const MEASUREMENT: &str = "ccxp-load-test";

/// Status codes that always get a field, zero when absent from the report.
pub const TRACKED_CODES: [&str; 6] = ["200", "400", "404", "500", "502", "503"];

const NANOS_PER_MILLI: f64 = 1_000_000.0;

fn count(value: u64) -> FieldValue {
    FieldValue::Integer(i64::try_from(value).unwrap_or(i64::MAX))
}

fn histogram_total(histogram: &std::collections::HashMap<String, u64>) -> u64 {
    histogram
        .values()
        .fold(0u64, |acc, value| acc.saturating_add(*value))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencySummary {
    pub min_ms: f64,
    pub max_ms: f64,
    pub average_ms: f64,
}

/// `None` when the report carries no samples.
pub fn latency_summary(latencies: &[u64]) -> Option<LatencySummary> {
    let min = *latencies.iter().min()?;
    let max = *latencies.iter().max()?;
    let sum: u128 = latencies.iter().map(|&ns| u128::from(ns)).sum();
    let mean = sum as f64 / latencies.len() as f64;

    Some(LatencySummary {
        min_ms: min as f64 / NANOS_PER_MILLI,
        max_ms: max as f64 / NANOS_PER_MILLI,
        average_ms: mean / NANOS_PER_MILLI,
    })
}

pub fn report_fields(report: &Report) -> BTreeMap<String, FieldValue> {
    let mut fields = BTreeMap::new();

    fields.insert("scenariosCreated".to_string(), count(report.scenarios_created));
    fields.insert(
        "scenariosCompleted".to_string(),
        count(report.scenarios_completed),
    );
    fields.insert(
        "requestsCompleted".to_string(),
        count(report.requests_completed),
    );
    fields.insert("rps".to_string(), count(report.rps.count));

    for code in TRACKED_CODES {
        let hits = report.codes.get(code).copied().unwrap_or(0);
        fields.insert(format!("codes_{}", code), count(hits));
    }

    fields.insert("errors".to_string(), count(histogram_total(&report.errors)));
    fields.insert("concurrency".to_string(), count(report.concurrency));

    // InfluxDB rejects NaN and infinities, so an empty sample set writes no latency fields.
    if let Some(summary) = latency_summary(&report.latencies) {
        fields.insert("min".to_string(), FieldValue::Float(summary.min_ms));
        fields.insert("max".to_string(), FieldValue::Float(summary.max_ms));
        fields.insert("average".to_string(), FieldValue::Float(summary.average_ms));
    }

    fields
}

pub fn build_point(report: &Report, tags: &BTreeMap<String, String>) -> DataPoint {
    DataPoint {
        measurement: MEASUREMENT.to_string(),
        tags: tags.clone(),
        fields: report_fields(report),
        timestamp: report.timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn histogram(entries: &[(&str, u64)]) -> HashMap<String, u64> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }

    #[test]
    fn test_latency_fields_are_converted_to_milliseconds() {
        let report = Report {
            latencies: vec![1_000_000, 2_000_000, 3_000_000],
            ..Default::default()
        };

        let fields = report_fields(&report);

        assert_eq!(fields["min"], FieldValue::Float(1.0));
        assert_eq!(fields["max"], FieldValue::Float(3.0));
        assert_eq!(fields["average"], FieldValue::Float(2.0));
    }

    #[test]
    fn test_fractional_average() {
        let summary = latency_summary(&[1_500_000, 2_000_000]).unwrap();
        assert_eq!(summary.min_ms, 1.5);
        assert_eq!(summary.max_ms, 2.0);
        assert_eq!(summary.average_ms, 1.75);
    }

    #[test]
    fn test_missing_status_codes_default_to_zero() {
        let report = Report {
            codes: histogram(&[("200", 5)]),
            ..Default::default()
        };

        let fields = report_fields(&report);

        assert_eq!(fields["codes_200"], FieldValue::Integer(5));
        for code in ["400", "404", "500", "502", "503"] {
            assert_eq!(
                fields[&format!("codes_{}", code)],
                FieldValue::Integer(0),
                "codes_{} should default to 0",
                code
            );
        }
    }

    #[test]
    fn test_untracked_status_codes_are_not_written() {
        let report = Report {
            codes: histogram(&[("201", 7), ("429", 2)]),
            ..Default::default()
        };

        let fields = report_fields(&report);

        assert!(!fields.contains_key("codes_201"));
        assert!(!fields.contains_key("codes_429"));
    }

    #[test]
    fn test_errors_are_summed() {
        let report = Report {
            errors: histogram(&[("ETIMEDOUT", 2), ("ECONNRESET", 3)]),
            ..Default::default()
        };

        assert_eq!(report_fields(&report)["errors"], FieldValue::Integer(5));
    }

    #[test]
    fn test_empty_latencies_omit_latency_fields() {
        let fields = report_fields(&Report::default());

        assert!(fields.get("min").is_none());
        assert!(fields.get("max").is_none());
        assert!(fields.get("average").is_none());
        assert_eq!(fields["errors"], FieldValue::Integer(0));
    }

    #[test]
    fn test_full_field_set() {
        let report = Report {
            scenarios_created: 10,
            scenarios_completed: 8,
            requests_completed: 40,
            concurrency: 2,
            rps: crate::domain::model::Rps {
                count: 40,
                mean: 4.0,
            },
            latencies: vec![5_000_000],
            ..Default::default()
        };

        let fields = report_fields(&report);
        let names: Vec<&str> = fields.keys().map(String::as_str).collect();

        assert_eq!(
            names,
            vec![
                "average",
                "codes_200",
                "codes_400",
                "codes_404",
                "codes_500",
                "codes_502",
                "codes_503",
                "concurrency",
                "errors",
                "max",
                "min",
                "requestsCompleted",
                "rps",
                "scenariosCompleted",
                "scenariosCreated",
            ]
        );
        assert_eq!(fields["rps"], FieldValue::Integer(40));
        assert_eq!(fields["scenariosCreated"], FieldValue::Integer(10));
        assert_eq!(fields["concurrency"], FieldValue::Integer(2));
    }

    #[test]
    fn test_counts_saturate() {
        let report = Report {
            requests_completed: u64::MAX,
            errors: histogram(&[("A", u64::MAX), ("B", 1)]),
            ..Default::default()
        };

        let fields = report_fields(&report);

        assert_eq!(fields["requestsCompleted"], FieldValue::Integer(i64::MAX));
        assert_eq!(fields["errors"], FieldValue::Integer(i64::MAX));
    }

    #[test]
    fn test_build_point_uses_fixed_measurement_and_tags() {
        let tags: BTreeMap<String, String> =
            [("env".to_string(), "staging".to_string())].into_iter().collect();
        let timestamp = "2024-03-01T12:00:00Z".parse().unwrap();
        let report = Report {
            timestamp: Some(timestamp),
            ..Default::default()
        };

        let point = build_point(&report, &tags);

        assert_eq!(point.measurement, MEASUREMENT);
        assert_eq!(point.tags["env"], "staging");
        assert_eq!(point.timestamp, Some(timestamp));
        assert_eq!(point.field("rps"), Some(&FieldValue::Integer(0)));
    }
}
