use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Periodic statistics snapshot emitted by the load-test engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Report {
    pub timestamp: Option<DateTime<Utc>>,
    pub scenarios_created: u64,
    pub scenarios_completed: u64,
    pub requests_completed: u64,
    pub concurrency: u64,
    pub rps: Rps,
    /// Raw latency samples in nanoseconds. Accepts bare numbers or
    /// `[timestamp, request_id, delta_ns, status_code]` entries.
    #[serde(deserialize_with = "deserialize_latencies")]
    pub latencies: Vec<u64>,
    /// Status code histogram, keyed by the code as text ("200").
    pub codes: HashMap<String, u64>,
    /// Error histogram, keyed by error code ("ETIMEDOUT").
    pub errors: HashMap<String, u64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LatencySample {
    Nanos(u64),
    Entry(Vec<serde_json::Value>),
}

const ENTRY_DELTA_INDEX: usize = 2;

fn deserialize_latencies<'de, D>(deserializer: D) -> Result<Vec<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<LatencySample>::deserialize(deserializer)?
        .into_iter()
        .map(|sample| match sample {
            LatencySample::Nanos(ns) => Ok(ns),
            LatencySample::Entry(entry) => entry
                .get(ENTRY_DELTA_INDEX)
                .and_then(|delta| {
                    delta.as_u64().or_else(|| {
                        delta
                            .as_f64()
                            .filter(|ns| ns.is_finite() && *ns >= 0.0)
                            .map(|ns| ns.round() as u64)
                    })
                })
                .ok_or_else(|| {
                    D::Error::custom(format!(
                        "latency entry has no nanosecond delta at index {}",
                        ENTRY_DELTA_INDEX
                    ))
                }),
        })
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rps {
    pub count: u64,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    Stats(Arc<Report>),
    Done(Arc<Report>),
}

impl RunEvent {
    pub const STATS: &'static str = "stats";
    pub const DONE: &'static str = "done";

    pub fn name(&self) -> &'static str {
        match self {
            RunEvent::Stats(_) => Self::STATS,
            RunEvent::Done(_) => Self::DONE,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Float(f64),
    Integer(i64),
    Boolean(bool),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DataPoint {
    pub measurement: String,
    pub tags: BTreeMap<String, String>,
    pub fields: BTreeMap<String, FieldValue>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl DataPoint {
    pub fn new(measurement: impl Into<String>) -> Self {
        Self {
            measurement: measurement.into(),
            tags: BTreeMap::new(),
            fields: BTreeMap::new(),
            timestamp: None,
        }
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}
