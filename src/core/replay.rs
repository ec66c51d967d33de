use crate::core::events::EventBus;
use crate::domain::model::{Report, RunEvent};
use crate::utils::error::{ReporterError, Result};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// A recorded run: the periodic reports plus the final aggregate, if any.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RunLog {
    #[serde(default)]
    pub aggregate: Option<Report>,
    #[serde(default)]
    pub intermediate: Vec<Report>,
}

impl RunLog {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Self::from_json_str(&content)
    }

    /// Accepts the JSON output document (`aggregate` + `intermediate`), a JSON
    /// array of reports, a single report, or one report per line.
    pub fn from_json_str(content: &str) -> Result<Self> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(ReporterError::ProcessingError {
                message: "run log is empty".to_string(),
            });
        }

        if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
            let is_document = value
                .as_object()
                .is_some_and(|obj| obj.contains_key("intermediate") || obj.contains_key("aggregate"));
            if is_document {
                return Ok(serde_json::from_value(value)?);
            }
            if value.is_array() {
                return Ok(Self {
                    aggregate: None,
                    intermediate: serde_json::from_value(value)?,
                });
            }
            if value.is_object() {
                let report: Report = serde_json::from_value(value)?;
                return Ok(Self {
                    aggregate: None,
                    intermediate: vec![report],
                });
            }
        }

        let mut intermediate = Vec::new();
        for (index, line) in trimmed.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let report: Report =
                serde_json::from_str(line).map_err(|e| ReporterError::ProcessingError {
                    message: format!("line {}: {}", index + 1, e),
                })?;
            intermediate.push(report);
        }

        Ok(Self {
            aggregate: None,
            intermediate,
        })
    }

    pub fn len(&self) -> usize {
        self.intermediate.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intermediate.is_empty()
    }
}

/// Emits one `stats` event per periodic report, then `done` with the aggregate.
/// Each emit waits for queue space, so a slow reporter paces the replay.
/// Returns the number of `stats` events emitted.
pub async fn replay(run: &RunLog, bus: &EventBus, interval: Option<Duration>) -> usize {
    let mut emitted = 0;

    for (index, report) in run.intermediate.iter().enumerate() {
        if index > 0 {
            if let Some(delay) = interval {
                tokio::time::sleep(delay).await;
            }
        }
        bus.emit(RunEvent::Stats(Arc::new(report.clone()))).await;
        emitted += 1;
    }

    if let Some(aggregate) = &run.aggregate {
        bus.emit(RunEvent::Done(Arc::new(aggregate.clone()))).await;
    }

    tracing::info!("🔁 Replayed {} stats report(s)", emitted);
    emitted
}
