use crate::adapters::InfluxClient;
use crate::config::ReporterConfig;
use crate::core::stats_mapper::{build_point, MEASUREMENT};
use crate::domain::model::{Report, RunEvent};
use crate::domain::ports::{EventSource, EventStream, PointWriter};
use crate::utils::error::{ReporterError, Result};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ForwardSummary {
    pub written: u64,
    pub failed: u64,
}

#[derive(Debug, Default)]
struct Counters {
    written: AtomicU64,
    failed: AtomicU64,
}

#[derive(Clone)]
struct Forwarder {
    writer: Arc<dyn PointWriter>,
    tags: Arc<BTreeMap<String, String>>,
    counters: Arc<Counters>,
}

impl Forwarder {
    async fn send_stats(&self, report: &Report) -> Result<()> {
        let point = build_point(report, &self.tags);
        let result = self.writer.write_points(std::slice::from_ref(&point)).await;

        match &result {
            Ok(()) => self.counters.written.fetch_add(1, Ordering::Relaxed),
            Err(_) => self.counters.failed.fetch_add(1, Ordering::Relaxed),
        };
        result
    }

    async fn listen(self, mut subscription: Box<dyn EventStream>) {
        while let Some(event) = subscription.next().await {
            let RunEvent::Stats(report) = event else {
                continue;
            };

            match self.send_stats(&report).await {
                Ok(()) => tracing::debug!(
                    "Forwarded stats ({} requests completed)",
                    report.requests_completed
                ),
                Err(e) => tracing::error!(
                    "❌ Failed to write stats to InfluxDB: {} (Category: {:?})",
                    e,
                    e.category()
                ),
            }
        }
        tracing::debug!("Stats source closed, listener stopping");
    }

    fn summary(&self) -> ForwardSummary {
        ForwardSummary {
            written: self.counters.written.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }
}

/// Forwards every `stats` event of a run to InfluxDB as one data point.
///
/// The subscription lives as long as the reporter: dropping it stops the
/// listener. Construction spawns the listener, so it must happen inside a
/// Tokio runtime.
pub struct InfluxDbReporter {
    forwarder: Forwarder,
    listener: Option<JoinHandle<()>>,
}

impl InfluxDbReporter {
    pub fn new(config: &ReporterConfig, events: &dyn EventSource) -> Result<Self> {
        config.validate_config()?;
        let plugin = config.plugin()?;

        let client = InfluxClient::new(&plugin.influx)?;
        tracing::info!(
            "📡 Reporting '{}' to {}",
            MEASUREMENT,
            client.redacted_url()
        );

        Ok(Self::start(plugin.tags, Arc::new(client), events))
    }

    /// Same as [`InfluxDbReporter::new`] but writes through the given writer.
    pub fn with_writer(
        config: &ReporterConfig,
        events: &dyn EventSource,
        writer: Arc<dyn PointWriter>,
    ) -> Result<Self> {
        let plugin = config.plugin()?;
        Ok(Self::start(plugin.tags, writer, events))
    }

    fn start(
        tags: BTreeMap<String, String>,
        writer: Arc<dyn PointWriter>,
        events: &dyn EventSource,
    ) -> Self {
        let forwarder = Forwarder {
            writer,
            tags: Arc::new(tags),
            counters: Arc::default(),
        };

        let subscription = events.subscribe(RunEvent::STATS);
        let listener = tokio::spawn(forwarder.clone().listen(subscription));

        Self {
            forwarder,
            listener: Some(listener),
        }
    }

    pub async fn send_stats(&self, report: &Report) -> Result<()> {
        self.forwarder.send_stats(report).await
    }

    pub fn summary(&self) -> ForwardSummary {
        self.forwarder.summary()
    }

    /// Waits until the event source closes and every pending event is written.
    pub async fn join(mut self) -> Result<ForwardSummary> {
        if let Some(listener) = self.listener.take() {
            listener.await.map_err(|e| ReporterError::ProcessingError {
                message: format!("stats listener stopped abnormally: {}", e),
            })?;
        }
        Ok(self.summary())
    }
}

impl Drop for InfluxDbReporter {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
    }
}
