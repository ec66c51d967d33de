pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::InfluxClient;
pub use config::{InfluxConfig, ReporterConfig, PLUGIN_NAME};
pub use crate::core::{
    events::{EventBus, Subscription},
    replay::{replay, RunLog},
    reporter::{ForwardSummary, InfluxDbReporter},
    stats_mapper::MEASUREMENT,
};
pub use domain::model::{DataPoint, FieldValue, Report, Rps, RunEvent};
pub use domain::ports::{EventSource, EventStream, PointWriter};
pub use utils::error::{ReporterError, Result};
