use crate::domain::model::{DataPoint, RunEvent};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Sink for data points. One call is one outbound write.
#[async_trait]
pub trait PointWriter: Send + Sync {
    async fn write_points(&self, points: &[DataPoint]) -> Result<()>;
}

/// Events of one name, in emission order. `None` once the source is gone.
#[async_trait]
pub trait EventStream: Send {
    async fn next(&mut self) -> Option<RunEvent>;
}

pub trait EventSource: Send + Sync {
    fn subscribe(&self, event_name: &str) -> Box<dyn EventStream>;
}
