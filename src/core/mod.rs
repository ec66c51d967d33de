pub mod events;
pub mod replay;
pub mod reporter;
pub mod stats_mapper;

pub use crate::domain::model::{DataPoint, FieldValue, Report, RunEvent};
pub use crate::domain::ports::{EventSource, EventStream, PointWriter};
pub use crate::utils::error::Result;
