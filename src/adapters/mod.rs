// Adapters layer: concrete implementations for external systems.

pub mod influx;
pub mod line_protocol;

pub use influx::InfluxClient;
