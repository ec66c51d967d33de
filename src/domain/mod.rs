// Domain layer: report and point models plus the ports the reporter talks through.

pub mod model;
pub mod ports;
