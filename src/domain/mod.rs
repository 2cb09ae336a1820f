// Domain layer: entries, month ranges, findings, report descriptors and the ports
// the engine talks through.

pub mod finding;
pub mod model;
pub mod month_range;
pub mod ports;
pub mod report;
