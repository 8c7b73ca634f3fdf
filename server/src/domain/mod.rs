pub mod metrics;

pub use metrics::{Exporter, MetricRegistry};
