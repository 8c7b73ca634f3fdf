//! Attribute-to-metric translation
//!
//! Classifies raw device attributes against a static registry and turns the
//! recognised ones into labelled gauge samples.

mod collector;
mod mapper;
mod registry;
mod types;

pub use collector::{CollectionCounters, Exporter};
pub use mapper::{KWH_TO_JOULES, MapError, ValueMapper};
pub use registry::{DropSet, LABEL_NAMES, MetricRegistry, MetricSpec, NAMESPACE, Outcome};
pub use types::{Device, RawValue, Sample};
