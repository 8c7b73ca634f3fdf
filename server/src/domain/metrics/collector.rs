//! Collection cycle
//!
//! Runs every attribute of every device through the registry, counts the
//! attributes that were dropped, unknown or invalid, and yields one sample per
//! successful conversion. No state is kept between cycles besides the counters.

use std::time::Duration;

use prometheus::{IntCounter, Opts};

use super::registry::{MetricRegistry, MetricSpec, NAMESPACE, Outcome};
use super::types::{Device, RawValue, Sample};
use crate::data::traits::DeviceSource;

/// Process-lifetime counters for attributes that did not become samples
#[derive(Clone)]
pub struct CollectionCounters {
    pub invalid: IntCounter,
    pub unknown: IntCounter,
    pub dropped: IntCounter,
}

impl CollectionCounters {
    pub fn new() -> prometheus::Result<Self> {
        Ok(Self {
            invalid: counter("invalid_metric", "Total number of metrics that were invalid.")?,
            unknown: counter(
                "unknown_metric",
                "Total number of metrics that exporter didn't know.",
            )?,
            dropped: counter(
                "dropped_metric",
                "Total number of metrics that exporter purposely dropped.",
            )?,
        })
    }

    /// Register all three counters with an exposition registry
    pub fn register(&self, registry: &prometheus::Registry) -> prometheus::Result<()> {
        registry.register(Box::new(self.invalid.clone()))?;
        registry.register(Box::new(self.unknown.clone()))?;
        registry.register(Box::new(self.dropped.clone()))?;
        Ok(())
    }
}

fn counter(name: &str, help: &str) -> prometheus::Result<IntCounter> {
    IntCounter::with_opts(Opts::new(name, help).namespace(NAMESPACE))
}

/// Owns the immutable registry and the counters for one exporter instance
pub struct Exporter {
    registry: MetricRegistry,
    counters: CollectionCounters,
}

impl Exporter {
    pub fn new(registry: MetricRegistry) -> prometheus::Result<Self> {
        Ok(Self {
            registry,
            counters: CollectionCounters::new()?,
        })
    }

    /// All metric families this exporter can ever emit
    pub fn describe(&self) -> Vec<&MetricSpec> {
        self.registry.describe()
    }

    pub fn counters(&self) -> &CollectionCounters {
        &self.counters
    }

    /// Classify every attribute of every device.
    ///
    /// The iterator is lazy: counters are updated as it is driven, so callers
    /// must exhaust it to account for the whole snapshot.
    pub fn collect<'a>(&'a self, devices: &'a [Device]) -> impl Iterator<Item = Sample> + 'a {
        devices.iter().flat_map(move |device| {
            tracing::debug!(
                device_id = %device.id,
                device = %device.display_name,
                attributes = device.attributes.len(),
                "Fetching attributes"
            );
            device
                .attributes
                .iter()
                .filter_map(move |(name, raw)| self.observe(device, name, raw))
        })
    }

    fn observe(&self, device: &Device, name: &str, raw: &RawValue) -> Option<Sample> {
        match self.registry.classify(name, raw) {
            Outcome::Dropped => {
                self.counters.dropped.inc();
                tracing::debug!(attribute = %name, value = %raw, "Attribute dropped");
                None
            }
            Outcome::Unknown => {
                self.counters.unknown.inc();
                tracing::debug!(attribute = %name, value = %raw, "Attribute unknown");
                None
            }
            Outcome::Invalid(e) => {
                self.counters.invalid.inc();
                tracing::error!(
                    device = %device.display_name,
                    attribute = %name,
                    value = %raw,
                    error = %e,
                    "Invalid attribute value"
                );
                None
            }
            Outcome::Converted { metric, value } => {
                tracing::debug!(attribute = %name, value, metric = %metric.name, "Attribute converted");
                Some(Sample {
                    metric: metric.name.clone(),
                    device_id: device.id.clone(),
                    device_name: device.display_name.clone(),
                    value,
                })
            }
        }
    }

    /// One full scrape: list devices (bounded by `timeout`) and collect them.
    ///
    /// A failed or timed-out listing is logged once and yields no samples.
    pub async fn scrape(&self, source: &dyn DeviceSource, timeout: Duration) -> Vec<Sample> {
        let devices = match tokio::time::timeout(timeout, source.list_devices()).await {
            Ok(Ok(devices)) => devices,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "Error reading list of devices");
                return Vec::new();
            }
            Err(_) => {
                tracing::error!(
                    timeout_secs = timeout.as_secs_f64(),
                    "Timed out reading list of devices"
                );
                return Vec::new();
            }
        };

        self.collect(&devices).collect()
    }
}
