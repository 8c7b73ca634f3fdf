//! Upstream traits
//!
//! The collector only needs a way to list devices; the SmartThings client is
//! one implementation, tests provide in-memory ones.

use async_trait::async_trait;

use crate::data::smartthings::UpstreamError;
use crate::domain::metrics::Device;

/// Source of device snapshots for a collection cycle
#[async_trait]
pub trait DeviceSource: Send + Sync {
    /// List every device with its current attributes
    async fn list_devices(&self) -> Result<Vec<Device>, UpstreamError>;
}
