//! Data layer: upstream device API access

pub mod smartthings;
pub mod traits;

pub use smartthings::{OAuthToken, SmartThingsClient, UpstreamError};
pub use traits::DeviceSource;
