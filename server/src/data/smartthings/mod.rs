//! SmartThings upstream: OAuth token, endpoint discovery and device listing

mod client;
mod error;
mod token;
mod types;

pub use client::SmartThingsClient;
pub use error::UpstreamError;
pub use token::OAuthToken;
pub use types::{DeviceInfo, EndpointInfo, OAuthClientInfo, select_endpoint};
