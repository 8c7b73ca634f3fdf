//! Wire types for the SmartThings SmartApp API

use std::collections::HashMap;

use serde::Deserialize;

use crate::domain::metrics::{Device, RawValue};

/// Entry returned by the endpoints discovery call
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointInfo {
    pub uri: String,
    #[serde(default)]
    pub oauth_client: Option<OAuthClientInfo>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OAuthClientInfo {
    pub client_id: String,
}

/// Device as returned by `GET {endpoint}/all`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub attributes: HashMap<String, serde_json::Value>,
}

impl From<DeviceInfo> for Device {
    fn from(info: DeviceInfo) -> Self {
        let display_name = info
            .display_name
            .filter(|n| !n.is_empty())
            .or(info.name)
            .unwrap_or_default();
        Device {
            id: info.id,
            display_name,
            attributes: info
                .attributes
                .into_iter()
                .map(|(k, v)| (k, RawValue::from(v)))
                .collect(),
        }
    }
}

/// Pick the endpoint registered for `client_id`, or the first one
pub fn select_endpoint<'a>(endpoints: &'a [EndpointInfo], client_id: &str) -> Option<&'a str> {
    endpoints
        .iter()
        .find(|e| {
            e.oauth_client
                .as_ref()
                .is_some_and(|c| c.client_id == client_id)
        })
        .or_else(|| endpoints.first())
        .map(|e| e.uri.as_str())
}
