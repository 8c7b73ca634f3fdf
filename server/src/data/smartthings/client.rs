//! SmartThings SmartApp HTTP client

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;

use super::error::UpstreamError;
use super::token::OAuthToken;
use super::types::{DeviceInfo, EndpointInfo, select_endpoint};
use crate::core::config::SmartThingsConfig;
use crate::data::traits::DeviceSource;
use crate::domain::metrics::Device;

const ENDPOINTS_PATH: &str = "/api/smartapps/endpoints";
const ALL_DEVICES_PATH: &str = "/all";

pub struct SmartThingsClient {
    http: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl SmartThingsClient {
    /// Build an authenticated client and discover the SmartApp endpoint
    pub async fn connect(
        config: &SmartThingsConfig,
        token: &OAuthToken,
    ) -> Result<Self, UpstreamError> {
        let timeout = config.timeout();
        let http = build_http_client(token, timeout)?;

        let url = format!(
            "{}{}?client_id={}",
            config.api_url.trim_end_matches('/'),
            ENDPOINTS_PATH,
            config.oauth_client
        );
        let endpoints: Vec<EndpointInfo> = get_json(&http, &url, timeout).await?;
        tracing::debug!(count = endpoints.len(), "Discovered SmartApp endpoints");

        let endpoint = select_endpoint(&endpoints, &config.oauth_client)
            .ok_or(UpstreamError::NoEndpoint)?
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            http,
            endpoint,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn list_devices(&self) -> Result<Vec<Device>, UpstreamError> {
        let url = format!("{}{}", self.endpoint, ALL_DEVICES_PATH);
        let devices: Vec<DeviceInfo> = get_json(&self.http, &url, self.timeout).await?;
        tracing::debug!(count = devices.len(), "Fetched devices");
        Ok(devices.into_iter().map(Device::from).collect())
    }
}

#[async_trait]
impl DeviceSource for SmartThingsClient {
    async fn list_devices(&self) -> Result<Vec<Device>, UpstreamError> {
        SmartThingsClient::list_devices(self).await
    }
}

fn build_http_client(token: &OAuthToken, timeout: Duration) -> Result<reqwest::Client, UpstreamError> {
    let mut auth = HeaderValue::from_str(&token.authorization())
        .map_err(|e| UpstreamError::token(format!("invalid access token: {}", e)))?;
    auth.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth);

    Ok(reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(format!("smartthings_exporter/{}", env!("CARGO_PKG_VERSION")))
        .default_headers(headers)
        .build()?)
}

async fn get_json<T: DeserializeOwned>(
    http: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<T, UpstreamError> {
    tracing::trace!(url, "GET");
    let response = http.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            UpstreamError::Timeout(timeout)
        } else {
            UpstreamError::Http(e)
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(UpstreamError::Status {
            status,
            url: url.to_string(),
        });
    }

    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
