//! OAuth token file loading
//!
//! The token file is produced by the SmartThings OAuth registration flow and
//! holds a JSON-serialized token (`access_token`, `token_type`,
//! `refresh_token`, `expiry`).

use std::fs;
use std::path::Path;

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::Deserialize;

use super::error::UpstreamError;

/// Tokens this close to expiry are treated as expired
const EXPIRY_SKEW_SECS: i64 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct OAuthToken {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

impl OAuthToken {
    pub fn load(path: &Path) -> Result<Self, UpstreamError> {
        tracing::debug!(path = %path.display(), "Loading OAuth token");
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, UpstreamError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Non-empty access token that has not expired
    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }

    fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        if self.access_token.is_empty() {
            return false;
        }
        match self.expiry {
            // A zero timestamp (year 1) means the token never expires
            Some(expiry) if expiry.year() > 1 => {
                expiry - Duration::seconds(EXPIRY_SKEW_SECS) > now
            }
            _ => true,
        }
    }

    /// Value for the `Authorization` header
    pub fn authorization(&self) -> String {
        let kind = if self.token_type.eq_ignore_ascii_case("bearer") || self.token_type.is_empty()
        {
            "Bearer"
        } else {
            self.token_type.as_str()
        };
        format!("{} {}", kind, self.access_token)
    }
}
