use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected status {status} from {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("No SmartApp endpoint registered for this token")]
    NoEndpoint,

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("OAuth token error: {0}")]
    Token(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

impl UpstreamError {
    pub fn token(msg: impl Into<String>) -> Self {
        Self::Token(msg.into())
    }

    /// Transport-level failures that the next scrape may recover from
    pub fn is_unavailable(&self) -> bool {
        match self {
            Self::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            Self::Status { status, .. } => status.is_server_error(),
            Self::Timeout(_) => true,
            Self::NoEndpoint | Self::Token(_) | Self::Io(_) | Self::Parse(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_unavailable() {
        assert!(UpstreamError::Timeout(Duration::from_secs(1)).is_unavailable());
        assert!(
            UpstreamError::Status {
                status: reqwest::StatusCode::BAD_GATEWAY,
                url: "http://st".to_string(),
            }
            .is_unavailable()
        );
        assert!(
            !UpstreamError::Status {
                status: reqwest::StatusCode::UNAUTHORIZED,
                url: "http://st".to_string(),
            }
            .is_unavailable()
        );
        assert!(!UpstreamError::NoEndpoint.is_unavailable());
        assert!(!UpstreamError::token("expired").is_unavailable());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            UpstreamError::token("expired").to_string(),
            "OAuth token error: expired"
        );
        assert_eq!(
            UpstreamError::Status {
                status: reqwest::StatusCode::UNAUTHORIZED,
                url: "http://st/all".to_string(),
            }
            .to_string(),
            "Unexpected status 401 Unauthorized from http://st/all"
        );
    }
}
