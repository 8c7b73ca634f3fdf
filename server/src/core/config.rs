use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_API_URL, DEFAULT_HOST, DEFAULT_METRICS_PATH,
    DEFAULT_PORT, DEFAULT_TIMEOUT_SECS, ENV_OAUTH_CLIENT, ENV_TOKEN_FILE, HEALTH_PATH, INDEX_PATH,
};

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub metrics_path: Option<String>,
}

/// SmartThings configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SmartThingsFileConfig {
    pub oauth_client: Option<String>,
    pub token_file: Option<String>,
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// File-based configuration (JSON)
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub smartthings: Option<SmartThingsFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Unknown top-level fields (possible typos)
    fn unknown_fields(&self) -> Vec<&str> {
        match &self.extra {
            serde_json::Value::Object(map) => map.keys().map(|k| k.as_str()).collect(),
            _ => Vec::new(),
        }
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        let keys = self.unknown_fields();
        if !keys.is_empty() {
            tracing::warn!(
                fields = %keys.join(", "),
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
            if server.metrics_path.is_some() {
                tracing::trace!(metrics_path = ?server.metrics_path, "Merging server.metrics_path");
                current.metrics_path = server.metrics_path;
            }
        }

        if let Some(st) = other.smartthings {
            let current = self
                .smartthings
                .get_or_insert_with(SmartThingsFileConfig::default);
            if st.oauth_client.is_some() {
                tracing::trace!("Merging smartthings.oauth_client");
                current.oauth_client = st.oauth_client;
            }
            if st.token_file.is_some() {
                tracing::trace!(token_file = ?st.token_file, "Merging smartthings.token_file");
                current.token_file = st.token_file;
            }
            if st.api_url.is_some() {
                tracing::trace!(api_url = ?st.api_url, "Merging smartthings.api_url");
                current.api_url = st.api_url;
            }
            if st.timeout_secs.is_some() {
                tracing::trace!(timeout_secs = ?st.timeout_secs, "Merging smartthings.timeout_secs");
                current.timeout_secs = st.timeout_secs;
            }
        }
    }
}

// =============================================================================
// Runtime Config
// =============================================================================

/// HTTP server configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Path of the scrape endpoint
    pub metrics_path: String,
}

/// SmartThings upstream configuration (final/runtime)
#[derive(Debug, Clone)]
pub struct SmartThingsConfig {
    pub oauth_client: String,
    pub token_file: PathBuf,
    pub api_url: String,
    /// Bound for each upstream request, 0 is rejected by validation
    pub timeout_secs: u64,
}

impl SmartThingsConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Final merged application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub smartthings: SmartThingsConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.smartthings_exporter/smartthings_exporter.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        // 1. Load from profile dir - skip if not exists
        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        // 2. Load from CLI-specified path OR local directory
        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        Self::from_layers(cli, file_config)
    }

    /// Layer configs: defaults -> file config -> CLI/env overrides
    fn from_layers(cli: &CliConfig, file_config: FileConfig) -> Result<Self> {
        let file_server = file_config.server.unwrap_or_default();
        let file_st = file_config.smartthings.unwrap_or_default();

        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        let metrics_path = cli
            .metrics_path
            .clone()
            .or(file_server.metrics_path)
            .unwrap_or_else(|| DEFAULT_METRICS_PATH.to_string());

        let oauth_client = cli
            .oauth_client
            .clone()
            .or(file_st.oauth_client)
            .unwrap_or_default();

        let token_file = cli
            .token_file
            .as_ref()
            .map(|p| p.to_string_lossy().into_owned())
            .or(file_st.token_file)
            .filter(|p| !p.trim().is_empty())
            .map(|p| expand_path(&p))
            .unwrap_or_default();

        let api_url = cli
            .api_url
            .clone()
            .or(file_st.api_url)
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        let timeout_secs = cli
            .timeout_secs
            .or(file_st.timeout_secs)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let config = Self {
            server: ServerConfig {
                host,
                port,
                metrics_path,
            },
            smartthings: SmartThingsConfig {
                oauth_client,
                token_file,
                api_url,
                timeout_secs,
            },
        };

        config.validate()?;

        tracing::debug!(
            host = %config.server.host,
            port = config.server.port,
            metrics_path = %config.server.metrics_path,
            api_url = %config.smartthings.api_url,
            token_file = %config.smartthings.token_file.display(),
            timeout_secs = config.smartthings.timeout_secs,
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }

        // Port 0 would bind a random port that nobody scrapes
        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }

        check_metrics_path(&self.server.metrics_path)
            .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

        if self.smartthings.oauth_client.is_empty() {
            anyhow::bail!(
                "Configuration error: smartthings.oauth_client is required. \
                 Set via --oauth-client, {} env var or smartthings.oauth_client in config file.",
                ENV_OAUTH_CLIENT
            );
        }

        if self.smartthings.token_file.as_os_str().is_empty() {
            anyhow::bail!(
                "Configuration error: smartthings.token_file is required. \
                 Set via --token-file, {} env var or smartthings.token_file in config file.",
                ENV_TOKEN_FILE
            );
        }

        let api_url = &self.smartthings.api_url;
        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            anyhow::bail!(
                "Configuration error: smartthings.api_url must start with http:// or https://. Got: {}",
                api_url
            );
        }

        if self.smartthings.timeout_secs == 0 {
            anyhow::bail!("Configuration error: smartthings.timeout_secs must be greater than 0");
        }

        Ok(())
    }
}

/// Check that the scrape path is a plain absolute route that does not
/// collide with the landing page or the health check
pub fn check_metrics_path(path: &str) -> Result<()> {
    if !path.starts_with('/') {
        anyhow::bail!("server.metrics_path must start with '/' (got '{}')", path);
    }
    if path == INDEX_PATH || path == HEALTH_PATH {
        anyhow::bail!(
            "server.metrics_path must not be '{}', that route is already served",
            path
        );
    }
    if path.contains(['{', '}', '*']) {
        anyhow::bail!(
            "server.metrics_path must not contain route captures (got '{}')",
            path
        );
    }
    Ok(())
}

/// Get the profile config path (~/.smartthings_exporter/smartthings_exporter.json)
fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Check if host binds to all network interfaces
pub fn is_all_interfaces(host: &str) -> bool {
    matches!(host, "0.0.0.0" | "::" | "[::]")
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn required_cli() -> CliConfig {
        CliConfig {
            oauth_client: Some("client-id".to_string()),
            token_file: Some(PathBuf::from("/etc/smartthings/token.json")),
            ..Default::default()
        }
    }

    fn load_err(cli: CliConfig) -> String {
        AppConfig::from_layers(&cli, FileConfig::default())
            .unwrap_err()
            .to_string()
    }

    #[test]
    fn test_file_config_parse_full() {
        let json = r#"{
            "server": { "host": "127.0.0.1", "port": 9500, "metrics_path": "/probe" },
            "smartthings": {
                "oauth_client": "abc",
                "token_file": "/tmp/token.json",
                "api_url": "https://api.example.com",
                "timeout_secs": 3
            }
        }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();

        let server = config.server.as_ref().unwrap();
        assert_eq!(server.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(server.port, Some(9500));
        assert_eq!(server.metrics_path.as_deref(), Some("/probe"));

        let st = config.smartthings.as_ref().unwrap();
        assert_eq!(st.oauth_client.as_deref(), Some("abc"));
        assert_eq!(st.timeout_secs, Some(3));
        assert!(config.unknown_fields().is_empty());
    }

    #[test]
    fn test_file_config_parse_empty() {
        let config: FileConfig = serde_json::from_str("{}").unwrap();
        assert!(config.server.is_none());
        assert!(config.smartthings.is_none());
    }

    #[test]
    fn test_file_config_parse_extra_fields() {
        let json = r#"{ "server": { "port": 1 }, "smartthing": {}, "debug": true }"#;
        let config: FileConfig = serde_json::from_str(json).unwrap();
        let mut unknown = config.unknown_fields();
        unknown.sort();
        assert_eq!(unknown, vec!["debug", "smartthing"]);
    }

    #[test]
    fn test_file_config_merge() {
        let mut base: FileConfig = serde_json::from_str(
            r#"{
                "server": { "host": "10.0.0.1", "port": 9000 },
                "smartthings": { "oauth_client": "base", "timeout_secs": 5 }
            }"#,
        )
        .unwrap();
        let overlay: FileConfig = serde_json::from_str(
            r#"{
                "server": { "port": 9100 },
                "smartthings": { "oauth_client": "overlay" }
            }"#,
        )
        .unwrap();

        base.merge(overlay);

        let server = base.server.unwrap();
        assert_eq!(server.host.as_deref(), Some("10.0.0.1"));
        assert_eq!(server.port, Some(9100));
        let st = base.smartthings.unwrap();
        assert_eq!(st.oauth_client.as_deref(), Some("overlay"));
        assert_eq!(st.timeout_secs, Some(5));
    }

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::from_layers(&required_cli(), FileConfig::default()).unwrap();

        assert_eq!(config.server.host, DEFAULT_HOST);
        assert_eq!(config.server.port, DEFAULT_PORT);
        assert_eq!(config.server.metrics_path, DEFAULT_METRICS_PATH);
        assert_eq!(config.smartthings.api_url, DEFAULT_API_URL);
        assert_eq!(config.smartthings.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(
            config.smartthings.token_file,
            PathBuf::from("/etc/smartthings/token.json")
        );
    }

    #[test]
    fn test_app_config_cli_overrides_file() {
        let file: FileConfig = serde_json::from_str(
            r#"{
                "server": { "host": "10.0.0.1", "port": 9000 },
                "smartthings": { "api_url": "https://file.example.com/", "timeout_secs": 30 }
            }"#,
        )
        .unwrap();
        let cli = CliConfig {
            port: Some(9600),
            timeout_secs: Some(2),
            ..required_cli()
        };

        let config = AppConfig::from_layers(&cli, file).unwrap();

        assert_eq!(config.server.host, "10.0.0.1");
        assert_eq!(config.server.port, 9600);
        assert_eq!(config.smartthings.api_url, "https://file.example.com");
        assert_eq!(config.smartthings.timeout_secs, 2);
    }

    #[test]
    fn test_app_config_requires_oauth_client() {
        let cli = CliConfig {
            oauth_client: None,
            ..required_cli()
        };
        assert!(load_err(cli).contains("smartthings.oauth_client is required"));
    }

    #[test]
    fn test_app_config_requires_token_file() {
        let cli = CliConfig {
            token_file: None,
            ..required_cli()
        };
        assert!(load_err(cli).contains("smartthings.token_file is required"));
    }

    #[test]
    fn test_app_config_validation_port_zero() {
        let cli = CliConfig {
            port: Some(0),
            ..required_cli()
        };
        assert!(load_err(cli).contains("server.port must be greater than 0"));
    }

    #[test]
    fn test_app_config_validation_empty_host() {
        let cli = CliConfig {
            host: Some(String::new()),
            ..required_cli()
        };
        assert!(load_err(cli).contains("server.host must not be empty"));
    }

    #[test]
    fn test_app_config_validation_metrics_path() {
        for path in ["metrics", "/", "/health", "/{device}", "/*rest"] {
            let cli = CliConfig {
                metrics_path: Some(path.to_string()),
                ..required_cli()
            };
            let err = load_err(cli);
            assert!(err.contains("Configuration error: server.metrics_path"), "{path}: {err}");
        }
    }

    #[test]
    fn test_app_config_metrics_path_accepts_nested_route() {
        let cli = CliConfig {
            metrics_path: Some("/probe/metrics".to_string()),
            ..required_cli()
        };
        let config = AppConfig::from_layers(&cli, FileConfig::default()).unwrap();
        assert_eq!(config.server.metrics_path, "/probe/metrics");
    }

    #[test]
    fn test_check_metrics_path_health_collision() {
        let err = check_metrics_path("/health").unwrap_err().to_string();
        assert!(err.contains("already served"));
        assert!(check_metrics_path("/metrics").is_ok());
    }

    #[test]
    fn test_app_config_validation_api_url() {
        let cli = CliConfig {
            api_url: Some("graph.api.smartthings.com".to_string()),
            ..required_cli()
        };
        assert!(load_err(cli).contains("smartthings.api_url must start with"));
    }

    #[test]
    fn test_app_config_validation_timeout_zero() {
        let cli = CliConfig {
            timeout_secs: Some(0),
            ..required_cli()
        };
        assert!(load_err(cli).contains("timeout_secs must be greater than 0"));
    }

    #[test]
    fn test_app_config_load_from_config_file() {
        let json = r#"{
            "server": { "port": 9700 },
            "smartthings": { "oauth_client": "from-file", "token_file": "/tmp/st-token.json" }
        }"#;
        let mut temp_file = tempfile::NamedTempFile::new().unwrap();
        temp_file.write_all(json.as_bytes()).unwrap();

        let cli = CliConfig {
            config: Some(temp_file.path().to_path_buf()),
            ..Default::default()
        };

        let config = AppConfig::load(&cli).unwrap();
        assert_eq!(config.server.port, 9700);
        assert_eq!(config.smartthings.oauth_client, "from-file");
        assert_eq!(config.smartthings.token_file, PathBuf::from("/tmp/st-token.json"));
    }

    #[test]
    fn test_app_config_missing_config_file() {
        let cli = CliConfig {
            config: Some(PathBuf::from("/nonexistent/smartthings_exporter.json")),
            ..required_cli()
        };
        let err = AppConfig::load(&cli).unwrap_err().to_string();
        assert!(err.contains("Config file not found"));
    }

    #[test]
    fn test_is_all_interfaces() {
        assert!(is_all_interfaces("0.0.0.0"));
        assert!(is_all_interfaces("::"));
        assert!(is_all_interfaces("[::]"));

        assert!(!is_all_interfaces("127.0.0.1"));
        assert!(!is_all_interfaces("localhost"));
        assert!(!is_all_interfaces("::1"));
    }
}
