// =============================================================================
// Application Identity
// =============================================================================

/// Application name (for display, paths and identifiers)
pub const APP_NAME: &str = "smartthings_exporter";

/// Crate name used as the default log target
pub const APP_LOG_TARGET: &str = "smartthings_exporter_server";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".smartthings_exporter";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "smartthings_exporter.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "SMARTTHINGS_EXPORTER_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "SMARTTHINGS_EXPORTER_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "SMARTTHINGS_EXPORTER_PORT";

/// Environment variable for the metrics path
pub const ENV_METRICS_PATH: &str = "SMARTTHINGS_EXPORTER_METRICS_PATH";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "SMARTTHINGS_EXPORTER_LOG";

// =============================================================================
// Environment Variables - SmartThings
// =============================================================================

/// Environment variable for the OAuth client ID
pub const ENV_OAUTH_CLIENT: &str = "SMARTTHINGS_OAUTH_CLIENT";

/// Environment variable for the OAuth token file
pub const ENV_TOKEN_FILE: &str = "SMARTTHINGS_TOKEN_FILE";

/// Environment variable for the SmartThings API base URL
pub const ENV_API_URL: &str = "SMARTTHINGS_API_URL";

/// Environment variable for the upstream request timeout
pub const ENV_TIMEOUT_SECS: &str = "SMARTTHINGS_TIMEOUT_SECS";

// =============================================================================
// Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_PORT: u16 = 9499;

/// Default path for the scrape endpoint
pub const DEFAULT_METRICS_PATH: &str = "/metrics";

/// Landing page route
pub const INDEX_PATH: &str = "/";

/// Health check route
pub const HEALTH_PATH: &str = "/health";

/// Default SmartThings API base URL
pub const DEFAULT_API_URL: &str = "https://graph.api.smartthings.com";

/// Default upstream request timeout
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// Shutdown
// =============================================================================

/// Timeout for in-flight requests during graceful shutdown
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 10;
