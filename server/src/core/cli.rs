use clap::{Parser, Subcommand};

use std::path::PathBuf;

use super::constants::{
    ENV_API_URL, ENV_CONFIG, ENV_HOST, ENV_METRICS_PATH, ENV_OAUTH_CLIENT, ENV_PORT,
    ENV_TIMEOUT_SECS, ENV_TOKEN_FILE,
};

#[derive(Parser)]
#[command(name = "smartthings_exporter")]
#[command(version, about = "SmartThings exporter for Prometheus", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Address to listen on for the web interface and telemetry
    #[arg(long, short = 'H', global = true, env = ENV_HOST)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(long, short = 'p', global = true, env = ENV_PORT)]
    pub port: Option<u16>,

    /// Path under which to expose metrics
    #[arg(long, global = true, env = ENV_METRICS_PATH)]
    pub metrics_path: Option<String>,

    /// Path to config file
    #[arg(long, short = 'c', global = true, env = ENV_CONFIG)]
    pub config: Option<PathBuf>,

    /// SmartThings OAuth client ID
    #[arg(long, global = true, env = ENV_OAUTH_CLIENT)]
    pub oauth_client: Option<String>,

    /// File containing the SmartThings OAuth token
    #[arg(long, global = true, env = ENV_TOKEN_FILE)]
    pub token_file: Option<PathBuf>,

    /// SmartThings API base URL
    #[arg(long, global = true, env = ENV_API_URL)]
    pub api_url: Option<String>,

    /// Timeout in seconds for each SmartThings API request
    #[arg(long, global = true, env = ENV_TIMEOUT_SECS)]
    pub timeout_secs: Option<u64>,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Start the exporter (default command)
    Start,
}

/// Configuration derived from CLI arguments
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub metrics_path: Option<String>,
    pub config: Option<PathBuf>,
    pub oauth_client: Option<String>,
    pub token_file: Option<PathBuf>,
    pub api_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl From<Cli> for CliConfig {
    fn from(cli: Cli) -> Self {
        Self {
            host: cli.host,
            port: cli.port,
            metrics_path: cli.metrics_path,
            config: cli.config,
            oauth_client: cli.oauth_client,
            token_file: cli.token_file,
            api_url: cli.api_url,
            timeout_secs: cli.timeout_secs,
        }
    }
}

/// Parse CLI arguments and return config with command
pub fn parse() -> (CliConfig, Option<Commands>) {
    let mut cli = Cli::parse();
    let command = cli.command.take();
    (cli.into(), command)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_start_with_flags() {
        let cli = Cli::try_parse_from([
            "smartthings_exporter",
            "start",
            "--port",
            "9500",
            "--oauth-client",
            "abc",
            "--token-file",
            "/tmp/token.json",
            "--metrics-path",
            "/probe",
        ])
        .unwrap();

        assert!(matches!(cli.command, Some(Commands::Start)));
        let config = CliConfig::from(cli);
        assert_eq!(config.port, Some(9500));
        assert_eq!(config.oauth_client.as_deref(), Some("abc"));
        assert_eq!(config.token_file, Some(PathBuf::from("/tmp/token.json")));
        assert_eq!(config.metrics_path.as_deref(), Some("/probe"));
    }

    #[test]
    fn test_parse_without_subcommand() {
        let cli = Cli::try_parse_from(["smartthings_exporter", "-H", "127.0.0.1"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.host.as_deref(), Some("127.0.0.1"));
    }

    #[test]
    fn test_parse_rejects_bad_port() {
        assert!(Cli::try_parse_from(["smartthings_exporter", "--port", "nope"]).is_err());
    }
}
