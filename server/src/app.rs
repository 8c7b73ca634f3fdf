//! Core application

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::api::{ApiServer, MetricsState};
use crate::core::banner;
use crate::core::cli::{self, CliConfig};
use crate::core::config::AppConfig;
use crate::core::constants::{APP_LOG_TARGET, ENV_LOG};
use crate::core::shutdown::ShutdownService;
use crate::data::smartthings::{OAuthToken, SmartThingsClient};
use crate::domain::metrics::{Exporter, MetricRegistry};

pub struct CoreApp {
    pub shutdown: ShutdownService,
    pub config: AppConfig,
    pub exporter: Arc<Exporter>,
    pub client: Arc<SmartThingsClient>,
}

impl CoreApp {
    /// Run the application with CLI argument parsing
    pub async fn run() -> Result<()> {
        dotenvy::dotenv().ok();
        Self::init_logging();

        tracing::debug!("Application starting");

        let (cli_config, command) = cli::parse();
        tracing::trace!(command = ?command, "Parsed command");

        // `start` is the only command and also the default
        let app = Self::init(&cli_config).await?;
        Self::start_server(app).await
    }

    async fn init(cli: &CliConfig) -> Result<Self> {
        let config = AppConfig::load(cli)?;

        let token = OAuthToken::load(&config.smartthings.token_file).with_context(|| {
            format!(
                "Failed to load OAuth token: {}",
                config.smartthings.token_file.display()
            )
        })?;
        if !token.is_valid() {
            anyhow::bail!(
                "OAuth token in {} is expired or empty, re-run the SmartApp authorization",
                config.smartthings.token_file.display()
            );
        }

        let client = SmartThingsClient::connect(&config.smartthings, &token)
            .await
            .context("Failed to discover SmartApp endpoint")?;
        tracing::debug!(endpoint = %client.endpoint(), "SmartApp endpoint selected");

        let exporter = Exporter::new(MetricRegistry::smartthings())
            .map_err(|e| anyhow::anyhow!("Failed to initialize exporter: {}", e))?;
        tracing::debug!(
            metrics = exporter.describe().len(),
            "Metric registry initialized"
        );

        Ok(Self {
            shutdown: ShutdownService::new(),
            config,
            exporter: Arc::new(exporter),
            client: Arc::new(client),
        })
    }

    fn init_logging() {
        let default_filter = format!("info,{}=info", APP_LOG_TARGET);

        let filter = std::env::var(ENV_LOG)
            .or_else(|_| std::env::var("RUST_LOG"))
            .unwrap_or(default_filter);

        tracing_subscriber::fmt()
            .with_target(false)
            .with_thread_ids(false)
            .with_level(true)
            .with_ansi(true)
            .compact()
            .with_env_filter(filter)
            .init();
    }

    async fn start_server(app: Self) -> Result<()> {
        // Install signal handlers FIRST (before any blocking calls)
        app.shutdown.install_signal_handlers();

        // Fail fast when the upstream cannot list devices at all
        let devices = match app.client.list_devices().await {
            Ok(devices) => devices,
            Err(e) if e.is_unavailable() => {
                return Err(anyhow::Error::new(e)
                    .context("SmartThings API unreachable while listing devices"));
            }
            Err(e) => return Err(anyhow::Error::new(e).context("Failed to list devices")),
        };

        let state = MetricsState {
            exporter: app.exporter.clone(),
            source: app.client.clone(),
            timeout: app.config.smartthings.timeout(),
        };
        let server = ApiServer::new(app.config.server.clone(), state, app.shutdown.clone())?;
        let listener = server.bind().await?;

        banner::print_banner(
            &app.config.server.host,
            app.config.server.port,
            &app.config.server.metrics_path,
            app.client.endpoint(),
            devices.len(),
        );

        let shutdown = app.shutdown.clone();
        let handle = tokio::spawn(async move {
            if let Err(e) = server.serve(listener).await {
                tracing::error!(error = %e, "HTTP server error");
                shutdown.trigger();
            }
        });
        app.shutdown.register(handle).await;

        app.shutdown.wait().await;
        app.shutdown.shutdown().await;

        Ok(())
    }
}
