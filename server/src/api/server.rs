//! API server initialization

use std::net::SocketAddr;

use anyhow::Result;
use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use super::routes::metrics::MetricsState;
use super::routes::{health, index, metrics};
use crate::core::config::{ServerConfig, check_metrics_path};
use crate::core::constants::{HEALTH_PATH, INDEX_PATH};
use crate::core::shutdown::ShutdownService;

pub struct ApiServer {
    config: ServerConfig,
    router: Router,
    shutdown: ShutdownService,
}

impl ApiServer {
    /// Build the routes up front so a bad scrape path is a startup error
    pub fn new(
        config: ServerConfig,
        state: MetricsState,
        shutdown: ShutdownService,
    ) -> Result<Self> {
        check_metrics_path(&config.metrics_path)?;

        let scrape_routes = Router::new()
            .route(&config.metrics_path, get(metrics::metrics))
            .with_state(state);

        let index_routes = Router::new()
            .route(INDEX_PATH, get(index::index))
            .with_state(index::landing_page(&config.metrics_path));

        let router = Router::new()
            .route(HEALTH_PATH, get(health::health))
            .merge(index_routes)
            .merge(scrape_routes)
            .layer(TraceLayer::new_for_http());

        Ok(Self {
            config,
            router,
            shutdown,
        })
    }

    /// Routes: landing page, health check and the scrape endpoint
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Bind the configured address so bind errors surface before serving
    pub async fn bind(&self) -> Result<TcpListener> {
        let addr = SocketAddr::new(self.config.host.parse()?, self.config.port);
        let listener = TcpListener::bind(addr).await?;
        tracing::debug!(%addr, path = %self.config.metrics_path, "Listening");
        Ok(listener)
    }

    /// Serve until the shutdown signal fires
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        axum::serve(
            listener,
            self.router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(self.shutdown.wait())
        .await?;

        tracing::debug!("HTTP server stopped");
        Ok(())
    }
}
