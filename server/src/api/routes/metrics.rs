//! Scrape endpoint

use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};

use crate::api::exposition;
use crate::data::traits::DeviceSource;
use crate::domain::metrics::Exporter;

#[derive(Clone)]
pub struct MetricsState {
    pub exporter: Arc<Exporter>,
    pub source: Arc<dyn DeviceSource>,
    /// Bound for listing devices during one scrape
    pub timeout: Duration,
}

/// Run one collection and expose it. Upstream failures still answer 200
/// with the counters, only a rendering failure is a 500.
pub async fn metrics(State(state): State<MetricsState>) -> Response {
    let samples = state
        .exporter
        .scrape(state.source.as_ref(), state.timeout)
        .await;
    tracing::debug!(samples = samples.len(), "Scrape collected");

    match exposition::render(&state.exporter, &samples) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, exposition::content_type())],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("failed to render metrics: {}", e),
            )
                .into_response()
        }
    }
}
