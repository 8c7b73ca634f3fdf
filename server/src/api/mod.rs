//! API server and routes

pub mod exposition;
pub mod routes;
mod server;

pub use routes::metrics::MetricsState;
pub use server::ApiServer;
