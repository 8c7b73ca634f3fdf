//! Centralized shutdown management

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;

use super::constants::SHUTDOWN_TIMEOUT_SECS;

/// Centralized shutdown service for coordinating graceful shutdown
#[derive(Clone)]
pub struct ShutdownService {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
    handles: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl Default for ShutdownService {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownService {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
            handles: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Register a task handle to be awaited during shutdown
    pub async fn register(&self, handle: JoinHandle<()>) {
        self.handles.lock().await.push(handle);
    }

    /// Subscribe to shutdown signal
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.rx.clone()
    }

    /// Trigger shutdown
    pub fn trigger(&self) {
        let _ = self.tx.send(true);
    }

    /// Check if shutdown was triggered
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Trigger shutdown and wait for registered tasks, bounded by
    /// `SHUTDOWN_TIMEOUT_SECS`
    pub async fn shutdown(&self) {
        tracing::debug!("Initiating graceful shutdown...");
        self.trigger();

        let handles = std::mem::take(&mut *self.handles.lock().await);
        tracing::debug!(count = handles.len(), "Waiting for tasks to finish...");

        let timeout = Duration::from_secs(SHUTDOWN_TIMEOUT_SECS);
        let drain = async {
            for handle in handles {
                if let Err(e) = handle.await {
                    tracing::warn!(error = %e, "Task ended abnormally during shutdown");
                }
            }
        };

        match tokio::time::timeout(timeout, drain).await {
            Ok(()) => tracing::debug!("All tasks completed"),
            Err(_) => tracing::warn!(
                timeout_secs = timeout.as_secs(),
                "Timeout waiting for tasks"
            ),
        }

        tracing::debug!("Shutdown complete");
    }

    /// Wait for shutdown signal (for use with axum graceful shutdown)
    /// Returns an owned future that can be passed to graceful_shutdown
    pub fn wait(&self) -> impl std::future::Future<Output = ()> + Send + 'static {
        let mut rx = self.rx.clone();
        async move {
            let _ = rx.wait_for(|&v| v).await;
        }
    }

    /// Install OS signal handlers and auto-trigger on Ctrl+C/SIGTERM
    pub fn install_signal_handlers(&self) {
        let service = self.clone();
        tokio::spawn(async move {
            let ctrl_c = async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!(error = %e, "Failed to install Ctrl+C handler");
                    std::future::pending::<()>().await;
                }
            };

            #[cfg(unix)]
            let terminate = async {
                match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                    Ok(mut signal) => {
                        signal.recv().await;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to install SIGTERM handler");
                        std::future::pending::<()>().await;
                    }
                }
            };

            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                _ = ctrl_c => tracing::debug!("Received Ctrl+C, shutting down"),
                _ = terminate => tracing::debug!("Received SIGTERM, shutting down"),
            }

            service.trigger();
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    #[tokio::test]
    async fn test_shutdown_not_triggered_initially() {
        let shutdown = ShutdownService::new();
        assert!(!shutdown.is_triggered());
    }

    #[tokio::test]
    async fn test_shutdown_trigger() {
        let shutdown = ShutdownService::new();
        shutdown.trigger();
        assert!(shutdown.is_triggered());
    }

    #[tokio::test]
    async fn test_shutdown_wait_returns_after_trigger() {
        let shutdown = ShutdownService::new();
        let handle = tokio::spawn(shutdown.wait());

        tokio::task::yield_now().await;
        shutdown.trigger();

        tokio::time::timeout(Duration::from_millis(100), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_subscriber_receives_shutdown() {
        let shutdown = ShutdownService::new();
        let rx = shutdown.subscribe();

        assert!(!*rx.borrow());
        shutdown.trigger();
        assert!(*rx.borrow());
    }

    #[tokio::test]
    async fn test_shutdown_awaits_registered_tasks() {
        let shutdown = ShutdownService::new();
        let finished = Arc::new(AtomicBool::new(false));

        let wait = shutdown.wait();
        let flag = finished.clone();
        let handle = tokio::spawn(async move {
            wait.await;
            tokio::time::sleep(Duration::from_millis(20)).await;
            flag.store(true, Ordering::SeqCst);
        });
        shutdown.register(handle).await;

        shutdown.shutdown().await;

        assert!(shutdown.is_triggered());
        assert!(finished.load(Ordering::SeqCst));
    }
}
