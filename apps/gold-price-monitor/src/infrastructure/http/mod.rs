//! HTTP Server
//!
//! One listener serves the query API, probes, metrics and the WebSocket
//! price stream.
//!
//! # Endpoints
//!
//! - `GET /api/gold/current` - Latest cached quote
//! - `POST /api/gold/refresh` - Run one update cycle now
//! - `GET /api/gold/status` - Scheduler and subscriber status
//! - `GET /api/gold/health` - Constant liveness report
//! - `GET /healthz` - Kubernetes liveness probe (simple OK)
//! - `GET /readyz` - Kubernetes readiness probe (a quote is cached)
//! - `GET /metrics` - Prometheus metrics in text format
//! - `GET /ws/gold-price` - WebSocket price stream

pub mod controller;
pub mod response;

use std::net::SocketAddr;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

pub use controller::{AppState, create_router};

/// HTTP server for the query API and price stream.
#[derive(Debug)]
pub struct HttpServer {
    port: u16,
    state: AppState,
    cancel: CancellationToken,
}

impl HttpServer {
    /// Create a new HTTP server.
    #[must_use]
    pub const fn new(port: u16, state: AppState, cancel: CancellationToken) -> Self {
        Self {
            port,
            state,
            cancel,
        }
    }

    /// Bind to `0.0.0.0:port` and serve until cancelled.
    ///
    /// # Errors
    ///
    /// Returns `HttpServerError` if binding fails or the HTTP server
    /// encounters a fatal error while running.
    pub async fn run(self) -> Result<(), HttpServerError> {
        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| HttpServerError::BindFailed(self.port, e.to_string()))?;

        self.serve(listener).await
    }

    /// Serve on an already bound listener until cancelled.
    ///
    /// # Errors
    ///
    /// Returns `HttpServerError::ServerFailed` on a fatal server error.
    pub async fn serve(self, listener: TcpListener) -> Result<(), HttpServerError> {
        let local_addr = listener.local_addr().ok();
        tracing::info!(addr = ?local_addr, "HTTP server listening");

        axum::serve(listener, create_router(self.state))
            .with_graceful_shutdown(self.cancel.cancelled_owned())
            .await
            .map_err(|e| HttpServerError::ServerFailed(e.to_string()))?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// HTTP server errors.
#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    /// Failed to bind to port.
    #[error("failed to bind to port {0}: {1}")]
    BindFailed(u16, String),

    /// Server error.
    #[error("server error: {0}")]
    ServerFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_error_message() {
        let err = HttpServerError::BindFailed(8080, "address in use".to_string());
        assert_eq!(
            err.to_string(),
            "failed to bind to port 8080: address in use"
        );
    }
}
