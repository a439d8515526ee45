//! Destination routing for `send` frames.

use std::collections::HashMap;

use serde_json::Value;

use super::protocol::{FrameError, ServerFrame};

/// Heartbeat destination.
pub const PING_DESTINATION: &str = "/app/gold-price/ping";

/// Client message destination.
pub const SUBSCRIBE_DESTINATION: &str = "/app/gold-price/subscribe";

/// Handler for one destination. Receives the frame body, returns the reply.
pub type DestinationHandler = fn(Option<Value>) -> ServerFrame;

/// Registry of destination handlers, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct MessageRouter {
    routes: HashMap<String, DestinationHandler>,
}

impl MessageRouter {
    /// Create an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Router with the gold price destinations registered.
    #[must_use]
    pub fn gold_price() -> Self {
        Self::new()
            .route(PING_DESTINATION, handle_ping)
            .route(SUBSCRIBE_DESTINATION, handle_client_message)
    }

    /// Register a handler, replacing any existing one.
    #[must_use]
    pub fn route(mut self, destination: &str, handler: DestinationHandler) -> Self {
        self.routes.insert(destination.to_string(), handler);
        self
    }

    /// Dispatch a frame body to its destination.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::UnknownDestination`] if nothing is registered.
    pub fn dispatch(&self, destination: &str, body: Option<Value>) -> Result<ServerFrame, FrameError> {
        let handler = self
            .routes
            .get(destination)
            .ok_or_else(|| FrameError::UnknownDestination(destination.to_string()))?;
        Ok(handler(body))
    }
}

fn handle_ping(_body: Option<Value>) -> ServerFrame {
    tracing::debug!("Heartbeat received");
    ServerFrame::pong()
}

fn handle_client_message(body: Option<Value>) -> ServerFrame {
    tracing::info!(body = ?body, "Client message received");
    ServerFrame::ack(body.unwrap_or(Value::Null))
}
