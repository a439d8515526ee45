//! WebSocket Price Stream
//!
//! Clients connect to `/ws/gold-price`, subscribe to `/topic/gold-price` and
//! receive a `price` frame for every published quote. See [`protocol`] for
//! the frame format and [`router`] for application destinations.

pub mod protocol;
pub mod router;
mod session;

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::WebSocketUpgrade;
use axum::response::Response;

pub use protocol::{ClientFrame, FrameError, ServerFrame};
pub use router::{MessageRouter, PING_DESTINATION, SUBSCRIBE_DESTINATION};
pub use session::{WebSocketState, handle_socket};

/// Upgrade an HTTP request to a price stream session.
pub async fn upgrade_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<WebSocketState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}
