//! WebSocket frame protocol.
//!
//! Every frame is a JSON text message tagged by `type`.
//!
//! ```text
//! client → server   subscribe | unsubscribe | send
//! server → client   welcome | price | pong | ack | error
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::quote::Quote;
use crate::domain::subscription::GOLD_PRICE_TOPIC;

/// Server name reported in pong frames.
pub const SERVER_NAME: &str = "gold-price-monitor";

/// Greeting sent on the first subscription to the price topic.
pub const WELCOME_MESSAGE: &str = "Welcome to the real-time gold price feed";

/// Acknowledgment text for client messages.
pub const ACK_MESSAGE: &str = "Subscription request received";

// =============================================================================
// Client Frames
// =============================================================================

/// Frame sent by a client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientFrame {
    /// Start receiving a topic.
    Subscribe {
        /// Topic name.
        topic: String,
    },
    /// Stop receiving a topic.
    Unsubscribe {
        /// Topic name.
        topic: String,
    },
    /// Application message for a destination.
    Send {
        /// Destination, e.g. `/app/gold-price/ping`.
        destination: String,
        /// Optional payload.
        #[serde(default)]
        body: Option<Value>,
    },
}

impl ClientFrame {
    /// Parse a text frame.
    ///
    /// # Errors
    ///
    /// Returns [`FrameError::Malformed`] if the text is not a known frame.
    pub fn parse(text: &str) -> Result<Self, FrameError> {
        serde_json::from_str(text).map_err(|e| FrameError::Malformed(e.to_string()))
    }
}

// =============================================================================
// Server Frames
// =============================================================================

/// Frame sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerFrame {
    /// Subscription greeting.
    Welcome {
        /// Subscribed topic.
        topic: String,
        /// Greeting text.
        message: String,
        /// Always `"connected"`.
        status: &'static str,
        /// Server time.
        timestamp: DateTime<Utc>,
    },
    /// Price update.
    Price {
        /// Topic the quote was published on.
        topic: String,
        /// The quote.
        data: Quote,
    },
    /// Heartbeat reply.
    Pong {
        /// Server name.
        server: &'static str,
        /// Server time.
        timestamp: DateTime<Utc>,
    },
    /// Client message acknowledgment.
    Ack {
        /// Acknowledgment text.
        message: String,
        /// Echo of the client body.
        #[serde(rename = "clientMessage")]
        client_message: Value,
        /// Server time.
        timestamp: DateTime<Utc>,
    },
    /// Protocol error. The session stays open.
    Error {
        /// Error description.
        message: String,
    },
}

impl ServerFrame {
    /// Welcome frame for a topic.
    #[must_use]
    pub fn welcome(topic: &str) -> Self {
        Self::Welcome {
            topic: topic.to_string(),
            message: WELCOME_MESSAGE.to_string(),
            status: "connected",
            timestamp: Utc::now(),
        }
    }

    /// Price frame on the gold price topic.
    #[must_use]
    pub fn price(quote: &Quote) -> Self {
        Self::Price {
            topic: GOLD_PRICE_TOPIC.to_string(),
            data: quote.clone(),
        }
    }

    /// Heartbeat reply.
    #[must_use]
    pub fn pong() -> Self {
        Self::Pong {
            server: SERVER_NAME,
            timestamp: Utc::now(),
        }
    }

    /// Acknowledgment echoing the client body.
    #[must_use]
    pub fn ack(client_message: Value) -> Self {
        Self::Ack {
            message: ACK_MESSAGE.to_string(),
            client_message,
            timestamp: Utc::now(),
        }
    }

    /// Serialize to a JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<&FrameError> for ServerFrame {
    fn from(err: &FrameError) -> Self {
        Self::Error {
            message: err.to_string(),
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Client frame errors, reported back as `error` frames.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// Text was not a valid frame.
    #[error("malformed frame: {0}")]
    Malformed(String),

    /// Binary frames are not part of the protocol.
    #[error("binary frames are not supported")]
    Binary,

    /// Topic is not served.
    #[error("unknown topic: {0}")]
    UnknownTopic(String),

    /// No handler for the destination.
    #[error("unknown destination: {0}")]
    UnknownDestination(String),
}
