//! Per-connection WebSocket session.
//!
//! Each connection gets its own task and consumer id. The broadcast receiver
//! is created when the consumer subscribes to the price topic and dropped when
//! it unsubscribes, so a session only ever sees quotes published while it was
//! subscribed, and the hub's receiver count equals the topic's subscribers.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};

use super::protocol::{ClientFrame, FrameError, ServerFrame};
use super::router::MessageRouter;
use crate::domain::subscription::{
    ConsumerId, GOLD_PRICE_TOPIC, TopicSubscriptions, next_consumer_id,
};
use crate::infrastructure::broadcast::{PriceBroadcast, SharedBroadcastHub};
use crate::infrastructure::metrics;

/// State shared by all WebSocket sessions.
#[derive(Debug)]
pub struct WebSocketState {
    hub: SharedBroadcastHub,
    subscriptions: Arc<TopicSubscriptions>,
    router: MessageRouter,
    active: AtomicUsize,
}

impl WebSocketState {
    /// Create session state.
    #[must_use]
    pub const fn new(
        hub: SharedBroadcastHub,
        subscriptions: Arc<TopicSubscriptions>,
        router: MessageRouter,
    ) -> Self {
        Self {
            hub,
            subscriptions,
            router,
            active: AtomicUsize::new(0),
        }
    }

    /// Handle one client text frame, returning the reply for the sender.
    ///
    /// A repeated subscription produces no reply.
    fn handle_text(&self, session: &mut Session, text: &str) -> Option<ServerFrame> {
        let consumer = session.consumer;
        let frame = match ClientFrame::parse(text) {
            Ok(frame) => frame,
            Err(err) => {
                tracing::debug!(consumer, error = %err, "Rejected client frame");
                return Some(ServerFrame::from(&err));
            }
        };

        match frame {
            ClientFrame::Subscribe { topic } => {
                if topic != GOLD_PRICE_TOPIC {
                    return Some(ServerFrame::from(&FrameError::UnknownTopic(topic)));
                }
                if self.subscriptions.subscribe(consumer, &topic) {
                    session.quotes = Some(self.hub.quotes_rx());
                    tracing::info!(consumer, topic = %topic, "Client subscribed");
                    Some(ServerFrame::welcome(&topic))
                } else {
                    None
                }
            }
            ClientFrame::Unsubscribe { topic } => {
                if topic != GOLD_PRICE_TOPIC {
                    return Some(ServerFrame::from(&FrameError::UnknownTopic(topic)));
                }
                if self.subscriptions.unsubscribe(consumer, &topic) {
                    session.quotes = None;
                    tracing::info!(consumer, topic = %topic, "Client unsubscribed");
                }
                None
            }
            ClientFrame::Send { destination, body } => Some(
                self.router
                    .dispatch(&destination, body)
                    .unwrap_or_else(|err| ServerFrame::from(&err)),
            ),
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn session_opened(&self) {
        let count = self.active.fetch_add(1, Ordering::Relaxed) + 1;
        metrics::set_websocket_clients(count as f64);
    }

    #[allow(clippy::cast_precision_loss)]
    fn session_closed(&self, consumer: ConsumerId) {
        self.subscriptions.consumer_disconnected(consumer);
        let count = self.active.fetch_sub(1, Ordering::Relaxed).saturating_sub(1);
        metrics::set_websocket_clients(count as f64);
    }
}

/// Subscription state of one connection.
#[derive(Debug)]
struct Session {
    consumer: ConsumerId,
    quotes: Option<broadcast::Receiver<PriceBroadcast>>,
}

impl Session {
    const fn new(consumer: ConsumerId) -> Self {
        Self {
            consumer,
            quotes: None,
        }
    }

    /// Next quote, pending forever while unsubscribed.
    async fn next_quote(&mut self) -> Result<PriceBroadcast, RecvError> {
        match self.quotes.as_mut() {
            Some(quotes) => quotes.recv().await,
            None => std::future::pending().await,
        }
    }
}

/// Drive one WebSocket connection until either side closes it.
pub async fn handle_socket(socket: WebSocket, state: Arc<WebSocketState>) {
    let consumer = next_consumer_id();
    let mut session = Session::new(consumer);
    let (mut sender, mut receiver) = socket.split();

    state.session_opened();
    tracing::info!(consumer, "WebSocket client connected");

    loop {
        tokio::select! {
            incoming = receiver.next() => {
                let reply = match incoming {
                    Some(Ok(Message::Text(text))) => state.handle_text(&mut session, text.as_str()),
                    Some(Ok(Message::Binary(_))) => Some(ServerFrame::from(&FrameError::Binary)),
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => None,
                    Some(Err(e)) => {
                        tracing::debug!(consumer, error = %e, "WebSocket receive failed");
                        break;
                    }
                };

                if let Some(frame) = reply
                    && send_frame(&mut sender, &frame).await.is_err()
                {
                    break;
                }
            }
            received = session.next_quote() => match received {
                Ok(update) => {
                    if send_frame(&mut sender, &ServerFrame::price(&update.quote)).await.is_err() {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(consumer, skipped, "WebSocket client lagged, quotes dropped");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }

    state.session_closed(consumer);
    tracing::info!(consumer, "WebSocket client disconnected");
}

async fn send_frame(
    sender: &mut SplitSink<WebSocket, Message>,
    frame: &ServerFrame,
) -> Result<(), axum::Error> {
    let json = match frame.to_json() {
        Ok(json) => json,
        Err(e) => {
            tracing::error!(error = %e, "Failed to serialize server frame");
            return Ok(());
        }
    };
    sender.send(Message::Text(json.into())).await
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use tokio::sync::broadcast::error::TryRecvError;

    use super::*;
    use crate::domain::quote::{MarketStatus, Quote, QuoteSource};
    use crate::infrastructure::broadcast::BroadcastHub;

    const SUBSCRIBE: &str = r#"{"type":"subscribe","topic":"/topic/gold-price"}"#;
    const UNSUBSCRIBE: &str = r#"{"type":"unsubscribe","topic":"/topic/gold-price"}"#;

    fn state() -> WebSocketState {
        WebSocketState::new(
            Arc::new(BroadcastHub::with_defaults()),
            Arc::new(TopicSubscriptions::new()),
            MessageRouter::gold_price(),
        )
    }

    fn quote() -> Arc<Quote> {
        Arc::new(Quote::new(
            Decimal::from(2000),
            "USD",
            Decimal::ZERO,
            Decimal::ZERO,
            QuoteSource::Mock,
            MarketStatus::Open,
        ))
    }

    #[test]
    fn first_subscribe_gets_welcome() {
        let state = state();
        let mut session = Session::new(1);

        let reply = state.handle_text(&mut session, SUBSCRIBE);

        assert!(matches!(reply, Some(ServerFrame::Welcome { .. })));
        assert!(session.quotes.is_some());
        assert_eq!(state.subscriptions.subscriber_count(GOLD_PRICE_TOPIC), 1);
    }

    #[test]
    fn repeated_subscribe_is_silent() {
        let state = state();
        let mut session = Session::new(1);
        state.handle_text(&mut session, SUBSCRIBE);

        assert_eq!(state.handle_text(&mut session, SUBSCRIBE), None);
        assert_eq!(state.subscriptions.subscriber_count(GOLD_PRICE_TOPIC), 1);
        assert_eq!(state.hub.receiver_count(), 1);
    }

    #[test]
    fn unknown_topic_is_an_error() {
        let state = state();
        let mut session = Session::new(1);

        let reply = state.handle_text(&mut session, r#"{"type":"subscribe","topic":"/topic/silver"}"#);

        assert_eq!(
            reply,
            Some(ServerFrame::Error {
                message: "unknown topic: /topic/silver".to_string()
            })
        );
        assert!(session.quotes.is_none());
    }

    #[test]
    fn unsubscribe_drops_receiver() {
        let state = state();
        let mut session = Session::new(7);
        state.handle_text(&mut session, SUBSCRIBE);

        let reply = state.handle_text(&mut session, UNSUBSCRIBE);

        assert_eq!(reply, None);
        assert!(session.quotes.is_none());
        assert_eq!(state.subscriptions.subscriber_count(GOLD_PRICE_TOPIC), 0);
        assert_eq!(state.hub.receiver_count(), 0);
    }

    #[test]
    fn unsubscribed_session_holds_no_receiver() {
        let state = state();
        let mut session = Session::new(1);

        state.handle_text(&mut session, r#"{"type":"send","destination":"/app/gold-price/ping"}"#);

        assert!(session.quotes.is_none());
        assert_eq!(state.hub.send_quote(quote()), None);
    }

    #[test]
    fn quote_queued_before_subscribe_is_not_delivered() {
        let state = state();
        let _other = state.hub.quotes_rx();
        let mut session = Session::new(1);

        assert_eq!(state.hub.send_quote(quote()), Some(1));
        state.handle_text(&mut session, SUBSCRIBE);

        let quotes = session.quotes.as_mut().unwrap();
        assert!(matches!(quotes.try_recv(), Err(TryRecvError::Empty)));

        let later = quote();
        assert_eq!(state.hub.send_quote(Arc::clone(&later)), Some(2));
        assert_eq!(quotes.try_recv().unwrap().quote.id(), later.id());
    }

    #[test]
    fn send_is_routed() {
        let reply = state().handle_text(
            &mut Session::new(1),
            r#"{"type":"send","destination":"/app/gold-price/ping"}"#,
        );
        assert!(matches!(reply, Some(ServerFrame::Pong { .. })));
    }

    #[test]
    fn malformed_text_is_an_error() {
        let reply = state().handle_text(&mut Session::new(1), "{");
        assert!(matches!(reply, Some(ServerFrame::Error { .. })));
    }

    #[test]
    fn closing_a_session_drops_subscriptions() {
        let state = state();
        let mut session = Session::new(3);
        state.session_opened();
        state.handle_text(&mut session, SUBSCRIBE);
        assert_eq!(state.active.load(Ordering::Relaxed), 1);

        state.session_closed(3);
        assert_eq!(state.active.load(Ordering::Relaxed), 0);
        assert_eq!(state.subscriptions.subscriber_count(GOLD_PRICE_TOPIC), 0);
    }
}
