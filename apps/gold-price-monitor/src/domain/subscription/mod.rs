//! Topic Subscription Tracking
//!
//! Domain types for tracking which real-time consumers are subscribed to
//! which topics.
//!
//! # Design
//!
//! The registry tracks:
//! - Which topics each consumer is subscribed to
//! - A subscriber count per topic
//!
//! A consumer is one WebSocket session. Connect, subscribe, unsubscribe and
//! disconnect all mutate the registry concurrently, so all state sits behind
//! a single `RwLock`.

use std::collections::{HashMap, HashSet};

use parking_lot::RwLock;

// =============================================================================
// Types
// =============================================================================

/// Unique identifier for a consumer (WebSocket session).
pub type ConsumerId = u64;

/// A topic name, e.g. `/topic/gold-price`.
pub type Topic = String;

/// Topic carrying live gold price quotes.
pub const GOLD_PRICE_TOPIC: &str = "/topic/gold-price";

/// Allocate a fresh consumer identifier.
#[must_use]
pub fn next_consumer_id() -> ConsumerId {
    uuid::Uuid::new_v4().as_u64_pair().0
}

// =============================================================================
// Registry State
// =============================================================================

#[derive(Debug, Default)]
struct RegistryState {
    /// Map from consumer ID to their subscribed topics.
    consumer_topics: HashMap<ConsumerId, HashSet<Topic>>,
    /// Map from topic to subscriber count.
    topic_refcount: HashMap<Topic, usize>,
}

impl RegistryState {
    fn add(&mut self, consumer: ConsumerId, topic: &str) -> bool {
        let topics = self.consumer_topics.entry(consumer).or_default();
        if !topics.insert(topic.to_string()) {
            return false;
        }
        *self.topic_refcount.entry(topic.to_string()).or_insert(0) += 1;
        true
    }

    fn remove(&mut self, consumer: ConsumerId, topic: &str) -> bool {
        let Some(topics) = self.consumer_topics.get_mut(&consumer) else {
            return false;
        };
        if !topics.remove(topic) {
            return false;
        }
        if topics.is_empty() {
            self.consumer_topics.remove(&consumer);
        }
        self.release(topic);
        true
    }

    fn remove_consumer(&mut self, consumer: ConsumerId) -> Vec<Topic> {
        let Some(topics) = self.consumer_topics.remove(&consumer) else {
            return vec![];
        };
        let topics: Vec<_> = topics.into_iter().collect();
        for topic in &topics {
            self.release(topic);
        }
        topics
    }

    fn release(&mut self, topic: &str) {
        if let Some(count) = self.topic_refcount.get_mut(topic) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.topic_refcount.remove(topic);
            }
        }
    }
}

// =============================================================================
// Topic Subscriptions
// =============================================================================

/// Thread-safe registry of consumer topic subscriptions.
///
/// # Example
///
/// ```rust
/// use gold_price_monitor::domain::subscription::TopicSubscriptions;
///
/// let subs = TopicSubscriptions::new();
///
/// // First subscription is new, repeating it is not
/// assert!(subs.subscribe(1, "/topic/gold-price"));
/// assert!(!subs.subscribe(1, "/topic/gold-price"));
///
/// subs.subscribe(2, "/topic/gold-price");
/// assert_eq!(subs.subscriber_count("/topic/gold-price"), 2);
///
/// subs.consumer_disconnected(1);
/// assert_eq!(subs.subscriber_count("/topic/gold-price"), 1);
/// ```
#[derive(Debug, Default)]
pub struct TopicSubscriptions {
    state: RwLock<RegistryState>,
}

impl TopicSubscriptions {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe a consumer to a topic.
    ///
    /// Returns `true` if this is a new subscription for the consumer.
    pub fn subscribe(&self, consumer: ConsumerId, topic: &str) -> bool {
        self.state.write().add(consumer, topic)
    }

    /// Unsubscribe a consumer from a topic.
    ///
    /// Returns `true` if the consumer was subscribed.
    pub fn unsubscribe(&self, consumer: ConsumerId, topic: &str) -> bool {
        self.state.write().remove(consumer, topic)
    }

    /// Handle consumer disconnection.
    ///
    /// Removes every subscription held by the consumer and returns the topics
    /// it was subscribed to.
    pub fn consumer_disconnected(&self, consumer: ConsumerId) -> Vec<Topic> {
        self.state.write().remove_consumer(consumer)
    }

    /// Number of consumers subscribed to a topic.
    #[must_use]
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.state
            .read()
            .topic_refcount
            .get(topic)
            .copied()
            .unwrap_or(0)
    }
}

// =============================================================================
// Tests
// =============================================================================
