//! # Bus Publisher
//!
//! Defines the publishing side of the bus and the in-memory implementation.

use crate::message::BusMessage;
use crate::subscriber::{BusSubscriber, Subscription};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, trace};

/// Errors from bus operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// The bus was closed.
    #[error("Bus closed")]
    Closed,

    /// The transport refused the message.
    #[error("Delivery to topic {topic} failed: {reason}")]
    Delivery { topic: String, reason: String },
}

/// Trait for publishing messages to a topic.
///
/// Implementations must accept concurrent calls from many tasks.
#[async_trait]
pub trait BusPublisher: Send + Sync {
    /// Publish a message to `topic`.
    ///
    /// # Returns
    ///
    /// The number of subscribers the message was handed to.
    async fn publish(&self, topic: &str, message: BusMessage) -> Result<usize, BusError>;
}

/// In-memory topic bus.
///
/// Each subscriber owns a bounded `mpsc` queue. Publishing copies the message
/// into every live queue of the topic, in publish order, waiting when a queue
/// is full rather than dropping.
pub struct InMemoryBus {
    /// Subscriber queues by topic.
    topics: RwLock<HashMap<String, Vec<mpsc::Sender<BusMessage>>>>,

    /// Set once by `close()`.
    closed: AtomicBool,

    /// Total messages accepted.
    messages_published: AtomicU64,

    /// Queue capacity per subscriber.
    capacity: usize,
}

impl InMemoryBus {
    /// Create a new in-memory bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a new in-memory bus with specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            topics: RwLock::new(HashMap::new()),
            closed: AtomicBool::new(false),
            messages_published: AtomicU64::new(0),
            capacity: capacity.max(1),
        }
    }

    /// Number of live subscribers on `topic`.
    #[must_use]
    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics
            .read()
            .get(topic)
            .map(|senders| senders.iter().filter(|s| !s.is_closed()).count())
            .unwrap_or(0)
    }

    pub fn messages_published(&self) -> u64 {
        self.messages_published.load(Ordering::Relaxed)
    }

    /// Close the bus.
    ///
    /// Later publishes fail with [`BusError::Closed`] and every open
    /// subscription drains its queue and then yields `None`.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.topics.write().clear();
        debug!("Bus closed");
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BusPublisher for InMemoryBus {
    async fn publish(&self, topic: &str, message: BusMessage) -> Result<usize, BusError> {
        if self.is_closed() {
            return Err(BusError::Closed);
        }

        // Clone the senders so no lock is held across an await
        let senders = self.topics.read().get(topic).cloned().unwrap_or_default();
        self.messages_published.fetch_add(1, Ordering::Relaxed);

        let mut delivered = 0;
        let mut stale = false;
        for sender in &senders {
            if sender.send(message.clone()).await.is_ok() {
                delivered += 1;
            } else {
                stale = true;
            }
        }

        if stale {
            if let Some(list) = self.topics.write().get_mut(topic) {
                list.retain(|s| !s.is_closed());
            }
        }

        if delivered == 0 {
            debug!(topic = topic, key = %message.key, "Message dropped (no subscribers)");
        } else {
            trace!(topic = topic, key = %message.key, receivers = delivered, "Message published");
        }

        Ok(delivered)
    }
}

impl BusSubscriber for InMemoryBus {
    fn subscribe(&self, topic: &str) -> Result<Subscription, BusError> {
        if self.is_closed() {
            return Err(BusError::Closed);
        }
        let (tx, rx) = mpsc::channel(self.capacity);
        self.topics
            .write()
            .entry(topic.to_string())
            .or_default()
            .push(tx);

        debug!(topic = topic, "New subscription created");
        Ok(Subscription::new(topic, rx))
    }
}
