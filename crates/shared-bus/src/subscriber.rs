//! # Bus Subscriber
//!
//! Defines the subscription side of the bus.

use crate::message::BusMessage;
use crate::publisher::BusError;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::Stream;

/// Trait for subscribing to a topic.
pub trait BusSubscriber: Send + Sync {
    /// Open a new subscription. Only messages published afterwards are seen.
    fn subscribe(&self, topic: &str) -> Result<Subscription, BusError>;
}

/// A subscription handle for receiving messages of one topic.
///
/// Dropping it detaches the queue; the bus prunes it on the next publish.
pub struct Subscription {
    topic: String,
    receiver: mpsc::Receiver<BusMessage>,
}

impl Subscription {
    pub(crate) fn new(topic: &str, receiver: mpsc::Receiver<BusMessage>) -> Self {
        Self {
            topic: topic.to_string(),
            receiver,
        }
    }

    /// Receive the next message.
    ///
    /// # Returns
    ///
    /// - `Some(message)` - The next message on the topic
    /// - `None` - The bus was closed and the queue is drained
    pub async fn recv(&mut self) -> Option<BusMessage> {
        self.receiver.recv().await
    }

    /// Try to receive the next message without blocking.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(message))` - A message was available
    /// - `Ok(None)` - Nothing queued right now
    /// - `Err(BusError::Closed)` - The bus was closed
    pub fn try_recv(&mut self) -> Result<Option<BusMessage>, BusError> {
        match self.receiver.try_recv() {
            Ok(message) => Ok(Some(message)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(BusError::Closed),
        }
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Turn the subscription into a `Stream`.
    #[must_use]
    pub fn into_stream(self) -> MessageStream {
        MessageStream {
            topic: self.topic,
            inner: ReceiverStream::new(self.receiver),
        }
    }
}

/// A stream wrapper for subscriptions.
///
/// Implements `tokio_stream::Stream` for use with stream combinators.
pub struct MessageStream {
    topic: String,
    inner: ReceiverStream<BusMessage>,
}

impl MessageStream {
    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

impl Stream for MessageStream {
    type Item = BusMessage;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
