//! # Backend Exchange Loop
//!
//! The consume → dispatch → reply loop every backend service runs.
//!
//! ## Message Lifecycle
//!
//! ```text
//! received ──→ parsed ──→ dispatched ──→ handled ──→ replied
//!     │           │
//!     │           └─ unknown operation: logged, no reply
//!     └─ decode failure: logged, no reply (the caller times out)
//! ```
//!
//! A handler error or panic becomes a not-ok reply with an empty payload. One
//! bad message never stops the loop.

use crate::message::BusMessage;
use crate::publisher::BusPublisher;
use crate::subscriber::Subscription;
use async_trait::async_trait;
use futures::FutureExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_types::{DomainError, Envelope, Operation, ServiceIdentity, Status};
use std::collections::HashMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error, info, instrument, warn};

/// Domain side of a backend: turns a request payload into a reply payload.
#[async_trait]
pub trait ExchangeHandler: Send + Sync {
    async fn handle(
        &self,
        operation: &Operation,
        payload: &serde_json::Value,
    ) -> Result<serde_json::Value, DomainError>;
}

/// Decode a request payload for a handler.
pub fn decode_request<T: DeserializeOwned>(payload: &serde_json::Value) -> Result<T, DomainError> {
    T::deserialize(payload).map_err(|e| DomainError::InvalidPayload(e.to_string()))
}

/// Encode a handler result as a reply payload.
pub fn encode_reply<T: Serialize>(value: &T) -> Result<serde_json::Value, DomainError> {
    serde_json::to_value(value).map_err(|e| DomainError::InvalidPayload(e.to_string()))
}

/// Stage a message reached before the loop was done with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStage {
    Received,
    Parsed,
    Dispatched,
    Handled,
    Replied,
}

impl fmt::Display for MessageStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageStage::Received => "received",
            MessageStage::Parsed => "parsed",
            MessageStage::Dispatched => "dispatched",
            MessageStage::Handled => "handled",
            MessageStage::Replied => "replied",
        };
        f.write_str(name)
    }
}

/// Terminal outcome of one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageOutcome {
    /// Reply published with this status.
    Replied(Status),
    /// Bytes were not an envelope.
    DecodeFailed,
    /// No handler route for the operation.
    UnknownOperation(Operation),
    /// Reply built but the publish failed.
    PublishFailed,
}

/// Counters for one loop.
#[derive(Debug, Default)]
pub struct LoopStats {
    pub received: AtomicU64,
    pub replied_ok: AtomicU64,
    pub replied_not_ok: AtomicU64,
    pub decode_failures: AtomicU64,
    pub unknown_operations: AtomicU64,
    pub publish_failures: AtomicU64,
}

impl LoopStats {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn get(counter: &AtomicU64) -> u64 {
        counter.load(Ordering::Relaxed)
    }
}

/// Long-lived loop serving one request topic.
pub struct ExchangeLoop {
    identity: ServiceIdentity,
    handler: Arc<dyn ExchangeHandler>,
    publisher: Arc<dyn BusPublisher>,
    subscription: Subscription,
    /// Operation → reply topic. Operations not listed get no reply.
    reply_routes: HashMap<Operation, String>,
    stats: Arc<LoopStats>,
}

impl ExchangeLoop {
    pub fn new(
        identity: ServiceIdentity,
        handler: Arc<dyn ExchangeHandler>,
        publisher: Arc<dyn BusPublisher>,
        subscription: Subscription,
        reply_routes: HashMap<Operation, String>,
    ) -> Self {
        Self {
            identity,
            handler,
            publisher,
            subscription,
            reply_routes,
            stats: Arc::new(LoopStats::default()),
        }
    }

    pub fn stats(&self) -> Arc<LoopStats> {
        Arc::clone(&self.stats)
    }

    /// Process messages until shutdown is signalled or the bus closes.
    #[instrument(skip_all, name = "exchange_loop", fields(service = %self.identity, topic = %self.subscription.topic()))]
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!("Exchange loop started");

        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("Shutdown signal received, stopping exchange loop");
                        break;
                    }
                }
                message = self.subscription.recv() => {
                    match message {
                        Some(message) => {
                            self.process(message).await;
                        }
                        None => {
                            warn!("Request topic closed, stopping exchange loop");
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Run one message through the lifecycle.
    pub async fn process(&self, message: BusMessage) -> MessageOutcome {
        LoopStats::bump(&self.stats.received);
        let mut stage = MessageStage::Received;

        let request = match message.decode() {
            Ok(envelope) => envelope,
            Err(e) => {
                LoopStats::bump(&self.stats.decode_failures);
                warn!(key = %message.key, stage = %stage, error = %e, "Dropping undecodable request");
                return MessageOutcome::DecodeFailed;
            }
        };
        stage = MessageStage::Parsed;

        info!(
            correlation_id = %request.correlation_id,
            operation = %request.operation,
            origin = %request.origin,
            payload = %request.payload,
            "Exchange request"
        );

        let Some(reply_topic) = self.reply_routes.get(&request.operation) else {
            LoopStats::bump(&self.stats.unknown_operations);
            warn!(
                correlation_id = %request.correlation_id,
                operation = %request.operation,
                stage = %stage,
                "No handler for operation, request dropped without reply"
            );
            return MessageOutcome::UnknownOperation(request.operation);
        };
        stage = MessageStage::Dispatched;
        debug!(correlation_id = %request.correlation_id, stage = %stage, "Dispatching to handler");

        let outcome = AssertUnwindSafe(self.handler.handle(&request.operation, &request.payload))
            .catch_unwind()
            .await;

        let reply = match outcome {
            Ok(Ok(payload)) => request.reply(&self.identity, Status::Ok, payload),
            Ok(Err(e)) => {
                warn!(
                    correlation_id = %request.correlation_id,
                    operation = %request.operation,
                    error = %e,
                    "Handler failed, replying not-ok"
                );
                request.failure_reply(&self.identity)
            }
            Err(_) => {
                error!(
                    correlation_id = %request.correlation_id,
                    operation = %request.operation,
                    "Handler panicked, replying not-ok"
                );
                request.failure_reply(&self.identity)
            }
        };
        stage = MessageStage::Handled;

        self.publish_reply(reply_topic, &reply, stage).await
    }

    async fn publish_reply(
        &self,
        reply_topic: &str,
        reply: &Envelope,
        stage: MessageStage,
    ) -> MessageOutcome {
        let published = match BusMessage::from_envelope(reply) {
            Ok(message) => self
                .publisher
                .publish(reply_topic, message)
                .await
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match published {
            Ok(receivers) => {
                if reply.status.is_ok() {
                    LoopStats::bump(&self.stats.replied_ok);
                } else {
                    LoopStats::bump(&self.stats.replied_not_ok);
                }
                info!(
                    correlation_id = %reply.correlation_id,
                    operation = %reply.operation,
                    status = reply.status.code(),
                    topic = reply_topic,
                    receivers = receivers,
                    stage = %MessageStage::Replied,
                    "Exchange reply"
                );
                MessageOutcome::Replied(reply.status)
            }
            Err(reason) => {
                LoopStats::bump(&self.stats.publish_failures);
                error!(
                    correlation_id = %reply.correlation_id,
                    topic = reply_topic,
                    stage = %stage,
                    error = %reason,
                    "Failed to publish reply"
                );
                MessageOutcome::PublishFailed
            }
        }
    }
}
