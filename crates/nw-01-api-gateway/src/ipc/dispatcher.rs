//! Correlation Dispatcher - one publish, one awaited reply.
//!
//! ```text
//! register ──→ publish ──→ await reply ──→ validate ──→ return
//!                 │             │
//!                 ├─ fail: cancel, TransportError
//!                 └─────────────┴─ deadline: expire, ExchangeTimeout
//! ```
//!
//! Every call makes exactly one publish and owns exactly one registry entry
//! for its lifetime. One deadline covers both the publish and the wait, so a
//! backend whose queue is full cannot hold a caller past its timeout.

use crate::domain::pending::ReplyRegistry;
use serde_json::Value;
use shared_bus::{BusMessage, BusPublisher, ExchangeTopics};
use shared_types::{CorrelationId, Envelope, ExchangeError, Operation, ServiceIdentity};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, instrument, warn};

/// Stand-in deadline for timeouts too large to add to the clock.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// One exchange to run.
#[derive(Debug, Clone)]
pub struct ExchangeRequest {
    pub correlation_id: CorrelationId,
    pub operation: Operation,
    pub payload: Value,
    /// Overrides the dispatcher default
    pub timeout: Option<Duration>,
}

impl ExchangeRequest {
    /// New exchange with a fresh correlation id.
    pub fn new(operation: Operation, payload: Value) -> Self {
        Self {
            correlation_id: CorrelationId::new(),
            operation,
            payload,
            timeout: None,
        }
    }

    pub fn with_correlation_id(mut self, correlation_id: CorrelationId) -> Self {
        self.correlation_id = correlation_id;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Issues correlated exchanges over the bus.
pub struct CorrelationDispatcher {
    identity: ServiceIdentity,
    publisher: Arc<dyn BusPublisher>,
    topics: ExchangeTopics,
    /// One registry per reply topic
    registries: HashMap<String, Arc<ReplyRegistry>>,
    default_timeout: Duration,
}

impl CorrelationDispatcher {
    pub fn new(
        identity: ServiceIdentity,
        publisher: Arc<dyn BusPublisher>,
        topics: ExchangeTopics,
        default_timeout: Duration,
    ) -> Self {
        let registries = topics
            .reply_topics()
            .into_iter()
            .map(|topic| (topic.clone(), ReplyRegistry::new(topic)))
            .collect();

        Self {
            identity,
            publisher,
            topics,
            registries,
            default_timeout,
        }
    }

    pub fn identity(&self) -> &ServiceIdentity {
        &self.identity
    }

    pub fn topics(&self) -> &ExchangeTopics {
        &self.topics
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Registries, one per reply topic, in no particular order.
    pub fn registries(&self) -> impl Iterator<Item = &Arc<ReplyRegistry>> {
        self.registries.values()
    }

    pub fn registry(&self, reply_topic: &str) -> Option<&Arc<ReplyRegistry>> {
        self.registries.get(reply_topic)
    }

    /// Total exchanges currently waiting across all reply topics.
    pub fn pending_count(&self) -> usize {
        self.registries.values().map(|r| r.pending_count()).sum()
    }

    /// Publish `request` and wait for its reply.
    ///
    /// The returned envelope may carry a not-ok status; interpreting it is
    /// the caller's job.
    #[instrument(
        skip_all,
        name = "exchange",
        fields(correlation_id = %request.correlation_id, operation = %request.operation)
    )]
    pub async fn call(&self, request: ExchangeRequest) -> Result<Envelope, ExchangeError> {
        let ExchangeRequest {
            correlation_id,
            operation,
            payload,
            timeout,
        } = request;
        let timeout = timeout.unwrap_or(self.default_timeout);
        let now = Instant::now();
        let deadline = now.checked_add(timeout).unwrap_or(now + FAR_FUTURE);
        let timed_out = |operation: Operation| ExchangeError::Timeout {
            operation,
            timeout_ms: timeout.as_millis() as u64,
        };

        let route = self.topics.route_for(&operation).ok_or_else(|| {
            ExchangeError::Transport(format!("no route for operation {operation}"))
        })?;
        let registry = self.registries.get(&route.reply_topic).ok_or_else(|| {
            ExchangeError::Transport(format!("no reply router for topic {}", route.reply_topic))
        })?;

        let envelope = Envelope::request(correlation_id.clone(), &self.identity, operation.clone(), payload);
        let message = BusMessage::from_envelope(&envelope)?;

        // Register before publishing so a fast reply always finds its slot
        let mut pending = registry.register(correlation_id.clone(), operation.clone())?;

        let published =
            tokio::time::timeout_at(deadline, self.publisher.publish(&route.request_topic, message)).await;
        match published {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                pending.cancel();
                warn!(topic = %route.request_topic, error = %e, "Publish failed");
                return Err(ExchangeError::Transport(e.to_string()));
            }
            Err(_) => {
                warn!(topic = %route.request_topic, "Publish did not complete before the deadline");
                pending.expire(timeout);
                return Err(timed_out(operation));
            }
        }

        debug!(
            request_topic = %route.request_topic,
            reply_topic = %route.reply_topic,
            timeout_ms = timeout.as_millis() as u64,
            "Published request"
        );

        let reply = match tokio::time::timeout_at(deadline, pending.recv()).await {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                pending.expire(timeout);
                return Err(timed_out(operation));
            }
        };

        if !reply.answers(&envelope) {
            warn!(
                got_id = %reply.correlation_id,
                got_op = %reply.operation,
                "Reply does not answer this exchange"
            );
            return Err(ExchangeError::ProtocolMismatch {
                expected_id: correlation_id,
                expected_op: operation,
                got_id: reply.correlation_id,
                got_op: reply.operation,
            });
        }

        debug!(status = reply.status.code(), "Exchange completed");
        Ok(reply)
    }
}
