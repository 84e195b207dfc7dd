//! Reply Registry - the async-to-sync bridge for one reply topic.
//!
//! Maps correlation IDs to the single-use delivery slot of the dispatcher call
//! waiting on them. Entries are created before the request is published and
//! removed by exactly one of: delivery, timeout, cancellation.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use shared_types::{CorrelationId, Envelope, ExchangeError, Operation};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// A registered exchange waiting for its reply
struct PendingExchange {
    /// Capacity-1 delivery slot
    sender: oneshot::Sender<Envelope>,
    /// When the exchange was registered
    registered_at: Instant,
    /// Operation (for logging)
    operation: Operation,
}

/// Statistics for one registry
#[derive(Debug, Default)]
pub struct ExchangeStats {
    /// Total exchanges registered
    pub total_registered: AtomicU64,
    /// Total replies handed to a waiter
    pub total_delivered: AtomicU64,
    /// Total exchanges that hit their deadline
    pub total_timeouts: AtomicU64,
    /// Total exchanges abandoned without reply (publish failure, dropped caller)
    pub total_cancelled: AtomicU64,
    /// Total replies that matched no registration
    pub total_unmatched: AtomicU64,
}

/// Point-in-time copy of a registry's counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub topic: String,
    pub pending: usize,
    pub registered: u64,
    pub delivered: u64,
    pub timeouts: u64,
    pub cancelled: u64,
    pub unmatched: u64,
}

/// Result of handing a reply to the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The waiter received the reply.
    Delivered,
    /// No live registration for the id. The reply is discarded.
    Unmatched,
    /// The registration existed but its waiter was already gone.
    WaiterGone,
}

/// Registry of pending exchanges for one reply topic.
///
/// Flow:
/// 1. Dispatcher calls `register()` and gets a [`PendingReply`]
/// 2. Dispatcher publishes the request
/// 3. The reply router calls `deliver()` with each reply from the topic
/// 4. Dispatcher awaits the pending reply or calls `expire()` on timeout
pub struct ReplyRegistry {
    /// Reply topic this registry serves
    topic: String,
    /// Map of correlation ID to pending exchange
    pending: DashMap<CorrelationId, PendingExchange>,
    /// Statistics
    stats: ExchangeStats,
}

impl ReplyRegistry {
    pub fn new(topic: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            topic: topic.into(),
            pending: DashMap::new(),
            stats: ExchangeStats::default(),
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Register an exchange and get the handle its reply will arrive on.
    ///
    /// Fails with [`ExchangeError::DuplicateCorrelation`] if the id is
    /// already pending; the existing registration is left untouched.
    pub fn register(
        self: &Arc<Self>,
        correlation_id: CorrelationId,
        operation: Operation,
    ) -> Result<PendingReply, ExchangeError> {
        let (tx, rx) = oneshot::channel();

        match self.pending.entry(correlation_id.clone()) {
            Entry::Occupied(_) => {
                warn!(
                    correlation_id = %correlation_id,
                    topic = %self.topic,
                    "Correlation id already pending"
                );
                return Err(ExchangeError::DuplicateCorrelation(correlation_id));
            }
            Entry::Vacant(slot) => {
                slot.insert(PendingExchange {
                    sender: tx,
                    registered_at: Instant::now(),
                    operation: operation.clone(),
                });
            }
        }
        self.stats.total_registered.fetch_add(1, Ordering::Relaxed);

        debug!(
            correlation_id = %correlation_id,
            operation = %operation,
            topic = %self.topic,
            "Registered pending exchange"
        );

        Ok(PendingReply {
            registry: Arc::clone(self),
            correlation_id,
            receiver: rx,
        })
    }

    /// Hand a reply to its waiter and remove the registration.
    pub fn deliver(&self, reply: Envelope) -> DeliveryOutcome {
        let Some((correlation_id, pending)) = self.pending.remove(&reply.correlation_id) else {
            self.stats.total_unmatched.fetch_add(1, Ordering::Relaxed);
            warn!(
                correlation_id = %reply.correlation_id,
                operation = %reply.operation,
                origin = %reply.origin,
                topic = %self.topic,
                "Reply for unknown or expired correlation ID discarded"
            );
            return DeliveryOutcome::Unmatched;
        };

        let elapsed = pending.registered_at.elapsed();
        match pending.sender.send(reply) {
            Ok(()) => {
                self.stats.total_delivered.fetch_add(1, Ordering::Relaxed);
                debug!(
                    correlation_id = %correlation_id,
                    operation = %pending.operation,
                    response_time_ms = elapsed.as_millis() as u64,
                    "Delivered reply"
                );
                DeliveryOutcome::Delivered
            }
            Err(_) => {
                // Receiver was dropped between lookup and send
                self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
                debug!(
                    correlation_id = %correlation_id,
                    operation = %pending.operation,
                    "Pending exchange receiver dropped"
                );
                DeliveryOutcome::WaiterGone
            }
        }
    }

    /// Remove a registration without a reply. Idempotent.
    ///
    /// Returns true if a registration was removed.
    pub fn cancel(&self, correlation_id: &CorrelationId) -> bool {
        if self.pending.remove(correlation_id).is_some() {
            self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
            debug!(correlation_id = %correlation_id, topic = %self.topic, "Cancelled pending exchange");
            true
        } else {
            false
        }
    }

    /// Remove a registration whose deadline passed. Idempotent.
    pub fn expire(&self, correlation_id: &CorrelationId, timeout: Duration) -> bool {
        if let Some((_, pending)) = self.pending.remove(correlation_id) {
            self.stats.total_timeouts.fetch_add(1, Ordering::Relaxed);
            warn!(
                correlation_id = %correlation_id,
                operation = %pending.operation,
                topic = %self.topic,
                timeout_ms = timeout.as_millis() as u64,
                "Exchange timed out"
            );
            true
        } else {
            false
        }
    }

    /// Get number of currently pending exchanges
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Check if a correlation ID is pending
    pub fn is_pending(&self, correlation_id: &CorrelationId) -> bool {
        self.pending.contains_key(correlation_id)
    }

    pub fn stats(&self) -> &ExchangeStats {
        &self.stats
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            topic: self.topic.clone(),
            pending: self.pending_count(),
            registered: self.stats.total_registered.load(Ordering::Relaxed),
            delivered: self.stats.total_delivered.load(Ordering::Relaxed),
            timeouts: self.stats.total_timeouts.load(Ordering::Relaxed),
            cancelled: self.stats.total_cancelled.load(Ordering::Relaxed),
            unmatched: self.stats.total_unmatched.load(Ordering::Relaxed),
        }
    }
}

/// Handle owned by the dispatcher call that registered an exchange.
///
/// Dropping it cancels the registration if it is still pending, so a caller
/// that goes away (client disconnect, aborted task) never leaves an entry
/// behind.
pub struct PendingReply {
    registry: Arc<ReplyRegistry>,
    correlation_id: CorrelationId,
    receiver: oneshot::Receiver<Envelope>,
}

impl PendingReply {
    pub fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    /// Wait for the reply. Resolves to an error if the slot was dropped.
    pub async fn recv(&mut self) -> Result<Envelope, ExchangeError> {
        (&mut self.receiver)
            .await
            .map_err(|_| ExchangeError::SlotClosed(self.correlation_id.clone()))
    }

    /// Abandon the exchange without a reply.
    pub fn cancel(self) {
        // Drop does the removal
    }

    /// Abandon the exchange because its deadline passed.
    pub fn expire(self, timeout: Duration) {
        self.registry.expire(&self.correlation_id, timeout);
    }
}

impl Drop for PendingReply {
    fn drop(&mut self) {
        self.registry.cancel(&self.correlation_id);
    }
}
