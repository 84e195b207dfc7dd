//! Reply Router - sole reader of one reply topic.
//!
//! Each reply topic has exactly one router. It decodes every message on the
//! topic and hands it to the waiter registered under its correlation id.
//! Nothing else consumes the topic, so no reply is ever taken by the wrong
//! caller.

use crate::domain::pending::{DeliveryOutcome, ReplyRegistry};
use crate::ipc::dispatcher::CorrelationDispatcher;
use shared_bus::{BusError, BusMessage, BusSubscriber, MessageStream, Subscription};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::{debug, info, instrument, warn};

/// Delivery loop for one reply topic.
pub struct ReplyRouter {
    registry: Arc<ReplyRegistry>,
    stream: MessageStream,
}

impl ReplyRouter {
    pub fn new(registry: Arc<ReplyRegistry>, subscription: Subscription) -> Self {
        Self {
            registry,
            stream: subscription.into_stream(),
        }
    }

    /// Run until shutdown is signalled or the topic closes.
    #[instrument(skip_all, name = "reply_router", fields(topic = %self.registry.topic()))]
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!("Reply router started");

        loop {
            tokio::select! {
                biased;
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!(pending = self.registry.pending_count(), "Shutdown signal received, stopping reply router");
                        break;
                    }
                }
                message = self.stream.next() => {
                    match message {
                        Some(message) => {
                            self.route(message);
                        }
                        None => {
                            warn!("Reply topic closed, stopping reply router");
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Decode one message and deliver it.
    pub fn route(&self, message: BusMessage) -> Option<DeliveryOutcome> {
        match message.decode() {
            Ok(reply) => {
                debug!(
                    correlation_id = %reply.correlation_id,
                    operation = %reply.operation,
                    status = reply.status.code(),
                    "Reply received"
                );
                Some(self.registry.deliver(reply))
            }
            Err(e) => {
                warn!(key = %message.key, error = %e, "Dropping undecodable reply");
                None
            }
        }
    }
}

/// Subscribe one router per reply topic of `dispatcher` and spawn them.
///
/// Must run before the first exchange is issued so no reply is published to
/// a topic nobody reads yet.
pub fn spawn_reply_routers(
    dispatcher: &CorrelationDispatcher,
    subscriber: &dyn BusSubscriber,
    shutdown: watch::Receiver<bool>,
) -> Result<Vec<JoinHandle<()>>, BusError> {
    let mut handles = Vec::new();
    for registry in dispatcher.registries() {
        let subscription = subscriber.subscribe(registry.topic())?;
        let router = ReplyRouter::new(Arc::clone(registry), subscription);
        handles.push(tokio::spawn(router.run(shutdown.clone())));
    }
    Ok(handles)
}
