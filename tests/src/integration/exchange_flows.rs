//! # Exchange Flows
//!
//! Dispatcher, reply routers and backend loops wired over one in-memory bus,
//! without HTTP. These check the correlation properties under load and
//! failure.

use async_trait::async_trait;
use futures::future::join_all;
use nw_01_api_gateway::{spawn_reply_routers, CorrelationDispatcher, ExchangeRequest};
use serde_json::{json, Value};
use shared_bus::{
    BusMessage, BusPublisher, BusSubscriber, ExchangeHandler, ExchangeLoop, ExchangeTopics,
    InMemoryBus, LoopStats,
};
use shared_types::{
    CorrelationId, DomainError, Envelope, ExchangeError, Operation, ServiceIdentity, Status,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

// =============================================================================
// FIXTURES
// =============================================================================

struct Wiring {
    bus: Arc<InMemoryBus>,
    dispatcher: Arc<CorrelationDispatcher>,
    topics: ExchangeTopics,
    shutdown: watch::Sender<bool>,
}

impl Wiring {
    fn new(timeout: Duration) -> Self {
        let bus = Arc::new(InMemoryBus::new());
        let topics = ExchangeTopics::default();
        let dispatcher = Arc::new(CorrelationDispatcher::new(
            ServiceIdentity::new("api-gateway", "it"),
            bus.clone(),
            topics.clone(),
            timeout,
        ));
        let (shutdown, shutdown_rx) = watch::channel(false);
        spawn_reply_routers(&dispatcher, bus.as_ref(), shutdown_rx).unwrap();

        Self {
            bus,
            dispatcher,
            topics,
            shutdown,
        }
    }

    /// Attach `handler` as the backend of `request_topic`.
    fn backend(&self, request_topic: &str, handler: Arc<dyn ExchangeHandler>) -> Arc<LoopStats> {
        let exchange_loop = ExchangeLoop::new(
            ServiceIdentity::new("backend", "it"),
            handler,
            self.bus.clone(),
            self.bus.subscribe(request_topic).unwrap(),
            self.topics.reply_routes(request_topic),
        );
        let stats = exchange_loop.stats();
        tokio::spawn(exchange_loop.run(self.shutdown.subscribe()));
        stats
    }
}

impl Drop for Wiring {
    fn drop(&mut self) {
        let _ = self.shutdown.send(true);
    }
}

/// Echoes the request payload after an optional delay read from it.
struct EchoHandler;

#[async_trait]
impl ExchangeHandler for EchoHandler {
    async fn handle(&self, _operation: &Operation, payload: &Value) -> Result<Value, DomainError> {
        if let Some(delay) = payload.get("delay_ms").and_then(Value::as_u64) {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        Ok(payload.clone())
    }
}

fn list_comments(n: u64) -> ExchangeRequest {
    ExchangeRequest::new(Operation::ListComments, json!({ "n": n }))
}

// =============================================================================
// CONCURRENT CORRELATION
// =============================================================================

#[tokio::test]
async fn test_concurrent_calls_each_get_their_own_reply() {
    let wiring = Wiring::new(Duration::from_secs(2));
    const CALLS: u64 = 32;

    // Backend that collects every request first and answers in reverse order
    let mut requests = wiring.bus.subscribe("comments.requests").unwrap();
    let bus = wiring.bus.clone();
    let backend = tokio::spawn(async move {
        let mut seen = Vec::new();
        while seen.len() < CALLS as usize {
            let message = requests.recv().await.unwrap();
            seen.push(message.decode().unwrap());
        }
        let origin = ServiceIdentity::new("comments", "it");
        for request in seen.into_iter().rev() {
            let reply = request.reply(&origin, Status::Ok, request.payload.clone());
            bus.publish("comments.list.replies", BusMessage::from_envelope(&reply).unwrap())
                .await
                .unwrap();
        }
    });

    let calls = (0..CALLS).map(|n| {
        let dispatcher = Arc::clone(&wiring.dispatcher);
        async move { (n, dispatcher.call(list_comments(n)).await) }
    });
    let results = join_all(calls).await;
    backend.await.unwrap();

    for (n, result) in results {
        let reply = result.unwrap();
        assert_eq!(reply.payload["n"], n, "call {n} got someone else's reply");
        assert!(reply.status.is_ok());
    }
    assert_eq!(wiring.dispatcher.pending_count(), 0);

    let stats = wiring
        .dispatcher
        .registry("comments.list.replies")
        .unwrap()
        .snapshot();
    assert_eq!(stats.delivered, CALLS);
    assert_eq!(stats.unmatched, 0);
}

#[tokio::test]
async fn test_calls_across_topics_do_not_interfere() {
    let wiring = Wiring::new(Duration::from_secs(2));
    wiring.backend("news.requests", Arc::new(EchoHandler));
    wiring.backend("comments.requests", Arc::new(EchoHandler));
    wiring.backend("moderation.requests", Arc::new(EchoHandler));

    let operations = [
        Operation::FetchNewsPage,
        Operation::FetchSingleNews,
        Operation::ListComments,
        Operation::SubmitComment,
        Operation::ModerateComment,
    ];
    let calls = (0..40u64).map(|n| {
        let dispatcher = Arc::clone(&wiring.dispatcher);
        let operation = operations[n as usize % operations.len()].clone();
        async move {
            let reply = dispatcher
                .call(ExchangeRequest::new(operation.clone(), json!({ "n": n })))
                .await
                .unwrap();
            (n, operation, reply)
        }
    });

    for (n, operation, reply) in join_all(calls).await {
        assert_eq!(reply.operation, operation);
        assert_eq!(reply.payload["n"], n);
    }
    assert_eq!(wiring.dispatcher.pending_count(), 0);
}

// =============================================================================
// TIMEOUTS AND LATE REPLIES
// =============================================================================

#[tokio::test]
async fn test_timeout_leaves_no_registration() {
    let wiring = Wiring::new(Duration::from_millis(40));

    let result = wiring.dispatcher.call(list_comments(1)).await;
    assert!(matches!(
        result,
        Err(ExchangeError::Timeout {
            operation: Operation::ListComments,
            ..
        })
    ));
    assert_eq!(wiring.dispatcher.pending_count(), 0);

    let stats = wiring
        .dispatcher
        .registry("comments.list.replies")
        .unwrap()
        .snapshot();
    assert_eq!(stats.timeouts, 1);
}

#[tokio::test]
async fn test_late_reply_is_discarded_without_disturbing_others() {
    let wiring = Wiring::new(Duration::from_secs(1));
    wiring.backend("comments.requests", Arc::new(EchoHandler));

    // Slow call with a short deadline; the backend answers after it expired
    let slow = ExchangeRequest::new(Operation::ListComments, json!({ "delay_ms": 150 }))
        .with_timeout(Duration::from_millis(30));
    assert!(matches!(
        wiring.dispatcher.call(slow).await,
        Err(ExchangeError::Timeout { .. })
    ));

    // Issued while the late reply is still in flight
    let reply = wiring.dispatcher.call(list_comments(7)).await.unwrap();
    assert_eq!(reply.payload["n"], 7);

    let registry = wiring.dispatcher.registry("comments.list.replies").unwrap();
    assert_eq!(registry.snapshot().unmatched, 1);
    assert_eq!(registry.pending_count(), 0);
}

#[tokio::test]
async fn test_reply_with_unknown_id_is_dropped() {
    let wiring = Wiring::new(Duration::from_secs(1));
    wiring.backend("news.requests", Arc::new(EchoHandler));

    let stray = Envelope {
        correlation_id: CorrelationId::from_string("nobody-waits-for-this"),
        origin: "news@elsewhere".to_string(),
        status: Status::Ok,
        operation: Operation::FetchNewsPage,
        payload: json!({}),
    };
    wiring
        .bus
        .publish("news.page.replies", BusMessage::from_envelope(&stray).unwrap())
        .await
        .unwrap();

    let reply = wiring
        .dispatcher
        .call(ExchangeRequest::new(Operation::FetchNewsPage, json!({ "n": 3 })))
        .await
        .unwrap();
    assert_eq!(reply.payload["n"], 3);
    assert_eq!(
        wiring
            .dispatcher
            .registry("news.page.replies")
            .unwrap()
            .snapshot()
            .unmatched,
        1
    );
}

// =============================================================================
// BACKEND LOOP RESILIENCE
// =============================================================================

#[tokio::test]
async fn test_garbage_request_does_not_block_the_next_one() {
    let wiring = Wiring::new(Duration::from_secs(1));
    let stats = wiring.backend("moderation.requests", Arc::new(EchoHandler));

    wiring
        .bus
        .publish("moderation.requests", BusMessage::new("junk", &b"{not json"[..]))
        .await
        .unwrap();

    let reply = wiring
        .dispatcher
        .call(ExchangeRequest::new(Operation::ModerateComment, json!({ "n": 1 })))
        .await
        .unwrap();
    assert!(reply.status.is_ok());
    assert_eq!(LoopStats::get(&stats.decode_failures), 1);
    assert_eq!(LoopStats::get(&stats.replied_ok), 1);
}

#[tokio::test]
async fn test_unknown_operation_gets_no_reply() {
    let wiring = Wiring::new(Duration::from_secs(1));
    let stats = wiring.backend("news.requests", Arc::new(EchoHandler));
    let mut replies = wiring.bus.subscribe("news.page.replies").unwrap();

    let request = Envelope::request(
        CorrelationId::new(),
        &ServiceIdentity::new("api-gateway", "it"),
        Operation::from("purge-everything"),
        json!({}),
    );
    wiring
        .bus
        .publish("news.requests", BusMessage::from_envelope(&request).unwrap())
        .await
        .unwrap();

    // A known operation behind it is still served, and only it is answered
    let reply = wiring
        .dispatcher
        .call(ExchangeRequest::new(Operation::FetchNewsPage, json!({})))
        .await
        .unwrap();
    assert!(reply.status.is_ok());
    assert_eq!(LoopStats::get(&stats.unknown_operations), 1);

    let first = replies.recv().await.unwrap().decode().unwrap();
    assert_eq!(first.correlation_id, reply.correlation_id);
    assert!(replies.try_recv().unwrap().is_none());
}

#[tokio::test]
async fn test_publish_after_close_is_transport_error() {
    let wiring = Wiring::new(Duration::from_secs(1));
    wiring.bus.close();

    let result = wiring.dispatcher.call(list_comments(1)).await;
    assert!(matches!(result, Err(ExchangeError::Transport(_))));
    assert_eq!(wiring.dispatcher.pending_count(), 0);
}
