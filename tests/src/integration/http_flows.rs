//! # HTTP Flows
//!
//! Requests enter through the gateway router and travel the bus to real
//! backends. Spies on request topics show exactly what was published.

use super::support::{drain, news_item, Harness};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use node_runtime::container::RuntimeConfig;
use node_runtime::NodeRuntime;
use nw_01_api_gateway::{
    spawn_reply_routers, ApiGatewayService, CorrelationDispatcher, GatewayConfig, WorkflowExecutor,
};
use nw_03_comments::CommentStore;
use serde_json::{json, Value};
use shared_bus::{BusSubscriber, ExchangeHandler, ExchangeLoop, ExchangeTopics, InMemoryBus};
use shared_types::{DomainError, Operation, ServiceIdentity};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower::ServiceExt;

// =============================================================================
// NEWS PAGE
// =============================================================================

/// News backend that answers every page with the same canned payload.
struct CannedNews(Value);

#[async_trait]
impl ExchangeHandler for CannedNews {
    async fn handle(&self, _operation: &Operation, _payload: &Value) -> Result<Value, DomainError> {
        Ok(self.0.clone())
    }
}

#[tokio::test]
async fn test_news_page_payload_is_returned_verbatim() {
    let bus = Arc::new(InMemoryBus::new());
    let topics = ExchangeTopics::default();
    let dispatcher = Arc::new(CorrelationDispatcher::new(
        ServiceIdentity::new("api-gateway", "it"),
        bus.clone(),
        topics.clone(),
        Duration::from_secs(1),
    ));
    let (_shutdown_tx, shutdown_rx) = watch::channel(false);
    spawn_reply_routers(&dispatcher, bus.as_ref(), shutdown_rx.clone()).unwrap();

    let items: Vec<Value> = (0..8)
        .map(|i| json!({ "id": 20 - i, "title": format!("match {i}"), "rubric": "sport" }))
        .collect();
    let canned = json!({
        "news": items,
        "paginate": {
            "page_curr": 2,
            "page_count": 3,
            "page_count_list": 10,
            "page_count_total": 28
        }
    });

    let mut spy = bus.subscribe("news.requests").unwrap();
    let exchange_loop = ExchangeLoop::new(
        ServiceIdentity::new("news", "it"),
        Arc::new(CannedNews(canned.clone())),
        bus.clone(),
        bus.subscribe("news.requests").unwrap(),
        topics.reply_routes("news.requests"),
    );
    tokio::spawn(exchange_loop.run(shutdown_rx));

    let gateway = ApiGatewayService::new(
        GatewayConfig::default(),
        Arc::new(WorkflowExecutor::new(dispatcher)),
    )
    .unwrap();
    let response = gateway
        .router()
        .oneshot(
            Request::builder()
                .uri("/news/sport/10?page=2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, canned);

    let published = drain(&mut spy);
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].operation, Operation::FetchNewsPage);
    assert_eq!(published[0].payload["rubric"], "sport");
    assert_eq!(published[0].payload["count"], 10);
    assert_eq!(published[0].payload["page"], 2);
}

#[tokio::test]
async fn test_last_news_page_from_real_store() {
    let harness = Harness::start(&[]).await;
    harness.seed_news((0..28).map(|i| news_item("sport", &format!("match {i}"), 1_000 + i)).collect());
    harness.seed_news(vec![news_item("politics", "vote", 5_000)]);

    let (status, body) = harness.get("/news/sport/10?page=3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["news"].as_array().unwrap().len(), 8);
    assert_eq!(
        body["paginate"],
        json!({ "page_curr": 3, "page_count": 3, "page_count_list": 10, "page_count_total": 28 })
    );
    // Oldest items land on the last page
    assert_eq!(body["news"][7]["public_time"], 1_000);

    let (status, body) = harness.get("/news/sport/10?filter=MATCH%202").await;
    assert_eq!(status, StatusCode::OK);
    // "match 2" and "match 20".."match 27"
    assert_eq!(body["paginate"]["page_count_total"], 9);

    harness.stop().await;
}

#[tokio::test]
async fn test_largest_count_returns_everything_on_one_page() {
    let harness = Harness::start(&[]).await;
    harness.seed_news((0..28).map(|i| news_item("sport", &format!("match {i}"), 1_000 + i)).collect());

    let (status, body) = harness.get("/news/sport/9223372036854775807").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["news"].as_array().unwrap().len(), 28);
    assert_eq!(body["paginate"]["page_count"], 1);
    assert_eq!(body["paginate"]["page_count_list"], i64::MAX);

    harness.stop().await;
}

#[tokio::test]
async fn test_invalid_page_publishes_nothing() {
    let harness = Harness::start(&[]).await;
    let mut spy = harness.spy("news.requests");

    let (status, body) = harness.get("/news/sport/ten").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_request");

    let (status, _) = harness.get("/news/sport/10?page=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(drain(&mut spy).is_empty());
    harness.stop().await;
}

// =============================================================================
// COMMENTS
// =============================================================================

#[tokio::test]
async fn test_rejected_comment_is_never_persisted() {
    let harness = Harness::start(&["bad"]).await;
    let mut moderation_spy = harness.spy("moderation.requests");
    let mut comments_spy = harness.spy("comments.requests");

    let (status, body) = harness
        .post(
            "/comments?id_news=5",
            json!({ "comment_time": 1000, "user_name": "a", "content": "bad" }),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "rejected");
    assert_eq!(drain(&mut moderation_spy).len(), 1);
    assert!(drain(&mut comments_spy).is_empty());
    assert!(harness.runtime.container().comment_store.is_empty());

    harness.stop().await;
}

#[tokio::test]
async fn test_accepted_comment_shows_up_in_detailed_news() {
    let harness = Harness::start(&["bad"]).await;
    harness.seed_news(vec![news_item("it", "rust 2.0 released", 1_700_000_000)]);

    let (status, body) = harness
        .post(
            "/comments?id_news=1",
            json!({ "comment_time": 1000, "user_name": "reader", "content": "great news" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::Null);

    let stored = harness
        .runtime
        .container()
        .comment_store
        .by_news(1)
        .unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].user_name, "reader");

    let (status, body) = harness.get("/newsDetailed?id_news=1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["idNews"], 1);
    assert_eq!(body["news"][0]["title"], "rust 2.0 released");
    assert_eq!(body["comments"][0]["content"], "great news");
    assert_eq!(body["comments"][0]["id_news"], 1);

    harness.stop().await;
}

#[tokio::test]
async fn test_malformed_comment_body_publishes_nothing() {
    let harness = Harness::start(&[]).await;
    let mut moderation_spy = harness.spy("moderation.requests");

    let request = Request::builder()
        .method("POST")
        .uri("/comments?id_news=1")
        .body(Body::from("{\"content\": "))
        .unwrap();
    let response = harness.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(drain(&mut moderation_spy).is_empty());

    harness.stop().await;
}

// =============================================================================
// FAN-OUT
// =============================================================================

#[tokio::test]
async fn test_detailed_news_degrades_when_news_side_fails() {
    let harness = Harness::start(&[]).await;

    // Comments exist for an id the news store does not know
    let (status, _) = harness
        .post(
            "/comments?id_news=42",
            json!({ "comment_time": 1, "user_name": "u", "content": "first" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = harness.get("/newsDetailed?id_news=42").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["news"], json!([]));
    assert_eq!(body["comments"].as_array().unwrap().len(), 1);
    assert_eq!(body["idNews"], 42);

    harness.stop().await;
}

#[tokio::test]
async fn test_detailed_news_issues_both_exchanges_with_request_prefix() {
    let harness = Harness::start(&[]).await;
    let mut news_spy = harness.spy("news.requests");
    let mut comments_spy = harness.spy("comments.requests");

    let (status, _) = harness.get("/newsDetailed?id_news=3&request_id=trace-77").await;
    assert_eq!(status, StatusCode::OK);

    let news = drain(&mut news_spy);
    let comments = drain(&mut comments_spy);
    assert_eq!(news.len(), 1);
    assert_eq!(comments.len(), 1);
    assert_eq!(news[0].operation, Operation::FetchSingleNews);
    assert_eq!(comments[0].operation, Operation::ListComments);
    assert!(news[0].correlation_id.as_str().starts_with("trace-77."));
    assert!(comments[0].correlation_id.as_str().starts_with("trace-77."));
    assert_ne!(news[0].correlation_id, comments[0].correlation_id);

    harness.stop().await;
}

// =============================================================================
// FULL NODE
// =============================================================================

#[tokio::test]
async fn test_node_serves_http_until_shutdown() {
    let mut runtime =
        NodeRuntime::with_identity(RuntimeConfig::default(), ServiceIdentity::new("newswire", "it"))
            .unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    runtime.start_on(listener).unwrap();
    let addr = runtime.http_addr().unwrap();

    let client = reqwest::Client::new();
    let health: Value = client
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["pending"], 0);

    let response = client
        .get(format!("http://{addr}/news/it/5?request_id=abc"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert_eq!(response.headers()["x-request-id"], "abc");
    let page: Value = response.json().await.unwrap();
    assert_eq!(page["paginate"]["page_count_total"], 0);

    tokio::time::timeout(Duration::from_secs(10), runtime.shutdown())
        .await
        .unwrap();
    assert!(client
        .get(format!("http://{addr}/health"))
        .timeout(Duration::from_millis(500))
        .send()
        .await
        .is_err());
}
