//! Test harness: a full runtime without a TCP listener, driven through the
//! axum router.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use node_runtime::container::RuntimeConfig;
use node_runtime::NodeRuntime;
use nw_02_news::NewsStore;
use serde_json::Value;
use shared_bus::{BusSubscriber, Subscription};
use shared_types::{Envelope, NewsItem, ServiceIdentity};
use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use tower::ServiceExt;

pub struct Harness {
    pub runtime: NodeRuntime,
    pub router: Router,
    _words: NamedTempFile,
}

impl Harness {
    /// Start every service with `words` as the moderation list.
    pub async fn start(words: &[&str]) -> Self {
        let mut file = NamedTempFile::new().unwrap();
        let list = serde_json::json!({ "offensive_words": words });
        file.write_all(list.to_string().as_bytes()).unwrap();

        let mut config = RuntimeConfig {
            moderation_words_path: Some(file.path().to_path_buf()),
            ..RuntimeConfig::default()
        };
        config.gateway.exchange.timeout = Duration::from_millis(500);

        let mut runtime =
            NodeRuntime::with_identity(config, ServiceIdentity::new("newswire", "it")).unwrap();
        runtime.start_services().unwrap();
        let router = runtime.container().gateway().unwrap().router();

        Self {
            runtime,
            router,
            _words: file,
        }
    }

    /// Extra subscriber on `topic` that sees every message published there.
    pub fn spy(&self, topic: &str) -> Subscription {
        self.runtime.container().bus.subscribe(topic).unwrap()
    }

    pub fn seed_news(&self, items: Vec<NewsItem>) {
        self.runtime.container().news_store.append(items).unwrap();
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.send(request).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = tokio::time::timeout(
            Duration::from_secs(5),
            self.router.clone().oneshot(request),
        )
        .await
        .unwrap()
        .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    pub async fn stop(self) {
        tokio::time::timeout(Duration::from_secs(10), self.runtime.shutdown())
            .await
            .unwrap();
    }
}

/// Everything currently buffered on a spy subscription.
pub fn drain(spy: &mut Subscription) -> Vec<Envelope> {
    let mut seen = Vec::new();
    while let Ok(Some(message)) = spy.try_recv() {
        seen.push(message.decode().unwrap());
    }
    seen
}

pub fn news_item(rubric: &str, title: &str, public_time: i64) -> NewsItem {
    NewsItem {
        title: title.to_string(),
        content: format!("{title} body"),
        rubric: rubric.to_string(),
        public_time,
        link: format!("https://{rubric}.example/{public_time}"),
        link_title: format!("{rubric} feed"),
        ..NewsItem::default()
    }
}
