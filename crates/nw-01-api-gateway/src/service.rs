//! API Gateway service - HTTP surface of the platform.
//!
//! | Route | Workflow |
//! |-------|----------|
//! | `GET /news/:rubric/:count` | single exchange, backend payload verbatim |
//! | `GET /newsDetailed?id_news=` | news + comments fan-out |
//! | `POST /comments?id_news=` | moderation, then persist |
//! | `GET /health` | identity and exchange counters |

use crate::domain::config::GatewayConfig;
use crate::domain::error::{ApiError, GatewayError};
use crate::domain::request_id::RequestId;
use crate::middleware::{create_cors_layer, RequestIdLayer};
use crate::params::{CommentBody, NewsIdParams, NewsPageParams};
use crate::workflows::{DetailedNews, WorkflowExecutor};
use axum::{
    extract::{DefaultBodyLimit, Path, Query, State},
    http::{StatusCode, Uri},
    routing::{get, post},
    Extension, Json, Router,
};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tower::ServiceBuilder;
use tracing::info;

/// API Gateway service state
pub struct ApiGatewayService {
    config: GatewayConfig,
    executor: Arc<WorkflowExecutor>,
}

impl ApiGatewayService {
    /// Create a new API Gateway service
    pub fn new(config: GatewayConfig, executor: Arc<WorkflowExecutor>) -> Result<Self, GatewayError> {
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        Ok(Self { config, executor })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Bind the configured address and serve until shutdown.
    pub async fn serve(self, shutdown: watch::Receiver<bool>) -> Result<(), GatewayError> {
        let addr = self.config.http_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{addr}: {e}")))?;
        self.serve_on(listener, shutdown).await
    }

    /// Serve on an already bound listener until shutdown.
    ///
    /// In-flight requests are allowed to finish once shutdown is signalled.
    pub async fn serve_on(
        self,
        listener: TcpListener,
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<(), GatewayError> {
        let addr = listener
            .local_addr()
            .map_err(|e| GatewayError::Bind(e.to_string()))?;
        info!(addr = %addr, "Starting HTTP server");

        let router = self.router();
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                while !*shutdown.borrow() {
                    if shutdown.changed().await.is_err() {
                        break;
                    }
                }
                info!("Received shutdown signal");
            })
            .await
            .map_err(|e| GatewayError::Serve(e.to_string()))?;

        info!("API Gateway stopped");
        Ok(())
    }

    /// Build the HTTP router with its middleware stack.
    pub fn router(&self) -> Router {
        let state = AppState {
            executor: Arc::clone(&self.executor),
        };

        let middleware = ServiceBuilder::new()
            .layer(RequestIdLayer::new())
            .layer(create_cors_layer(&self.config.cors));

        Router::new()
            .route("/news/:rubric/:count", get(news_page))
            .route("/newsDetailed", get(news_detailed))
            .route("/comments", post(submit_comment))
            .route("/health", get(health_check))
            .layer(DefaultBodyLimit::max(self.config.limits.max_body_bytes))
            .layer(middleware)
            .with_state(state)
    }
}

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    executor: Arc<WorkflowExecutor>,
}

async fn news_page(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Path((rubric, count)): Path<(String, String)>,
    uri: Uri,
) -> Result<Json<Value>, ApiError> {
    let params: NewsPageParams = query(&uri)?;
    let news_query = params.into_query(rubric, &count)?;
    let payload = state.executor.news_page(&request_id, news_query).await?;
    Ok(Json(payload))
}

async fn news_detailed(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    uri: Uri,
) -> Result<Json<DetailedNews>, ApiError> {
    let params: NewsIdParams = query(&uri)?;
    let detailed = state
        .executor
        .news_detailed(&request_id, params.id_news()?)
        .await?;
    Ok(Json(detailed))
}

/// Success is an empty 200; the stored id is only logged.
async fn submit_comment(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    uri: Uri,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let params: NewsIdParams = query(&uri)?;
    let id_news = params.id_news()?;
    let draft = CommentBody::parse(&body)?.into_draft(id_news);
    state.executor.submit_comment(&request_id, draft).await?;
    Ok(StatusCode::OK)
}

async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let dispatcher = state.executor.dispatcher();
    let mut exchanges: Vec<_> = dispatcher.registries().map(|r| r.snapshot()).collect();
    exchanges.sort_by(|a, b| a.topic.cmp(&b.topic));

    Json(json!({
        "status": "ok",
        "service": dispatcher.identity().to_string(),
        "version": env!("CARGO_PKG_VERSION"),
        "pending": dispatcher.pending_count(),
        "exchanges": exchanges,
    }))
}

/// Query string decoding with errors in the gateway's error shape.
fn query<T: DeserializeOwned>(uri: &Uri) -> Result<T, ApiError> {
    Query::<T>::try_from_uri(uri)
        .map(|Query(params)| params)
        .map_err(|e| ApiError::validation(e.body_text()))
}
