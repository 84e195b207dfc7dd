#![cfg_attr(test, allow(clippy::unwrap_used))]

//! NW-01 API Gateway - synchronous HTTP surface over correlated bus exchanges.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                       API GATEWAY (nw-01)                         │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  HTTP (axum) ── RequestId → CORS → BodyLimit                      │
//! │        │                                                          │
//! │  ┌─────┴──────────────────────────┐                               │
//! │  │      Workflow Executor         │  page │ fan-out │ gated seq   │
//! │  └─────┬──────────────────────────┘                               │
//! │        │                                                          │
//! │  ┌─────┴──────────────────────────┐   ┌────────────────────────┐  │
//! │  │    Correlation Dispatcher      │──→│ Reply Registry (1/topic)│ │
//! │  └─────┬──────────────────────────┘   └──────────▲─────────────┘  │
//! │        │ publish                                 │ deliver        │
//! └────────┼─────────────────────────────────────────┼────────────────┘
//!          ▼                                         │
//!     request topics ──→ backends ──→ reply topics ──→ Reply Routers
//! ```
//!
//! # Guarantees
//!
//! - A registration exists before its request is published.
//! - Every exchange ends in exactly one of: reply, timeout, transport error.
//!   The registration is gone afterwards in every case.
//! - A reply reaches only the waiter whose correlation id it carries; replies
//!   for unknown or expired ids are counted and dropped.
//!
//! # Usage
//!
//! ```ignore
//! use nw_01_api_gateway::{ApiGatewayService, CorrelationDispatcher, GatewayConfig, WorkflowExecutor};
//!
//! let dispatcher = Arc::new(CorrelationDispatcher::new(identity, bus.clone(), topics, timeout));
//! spawn_reply_routers(&dispatcher, bus.as_ref(), shutdown_rx.clone())?;
//! let executor = Arc::new(WorkflowExecutor::new(dispatcher));
//! ApiGatewayService::new(GatewayConfig::default(), executor)?.serve(shutdown_rx).await?;
//! ```

pub mod adapters;
pub mod domain;
pub mod ipc;
pub mod middleware;
pub mod params;
pub mod service;
pub mod workflows;

pub use domain::{
    ApiError, ConfigError, CorsConfig, DeliveryOutcome, ExchangeConfig, GatewayConfig,
    GatewayError, HttpConfig, LimitsConfig, PendingReply, ReplyRegistry, RequestId, StatsSnapshot,
};
pub use ipc::{spawn_reply_routers, CorrelationDispatcher, ExchangeRequest, ReplyRouter};
pub use service::ApiGatewayService;
pub use workflows::{DetailedNews, WorkflowError, WorkflowExecutor};
