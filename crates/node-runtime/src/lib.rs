#![cfg_attr(test, allow(clippy::unwrap_used))]

//! # Newswire Node Runtime
//!
//! Hosts the API gateway and every backend service in one process, connected
//! by an in-memory bus.
//!
//! ```text
//!            HTTP
//!             │
//!        API Gateway ──publish──→ news.requests ───────→ News ──┐
//!             ▲                   comments.requests ───→ Comments├─reply─┐
//!             │                   moderation.requests ─→ Moderation┘      │
//!       Reply Routers ◄──────────────── reply topics ◄───────────────────┘
//!
//!   RSS feeds ──→ Ingestion Scheduler ──→ news store
//! ```
//!
//! ## Startup Sequence
//!
//! 1. Build services (stores, word list, feeds, dispatcher)
//! 2. Subscribe reply routers and backend exchange loops
//! 3. Start feed ingestion
//! 4. Bind and serve HTTP
//!
//! Every subscription exists before the first request can be published.
//!
//! ## Shutdown
//!
//! One watch signal stops the HTTP server, every loop and every feed worker.
//! The bus is closed afterwards so nothing is left waiting on it.

pub mod container;

use crate::container::services::{BackendService, ContainerError};
use crate::container::{RuntimeConfig, ServiceContainer};
use nw_01_api_gateway::{spawn_reply_routers, GatewayError};
use nw_02_news::{HttpFeedFetcher, IngestionHandle, IngestionScheduler};
use shared_bus::{BusError, BusSubscriber, ExchangeLoop, LoopStats};
use shared_types::ServiceIdentity;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// How long shutdown waits for each task before giving up on it.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error("bus error: {0}")]
    Bus(#[from] BusError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error("feed fetcher: {0}")]
    Ingestion(#[from] nw_02_news::FeedError),
}

/// Exchange loop counters of one backend.
pub struct BackendStats {
    pub service: String,
    pub stats: Arc<LoopStats>,
}

pub struct NodeRuntime {
    container: ServiceContainer,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: Vec<(String, JoinHandle<()>)>,
    ingestion: Option<IngestionHandle>,
    backend_stats: Vec<BackendStats>,
    http_addr: Option<SocketAddr>,
}

impl NodeRuntime {
    pub fn new(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        let identity = ServiceIdentity::from_env("newswire");
        Self::with_identity(config, identity)
    }

    pub fn with_identity(
        config: RuntimeConfig,
        identity: ServiceIdentity,
    ) -> Result<Self, RuntimeError> {
        info!(identity = %identity, "Creating Newswire node runtime");
        let container = ServiceContainer::new(config, identity)?;
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            container,
            shutdown_tx,
            shutdown_rx,
            tasks: Vec::new(),
            ingestion: None,
            backend_stats: Vec::new(),
            http_addr: None,
        })
    }

    pub fn container(&self) -> &ServiceContainer {
        &self.container
    }

    pub fn backend_stats(&self) -> &[BackendStats] {
        &self.backend_stats
    }

    /// Address the HTTP server is bound to, once started.
    pub fn http_addr(&self) -> Option<SocketAddr> {
        self.http_addr
    }

    /// Start everything and bind the configured HTTP address.
    pub async fn start(&mut self) -> Result<(), RuntimeError> {
        let addr = self.container.config.gateway.http_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{addr}: {e}")))?;
        self.start_on(listener)
    }

    /// Start everything, serving HTTP on `listener`.
    pub fn start_on(&mut self, listener: TcpListener) -> Result<(), RuntimeError> {
        info!("===========================================");
        info!("  Newswire Node Runtime v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        self.start_services()?;

        self.http_addr = listener.local_addr().ok();
        let gateway = self.container.gateway()?;
        let shutdown = self.shutdown_rx.clone();
        self.tasks.push((
            "http".to_string(),
            tokio::spawn(async move {
                if let Err(e) = gateway.serve_on(listener, shutdown).await {
                    error!(error = %e, "HTTP server failed");
                }
            }),
        ));

        info!(addr = ?self.http_addr, "Node is running");
        Ok(())
    }

    /// Start reply routers, backend loops and ingestion, without HTTP.
    pub fn start_services(&mut self) -> Result<(), RuntimeError> {
        let bus = Arc::clone(&self.container.bus);

        for handle in spawn_reply_routers(
            &self.container.dispatcher,
            bus.as_ref(),
            self.shutdown_rx.clone(),
        )? {
            self.tasks.push(("reply-router".to_string(), handle));
        }

        for backend in self.container.backends() {
            self.spawn_backend(backend)?;
        }

        if let Some(feeds) = &self.container.feeds {
            let fetcher = Arc::new(HttpFeedFetcher::new()?);
            let scheduler = IngestionScheduler::new(
                feeds.sources(),
                feeds.interval(),
                fetcher,
                self.container.news_store.clone(),
            );
            self.ingestion = Some(scheduler.spawn(self.shutdown_rx.clone()));
        }

        info!(tasks = self.tasks.len(), "Services started");
        Ok(())
    }

    fn spawn_backend(&mut self, backend: BackendService) -> Result<(), RuntimeError> {
        let BackendService {
            identity,
            request_topic,
            handler,
        } = backend;

        let bus = Arc::clone(&self.container.bus);
        let subscription = bus.subscribe(&request_topic)?;
        let routes = self.container.config.topics.reply_routes(&request_topic);
        let service = identity.service.clone();

        let exchange_loop = ExchangeLoop::new(identity, handler, bus, subscription, routes);
        self.backend_stats.push(BackendStats {
            service: service.clone(),
            stats: exchange_loop.stats(),
        });
        self.tasks.push((
            service,
            tokio::spawn(exchange_loop.run(self.shutdown_rx.clone())),
        ));
        Ok(())
    }

    /// Signal shutdown, close the bus and wait for every task.
    pub async fn shutdown(self) {
        info!("Initiating graceful shutdown...");

        if self.shutdown_tx.send(true).is_err() {
            warn!("No task was listening for shutdown");
        }

        for (name, task) in self.tasks {
            match tokio::time::timeout(SHUTDOWN_GRACE, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!(task = %name, error = %e, "Task ended abnormally"),
                Err(_) => warn!(task = %name, "Task did not stop in time"),
            }
        }

        if let Some(ingestion) = self.ingestion {
            if tokio::time::timeout(SHUTDOWN_GRACE, ingestion.join())
                .await
                .is_err()
            {
                warn!("Ingestion did not stop in time");
            }
        }

        self.container.bus.close();
        info!("Shutdown complete");
    }
}
