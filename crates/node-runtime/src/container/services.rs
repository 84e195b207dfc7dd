//! # Service Container
//!
//! Builds every service once at startup. Nothing here spawns tasks; the
//! runtime decides when loops start.

use super::config::RuntimeConfig;
use nw_01_api_gateway::{ApiGatewayService, CorrelationDispatcher, GatewayError, WorkflowExecutor};
use nw_02_news::{FeedError, FeedsConfig, InMemoryNewsStore, NewsExchangeHandler};
use nw_03_comments::{CommentsExchangeHandler, InMemoryCommentStore};
use nw_04_moderation::{ModerationError, ModerationExchangeHandler, WordListClassifier};
use shared_bus::{ExchangeHandler, InMemoryBus};
use shared_types::ServiceIdentity;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ContainerError {
    #[error(transparent)]
    Feeds(#[from] FeedError),

    #[error(transparent)]
    Moderation(#[from] ModerationError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

/// A backend service ready to be attached to its request topic.
pub struct BackendService {
    pub identity: ServiceIdentity,
    pub request_topic: String,
    pub handler: Arc<dyn ExchangeHandler>,
}

pub struct ServiceContainer {
    pub config: RuntimeConfig,
    pub identity: ServiceIdentity,
    pub bus: Arc<InMemoryBus>,
    pub dispatcher: Arc<CorrelationDispatcher>,
    pub news_store: Arc<InMemoryNewsStore>,
    pub comment_store: Arc<InMemoryCommentStore>,
    pub classifier: Arc<WordListClassifier>,
    pub feeds: Option<FeedsConfig>,
}

impl ServiceContainer {
    pub fn new(config: RuntimeConfig, identity: ServiceIdentity) -> Result<Self, ContainerError> {
        let bus = Arc::new(InMemoryBus::new());

        let dispatcher = Arc::new(CorrelationDispatcher::new(
            identity.for_service("api-gateway"),
            bus.clone(),
            config.topics.clone(),
            config.gateway.exchange.timeout,
        ));

        let classifier = match &config.moderation_words_path {
            Some(path) => {
                let classifier = WordListClassifier::load(path)?;
                info!(words = classifier.len(), path = %path.display(), "Moderation word list loaded");
                classifier
            }
            None => {
                warn!("No moderation word list configured, every comment will be allowed");
                WordListClassifier::default()
            }
        };

        let feeds = match &config.feeds_path {
            Some(path) => Some(FeedsConfig::load(path)?),
            None => {
                info!("No feeds configured, ingestion disabled");
                None
            }
        };

        Ok(Self {
            config,
            identity,
            bus,
            dispatcher,
            news_store: Arc::new(InMemoryNewsStore::new()),
            comment_store: Arc::new(InMemoryCommentStore::new()),
            classifier: Arc::new(classifier),
            feeds,
        })
    }

    /// News, comments and moderation, each bound to its request topic.
    pub fn backends(&self) -> Vec<BackendService> {
        let topics = &self.config.topics;
        vec![
            BackendService {
                identity: self.identity.for_service("news"),
                request_topic: topics.news_requests.clone(),
                handler: Arc::new(NewsExchangeHandler::new(self.news_store.clone())),
            },
            BackendService {
                identity: self.identity.for_service("comments"),
                request_topic: topics.comment_requests.clone(),
                handler: Arc::new(CommentsExchangeHandler::new(self.comment_store.clone())),
            },
            BackendService {
                identity: self.identity.for_service("moderation"),
                request_topic: topics.moderation_requests.clone(),
                handler: Arc::new(ModerationExchangeHandler::new(self.classifier.clone())),
            },
        ]
    }

    pub fn gateway(&self) -> Result<ApiGatewayService, ContainerError> {
        let executor = Arc::new(WorkflowExecutor::new(Arc::clone(&self.dispatcher)));
        Ok(ApiGatewayService::new(self.config.gateway.clone(), executor)?)
    }
}
