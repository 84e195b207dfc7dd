//! Domain layer: configuration, errors, request ids and the reply registry.

pub mod config;
pub mod error;
pub mod pending;
pub mod request_id;

pub use config::{ConfigError, CorsConfig, ExchangeConfig, GatewayConfig, HttpConfig, LimitsConfig};
pub use error::{ApiError, GatewayError};
pub use pending::{DeliveryOutcome, ExchangeStats, PendingReply, ReplyRegistry, StatsSnapshot};
pub use request_id::RequestId;
