//! # Service Container
//!
//! Configuration and construction of every service hosted by the runtime.

pub mod config;
pub mod services;

pub use config::{ConfigError, RuntimeConfig};
pub use services::ServiceContainer;
