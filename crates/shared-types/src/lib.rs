//! # Shared Types Crate
//!
//! This crate contains the wire contract spoken between the gateway and the
//! backend services: the exchange [`Envelope`], its operation tags and status
//! sentinel, the operation payloads and the entities they carry.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: every type that crosses the bus is defined here.
//! - **Correlation**: a request and its reply share `correlation_id` and
//!   `operation`; nothing else is used to pair them.
//! - **Lenient Readers**: decoders ignore fields they do not know.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod entities;
pub mod envelope;
pub mod errors;
pub mod identity;
pub mod ipc;

pub use entities::*;
pub use envelope::{CorrelationId, Envelope, Operation, Status};
pub use errors::*;
pub use identity::ServiceIdentity;
pub use ipc::*;
