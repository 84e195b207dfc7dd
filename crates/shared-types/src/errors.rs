//! # Error Types
//!
//! Defines the exchange error taxonomy shared by the gateway and backends.

use crate::envelope::{CorrelationId, Operation};
use thiserror::Error;

/// Errors raised while running one correlated exchange.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExchangeError {
    /// Publish or subscribe failed on the bus.
    #[error("Transport error: {0}")]
    Transport(String),

    /// No reply arrived before the deadline.
    #[error("Exchange timed out: {operation} after {timeout_ms}ms")]
    Timeout { operation: Operation, timeout_ms: u64 },

    /// A reply was delivered for a different exchange.
    #[error("Protocol mismatch: expected {expected_id}/{expected_op}, got {got_id}/{got_op}")]
    ProtocolMismatch {
        expected_id: CorrelationId,
        expected_op: Operation,
        got_id: CorrelationId,
        got_op: Operation,
    },

    /// Bytes on the bus did not form a valid envelope or payload.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Envelope could not be serialized.
    #[error("Encode error: {0}")]
    Encode(String),

    /// The correlation id is already waiting for a reply.
    #[error("Duplicate correlation id: {0}")]
    DuplicateCorrelation(CorrelationId),

    /// The delivery slot was dropped without a reply.
    #[error("Reply slot closed: {0}")]
    SlotClosed(CorrelationId),
}

/// Failure inside a backend domain handler.
///
/// Converted to a not-ok reply by the exchange loop; the detail stays in logs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// Moderation refused the content.
    #[error("Rejected: {0}")]
    Rejected(String),

    #[error("Storage failure: {0}")]
    Storage(String),
}

impl From<ExchangeError> for DomainError {
    fn from(err: ExchangeError) -> Self {
        DomainError::InvalidPayload(err.to_string())
    }
}
