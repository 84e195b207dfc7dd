//! # Bus Message
//!
//! The transport unit. The bus never looks inside `payload`.

use bytes::Bytes;
use shared_types::{Envelope, ExchangeError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    /// Routing key. Envelopes use their correlation id.
    pub key: String,
    pub payload: Bytes,
}

impl BusMessage {
    pub fn new(key: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            payload: payload.into(),
        }
    }

    /// Serialize an envelope into a message keyed by its correlation id.
    pub fn from_envelope(envelope: &Envelope) -> Result<Self, ExchangeError> {
        Ok(Self::new(envelope.correlation_id.to_string(), envelope.to_vec()?))
    }

    /// Decode the payload as an envelope.
    pub fn decode(&self) -> Result<Envelope, ExchangeError> {
        Envelope::from_slice(&self.payload)
    }
}
