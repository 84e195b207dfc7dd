//! # Exchange Envelope
//!
//! The wire unit for every request and reply on the bus.
//!
//! ## Correlation Properties
//!
//! - **Pairing**: a reply carries the `correlation_id` and `operation` of the
//!   request it answers. Waiters never accept a reply that differs in either.
//! - **Status Sentinel**: `status` is not an HTTP code. It holds one fixed "ok"
//!   value or the default "not-ok" value, and both sides agree on the numbers.
//! - **Forward Compatibility**: unknown fields are ignored when decoding.

use crate::errors::ExchangeError;
use crate::identity::ServiceIdentity;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Opaque identifier shared by a request and its reply.
///
/// Fresh ids are UUID v7 strings. Ids derived from an HTTP `request_id` keep
/// the request id as a prefix so log lines of one request group together.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    /// Generate a new correlation ID (UUID v7).
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Derive a per-sub-exchange id from an inbound request id.
    ///
    /// One HTTP request may issue several exchanges (fan-out, gating), and
    /// every one of them needs its own id, so a random suffix is appended.
    pub fn derive(request_id: &str, operation: &Operation) -> Self {
        Self(format!(
            "{}.{}.{}",
            request_id,
            operation.as_str(),
            Uuid::now_v7().simple()
        ))
    }

    /// Wrap an existing string without validation.
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome sentinel carried by every envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Status {
    Ok,
    /// Failure, and the value requests carry before anyone handled them.
    #[default]
    NotOk,
}

impl Status {
    /// Wire value of the "ok" sentinel.
    pub const OK_CODE: i64 = 192;
    /// Wire value of the "not-ok" sentinel.
    pub const NOT_OK_CODE: i64 = 0;

    pub fn code(self) -> i64 {
        match self {
            Status::Ok => Self::OK_CODE,
            Status::NotOk => Self::NOT_OK_CODE,
        }
    }

    /// Any value other than the ok sentinel reads as not-ok.
    pub fn from_code(code: i64) -> Self {
        if code == Self::OK_CODE {
            Status::Ok
        } else {
            Status::NotOk
        }
    }

    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = i64::deserialize(deserializer)?;
        Ok(Status::from_code(code))
    }
}

/// Operation tag: selects the handler on the backend and the reply topic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operation {
    FetchNewsPage,
    FetchSingleNews,
    ListComments,
    SubmitComment,
    ModerateComment,
    /// Tag this build does not know. Kept so the loop can log it verbatim.
    Unknown(String),
}

impl Operation {
    pub fn as_str(&self) -> &str {
        match self {
            Operation::FetchNewsPage => "fetch-news-page",
            Operation::FetchSingleNews => "fetch-single-news",
            Operation::ListComments => "list-comments",
            Operation::SubmitComment => "submit-comment",
            Operation::ModerateComment => "moderate-comment",
            Operation::Unknown(tag) => tag,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Operation::Unknown(_))
    }
}

impl From<&str> for Operation {
    fn from(tag: &str) -> Self {
        match tag {
            "fetch-news-page" => Operation::FetchNewsPage,
            "fetch-single-news" => Operation::FetchSingleNews,
            "list-comments" => Operation::ListComments,
            "submit-comment" => Operation::SubmitComment,
            "moderate-comment" => Operation::ModerateComment,
            other => Operation::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Operation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Operation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Operation::from(tag.as_str()))
    }
}

/// The envelope itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Shared by request and reply.
    pub correlation_id: CorrelationId,

    /// Identity of the process that built this envelope.
    #[serde(default)]
    pub origin: String,

    #[serde(default)]
    pub status: Status,

    pub operation: Operation,

    /// Operation-specific fields. Empty object when a handler failed.
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Envelope {
    /// Build a request envelope. Requests carry the default status.
    pub fn request(
        correlation_id: CorrelationId,
        origin: &ServiceIdentity,
        operation: Operation,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            correlation_id,
            origin: origin.to_string(),
            status: Status::default(),
            operation,
            payload,
        }
    }

    /// Build the reply to this envelope, keeping its id and operation.
    pub fn reply(&self, origin: &ServiceIdentity, status: Status, payload: serde_json::Value) -> Self {
        Self {
            correlation_id: self.correlation_id.clone(),
            origin: origin.to_string(),
            status,
            operation: self.operation.clone(),
            payload,
        }
    }

    /// Not-ok reply with an empty payload.
    pub fn failure_reply(&self, origin: &ServiceIdentity) -> Self {
        self.reply(
            origin,
            Status::NotOk,
            serde_json::Value::Object(serde_json::Map::new()),
        )
    }

    /// True when `other` answers the same exchange as `self`.
    pub fn answers(&self, other: &Envelope) -> bool {
        self.correlation_id == other.correlation_id && self.operation == other.operation
    }

    pub fn to_vec(&self) -> Result<Vec<u8>, ExchangeError> {
        serde_json::to_vec(self).map_err(|e| ExchangeError::Encode(e.to_string()))
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, ExchangeError> {
        serde_json::from_slice(bytes).map_err(|e| ExchangeError::Decode(e.to_string()))
    }

    /// Decode the payload into an operation-specific type.
    pub fn decode_payload<T: DeserializeOwned>(&self) -> Result<T, ExchangeError> {
        T::deserialize(&self.payload).map_err(|e| ExchangeError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn identity() -> ServiceIdentity {
        ServiceIdentity::new("gateway", "host-a")
    }

    #[test]
    fn test_status_wire_values() {
        assert_eq!(serde_json::to_value(Status::Ok).unwrap(), json!(192));
        assert_eq!(serde_json::to_value(Status::NotOk).unwrap(), json!(0));
        assert_eq!(serde_json::from_value::<Status>(json!(192)).unwrap(), Status::Ok);
        // Anything but the sentinel is a failure
        assert_eq!(serde_json::from_value::<Status>(json!(200)).unwrap(), Status::NotOk);
    }

    #[test]
    fn test_operation_tags() {
        assert_eq!(Operation::from("fetch-news-page"), Operation::FetchNewsPage);
        assert_eq!(Operation::SubmitComment.as_str(), "submit-comment");
        let unknown = Operation::from("purge-everything");
        assert!(!unknown.is_known());
        assert_eq!(unknown.to_string(), "purge-everything");
    }

    #[test]
    fn test_decode_ignores_unknown_fields() {
        let raw = json!({
            "correlation_id": "abc",
            "origin": "news@host",
            "status": 192,
            "operation": "list-comments",
            "payload": {"comments": []},
            "partition": 7,
            "trace": {"span": "x"}
        });
        let bytes = serde_json::to_vec(&raw).unwrap();
        let envelope = Envelope::from_slice(&bytes).unwrap();
        assert_eq!(envelope.correlation_id.as_str(), "abc");
        assert!(envelope.status.is_ok());
        assert_eq!(envelope.operation, Operation::ListComments);
    }

    #[test]
    fn test_decode_missing_payload_defaults() {
        let bytes = br#"{"correlation_id":"x","operation":"fetch-single-news"}"#;
        let envelope = Envelope::from_slice(bytes).unwrap();
        assert_eq!(envelope.status, Status::NotOk);
        assert!(envelope.payload.is_null());
    }

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let err = Envelope::from_slice(b"{not json").unwrap_err();
        assert!(matches!(err, ExchangeError::Decode(_)));
    }

    #[test]
    fn test_reply_keeps_correlation_and_operation() {
        let request = Envelope::request(
            CorrelationId::from_string("req-1"),
            &identity(),
            Operation::FetchSingleNews,
            json!({"id_news": 5}),
        );
        let reply = request.reply(&ServiceIdentity::new("news", "host-b"), Status::Ok, json!({"news": []}));
        assert!(reply.answers(&request));
        assert_eq!(reply.origin, "news@host-b");

        let failed = request.failure_reply(&identity());
        assert_eq!(failed.status, Status::NotOk);
        assert_eq!(failed.payload, json!({}));
    }

    #[test]
    fn test_derived_ids_are_distinct() {
        let a = CorrelationId::derive("req-9", &Operation::FetchSingleNews);
        let b = CorrelationId::derive("req-9", &Operation::FetchSingleNews);
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("req-9.fetch-single-news."));
    }
}
