//! Per-HTTP-request identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Longest client-supplied request id accepted verbatim.
pub const MAX_REQUEST_ID_LEN: usize = 128;

/// Identifier carried by every HTTP request into logs and correlation ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(String);

impl RequestId {
    /// Generate a new request ID (UUID v7)
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Use the client's id when it is usable, otherwise generate one.
    ///
    /// Usable means non-empty, at most [`MAX_REQUEST_ID_LEN`] bytes and made
    /// of ASCII alphanumerics, `-` and `_`.
    pub fn from_client(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if is_usable(v) => Self(v.to_string()),
            _ => Self::generate(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn is_usable(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_REQUEST_ID_LEN
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
