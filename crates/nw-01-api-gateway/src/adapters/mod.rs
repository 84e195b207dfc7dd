//! Adapters between internal error types and the HTTP boundary.

pub mod error_conversions;
