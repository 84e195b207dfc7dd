//! Middleware stack for the API Gateway.
//!
//! Layer order: Request → RequestId (span) → CORS → BodyLimit → Handler

pub mod cors;
pub mod request_id;

pub use cors::create_cors_layer;
pub use request_id::{RequestIdLayer, REQUEST_ID_HEADER};
