//! # Newswire Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── support.rs          # Runtime harness, HTTP helpers
//!     ├── exchange_flows.rs   # Dispatcher ↔ bus ↔ backend properties
//!     └── http_flows.rs       # End-to-end HTTP workflows
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p nw-tests
//! cargo test -p nw-tests integration::http_flows
//!
//! # Benchmarks
//! cargo bench -p nw-tests
//! ```

pub mod integration;
