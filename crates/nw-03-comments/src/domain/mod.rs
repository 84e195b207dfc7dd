//! Comments domain.

pub mod errors;

pub use errors::StoreError;
