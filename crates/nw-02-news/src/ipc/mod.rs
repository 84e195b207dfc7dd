//! Bus-facing side of the news backend.

pub mod handler;

pub use handler::NewsExchangeHandler;
