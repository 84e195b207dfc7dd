//! Cross-service integration tests.

#[cfg(test)]
mod support;

#[cfg(test)]
mod exchange_flows;

#[cfg(test)]
mod http_flows;
