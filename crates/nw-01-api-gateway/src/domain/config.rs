//! Gateway configuration with validation.

use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub http: HttpConfig,
    pub exchange: ExchangeConfig,
    pub limits: LimitsConfig,
    pub cors: CorsConfig,
}

impl GatewayConfig {
    /// A zero exchange deadline or body limit would fail every request.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.exchange.timeout.is_zero() {
            return Err(ConfigError::Zero("exchange.timeout"));
        }
        if self.limits.max_body_bytes == 0 {
            return Err(ConfigError::Zero("limits.max_body_bytes"));
        }
        Ok(())
    }

    pub fn http_addr(&self) -> SocketAddr {
        SocketAddr::new(self.http.host, self.http.port)
    }
}

/// Listen address
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub host: IpAddr,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExchangeConfig {
    /// Deadline for one publish/await-reply exchange
    #[serde(with = "duration_str")]
    pub timeout: Duration,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 64 * 1024,
        }
    }
}

/// Cross-origin policy for browser clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub enabled: bool,
    /// Allowed origins, `*` for any
    pub allowed_origins: Vec<String>,
    /// Preflight cache duration in seconds
    pub max_age: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            allowed_origins: vec!["*".to_string()],
            max_age: 3600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

/// Durations as `"3s"`, `"500ms"`, `"1m"` or plain seconds.
mod duration_str {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, out: S) -> Result<S::Ok, S::Error> {
        out.serialize_str(&format!("{}ms", value.as_millis()))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(input: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(input)?;
        parse_duration(&raw).map_err(serde::de::Error::custom)
    }

    pub(super) fn parse_duration(raw: &str) -> Result<Duration, &'static str> {
        let raw = raw.trim();
        let split = raw
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(raw.len());
        let (digits, unit) = raw.split_at(split);
        let value: u64 = digits.parse().map_err(|_| "duration must start with a number")?;

        match unit.trim() {
            "ms" => Ok(Duration::from_millis(value)),
            "" | "s" => Ok(Duration::from_secs(value)),
            "m" => Ok(Duration::from_secs(value.saturating_mul(60))),
            _ => Err("unknown duration unit, expected ms, s or m"),
        }
    }
}
