use std::time::Duration;
use thiserror::Error;

/// Heartbeat settings for every WebSocket connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatConfig {
    /// How often the server pings an idle client
    pub ping_interval: Duration,
    /// Extra grace after a ping before an unresponsive client is dropped
    pub ping_timeout: Duration,
}

impl HeartbeatConfig {
    /// Silence longer than this closes the connection
    pub fn idle_limit(&self) -> Duration {
        self.ping_interval + self.ping_timeout
    }
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self {
            ping_interval: Duration::from_secs(25),
            ping_timeout: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be a valid number, got '{value}'")]
    InvalidNumber { key: &'static str, value: String },

    #[error("{key} must be greater than zero")]
    ZeroDuration { key: &'static str },

    #[error("CORS_ORIGIN is not a valid header value: '{0}'")]
    InvalidOrigin(String),
}

/// Process configuration, read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    pub port: u16,
    pub cors_origin: String,
    pub environment: Environment,
    pub heartbeat: HeartbeatConfig,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            port: 5000,
            cors_origin: "http://localhost:3000".to_string(),
            environment: Environment::Development,
            heartbeat: HeartbeatConfig::default(),
        }
    }
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = lookup("PORT") {
            config.port = parse_number("PORT", &port)?;
        }

        if let Some(origin) = lookup("CORS_ORIGIN") {
            if axum::http::HeaderValue::from_str(&origin).is_err() {
                return Err(ConfigError::InvalidOrigin(origin));
            }
            config.cors_origin = origin;
        }

        if let Some(env) = lookup("APP_ENV") {
            config.environment = if env.eq_ignore_ascii_case("production") {
                Environment::Production
            } else {
                Environment::Development
            };
        }

        if let Some(interval) = lookup("PING_INTERVAL_MS") {
            config.heartbeat.ping_interval = parse_millis("PING_INTERVAL_MS", &interval)?;
        }

        if let Some(timeout) = lookup("PING_TIMEOUT_MS") {
            config.heartbeat.ping_timeout = parse_millis("PING_TIMEOUT_MS", &timeout)?;
        }

        Ok(config)
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}

fn parse_number<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidNumber {
            key,
            value: value.to_string(),
        })
}

fn parse_millis(key: &'static str, value: &str) -> Result<Duration, ConfigError> {
    let millis: u64 = parse_number(key, value)?;
    if millis == 0 {
        return Err(ConfigError::ZeroDuration { key });
    }
    Ok(Duration::from_millis(millis))
}
