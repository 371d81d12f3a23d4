//! Process configuration read from the environment.

use std::net::SocketAddr;

use thiserror::Error;

use crate::middleware::GateConfig;

pub const BIND_ENV: &str = "FLEETDESK_BIND";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const SESSION_COOKIE_ENV: &str = "SESSION_COOKIE";
pub const DEFAULT_BIND: &str = "0.0.0.0:8080";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid FLEETDESK_BIND '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("SESSION_COOKIE must not be empty")]
    EmptyCookieName,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Shared HS256 secret. `None` means no session can ever verify.
    pub jwt_secret: Option<String>,
    pub gate: GateConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (the environment in production).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let bind = lookup(BIND_ENV).unwrap_or_else(|| DEFAULT_BIND.to_string());
        let bind_addr = bind
            .parse()
            .map_err(|source| ConfigError::InvalidBindAddr {
                value: bind.clone(),
                source,
            })?;

        let jwt_secret = lookup(JWT_SECRET_ENV).filter(|s| !s.is_empty());

        let mut gate = GateConfig::default();
        if let Some(name) = lookup(SESSION_COOKIE_ENV) {
            if name.trim().is_empty() {
                return Err(ConfigError::EmptyCookieName);
            }
            gate.cookie_name = name.trim().to_string();
        }

        Ok(Self {
            bind_addr,
            jwt_secret,
            gate,
        })
    }

    /// Default bind address and gate, with the given secret.
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            jwt_secret: Some(secret.into()),
            gate: GateConfig::default(),
        }
    }
}
