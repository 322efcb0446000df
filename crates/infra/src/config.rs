//! Process configuration, read once at startup from the environment.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;

use wallet_observability::LogFormat;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_TOKEN_TTL_SECONDS: i64 = 3600;
/// 30 days.
pub const MAX_TOKEN_TTL_SECONDS: i64 = 30 * 24 * 3600;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_STORE_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Only for local development; see [`WalletConfig::uses_dev_secret`].
pub const DEV_JWT_SECRET: &str = "dev-secret-change-me";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} has invalid value '{value}': {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

impl ConfigError {
    fn invalid(name: &'static str, value: &str, reason: impl ToString) -> Self {
        Self::Invalid {
            name,
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl core::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish()
    }
}

#[derive(Clone)]
pub struct WalletConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    pub token_ttl: chrono::Duration,
    /// `None` selects the in-memory stores.
    pub database: Option<DatabaseConfig>,
    pub store_timeout: Duration,
    pub password_pepper: Option<String>,
    pub log_format: LogFormat,
}

impl core::fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WalletConfig")
            .field("bind_addr", &self.bind_addr)
            .field("token_ttl", &self.token_ttl)
            .field("database", &self.database)
            .field("store_timeout", &self.store_timeout)
            .field("password_pepper", &self.password_pepper.as_ref().map(|_| "<redacted>"))
            .field("log_format", &self.log_format)
            .finish_non_exhaustive()
    }
}

impl WalletConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// True when `JWT_SECRET` was not set and the development secret is in use.
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }

    /// Build from an arbitrary variable source (the environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind_raw = var("WALLET_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_raw
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::invalid("WALLET_BIND_ADDR", &bind_raw, e))?;

        let jwt_secret = var("JWT_SECRET").unwrap_or_else(|| DEV_JWT_SECRET.to_string());

        let ttl_seconds = parse_or("TOKEN_TTL_SECONDS", var("TOKEN_TTL_SECONDS"), DEFAULT_TOKEN_TTL_SECONDS)?;
        if !(1..=MAX_TOKEN_TTL_SECONDS).contains(&ttl_seconds) {
            return Err(ConfigError::invalid(
                "TOKEN_TTL_SECONDS",
                &ttl_seconds.to_string(),
                format!("must be between 1 and {MAX_TOKEN_TTL_SECONDS}"),
            ));
        }
        let token_ttl = chrono::Duration::try_seconds(ttl_seconds).ok_or_else(|| {
            ConfigError::invalid("TOKEN_TTL_SECONDS", &ttl_seconds.to_string(), "out of range")
        })?;

        let max_connections = parse_or(
            "DATABASE_MAX_CONNECTIONS",
            var("DATABASE_MAX_CONNECTIONS"),
            DEFAULT_MAX_CONNECTIONS,
        )?;
        let database = var("DATABASE_URL").map(|url| DatabaseConfig {
            url,
            max_connections,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        });

        let store_timeout_ms = parse_or("STORE_TIMEOUT_MS", var("STORE_TIMEOUT_MS"), DEFAULT_STORE_TIMEOUT_MS)?;
        if store_timeout_ms == 0 {
            return Err(ConfigError::invalid("STORE_TIMEOUT_MS", "0", "must be positive"));
        }

        let log_format = match var("LOG_FORMAT") {
            Some(raw) => raw
                .parse::<LogFormat>()
                .map_err(|e| ConfigError::invalid("LOG_FORMAT", &raw, e))?,
            None => LogFormat::default(),
        };

        Ok(Self {
            bind_addr,
            jwt_secret,
            token_ttl,
            database,
            store_timeout: Duration::from_millis(store_timeout_ms),
            password_pepper: var("PASSWORD_PEPPER"),
            log_format,
        })
    }
}

fn parse_or<T>(name: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: core::str::FromStr,
    T::Err: core::fmt::Display,
{
    match raw {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::invalid(name, &raw, e)),
        None => Ok(default),
    }
}
