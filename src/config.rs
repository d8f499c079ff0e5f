//! # Server Configuration
//!
//! Settings are read from the environment (after `.env` is loaded by `main`).
//! Everything except `DATABASE_URL` has a default.

use anyhow::{anyhow, Context, Result};
use std::env;

use crate::logging::LogFormat;

/// Default bind host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port
pub const DEFAULT_PORT: u16 = 8000;

/// Default size of the Postgres connection pool
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

/// Default origin allowed by CORS (the local frontend)
pub const DEFAULT_CORS_ALLOWED_ORIGINS: &str = "http://localhost:3000";

/// Runtime configuration for the API server
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_max_connections: u32,
    /// Comma-separated origin list, or `*` for any origin
    pub cors_allowed_origins: String,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            cors_allowed_origins: DEFAULT_CORS_ALLOWED_ORIGINS.to_string(),
            log_format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database_url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| anyhow!("DATABASE_URL must be set"))?;

        let port = match lookup("PORT") {
            Some(port) => port
                .trim()
                .parse::<u16>()
                .with_context(|| format!("Invalid PORT value: {}", port))?,
            None => defaults.port,
        };

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(max) => max
                .trim()
                .parse::<u32>()
                .with_context(|| format!("Invalid DB_MAX_CONNECTIONS value: {}", max))?,
            None => defaults.db_max_connections,
        };

        let log_format = match lookup("LOG_FORMAT") {
            Some(format) => format.parse::<LogFormat>()?,
            None => defaults.log_format,
        };

        Ok(Self {
            database_url,
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            db_max_connections,
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .unwrap_or(defaults.cors_allowed_origins),
            log_format,
        })
    }

    /// `host:port` string for the TCP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
