use std::sync::Arc;

use axum::http::HeaderValue;
use thiserror::Error;
use tracing::warn;

use crate::core::advice::AdviceGenerator;
use crate::core::sink::ExchangeSink;

/// Default listening port when `PORT` is not set.
const DEFAULT_PORT: u16 = 8080;

/// Startup configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid PORT value {value:?}: expected u16")]
    InvalidPort { value: String },
}

/// Shared state for all HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// Advice generator, constructed once at startup.
    pub advice: Arc<dyn AdviceGenerator>,
    /// Optional persistence sink; `None` when no credential file is configured.
    pub sink: Option<Arc<dyn ExchangeSink>>,
    /// Model identifier echoed back in advice responses.
    pub model: String,
}

/// Server configuration read from the environment at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port to bind on all interfaces.
    pub port: u16,
    /// CORS allow-list; empty means allow any origin.
    pub allowed_origins: Vec<HeaderValue>,
}

impl ServerConfig {
    /// Loads server configuration from environment variables.
    ///
    /// - `PORT` (default 8080)
    /// - `ALLOWED_ORIGINS` — comma-separated origins; entries that are not
    ///   valid header values are skipped with a warning.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidPort`] if `PORT` is set but not a u16.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(v) if !v.trim().is_empty() => v
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort { value: v })?,
            _ => DEFAULT_PORT,
        };

        let allowed_origins = std::env::var("ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(%origin, "skipping invalid entry in ALLOWED_ORIGINS");
                    None
                }
            })
            .collect();

        Ok(Self {
            port,
            allowed_origins,
        })
    }
}
