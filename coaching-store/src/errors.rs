//! Unified error handling for `coaching-store`.
//!
//! All messages include the suffix `[Coaching Store]` to simplify attribution
//! in logs.

use reqwest::StatusCode;
use thiserror::Error;

/// Result alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Top-level error for the `coaching-store` crate.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// The credential file could not be read.
    #[error("[Coaching Store] failed to read credential file {path}: {source}")]
    Credentials {
        /// Path to the service-account file.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The credential file is not a valid service-account JSON document.
    #[error("[Coaching Store] invalid service-account file {path}: {source}")]
    BadCredentials {
        /// Path to the service-account file.
        path: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },

    /// The RSA key could not be loaded or the JWT could not be signed.
    #[error("[Coaching Store] token signing failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// Underlying HTTP transport error.
    #[error("[Coaching Store] transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Firestore returned a non-successful HTTP status.
    #[error("[Coaching Store] unexpected HTTP status {status} from {url}: {snippet}")]
    HttpStatus {
        /// Numeric HTTP status code.
        status: StatusCode,
        /// Request URL.
        url: String,
        /// Short snippet of the response body (trimmed).
        snippet: String,
    },
}
