use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use cohere_service::error_handler::LlmError;
use serde::Serialize;
use thiserror::Error;

use crate::core::app_state::ConfigError;

/// Public application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Boot / config ---
    #[error(transparent)]
    Config(#[from] ConfigError),

    // --- IO / network / server ---
    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    // --- Request / routing ---
    /// Caller-supplied body failed schema validation; message names the field.
    #[error("{field}: {reason}")]
    Validation {
        field: &'static str,
        reason: &'static str,
    },

    /// Body could not be parsed into the request shape at all.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Body exceeded the configured size ceiling.
    #[error("request body too large")]
    PayloadTooLarge,

    #[error("Not Found")]
    NotFound { path: String },

    /// Advice generator unreachable or erroring; surfaced as a 5xx.
    #[error("{0}")]
    Upstream(#[from] LlmError),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            // startup-only
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,

            // 4xx
            AppError::Validation { .. } | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,

            // 5xx
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Bind(_) | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let AppError::Upstream(ref err) = self {
            tracing::error!(error = %err, "advice generation failed");
        }

        let status = self.status_code();
        let path = match &self {
            AppError::NotFound { path } => Some(path.clone()),
            _ => None,
        };
        let body = ErrorBody {
            error: self.to_string(),
            path,
        };
        (status, Json(body)).into_response()
    }
}

/// Handy result alias used across handlers.
pub type AppResult<T> = Result<T, AppError>;

/// Convert Axum body rejections to `AppError`.
///
/// The length-limit case keeps its 413; every other rejection (syntax,
/// type mismatch, wrong content type) collapses to a 400 with Axum's
/// own message.
impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(err: axum::extract::rejection::JsonRejection) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge
        } else {
            AppError::BadRequest(err.body_text())
        }
    }
}
