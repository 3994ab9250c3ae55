//! HTTP front door for the SoberStride coaching backend.
//!
//! One exposed operation (`POST /coach/advice`) plus a static health check,
//! wired with restrictive default headers, a 1 MiB body ceiling, CORS from an
//! environment allow-list, and per-request trace logging. All handler errors
//! funnel through [`error_handler::AppError`].

use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderValue, Method, Uri, header},
    routing::{get, post},
};
use tokio::signal;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::{error, info};

use cohere_service::{
    chat_service::CohereService, config::chat_model_config::ChatModelConfig,
    health_service::HealthService,
};
use coaching_store::{firestore::FirestoreService, service_account::ServiceAccountKey};

pub mod core;
pub mod error_handler;
pub mod routes;

use crate::core::app_state::{AppState, ServerConfig};
use crate::core::sink::ExchangeSink;
use crate::error_handler::AppError;
use crate::routes::{coach::advice_route::coach_advice, health_route::health};

/// Request body ceiling (1 MiB).
const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Fixed sampling temperature for advice generation.
const TEMPERATURE: f32 = 0.4;

/// Fixed maximum output length for advice generation.
const MAX_TOKENS: u32 = 400;

/// Builds the application router over the given state.
///
/// Kept separate from [`start`] so tests can drive the router directly with
/// mock generators/sinks.
pub fn app(state: AppState, allowed_origins: Vec<HeaderValue>) -> Router {
    let cors = if allowed_origins.is_empty() {
        CorsLayer::permissive()
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed_origins))
            .allow_methods([Method::GET, Method::POST])
            .allow_headers([header::CONTENT_TYPE])
    };

    Router::new()
        .route("/health", get(health))
        .route("/coach/advice", post(coach_advice))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .with_state(state)
}

/// Loads configuration, constructs the process-lifetime clients, and serves
/// until Ctrl+C.
pub async fn start() -> Result<(), AppError> {
    let server_config = ServerConfig::from_env()?;

    let mut chat_config = ChatModelConfig::from_env()?;
    chat_config.temperature = Some(TEMPERATURE);
    chat_config.max_tokens = Some(MAX_TOKENS);

    let model = chat_config.model.clone();
    let advice = Arc::new(CohereService::new(chat_config.clone())?);

    // Best-effort reachability probe; logged from a detached task so a slow
    // upstream never delays binding the listener.
    tokio::spawn(async move {
        match HealthService::new(Some(10)) {
            Ok(probe) => {
                let status = probe.check(&chat_config).await;
                info!(
                    ok = status.ok,
                    latency_ms = status.latency_ms,
                    message = %status.message,
                    "advice generator startup probe"
                );
            }
            Err(err) => error!(error = %err, "could not build startup health probe"),
        }
    });

    let state = AppState {
        advice,
        sink: init_sink(),
        model,
    };

    let app = app(state, server_config.allowed_origins.clone());

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", server_config.port))
        .await
        .map_err(AppError::Bind)?;

    info!(port = server_config.port, "soberstride API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    Ok(())
}

/// Builds the persistence sink from `FIREBASE_SERVICE_ACCOUNT_PATH`.
///
/// Persistence is strictly optional: an unset variable, an unreadable file,
/// or a bad key disables the sink (logged once here) and never aborts
/// startup.
fn init_sink() -> Option<Arc<dyn ExchangeSink>> {
    let path = match std::env::var("FIREBASE_SERVICE_ACCOUNT_PATH") {
        Ok(p) if !p.trim().is_empty() => p,
        _ => {
            info!("persistence disabled - no service account configured");
            return None;
        }
    };

    let service = ServiceAccountKey::from_file(&path).and_then(FirestoreService::new);
    match service {
        Ok(svc) => {
            info!(%path, "persistence sink initialized");
            Some(Arc::new(svc))
        }
        Err(err) => {
            error!(%path, error = %err, "persistence initialization failed; continuing without it");
            None
        }
    }
}

/// Fallback for unmatched paths: structured 404 echoing the request path.
async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound {
        path: uri.path().to_string(),
    }
}

/// Returns a future that resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(err) = signal::ctrl_c().await {
        error!(error = %err, "failed to listen for shutdown signal");
    }
}
