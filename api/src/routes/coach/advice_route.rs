//! POST /coach/advice — validates the request, asks the model, responds,
//! then dispatches the fire-and-forget persistence write.

use axum::{Json, extract::State, extract::rejection::JsonRejection};
use chrono::Utc;
use cohere_service::chat_service::ChatMessage;
use coaching_store::exchange::CoachingExchange;
use tracing::{debug, error, instrument};

use crate::{
    core::app_state::AppState,
    error_handler::AppResult,
    routes::coach::advice_request::{AdviceResponse, CoachingRequest},
};

/// Fixed behavioral instruction sent as the system message.
const SYSTEM_PROMPT: &str = "You are SoberStride Coach, a compassionate sobriety mentor. \
     Respond briefly (150-220 words) with encouragement and practical advice.";

/// Substituted when the model reply carries no text block.
const FALLBACK_ADVICE: &str = "Unable to generate advice right now.";

/// Handler: POST /coach/advice
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8080/coach/advice \
///   -H 'content-type: application/json' \
///   -d '{"prompt":"I want to relapse tonight","daysSober":14,"cravingLevel":8}'
/// ```
///
/// The response never waits on the persistence write: the exchange record is
/// handed to a detached task, and any failure there is logged and dropped.
#[instrument(name = "coach_advice_route", skip(state, body))]
pub async fn coach_advice(
    State(state): State<AppState>,
    body: Result<Json<CoachingRequest>, JsonRejection>,
) -> AppResult<Json<AdviceResponse>> {
    let Json(request) = body?;
    request.validate()?;

    let messages = vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(request.user_message()),
    ];

    let advice = state
        .advice
        .generate(messages)
        .await?
        .unwrap_or_else(|| FALLBACK_ADVICE.to_string());

    if let Some(sink) = state.sink.clone() {
        let exchange = CoachingExchange {
            prompt: request.prompt,
            days_sober: request.days_sober,
            craving_level: request.craving_level,
            language: request.language.as_str().to_string(),
            advice: advice.clone(),
            created_at: Utc::now(),
        };
        tokio::spawn(async move {
            if let Err(err) = sink.record(exchange).await {
                error!(error = %err, "coaching exchange write failed");
            }
        });
    } else {
        debug!("persistence sink not configured; skipping exchange write");
    }

    Ok(Json(AdviceResponse {
        ok: true,
        model: state.model.clone(),
        advice,
    }))
}
