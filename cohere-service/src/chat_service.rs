//! Cohere chat service for non-streaming text generation.
//!
//! Minimal client around the Cohere v2 REST API:
//! - `POST {endpoint}/v2/chat` — chat completion (`stream=false`)
//!
//! Constructor validation:
//! - `cfg.api_key` must encode into an Authorization header
//! - `cfg.endpoint` must start with http:// or https://
//!
//! Errors are normalized via the unified error types in `error_handler`.

use std::time::{Duration, Instant};

use reqwest::header;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::{
    config::chat_model_config::ChatModelConfig,
    error_handler::{ChatError, LlmError, make_snippet, validate_http_endpoint},
};

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// Fixed behavioral instruction for the model.
    System,
    /// Caller-supplied content.
    User,
}

/// One message of a chat conversation.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    /// Message role.
    pub role: ChatRole,
    /// Plain text content.
    pub content: String,
}

impl ChatMessage {
    /// Builds a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    /// Builds a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Thin client for the Cohere chat API.
///
/// Constructed from a complete [`ChatModelConfig`]. Internally keeps a
/// preconfigured `reqwest::Client` (with timeout and default headers), so a
/// single instance can be shared for the process lifetime.
#[derive(Debug)]
pub struct CohereService {
    client: reqwest::Client,
    cfg: ChatModelConfig,
    url_chat: String,
}

impl CohereService {
    /// Creates a new [`CohereService`] from the given config.
    ///
    /// Validates the endpoint scheme and API key, then builds an HTTP client
    /// with default headers and a configurable timeout.
    ///
    /// # Errors
    /// - [`LlmError::Config`] if `cfg.endpoint` is not an http(s) URL
    /// - [`LlmError::Chat`] with `InvalidApiKey` if the key cannot be encoded
    /// - [`LlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: ChatModelConfig) -> Result<Self, LlmError> {
        let endpoint = cfg.endpoint.trim();
        validate_http_endpoint("COHERE_URL", endpoint)?;

        let timeout = cfg
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(60));

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", cfg.api_key))
                .map_err(|e| ChatError::InvalidApiKey(e.to_string()))?,
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        let base = endpoint.trim_end_matches('/').to_string();
        let url_chat = format!("{}/v2/chat", base);

        info!(
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            timeout_secs = cfg.timeout_secs.unwrap_or(60),
            "CohereService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_chat,
        })
    }

    /// Performs a **non-streaming** chat completion request (`/v2/chat`).
    ///
    /// Mapped options from config: `model`, `temperature`, `max_tokens`.
    ///
    /// Returns the first `text`-typed content block of the assistant reply,
    /// or `None` when the reply contains no text block. Callers decide how to
    /// substitute for an empty reply.
    ///
    /// # Errors
    /// - [`LlmError::Chat`] with `HttpStatus` for non-2xx responses
    /// - [`LlmError::HttpTransport`] for client/network failures
    /// - [`LlmError::Chat`] with `Decode` if the JSON cannot be parsed
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<Option<String>, LlmError> {
        let started = Instant::now();
        let body = ChatRequest::from_cfg(&self.cfg, messages);

        debug!(
            model = %self.cfg.model,
            endpoint = %self.cfg.endpoint,
            messages = messages.len(),
            "POST {}", self.url_chat
        );

        let resp = self.client.post(&self.url_chat).json(&body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_chat.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(
                %status,
                %url,
                %snippet,
                model = %self.cfg.model,
                latency_ms = started.elapsed().as_millis(),
                "Cohere /v2/chat returned non-success status"
            );

            return Err(ChatError::HttpStatus {
                status,
                url,
                snippet,
            }
            .into());
        }

        let out: ChatResponse = match resp.json().await {
            Ok(v) => v,
            Err(e) => {
                error!(
                    error = %e,
                    model = %self.cfg.model,
                    latency_ms = started.elapsed().as_millis(),
                    "failed to decode /v2/chat response"
                );
                return Err(ChatError::Decode(format!(
                    "serde error: {e}; expected `message.content[].text`"
                ))
                .into());
            }
        };

        let text = out
            .message
            .content
            .into_iter()
            .find(|block| block.kind == "text")
            .and_then(|block| block.text);

        info!(
            model = %self.cfg.model,
            latency_ms = started.elapsed().as_millis(),
            has_text = text.is_some(),
            "chat completion completed"
        );

        Ok(text)
    }

    /// The configured model identifier.
    pub fn model(&self) -> &str {
        &self.cfg.model
    }
}

/* ==========================
HTTP payloads & options
========================== */

/// Request body for `/v2/chat` (non-streaming).
#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

impl<'a> ChatRequest<'a> {
    /// Builds a request from config and conversation.
    fn from_cfg(cfg: &'a ChatModelConfig, messages: &'a [ChatMessage]) -> Self {
        Self {
            model: &cfg.model,
            messages,
            stream: false,
            temperature: cfg.temperature,
            max_tokens: cfg.max_tokens,
        }
    }
}

/// Minimal response for `/v2/chat`.
///
/// The assistant reply lives in `message.content`, a list of typed blocks;
/// only `text` blocks carry generated prose.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    text: Option<String>,
}
