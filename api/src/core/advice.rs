use async_trait::async_trait;
use cohere_service::{
    chat_service::{ChatMessage, CohereService},
    error_handler::LlmError,
};

/// Seam between the HTTP layer and the hosted chat-completion provider.
///
/// `AppState` holds this as a trait object so tests can substitute a mock
/// that records calls or injects failures.
#[async_trait]
pub trait AdviceGenerator: Send + Sync {
    /// Runs one non-streaming completion over the given conversation.
    ///
    /// Returns `None` when the model reply carries no text block; the caller
    /// substitutes the fixed fallback string in that case.
    async fn generate(&self, messages: Vec<ChatMessage>) -> Result<Option<String>, LlmError>;
}

#[async_trait]
impl AdviceGenerator for CohereService {
    async fn generate(&self, messages: Vec<ChatMessage>) -> Result<Option<String>, LlmError> {
        self.chat(&messages).await
    }
}
