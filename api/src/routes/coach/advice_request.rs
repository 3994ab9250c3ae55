use serde::{Deserialize, Serialize};

use crate::error_handler::AppError;

/// Locale tags the coach can respond in.
///
/// Any other tag is rejected during deserialization; an absent tag defaults
/// to [`Language::EnZa`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum Language {
    /// South African English (primary locale).
    #[default]
    #[serde(rename = "en-ZA")]
    EnZa,
    /// isiZulu.
    #[serde(rename = "zu-ZA")]
    ZuZa,
    /// Afrikaans.
    #[serde(rename = "af-ZA")]
    AfZa,
}

impl Language {
    /// The wire/BCP-47 form of the tag.
    pub fn as_str(self) -> &'static str {
        match self {
            Language::EnZa => "en-ZA",
            Language::ZuZa => "zu-ZA",
            Language::AfZa => "af-ZA",
        }
    }
}

/// Request payload for POST /coach/advice.
///
/// Unknown extra fields are ignored. Type/shape errors (negative counts,
/// non-integers, unknown locales) are rejected by deserialization; the
/// semantic checks live in [`CoachingRequest::validate`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachingRequest {
    /// What the caller wants coaching on.
    pub prompt: String,
    /// Days sober, if the caller is tracking.
    #[serde(default)]
    pub days_sober: Option<u32>,
    /// Current craving level, 0..=10.
    #[serde(default)]
    pub craving_level: Option<u8>,
    /// Locale for the advice.
    #[serde(default)]
    pub language: Language,
}

impl CoachingRequest {
    /// Runs the semantic checks deserialization cannot express.
    ///
    /// # Errors
    /// Returns [`AppError::Validation`] naming the offending field.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.prompt.trim().is_empty() {
            return Err(AppError::Validation {
                field: "prompt",
                reason: "must be a non-empty string",
            });
        }
        if let Some(level) = self.craving_level {
            if level > 10 {
                return Err(AppError::Validation {
                    field: "cravingLevel",
                    reason: "must be an integer between 0 and 10",
                });
            }
        }
        Ok(())
    }

    /// Renders the fixed user-message template sent to the model.
    ///
    /// Absent optional fields are written as "unknown"; the prompt text is
    /// interpolated verbatim.
    pub fn user_message(&self) -> String {
        let days = self
            .days_sober
            .map_or_else(|| "unknown".to_string(), |d| d.to_string());
        let craving = self
            .craving_level
            .map_or_else(|| "unknown".to_string(), |c| c.to_string());
        format!(
            "Language: {}, Days sober: {}, Craving level: {}, Request: {}",
            self.language.as_str(),
            days,
            craving,
            self.prompt
        )
    }
}

/// Response payload for POST /coach/advice.
#[derive(Debug, Serialize)]
pub struct AdviceResponse {
    /// Always true on the success path.
    pub ok: bool,
    /// Model identifier that produced the advice.
    pub model: String,
    /// Generated advice (or the fixed fallback string).
    pub advice: String,
}
