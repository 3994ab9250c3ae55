use chrono::{DateTime, Utc};

/// One completed advice exchange, as persisted.
///
/// Constructed only after a successful model call; there is no update or
/// delete path. Optional request fields stay optional so that absent values
/// are omitted from the stored document rather than written as defaults.
#[derive(Debug, Clone)]
pub struct CoachingExchange {
    /// The caller's request text, verbatim.
    pub prompt: String,
    /// Days sober, when the caller supplied it.
    pub days_sober: Option<u32>,
    /// Craving level in 0..=10, when the caller supplied it.
    pub craving_level: Option<u8>,
    /// Locale tag the advice was requested in (e.g. "en-ZA").
    pub language: String,
    /// The generated advice (or the fixed fallback string).
    pub advice: String,
    /// Server-assigned timestamp.
    pub created_at: DateTime<Utc>,
}
