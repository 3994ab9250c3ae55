use crate::error_handler::{Result, env_opt_u64, must_env, validate_http_endpoint};

/// Default API base when `COHERE_URL` is not set.
pub const DEFAULT_ENDPOINT: &str = "https://api.cohere.com";

/// Default model identifier when `COHERE_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "command-r";

/// Configuration for a Cohere chat invocation.
///
/// # Fields
///
/// - `model`: The model identifier (e.g., `"command-r"`).
/// - `endpoint`: API base URL (override for testing/self-hosted gateways).
/// - `api_key`: Bearer credential for the Cohere API.
/// - `max_tokens`: Maximum number of tokens to generate.
/// - `temperature`: Sampling temperature (0.0 = deterministic).
/// - `timeout_secs`: Optional request timeout in seconds.
#[derive(Debug, Clone)]
pub struct ChatModelConfig {
    /// Model identifier string.
    pub model: String,

    /// API base URL (no trailing path).
    pub endpoint: String,

    /// API key used as a Bearer token.
    pub api_key: String,

    /// Maximum number of tokens to generate.
    pub max_tokens: Option<u32>,

    /// Sampling temperature.
    pub temperature: Option<f32>,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}

impl ChatModelConfig {
    /// Loads the chat configuration from the process environment.
    ///
    /// Reads:
    /// - `COHERE_API_KEY` (required)
    /// - `COHERE_MODEL` (default: [`DEFAULT_MODEL`])
    /// - `COHERE_URL` (default: [`DEFAULT_ENDPOINT`])
    /// - `COHERE_TIMEOUT_SECS` (optional)
    ///
    /// # Errors
    /// Returns a config error if the API key is missing, the endpoint is not
    /// an http(s) URL, or the timeout is not a valid number.
    pub fn from_env() -> Result<Self> {
        let api_key = must_env("COHERE_API_KEY")?;

        let model = std::env::var("COHERE_MODEL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let endpoint = std::env::var("COHERE_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        validate_http_endpoint("COHERE_URL", &endpoint)?;

        let timeout_secs = env_opt_u64("COHERE_TIMEOUT_SECS")?;

        Ok(Self {
            model,
            endpoint,
            api_key,
            max_tokens: None,
            temperature: None,
            timeout_secs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        for var in [
            "COHERE_API_KEY",
            "COHERE_MODEL",
            "COHERE_URL",
            "COHERE_TIMEOUT_SECS",
        ] {
            // Safety: tests in this module are serialized.
            unsafe { std::env::remove_var(var) };
        }
    }

    #[test]
    #[serial]
    fn from_env_requires_api_key() {
        clear_env();
        assert!(ChatModelConfig::from_env().is_err());
    }

    #[test]
    #[serial]
    fn from_env_applies_defaults() {
        clear_env();
        unsafe { std::env::set_var("COHERE_API_KEY", "test-key") };
        let cfg = ChatModelConfig::from_env().unwrap();
        assert_eq!(cfg.model, DEFAULT_MODEL);
        assert_eq!(cfg.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(cfg.api_key, "test-key");
        assert!(cfg.timeout_secs.is_none());
    }

    #[test]
    #[serial]
    fn from_env_rejects_bad_endpoint() {
        clear_env();
        unsafe {
            std::env::set_var("COHERE_API_KEY", "test-key");
            std::env::set_var("COHERE_URL", "ftp://example.com");
        }
        assert!(ChatModelConfig::from_env().is_err());
    }

    #[test]
    #[serial]
    fn from_env_reads_overrides() {
        clear_env();
        unsafe {
            std::env::set_var("COHERE_API_KEY", "test-key");
            std::env::set_var("COHERE_MODEL", "command-r-plus");
            std::env::set_var("COHERE_URL", "http://localhost:9009");
            std::env::set_var("COHERE_TIMEOUT_SECS", "15");
        }
        let cfg = ChatModelConfig::from_env().unwrap();
        assert_eq!(cfg.model, "command-r-plus");
        assert_eq!(cfg.endpoint, "http://localhost:9009");
        assert_eq!(cfg.timeout_secs, Some(15));
    }
}
