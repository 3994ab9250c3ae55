//! Thin client library for the Cohere v2 chat API.
//!
//! This crate wraps the two upstream calls the coaching backend needs:
//! - `POST {endpoint}/v2/chat` — synchronous chat completion (`stream=false`)
//! - `GET {endpoint}/v1/models` — best-effort health probe
//!
//! Configuration comes from the process environment via
//! [`config::chat_model_config::ChatModelConfig::from_env`], and all failures
//! are normalized into the unified error types in [`error_handler`].

/// Model/endpoint configuration loaded from the environment.
pub mod config;

/// The chat client itself.
pub mod chat_service;

/// Unified error types and env helpers.
pub mod error_handler;

/// Resilient health probe for the configured endpoint.
pub mod health_service;

/// Tracing filter helpers scoped to this crate.
pub mod telemetry;
