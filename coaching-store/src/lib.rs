//! Fire-and-forget persistence sink for coaching exchanges.
//!
//! This crate writes [`exchange::CoachingExchange`] records to Google
//! Firestore through its REST API:
//! - `POST {base}/v1/projects/{project}/databases/(default)/documents/coaching`
//!
//! Authentication uses a service-account credential file: the client email
//! and RSA key are used to mint short-lived self-signed JWTs which Google
//! APIs accept as Bearer tokens. Tokens are cached and refreshed shortly
//! before expiry.
//!
//! The sink offers no durability guarantees and no retries; callers are
//! expected to dispatch writes from a detached task and log failures.

/// Error types for credential loading and writes.
pub mod errors;

/// Service-account credential file parsing.
pub mod service_account;

/// The persisted exchange record.
pub mod exchange;

/// The Firestore REST client.
pub mod firestore;
