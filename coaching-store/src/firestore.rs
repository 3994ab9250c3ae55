//! Thin Firestore REST client for appending coaching exchanges.
//!
//! One write path only:
//! - `POST {base}/v1/projects/{project}/databases/(default)/documents/coaching`
//!
//! Auth uses self-signed service-account JWTs (RS256, `aud` fixed to the
//! Firestore service), which Google accepts directly as Bearer tokens. The
//! current token is cached behind an `RwLock` and re-minted about a minute
//! before expiry, so steady-state writes take the read path.

use std::time::{Duration, Instant};

use chrono::Utc;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::header;
use serde::Serialize;
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::errors::{Result, StoreError};
use crate::exchange::CoachingExchange;
use crate::service_account::ServiceAccountKey;

/// Firestore REST API base.
const API_BASE: &str = "https://firestore.googleapis.com";

/// JWT audience Google expects for self-signed Firestore tokens.
const JWT_AUDIENCE: &str = "https://firestore.googleapis.com/";

/// Token lifetime requested per mint.
const TOKEN_TTL_SECS: i64 = 3600;

/// Re-mint this long before the cached token expires.
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// Collection that receives exchange documents.
const COLLECTION: &str = "coaching";

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    sub: &'a str,
    aud: &'static str,
    iat: i64,
    exp: i64,
}

struct CachedToken {
    token: String,
    expires_at: i64,
}

/// Firestore-backed sink for [`CoachingExchange`] records.
///
/// Construct once at startup and share via `Arc`; the HTTP client and signing
/// key are reused for the process lifetime.
pub struct FirestoreService {
    client: reqwest::Client,
    signing_key: EncodingKey,
    client_email: String,
    url_create: String,
    token: RwLock<Option<CachedToken>>,
}

impl FirestoreService {
    /// Creates a new [`FirestoreService`] from a parsed service-account key.
    ///
    /// # Errors
    /// - [`StoreError::Jwt`] if the RSA private key is not valid PEM
    /// - [`StoreError::Transport`] if the HTTP client cannot be built
    pub fn new(key: ServiceAccountKey) -> Result<Self> {
        let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        let url_create = format!(
            "{API_BASE}/v1/projects/{}/databases/(default)/documents/{COLLECTION}",
            key.project_id
        );

        info!(
            project = %key.project_id,
            account = %key.client_email,
            "FirestoreService initialized"
        );

        Ok(Self {
            client,
            signing_key,
            client_email: key.client_email,
            url_create,
            token: RwLock::new(None),
        })
    }

    /// Appends one exchange document to the `coaching` collection.
    ///
    /// No retries are performed; a failed write is reported once and dropped
    /// by the caller.
    ///
    /// # Errors
    /// - [`StoreError::Jwt`] if a bearer token cannot be minted
    /// - [`StoreError::Transport`] for client/network failures
    /// - [`StoreError::HttpStatus`] for non-2xx responses
    pub async fn record_exchange(&self, exchange: CoachingExchange) -> Result<()> {
        let started = Instant::now();
        let token = self.bearer().await?;
        let body = encode_document(&exchange);

        debug!("POST {}", self.url_create);
        let resp = self
            .client
            .post(&self.url_create)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_create.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = text.chars().take(240).collect::<String>();

            error!(
                %status,
                %url,
                %snippet,
                latency_ms = started.elapsed().as_millis(),
                "Firestore createDocument returned non-success status"
            );

            return Err(StoreError::HttpStatus {
                status,
                url,
                snippet,
            });
        }

        debug!(
            latency_ms = started.elapsed().as_millis(),
            "coaching exchange recorded"
        );
        Ok(())
    }

    /// Returns a valid bearer token, minting a fresh one when the cached
    /// token is missing or close to expiry.
    async fn bearer(&self) -> Result<String> {
        let now = Utc::now().timestamp();

        if let Some(cached) = self.token.read().await.as_ref() {
            if cached.expires_at - now > TOKEN_REFRESH_MARGIN_SECS {
                return Ok(cached.token.clone());
            }
        }

        let mut guard = self.token.write().await;
        // Another writer may have refreshed while we waited for the lock.
        if let Some(cached) = guard.as_ref() {
            if cached.expires_at - now > TOKEN_REFRESH_MARGIN_SECS {
                return Ok(cached.token.clone());
            }
        }

        let expires_at = now + TOKEN_TTL_SECS;
        let claims = Claims {
            iss: &self.client_email,
            sub: &self.client_email,
            aud: JWT_AUDIENCE,
            iat: now,
            exp: expires_at,
        };
        let token = encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)?;

        debug!(expires_at, "minted service-account token");
        *guard = Some(CachedToken {
            token: token.clone(),
            expires_at,
        });
        Ok(token)
    }
}

/// Encodes an exchange as a Firestore REST document.
///
/// Firestore typed values: strings as `stringValue`, integers as decimal
/// strings under `integerValue`, timestamps as RFC3339 `timestampValue`.
/// Optional request fields are omitted entirely when absent.
fn encode_document(exchange: &CoachingExchange) -> Value {
    let mut fields = serde_json::Map::new();
    fields.insert(
        "prompt".into(),
        json!({ "stringValue": exchange.prompt }),
    );
    if let Some(days) = exchange.days_sober {
        fields.insert(
            "daysSober".into(),
            json!({ "integerValue": days.to_string() }),
        );
    }
    if let Some(level) = exchange.craving_level {
        fields.insert(
            "cravingLevel".into(),
            json!({ "integerValue": level.to_string() }),
        );
    }
    fields.insert(
        "language".into(),
        json!({ "stringValue": exchange.language }),
    );
    fields.insert(
        "advice".into(),
        json!({ "stringValue": exchange.advice }),
    );
    fields.insert(
        "createdAt".into(),
        json!({ "timestampValue": exchange.created_at.to_rfc3339() }),
    );
    json!({ "fields": fields })
}
