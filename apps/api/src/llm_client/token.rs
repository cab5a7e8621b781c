//! Bearer-token acquisition for the Vertex AI endpoint.
//!
//! Tokens come from one of three places, in precedence order: an unexpired
//! cached credential, the `GOOGLE_OAUTH_ACCESS_TOKEN` env override, or the
//! GCE metadata service. Concurrent callers may redundantly re-fetch; that
//! is accepted (the fetch is idempotent and self-correcting).

use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

const METADATA_TOKEN_URL: &str =
    "http://metadata.google.internal/computeMetadata/v1/instance/service-accounts/default/token";

/// Assumed validity window for an env-override token.
const OVERRIDE_TOKEN_TTL: Duration = Duration::from_secs(3300);

/// Subtracted from the advertised `expires_in` so a token is refreshed
/// before the API starts rejecting it. Floor for the effective lifetime.
const EXPIRY_MARGIN_SECS: u64 = 30;
const MIN_LIFETIME_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("metadata service request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("metadata service returned status {0}")]
    Status(u16),
}

#[derive(Debug, Clone)]
struct Credential {
    value: String,
    expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct MetadataToken {
    #[serde(default)]
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    300
}

/// Process-wide credential provider with a single-slot cache.
pub struct TokenProvider {
    http: reqwest::Client,
    override_token: Option<String>,
    cache: Mutex<Option<Credential>>,
}

impl TokenProvider {
    pub fn new(override_token: Option<String>) -> Self {
        Self {
            http: reqwest::Client::builder()
                .connect_timeout(Duration::from_millis(1500))
                .timeout(Duration::from_millis(2000))
                .build()
                .expect("Failed to build HTTP client"),
            override_token,
            cache: Mutex::new(None),
        }
    }

    /// Returns a bearer token valid for at least the expiry margin.
    ///
    /// Never panics; every failure surfaces as a `TokenError`, which the
    /// inference client folds into its own failure path.
    pub async fn bearer_token(&self) -> Result<String, TokenError> {
        if let Some(cached) = self.cached() {
            return Ok(cached);
        }

        if let Some(token) = &self.override_token {
            self.store(token.clone(), OVERRIDE_TOKEN_TTL);
            return Ok(token.clone());
        }

        let response = self
            .http
            .get(METADATA_TOKEN_URL)
            .header("Metadata-Flavor", "Google")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TokenError::Status(status.as_u16()));
        }

        let body: MetadataToken = response.json().await?;
        let lifetime = body
            .expires_in
            .saturating_sub(EXPIRY_MARGIN_SECS)
            .max(MIN_LIFETIME_SECS);

        debug!("Obtained metadata token, effective lifetime {lifetime}s");
        self.store(body.access_token.clone(), Duration::from_secs(lifetime));

        Ok(body.access_token)
    }

    fn cached(&self) -> Option<String> {
        let guard = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        guard
            .as_ref()
            .filter(|c| c.expires_at > Instant::now())
            .map(|c| c.value.clone())
    }

    fn store(&self, value: String, lifetime: Duration) {
        let mut guard = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(Credential {
            value,
            expires_at: Instant::now() + lifetime,
        });
    }
}
