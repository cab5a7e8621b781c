/// LLM Client — the single point of entry for all Vertex AI calls.
///
/// ARCHITECTURAL RULE: No other module may call the Vertex AI API directly.
/// All model interactions MUST go through this module.
///
/// There are deliberately no retries here: a single failed attempt routes
/// the request to the deterministic fallback answer instead.
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod token;

use crate::config::Config;
use token::{TokenError, TokenProvider};

const MAX_OUTPUT_TOKENS: u32 = 2000;
const TEMPERATURE: f32 = 0.6;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("Vertex AI project is not configured")]
    Unconfigured,

    #[error("could not obtain an access token: {0}")]
    Credential(#[from] TokenError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Vertex AI returned status {0}")]
    Api(u16),

    #[error("response envelope carried no candidate text")]
    MalformedResponse,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: CandidateContent,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

impl GenerateContentResponse {
    /// Extracts the first candidate's text, if any.
    pub fn text(self) -> Option<String> {
        self.candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.is_empty())
    }
}

/// The single Vertex AI client used by the answer pipeline.
pub struct VertexClient {
    http: reqwest::Client,
    tokens: TokenProvider,
    project: Option<String>,
    location: String,
    model: String,
}

impl VertexClient {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::builder()
                .connect_timeout(Duration::from_secs(3))
                .timeout(Duration::from_secs(30))
                .build()
                .expect("Failed to build HTTP client"),
            tokens: TokenProvider::new(config.oauth_token.clone()),
            project: config.project.clone(),
            location: config.location.clone(),
            model: config.model.clone(),
        }
    }

    /// Sends one generation request and returns the candidate text.
    ///
    /// Returns `Unconfigured` without touching the network when no project
    /// id is set. This is by far the longest-latency operation in the
    /// system; the caller blocks on exactly this one call per request.
    pub async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let project = self.project.as_deref().ok_or(LlmError::Unconfigured)?;
        let token = self.tokens.bearer_token().await?;

        let body = GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: MAX_OUTPUT_TOKENS,
                temperature: TEMPERATURE,
            },
        };

        let response = self
            .http
            .post(self.endpoint(project))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!("Vertex AI returned {status}: {detail}");
            return Err(LlmError::Api(status.as_u16()));
        }

        let envelope: GenerateContentResponse = response.json().await?;
        let text = envelope.text().ok_or(LlmError::MalformedResponse)?;

        debug!("Vertex AI call succeeded ({} chars)", text.len());
        Ok(text)
    }

    fn endpoint(&self, project: &str) -> String {
        format!(
            "https://{location}-aiplatform.googleapis.com/v1/projects/{project}/locations/{location}/publishers/google/models/{model}:generateContent",
            location = self.location,
            model = self.model,
        )
    }

    pub fn is_configured(&self) -> bool {
        self.project.is_some()
    }

    /// Whether a bearer token is currently obtainable. Diagnostic only.
    pub async fn credential_available(&self) -> bool {
        self.tokens.bearer_token().await.is_ok()
    }

    pub fn project(&self) -> Option<&str> {
        self.project.as_deref()
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(project: Option<&str>) -> Config {
        Config {
            project: project.map(str::to_string),
            location: "us-central1".to_string(),
            model: "gemini-1.5-flash".to_string(),
            oauth_token: None,
            port: 8080,
            rust_log: "info".to_string(),
            log_dir: std::path::PathBuf::from("logs"),
        }
    }

    #[test]
    fn endpoint_url_formatting() {
        let client = VertexClient::new(&test_config(Some("my-project")));
        assert_eq!(
            client.endpoint("my-project"),
            "https://us-central1-aiplatform.googleapis.com/v1/projects/my-project/locations/us-central1/publishers/google/models/gemini-1.5-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn generate_without_project_fails_before_any_network_call() {
        let client = VertexClient::new(&test_config(None));
        match client.generate("hello").await {
            Err(LlmError::Unconfigured) => {}
            other => panic!("expected Unconfigured, got {other:?}"),
        }
    }

    #[test]
    fn envelope_text_extraction() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"**Step 1** Apply for SSN"}]}}]}"#;
        let envelope: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(envelope.text().as_deref(), Some("**Step 1** Apply for SSN"));
    }

    #[test]
    fn envelope_with_no_candidates_yields_none() {
        let envelope: GenerateContentResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(envelope.text().is_none());
    }

    #[test]
    fn envelope_with_empty_text_yields_none() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":""}]}}]}"#;
        let envelope: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        assert!(envelope.text().is_none());
    }
}
