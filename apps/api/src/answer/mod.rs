//! Answer orchestration — the end-to-end pipeline behind every topic route.
//!
//! Flow: compose prompt (with current reference snapshot) → Vertex AI
//! generate → sanitize; any failure anywhere degrades to the deterministic
//! fallback text. `answer` is total: the caller never sees an error, only
//! text, and failure detail goes to the logs.

use std::sync::Arc;

use tracing::{debug, warn};

pub mod fallback;
pub mod prompts;
pub mod sanitize;

use crate::llm_client::{LlmError, VertexClient};
use crate::reference::ReferenceCache;

pub struct AnswerEngine {
    vertex: VertexClient,
    reference: Arc<ReferenceCache>,
}

impl AnswerEngine {
    pub fn new(vertex: VertexClient, reference: Arc<ReferenceCache>) -> Self {
        Self { vertex, reference }
    }

    /// Answers one question. Single attempt, no retries: a failed call
    /// routes straight to the fallback responder.
    pub async fn answer(&self, task_system: &str, question: &str) -> String {
        let reference = self.reference.context();
        let prompt = prompts::compose(task_system, question, &reference);

        match self.vertex.generate(&prompt).await {
            Ok(text) => sanitize::sanitize(&text),
            Err(LlmError::Unconfigured) => {
                debug!("Vertex AI not configured; serving degraded answer");
                fallback::fallback_reply(question, &reference)
            }
            Err(e) => {
                warn!("Inference failed, serving degraded answer: {e}");
                fallback::fallback_reply(question, &reference)
            }
        }
    }

    pub fn vertex(&self) -> &VertexClient {
        &self.vertex
    }
}
