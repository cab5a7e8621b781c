use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::feedback::FeedbackRecord;
use crate::routes::{check_field_lengths, require_fields};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct FeedbackRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub contact: String,
}

#[derive(Debug, Serialize)]
pub struct FeedbackResponse {
    pub result: String,
    pub total_feedback: usize,
}

/// POST /feedback
pub async fn handle_feedback(
    State(state): State<AppState>,
    Json(request): Json<FeedbackRequest>,
) -> Result<Json<FeedbackResponse>, AppError> {
    require_fields(&[("message", &request.message)])?;
    check_field_lengths(&[("message", &request.message), ("contact", &request.contact)])?;

    let total = state.feedback.push(FeedbackRecord::new(
        request.message.trim().to_string(),
        request.contact.trim().to_string(),
    ));

    Ok(Json(FeedbackResponse {
        result: "Thank you! Your feedback has been received and added to the improvement list."
            .to_string(),
        total_feedback: total,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::AnswerEngine;
    use crate::config::Config;
    use crate::feedback::FeedbackLog;
    use crate::llm_client::VertexClient;
    use crate::reference::ReferenceCache;
    use std::sync::Arc;

    fn test_state() -> AppState {
        let config = Config {
            project: None,
            location: "us-central1".to_string(),
            model: "gemini-1.5-flash".to_string(),
            oauth_token: None,
            port: 8080,
            rust_log: "info".to_string(),
            log_dir: std::path::PathBuf::from("logs"),
        };
        AppState {
            engine: Arc::new(AnswerEngine::new(
                VertexClient::new(&config),
                Arc::new(ReferenceCache::new()),
            )),
            feedback: Arc::new(FeedbackLog::new()),
        }
    }

    #[tokio::test]
    async fn feedback_requires_a_message() {
        let request = FeedbackRequest {
            message: "  ".to_string(),
            contact: String::new(),
        };
        let err = handle_feedback(State(test_state()), Json(request))
            .await
            .err()
            .expect("empty message must be rejected");
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn feedback_is_recorded_and_counted() {
        let state = test_state();
        let request = FeedbackRequest {
            message: "Great guide!".to_string(),
            contact: "user@example.com".to_string(),
        };
        let Json(response) = handle_feedback(State(state.clone()), Json(request))
            .await
            .unwrap();
        assert_eq!(response.total_feedback, 1);
        assert_eq!(state.feedback.len(), 1);
    }
}
