use std::sync::Arc;

use crate::answer::AnswerEngine;
use crate::feedback::FeedbackLog;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AnswerEngine>,
    pub feedback: Arc<FeedbackLog>,
}
