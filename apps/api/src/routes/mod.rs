pub mod feedback;
pub mod health;
pub mod topics;

use axum::{
    response::Html,
    routing::{get, post},
    Router,
};

use crate::errors::AppError;
use crate::state::AppState;

/// Ceiling on any string field in a request body, shared by all routes.
/// Also the only cap on follow-up prompt growth: the UI resends the whole
/// previous answer inside the question field.
pub const MAX_FIELD_LENGTH: usize = 2000;

async fn index() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/healthz", get(health::healthz_handler))
        // Topic routes — thin wrappers that build a (system, user) prompt
        // pair and hand it to the answer engine.
        .route("/visa", post(topics::handle_visa))
        .route("/tax", post(topics::handle_tax))
        .route("/rideshare", post(topics::handle_rideshare))
        .route("/housing", post(topics::handle_housing))
        .route("/health", post(topics::handle_health))
        .route("/license", post(topics::handle_license))
        .route("/ssn", post(topics::handle_ssn))
        .route("/bank", post(topics::handle_bank))
        .route("/phone", post(topics::handle_phone))
        .route("/car", post(topics::handle_car))
        .route("/transfer", post(topics::handle_transfer))
        .route("/flights", post(topics::handle_flights))
        .route("/ask", post(topics::handle_ask))
        .route("/feedback", post(feedback::handle_feedback))
        .with_state(state)
}

/// Rejects any field over the length ceiling. The wire message is fixed;
/// the offending field is only named in the log.
pub fn check_field_lengths(fields: &[(&str, &str)]) -> Result<(), AppError> {
    for (name, value) in fields {
        if value.chars().count() > MAX_FIELD_LENGTH {
            tracing::warn!("Rejecting oversized request field '{name}'");
            return Err(AppError::Validation(format!(
                "Request field exceeds maximum length ({MAX_FIELD_LENGTH} characters)."
            )));
        }
    }
    Ok(())
}

/// Rejects empty required fields with the names of everything missing.
pub fn require_fields(fields: &[(&str, &str)]) -> Result<(), AppError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "Missing field(s): {}",
            missing.join(", ")
        )))
    }
}
