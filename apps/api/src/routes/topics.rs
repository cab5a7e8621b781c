//! Axum route handlers for the topic endpoints.
//!
//! Each handler is a thin string-formatting wrapper: validate the body,
//! build a `(system, user)` prompt pair, hand it to the answer engine.
//! The engine is total, so these handlers only ever fail on validation.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::routes::{check_field_lengths, require_fields};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub result: String,
}

fn respond(result: String) -> Json<AnswerResponse> {
    Json(AnswerResponse { result })
}

// ────────────────────────────────────────────────────────────────────────────
// Request bodies
// ────────────────────────────────────────────────────────────────────────────

// Optional fields default to empty strings so "missing" and "empty" are
// handled identically by the required-field check.

#[derive(Debug, Deserialize)]
pub struct VisaRequest {
    #[serde(default, rename = "type")]
    pub visa_type: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub situation: String,
}

#[derive(Debug, Deserialize)]
pub struct TaxRequest {
    #[serde(default)]
    pub form: String,
    /// The UI sends a string, but numeric JSON is accepted too; missing
    /// income renders as `$0`.
    #[serde(default = "default_income", deserialize_with = "string_or_number")]
    pub income: String,
    #[serde(default)]
    pub visa: String,
    #[serde(default)]
    pub state: String,
}

#[derive(Debug, Deserialize)]
pub struct RideshareRequest {
    #[serde(default)]
    pub app: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub topic: String,
}

#[derive(Debug, Deserialize)]
pub struct HousingRequest {
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub budget: String,
    #[serde(default)]
    pub situation: String,
}

#[derive(Debug, Deserialize)]
pub struct HealthTopicRequest {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub situation: String,
}

#[derive(Debug, Deserialize)]
pub struct LicenseRequest {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub situation: String,
}

#[derive(Debug, Deserialize)]
pub struct SsnRequest {
    #[serde(default)]
    pub visa: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub situation: String,
}

#[derive(Debug, Deserialize)]
pub struct BankRequest {
    #[serde(default)]
    pub situation: String,
}

#[derive(Debug, Deserialize)]
pub struct PhoneRequest {
    #[serde(default)]
    pub topic: String,
}

#[derive(Debug, Deserialize)]
pub struct CarRequest {
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub topic: String,
}

#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    #[serde(default)]
    pub topic: String,
}

#[derive(Debug, Deserialize)]
pub struct FlightsRequest {
    #[serde(default)]
    pub airline: String,
    #[serde(default)]
    pub topic: String,
}

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: String,
}

fn default_income() -> String {
    "0".to_string()
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(serde_json::Number),
    }

    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Number(n) => n.to_string(),
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /visa
pub async fn handle_visa(
    State(state): State<AppState>,
    Json(request): Json<VisaRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    require_fields(&[("type", &request.visa_type)])?;
    check_field_lengths(&[
        ("type", &request.visa_type),
        ("state", &request.state),
        ("situation", &request.situation),
    ])?;

    let result = state
        .engine
        .answer(
            "You are a US immigration expert. Provide practical English guidance.",
            &format!(
                "{} visa. State: {}. Situation: {}. Documents, forms, fees, common mistakes, links.",
                request.visa_type, request.state, request.situation
            ),
        )
        .await;

    Ok(respond(result))
}

/// POST /tax
pub async fn handle_tax(
    State(state): State<AppState>,
    Json(request): Json<TaxRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    require_fields(&[("form", &request.form)])?;
    check_field_lengths(&[
        ("form", &request.form),
        ("income", &request.income),
        ("visa", &request.visa),
        ("state", &request.state),
    ])?;

    let result = state
        .engine
        .answer(
            "You are a US tax expert. Explain clearly in English.",
            &format!(
                "Form: {}. Income: ${}. Visa: {}. State: {}. Filing guide, refund estimate, deadlines.",
                request.form, request.income, request.visa, request.state
            ),
        )
        .await;

    Ok(respond(result))
}

/// POST /rideshare
pub async fn handle_rideshare(
    State(state): State<AppState>,
    Json(request): Json<RideshareRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    require_fields(&[("app", &request.app)])?;
    check_field_lengths(&[
        ("app", &request.app),
        ("state", &request.state),
        ("topic", &request.topic),
    ])?;

    let result = state
        .engine
        .answer(
            "You are a rideshare and gig economy expert. Write in English.",
            &format!(
                "{} - {}. Topic: {}. Documents, earnings, tax, tips.",
                request.app, request.state, request.topic
            ),
        )
        .await;

    Ok(respond(result))
}

/// POST /housing
pub async fn handle_housing(
    State(state): State<AppState>,
    Json(request): Json<HousingRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    check_field_lengths(&[
        ("city", &request.city),
        ("budget", &request.budget),
        ("situation", &request.situation),
    ])?;

    let result = state
        .engine
        .answer(
            "You are a US real estate expert. Write in English.",
            &format!(
                "{} ${} budget. Situation: {}. Websites, documents, negotiation tips.",
                request.city, request.budget, request.situation
            ),
        )
        .await;

    Ok(respond(result))
}

/// POST /health
pub async fn handle_health(
    State(state): State<AppState>,
    Json(request): Json<HealthTopicRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    check_field_lengths(&[("state", &request.state), ("situation", &request.situation)])?;

    let result = state
        .engine
        .answer(
            "You are a US healthcare system expert. Write practical English guidance.",
            &format!(
                "{} - {}. Addresses, documents, Medicaid, free clinics.",
                request.state, request.situation
            ),
        )
        .await;

    Ok(respond(result))
}

/// POST /license
pub async fn handle_license(
    State(state): State<AppState>,
    Json(request): Json<LicenseRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    check_field_lengths(&[("state", &request.state), ("situation", &request.situation)])?;

    let result = state
        .engine
        .answer(
            "You are a US DMV expert. Explain in English.",
            &format!(
                "{} driver's license: {}. 6 Points documents, exam, appointment, fees.",
                request.state, request.situation
            ),
        )
        .await;

    Ok(respond(result))
}

/// POST /ssn
pub async fn handle_ssn(
    State(state): State<AppState>,
    Json(request): Json<SsnRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    require_fields(&[("visa", &request.visa)])?;
    check_field_lengths(&[
        ("visa", &request.visa),
        ("state", &request.state),
        ("situation", &request.situation),
    ])?;

    let us_state = if request.state.trim().is_empty() {
        "NJ"
    } else {
        request.state.as_str()
    };

    let result = state
        .engine
        .answer(
            "You are a US SSN expert. Provide practical English guidance focused on NJ.",
            &format!(
                "Visa: {}. State: {}. Situation: {}. Required documents for SSN, application steps, \
                 NJ SSA office addresses, CPT/OPT requirements for F-1/J-1, ITIN alternative, common mistakes.",
                request.visa, us_state, request.situation
            ),
        )
        .await;

    Ok(respond(result))
}

/// POST /bank
pub async fn handle_bank(
    State(state): State<AppState>,
    Json(request): Json<BankRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    check_field_lengths(&[("situation", &request.situation)])?;

    let result = state
        .engine
        .answer(
            "You are a US banking expert. Write in English.",
            &format!(
                "Topic: {}. Which bank, documents, credit score, secured card.",
                request.situation
            ),
        )
        .await;

    Ok(respond(result))
}

/// POST /phone
pub async fn handle_phone(
    State(state): State<AppState>,
    Json(request): Json<PhoneRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    check_field_lengths(&[("topic", &request.topic)])?;

    let result = state
        .engine
        .answer(
            "You are a US telecom expert. Provide an English guide.",
            &format!(
                "Topic: {}. Step-by-step setup, prices, alternatives.",
                request.topic
            ),
        )
        .await;

    Ok(respond(result))
}

/// POST /car
pub async fn handle_car(
    State(state): State<AppState>,
    Json(request): Json<CarRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    check_field_lengths(&[("state", &request.state), ("topic", &request.topic)])?;

    let result = state
        .engine
        .answer(
            "You are a US automotive expert. Write in English.",
            &format!(
                "{} - {}. Documents, insurance, pricing, CarMax/Carvana.",
                request.state, request.topic
            ),
        )
        .await;

    Ok(respond(result))
}

/// POST /transfer
pub async fn handle_transfer(
    State(state): State<AppState>,
    Json(request): Json<TransferRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    check_field_lengths(&[("topic", &request.topic)])?;

    let result = state
        .engine
        .answer(
            "You are a money transfer expert. Explain in English.",
            &format!(
                "Topic: {}. Steps, fees, limits, alternatives.",
                request.topic
            ),
        )
        .await;

    Ok(respond(result))
}

/// POST /flights
pub async fn handle_flights(
    State(state): State<AppState>,
    Json(request): Json<FlightsRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    check_field_lengths(&[("airline", &request.airline), ("topic", &request.topic)])?;

    let result = state
        .engine
        .answer(
            "You are an aviation expert. Provide a practical English guide.",
            &format!(
                "{} - {}. Detailed info, fees, tips.",
                request.airline, request.topic
            ),
        )
        .await;

    Ok(respond(result))
}

/// POST /ask — free-form questions and UI follow-ups.
pub async fn handle_ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    check_field_lengths(&[("question", &request.question)])?;

    let result = state
        .engine
        .answer(
            "You are a practical guide expert for people living in the USA. \
             Give clear, step-by-step, safe answers in English.",
            &request.question,
        )
        .await;

    Ok(respond(result))
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

    fn fallback_state() -> AppState {
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
    async fn visa_requires_the_type_field() {
        let request = VisaRequest {
            visa_type: String::new(),
            state: "NJ".to_string(),
            situation: String::new(),
        };
        let err = handle_visa(State(fallback_state()), Json(request))
            .await
            .err()
            .expect("missing type must be rejected");
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn ask_degrades_to_fallback_when_unconfigured() {
        let request = AskRequest {
            question: "How do I get a phone plan?".to_string(),
        };
        let Json(response) = handle_ask(State(fallback_state()), Json(request))
            .await
            .unwrap();
        assert!(response
            .result
            .starts_with("⚠️ Vertex AI configuration is missing"));
        assert!(response.result.contains("How do I get a phone plan?"));
    }

    #[test]
    fn tax_income_accepts_numeric_json_and_defaults_to_zero() {
        let request: TaxRequest =
            serde_json::from_str(r#"{"form":"1040-NR","income":52000}"#).unwrap();
        assert_eq!(request.income, "52000");

        let request: TaxRequest =
            serde_json::from_str(r#"{"form":"1040-NR","income":"65k"}"#).unwrap();
        assert_eq!(request.income, "65k");

        let request: TaxRequest = serde_json::from_str(r#"{"form":"1040-NR"}"#).unwrap();
        assert_eq!(request.income, "0");
    }

    #[tokio::test]
    async fn oversized_fields_are_rejected() {
        let request = AskRequest {
            question: "x".repeat(crate::routes::MAX_FIELD_LENGTH + 1),
        };
        let err = handle_ask(State(fallback_state()), Json(request))
            .await
            .err()
            .expect("oversized field must be rejected");
        assert!(matches!(err, AppError::Validation(_)));
    }
}
