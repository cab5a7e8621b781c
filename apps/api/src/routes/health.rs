use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /healthz
///
/// Read-only diagnostic: reports whether inference is usable right now
/// (project configured AND a token currently obtainable) plus the active
/// region and model. Not on the answer path.
pub async fn healthz_handler(State(state): State<AppState>) -> Json<Value> {
    let vertex = state.engine.vertex();
    let vertex_configured = vertex.is_configured() && vertex.credential_available().await;

    Json(json!({
        "status": "ok",
        "ai_provider": "vertex_ai_gemini",
        "vertex_configured": vertex_configured,
        "project": vertex.project(),
        "location": vertex.location(),
        "model": vertex.model(),
    }))
}
