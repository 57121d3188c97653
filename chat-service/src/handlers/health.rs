use axum::{extract::State, Json};

use crate::models::{HealthResponse, ReadinessResponse};
use crate::startup::AppState;

/// Liveness probe. Always 200; reports whether the model is loaded.
pub async fn root(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        message: "Healthcare Chatbot API is running".to_string(),
        model_loaded: state.gateway.is_ready().await,
    })
}

/// Detailed probe. The tokenizer is owned by the backend and becomes
/// available together with the model.
pub async fn health_check(State(state): State<AppState>) -> Json<ReadinessResponse> {
    let ready = state.gateway.is_ready().await;

    Json(ReadinessResponse {
        status: "healthy".to_string(),
        model_loaded: ready,
        tokenizer_loaded: ready,
        ready,
    })
}
