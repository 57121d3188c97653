use axum::{extract::State, Json};
use service_core::error::AppError;
use service_core::utils::ValidatedJson;

use crate::models::{ChatRequest, ChatResponse};
use crate::services::{metrics, GatewayError};
use crate::startup::AppState;

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotReady => {
                AppError::ServiceUnavailable(GatewayError::NotReady.to_string())
            }
            GatewayError::Generation(cause) => {
                AppError::InternalError(
                    anyhow::Error::new(cause).context("Failed to generate response"),
                )
            }
        }
    }
}

/// `POST /api/chat/generate`
#[tracing::instrument(skip_all, fields(history_len = request.history.len()))]
pub async fn generate(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    match state.gateway.generate(&request).await {
        Ok(reply) => {
            metrics::record_chat_request(reply.source.as_str());
            tracing::info!(source = reply.source.as_str(), "Chat response generated");
            Ok(Json(ChatResponse {
                response: reply.text,
            }))
        }
        Err(GatewayError::NotReady) => {
            metrics::record_chat_request("not_ready");
            tracing::warn!("Rejected chat request, model not loaded yet");
            Err(GatewayError::NotReady.into())
        }
        Err(GatewayError::Generation(cause)) => {
            metrics::record_chat_request("failed");
            tracing::error!(
                error = %cause,
                error_kind = cause.kind(),
                "Error generating response"
            );
            Err(GatewayError::Generation(cause).into())
        }
    }
}
