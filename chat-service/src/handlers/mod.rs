//! HTTP handlers for chat-service.

pub mod chat;
pub mod health;
pub mod metrics;

pub use chat::generate;
pub use health::{health_check, root};
pub use metrics::metrics_handler;

use service_core::error::AppError;

pub async fn not_found() -> AppError {
    AppError::NotFound(anyhow::anyhow!("Not found"))
}
