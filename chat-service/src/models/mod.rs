//! Request and response models for the chat service.

pub mod chat;
pub mod health;

pub use chat::{ChatRequest, ChatResponse, ConversationTurn};
pub use health::{HealthResponse, ReadinessResponse};
