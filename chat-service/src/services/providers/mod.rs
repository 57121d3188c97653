//! Text generation backend abstractions and implementations.
//!
//! The model runtime (weights, tokenizer, beam search) is not part of this
//! service. A `ModelLoader` brings a backend up once at startup and hands out
//! a shared `TextGenerator`, which turns a prompt into decoded text.

pub mod huggingface;
pub mod mock;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Error type for provider operations.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Model is still loading: {0}")]
    ModelLoading(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Short label attached to error logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ProviderError::NotConfigured(_) => "not_configured",
            ProviderError::ApiError(_) => "api_error",
            ProviderError::ModelLoading(_) => "model_loading",
            ProviderError::RateLimited => "rate_limited",
            ProviderError::NetworkError(_) => "network_error",
            ProviderError::InvalidResponse(_) => "invalid_response",
        }
    }
}

/// Decoding settings passed to the backend with every prompt.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodingParams {
    pub num_beams: u32,
    /// Maximum output length in tokens.
    pub max_length: u32,
    /// Below 1.0 favours shorter completions.
    pub length_penalty: f32,
    pub early_stopping: bool,
    pub do_sample: bool,
    /// Prompts are truncated to this many tokens before generation.
    pub max_input_tokens: u32,
}

impl DecodingParams {
    /// Deterministic beam search used for every chat request.
    pub const BEAM_SEARCH: DecodingParams = DecodingParams {
        num_beams: 4,
        max_length: 150,
        length_penalty: 0.8,
        early_stopping: true,
        do_sample: false,
        max_input_tokens: 512,
    };
}

/// A loaded model that can answer prompts. Shared read-only between requests.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Tokenize `prompt`, run generation and return the decoded text.
    async fn generate(&self, prompt: &str, params: &DecodingParams)
        -> Result<String, ProviderError>;
}

/// Brings a backend up. Called once at process start.
#[async_trait]
pub trait ModelLoader: Send + Sync {
    fn model_id(&self) -> &str;

    async fn load(&self) -> Result<Arc<dyn TextGenerator>, ProviderError>;
}
