//! Inference gateway: readiness gate plus prompt dispatch.

use crate::models::ChatRequest;
use crate::services::metrics;
use crate::services::prompt::{format_request, FormattedRequest};
use crate::services::providers::{DecodingParams, ModelLoader, ProviderError, TextGenerator};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Model not loaded yet. Please wait a moment and try again.")]
    NotReady,

    #[error("Failed to generate response: {0}")]
    Generation(#[from] ProviderError),
}

/// Readiness of the generation backend.
///
/// Moves from `Uninitialized` to `Ready` exactly once and never back.
#[derive(Clone, Default)]
pub enum ModelState {
    #[default]
    Uninitialized,
    Ready(Arc<dyn TextGenerator>),
}

impl ModelState {
    pub fn is_ready(&self) -> bool {
        matches!(self, ModelState::Ready(_))
    }
}

/// How a successful request was answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySource {
    Greeting,
    Model,
}

impl ReplySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplySource::Greeting => "greeting",
            ReplySource::Model => "generated",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayReply {
    pub text: String,
    pub source: ReplySource,
}

/// Shared, cloneable handle to the generation backend.
#[derive(Clone, Default)]
pub struct InferenceGateway {
    state: Arc<RwLock<ModelState>>,
}

impl InferenceGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gateway that is already `Ready` with `generator`.
    pub fn ready(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            state: Arc::new(RwLock::new(ModelState::Ready(generator))),
        }
    }

    pub async fn is_ready(&self) -> bool {
        self.state.read().await.is_ready()
    }

    /// Run `loader` and make its generator available to requests.
    ///
    /// An error leaves the gateway `Uninitialized`; callers treat it as fatal.
    pub async fn load(&self, loader: &dyn ModelLoader) -> Result<(), ProviderError> {
        let started = Instant::now();
        tracing::info!(model = %loader.model_id(), "Loading model");

        let generator = loader.load().await.map_err(|e| {
            tracing::error!(model = %loader.model_id(), error = %e, "Failed to load model");
            e
        })?;

        let mut state = self.state.write().await;
        if state.is_ready() {
            tracing::warn!(model = %loader.model_id(), "Model already loaded, keeping the first instance");
            return Ok(());
        }
        *state = ModelState::Ready(generator);
        metrics::set_model_ready(true);

        tracing::info!(
            model = %loader.model_id(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Model loaded, ready to serve requests"
        );
        Ok(())
    }

    /// Answer one chat request.
    pub async fn generate(&self, request: &ChatRequest) -> Result<GatewayReply, GatewayError> {
        let generator = match &*self.state.read().await {
            ModelState::Ready(generator) => generator.clone(),
            ModelState::Uninitialized => return Err(GatewayError::NotReady),
        };

        let prompt = match format_request(&request.history, &request.new_message) {
            FormattedRequest::Greeting(text) => {
                return Ok(GatewayReply {
                    text: text.to_string(),
                    source: ReplySource::Greeting,
                })
            }
            FormattedRequest::Prompt(prompt) => prompt,
        };

        let started = Instant::now();
        let output = generator
            .generate(&prompt, &DecodingParams::BEAM_SEARCH)
            .await;
        metrics::record_generation_duration(started.elapsed().as_secs_f64());

        let text = output?;
        Ok(GatewayReply {
            text: text.trim().to_string(),
            source: ReplySource::Model,
        })
    }
}
