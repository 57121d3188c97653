//! Hugging Face inference endpoint provider.
//!
//! Sends the prompt with the decoding settings to
//! `<inference_url>/models/<model_id>`; tokenization, beam search and decoding
//! all run on the endpoint. A cold endpoint answers 503 with an
//! `estimated_time` until the model is resident, so loading keeps warming it
//! up until it answers.

use super::{DecodingParams, ModelLoader, ProviderError, TextGenerator};
use crate::config::ModelConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use service_core::observability::TracedClientExt;
use std::sync::Arc;
use std::time::Duration;

/// Prompt used to warm the endpoint up during loading.
const WARMUP_PROMPT: &str = "question: hello";

/// Wait used when a loading endpoint gives no estimate.
const DEFAULT_LOADING_WAIT: Duration = Duration::from_secs(5);

/// Upper bound for a single loading wait.
const MAX_LOADING_WAIT: Duration = Duration::from_secs(30);

/// Generator bound to one model on one endpoint.
pub struct HuggingFaceGenerator {
    client: Client,
    url: String,
    token: Option<Secret<String>>,
    model_id: String,
}

impl HuggingFaceGenerator {
    pub fn new(config: &ModelConfig) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: model_url(&config.inference_url, &config.model_id),
            token: config.hf_token.clone(),
            model_id: config.model_id.clone(),
        })
    }

    async fn call(&self, prompt: &str, params: &DecodingParams) -> Result<String, CallFailure> {
        let request = InferenceRequest {
            inputs: prompt,
            parameters: InferenceParameters::from(params),
            options: InferenceOptions {
                wait_for_model: false,
                use_cache: false,
            },
        };

        tracing::debug!(
            model = %self.model_id,
            prompt_len = prompt.len(),
            "Sending request to inference endpoint"
        );

        let response = self
            .client
            .traced_post(&self.url)
            .maybe_bearer_auth(self.token.as_ref().map(|t| t.expose_secret()))
            .json(&request)
            .send()
            .await
            .map_err(|e| CallFailure::Failed(ProviderError::NetworkError(e.to_string())))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(classify_failure(status, &error_text));
        }

        let body: InferenceResponse = response.json().await.map_err(|e| {
            CallFailure::Failed(ProviderError::InvalidResponse(format!(
                "Failed to parse response: {}",
                e
            )))
        })?;

        body.into_text().ok_or_else(|| {
            CallFailure::Failed(ProviderError::InvalidResponse(
                "Response did not contain generated_text".to_string(),
            ))
        })
    }
}

#[async_trait]
impl TextGenerator for HuggingFaceGenerator {
    async fn generate(
        &self,
        prompt: &str,
        params: &DecodingParams,
    ) -> Result<String, ProviderError> {
        self.call(prompt, params).await.map_err(ProviderError::from)
    }
}

/// Loader that waits for the endpoint to report the model as ready.
pub struct HuggingFaceLoader {
    config: ModelConfig,
}

impl HuggingFaceLoader {
    pub fn new(config: ModelConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ModelLoader for HuggingFaceLoader {
    fn model_id(&self) -> &str {
        &self.config.model_id
    }

    async fn load(&self) -> Result<Arc<dyn TextGenerator>, ProviderError> {
        let generator = HuggingFaceGenerator::new(&self.config)?;
        let attempts = self.config.load_max_attempts.max(1);

        for attempt in 1..=attempts {
            match generator
                .call(WARMUP_PROMPT, &DecodingParams::BEAM_SEARCH)
                .await
            {
                Ok(_) => {
                    tracing::info!(model = %self.config.model_id, attempt, "Model is ready");
                    return Ok(Arc::new(generator));
                }
                Err(CallFailure::Loading { message, wait }) => {
                    tracing::info!(
                        model = %self.config.model_id,
                        attempt,
                        wait_secs = wait.as_secs_f64(),
                        "Model still loading: {}",
                        message
                    );
                    if attempt < attempts {
                        tokio::time::sleep(wait).await;
                    }
                }
                Err(CallFailure::Failed(e)) => return Err(e),
            }
        }

        Err(ProviderError::ModelLoading(format!(
            "{} not ready after {} attempts",
            self.config.model_id, attempts
        )))
    }
}

/// Outcome of a failed call, keeping the loading wait hint apart.
#[derive(Debug)]
enum CallFailure {
    Loading { message: String, wait: Duration },
    Failed(ProviderError),
}

impl From<CallFailure> for ProviderError {
    fn from(failure: CallFailure) -> Self {
        match failure {
            CallFailure::Loading { message, .. } => ProviderError::ModelLoading(message),
            CallFailure::Failed(e) => e,
        }
    }
}

fn model_url(base: &str, model_id: &str) -> String {
    format!("{}/models/{}", base.trim_end_matches('/'), model_id)
}

fn classify_failure(status: StatusCode, body: &str) -> CallFailure {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return CallFailure::Failed(ProviderError::RateLimited);
    }

    let parsed: Option<ErrorBody> = serde_json::from_str(body).ok();

    if status == StatusCode::SERVICE_UNAVAILABLE {
        if let Some(err) = parsed.as_ref().filter(|e| e.is_loading()) {
            let wait = err
                .estimated_time
                .filter(|secs| secs.is_finite() && *secs >= 0.0)
                .map(|secs| Duration::from_secs_f64(secs.min(MAX_LOADING_WAIT.as_secs_f64())))
                .unwrap_or(DEFAULT_LOADING_WAIT)
                .min(MAX_LOADING_WAIT);
            return CallFailure::Loading {
                message: err.error.clone(),
                wait,
            };
        }
    }

    let message = parsed.map(|e| e.error).unwrap_or_else(|| body.to_string());
    CallFailure::Failed(ProviderError::ApiError(format!(
        "Inference endpoint error {}: {}",
        status, message
    )))
}

// ============================================================================
// Inference API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    parameters: InferenceParameters,
    options: InferenceOptions,
}

#[derive(Debug, Serialize)]
struct InferenceParameters {
    num_beams: u32,
    max_length: u32,
    length_penalty: f32,
    early_stopping: bool,
    do_sample: bool,
    /// Keep at most this many input tokens.
    truncate: u32,
}

impl From<&DecodingParams> for InferenceParameters {
    fn from(params: &DecodingParams) -> Self {
        Self {
            num_beams: params.num_beams,
            max_length: params.max_length,
            length_penalty: params.length_penalty,
            early_stopping: params.early_stopping,
            do_sample: params.do_sample,
            truncate: params.max_input_tokens,
        }
    }
}

#[derive(Debug, Serialize)]
struct InferenceOptions {
    wait_for_model: bool,
    use_cache: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Batch(Vec<GeneratedText>),
    Single(GeneratedText),
}

impl InferenceResponse {
    fn into_text(self) -> Option<String> {
        match self {
            InferenceResponse::Batch(items) => items.into_iter().next().map(|g| g.generated_text),
            InferenceResponse::Single(item) => Some(item.generated_text),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    estimated_time: Option<f64>,
}

impl ErrorBody {
    fn is_loading(&self) -> bool {
        self.estimated_time.is_some() || self.error.contains("currently loading")
    }
}
