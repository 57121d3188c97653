//! Mock provider implementations for testing and local runs.

use super::{DecodingParams, ModelLoader, ProviderError, TextGenerator};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};

/// What the mock generator answers with.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// `Mock response for: <prompt>`
    Echo,
    Fixed(String),
    Fail(String),
}

/// Mock text generator that records the prompts it receives.
pub struct MockTextGenerator {
    reply: MockReply,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl MockTextGenerator {
    pub fn new(reply: MockReply) -> Self {
        Self {
            reply,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    pub fn echo() -> Self {
        Self::new(MockReply::Echo)
    }

    /// Number of `generate` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().await.clone()
    }
}

#[async_trait]
impl TextGenerator for MockTextGenerator {
    async fn generate(
        &self,
        prompt: &str,
        _params: &DecodingParams,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock().await = Some(prompt.to_string());

        match &self.reply {
            MockReply::Echo => Ok(format!("Mock response for: {}", prompt)),
            MockReply::Fixed(text) => Ok(text.clone()),
            MockReply::Fail(msg) => Err(ProviderError::ApiError(msg.clone())),
        }
    }
}

/// Mock loader. Can be held back by a gate or made to fail.
pub struct MockModelLoader {
    model_id: String,
    generator: Arc<MockTextGenerator>,
    gate: Option<Arc<Notify>>,
    load_error: Option<String>,
}

impl MockModelLoader {
    pub fn new(generator: Arc<MockTextGenerator>) -> Self {
        Self {
            model_id: "mock-model".to_string(),
            generator,
            gate: None,
            load_error: None,
        }
    }

    /// `load` waits until the gate is notified.
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn failing(mut self, msg: impl Into<String>) -> Self {
        self.load_error = Some(msg.into());
        self
    }
}

#[async_trait]
impl ModelLoader for MockModelLoader {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn load(&self) -> Result<Arc<dyn TextGenerator>, ProviderError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        if let Some(msg) = &self.load_error {
            return Err(ProviderError::NotConfigured(msg.clone()));
        }

        Ok(self.generator.clone())
    }
}
