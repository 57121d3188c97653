#![allow(dead_code)]

use chat_service::config::{ChatConfig, ModelConfig, ProviderKind};
use chat_service::services::providers::mock::{MockModelLoader, MockReply, MockTextGenerator};
use chat_service::services::providers::ModelLoader;
use chat_service::startup::Application;
use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub client: reqwest::Client,
    pub generator: Arc<MockTextGenerator>,
    /// Set when the app was spawned with a held-back model load.
    pub load_gate: Option<Arc<Notify>>,
}

pub fn test_config() -> ChatConfig {
    ChatConfig {
        common: CoreConfig {
            port: 0, // Random port for testing
            log_level: "warn".to_string(),
            otlp_endpoint: None,
        },
        provider: ProviderKind::Mock,
        model: ModelConfig {
            model_id: "mock-model".to_string(),
            hf_token: None,
            inference_url: "http://127.0.0.1:1".to_string(),
            request_timeout_secs: 5,
            load_max_attempts: 1,
        },
    }
}

impl TestApp {
    /// Spawn with an echoing mock model and wait until it is loaded.
    pub async fn spawn() -> Self {
        Self::spawn_with_reply(MockReply::Echo).await
    }

    pub async fn spawn_with_reply(reply: MockReply) -> Self {
        let generator = Arc::new(MockTextGenerator::new(reply));
        let loader = Arc::new(MockModelLoader::new(generator.clone()));
        let app = Self::start(loader, generator, None).await;
        app.wait_until_ready().await;
        app
    }

    /// Spawn with the model load held back until `finish_loading` is called.
    pub async fn spawn_loading() -> Self {
        let gate = Arc::new(Notify::new());
        let generator = Arc::new(MockTextGenerator::echo());
        let loader = Arc::new(MockModelLoader::new(generator.clone()).with_gate(gate.clone()));
        Self::start(loader, generator, Some(gate)).await
    }

    async fn start(
        loader: Arc<dyn ModelLoader>,
        generator: Arc<MockTextGenerator>,
        load_gate: Option<Arc<Notify>>,
    ) -> Self {
        let app = Application::build_with_loader(test_config(), loader)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("Failed to build HTTP client");

        // Wait for HTTP server to be ready by polling the root endpoint
        for _ in 0..50 {
            if client.get(&address).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            port,
            client,
            generator,
            load_gate,
        }
    }

    pub fn finish_loading(&self) {
        if let Some(gate) = &self.load_gate {
            gate.notify_one();
        }
    }

    pub async fn wait_until_ready(&self) {
        for _ in 0..100 {
            let ready = self
                .get("/health")
                .await
                .json::<serde_json::Value>()
                .await
                .map(|body| body["ready"] == true)
                .unwrap_or(false);
            if ready {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("Model never became ready");
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_chat(&self, body: &serde_json::Value) -> reqwest::Response {
        self.client
            .post(format!("{}/api/chat/generate", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }
}
