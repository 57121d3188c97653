//! Application startup and lifecycle management.
//!
//! The listener is bound and serving before the model is loaded; requests
//! that arrive in between get 503 from the readiness gate.

use crate::config::{ChatConfig, ProviderKind};
use crate::handlers;
use crate::services::providers::huggingface::HuggingFaceLoader;
use crate::services::providers::mock::{MockModelLoader, MockTextGenerator};
use crate::services::providers::ModelLoader;
use crate::services::InferenceGateway;
use axum::{
    http::{header, HeaderName, Method},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    make_request_span, request_id_middleware, security_headers_middleware, REQUEST_ID_HEADER,
};
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub gateway: InferenceGateway,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/metrics", get(handlers::metrics_handler))
        .route("/api/chat/generate", post(handlers::generate))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors_layer())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    let request_id = HeaderName::from_static(REQUEST_ID_HEADER);

    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, request_id.clone()])
        .expose_headers([request_id])
}

/// Pick the model loader named by the configuration.
pub fn loader_for(config: &ChatConfig) -> Arc<dyn ModelLoader> {
    match config.provider {
        ProviderKind::HuggingFace => Arc::new(HuggingFaceLoader::new(config.model.clone())),
        ProviderKind::Mock => Arc::new(MockModelLoader::new(Arc::new(MockTextGenerator::echo()))),
    }
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
    loader: Arc<dyn ModelLoader>,
}

impl Application {
    /// Build the application with the loader selected by `config.provider`.
    pub async fn build(config: ChatConfig) -> Result<Self, AppError> {
        let loader = loader_for(&config);
        Self::build_with_loader(config, loader).await
    }

    pub async fn build_with_loader(
        config: ChatConfig,
        loader: Arc<dyn ModelLoader>,
    ) -> Result<Self, AppError> {
        tracing::info!(
            provider = ?config.provider,
            model = %loader.model_id(),
            "Initialized model loader"
        );

        let state = AppState {
            gateway: InferenceGateway::new(),
        };

        // Port 0 picks a random port, used by tests.
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        Ok(Self {
            port,
            listener,
            state,
            loader,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serve requests while the model loads; stops on SIGINT/SIGTERM.
    ///
    /// A failed model load stops the server and returns an error.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let router = build_router(self.state.clone());
        let server = axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .into_future();
        tokio::pin!(server);

        let gateway = self.state.gateway.clone();
        let loader = self.loader;
        let load = async move { gateway.load(loader.as_ref()).await };

        tokio::select! {
            result = &mut server => return result,
            loaded = load => {
                if let Err(e) = loaded {
                    return Err(std::io::Error::other(format!("Model loading failed: {}", e)));
                }
            }
        }

        server.await
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
