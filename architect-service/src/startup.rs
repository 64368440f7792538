//! Application startup and lifecycle management.

use crate::config::ArchitectConfig;
use crate::handlers;
use crate::services::providers::gemini::{GeminiConfig, GeminiTextProvider};
use crate::services::providers::openai::{OpenAiImageConfig, OpenAiImageProvider};
use crate::services::providers::{ImageProvider, ProviderError, TextProvider};
use crate::services::{Analyzer, BannedTermList, ImageFetcher};
use axum::{
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    make_request_span, request_id_middleware, security_headers_middleware,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Shared application state. Immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub analyzer: Analyzer,
    pub content_filter: Arc<BannedTermList>,
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Wire the production providers from configuration.
    pub fn from_config(config: &ArchitectConfig) -> Result<Self, ProviderError> {
        let text_provider: Arc<dyn TextProvider> =
            Arc::new(GeminiTextProvider::new(GeminiConfig {
                api_key: config.gemini.api_key.clone(),
                model: config.models.text_model.clone(),
                base_url: config.gemini.base_url.clone(),
                timeout: config.gemini.timeout,
            })?);

        tracing::info!(
            model = %config.models.text_model,
            "Initialized Gemini text provider"
        );

        let image_provider: Arc<dyn ImageProvider> =
            Arc::new(OpenAiImageProvider::new(OpenAiImageConfig {
                api_key: config.openai.api_key.clone(),
                model: config.models.image_model.clone(),
                size: config.models.image_size.clone(),
                base_url: config.openai.base_url.clone(),
                timeout: config.openai.timeout,
            })?);

        tracing::info!(
            model = %config.models.image_model,
            size = %config.models.image_size,
            "Initialized OpenAI image provider"
        );

        let fetcher = ImageFetcher::new(config.fetch.timeout)?;

        Ok(Self {
            analyzer: Analyzer::new(text_provider, image_provider, fetcher),
            content_filter: Arc::new(BannedTermList::new(&config.content_filter.banned_terms)),
            max_upload_bytes: config.limits.max_upload_bytes,
        })
    }
}

/// Build the HTTP router with all middleware applied.
pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.max_upload_bytes;

    Router::new()
        .route("/analyze", post(handlers::analyze))
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<axum::body::Body>))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: ArchitectConfig) -> Result<Self, AppError> {
        let state = AppState::from_config(&config).map_err(|e| {
            tracing::error!("Failed to initialize providers: {}", e);
            AppError::ConfigError(anyhow::Error::new(e))
        })?;

        Self::build_with_state(config, state).await
    }

    /// Build the application around an already wired state.
    pub async fn build_with_state(
        config: ArchitectConfig,
        state: AppState,
    ) -> Result<Self, AppError> {
        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Architect service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            router: build_router(state),
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Run the application until a shutdown signal arrives.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }
}
