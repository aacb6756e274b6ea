//! Application startup and lifecycle management.
//!
//! Builds the router (both proxies plus health, readiness and metrics), binds
//! the listener and serves until SIGINT/SIGTERM.

use crate::config::{ProviderKind, WellnessConfig};
use crate::handlers::{
    blog::generate_blog_content,
    chat::chat_reply,
    health::{health_check, readiness_check},
    metrics::metrics,
};
use crate::services::providers::gemini::GeminiTextProvider;
use crate::services::providers::mock::MockTextProvider;
use crate::services::{metrics as service_metrics, BlogDraftProxy, ChatReplyProxy, TextProvider};
use axum::{
    http::{header, HeaderName, Method, StatusCode},
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::request_id_middleware;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: WellnessConfig,
    pub provider: Arc<dyn TextProvider>,
    pub chat: Arc<ChatReplyProxy>,
    pub blog: Arc<BlogDraftProxy>,
}

impl AppState {
    /// Wire both proxies to the same provider.
    pub fn new(config: WellnessConfig, provider: Arc<dyn TextProvider>) -> Self {
        let chat = ChatReplyProxy::new(provider.clone(), config.chat.clone(), config.retry.clone());
        let blog = BlogDraftProxy::new(provider.clone(), config.blog.clone(), config.retry.clone());

        Self {
            config,
            provider,
            chat: Arc::new(chat),
            blog: Arc::new(blog),
        }
    }
}

/// Select the text provider named in the configuration.
pub fn build_provider(config: &WellnessConfig) -> Result<Arc<dyn TextProvider>, AppError> {
    match config.gemini.provider {
        ProviderKind::Gemini => {
            if config.gemini.api_key.is_none() {
                tracing::warn!("GEMINI_API_KEY is not set; proxies will serve fallback content");
            }
            let provider = GeminiTextProvider::new(config.gemini.provider_config())
                .map_err(|e| AppError::ConfigError(anyhow::anyhow!(e)))?;
            tracing::info!(
                chat_model = %config.chat.model,
                blog_model = %config.blog.model,
                timeout_secs = config.gemini.timeout.as_secs(),
                "Initialized Gemini text provider"
            );
            Ok(Arc::new(provider))
        }
        ProviderKind::Mock => {
            tracing::info!("Using mock text provider");
            Ok(Arc::new(MockTextProvider::new(true)))
        }
    }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            header::CONTENT_TYPE,
        ])
}

/// Bare `OPTIONS` requests (without preflight headers) also get an empty 200.
async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics))
        .route("/chat-gemini", post(chat_reply).options(preflight))
        .route(
            "/generate-blog-content",
            post(generate_blog_content).options(preflight),
        )
        .layer(cors_layer())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application with the given configuration.
    pub async fn build(config: WellnessConfig) -> Result<Self, AppError> {
        let provider = build_provider(&config)?;
        Self::build_with_provider(config, provider).await
    }

    /// Build the application around an already constructed provider.
    pub async fn build_with_provider(
        config: WellnessConfig,
        provider: Arc<dyn TextProvider>,
    ) -> Result<Self, AppError> {
        service_metrics::init_metrics()
            .map_err(|e| AppError::InternalError(anyhow::anyhow!("metrics: {}", e)))?;

        // Port 0 = random port for testing
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Wellness service: HTTP on port {}", port);

        let router = build_router(AppState::new(config, provider));

        Ok(Self {
            port,
            listener,
            router,
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
            .map_err(|e| {
                tracing::error!("HTTP server error: {}", e);
                std::io::Error::other(format!("HTTP server error: {}", e))
            })
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
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
