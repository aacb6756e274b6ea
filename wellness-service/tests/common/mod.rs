#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use secrecy::Secret;
use serde_json::{json, Value};
use service_core::config::Config as CoreConfig;
use std::sync::Arc;
use std::time::Duration;
use tower::util::ServiceExt;
use wellness_service::config::{GeminiSettings, ProviderKind, ProxySettings, WellnessConfig};
use wellness_service::services::providers::gemini::GeminiTextProvider;
use wellness_service::services::{RetryConfig, TextProvider};
use wellness_service::startup::{build_router, AppState};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_API_KEY: &str = "test-api-key";
pub const CHAT_PATH: &str = "/models/gemini-1.5-flash-latest:generateContent";
pub const BLOG_PATH: &str = "/models/gemini-pro:generateContent";

/// Config built in code so tests never touch process environment.
pub fn test_config(base_url: &str, api_key: Option<&str>) -> WellnessConfig {
    WellnessConfig {
        common: CoreConfig {
            port: 0,
            log_level: "error".to_string(),
        },
        gemini: GeminiSettings {
            provider: ProviderKind::Gemini,
            api_key: api_key.map(|k| Secret::new(k.to_string())),
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(2),
        },
        chat: ProxySettings::chat_defaults(),
        blog: ProxySettings::blog_defaults(),
        retry: RetryConfig::no_retry(),
        otlp_endpoint: None,
    }
}

pub fn router_with_provider(config: WellnessConfig, provider: Arc<dyn TextProvider>) -> Router {
    build_router(AppState::new(config, provider))
}

/// Router backed by the real Gemini provider pointed at `base_url`.
pub fn gemini_router(base_url: &str, api_key: Option<&str>) -> Router {
    let config = test_config(base_url, api_key);
    let provider = GeminiTextProvider::new(config.gemini.provider_config())
        .expect("Failed to build Gemini provider");
    router_with_provider(config, Arc::new(provider))
}

/// Fake Gemini endpoint.
pub struct GeminiStub {
    pub server: MockServer,
}

impl GeminiStub {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn uri(&self) -> String {
        self.server.uri()
    }

    pub async fn mock_text(&self, endpoint: &str, text: &str) {
        self.mock_response(
            endpoint,
            ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{
                    "content": {"role": "model", "parts": [{"text": text}]},
                    "finishReason": "STOP"
                }],
                "usageMetadata": {"promptTokenCount": 120, "candidatesTokenCount": 40}
            })),
        )
        .await;
    }

    pub async fn mock_status(&self, endpoint: &str, status: u16) {
        self.mock_response(
            endpoint,
            ResponseTemplate::new(status).set_body_json(json!({
                "error": {"code": status, "message": "upstream failure", "status": "INTERNAL"}
            })),
        )
        .await;
    }

    pub async fn mock_response(&self, endpoint: &str, template: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .and(query_param("key", TEST_API_KEY))
            .respond_with(template)
            .mount(&self.server)
            .await;
    }

    /// JSON bodies of every request the stub received.
    pub async fn received_bodies(&self) -> Vec<Value> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|r| r.body_json::<Value>().expect("request body is JSON"))
            .collect()
    }
}

pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("Failed to send request");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("Failed to parse JSON")
    };
    (status, body)
}

pub async fn post_json(router: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    post_raw(router, uri, body.to_string()).await
}

pub async fn post_raw(router: &Router, uri: &str, body: String) -> (StatusCode, Value) {
    send(
        router,
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap(),
    )
    .await
}
