use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use service_core::error::AppError;

use crate::startup::AppState;

/// Liveness: the process is up. Provider problems do not fail this probe
/// because the proxies still answer with fallback text.
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "wellness-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Readiness: the text provider is configured and reachable.
pub async fn readiness_check(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.provider.health_check().await.map_err(|e| {
        tracing::warn!(provider = state.provider.name(), error = %e, "Provider not ready");
        AppError::ServiceUnavailable(e.to_string())
    })?;
    Ok(StatusCode::OK)
}
