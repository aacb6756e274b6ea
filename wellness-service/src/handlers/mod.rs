//! HTTP handlers for the wellness service.
//!
//! The proxy handlers always answer 200; failures are reported through the
//! `success` flag of the body.

pub mod blog;
pub mod chat;
pub mod health;
pub mod metrics;

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::services::ProxyError;

/// Message returned to clients whose body could not be read.
pub(crate) const INVALID_BODY: &str = "Invalid request body";

/// Unwrap a JSON body, turning a rejection into a validation failure. The
/// extractor's detail only goes to the log.
pub(crate) fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ProxyError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        tracing::warn!(
            status = %rejection.status(),
            error = %rejection.body_text(),
            "Rejected request body"
        );
        ProxyError::Validation(INVALID_BODY.to_string())
    })
}
