use super::providers::ProviderError;
use thiserror::Error;

/// Failure classes a proxy call can end in.
///
/// None of these reach the client as an HTTP error: the handlers turn every
/// variant into a 200 response carrying fallback text and `success: false`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProxyError {
    #[error("{0}")]
    Configuration(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Network(String),
}

impl ProxyError {
    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::Configuration(_) => "configuration",
            ProxyError::Validation(_) => "validation",
            ProxyError::Upstream(_) => "upstream",
            ProxyError::Network(_) => "network",
        }
    }
}

impl From<ProviderError> for ProxyError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured(msg) => ProxyError::Configuration(msg),
            ProviderError::ApiError { status, .. } => {
                ProxyError::Upstream(format!("Gemini API error: {}", status))
            }
            ProviderError::RateLimited => ProxyError::Upstream("Gemini API error: 429".to_string()),
            ProviderError::MalformedResponse(msg) => ProxyError::Upstream(msg),
            ProviderError::NetworkError(msg) => ProxyError::Network(msg),
            ProviderError::Timeout => {
                ProxyError::Network("Gemini API request timed out".to_string())
            }
        }
    }
}

impl From<validator::ValidationErrors> for ProxyError {
    fn from(errors: validator::ValidationErrors) -> Self {
        // Surface the first field message; the client only shows a toast
        let message = errors
            .field_errors()
            .into_iter()
            .flat_map(|(_, errs)| errs.iter())
            .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
            .unwrap_or_else(|| errors.to_string());
        ProxyError::Validation(message)
    }
}
