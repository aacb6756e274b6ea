//! Mock provider for testing and local development.

use super::{
    FinishReason, GenerationRequest, ProviderError, ProviderResponse, TextProvider,
};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// In-process provider with scripted outcomes.
///
/// Outcomes queued with [`MockTextProvider::push_outcome`] are returned in
/// order; once the queue is empty every call gets the default outcome.
/// Every request is recorded for later inspection.
pub struct MockTextProvider {
    enabled: bool,
    default_reply: String,
    outcomes: Mutex<VecDeque<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl MockTextProvider {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            default_reply: "Mock response".to_string(),
            outcomes: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Mock that answers every call with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            default_reply: text.into(),
            ..Self::new(true)
        }
    }

    /// Mock whose first call fails with `error`.
    pub fn failing(error: ProviderError) -> Self {
        let mock = Self::new(true);
        mock.push_outcome(Err(error));
        mock
    }

    pub fn push_outcome(&self, outcome: Result<ProviderResponse, ProviderError>) {
        self.outcomes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(outcome);
    }

    /// Queue a successful response carrying `text` (or no text at all).
    pub fn push_text(&self, text: Option<&str>) {
        self.push_outcome(Ok(ProviderResponse {
            text: text.map(str::to_string),
            input_tokens: 0,
            output_tokens: 0,
            finish_reason: if text.is_some() {
                FinishReason::Complete
            } else {
                FinishReason::ContentFilter
            },
        }));
    }

    /// All requests received so far, oldest first.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<ProviderResponse, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotConfigured(
                "Mock text provider not enabled".to_string(),
            ));
        }

        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        let scripted = self
            .outcomes
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        scripted.unwrap_or_else(|| {
            let prompt_len: usize = request
                .turns
                .iter()
                .flat_map(|t| t.parts.iter())
                .map(|p| p.len())
                .sum();

            Ok(ProviderResponse {
                text: Some(self.default_reply.clone()),
                input_tokens: prompt_len as i32 / 4,
                output_tokens: 10,
                finish_reason: FinishReason::Complete,
            })
        })
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.enabled {
            Ok(())
        } else {
            Err(ProviderError::NotConfigured(
                "Mock text provider not enabled".to_string(),
            ))
        }
    }
}
