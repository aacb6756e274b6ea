//! Chat reply proxy.
//!
//! Turns one student message plus recent history into one supportive reply
//! from the text provider, or the fixed fallback sentence on any failure.

use std::sync::Arc;
use std::time::Instant;

use validator::Validate;

use super::error::ProxyError;
use super::fallback::{CHAT_EMPTY_REPLY, CHAT_FALLBACK};
use super::metrics;
use super::providers::{
    GenerationRequest, HarmCategory, PromptTurn, SafetySetting, TextProvider,
};
use super::retry::{retry_provider_call, RetryConfig};
use crate::config::ProxySettings;
use crate::dtos::{ChatRequest, ChatResponse, HistoryEntry, Sender};

const ENDPOINT: &str = "chat";

/// Categories blocked for chat replies.
pub const CHAT_SAFETY_CATEGORIES: &[HarmCategory] =
    &[HarmCategory::Harassment, HarmCategory::HateSpeech];

/// First turn of every conversation; the new message is embedded at the end.
pub fn instruction_block(message: &str) -> String {
    format!(
        "You are a compassionate AI wellness assistant for students. You provide mental health \
support, listening skills, and helpful resources. Keep responses warm, supportive, and under \
200 words. Focus on:
- Emotional validation and empathy
- Practical coping strategies
- Encouraging professional help when needed
- Being non-judgmental and supportive

Current message: {}",
        message
    )
}

/// Instruction turn first, then history in order. User entries keep the
/// user role, bot entries become model turns. Entries with an unknown
/// sender or no text are dropped.
pub fn build_turns(message: &str, history: &[HistoryEntry]) -> Vec<PromptTurn> {
    let mut turns = Vec::with_capacity(history.len() + 1);
    turns.push(PromptTurn::user(instruction_block(message)));

    let usable = history.iter().filter(|entry| !entry.text.is_empty());
    turns.extend(usable.filter_map(|entry| match entry.sender {
        Sender::User => Some(PromptTurn::user(entry.text.clone())),
        Sender::Bot => Some(PromptTurn::model(entry.text.clone())),
        Sender::Unknown => None,
    }));

    turns
}

pub struct ChatReplyProxy {
    provider: Arc<dyn TextProvider>,
    settings: ProxySettings,
    retry: RetryConfig,
}

impl ChatReplyProxy {
    pub fn new(provider: Arc<dyn TextProvider>, settings: ProxySettings, retry: RetryConfig) -> Self {
        Self {
            provider,
            settings,
            retry,
        }
    }

    pub fn build_request(&self, request: &ChatRequest) -> GenerationRequest {
        GenerationRequest {
            model: self.settings.model.clone(),
            turns: build_turns(&request.message, &request.conversation_history),
            params: self.settings.params,
            safety: SafetySetting::uniform(CHAT_SAFETY_CATEGORIES, self.settings.safety_threshold),
        }
    }

    /// Validate, call the provider once (or per the retry policy), and return
    /// the reply text.
    #[tracing::instrument(
        skip_all,
        fields(history = request.conversation_history.len(), model = %self.settings.model)
    )]
    pub async fn reply(&self, request: &ChatRequest) -> Result<String, ProxyError> {
        request.validate()?;

        tracing::info!(
            message_len = request.message.len(),
            language = ?request.language,
            context = ?request.context,
            "Processing chat message"
        );
        tracing::debug!(message = %request.message, "Chat message content");

        let generation = self.build_request(request);
        let started = Instant::now();
        let result = retry_provider_call(&self.retry, "chat_reply", || {
            self.provider.generate(&generation)
        })
        .await;
        metrics::record_provider_latency(
            self.provider.name(),
            &generation.model,
            started.elapsed().as_secs_f64(),
        );

        let response = result.map_err(|e| {
            metrics::record_provider_error(ENDPOINT, e.kind());
            ProxyError::from(e)
        })?;

        tracing::debug!(
            finish_reason = response.finish_reason.as_str(),
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "Chat reply generated"
        );

        Ok(response
            .text
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| CHAT_EMPTY_REPLY.to_string()))
    }

    /// Produce the response envelope. Never fails: every error becomes the
    /// fallback sentence with `success: false`.
    pub async fn respond(&self, request: Result<ChatRequest, ProxyError>) -> ChatResponse {
        let outcome = match request {
            Ok(request) => self.reply(&request).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(text) => {
                metrics::record_proxy_request(ENDPOINT, "success");
                ChatResponse::success(text)
            }
            Err(e) => {
                tracing::error!(kind = e.kind(), error = %e, "Chat reply failed, serving fallback");
                metrics::record_proxy_request(ENDPOINT, "fallback");
                metrics::record_fallback(ENDPOINT, e.kind());
                ChatResponse::fallback(CHAT_FALLBACK, &e)
            }
        }
    }
}
