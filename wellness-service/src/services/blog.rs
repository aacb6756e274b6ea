//! Blog draft proxy.
//!
//! Expands a community post title (and optional partial draft) into
//! peer-voice prose. When generation fails the editor still gets a
//! keyword-matched fallback paragraph.

use std::sync::Arc;
use std::time::Instant;

use validator::Validate;

use super::error::ProxyError;
use super::fallback::{blog_fallback_theme, DEFAULT_BLOG_TITLE};
use super::metrics;
use super::providers::{
    GenerationRequest, HarmCategory, PromptTurn, SafetySetting, TextProvider,
};
use super::retry::{retry_provider_call, RetryConfig};
use crate::config::ProxySettings;
use crate::dtos::{BlogDraftRequest, BlogDraftResponse, BlogMetadata};

const ENDPOINT: &str = "blog";

/// Categories blocked for blog drafts.
pub const BLOG_SAFETY_CATEGORIES: &[HarmCategory] = &[
    HarmCategory::Harassment,
    HarmCategory::HateSpeech,
    HarmCategory::SexuallyExplicit,
    HarmCategory::DangerousContent,
];

pub fn system_prompt(style: &str, tone: &str) -> String {
    format!(
        "You are a helpful AI assistant that helps students write authentic, supportive blog \
posts about their mental health journeys. Your role is to:

1. Generate content that feels personal and genuine
2. Focus on mental health topics relevant to college students
3. Include practical insights and coping strategies
4. Maintain a supportive, non-judgmental tone
5. Encourage community connection and vulnerability
6. Avoid clinical language - write from a peer perspective

Style: {}
Tone: {}

Generate content that students can relate to and find helpful in their own mental health journeys.",
        style, tone
    )
}

pub fn user_prompt(title: &str, existing_content: Option<&str>) -> String {
    let existing = existing_content
        .map(|content| format!("Existing content: \"{}\"", content))
        .unwrap_or_default();

    format!(
        "Please help me expand on this blog post:

Title: \"{}\"
{}

Generate additional content that:
- Continues the narrative authentically
- Includes specific, relatable examples
- Offers practical tips or insights
- Maintains a personal, student-to-student voice
- Encourages others to share their experiences
- Is around 300-500 words

Focus on making this feel like it's written by a real student sharing their genuine experience.",
        title, existing
    )
}

/// Whitespace-separated word count.
pub fn word_count(content: &str) -> usize {
    content.split_whitespace().count()
}

/// A successfully generated draft.
#[derive(Debug, Clone, PartialEq)]
pub struct BlogDraft {
    pub content: String,
    pub style: String,
    pub tone: String,
    pub word_count: usize,
}

pub struct BlogDraftProxy {
    provider: Arc<dyn TextProvider>,
    settings: ProxySettings,
    retry: RetryConfig,
}

impl BlogDraftProxy {
    pub fn new(provider: Arc<dyn TextProvider>, settings: ProxySettings, retry: RetryConfig) -> Self {
        Self {
            provider,
            settings,
            retry,
        }
    }

    /// One role-less content with the system framing and the user framing as
    /// two parts, in that order.
    pub fn build_request(&self, request: &BlogDraftRequest) -> GenerationRequest {
        GenerationRequest {
            model: self.settings.model.clone(),
            turns: vec![PromptTurn::unattributed(vec![
                system_prompt(request.style(), request.tone()),
                user_prompt(&request.title, request.existing_content()),
            ])],
            params: self.settings.params,
            safety: SafetySetting::uniform(BLOG_SAFETY_CATEGORIES, self.settings.safety_threshold),
        }
    }

    #[tracing::instrument(skip_all, fields(model = %self.settings.model))]
    pub async fn draft(&self, request: &BlogDraftRequest) -> Result<BlogDraft, ProxyError> {
        request.validate()?;

        tracing::info!(
            title_len = request.title.len(),
            has_existing_content = request.existing_content().is_some(),
            style = request.style(),
            tone = request.tone(),
            "Generating blog content"
        );

        let generation = self.build_request(request);
        let started = Instant::now();
        let result = retry_provider_call(&self.retry, "blog_draft", || {
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

        let content = response.text.ok_or_else(|| {
            metrics::record_provider_error(ENDPOINT, "missing_content");
            ProxyError::Upstream("Invalid response from Gemini API".to_string())
        })?;

        Ok(BlogDraft {
            word_count: word_count(&content),
            style: request.style().to_string(),
            tone: request.tone().to_string(),
            content,
        })
    }

    /// Produce the response envelope. Never fails: errors yield the fallback
    /// paragraph matched against the title (or the default title when the
    /// body could not be read).
    pub async fn respond(&self, request: Result<BlogDraftRequest, ProxyError>) -> BlogDraftResponse {
        let (outcome, title) = match request {
            Ok(request) => (self.draft(&request).await, request.title),
            Err(e) => (Err(e), DEFAULT_BLOG_TITLE.to_string()),
        };

        match outcome {
            Ok(draft) => {
                metrics::record_proxy_request(ENDPOINT, "success");
                BlogDraftResponse {
                    success: true,
                    content: draft.content,
                    metadata: Some(BlogMetadata {
                        style: draft.style,
                        tone: draft.tone,
                        word_count: draft.word_count,
                    }),
                    error: None,
                    fallback: None,
                }
            }
            Err(e) => {
                let theme = blog_fallback_theme(&title);
                tracing::error!(
                    kind = e.kind(),
                    error = %e,
                    theme = theme.as_str(),
                    "Blog generation failed, serving fallback content"
                );
                metrics::record_proxy_request(ENDPOINT, "fallback");
                metrics::record_fallback(ENDPOINT, e.kind());
                BlogDraftResponse {
                    success: false,
                    content: theme.content().to_string(),
                    metadata: None,
                    error: Some(e.to_string()),
                    fallback: Some(true),
                }
            }
        }
    }
}
