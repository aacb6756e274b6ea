use serde::{Deserialize, Serialize};
use validator::Validate;

use super::not_blank;

pub const DEFAULT_STYLE: &str = "personal_journey";
pub const DEFAULT_TONE: &str = "supportive";

/// Body of `POST /generate-blog-content`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BlogDraftRequest {
    #[serde(default)]
    #[validate(custom(
        function = "not_blank",
        message = "Title is required for content generation"
    ))]
    pub title: String,
    #[serde(default)]
    pub existing_content: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub tone: Option<String>,
}

impl BlogDraftRequest {
    /// Style tag with the default applied to missing or empty values.
    pub fn style(&self) -> &str {
        non_empty(self.style.as_deref()).unwrap_or(DEFAULT_STYLE)
    }

    /// Tone tag with the default applied to missing or empty values.
    pub fn tone(&self) -> &str {
        non_empty(self.tone.as_deref()).unwrap_or(DEFAULT_TONE)
    }

    pub fn existing_content(&self) -> Option<&str> {
        non_empty(self.existing_content.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogMetadata {
    pub style: String,
    pub tone: String,
    pub word_count: usize,
}

/// Always sent with HTTP 200. On failure `content` holds a keyword-matched
/// fallback paragraph and `fallback` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogDraftResponse {
    pub success: bool,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BlogMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
}
