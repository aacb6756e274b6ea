use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::Validate;

use super::not_blank;
use crate::services::ProxyError;

/// Body of `POST /chat-gemini`.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    #[validate(custom(function = "not_blank", message = "Message is required"))]
    pub message: String,
    /// Prior turns, oldest first. Windowing is the client's job; whatever
    /// arrives here is forwarded as-is.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub conversation_history: Vec<HistoryEntry>,
    /// Accepted for compatibility; not interpreted.
    #[serde(default)]
    pub language: Option<Value>,
    /// Accepted for compatibility; not interpreted.
    #[serde(default)]
    pub context: Option<Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<HistoryEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<HistoryEntry>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
    /// Missing, null or unrecognised; such entries are skipped.
    #[default]
    Unknown,
}

impl Sender {
    fn from_value(value: Option<&Value>) -> Self {
        match value.and_then(Value::as_str) {
            Some("user") => Sender::User,
            Some("bot") => Sender::Bot,
            _ => Sender::Unknown,
        }
    }
}

/// One prior turn. Any JSON value is accepted: fields that are missing or
/// of the wrong type leave the entry unusable, and it is skipped when the
/// prompt is built instead of failing the whole request.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Value")]
pub struct HistoryEntry {
    pub sender: Sender,
    pub text: String,
}

impl From<Value> for HistoryEntry {
    fn from(value: Value) -> Self {
        Self {
            sender: Sender::from_value(value.get("sender")),
            text: value
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        }
    }
}

/// Always sent with HTTP 200; `success` tells the client whether `response`
/// came from the model or is the fallback sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatResponse {
    pub fn success(response: String) -> Self {
        Self {
            response,
            success: true,
            error: None,
        }
    }

    pub fn fallback(fallback_text: &str, err: &ProxyError) -> Self {
        Self {
            response: fallback_text.to_string(),
            success: false,
            error: Some(err.to_string()),
        }
    }
}
