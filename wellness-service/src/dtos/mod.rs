pub mod blog;
pub mod chat;

pub use blog::{BlogDraftRequest, BlogDraftResponse, BlogMetadata};
pub use chat::{ChatRequest, ChatResponse, HistoryEntry, Sender};

use validator::ValidationError;

/// Rejects strings that are empty once surrounding whitespace is removed.
pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}
