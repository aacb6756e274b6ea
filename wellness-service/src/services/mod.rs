pub mod blog;
pub mod chat;
pub mod error;
pub mod fallback;
pub mod metrics;
pub mod providers;
pub mod retry;

pub use blog::BlogDraftProxy;
pub use chat::ChatReplyProxy;
pub use error::ProxyError;
pub use providers::{ProviderError, TextProvider};
pub use retry::RetryConfig;
