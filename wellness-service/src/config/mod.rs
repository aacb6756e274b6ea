use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::services::providers::gemini::{GeminiConfig, GEMINI_API_BASE};
use crate::services::providers::{GenerationParams, SafetyThreshold};
use crate::services::RetryConfig;

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CHAT_MODEL: &str = "gemini-1.5-flash-latest";
const DEFAULT_BLOG_MODEL: &str = "gemini-pro";

#[derive(Debug, Clone)]
pub struct WellnessConfig {
    pub common: core_config::Config,
    pub gemini: GeminiSettings,
    pub chat: ProxySettings,
    pub blog: ProxySettings,
    pub retry: RetryConfig,
    pub otlp_endpoint: Option<String>,
}

/// Which [`TextProvider`](crate::services::TextProvider) backs the proxies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    Mock,
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "mock" => Ok(ProviderKind::Mock),
            other => Err(format!("unknown provider: {}", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub provider: ProviderKind,
    /// Absent keys are not a startup error: calls fail at request time and
    /// the proxies serve fallback text.
    pub api_key: Option<Secret<String>>,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiSettings {
    pub fn provider_config(&self) -> GeminiConfig {
        GeminiConfig {
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            timeout: self.timeout,
        }
    }
}

/// Model, sampling and safety settings for one proxy.
#[derive(Debug, Clone, PartialEq)]
pub struct ProxySettings {
    pub model: String,
    pub params: GenerationParams,
    pub safety_threshold: SafetyThreshold,
}

impl ProxySettings {
    pub fn chat_defaults() -> Self {
        Self {
            model: DEFAULT_CHAT_MODEL.to_string(),
            params: GenerationParams {
                temperature: 0.7,
                top_k: 40,
                top_p: 0.95,
                max_output_tokens: 300,
            },
            safety_threshold: SafetyThreshold::BlockMediumAndAbove,
        }
    }

    pub fn blog_defaults() -> Self {
        Self {
            model: DEFAULT_BLOG_MODEL.to_string(),
            params: GenerationParams {
                temperature: 0.8,
                top_k: 40,
                top_p: 0.95,
                max_output_tokens: 1000,
            },
            safety_threshold: SafetyThreshold::BlockMediumAndAbove,
        }
    }
}

impl WellnessConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        let safety_threshold: SafetyThreshold = parse_env(
            "GENAI_SAFETY_THRESHOLD",
            SafetyThreshold::default().as_str(),
            is_prod,
        )?;

        let mut chat = ProxySettings::chat_defaults();
        chat.model = get_env("CHAT_MODEL", Some(DEFAULT_CHAT_MODEL), is_prod)?;
        chat.safety_threshold = safety_threshold;

        let mut blog = ProxySettings::blog_defaults();
        blog.model = get_env("BLOG_MODEL", Some(DEFAULT_BLOG_MODEL), is_prod)?;
        blog.safety_threshold = safety_threshold;

        let max_retries: u32 = parse_env("GENAI_MAX_RETRIES", "0", is_prod)?;
        let backoff_ms: u64 = parse_env("GENAI_RETRY_BACKOFF_MS", "200", is_prod)?;
        let timeout_secs: u64 = parse_env(
            "GEMINI_TIMEOUT_SECS",
            &DEFAULT_TIMEOUT_SECS.to_string(),
            is_prod,
        )?;

        Ok(WellnessConfig {
            common: common_config,
            gemini: GeminiSettings {
                provider: parse_env("GENAI_PROVIDER", "gemini", is_prod)?,
                api_key: env::var("GEMINI_API_KEY")
                    .ok()
                    .filter(|key| !key.trim().is_empty())
                    .map(Secret::new),
                base_url: get_env("GEMINI_API_BASE", Some(GEMINI_API_BASE), is_prod)?,
                timeout: Duration::from_secs(timeout_secs),
            },
            chat,
            blog,
            retry: RetryConfig::with_max_retries(max_retries, Duration::from_millis(backoff_ms)),
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|e| !e.is_empty()),
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}

fn parse_env<T>(key: &str, default: &str, is_prod: bool) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get_env(key, Some(default), is_prod)?;
    raw.parse().map_err(|e: T::Err| {
        AppError::ConfigError(anyhow::anyhow!("{} has invalid value '{}': {}", key, raw, e))
    })
}
