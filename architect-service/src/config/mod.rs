use secrecy::Secret;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::services::content_filter::DEFAULT_BANNED_TERMS;

/// Uploads above this size are rejected before the handler runs.
const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

const DEFAULT_TEXT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_IMAGE_TIMEOUT_SECS: u64 = 120;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct ArchitectConfig {
    pub common: core_config::Config,
    pub models: ModelConfig,
    pub gemini: ProviderConfig,
    pub openai: ProviderConfig,
    pub fetch: FetchConfig,
    pub limits: LimitsConfig,
    pub content_filter: ContentFilterConfig,
    pub otlp_endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ModelConfig {
    /// Text/vision model (e.g., gemini-2.0-flash)
    pub text_model: String,
    /// Image generation model (e.g., dall-e-3)
    pub image_model: String,
    /// Square image resolution requested from the image model
    pub image_size: String,
}

#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: Secret<String>,
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct LimitsConfig {
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct ContentFilterConfig {
    pub banned_terms: Vec<String>,
}

impl ArchitectConfig {
    pub fn load() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;
        Self::from_lookup(common, |key| env::var(key).ok())
    }

    /// Build the service configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let is_prod = lookup("ENVIRONMENT").unwrap_or_else(|| "dev".to_string()) == "prod";
        let env = EnvSource { lookup, is_prod };

        Ok(ArchitectConfig {
            models: ModelConfig {
                text_model: env.get("ARCHITECT_TEXT_MODEL", Some("gemini-2.0-flash"))?,
                image_model: env.get("ARCHITECT_IMAGE_MODEL", Some("dall-e-3"))?,
                image_size: env.get("ARCHITECT_IMAGE_SIZE", Some("1024x1024"))?,
            },
            gemini: ProviderConfig {
                api_key: Secret::new(env.get("GEMINI_API_KEY", None)?),
                base_url: env.get(
                    "GEMINI_API_BASE",
                    Some("https://generativelanguage.googleapis.com/v1beta"),
                )?,
                timeout: Duration::from_secs(
                    env.parse("ARCHITECT_TEXT_TIMEOUT_SECS", DEFAULT_TEXT_TIMEOUT_SECS)?,
                ),
            },
            openai: ProviderConfig {
                api_key: Secret::new(env.get("OPENAI_API_KEY", None)?),
                base_url: env.get("OPENAI_API_BASE", Some("https://api.openai.com/v1"))?,
                timeout: Duration::from_secs(
                    env.parse("ARCHITECT_IMAGE_TIMEOUT_SECS", DEFAULT_IMAGE_TIMEOUT_SECS)?,
                ),
            },
            fetch: FetchConfig {
                timeout: Duration::from_secs(
                    env.parse("ARCHITECT_FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT_SECS)?,
                ),
            },
            limits: LimitsConfig {
                max_upload_bytes: env
                    .parse("ARCHITECT_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            },
            content_filter: ContentFilterConfig {
                banned_terms: match env.optional("ARCHITECT_BANNED_TERMS") {
                    Some(raw) => parse_term_list(&raw),
                    None => DEFAULT_BANNED_TERMS.iter().map(|t| t.to_string()).collect(),
                },
            },
            otlp_endpoint: env.optional("OTLP_ENDPOINT").filter(|s| !s.is_empty()),
            common,
        })
    }
}

/// Split a comma separated list, dropping blanks and lower-casing entries.
fn parse_term_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

struct EnvSource<F> {
    lookup: F,
    is_prod: bool,
}

impl<F> EnvSource<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
    }

    fn get(&self, key: &str, default: Option<&str>) -> Result<String, AppError> {
        match (self.lookup)(key) {
            Some(val) => Ok(val),
            None => {
                if self.is_prod {
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

    fn parse<T>(&self, key: &str, default: T) -> Result<T, AppError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match (self.lookup)(key) {
            Some(raw) => raw.trim().parse().map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!("{} has invalid value {:?}: {}", key, raw, e))
            }),
            None => Ok(default),
        }
    }
}
