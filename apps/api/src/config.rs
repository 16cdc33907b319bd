use anyhow::{bail, Context, Result};
use tracing::warn;

use crate::llm_client::gemini::DEFAULT_GEMINI_API_BASE;

/// Default model used for candidate evaluation when `EVALUATION_MODEL` is unset.
pub const DEFAULT_EVALUATION_MODEL: &str = "gemini-2.0-flash";

/// Which generative-text backend the evaluation pipeline talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelProvider {
    Gemini,
    Anthropic,
}

impl ModelProvider {
    fn parse(raw: &str) -> Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            other => bail!("MODEL_PROVIDER must be 'gemini' or 'anthropic', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub model_provider: ModelProvider,
    pub gemini_api_key: Option<String>,
    pub gemini_api_base: String,
    pub anthropic_api_key: Option<String>,
    pub evaluation_model: String,
    /// Overrides the built-in negative keyword list used to split reasons.
    pub negative_keywords: Option<Vec<String>>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            model_provider: ModelProvider::parse(
                &std::env::var("MODEL_PROVIDER").unwrap_or_else(|_| "gemini".to_string()),
            )?,
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_api_base: optional_env("GEMINI_API_BASE")
                .unwrap_or_else(|| DEFAULT_GEMINI_API_BASE.to_string()),
            anthropic_api_key: optional_env("ANTHROPIC_API_KEY"),
            evaluation_model: optional_env("EVALUATION_MODEL")
                .unwrap_or_else(|| DEFAULT_EVALUATION_MODEL.to_string()),
            negative_keywords: optional_env("EVALUATION_NEGATIVE_KEYWORDS")
                .map(|raw| parse_keyword_list(&raw)),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// Credential for the selected provider. A missing key is not fatal:
    /// model calls will fail and be persisted as `Pending` evaluations.
    pub fn model_api_key(&self) -> String {
        let (key, var) = match self.model_provider {
            ModelProvider::Gemini => (&self.gemini_api_key, "GEMINI_API_KEY"),
            ModelProvider::Anthropic => (&self.anthropic_api_key, "ANTHROPIC_API_KEY"),
        };
        match key {
            Some(key) => key.clone(),
            None => {
                warn!("{var} is not set; model calls for evaluations will fail");
                String::new()
            }
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Splits a comma-separated keyword list. Inner spaces are kept so that
/// entries like `"no "` keep their word-boundary meaning.
fn parse_keyword_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|k| k.trim_start().to_lowercase())
        .filter(|k| !k.trim().is_empty())
        .collect()
}
