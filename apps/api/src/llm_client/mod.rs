/// LLM Client: the single point of entry for all generative-model calls.
///
/// ARCHITECTURAL RULE: No other module may call a model API directly.
/// All model interactions go through a `TextModel` implementation from this module.
///
/// Calls are single-attempt. A failure is returned to the caller as a
/// `ModelInvocationError`; it is never retried here.
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::config::{Config, ModelProvider};

pub mod anthropic;
pub mod gemini;
pub mod prompts;

pub use anthropic::AnthropicClient;
pub use gemini::GeminiClient;

const HTTP_TIMEOUT_SECS: u64 = 120;

/// Any failure of an outbound model call: transport, auth, quota or an
/// undecodable body. The `Display` output is the message persisted on
/// `Pending` evaluations, so it must stay human readable.
#[derive(Debug, Error)]
pub enum ModelInvocationError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode model response: {0}")]
    Decode(String),
}

/// A generative-text backend: `(model identifier, prompt) -> raw text`.
///
/// An empty or whitespace-only completion is a success, not an error;
/// downstream parsing treats it as "no extractable fields".
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, ModelInvocationError>;

    /// Short backend label for logs.
    fn backend(&self) -> &'static str;
}

/// Builds the shared reqwest client used by every backend.
pub(crate) fn build_http_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .build()
        .expect("Failed to build HTTP client")
}

/// Picks the configured backend and injects its credential.
pub fn from_config(config: &Config) -> Arc<dyn TextModel> {
    let api_key = config.model_api_key();
    match config.model_provider {
        ModelProvider::Gemini => Arc::new(GeminiClient::new(
            api_key,
            config.gemini_api_base.clone(),
        )),
        ModelProvider::Anthropic => Arc::new(AnthropicClient::new(api_key)),
    }
}

/// Reads a non-2xx body and extracts the provider's error message if the
/// body is the usual `{"error": {"message": ...}}` envelope.
pub(crate) async fn api_error(response: reqwest::Response) -> ModelInvocationError {
    #[derive(serde::Deserialize)]
    struct ErrorEnvelope {
        error: ErrorBody,
    }

    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: String,
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);

    ModelInvocationError::Api { status, message }
}
