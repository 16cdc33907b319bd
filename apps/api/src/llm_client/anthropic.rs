//! Anthropic Messages API backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::prompts::JSON_ONLY_SYSTEM;
use super::{api_error, build_http_client, ModelInvocationError, TextModel};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 2048;

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl MessagesResponse {
    /// Extracts the text content from the first text block.
    pub fn text(&self) -> Option<&str> {
        self.content
            .iter()
            .find(|b| b.block_type == "text")
            .and_then(|b| b.text.as_deref())
    }
}

#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    api_key: String,
    url: String,
}

impl AnthropicClient {
    pub fn new(api_key: String) -> Self {
        Self::with_url(api_key, ANTHROPIC_API_URL.to_string())
    }

    pub fn with_url(api_key: String, url: String) -> Self {
        Self {
            client: build_http_client(),
            api_key,
            url,
        }
    }
}

#[async_trait]
impl TextModel for AnthropicClient {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, ModelInvocationError> {
        let request_body = AnthropicRequest {
            model,
            max_tokens: MAX_TOKENS,
            system: JSON_ONLY_SYSTEM,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                warn!("Anthropic request failed for model {model}: {e}");
                ModelInvocationError::from(e)
            })?;

        if !response.status().is_success() {
            let err = api_error(response).await;
            warn!("Anthropic call failed for model {model}: {err}");
            return Err(err);
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| {
                warn!("Anthropic response for model {model} could not be decoded: {e}");
                ModelInvocationError::Decode(e.to_string())
            })?;

        if let Some(usage) = &body.usage {
            debug!(
                "Anthropic call succeeded: input_tokens={}, output_tokens={}",
                usage.input_tokens, usage.output_tokens
            );
        }

        Ok(body.text().unwrap_or_default().to_string())
    }

    fn backend(&self) -> &'static str {
        "anthropic"
    }
}
