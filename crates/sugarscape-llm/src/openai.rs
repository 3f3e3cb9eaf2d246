//! OpenAI-compatible chat completions backend.
//!
//! Requires the `api` feature. Defaults to the xAI endpoint; any API that
//! speaks the OpenAI chat completions protocol works via [`OpenAiBackend::with_endpoint`].

use crate::backend::{LlmBackend, LlmConfig, LlmError, LlmResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub const XAI_API_URL: &str = "https://api.x.ai/v1/chat/completions";
pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Chat completions request.
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

/// Chat completions response.
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Chat completions backend.
///
/// # Example
///
/// ```rust,ignore
/// use sugarscape_llm::{LlmBackend, OpenAiBackend};
///
/// let backend = OpenAiBackend::new("xai-...")?;
/// let text = backend.complete(Some("You are terse."), "Say hi").await?;
/// ```
pub struct OpenAiBackend {
    api_key: String,
    config: LlmConfig,
    client: reqwest::Client,
    endpoint: String,
}

impl OpenAiBackend {
    /// Create a backend for the xAI endpoint.
    pub fn new(api_key: &str) -> LlmResult<Self> {
        Self::with_config(api_key, LlmConfig::xai())
    }

    /// Create with custom config.
    pub fn with_config(api_key: &str, config: LlmConfig) -> LlmResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| LlmError::ConnectionFailed(format!("HTTP client: {e}")))?;

        Ok(Self {
            api_key: api_key.to_string(),
            config,
            client,
            endpoint: XAI_API_URL.to_string(),
        })
    }

    /// Create from the `SUGARSCAPE_API_KEY` environment variable.
    pub fn from_env() -> LlmResult<Self> {
        let api_key = std::env::var("SUGARSCAPE_API_KEY").map_err(|_| LlmError::AuthenticationFailed)?;
        Self::new(&api_key)
    }

    /// Set the model.
    pub fn with_model(mut self, model: &str) -> Self {
        self.config.model = model.to_string();
        self
    }

    /// Use a custom endpoint (OpenAI, Azure, or any compatible API).
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn build_request(&self, system: Option<&str>, prompt: &str) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(sys) = system {
            messages.push(ChatMessage {
                role: "system",
                content: sys.to_string(),
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: prompt.to_string(),
        });
        ChatRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }
}

#[async_trait]
impl LlmBackend for OpenAiBackend {
    fn name(&self) -> &str {
        "openai-compatible"
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }

    async fn complete(&self, system: Option<&str>, prompt: &str) -> LlmResult<String> {
        let request = self.build_request(system, prompt);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    LlmError::ConnectionFailed(format!("Cannot connect to {}", self.endpoint))
                } else if e.is_timeout() {
                    LlmError::Timeout(self.config.timeout_secs)
                } else {
                    LlmError::ApiError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => LlmError::AuthenticationFailed,
                404 => LlmError::ModelNotFound(self.config.model.clone()),
                429 => LlmError::RateLimited(60),
                _ => LlmError::ApiError(format!("API error {}: {}", status, body)),
            });
        }

        let resp: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        resp.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| LlmError::InvalidResponse("No choices in response".to_string()))
    }
}
