//! Core LLM backend trait.

use async_trait::async_trait;
use thiserror::Error;

/// LLM-related errors.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Rate limited: retry after {0} seconds")]
    RateLimited(u32),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Authentication failed")]
    AuthenticationFailed,

    #[error("Timeout after {0} seconds")]
    Timeout(u32),
}

/// Result type for LLM operations.
pub type LlmResult<T> = Result<T, LlmError>;

/// Configuration for LLM requests.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Model name/identifier.
    pub model: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature; the provider default when unset.
    pub temperature: Option<f32>,
    /// Request timeout in seconds.
    pub timeout_secs: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "default".to_string(),
            max_tokens: 150,
            temperature: None,
            timeout_secs: 30,
        }
    }
}

impl LlmConfig {
    /// Create config for the xAI chat completions API.
    pub fn xai() -> Self {
        Self {
            model: "grok-4-fast-non-reasoning".to_string(),
            ..Self::default()
        }
    }

    /// Create config for OpenAI.
    pub fn openai() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            ..Self::default()
        }
    }

    /// Set the model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set max tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature.clamp(0.0, 2.0));
        self
    }

    /// Set timeout.
    pub fn with_timeout(mut self, timeout_secs: u32) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Core trait for LLM backends.
///
/// A backend turns a system prompt and a user prompt into raw completion
/// text. Interpreting that text is the caller's job.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Get the backend name.
    fn name(&self) -> &str;

    /// Get the current configuration.
    fn config(&self) -> &LlmConfig;

    /// Generate a completion.
    async fn complete(&self, system: Option<&str>, prompt: &str) -> LlmResult<String>;

    /// Check if the backend is available.
    async fn health_check(&self) -> LlmResult<bool> {
        match self.complete(None, "ping").await {
            Ok(_) => Ok(true),
            Err(LlmError::ConnectionFailed(_)) | Err(LlmError::AuthenticationFailed) => Ok(false),
            Err(_) => Ok(true),
        }
    }
}

/// Canned reply of the mock backend when no pattern matches.
pub const MOCK_RESPONSE: &str =
    "Action: [Stay]\nMessage: [Hello world]\nThought: [Safe choice in mock mode]";

/// A mock backend for testing and offline runs.
pub struct MockBackend {
    config: LlmConfig,
    responses: Vec<(String, String)>,
}

impl MockBackend {
    /// Create a new mock backend.
    pub fn new() -> Self {
        Self {
            config: LlmConfig::default().with_model("mock"),
            responses: Vec::new(),
        }
    }

    /// Add a canned response for a prompt pattern. Earlier patterns win.
    pub fn with_response(mut self, pattern: &str, response: &str) -> Self {
        self.responses.push((pattern.to_string(), response.to_string()));
        self
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn config(&self) -> &LlmConfig {
        &self.config
    }

    async fn complete(&self, _system: Option<&str>, prompt: &str) -> LlmResult<String> {
        for (pattern, response) in &self.responses {
            if prompt.contains(pattern.as_str()) {
                return Ok(response.clone());
            }
        }
        Ok(MOCK_RESPONSE.to_string())
    }
}
