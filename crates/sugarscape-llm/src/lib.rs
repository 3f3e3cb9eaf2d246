//! # Sugarscape LLM
//!
//! Language-model decision oracle for the sugarscape simulation.
//!
//! An [`LlmOracle`] renders each agent's context into a prompt, sends it
//! to an [`LlmBackend`] and decodes the `Action:` / `Message:` / `Thought:`
//! reply into a [`Decision`](sugarscape_core::intent::Decision).
//!
//! ## Features
//!
//! - `api`: OpenAI-compatible HTTP backend (xAI by default)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sugarscape_llm::{LlmOracle, OpenAiBackend};
//!
//! let oracle = LlmOracle::new(OpenAiBackend::from_env()?);
//! let decision = oracle.decide(&context).await?;
//! ```

mod backend;
mod oracle;
mod prompt;

pub use backend::{LlmBackend, LlmConfig, LlmError, LlmResult, MockBackend, MOCK_RESPONSE};
pub use oracle::LlmOracle;
pub use prompt::{DecisionPrompt, PromptTemplate};

#[cfg(feature = "api")]
mod openai;
#[cfg(feature = "api")]
pub use openai::{OpenAiBackend, OPENAI_API_URL, XAI_API_URL};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{LlmBackend, LlmConfig, LlmError, LlmResult, MockBackend};
    pub use crate::{DecisionPrompt, LlmOracle, PromptTemplate};

    #[cfg(feature = "api")]
    pub use crate::OpenAiBackend;
}
