//! A [`DecisionOracle`] backed by a language model.

use crate::backend::{LlmBackend, LlmError};
use crate::prompt::{DecisionPrompt, PromptTemplate};
use async_trait::async_trait;
use sugarscape_core::context::AgentContext;
use sugarscape_core::error::{OracleError, OracleResult};
use sugarscape_core::intent::{labelled_field, ActionIntent, Decision};
use sugarscape_core::oracle::DecisionOracle;
use tracing::debug;

/// Asks an [`LlmBackend`] for each agent's decision.
///
/// A reply without an `Action` field, or with one that does not decode,
/// is reported as [`OracleError::Malformed`]; the caller substitutes the
/// fallback decision.
pub struct LlmOracle<B> {
    backend: B,
}

impl<B: LlmBackend> LlmOracle<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Whether the backend answers at all; run once before a simulation.
    pub async fn is_available(&self) -> bool {
        match self.backend.health_check().await {
            Ok(up) => up,
            Err(e) => {
                debug!(backend = self.backend.name(), error = %e, "health check failed");
                false
            }
        }
    }
}

impl From<LlmError> for OracleError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Timeout(secs) => OracleError::Timeout(u64::from(secs) * 1000),
            LlmError::InvalidResponse(msg) => OracleError::Malformed(msg),
            LlmError::ConnectionFailed(msg) => OracleError::Unavailable(msg),
            LlmError::AuthenticationFailed => OracleError::Unavailable("authentication failed".into()),
            LlmError::ModelNotFound(model) => OracleError::Unavailable(format!("model not found: {model}")),
            other => OracleError::Transport(other.to_string()),
        }
    }
}

#[async_trait]
impl<B: LlmBackend> DecisionOracle for LlmOracle<B> {
    fn name(&self) -> &str {
        self.backend.name()
    }

    async fn decide(&self, context: &AgentContext) -> OracleResult<Decision> {
        let prompt = DecisionPrompt::new(context);
        let system = prompt.system_prompt();
        let response = self.backend.complete(system.as_deref(), &prompt.generate()).await?;

        let Some(action) = labelled_field(&response, "Action") else {
            return Err(OracleError::Malformed(format!(
                "no Action field in reply: {}",
                response.chars().take(80).collect::<String>()
            )));
        };
        if let Err(e) = action.parse::<ActionIntent>() {
            debug!(agent = %context.status.id, action, error = %e, "undecodable action");
            return Err(OracleError::Malformed(e.to_string()));
        }
        Ok(Decision::from_response(&response))
    }
}
