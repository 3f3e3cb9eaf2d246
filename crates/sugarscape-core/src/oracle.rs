//! The decision oracle contract.
//!
//! The engine consumes decisions, it does not make them. Anything that can
//! turn an [`AgentContext`] into a [`Decision`] plugs in here: a remote
//! language model, a scripted test double, or the always-`Stay` default.

use crate::context::AgentContext;
use crate::error::OracleResult;
use crate::intent::{ActionIntent, Decision};
use crate::types::{AgentId, Tick};
use async_trait::async_trait;
use std::collections::HashMap;

/// Source of per-agent decisions.
///
/// Calls for different agents in the same tick are independent and may be
/// in flight concurrently, so implementations must not keep cross-agent
/// state that affects answers.
#[async_trait]
pub trait DecisionOracle: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Decide what the agent does this tick.
    async fn decide(&self, context: &AgentContext) -> OracleResult<Decision>;
}

/// Deterministic oracle that always stays put.
#[derive(Debug, Clone, Default)]
pub struct StayOracle;

#[async_trait]
impl DecisionOracle for StayOracle {
    fn name(&self) -> &str {
        "stay"
    }

    async fn decide(&self, _context: &AgentContext) -> OracleResult<Decision> {
        Ok(Decision::new(ActionIntent::Stay)
            .with_message("Hello world")
            .with_rationale("Safe choice in mock mode"))
    }
}

/// Oracle that replays a fixed script keyed by agent and tick.
///
/// Unscripted (agent, tick) pairs stay put with an empty rationale.
#[derive(Debug, Clone, Default)]
pub struct ScriptedOracle {
    script: HashMap<(AgentId, Tick), Decision>,
}

impl ScriptedOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a bare intent.
    pub fn with_intent(self, agent: AgentId, tick: Tick, intent: ActionIntent) -> Self {
        self.with_decision(agent, tick, Decision::new(intent))
    }

    /// Script a full decision.
    pub fn with_decision(mut self, agent: AgentId, tick: Tick, decision: Decision) -> Self {
        self.script.insert((agent, tick), decision);
        self
    }

    /// Script consecutive ticks starting at tick 1.
    pub fn with_plan(mut self, agent: AgentId, intents: impl IntoIterator<Item = ActionIntent>) -> Self {
        for (offset, intent) in intents.into_iter().enumerate() {
            self.script
                .insert((agent, offset as Tick + 1), Decision::new(intent));
        }
        self
    }
}

#[async_trait]
impl DecisionOracle for ScriptedOracle {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn decide(&self, context: &AgentContext) -> OracleResult<Decision> {
        Ok(self
            .script
            .get(&(context.status.id, context.tick))
            .cloned()
            .unwrap_or_else(Decision::fallback))
    }
}
