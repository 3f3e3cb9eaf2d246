//! Concurrent decision acquisition.
//!
//! All oracle calls of a tick run with bounded concurrency and a per-call
//! deadline. A slot frees as soon as any call finishes, so one slow agent
//! holds a single slot and never delays the calls queued behind it.
//! Results are put back in input order before they leave this module, so
//! resolution stays deterministic. A failed or late call never fails the
//! tick: the agent gets the fallback decision.

use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use sugarscape_core::context::AgentContext;
use sugarscape_core::error::OracleError;
use sugarscape_core::intent::Decision;
use sugarscape_core::oracle::DecisionOracle;
use sugarscape_core::types::AgentId;
use tracing::warn;

/// Decisions in context order plus the number of calls that failed.
#[derive(Debug, Clone, Default)]
pub struct DecisionBatch {
    pub decisions: Vec<(AgentId, Decision)>,
    pub failures: usize,
}

/// Ask `oracle` about every context, at most `limit` calls in flight.
pub async fn decide_all(
    oracle: &Arc<dyn DecisionOracle>,
    contexts: Vec<AgentContext>,
    deadline: Duration,
    limit: usize,
) -> DecisionBatch {
    let mut outcomes: Vec<(usize, AgentId, Result<Decision, OracleError>)> =
        stream::iter(contexts.into_iter().enumerate())
            .map(|(index, context)| {
                let oracle = Arc::clone(oracle);
                async move {
                    let id = context.status.id;
                    let outcome = match tokio::time::timeout(deadline, oracle.decide(&context)).await {
                        Ok(result) => result,
                        Err(_) => Err(OracleError::Timeout(deadline.as_millis() as u64)),
                    };
                    (index, id, outcome)
                }
            })
            .buffer_unordered(limit.max(1))
            .collect()
            .await;
    outcomes.sort_unstable_by_key(|(index, _, _)| *index);

    let mut batch = DecisionBatch::default();
    for (_, id, outcome) in outcomes {
        let decision = outcome.unwrap_or_else(|e| {
            warn!(agent = %id, oracle = oracle.name(), error = %e, "decision failed, agent stays");
            batch.failures += 1;
            Decision::fallback()
        });
        batch.decisions.push((id, decision));
    }
    batch
}
