//! Events recorded while a tick resolves.

use serde::{Deserialize, Serialize};
use sugarscape_core::intent::ActionIntent;
use sugarscape_core::types::{AgentId, Energy, GridPos};

/// Why an agent died.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum DeathCause {
    Attacked { by: AgentId },
    Starved,
}

/// Something that happened during resolution, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SimEvent {
    Moved {
        id: AgentId,
        to: GridPos,
        harvested: Energy,
    },
    Stayed {
        id: AgentId,
    },
    Shared {
        from: AgentId,
        to: AgentId,
        amount: Energy,
    },
    Attacked {
        attacker: AgentId,
        target: AgentId,
        amount: Energy,
    },
    /// The cost was paid; the birth is decided later in the tick.
    ReproductionAttempted {
        id: AgentId,
    },
    /// An intent that failed validation and had no effect.
    Ignored {
        id: AgentId,
        intent: ActionIntent,
        reason: String,
    },
    Died {
        id: AgentId,
        cause: DeathCause,
    },
    Born {
        id: AgentId,
        parent: AgentId,
        position: GridPos,
    },
}
