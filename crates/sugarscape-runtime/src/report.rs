//! Serializable per-tick output.

use crate::event::SimEvent;
use crate::metrics::{Rates, Stats};
use crate::registry::Agent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use sugarscape_core::intent::ActionIntent;
use sugarscape_core::personality::Personality;
use sugarscape_core::types::{AgentId, Energy, GridPos, Message, Tick};

/// Read-only view of one agent at the end of a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub position: GridPos,
    pub energy: Energy,
    pub age: Tick,
    pub alive: bool,
    pub parent: Option<AgentId>,
    pub children: Vec<AgentId>,
    pub personality: Option<Personality>,
    pub action: Option<ActionIntent>,
    pub rationale: String,
    pub message: String,
    pub memory: Vec<String>,
    /// Messages the agent read this tick.
    pub mailbox: Vec<Message>,
}

impl From<&Agent> for AgentSnapshot {
    fn from(agent: &Agent) -> Self {
        let decision = agent.last_decision.as_ref();
        Self {
            id: agent.id,
            position: agent.position,
            energy: agent.energy,
            age: agent.age,
            alive: agent.alive,
            parent: agent.parent,
            children: agent.children.clone(),
            personality: agent.personality,
            action: decision.map(|d| d.intent),
            rationale: decision.map(|d| d.rationale.clone()).unwrap_or_default(),
            message: decision.map(|d| d.message.clone()).unwrap_or_default(),
            memory: agent.memory.iter().cloned().collect(),
            mailbox: agent.inbox.clone(),
        }
    }
}

/// Everything observable about one completed tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: Tick,
    /// Agents alive at the end of the tick, newborns included.
    pub agents: Vec<AgentSnapshot>,
    pub resource_cells: usize,
    pub living_at_start: usize,
    pub stats: Stats,
    pub rates: Rates,
    pub trait_distribution: BTreeMap<String, f64>,
    pub births: Vec<AgentId>,
    pub deaths: Vec<AgentId>,
    pub messages_sent: usize,
    pub oracle_failures: usize,
    pub events: Vec<SimEvent>,
}

impl TickReport {
    pub fn population(&self) -> usize {
        self.agents.len()
    }

    pub fn agent(&self, id: AgentId) -> Option<&AgentSnapshot> {
        self.agents.iter().find(|a| a.id == id)
    }
}
