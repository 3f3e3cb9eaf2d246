//! What an agent knows when it decides: its perception, status and memory.
//!
//! Contexts are owned values built from the frozen tick snapshot, so the
//! decision phase can run concurrently without touching shared state.

use crate::personality::Personality;
use crate::types::{AgentId, Energy, GridPos, Message, Tick};
use serde::{Deserialize, Serialize};

/// A resource cell inside the agent's view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleResource {
    pub dx: i64,
    pub dy: i64,
    pub amount: Energy,
}

/// Another living agent inside the agent's view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisiblePeer {
    pub id: AgentId,
    pub dx: i64,
    pub dy: i64,
    pub personality: Option<Personality>,
}

/// The locally visible slice of the world.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Perception {
    pub resources: Vec<VisibleResource>,
    pub peers: Vec<VisiblePeer>,
    /// The agent's inbox for this tick.
    pub messages: Vec<Message>,
}

/// The agent's own vital signs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentStatus {
    pub id: AgentId,
    pub energy: Energy,
    pub position: GridPos,
    pub age: Tick,
}

/// World rules an oracle may need to reason about costs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldRules {
    pub move_cost: Energy,
    pub stay_cost: Energy,
    pub reproduce_cost: Energy,
    pub population_cap: usize,
    pub resource_yield: Energy,
    pub view_range: i64,
}

/// Everything handed to the oracle for one agent in one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentContext {
    pub tick: Tick,
    pub status: AgentStatus,
    pub personality: Option<Personality>,
    pub perception: Perception,
    /// Most recent summaries last.
    pub memory: Vec<String>,
    /// Living agents at the start of this tick.
    pub population: usize,
    pub rules: WorldRules,
    /// Optional lore prepended to the oracle's system context.
    pub world_flavor: Option<String>,
}
