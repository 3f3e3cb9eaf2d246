//! Agent storage.
//!
//! The registry owns every agent that ever lived, dead ones included, so
//! lineage and exports can refer back to them. Ids are dense and issued in
//! creation order, which makes "ascending id" the same as "oldest first".

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use sugarscape_core::intent::Decision;
use sugarscape_core::personality::Personality;
use sugarscape_core::types::{AgentId, Energy, GridPos, Message, Tick};

/// Recent-action summaries kept per agent.
pub const MEMORY_DEPTH: usize = 3;

/// One agent's full state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub position: GridPos,
    pub energy: Energy,
    /// Ticks in which the agent acted.
    pub age: Tick,
    pub personality: Option<Personality>,
    pub alive: bool,
    pub parent: Option<AgentId>,
    pub children: Vec<AgentId>,
    /// Last [`MEMORY_DEPTH`] summaries, oldest first.
    pub memory: VecDeque<String>,
    /// Messages readable this tick.
    pub inbox: Vec<Message>,
    /// Messages arriving next tick.
    pub outbox: Vec<Message>,
    /// The decision resolved for this agent in its latest acting tick.
    pub last_decision: Option<Decision>,
    pub born_tick: Tick,
    pub died_tick: Option<Tick>,
}

impl Agent {
    /// Append a memory entry, dropping the oldest past [`MEMORY_DEPTH`].
    pub fn remember(&mut self, entry: String) {
        self.memory.push_back(entry);
        while self.memory.len() > MEMORY_DEPTH {
            self.memory.pop_front();
        }
    }
}

/// Ids of the agents alive at the start of a tick, ascending.
///
/// Births and deaths during the tick do not change it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LivingSnapshot {
    ids: Vec<AgentId>,
}

impl LivingSnapshot {
    pub fn ids(&self) -> &[AgentId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: AgentId) -> bool {
        self.ids.binary_search(&id).is_ok()
    }
}

/// Every agent created during the run, indexed by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentRegistry {
    agents: Vec<Agent>,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a living agent and link it to its parent.
    pub fn create(
        &mut self,
        position: GridPos,
        energy: Energy,
        personality: Option<Personality>,
        parent: Option<AgentId>,
        tick: Tick,
    ) -> AgentId {
        let id = AgentId(self.agents.len() as u64);
        if let Some(parent) = parent.and_then(|p| self.agents.get_mut(p.index())) {
            parent.children.push(id);
        }
        self.agents.push(Agent {
            id,
            position,
            energy,
            age: 0,
            personality,
            alive: true,
            parent,
            children: Vec::new(),
            memory: VecDeque::with_capacity(MEMORY_DEPTH),
            inbox: Vec::new(),
            outbox: Vec::new(),
            last_decision: None,
            born_tick: tick,
            died_tick: None,
        });
        id
    }

    pub fn get(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(id.index())
    }

    pub fn get_mut(&mut self, id: AgentId) -> Option<&mut Agent> {
        self.agents.get_mut(id.index())
    }

    /// Whether `id` names a living agent.
    pub fn is_alive(&self, id: AgentId) -> bool {
        self.get(id).is_some_and(|a| a.alive)
    }

    /// Mark an agent dead. Returns `false` if it was already dead or unknown,
    /// so each death is counted once.
    pub fn mark_dead(&mut self, id: AgentId, tick: Tick) -> bool {
        match self.get_mut(id) {
            Some(agent) if agent.alive => {
                agent.alive = false;
                agent.died_tick = Some(tick);
                true
            }
            _ => false,
        }
    }

    pub fn living_snapshot(&self) -> LivingSnapshot {
        LivingSnapshot {
            ids: self.living().map(|a| a.id).collect(),
        }
    }

    /// Living agents in ascending id order.
    pub fn living(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter().filter(|a| a.alive)
    }

    pub fn living_count(&self) -> usize {
        self.living().count()
    }

    /// All agents, dead included.
    pub fn iter(&self) -> impl Iterator<Item = &Agent> {
        self.agents.iter()
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}
