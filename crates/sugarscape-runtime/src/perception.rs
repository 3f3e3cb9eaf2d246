//! Building per-agent decision contexts from the frozen tick state.
//!
//! Perception uses the plain coordinate difference, not the toroidal one:
//! two agents on either side of the seam do not see each other even though
//! movement wraps between them.

use crate::config::SimulationConfig;
use crate::registry::{Agent, AgentRegistry, LivingSnapshot};
use crate::world::EnergyField;
use sugarscape_core::context::{AgentContext, AgentStatus, Perception, VisiblePeer};
use sugarscape_core::types::Tick;

/// What `agent` can see: resources, living peers and its inbox.
pub fn perceive(
    agent: &Agent,
    snapshot: &LivingSnapshot,
    registry: &AgentRegistry,
    field: &EnergyField,
    view_range: i64,
) -> Perception {
    let peers = snapshot
        .ids()
        .iter()
        .filter(|id| **id != agent.id)
        .filter_map(|id| registry.get(*id))
        .filter(|other| other.position.within(agent.position, view_range))
        .map(|other| {
            let (dx, dy) = agent.position.offset_to(other.position);
            VisiblePeer {
                id: other.id,
                dx,
                dy,
                personality: other.personality,
            }
        })
        .collect();

    Perception {
        resources: field.visible_from(agent.position, view_range),
        peers,
        messages: agent.inbox.clone(),
    }
}

/// The owned context handed to the oracle.
pub fn build_context(
    agent: &Agent,
    snapshot: &LivingSnapshot,
    registry: &AgentRegistry,
    field: &EnergyField,
    config: &SimulationConfig,
    tick: Tick,
) -> AgentContext {
    AgentContext {
        tick,
        status: AgentStatus {
            id: agent.id,
            energy: agent.energy,
            position: agent.position,
            age: agent.age,
        },
        personality: agent.personality,
        perception: perceive(agent, snapshot, registry, field, config.view_range),
        memory: agent.memory.iter().cloned().collect(),
        population: snapshot.len(),
        rules: config.rules(),
        world_flavor: config.world_flavor.clone(),
    }
}
