//! Family trees built from parent links.
//!
//! The registry records each agent's parent; this module turns those links
//! into a petgraph `DiGraph` (parent -> child) for descendant and
//! generation queries.

use crate::registry::AgentRegistry;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use sugarscape_core::types::AgentId;

/// Aggregate lineage figures for a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineageSummary {
    /// Agents without a parent.
    pub founders: usize,
    /// Founders with at least one living descendant (themselves included).
    pub surviving_lineages: usize,
    /// Deepest generation reached; founders are generation 0.
    pub max_generation: usize,
    /// The founder with the most descendants, and that count.
    pub largest_family: Option<(AgentId, usize)>,
}

/// Parent -> child graph over every agent ever created.
pub struct LineageGraph {
    graph: DiGraph<AgentId, ()>,
    node_index: HashMap<AgentId, NodeIndex>,
    alive: HashMap<AgentId, bool>,
}

impl LineageGraph {
    pub fn from_registry(registry: &AgentRegistry) -> Self {
        let mut graph = DiGraph::new();
        let mut node_index = HashMap::new();
        let mut alive = HashMap::new();
        for agent in registry.iter() {
            node_index.insert(agent.id, graph.add_node(agent.id));
            alive.insert(agent.id, agent.alive);
        }
        for agent in registry.iter() {
            if let Some(parent) = agent.parent {
                if let (Some(p), Some(c)) = (node_index.get(&parent), node_index.get(&agent.id)) {
                    graph.add_edge(*p, *c, ());
                }
            }
        }
        Self {
            graph,
            node_index,
            alive,
        }
    }

    /// All descendants of `id`, excluding `id`, in breadth-first order.
    pub fn descendants(&self, id: AgentId) -> Vec<AgentId> {
        let Some(start) = self.node_index.get(&id) else {
            return Vec::new();
        };
        let mut bfs = Bfs::new(&self.graph, *start);
        let mut out = Vec::new();
        while let Some(node) = bfs.next(&self.graph) {
            if node != *start {
                out.push(self.graph[node]);
            }
        }
        out
    }

    /// Number of ancestors between `id` and its founder.
    pub fn generation(&self, id: AgentId) -> usize {
        let Some(mut node) = self.node_index.get(&id).copied() else {
            return 0;
        };
        let mut depth = 0;
        while let Some(parent) = self.graph.neighbors_directed(node, Direction::Incoming).next() {
            node = parent;
            depth += 1;
        }
        depth
    }

    /// Agents with no parent, ascending.
    pub fn founders(&self) -> Vec<AgentId> {
        let mut founders: Vec<AgentId> = self
            .graph
            .node_indices()
            .filter(|n| {
                self.graph
                    .neighbors_directed(*n, Direction::Incoming)
                    .next()
                    .is_none()
            })
            .map(|n| self.graph[n])
            .collect();
        founders.sort();
        founders
    }

    pub fn summary(&self) -> LineageSummary {
        let founders = self.founders();
        let mut surviving_lineages = 0;
        let mut largest_family: Option<(AgentId, usize)> = None;
        for founder in &founders {
            let family = self.descendants(*founder);
            let is_alive = |id: &AgentId| self.alive.get(id).copied().unwrap_or(false);
            if is_alive(founder) || family.iter().any(is_alive) {
                surviving_lineages += 1;
            }
            if largest_family.map_or(true, |(_, n)| family.len() > n) {
                largest_family = Some((*founder, family.len()));
            }
        }
        let max_generation = self
            .node_index
            .keys()
            .map(|id| self.generation(*id))
            .max()
            .unwrap_or(0);

        LineageSummary {
            founders: founders.len(),
            surviving_lineages,
            max_generation,
            largest_family,
        }
    }
}
