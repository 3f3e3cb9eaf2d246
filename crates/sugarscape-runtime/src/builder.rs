//! Simulation builder with explicit placement.
//!
//! [`Simulation::new`] scatters agents and resource clusters at random.
//! The builder lets a caller pin both down instead, which is how scenario
//! tests set up exact energy levels and positions.
//!
//! # Example
//!
//! ```rust
//! use sugarscape_core::oracle::StayOracle;
//! use sugarscape_core::types::GridPos;
//! use sugarscape_runtime::builder::SimulationBuilder;
//!
//! let sim = SimulationBuilder::new()
//!     .grid_size(10)
//!     .seed(7)
//!     .agent(GridPos::new(2, 2), 100)
//!     .agent(GridPos::new(3, 2), 40)
//!     .resource(GridPos::new(2, 3), 50)
//!     .oracle(StayOracle)
//!     .build()
//!     .unwrap();
//! assert_eq!(sim.living_count(), 2);
//! assert_eq!(sim.field().len(), 1);
//! ```

use crate::config::SimulationConfig;
use crate::simulation::Simulation;
use std::sync::Arc;
use sugarscape_core::error::Result;
use sugarscape_core::oracle::{DecisionOracle, StayOracle};
use sugarscape_core::personality::Personality;
use sugarscape_core::types::{Energy, GridPos};

/// Placement of one founding agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentSeed {
    pub position: GridPos,
    pub energy: Energy,
    /// Drawn from the trait table when absent and traits are enabled.
    pub personality: Option<Personality>,
}

/// Builder for [`Simulation`].
///
/// Agents get ids in the order they are added. Adding any agent replaces
/// the random founding population and starts from an empty field; adding
/// any resource replaces the random clusters.
pub struct SimulationBuilder {
    config: SimulationConfig,
    oracle: Option<Arc<dyn DecisionOracle>>,
    agents: Option<Vec<AgentSeed>>,
    resources: Option<Vec<(GridPos, Energy)>>,
}

impl Default for SimulationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulationBuilder {
    pub fn new() -> Self {
        Self {
            config: SimulationConfig::default(),
            oracle: None,
            agents: None,
            resources: None,
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: SimulationConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the grid side. Shrinks the cluster radius if it no longer fits.
    pub fn grid_size(mut self, size: i64) -> Self {
        self.config.grid_size = size;
        self.config.cluster_radius = self.config.cluster_radius.min((size - 1).max(0) / 2);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    pub fn population_cap(mut self, cap: usize) -> Self {
        self.config.population_cap = cap;
        self
    }

    pub fn use_traits(mut self, enabled: bool) -> Self {
        self.config.use_traits = enabled;
        self
    }

    /// Disable trickle spawning.
    pub fn no_spawning(mut self) -> Self {
        self.config.resource_spawn_rate = 0.0;
        self
    }

    pub fn oracle(mut self, oracle: impl DecisionOracle + 'static) -> Self {
        self.oracle = Some(Arc::new(oracle));
        self
    }

    pub fn shared_oracle(mut self, oracle: Arc<dyn DecisionOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn agent(self, position: GridPos, energy: Energy) -> Self {
        self.seed_agent(AgentSeed {
            position,
            energy,
            personality: None,
        })
    }

    pub fn agent_with_personality(self, position: GridPos, energy: Energy, personality: Personality) -> Self {
        self.seed_agent(AgentSeed {
            position,
            energy,
            personality: Some(personality),
        })
    }

    pub fn seed_agent(mut self, seed: AgentSeed) -> Self {
        self.agents.get_or_insert_with(Vec::new).push(seed);
        self
    }

    pub fn resource(mut self, position: GridPos, amount: Energy) -> Self {
        self.resources.get_or_insert_with(Vec::new).push((position, amount));
        self
    }

    /// Validate and build. Without an oracle every agent stays put.
    pub fn build(self) -> Result<Simulation> {
        let mut config = self.config;
        let mut resources = self.resources;
        if let Some(agents) = &self.agents {
            config.population = agents.len();
            resources.get_or_insert_with(Vec::new);
        }
        if let Some(resources) = &resources {
            config.resource_count = resources.len();
        }
        let oracle = self.oracle.unwrap_or_else(|| Arc::new(StayOracle));
        Simulation::assemble(config, oracle, self.agents, resources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sugarscape_core::types::AgentId;

    #[test]
    fn explicit_agents_keep_insertion_order() {
        let sim = SimulationBuilder::new()
            .grid_size(10)
            .agent(GridPos::new(1, 1), 10)
            .agent_with_personality(GridPos::new(2, 2), 20, Personality::Enfj)
            .resource(GridPos::new(5, 5), 50)
            .build()
            .unwrap();
        assert_eq!(sim.agent(AgentId(0)).unwrap().energy, 10);
        assert_eq!(sim.agent(AgentId(1)).unwrap().personality, Some(Personality::Enfj));
        assert_eq!(sim.field().amount_at(GridPos::new(5, 5)), Some(50));
        assert_eq!(sim.config().population, 2);
    }

    #[test]
    fn traits_off_overrides_explicit_personality() {
        let sim = SimulationBuilder::new()
            .use_traits(false)
            .agent_with_personality(GridPos::new(2, 2), 20, Personality::Enfj)
            .build()
            .unwrap();
        assert_eq!(sim.agent(AgentId(0)).unwrap().personality, None);
    }

    #[test]
    fn out_of_grid_agent_is_rejected() {
        let result = SimulationBuilder::new()
            .grid_size(10)
            .agent(GridPos::new(10, 0), 10)
            .build();
        assert!(result.is_err());
    }
}
