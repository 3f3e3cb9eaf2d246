//! Simulation parameters.
//!
//! Every tunable of a run lives in [`SimulationConfig`]. The struct is
//! serde-friendly with per-field defaults, so a TOML file only needs the
//! fields it changes. [`SimulationConfig::validate`] runs before any tick.

use serde::{Deserialize, Serialize};
use sugarscape_core::context::WorldRules;
use sugarscape_core::error::{Result, SimError};
use sugarscape_core::personality::{TraitTable, DEFAULT_WEIGHTS};
use sugarscape_core::types::Energy;

/// Configuration for one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Agents placed at start (default: 5).
    pub population: usize,
    /// Side of the square grid (default: 30).
    pub grid_size: i64,
    /// Chebyshev radius of perception, attack and messaging (default: 5).
    pub view_range: i64,
    /// Energy of founding agents (default: 150).
    pub initial_energy: Energy,
    /// Energy of children (default: 150).
    pub child_energy: Energy,
    /// Upkeep of a move (default: 2).
    pub move_cost: Energy,
    /// Upkeep of staying put (default: 1).
    pub stay_cost: Energy,
    /// Upkeep of sharing (default: 0).
    pub share_cost: Energy,
    /// Upkeep of attacking (default: 0).
    pub attack_cost: Energy,
    /// Upkeep of reproducing, charged even when the cap blocks the birth (default: 70).
    pub reproduce_cost: Energy,
    /// Resource cells placed at start (default: 20).
    pub resource_count: usize,
    /// Cluster centers per placement (default: 3).
    pub resource_clusters: usize,
    /// Max offset of a cell from its cluster center (default: 5).
    pub cluster_radius: i64,
    /// Probability of one new cell per tick (default: 0.001).
    pub resource_spawn_rate: f64,
    /// Energy gained by claiming a cell (default: 50).
    pub resource_yield: Energy,
    /// Births are blocked once the tick-start population reaches this (default: 60).
    pub population_cap: usize,
    /// Assign personalities to agents (default: true).
    pub use_traits: bool,
    /// Override of the sixteen population weights.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trait_weights: Option<Vec<f64>>,
    /// Chance that a child keeps its parent's personality (default: 0.7).
    pub inherit_probability: f64,
    /// Seed for reproducible runs; entropy when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Lore prepended to every oracle context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub world_flavor: Option<String>,
    /// Per-call oracle deadline in milliseconds (default: 30000).
    pub decision_timeout_ms: u64,
    /// Oracle calls in flight at once (default: 16).
    pub max_concurrent_decisions: usize,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            population: 5,
            grid_size: 30,
            view_range: 5,
            initial_energy: 150,
            child_energy: 150,
            move_cost: 2,
            stay_cost: 1,
            share_cost: 0,
            attack_cost: 0,
            reproduce_cost: 70,
            resource_count: 20,
            resource_clusters: 3,
            cluster_radius: 5,
            resource_spawn_rate: 0.001,
            resource_yield: 50,
            population_cap: 60,
            use_traits: true,
            trait_weights: None,
            inherit_probability: 0.7,
            seed: None,
            world_flavor: None,
            decision_timeout_ms: 30_000,
            max_concurrent_decisions: 16,
        }
    }
}

impl SimulationConfig {
    /// Check every field; the first violation is returned.
    pub fn validate(&self) -> Result<()> {
        if self.grid_size < 1 {
            return Err(SimError::invalid_config("grid_size", self.grid_size, "must be at least 1"));
        }
        if self.view_range < 0 {
            return Err(SimError::invalid_config("view_range", self.view_range, "must not be negative"));
        }
        if self.initial_energy <= 0 {
            return Err(SimError::invalid_config(
                "initial_energy",
                self.initial_energy,
                "founders must start alive",
            ));
        }
        if self.child_energy <= 0 {
            return Err(SimError::invalid_config("child_energy", self.child_energy, "children must start alive"));
        }
        for (field, cost) in [
            ("move_cost", self.move_cost),
            ("stay_cost", self.stay_cost),
            ("share_cost", self.share_cost),
            ("attack_cost", self.attack_cost),
            ("reproduce_cost", self.reproduce_cost),
        ] {
            if cost < 0 {
                return Err(SimError::invalid_config(field, cost, "costs must not be negative"));
            }
        }
        if self.resource_yield <= 0 {
            return Err(SimError::invalid_config("resource_yield", self.resource_yield, "must be positive"));
        }
        if !(0.0..=1.0).contains(&self.resource_spawn_rate) {
            return Err(SimError::out_of_range("resource_spawn_rate", 0.0, 1.0, self.resource_spawn_rate));
        }
        if !(0.0..=1.0).contains(&self.inherit_probability) {
            return Err(SimError::out_of_range("inherit_probability", 0.0, 1.0, self.inherit_probability));
        }
        if self.places_resources() {
            if self.resource_clusters == 0 {
                return Err(SimError::invalid_config(
                    "resource_clusters",
                    self.resource_clusters,
                    "at least one cluster is needed to place resources",
                ));
            }
            if self.cluster_radius < 0 || 2 * self.cluster_radius > self.grid_size - 1 {
                return Err(SimError::invalid_config(
                    "cluster_radius",
                    self.cluster_radius,
                    format!("clusters must fit inside a grid of size {}", self.grid_size),
                ));
            }
        }
        if self.decision_timeout_ms == 0 {
            return Err(SimError::invalid_config("decision_timeout_ms", 0, "must be positive"));
        }
        if self.max_concurrent_decisions == 0 {
            return Err(SimError::invalid_config("max_concurrent_decisions", 0, "must be positive"));
        }
        self.trait_table()?;
        Ok(())
    }

    /// Whether placement can ever run: at setup or by trickle spawning.
    pub fn places_resources(&self) -> bool {
        self.resource_count > 0 || self.resource_spawn_rate > 0.0
    }

    /// The personality distribution, honoring the override.
    pub fn trait_table(&self) -> Result<TraitTable> {
        match &self.trait_weights {
            Some(weights) => TraitTable::new(weights.clone()),
            None => TraitTable::new(DEFAULT_WEIGHTS.to_vec()),
        }
    }

    /// The rule summary handed to oracles.
    pub fn rules(&self) -> WorldRules {
        WorldRules {
            move_cost: self.move_cost,
            stay_cost: self.stay_cost,
            reproduce_cost: self.reproduce_cost,
            population_cap: self.population_cap,
            resource_yield: self.resource_yield,
            view_range: self.view_range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        SimulationConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_clusters_that_overflow_the_grid() {
        let config = SimulationConfig {
            grid_size: 10,
            cluster_radius: 5,
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("cluster_radius"));
    }

    #[test]
    fn cluster_checks_skip_when_nothing_is_placed() {
        let config = SimulationConfig {
            grid_size: 4,
            cluster_radius: 5,
            resource_count: 0,
            resource_spawn_rate: 0.0,
            ..Default::default()
        };
        config.validate().unwrap();
    }

    #[test]
    fn rejects_bad_trait_weights() {
        let config = SimulationConfig {
            trait_weights: Some(vec![0.0; 16]),
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().is_config());
    }

    #[test]
    fn rejects_out_of_range_probabilities() {
        let config = SimulationConfig {
            resource_spawn_rate: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: SimulationConfig =
            serde_json::from_str(r#"{"population": 12, "seed": 42}"#).unwrap();
        assert_eq!(config.population, 12);
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.grid_size, 30);
        assert_eq!(config.reproduce_cost, 70);
    }
}
