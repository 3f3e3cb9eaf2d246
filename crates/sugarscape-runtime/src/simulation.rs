//! The simulation handle and its tick pipeline.
//!
//! A tick runs in fixed phases:
//! 1. Trickle-spawn resources.
//! 2. Freeze the living set and swap message buffers.
//! 3. Build a context per living agent (pure read).
//! 4. Ask the oracle for every agent concurrently.
//! 5. Resolve decisions one by one in ascending id order.
//! 6. Kill agents at or below zero energy.
//! 7. Create children for surviving reproducers.
//! 8. Broadcast messages into next-tick buffers.
//! 9. Update counters and emit a [`TickReport`].
//!
//! Only phase 4 is concurrent. Everything that mutates the world happens
//! after all decisions are in, so the outcome of a tick depends only on
//! the seed and the decisions, never on oracle latency.

use crate::builder::AgentSeed;
use crate::config::SimulationConfig;
use crate::decision;
use crate::event::SimEvent;
use crate::lineage::LineageGraph;
use crate::messaging;
use crate::metrics::{self, RunSummary, Stats};
use crate::perception;
use crate::registry::{Agent, AgentRegistry};
use crate::report::{AgentSnapshot, TickReport};
use crate::reproduction;
use crate::resolution;
use crate::world::{EnergyField, FieldParams};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::Arc;
use std::time::Duration;
use sugarscape_core::context::AgentContext;
use sugarscape_core::error::{Result, SimError};
use sugarscape_core::oracle::DecisionOracle;
use sugarscape_core::personality::TraitTable;
use sugarscape_core::types::{AgentId, Energy, GridPos, Tick};
use tracing::{debug, info};

/// A running world.
pub struct Simulation {
    config: SimulationConfig,
    oracle: Arc<dyn DecisionOracle>,
    registry: AgentRegistry,
    field: EnergyField,
    traits: TraitTable,
    rng: ChaCha8Rng,
    tick: Tick,
    stats: Stats,
}

impl Simulation {
    /// Validate `config`, place resources and the founding population.
    pub fn new(config: SimulationConfig, oracle: Arc<dyn DecisionOracle>) -> Result<Self> {
        Self::assemble(config, oracle, None, None)
    }

    /// Shared setup. Explicit agents or resources replace the random ones.
    pub(crate) fn assemble(
        config: SimulationConfig,
        oracle: Arc<dyn DecisionOracle>,
        agents: Option<Vec<AgentSeed>>,
        resources: Option<Vec<(GridPos, Energy)>>,
    ) -> Result<Self> {
        config.validate()?;
        let traits = config.trait_table()?;
        let mut rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let mut field = EnergyField::new(
            config.grid_size,
            FieldParams {
                clusters: config.resource_clusters,
                cluster_radius: config.cluster_radius,
                spawn_rate: config.resource_spawn_rate,
                resource_yield: config.resource_yield,
            },
        );
        match resources {
            Some(cells) => {
                for (pos, amount) in cells {
                    field.insert(pos, amount)?;
                }
            }
            None => {
                field.spawn_clusters(
                    &mut rng,
                    config.resource_count,
                    config.resource_clusters,
                    config.cluster_radius,
                )?;
            }
        }

        let seeds = match agents {
            Some(seeds) => seeds,
            None => (0..config.population)
                .map(|_| AgentSeed {
                    position: GridPos::new(
                        rng.gen_range(0..config.grid_size),
                        rng.gen_range(0..config.grid_size),
                    ),
                    energy: config.initial_energy,
                    personality: None,
                })
                .collect(),
        };

        let mut registry = AgentRegistry::new();
        for seed in seeds {
            if !seed.position.in_bounds(config.grid_size) {
                return Err(SimError::invalid_config("agent", seed.position, "position outside the grid"));
            }
            if seed.energy <= 0 {
                return Err(SimError::invalid_config("agent", seed.energy, "energy must be positive"));
            }
            let personality = if config.use_traits {
                Some(seed.personality.unwrap_or_else(|| traits.sample(&mut rng)))
            } else {
                None
            };
            registry.create(seed.position, seed.energy, personality, None, 0);
        }

        info!(
            agents = registry.len(),
            resources = field.len(),
            grid = config.grid_size,
            oracle = oracle.name(),
            seed = ?config.seed,
            "simulation initialized"
        );

        Ok(Self {
            config,
            oracle,
            registry,
            field,
            traits,
            rng,
            tick: 0,
            stats: Stats::default(),
        })
    }

    /// Advance one tick.
    ///
    /// Oracle failures never surface here; only resource placement
    /// exhaustion does.
    pub async fn tick(&mut self) -> Result<TickReport> {
        let tick = self.tick + 1;
        // Placement is atomic, so a failed spawn leaves the world as it was.
        if self.field.tick(&mut self.rng)? {
            debug!(tick, cells = self.field.len(), "resource cell spawned");
        }
        self.tick = tick;
        let snapshot = self.registry.living_snapshot();
        let living_at_start = snapshot.len();

        messaging::open_mailboxes(&mut self.registry, &snapshot);

        let contexts: Vec<AgentContext> = snapshot
            .ids()
            .iter()
            .filter_map(|id| self.registry.get(*id))
            .map(|agent| {
                perception::build_context(agent, &snapshot, &self.registry, &self.field, &self.config, tick)
            })
            .collect();

        let batch = decision::decide_all(
            &self.oracle,
            contexts,
            Duration::from_millis(self.config.decision_timeout_ms),
            self.config.max_concurrent_decisions,
        )
        .await;

        let mut outcome =
            resolution::resolve(&batch.decisions, &mut self.registry, &mut self.field, &self.config, tick);
        resolution::starve(&mut self.registry, &snapshot, tick, &mut outcome);

        let births = reproduction::spawn_children(
            &outcome.reproducers,
            living_at_start,
            &mut self.registry,
            &self.config,
            &self.traits,
            &mut self.rng,
            tick,
        );
        for child in &births {
            if let Some((parent, position)) =
                self.registry.get(*child).and_then(|a| a.parent.map(|p| (p, a.position)))
            {
                outcome.events.push(SimEvent::Born {
                    id: *child,
                    parent,
                    position,
                });
            }
        }

        let senders: Vec<AgentId> = snapshot
            .ids()
            .iter()
            .copied()
            .filter(|id| self.registry.is_alive(*id))
            .collect();
        let messages_sent = messaging::deliver(&mut self.registry, &senders, self.config.view_range, tick);

        self.stats.total_born += births.len() as u64;
        self.stats.total_died += outcome.deaths.len() as u64;
        self.stats.shares += outcome.counts.shares;
        self.stats.attacks += outcome.counts.attacks;
        self.stats.reproductions += outcome.counts.reproductions;

        let report = TickReport {
            tick,
            agents: self.registry.living().map(AgentSnapshot::from).collect(),
            resource_cells: self.field.len(),
            living_at_start,
            stats: self.stats,
            rates: self.stats.rates(living_at_start, tick),
            trait_distribution: metrics::trait_distribution(self.registry.living(), self.config.use_traits),
            births,
            deaths: outcome.deaths,
            messages_sent,
            oracle_failures: batch.failures,
            events: outcome.events,
        };

        info!(
            tick,
            alive = report.agents.len(),
            born = report.births.len(),
            died = report.deaths.len(),
            failures = report.oracle_failures,
            "tick complete"
        );
        Ok(report)
    }

    /// Run up to `ticks` ticks, stopping early once nobody is alive.
    pub async fn run(&mut self, ticks: u64) -> Result<Vec<TickReport>> {
        self.run_with_callback(ticks, |_| {}).await
    }

    /// Like [`Simulation::run`], calling `on_tick` after every tick.
    pub async fn run_with_callback<F>(&mut self, ticks: u64, mut on_tick: F) -> Result<Vec<TickReport>>
    where
        F: FnMut(&TickReport),
    {
        let mut reports = Vec::with_capacity(ticks as usize);
        for _ in 0..ticks {
            if self.is_exhausted() {
                info!(tick = self.tick, "population extinct, stopping");
                break;
            }
            let report = self.tick().await?;
            on_tick(&report);
            reports.push(report);
        }
        Ok(reports)
    }

    /// Whether nobody is left alive.
    pub fn is_exhausted(&self) -> bool {
        self.registry.living().next().is_none()
    }

    /// Counters, end-of-run rates, trait mix and lineage.
    pub fn summary(&self) -> RunSummary {
        let final_population = self.living_count();
        let (total_energy, average_age) = metrics::vitals(self.registry.living());
        RunSummary {
            ticks: self.tick,
            final_population,
            total_energy,
            average_age,
            stats: self.stats,
            rates: self.stats.rates(final_population, self.tick),
            trait_distribution: metrics::trait_distribution(self.registry.living(), self.config.use_traits),
            lineage: self.lineage().summary(),
        }
    }

    pub fn lineage(&self) -> LineageGraph {
        LineageGraph::from_registry(&self.registry)
    }

    /// Snapshots of the agents alive right now.
    pub fn snapshot(&self) -> Vec<AgentSnapshot> {
        self.registry.living().map(AgentSnapshot::from).collect()
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.registry.get(id)
    }

    pub fn living_count(&self) -> usize {
        self.registry.living_count()
    }

    pub fn current_tick(&self) -> Tick {
        self.tick
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn field(&self) -> &EnergyField {
        &self.field
    }

    pub fn oracle_name(&self) -> &str {
        self.oracle.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sugarscape_core::oracle::StayOracle;

    fn seeded(seed: u64) -> SimulationConfig {
        SimulationConfig {
            seed: Some(seed),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn failed_trickle_spawn_leaves_the_tick_uncommitted() {
        let config = SimulationConfig {
            grid_size: 2,
            cluster_radius: 0,
            resource_spawn_rate: 1.0,
            ..Default::default()
        };
        let mut sim = crate::builder::SimulationBuilder::new()
            .config(config)
            .agent(GridPos::new(0, 0), 100)
            .agent(GridPos::new(1, 1), 100)
            .resource(GridPos::new(1, 0), 50)
            .resource(GridPos::new(0, 1), 50)
            .resource(GridPos::new(1, 1), 50)
            .build()
            .unwrap();

        // The first tick fills the last free cell.
        let first = sim.tick().await.unwrap();
        assert_eq!(first.resource_cells, 4);
        assert_eq!(first.messages_sent, 2);

        let err = sim.tick().await.unwrap_err();
        assert!(matches!(err, SimError::CapacityExhausted { .. }));
        assert_eq!(sim.current_tick(), 1);
        assert_eq!(sim.summary().ticks, 1);
        let agent = sim.agent(AgentId(0)).unwrap();
        assert!(agent.inbox.is_empty());
        assert_eq!(agent.outbox.len(), 1);
        assert_eq!(agent.energy, 99);
    }

    #[tokio::test]
    async fn new_places_population_and_resources() {
        let sim = Simulation::new(seeded(1), Arc::new(StayOracle)).unwrap();
        assert_eq!(sim.living_count(), 5);
        assert_eq!(sim.field().len(), 20);
        assert_eq!(sim.current_tick(), 0);
        for agent in sim.registry().iter() {
            assert_eq!(agent.energy, 150);
            assert!(agent.personality.is_some());
            assert!(agent.position.in_bounds(30));
        }
    }

    #[tokio::test]
    async fn invalid_config_is_rejected_before_any_tick() {
        let config = SimulationConfig {
            grid_size: 0,
            ..Default::default()
        };
        let err = Simulation::new(config, Arc::new(StayOracle)).err().unwrap();
        assert!(err.is_config());
    }

    #[tokio::test]
    async fn staying_costs_one_per_tick() {
        let mut sim = Simulation::new(seeded(2), Arc::new(StayOracle)).unwrap();
        let report = sim.tick().await.unwrap();
        assert_eq!(report.tick, 1);
        assert_eq!(report.living_at_start, 5);
        for agent in &report.agents {
            assert_eq!(agent.energy, 149);
            assert_eq!(agent.age, 1);
            assert_eq!(agent.action, Some(sugarscape_core::intent::ActionIntent::Stay));
            assert_eq!(agent.memory, vec!["Tick 1: Safe choice in mock mode".to_string()]);
        }
    }

    #[tokio::test]
    async fn run_stops_at_extinction() {
        let config = SimulationConfig {
            initial_energy: 2,
            resource_count: 0,
            resource_spawn_rate: 0.0,
            ..seeded(3)
        };
        let mut sim = Simulation::new(config, Arc::new(StayOracle)).unwrap();
        let reports = sim.run(10).await.unwrap();
        assert_eq!(reports.len(), 2);
        assert!(sim.is_exhausted());
        assert_eq!(sim.stats().total_died, 5);
        assert_eq!(reports[1].deaths.len(), 5);
    }

    #[tokio::test]
    async fn summary_uses_final_population() {
        let mut sim = Simulation::new(seeded(4), Arc::new(StayOracle)).unwrap();
        sim.run(3).await.unwrap();
        let summary = sim.summary();
        assert_eq!(summary.ticks, 3);
        assert_eq!(summary.final_population, 5);
        assert_eq!(summary.rates.coop_rate, 0.0);
        assert_eq!(summary.lineage.founders, 5);
        assert_eq!(summary.trait_distribution.len(), 16);
    }
}
