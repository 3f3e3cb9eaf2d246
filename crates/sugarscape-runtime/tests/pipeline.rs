//! Pipeline integration tests: concurrency, isolation and determinism.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use sugarscape_runtime::prelude::*;

/// Records every context it is shown and stays put.
#[derive(Default)]
struct Recorder {
    seen: Mutex<Vec<AgentContext>>,
}

impl Recorder {
    fn contexts_for(&self, id: AgentId, tick: Tick) -> AgentContext {
        self.seen
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.status.id == id && c.tick == tick)
            .cloned()
            .unwrap()
    }
}

#[async_trait]
impl DecisionOracle for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    async fn decide(&self, context: &AgentContext) -> OracleResult<Decision> {
        self.seen.lock().unwrap().push(context.clone());
        Ok(Decision::new(ActionIntent::Stay)
            .with_message("hi")
            .with_rationale(format!("agent {} waiting", context.status.id)))
    }
}

/// Walks in a fixed pattern, optionally with id-dependent latency.
struct Walker {
    jitter: bool,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl Walker {
    fn new(jitter: bool) -> Self {
        Self {
            jitter,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl DecisionOracle for Walker {
    fn name(&self) -> &str {
        "walker"
    }

    async fn decide(&self, context: &AgentContext) -> OracleResult<Decision> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if self.jitter {
            let delay = (context.status.id.0 * 7 + context.tick) % 5;
            tokio::time::sleep(Duration::from_millis(delay * 3)).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let intent = match (context.status.id.0 + context.tick) % 5 {
            0 => ActionIntent::Move { dx: 1, dy: 0 },
            1 => ActionIntent::Move { dx: 0, dy: -1 },
            2 => match context.perception.peers.first() {
                Some(peer) => ActionIntent::Attack { target: peer.id },
                None => ActionIntent::Stay,
            },
            3 => match context.perception.peers.first() {
                Some(peer) => ActionIntent::Share { target: peer.id, amount: 5 },
                None => ActionIntent::Move { dx: -1, dy: 0 },
            },
            _ if context.status.energy > 120 => ActionIntent::Reproduce,
            _ => ActionIntent::Move { dx: 0, dy: 1 },
        };
        Ok(Decision::new(intent).with_rationale(format!("tick {}", context.tick)))
    }
}

/// Never answers in time for agent 0.
struct Stalls;

#[async_trait]
impl DecisionOracle for Stalls {
    fn name(&self) -> &str {
        "stalls"
    }

    async fn decide(&self, context: &AgentContext) -> OracleResult<Decision> {
        match context.status.id.0 {
            0 => {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(Decision::new(ActionIntent::Reproduce))
            }
            1 => Err(OracleError::Malformed("no Action field".into())),
            _ => Ok(Decision::new(ActionIntent::Move { dx: 1, dy: 0 })),
        }
    }
}

fn config(seed: u64) -> SimulationConfig {
    SimulationConfig {
        population: 12,
        grid_size: 12,
        cluster_radius: 3,
        resource_spawn_rate: 0.2,
        seed: Some(seed),
        ..Default::default()
    }
}

#[tokio::test]
async fn same_seed_same_run_regardless_of_latency() {
    let mut fast = Simulation::new(config(99), Arc::new(Walker::new(false))).unwrap();
    let mut slow = Simulation::new(config(99), Arc::new(Walker::new(true))).unwrap();

    let a = fast.run(15).await.unwrap();
    let b = slow.run(15).await.unwrap();

    assert_eq!(a.len(), b.len());
    assert_eq!(
        serde_json::to_value(&a).unwrap(),
        serde_json::to_value(&b).unwrap()
    );
    assert_eq!(fast.summary(), slow.summary());
}

#[tokio::test]
async fn decisions_are_requested_concurrently() {
    let walker = Arc::new(Walker::new(true));
    let cfg = SimulationConfig {
        max_concurrent_decisions: 4,
        ..config(1)
    };
    let mut sim = Simulation::new(cfg, walker.clone()).unwrap();
    sim.run(3).await.unwrap();
    let peak = walker.peak.load(Ordering::SeqCst);
    assert!(peak > 1, "calls ran one at a time");
    assert!(peak <= 4, "concurrency limit exceeded: {peak}");
}

#[tokio::test]
async fn slow_and_failing_oracles_fall_back_to_stay() {
    let cfg = SimulationConfig {
        decision_timeout_ms: 50,
        resource_spawn_rate: 0.0,
        ..Default::default()
    };
    let mut sim = SimulationBuilder::new()
        .config(cfg)
        .agent(GridPos::new(0, 0), 100)
        .agent(GridPos::new(10, 10), 100)
        .agent(GridPos::new(20, 20), 100)
        .oracle(Stalls)
        .build()
        .unwrap();

    let report = sim.tick().await.unwrap();
    assert_eq!(report.oracle_failures, 2);
    assert_eq!(report.agent(AgentId(0)).unwrap().energy, 99);
    assert_eq!(report.agent(AgentId(0)).unwrap().action, Some(ActionIntent::Stay));
    assert_eq!(report.agent(AgentId(1)).unwrap().energy, 99);
    let mover = report.agent(AgentId(2)).unwrap();
    assert_eq!(mover.position, GridPos::new(21, 20));
    assert_eq!(mover.energy, 98);
    assert!(report.births.is_empty());
}

#[tokio::test]
async fn messages_arrive_exactly_one_tick_later() {
    let recorder = Arc::new(Recorder::default());
    let mut sim = SimulationBuilder::new()
        .grid_size(30)
        .no_spawning()
        .agent_with_personality(GridPos::new(5, 5), 100, Personality::Isfj)
        .agent_with_personality(GridPos::new(7, 8), 100, Personality::Estp)
        .agent(GridPos::new(20, 20), 100)
        .shared_oracle(recorder.clone())
        .build()
        .unwrap();

    let first = sim.tick().await.unwrap();
    assert!(first.agents.iter().all(|a| a.mailbox.is_empty()));
    assert!(recorder.contexts_for(AgentId(0), 1).perception.messages.is_empty());
    assert_eq!(first.messages_sent, 2);

    let second = sim.tick().await.unwrap();
    let inbox = &recorder.contexts_for(AgentId(0), 2).perception.messages;
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].from, AgentId(1));
    assert_eq!(inbox[0].sent_tick, 1);
    assert_eq!(inbox[0].text, "Stay - Thought: agent 1 waiting (from ESTP)");
    assert_eq!(second.agent(AgentId(0)).unwrap().mailbox, *inbox);
    assert!(recorder.contexts_for(AgentId(2), 2).perception.messages.is_empty());

    sim.tick().await.unwrap();
    let inbox = &recorder.contexts_for(AgentId(1), 3).perception.messages;
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].sent_tick, 2);
}

#[tokio::test]
async fn perception_sees_the_frozen_snapshot() {
    let recorder = Arc::new(Recorder::default());
    let mut sim = SimulationBuilder::new()
        .grid_size(30)
        .no_spawning()
        .agent(GridPos::new(5, 5), 100)
        .agent(GridPos::new(6, 5), 100)
        .resource(GridPos::new(5, 9), 50)
        .shared_oracle(recorder.clone())
        .build()
        .unwrap();
    sim.tick().await.unwrap();

    let ctx = recorder.contexts_for(AgentId(0), 1);
    assert_eq!(ctx.population, 2);
    assert_eq!(ctx.status.energy, 100);
    assert_eq!(ctx.perception.peers.len(), 1);
    assert_eq!((ctx.perception.peers[0].dx, ctx.perception.peers[0].dy), (1, 0));
    assert_eq!(
        ctx.perception.resources,
        vec![VisibleResource { dx: 0, dy: 4, amount: 50 }]
    );
    assert_eq!(ctx.rules.move_cost, 2);
}

#[tokio::test]
async fn perception_does_not_wrap_across_the_seam() {
    let recorder = Arc::new(Recorder::default());
    let mut sim = SimulationBuilder::new()
        .grid_size(10)
        .no_spawning()
        .agent(GridPos::new(0, 5), 100)
        .agent(GridPos::new(9, 5), 100)
        .resource(GridPos::new(9, 6), 50)
        .shared_oracle(recorder.clone())
        .build()
        .unwrap();
    let report = sim.tick().await.unwrap();

    // One step apart through the wrap, yet mutually invisible.
    let ctx = recorder.contexts_for(AgentId(0), 1);
    assert!(ctx.perception.peers.is_empty());
    assert!(ctx.perception.resources.is_empty());
    assert_eq!(report.messages_sent, 0);
}

#[tokio::test]
async fn extinction_ends_the_run_early() {
    let cfg = SimulationConfig {
        initial_energy: 3,
        resource_count: 0,
        resource_spawn_rate: 0.0,
        seed: Some(8),
        ..Default::default()
    };
    let artifact = run_experiment(cfg, Arc::new(StayOracle), 50).await;
    assert!(artifact.is_complete());
    assert_eq!(artifact.ticks.len(), 3);
    let summary = artifact.summary.unwrap();
    assert_eq!(summary.final_population, 0);
    assert_eq!(summary.rates.coop_rate, 0.0);
    assert_eq!(summary.stats.total_died, 5);
    assert!(summary.trait_distribution.values().all(|v| *v == 0.0));
}

#[tokio::test]
async fn artifact_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = run_experiment(config(4), Arc::new(StayOracle), 2).await;
    let path = next_run_dir(dir.path()).unwrap().join("run_01.json");
    write_artifact(&artifact, &path).unwrap();
    let loaded = read_artifact(&path).unwrap();
    assert_eq!(loaded.ticks.len(), 2);
    assert_eq!(loaded.config, artifact.config);
    assert_eq!(
        loaded.summary.map(|s| s.stats),
        artifact.summary.map(|s| s.stats)
    );
}
