//! Sequential resolution of decided intents.
//!
//! Decisions are applied one agent at a time in ascending id order against
//! the live world state. Earlier resolutions are visible to later ones: an
//! agent killed by an attack earlier in the pass does not act, and energy
//! transferred to an agent is available for its own share.

use crate::config::SimulationConfig;
use crate::event::{DeathCause, SimEvent};
use crate::registry::{AgentRegistry, LivingSnapshot};
use crate::world::EnergyField;
use sugarscape_core::intent::{ActionIntent, Decision};
use sugarscape_core::types::{truncate_chars, AgentId, Energy, Tick};
use tracing::{debug, trace};

/// Characters of rationale kept in a memory entry.
pub const MEMORY_RATIONALE_CHARS: usize = 100;

/// Counters produced by one resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionCounts {
    pub shares: u64,
    pub attacks: u64,
    pub reproductions: u64,
}

/// Everything one tick's resolution produced.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub counts: ActionCounts,
    /// Agents that paid for reproduction, ascending.
    pub reproducers: Vec<AgentId>,
    /// Agents that died this tick, in order of death.
    pub deaths: Vec<AgentId>,
    pub events: Vec<SimEvent>,
}

impl Resolution {
    fn ignore(&mut self, id: AgentId, intent: ActionIntent, reason: impl Into<String>) {
        let reason = reason.into();
        trace!(agent = %id, %intent, %reason, "intent ignored");
        self.events.push(SimEvent::Ignored { id, intent, reason });
    }

    fn died(&mut self, id: AgentId, cause: DeathCause) {
        self.deaths.push(id);
        self.events.push(SimEvent::Died { id, cause });
    }
}

/// Apply `decisions` in order. The slice must be sorted by agent id.
pub fn resolve(
    decisions: &[(AgentId, Decision)],
    registry: &mut AgentRegistry,
    field: &mut EnergyField,
    config: &SimulationConfig,
    tick: Tick,
) -> Resolution {
    let mut out = Resolution::default();

    for (id, decision) in decisions {
        let id = *id;
        if !registry.is_alive(id) {
            debug!(agent = %id, "skipping agent killed earlier this tick");
            continue;
        }

        match decision.intent {
            ActionIntent::Move { dx, dy } => {
                let Some(agent) = registry.get_mut(id) else { continue };
                agent.position = agent.position.wrapped_step(dx, dy, config.grid_size);
                agent.energy -= config.move_cost;
                let harvested = field.claim(agent.position);
                agent.energy += harvested;
                out.events.push(SimEvent::Moved {
                    id,
                    to: agent.position,
                    harvested,
                });
            }
            ActionIntent::Stay => {
                if let Some(agent) = registry.get_mut(id) {
                    agent.energy -= config.stay_cost;
                }
                out.events.push(SimEvent::Stayed { id });
            }
            ActionIntent::Share { target, amount } => {
                share(registry, id, target, amount, decision.intent, &mut out);
                if let Some(agent) = registry.get_mut(id) {
                    agent.energy -= config.share_cost;
                }
            }
            ActionIntent::Attack { target } => {
                attack(registry, id, target, config.view_range, tick, decision.intent, &mut out);
                if let Some(agent) = registry.get_mut(id) {
                    agent.energy -= config.attack_cost;
                }
            }
            ActionIntent::Reproduce => {
                if let Some(agent) = registry.get_mut(id) {
                    agent.energy -= config.reproduce_cost;
                }
                out.counts.reproductions += 1;
                out.reproducers.push(id);
                out.events.push(SimEvent::ReproductionAttempted { id });
            }
        }

        if let Some(agent) = registry.get_mut(id) {
            agent.age += 1;
            agent.remember(format!(
                "Tick {}: {}",
                tick,
                truncate_chars(&decision.rationale, MEMORY_RATIONALE_CHARS)
            ));
            agent.last_decision = Some(decision.clone());
        }
    }

    out
}

fn share(
    registry: &mut AgentRegistry,
    id: AgentId,
    target: AgentId,
    amount: u64,
    intent: ActionIntent,
    out: &mut Resolution,
) {
    if target == id {
        return out.ignore(id, intent, "cannot share with self");
    }
    if !registry.is_alive(target) {
        return out.ignore(id, intent, "target is not alive");
    }
    let available = registry.get(id).map_or(0, |a| a.energy);
    let amount = match Energy::try_from(amount) {
        Ok(amount) if amount <= available => amount,
        _ => return out.ignore(id, intent, format!("only {available} energy available")),
    };

    if let Some(agent) = registry.get_mut(id) {
        agent.energy -= amount;
    }
    if let Some(recipient) = registry.get_mut(target) {
        recipient.energy += amount;
    }
    out.counts.shares += 1;
    out.events.push(SimEvent::Shared {
        from: id,
        to: target,
        amount,
    });
}

fn attack(
    registry: &mut AgentRegistry,
    id: AgentId,
    target: AgentId,
    view_range: i64,
    tick: Tick,
    intent: ActionIntent,
    out: &mut Resolution,
) {
    if target == id {
        return out.ignore(id, intent, "cannot attack self");
    }
    let (Some(attacker), Some(victim)) = (registry.get(id), registry.get(target)) else {
        return out.ignore(id, intent, "unknown target");
    };
    if !victim.alive {
        return out.ignore(id, intent, "target is not alive");
    }
    if !attacker.position.within(victim.position, view_range) {
        return out.ignore(id, intent, "target out of range");
    }

    let stolen = victim.energy.max(0) / 2;
    let remaining = victim.energy - stolen;
    if let Some(victim) = registry.get_mut(target) {
        victim.energy = remaining;
    }
    if let Some(attacker) = registry.get_mut(id) {
        attacker.energy += stolen;
    }
    out.counts.attacks += 1;
    out.events.push(SimEvent::Attacked {
        attacker: id,
        target,
        amount: stolen,
    });

    if remaining <= 0 && registry.mark_dead(target, tick) {
        debug!(attacker = %id, victim = %target, "agent killed in attack");
        out.died(target, DeathCause::Attacked { by: id });
    }
}

/// Kill every snapshot agent still alive with energy at or below zero.
pub fn starve(registry: &mut AgentRegistry, snapshot: &LivingSnapshot, tick: Tick, out: &mut Resolution) {
    for id in snapshot.ids() {
        let starving = registry.get(*id).is_some_and(|a| a.alive && a.energy <= 0);
        if starving && registry.mark_dead(*id, tick) {
            out.died(*id, DeathCause::Starved);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::FieldParams;
    use sugarscape_core::types::GridPos;

    fn setup(energies: &[(i64, i64, Energy)]) -> (AgentRegistry, EnergyField, SimulationConfig) {
        let mut registry = AgentRegistry::new();
        for (x, y, energy) in energies {
            registry.create(GridPos::new(*x, *y), *energy, None, None, 0);
        }
        let config = SimulationConfig {
            grid_size: 10,
            ..Default::default()
        };
        let field = EnergyField::new(
            10,
            FieldParams {
                clusters: 1,
                cluster_radius: 0,
                spawn_rate: 0.0,
                resource_yield: 50,
            },
        );
        (registry, field, config)
    }

    fn energy(registry: &AgentRegistry, id: u64) -> Energy {
        registry.get(AgentId(id)).unwrap().energy
    }

    #[test]
    fn move_wraps_and_harvests() {
        let (mut registry, mut field, config) = setup(&[(9, 3, 10)]);
        field.insert(GridPos::new(0, 3), 50).unwrap();
        let decisions = vec![(AgentId(0), Decision::new(ActionIntent::Move { dx: 1, dy: 0 }))];
        let out = resolve(&decisions, &mut registry, &mut field, &config, 1);
        let agent = registry.get(AgentId(0)).unwrap();
        assert_eq!(agent.position, GridPos::new(0, 3));
        assert_eq!(agent.energy, 10 - 2 + 50);
        assert!(field.is_empty());
        assert_eq!(
            out.events,
            vec![SimEvent::Moved { id: AgentId(0), to: GridPos::new(0, 3), harvested: 50 }]
        );
    }

    #[test]
    fn second_claim_in_a_tick_gets_nothing() {
        let (mut registry, mut field, config) = setup(&[(4, 5, 10), (6, 5, 10)]);
        field.insert(GridPos::new(5, 5), 50).unwrap();
        let decisions = vec![
            (AgentId(0), Decision::new(ActionIntent::Move { dx: 1, dy: 0 })),
            (AgentId(1), Decision::new(ActionIntent::Move { dx: -1, dy: 0 })),
        ];
        resolve(&decisions, &mut registry, &mut field, &config, 1);
        assert_eq!(energy(&registry, 0), 58);
        assert_eq!(energy(&registry, 1), 8);
    }

    #[test]
    fn share_moves_energy_exactly() {
        let (mut registry, mut field, config) = setup(&[(0, 0, 100), (5, 5, 20)]);
        let decisions = vec![(
            AgentId(0),
            Decision::new(ActionIntent::Share { target: AgentId(1), amount: 30 }),
        )];
        let out = resolve(&decisions, &mut registry, &mut field, &config, 1);
        assert_eq!(energy(&registry, 0), 70);
        assert_eq!(energy(&registry, 1), 50);
        assert_eq!(out.counts.shares, 1);
    }

    #[test]
    fn overdrawn_share_is_a_no_op() {
        let (mut registry, mut field, config) = setup(&[(0, 0, 10), (1, 1, 10)]);
        let decisions = vec![(
            AgentId(0),
            Decision::new(ActionIntent::Share { target: AgentId(1), amount: 11 }),
        )];
        let out = resolve(&decisions, &mut registry, &mut field, &config, 1);
        assert_eq!(energy(&registry, 0), 10);
        assert_eq!(energy(&registry, 1), 10);
        assert_eq!(out.counts.shares, 0);
        assert!(matches!(out.events[0], SimEvent::Ignored { .. }));
    }

    #[test]
    fn self_targets_are_ignored() {
        let (mut registry, mut field, config) = setup(&[(0, 0, 10)]);
        let decisions = vec![(AgentId(0), Decision::new(ActionIntent::Attack { target: AgentId(0) }))];
        let out = resolve(&decisions, &mut registry, &mut field, &config, 1);
        assert_eq!(out.counts.attacks, 0);
        assert_eq!(energy(&registry, 0), 10);
        assert_eq!(registry.get(AgentId(0)).unwrap().age, 1);
    }

    #[test]
    fn attack_takes_half_and_can_kill() {
        let (mut registry, mut field, config) = setup(&[(0, 0, 10), (1, 0, 1), (2, 0, 9)]);
        let decisions = vec![
            (AgentId(0), Decision::new(ActionIntent::Attack { target: AgentId(2) })),
            (AgentId(1), Decision::new(ActionIntent::Attack { target: AgentId(2) })),
        ];
        let out = resolve(&decisions, &mut registry, &mut field, &config, 1);
        // 9 -> 5 after the first attack, 5 -> 3 after the second.
        assert_eq!(energy(&registry, 0), 14);
        assert_eq!(energy(&registry, 1), 3);
        assert_eq!(energy(&registry, 2), 3);
        assert_eq!(out.counts.attacks, 2);
        assert!(out.deaths.is_empty());
    }

    #[test]
    fn killed_agent_does_not_act() {
        let (mut registry, mut field, config) = setup(&[(0, 0, 10), (1, 0, 0)]);
        // Agent 1 starts at zero energy; half of zero is zero, leaving it dead.
        let decisions = vec![
            (AgentId(0), Decision::new(ActionIntent::Attack { target: AgentId(1) })),
            (AgentId(1), Decision::new(ActionIntent::Share { target: AgentId(0), amount: 0 })),
        ];
        let out = resolve(&decisions, &mut registry, &mut field, &config, 2);
        assert_eq!(out.deaths, vec![AgentId(1)]);
        assert_eq!(out.counts.shares, 0);
        let victim = registry.get(AgentId(1)).unwrap();
        assert!(!victim.alive);
        assert_eq!(victim.age, 0);
        assert_eq!(victim.died_tick, Some(2));
    }

    #[test]
    fn attack_out_of_range_is_ignored() {
        let (mut registry, mut field, config) = setup(&[(0, 0, 10), (6, 0, 40)]);
        let decisions = vec![(AgentId(0), Decision::new(ActionIntent::Attack { target: AgentId(1) }))];
        let out = resolve(&decisions, &mut registry, &mut field, &config, 1);
        assert_eq!(energy(&registry, 1), 40);
        assert_eq!(out.counts.attacks, 0);
    }

    #[test]
    fn reproduce_is_charged_and_recorded() {
        let (mut registry, mut field, config) = setup(&[(0, 0, 100)]);
        let decisions = vec![(
            AgentId(0),
            Decision::new(ActionIntent::Reproduce).with_rationale("x".repeat(150)),
        )];
        let out = resolve(&decisions, &mut registry, &mut field, &config, 7);
        assert_eq!(energy(&registry, 0), 30);
        assert_eq!(out.reproducers, vec![AgentId(0)]);
        assert_eq!(out.counts.reproductions, 1);
        let memory = &registry.get(AgentId(0)).unwrap().memory;
        assert_eq!(memory[0], format!("Tick 7: {}", "x".repeat(100)));
    }

    #[test]
    fn starve_kills_non_positive_energy_once() {
        let (mut registry, mut field, config) = setup(&[(0, 0, 1), (1, 1, 5)]);
        let snapshot = registry.living_snapshot();
        let decisions = vec![
            (AgentId(0), Decision::new(ActionIntent::Stay)),
            (AgentId(1), Decision::new(ActionIntent::Stay)),
        ];
        let mut out = resolve(&decisions, &mut registry, &mut field, &config, 1);
        starve(&mut registry, &snapshot, 1, &mut out);
        starve(&mut registry, &snapshot, 1, &mut out);
        assert_eq!(out.deaths, vec![AgentId(0)]);
        assert!(registry.is_alive(AgentId(1)));
    }
}
