//! Births at the end of a tick.
//!
//! A birth needs a parent that paid for reproduction this tick and survived
//! the death check, and a tick-start population below the cap. The cap is
//! measured once per tick, so several births in the same tick may push the
//! population past it.

use crate::config::SimulationConfig;
use crate::registry::AgentRegistry;
use rand::seq::SliceRandom;
use rand::Rng;
use sugarscape_core::personality::{Personality, TraitTable};
use sugarscape_core::types::{AgentId, GridPos, Tick};
use tracing::debug;

const NEIGHBOR_STEPS: [(i64, i64); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// Create children for `reproducers`. Returns the new ids in birth order.
pub fn spawn_children<R: Rng + ?Sized>(
    reproducers: &[AgentId],
    living_at_start: usize,
    registry: &mut AgentRegistry,
    config: &SimulationConfig,
    traits: &TraitTable,
    rng: &mut R,
    tick: Tick,
) -> Vec<AgentId> {
    if reproducers.is_empty() {
        return Vec::new();
    }
    if living_at_start >= config.population_cap {
        debug!(
            living_at_start,
            cap = config.population_cap,
            blocked = reproducers.len(),
            "population cap reached, no births"
        );
        return Vec::new();
    }

    let mut born = Vec::new();
    for parent_id in reproducers {
        let Some(parent) = registry.get(*parent_id).filter(|p| p.alive) else {
            continue;
        };
        let position = spawn_position(parent.position, config.grid_size, rng);
        let personality = if config.use_traits {
            Some(inherit(parent.personality, config.inherit_probability, traits, rng))
        } else {
            None
        };

        let child = registry.create(position, config.child_energy, personality, Some(*parent_id), tick);
        debug!(parent = %parent_id, child = %child, %position, "agent born");
        born.push(child);
    }
    born
}

/// A random orthogonal neighbor of `origin`, wrapped onto the grid.
pub fn spawn_position<R: Rng + ?Sized>(origin: GridPos, grid_size: i64, rng: &mut R) -> GridPos {
    let (dx, dy) = NEIGHBOR_STEPS.choose(rng).copied().unwrap_or((0, 1));
    origin.wrapped_step(dx, dy, grid_size)
}

/// Keep the parent's personality with `probability`, otherwise redraw.
pub fn inherit<R: Rng + ?Sized>(
    parent: Option<Personality>,
    probability: f64,
    traits: &TraitTable,
    rng: &mut R,
) -> Personality {
    match parent {
        Some(p) if rng.gen_bool(probability.clamp(0.0, 1.0)) => p,
        _ => traits.sample(rng),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn config() -> SimulationConfig {
        SimulationConfig {
            grid_size: 10,
            population_cap: 3,
            ..Default::default()
        }
    }

    #[test]
    fn child_lands_next_to_parent() {
        let mut registry = AgentRegistry::new();
        let parent = registry.create(GridPos::new(0, 0), 50, Some(Personality::Entj), None, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let born = spawn_children(
            &[parent],
            1,
            &mut registry,
            &config(),
            &TraitTable::default(),
            &mut rng,
            5,
        );
        assert_eq!(born.len(), 1);
        let child = registry.get(born[0]).unwrap();
        let expected = [GridPos::new(0, 1), GridPos::new(1, 0), GridPos::new(0, 9), GridPos::new(9, 0)];
        assert!(expected.contains(&child.position));
        assert_eq!(child.energy, 150);
        assert_eq!(child.parent, Some(parent));
        assert_eq!(child.born_tick, 5);
        assert_eq!(registry.get(parent).unwrap().children, born);
    }

    #[test]
    fn cap_blocks_all_births() {
        let mut registry = AgentRegistry::new();
        let parent = registry.create(GridPos::new(0, 0), 50, None, None, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let born = spawn_children(
            &[parent],
            3,
            &mut registry,
            &config(),
            &TraitTable::default(),
            &mut rng,
            1,
        );
        assert!(born.is_empty());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn dead_parents_do_not_reproduce() {
        let mut registry = AgentRegistry::new();
        let parent = registry.create(GridPos::new(0, 0), 50, None, None, 0);
        registry.mark_dead(parent, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let born = spawn_children(
            &[parent],
            1,
            &mut registry,
            &config(),
            &TraitTable::default(),
            &mut rng,
            1,
        );
        assert!(born.is_empty());
    }

    #[test]
    fn traits_disabled_gives_no_personality() {
        let mut registry = AgentRegistry::new();
        let parent = registry.create(GridPos::new(0, 0), 50, None, None, 0);
        let config = SimulationConfig {
            use_traits: false,
            ..config()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let born = spawn_children(
            &[parent],
            1,
            &mut registry,
            &config,
            &TraitTable::default(),
            &mut rng,
            1,
        );
        assert_eq!(registry.get(born[0]).unwrap().personality, None);
    }

    #[test]
    fn certain_inheritance_copies_the_parent() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..20 {
            let p = inherit(Some(Personality::Intp), 1.0, &TraitTable::default(), &mut rng);
            assert_eq!(p, Personality::Intp);
        }
    }

    #[test]
    fn zero_inheritance_always_redraws() {
        let mut weights = vec![0.0; 16];
        weights[Personality::Estp as usize] = 1.0;
        let table = TraitTable::new(weights).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        for _ in 0..20 {
            assert_eq!(inherit(Some(Personality::Intp), 0.0, &table, &mut rng), Personality::Estp);
        }
    }
}
