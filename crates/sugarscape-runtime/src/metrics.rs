//! Run counters, behavior rates and the personality distribution.
//!
//! Rates normalize a cumulative counter by living agents and elapsed
//! ticks: `counter / (living * tick)`. They are 0 whenever the
//! denominator is 0, never NaN.

use crate::registry::Agent;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use sugarscape_core::personality::Personality;
use sugarscape_core::types::{Energy, Tick};

/// Cumulative counters over the whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_born: u64,
    pub total_died: u64,
    pub attacks: u64,
    pub shares: u64,
    pub reproductions: u64,
}

/// Behavior rates per agent-tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rates {
    pub coop_rate: f64,
    pub attack_rate: f64,
    pub repro_rate: f64,
}

impl Stats {
    /// Rates against `living` agents over `tick` ticks.
    pub fn rates(&self, living: usize, tick: Tick) -> Rates {
        Rates {
            coop_rate: rate(self.shares, living, tick),
            attack_rate: rate(self.attacks, living, tick),
            repro_rate: rate(self.reproductions, living, tick),
        }
    }
}

fn rate(count: u64, living: usize, tick: Tick) -> f64 {
    let denominator = living as f64 * tick as f64;
    if denominator == 0.0 {
        0.0
    } else {
        count as f64 / denominator
    }
}

/// Fraction of `agents` carrying each personality code.
///
/// With traits enabled every code is present, at 0.0 when nobody is
/// alive. With traits disabled the map is empty.
pub fn trait_distribution<'a>(agents: impl IntoIterator<Item = &'a Agent>, use_traits: bool) -> BTreeMap<String, f64> {
    if !use_traits {
        return BTreeMap::new();
    }
    let mut counts: BTreeMap<Personality, usize> = Personality::ALL.iter().map(|p| (*p, 0)).collect();
    let mut total = 0usize;
    for agent in agents {
        total += 1;
        if let Some(p) = agent.personality {
            *counts.entry(p).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(p, n)| {
            let share = if total == 0 { 0.0 } else { n as f64 / total as f64 };
            (p.code().to_string(), share)
        })
        .collect()
}

/// Total energy and mean age of `agents`.
pub fn vitals<'a>(agents: impl IntoIterator<Item = &'a Agent>) -> (Energy, f64) {
    let (mut energy, mut age, mut count) = (0, 0u64, 0usize);
    for agent in agents {
        energy += agent.energy;
        age += agent.age;
        count += 1;
    }
    let average = if count == 0 { 0.0 } else { age as f64 / count as f64 };
    (energy, average)
}

/// End-of-run overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub ticks: Tick,
    pub final_population: usize,
    /// Energy held by the living at the end of the run.
    pub total_energy: Energy,
    /// Mean age of the living, 0 when nobody is alive.
    pub average_age: f64,
    pub stats: Stats,
    /// Rates against the end-of-run population.
    pub rates: Rates,
    pub trait_distribution: BTreeMap<String, f64>,
    pub lineage: crate::lineage::LineageSummary,
}
