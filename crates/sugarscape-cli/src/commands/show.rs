//! Summarize a saved run artifact.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;
use sugarscape::prelude::{read_artifact, RunArtifact};

pub fn run(file: &Path, per_tick: bool) -> Result<()> {
    let artifact = read_artifact(file)
        .with_context(|| format!("Failed to read artifact: {}", file.display()))?;

    println!("{} {}", "Run:".bold(), file.display());
    println!(
        "  Oracle: {}, grid {}x{}, seed {}",
        artifact.oracle.cyan(),
        artifact.config.grid_size,
        artifact.config.grid_size,
        artifact
            .config
            .seed
            .map(|s| s.to_string())
            .unwrap_or_else(|| "entropy".to_string())
    );
    if let Some(err) = &artifact.error {
        println!("  {} {}", "Stopped early:".red(), err);
    }

    if per_tick {
        println!();
        println!(
            "  {:>5} {:>6} {:>6} {:>6} {:>6} {:>7} {:>7} {:>7}",
            "tick", "alive", "born", "died", "cells", "coop", "attack", "repro"
        );
        for t in &artifact.ticks {
            println!(
                "  {:>5} {:>6} {:>6} {:>6} {:>6} {:>7.4} {:>7.4} {:>7.4}",
                t.tick,
                t.population(),
                t.births.len(),
                t.deaths.len(),
                t.resource_cells,
                t.rates.coop_rate,
                t.rates.attack_rate,
                t.rates.repro_rate
            );
        }
    }

    println!();
    print_summary(&artifact);
    Ok(())
}

/// Colored end-of-run summary shared by `run` and `show`.
pub fn print_summary(artifact: &RunArtifact) {
    let Some(summary) = &artifact.summary else {
        println!("  {}", "No summary: the simulation never started.".yellow());
        return;
    };

    println!("  Ticks: {}", summary.ticks.to_string().cyan());
    println!(
        "  Population: {} → {}",
        artifact.config.population.to_string().yellow(),
        summary.final_population.to_string().green()
    );
    println!(
        "  Energy held: {}  Average age: {:.1}",
        summary.total_energy, summary.average_age
    );
    println!(
        "  Born: {}  Died: {}",
        summary.stats.total_born.to_string().green(),
        summary.stats.total_died.to_string().red()
    );
    println!(
        "  Shares: {}  Attacks: {}  Reproductions: {}",
        summary.stats.shares, summary.stats.attacks, summary.stats.reproductions
    );
    println!(
        "  Rates: coop {:.4}, attack {:.4}, repro {:.4}",
        summary.rates.coop_rate, summary.rates.attack_rate, summary.rates.repro_rate
    );

    let lineage = &summary.lineage;
    println!(
        "  Lineages: {} founders, {} surviving, deepest generation {}",
        lineage.founders, lineage.surviving_lineages, lineage.max_generation
    );
    if let Some((id, size)) = lineage.largest_family {
        println!("  Largest family: agent {} with {} descendants", id, size);
    }

    let mut traits: Vec<_> = summary
        .trait_distribution
        .iter()
        .filter(|(_, share)| **share > 0.0)
        .collect();
    traits.sort_by(|a, b| b.1.total_cmp(a.1));
    if !traits.is_empty() {
        let top: Vec<String> = traits
            .iter()
            .take(5)
            .map(|(code, share)| format!("{} {:.0}%", code, *share * 100.0))
            .collect();
        println!("  Traits: {}", top.join(", "));
    }
}
