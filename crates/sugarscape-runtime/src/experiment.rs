//! Whole-run driver and the JSON run artifact.
//!
//! [`run_experiment`] never loses completed work: if a tick fails, the
//! artifact still carries the config, every finished tick and the error.

use crate::config::SimulationConfig;
use crate::metrics::RunSummary;
use crate::report::TickReport;
use crate::simulation::Simulation;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use sugarscape_core::error::Result;
use sugarscape_core::oracle::DecisionOracle;
use tracing::{error, info};

/// Output of one run, complete or partial.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunArtifact {
    pub config: SimulationConfig,
    pub oracle: String,
    pub ticks: Vec<TickReport>,
    /// Absent when setup failed.
    pub summary: Option<RunSummary>,
    /// Set when the run ended early on an error.
    pub error: Option<String>,
}

impl RunArtifact {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    pub fn last_tick(&self) -> Option<&TickReport> {
        self.ticks.last()
    }
}

/// Run up to `ticks` ticks and collect everything into an artifact.
pub async fn run_experiment(
    config: SimulationConfig,
    oracle: Arc<dyn DecisionOracle>,
    ticks: u64,
) -> RunArtifact {
    run_experiment_with_callback(config, oracle, ticks, |_| {}).await
}

/// Like [`run_experiment`], calling `on_tick` after every tick.
pub async fn run_experiment_with_callback<F>(
    config: SimulationConfig,
    oracle: Arc<dyn DecisionOracle>,
    ticks: u64,
    mut on_tick: F,
) -> RunArtifact
where
    F: FnMut(&TickReport),
{
    let mut artifact = RunArtifact {
        config: config.clone(),
        oracle: oracle.name().to_string(),
        ticks: Vec::new(),
        summary: None,
        error: None,
    };

    let mut sim = match Simulation::new(config, oracle) {
        Ok(sim) => sim,
        Err(e) => {
            error!(error = %e, "simulation setup failed");
            artifact.error = Some(e.to_string());
            return artifact;
        }
    };

    for _ in 0..ticks {
        if sim.is_exhausted() {
            break;
        }
        match sim.tick().await {
            Ok(report) => {
                on_tick(&report);
                artifact.ticks.push(report);
            }
            Err(e) => {
                error!(tick = sim.current_tick(), error = %e, "run aborted");
                artifact.error = Some(e.to_string());
                break;
            }
        }
    }

    artifact.summary = Some(sim.summary());
    info!(
        ticks = artifact.ticks.len(),
        population = sim.living_count(),
        complete = artifact.is_complete(),
        "run finished"
    );
    artifact
}

/// `run_NN` directory names under `base`, numbered after the highest existing one.
pub fn next_run_dir(base: &Path) -> Result<PathBuf> {
    let mut highest = 0u32;
    if base.exists() {
        for entry in std::fs::read_dir(base)? {
            let name = entry?.file_name();
            let number = name
                .to_str()
                .and_then(|n| n.strip_prefix("run_"))
                .and_then(|n| n.parse::<u32>().ok());
            if let Some(n) = number {
                highest = highest.max(n);
            }
        }
    }
    Ok(base.join(format!("run_{:02}", highest + 1)))
}

/// Write the artifact as pretty JSON, creating parent directories.
pub fn write_artifact(artifact: &RunArtifact, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(artifact)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn read_artifact(path: &Path) -> Result<RunArtifact> {
    let json = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}
