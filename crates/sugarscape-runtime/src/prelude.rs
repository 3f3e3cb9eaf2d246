//! Sugarscape Runtime Prelude — convenient imports for common usage.
//!
//! ```rust
//! use sugarscape_runtime::prelude::*;
//! ```

// Re-export simulation
pub use crate::simulation::Simulation;
pub use crate::builder::{AgentSeed, SimulationBuilder};
pub use crate::config::SimulationConfig;

// Re-export world state
pub use crate::world::{EnergyField, FieldParams};
pub use crate::registry::{Agent, AgentRegistry, LivingSnapshot};

// Re-export outputs
pub use crate::report::{AgentSnapshot, TickReport};
pub use crate::event::{DeathCause, SimEvent};
pub use crate::metrics::{Rates, RunSummary, Stats};
pub use crate::lineage::{LineageGraph, LineageSummary};
pub use crate::experiment::{
    RunArtifact, run_experiment, run_experiment_with_callback,
    next_run_dir, write_artifact, read_artifact,
};

// Re-export from core
pub use sugarscape_core::prelude::*;
