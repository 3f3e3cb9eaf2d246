//! # Sugarscape
//!
//! A grid world of agents competing for regenerating energy, where every
//! agent decides each tick by asking an external decision oracle.
//!
//! Each tick runs in two phases. First every living agent sees a frozen
//! snapshot of its surroundings and the oracle is asked for its next
//! action, concurrently and with a timeout. Then the world applies the
//! answers one agent at a time in ascending id order: moves and harvests,
//! shares, attacks, reproduction, starvation and finally message delivery.
//! Given a seed and a deterministic oracle, a run is reproducible.
//!
//! ## Quick Start
//!
//! ```rust
//! use sugarscape::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let mut sim = SimulationBuilder::new()
//!     .grid_size(20)
//!     .seed(7)
//!     .no_spawning()
//!     .agent(GridPos::new(3, 3), 100)
//!     .resource(GridPos::new(4, 3), 50)
//!     .oracle(ScriptedOracle::new().with_intent(AgentId(0), 1, ActionIntent::Move { dx: 1, dy: 0 }))
//!     .build()
//!     .unwrap();
//!
//! let report = sim.tick().await.unwrap();
//! assert_eq!(report.agent(AgentId(0)).unwrap().energy, 148);
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`sugarscape_core`] - ids, grid positions, personalities, intents and the oracle trait
//! - [`sugarscape_runtime`] - energy field, registry, tick pipeline, metrics, lineage, artifacts
//! - `sugarscape_llm` - language-model oracle (feature `llm`, HTTP backend with `llm-api`)
//!
//! ## Rules in brief
//!
//! | Action | Cost | Effect |
//! |--------|------|--------|
//! | Move | 2 | one orthogonal step, wraps at the edges, harvests the cell |
//! | Stay | 1 | nothing |
//! | Share | 0 | transfers energy to a living agent |
//! | Attack | 0 | steals half the target's energy within view range |
//! | Reproduce | 70 | a child next to the parent, unless the population is capped |

// Re-export all subcrates
pub use sugarscape_core as core;
pub use sugarscape_runtime as runtime;

#[cfg(feature = "llm")]
pub use sugarscape_llm as llm;

/// Prelude module for convenient imports.
///
/// ```rust
/// use sugarscape::prelude::*;
/// ```
pub mod prelude {
    pub use sugarscape_runtime::prelude::*;

    #[cfg(feature = "llm")]
    pub use sugarscape_llm::{
        DecisionPrompt, LlmBackend, LlmConfig, LlmError, LlmOracle, LlmResult, MockBackend,
        PromptTemplate,
    };

    #[cfg(feature = "llm-api")]
    pub use sugarscape_llm::OpenAiBackend;
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
