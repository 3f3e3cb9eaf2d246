//! Sugarscape Core Prelude — convenient imports for common usage.
//!
//! ```rust
//! use sugarscape_core::prelude::*;
//! ```

pub use crate::types::{AgentId, Energy, GridPos, Message, Tick};
pub use crate::personality::{Personality, TraitTable};
pub use crate::intent::{ActionIntent, Decision, IntentParseError};
pub use crate::context::{
    AgentContext, AgentStatus, Perception, VisiblePeer, VisibleResource, WorldRules,
};
pub use crate::oracle::{DecisionOracle, ScriptedOracle, StayOracle};
pub use crate::error::{ConfigError, OracleError, OracleResult, Result, SimError};
