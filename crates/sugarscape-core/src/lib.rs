//! # Sugarscape Core
//!
//! Core types and contracts for the sugarscape simulation engine.
//!
//! Agents live on a toroidal grid, forage regenerating energy cells, and
//! decide every tick through an external decision oracle. This crate holds
//! what every layer shares:
//!
//! - **types** — agent ids, grid positions, messages
//! - **personality** — the sixteen personality categories and their weighted table
//! - **intent** — action intents and the strict free-text decoder
//! - **context** — the owned perception/status bundle handed to an oracle
//! - **oracle** — the [`DecisionOracle`](oracle::DecisionOracle) trait and test doubles
//! - **error** — setup errors and oracle failures
//!
//! ## Quick Start
//!
//! ```rust
//! use sugarscape_core::prelude::*;
//!
//! let intent: ActionIntent = "Move to (1,0)".parse().unwrap();
//! assert_eq!(intent, ActionIntent::Move { dx: 1, dy: 0 });
//!
//! // Anything outside the grammar decodes to Stay
//! let decision = Decision::from_response("Action: [Teleport]");
//! assert_eq!(decision.intent, ActionIntent::Stay);
//! ```

pub mod types;
pub mod personality;
pub mod intent;
pub mod context;
pub mod oracle;
pub mod error;
pub mod prelude;
