//! # Sugarscape Runtime
//!
//! World state, the tick pipeline, and run artifacts.
//!
//! The runtime owns everything that changes: the energy field, the agent
//! registry and the message buffers. Each tick it asks a
//! [`DecisionOracle`](sugarscape_core::oracle::DecisionOracle) for every
//! living agent at once, then applies the answers in a fixed order.

pub mod config;
pub mod world;
pub mod registry;
pub mod perception;
pub mod decision;
pub mod event;
pub mod resolution;
pub mod reproduction;
pub mod messaging;
pub mod metrics;
pub mod lineage;
pub mod report;
pub mod simulation;
pub mod builder;
pub mod experiment;
pub mod prelude;
