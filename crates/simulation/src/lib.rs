//! Deterministic round engine for port-numbering algorithms.
//!
//! This crate runs [`DirectAlgorithm`](portnum_core::DirectAlgorithm)s in
//! synchronous lock-step and composes
//! [`CompositeAlgorithm`](portnum_core::CompositeAlgorithm)s out of two
//! virtual instances of a direct algorithm. Given the same topology, every
//! run produces identical round states.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    RoundEngine                          │
//! │                                                         │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │  frozen snapshot (round k-1 states)                │ │
//! │  └────────────────────────┬───────────────────────────┘ │
//! │                           │ send                        │
//! │                           ▼                             │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │  network::route: ports → far node + far port       │ │
//! │  │  broadcast expands to one copy per incident edge   │ │
//! │  └────────────────────────┬───────────────────────────┘ │
//! │                           │ receive                     │
//! │                           ▼                             │
//! │  ┌────────────────────────────────────────────────────┐ │
//! │  │  RunContext: before / after / round / run state    │ │
//! │  └────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! A [`VirtualNetworkAdapter`] wraps a `RoundEngine` running on a
//! [`VirtualGraph`], multiplexing both virtual counterparts of each physical
//! node onto the physical ports.

mod config;
mod context;
mod harness;
pub mod network;
mod runner;
mod virtual_graph;
mod virtual_network;

pub use config::SimulationConfig;
pub use context::{RunContext, RunState};
pub use harness::{Simulation, SimulationStats};
pub use runner::{RoundDriver, RoundEngine, RoundOutcome};
pub use virtual_graph::{Slot, VirtualGraph};
pub use virtual_network::{multiplex, Paired, VirtualNetworkAdapter};
