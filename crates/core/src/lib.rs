//! Core contracts for synchronous algorithms in the port-numbering model.
//!
//! This crate provides the vocabulary shared by the engine and the
//! algorithms:
//!
//! - [`StateValue`]: a node's local state, compared by kind
//! - [`Outgoing`], [`Destination`], [`Inbox`]: what nodes send and receive
//! - [`DirectAlgorithm`]: an algorithm that implements `send`/`receive` itself
//! - [`CompositeAlgorithm`]: an algorithm simulated through two virtual
//!   instances of another one
//! - [`RoundError`], [`InvalidTopology`]: the error taxonomy
//!
//! # Round model
//!
//! ```text
//! frozen states ──send──▶ Outgoing ──route──▶ Inbox per node ──receive──▶ new states
//! ```
//!
//! Every node's outgoing message in round `k` is computed from the states of
//! round `k - 1` before any node transitions.

mod error;
mod message;
mod state;
mod traits;

pub use error::{InvalidTopology, RoundError};
pub use message::{Destination, Inbox, Outgoing};
pub use state::{Param, StateKind, StateValue};
pub use traits::{CompositeAlgorithm, DirectAlgorithm, KindOf};
