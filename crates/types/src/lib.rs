//! Core types for port-numbered graphs.
//!
//! This crate provides the substrate every distributed algorithm runs over:
//!
//! - [`NodeId`], [`Port`], [`Color`], [`Position`]: identifiers and node attributes
//! - [`PortGraph`]: an undirected graph whose edges carry a port number per endpoint
//! - [`Topology`]: the read-only view the round engine consumes
//! - [`generate`]: seeded random graph generation
//!
//! # Port numbering
//!
//! Each node numbers its incident edges `1..=degree`. Ports are local: the
//! two endpoints of an edge assign their port numbers independently, so a
//! message leaving `A` on port 1 may arrive at `B` on port 3.

pub mod generate;
mod graph;
mod identifiers;
mod topology;

pub use graph::{Edge, Endpoint, GraphError, Node, PortGraph};
pub use identifiers::{Color, NodeId, Port, Position};
pub use topology::{Link, Topology};
