//! Domain-specific identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Node identifier.
///
/// Identities are unique within a graph. They exist for the simulator and
/// the display; algorithms in the port-numbering model never see them as
/// input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Get the raw ID value.
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The first 26 nodes are named like the playground names them.
        if self.0 < 26 {
            write!(f, "{}", char::from(b'A' + self.0 as u8))
        } else {
            write!(f, "N{}", self.0)
        }
    }
}

/// Local port number of a node, `1..=degree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Port(pub u32);

impl Port {
    /// The first port of any node with at least one edge.
    pub const FIRST: Self = Port(1);

    /// Create a port number.
    pub fn new(n: u32) -> Self {
        Self(n)
    }

    /// Port number `degree + 1`, the next one a new edge receives.
    pub fn after_degree(degree: usize) -> Self {
        Port(degree as u32 + 1)
    }

    /// Iterate the ports `1..=degree`.
    pub fn range(degree: usize) -> impl Iterator<Item = Port> {
        (1..=degree as u32).map(Port)
    }

    /// Get the raw value.
    pub fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Port {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Local input label of a node.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    /// Uncolored node: no local input.
    pub const NONE: Self = Color(0);

    /// Whether the node carries a local input.
    pub fn is_colored(&self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Placement of a node on the editing canvas. Ignored by the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}
