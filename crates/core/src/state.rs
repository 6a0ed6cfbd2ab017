//! Node states and their display form.

use portnum_types::Port;
use std::fmt;

/// The tag of a state: which variant a node is in, ignoring its parameters.
pub trait StateKind: Copy + Eq + fmt::Debug + 'static {
    /// Short name shown in round tables, e.g. `"WUR"`.
    fn name(self) -> &'static str;

    /// Long human-readable description.
    fn description(self) -> &'static str;
}

/// One displayable parameter of a state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    /// A counter, usually the local round number.
    Count(u64),
    /// A single port.
    Port(Port),
    /// A set of ports, rendered ascending.
    Ports(Vec<Port>),
    /// A boolean output.
    Flag(bool),
    /// A nested state, already rendered.
    State(String),
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Count(n) => write!(f, "{n}"),
            Param::Port(port) => write!(f, "{port}"),
            Param::Ports(ports) => {
                write!(f, "{{")?;
                for (i, port) in ports.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, "{port}")?;
                }
                write!(f, "}}")
            }
            Param::Flag(flag) => write!(f, "{flag}"),
            Param::State(rendered) => write!(f, "{rendered}"),
        }
    }
}

/// A node's local state.
///
/// States are tagged unions: the [`kind`](Self::kind) says which variant the
/// node is in, and the variant's fields are its parameters. Stopping checks
/// and [`same_kind`](Self::same_kind) look at the kind only; parameters exist
/// for display.
pub trait StateValue: Clone + fmt::Debug {
    /// The tag type.
    type Kind: StateKind;

    /// The variant tag of this state.
    fn kind(&self) -> Self::Kind;

    /// Parameters in display order.
    fn params(&self) -> Vec<Param>;

    /// Check if two states are of the same kind, ignoring parameters.
    fn same_kind(&self, other: &Self) -> bool {
        self.kind() == other.kind()
    }

    /// Short name of the kind.
    fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Render as `NAME` or `NAME(p1,p2,..)`.
    fn render(&self) -> String {
        let params = self.params();
        if params.is_empty() {
            return self.name().to_string();
        }
        let joined: Vec<String> = params.iter().map(ToString::to_string).collect();
        format!("{}({})", self.name(), joined.join(","))
    }
}
