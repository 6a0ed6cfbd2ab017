//! Per-round state tables.

use indexmap::IndexMap;
use portnum_core::StateValue;
use portnum_simulation::{RoundOutcome, RunContext};
use portnum_types::{NodeId, Topology};
use std::fmt::Write;

/// Display names of the nodes of a graph.
#[derive(Debug, Clone, Default)]
pub struct Labels {
    names: IndexMap<NodeId, String>,
}

impl Labels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Label every node of `topology` with its default display name.
    pub fn from_topology(topology: &dyn Topology) -> Self {
        Self {
            names: topology
                .node_ids()
                .into_iter()
                .map(|id| (id, id.to_string()))
                .collect(),
        }
    }

    pub fn insert(&mut self, node: NodeId, name: String) {
        self.names.insert(node, name);
    }

    /// Find a node by name.
    pub fn lookup(&self, name: &str) -> Option<NodeId> {
        self.names
            .iter()
            .find(|(_, n)| n.as_str() == name)
            .map(|(id, _)| *id)
    }

    /// Name of a node, falling back to its display form.
    pub fn label(&self, node: NodeId) -> String {
        self.names
            .get(&node)
            .cloned()
            .unwrap_or_else(|| node.to_string())
    }
}

/// One node's transition in one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundRow {
    pub node: String,
    pub before: String,
    pub after: String,
}

/// All transitions of one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTable {
    pub round: u64,
    pub deliveries: usize,
    pub rows: Vec<RoundRow>,
}

impl RoundTable {
    /// Capture the round just committed into `ctx`.
    pub fn capture<S: StateValue>(
        outcome: &RoundOutcome,
        ctx: &RunContext<S>,
        labels: &Labels,
    ) -> Self {
        let rows = ctx
            .after_round_states()
            .iter()
            .map(|(node, after)| RoundRow {
                node: labels.label(*node),
                before: ctx
                    .before_round_states()
                    .get(node)
                    .map(|state| state.render())
                    .unwrap_or_default(),
                after: after.render(),
            })
            .collect();
        Self {
            round: outcome.round,
            deliveries: outcome.deliveries,
            rows,
        }
    }
}

/// Everything printed for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub title: String,
    pub rounds: Vec<RoundTable>,
    pub summary: Vec<String>,
}

impl Report {
    /// Render as aligned plain text.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "== {} ==", self.title);

        for table in &self.rounds {
            let node_width = table.rows.iter().map(|r| r.node.len()).max().unwrap_or(0);
            let before_width = table.rows.iter().map(|r| r.before.len()).max().unwrap_or(0);
            let _ = writeln!(out, "round {} ({} messages)", table.round, table.deliveries);
            for row in &table.rows {
                let _ = writeln!(
                    out,
                    "  {:node_width$}  {:before_width$}  -> {}",
                    row.node, row.before, row.after
                );
            }
        }

        for line in &self.summary {
            let _ = writeln!(out, "{line}");
        }
        out
    }
}
