//! Read-only view over a solved flow, borrowed from an engine.

use crate::graph::{ArcIndex, CostValue, DiGraph, FlowQuantity, NodeIndex};

/// Flows, potentials and the objective value of an optimal solution.
///
/// A `Solution` borrows its solver and is only handed out while the solver
/// status is [`crate::Status::Optimal`], so every accessor is infallible.
#[derive(Debug, Clone, Copy)]
pub struct Solution<'a> {
    graph: &'a DiGraph,
    flows: &'a [FlowQuantity],
    potentials: &'a [CostValue],
    costs: &'a [CostValue],
}

impl<'a> Solution<'a> {
    pub(crate) fn new(
        graph: &'a DiGraph,
        flows: &'a [FlowQuantity],
        potentials: &'a [CostValue],
        costs: &'a [CostValue],
    ) -> Self {
        Self {
            graph,
            flows,
            potentials,
            costs,
        }
    }

    /// Returns the graph the solution refers to.
    pub fn graph(&self) -> &'a DiGraph {
        self.graph
    }

    /// Returns the flow on the given arc, in the original (unshifted) bounds.
    pub fn flow(&self, arc: ArcIndex) -> FlowQuantity {
        self.flows[arc]
    }

    /// Returns the potential (dual value) of the given node.
    pub fn potential(&self, node: NodeIndex) -> CostValue {
        self.potentials[node]
    }

    /// Returns all flows, indexed by arc.
    pub fn flows(&self) -> &'a [FlowQuantity] {
        self.flows
    }

    /// Returns all potentials, indexed by node.
    pub fn potentials(&self) -> &'a [CostValue] {
        self.potentials
    }

    /// Returns the total cost of the flow, recomputed from the per-arc flows.
    /// The accumulation is exact in 128 bits; a result outside the 64-bit
    /// range is capped at `CostValue::MAX`.
    pub fn total_cost(&self) -> CostValue {
        let total: i128 = self
            .flows
            .iter()
            .zip(self.costs)
            .map(|(&f, &c)| f as i128 * c as i128)
            .sum();
        if total > CostValue::MAX as i128 {
            CostValue::MAX
        } else if total < CostValue::MIN as i128 {
            CostValue::MIN
        } else {
            total as CostValue
        }
    }

    /// Iterates over `(arc, flow)` pairs with non-zero flow, the subset a
    /// solution file needs to record.
    pub fn nonzero_flows(&self) -> impl Iterator<Item = (ArcIndex, FlowQuantity)> + 'a {
        self.flows
            .iter()
            .enumerate()
            .filter(|(_, &f)| f != 0)
            .map(|(a, &f)| (a, f))
    }
}
