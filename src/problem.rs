//! Problem model: per-arc bounds and costs, per-node supplies.

use crate::error::ProblemError;
use crate::graph::{ArcIndex, CostValue, DiGraph, FlowQuantity, NodeIndex, INFINITE};

/// Outcome of a solve call.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Status {
    /// The problem was not solved yet, or its data were edited.
    NotSolved,
    /// An optimal solution was found; flows and potentials are available.
    Optimal,
    /// No flow satisfies the bounds and supply constraints.
    Infeasible,
    /// The objective is unbounded: a negative-cost cycle with unlimited
    /// residual capacity exists.
    Unbounded,
    /// Supplies do not balance. Only reported by strict-balance frontends
    /// such as [`crate::SimpleMinCostFlow`].
    Unbalanced,
}

/// Interpretation of the per-node supply constraints.
///
/// With `Geq` (the default) every supply must be shipped in full while
/// demands may go partially unserved, so the total demand must be greater
/// than or equal to the total supply. `Leq` mirrors this: demands are hard
/// and supplies may remain partially unshipped.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum SupplyType {
    #[default]
    Geq,
    Leq,
}

/// A minimum-cost flow problem over a borrowed [`DiGraph`].
///
/// Arcs default to `[0, INFINITE]` bounds and zero cost; nodes default to
/// zero supply. All setters validate their indices immediately and leave the
/// problem unchanged on error.
#[derive(Debug, Clone)]
pub struct FlowProblem<'g> {
    graph: &'g DiGraph,
    lower: Vec<FlowQuantity>,
    upper: Vec<FlowQuantity>,
    cost: Vec<CostValue>,
    supply: Vec<FlowQuantity>,
    supply_type: SupplyType,
}

impl<'g> FlowProblem<'g> {
    /// Creates a problem with default bounds, costs and supplies.
    pub fn new(graph: &'g DiGraph) -> Self {
        Self {
            graph,
            lower: vec![0; graph.num_arcs()],
            upper: vec![INFINITE; graph.num_arcs()],
            cost: vec![0; graph.num_arcs()],
            supply: vec![0; graph.num_nodes()],
            supply_type: SupplyType::default(),
        }
    }

    /// Returns the underlying graph.
    pub fn graph(&self) -> &'g DiGraph {
        self.graph
    }

    /// Sets the supply of a node. A demand is modeled as a negative supply.
    pub fn set_node_supply(
        &mut self,
        node: NodeIndex,
        supply: FlowQuantity,
    ) -> Result<(), ProblemError> {
        self.check_node(node)?;
        self.supply[node] = supply;
        Ok(())
    }

    /// Sets the lower flow bound of an arc.
    pub fn set_arc_lower_bound(
        &mut self,
        arc: ArcIndex,
        lower: FlowQuantity,
    ) -> Result<(), ProblemError> {
        self.check_arc(arc)?;
        self.lower[arc] = lower;
        Ok(())
    }

    /// Sets the capacity (upper flow bound) of an arc. Values at or above
    /// [`INFINITE`] mean the arc is uncapacitated.
    pub fn set_arc_capacity(
        &mut self,
        arc: ArcIndex,
        capacity: FlowQuantity,
    ) -> Result<(), ProblemError> {
        self.check_arc(arc)?;
        self.upper[arc] = capacity;
        Ok(())
    }

    /// Sets both flow bounds of an arc, rejecting inverted bounds up front.
    pub fn set_arc_bounds(
        &mut self,
        arc: ArcIndex,
        lower: FlowQuantity,
        upper: FlowQuantity,
    ) -> Result<(), ProblemError> {
        self.check_arc(arc)?;
        if upper < lower {
            return Err(ProblemError::InvertedBounds { arc, lower, upper });
        }
        self.lower[arc] = lower;
        self.upper[arc] = upper;
        Ok(())
    }

    /// Sets the unit cost of an arc.
    pub fn set_arc_unit_cost(
        &mut self,
        arc: ArcIndex,
        cost: CostValue,
    ) -> Result<(), ProblemError> {
        self.check_arc(arc)?;
        if cost.checked_abs().is_none() || cost.abs() >= INFINITE {
            return Err(ProblemError::CostOutOfRange { arc, cost });
        }
        self.cost[arc] = cost;
        Ok(())
    }

    /// Sets the supply constraint interpretation.
    pub fn set_supply_type(&mut self, supply_type: SupplyType) {
        self.supply_type = supply_type;
    }

    /// Returns the supply of a node.
    pub fn supply(&self, node: NodeIndex) -> FlowQuantity {
        self.supply[node]
    }

    /// Returns the lower bound of an arc.
    pub fn lower(&self, arc: ArcIndex) -> FlowQuantity {
        self.lower[arc]
    }

    /// Returns the capacity of an arc.
    pub fn upper(&self, arc: ArcIndex) -> FlowQuantity {
        self.upper[arc]
    }

    /// Returns the unit cost of an arc.
    pub fn cost(&self, arc: ArcIndex) -> CostValue {
        self.cost[arc]
    }

    /// Returns the supply constraint interpretation.
    pub fn supply_type(&self) -> SupplyType {
        self.supply_type
    }

    /// Returns all lower bounds, indexed by arc.
    pub fn lowers(&self) -> &[FlowQuantity] {
        &self.lower
    }

    /// Returns all capacities, indexed by arc.
    pub fn uppers(&self) -> &[FlowQuantity] {
        &self.upper
    }

    /// Returns all unit costs, indexed by arc.
    pub fn costs(&self) -> &[CostValue] {
        &self.cost
    }

    /// Returns all supplies, indexed by node.
    pub fn supplies(&self) -> &[FlowQuantity] {
        &self.supply
    }

    /// Returns the sum of all node supplies.
    pub fn sum_supply(&self) -> FlowQuantity {
        self.supply.iter().sum()
    }

    fn check_node(&self, node: NodeIndex) -> Result<(), ProblemError> {
        if node < self.graph.num_nodes() {
            Ok(())
        } else {
            Err(ProblemError::NodeOutOfRange {
                node,
                num_nodes: self.graph.num_nodes(),
            })
        }
    }

    fn check_arc(&self, arc: ArcIndex) -> Result<(), ProblemError> {
        if arc < self.graph.num_arcs() {
            Ok(())
        } else {
            Err(ProblemError::ArcOutOfRange {
                arc,
                num_arcs: self.graph.num_arcs(),
            })
        }
    }
}
