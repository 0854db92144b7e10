//! Strict-balance convenience frontend.

use crate::graph::{ArcIndex, CostValue, DiGraph, FlowQuantity, NodeIndex};
use crate::problem::{FlowProblem, Status};
use crate::simplex::NetworkSimplex;

/// Owns its graph and problem data and solves with the network simplex.
///
/// Unlike the raw engines, supplies must balance exactly: `solve` returns
/// [`Status::Unbalanced`] when they do not, instead of letting the `Geq`
/// relaxation absorb the difference.
#[derive(Debug, Clone, Default)]
pub struct SimpleMinCostFlow {
    graph: DiGraph,
    capacities: Vec<FlowQuantity>,
    costs: Vec<CostValue>,
    supplies: Vec<FlowQuantity>,
    solved: Option<(Vec<FlowQuantity>, CostValue)>,
}

impl SimpleMinCostFlow {
    /// Creates an instance with `num_nodes` nodes and no arcs.
    pub fn new(num_nodes: usize) -> Self {
        Self {
            graph: DiGraph::new(num_nodes),
            capacities: Vec::new(),
            costs: Vec::new(),
            supplies: vec![0; num_nodes],
            solved: None,
        }
    }

    /// Adds an arc and returns its index.
    pub fn add_arc_with_capacity_and_unit_cost(
        &mut self,
        tail: NodeIndex,
        head: NodeIndex,
        capacity: FlowQuantity,
        unit_cost: CostValue,
    ) -> ArcIndex {
        let arc = self.graph.add_arc(tail, head);
        self.capacities.push(capacity);
        self.costs.push(unit_cost);
        self.solved = None;
        arc
    }

    /// Sets the supply of a node. A demand is modeled as a negative supply.
    ///
    /// # Panics
    ///
    /// Panics if the node is out of range.
    pub fn set_node_supply(&mut self, node: NodeIndex, supply: FlowQuantity) {
        self.supplies[node] = supply;
        self.solved = None;
    }

    /// Solves and returns the status.
    pub fn solve(&mut self) -> Status {
        if self.supplies.iter().sum::<FlowQuantity>() != 0 {
            return Status::Unbalanced;
        }
        let mut problem = FlowProblem::new(&self.graph);
        for (u, &s) in self.supplies.iter().enumerate() {
            problem.set_node_supply(u, s).expect("node in range");
        }
        for a in self.graph.arcs() {
            problem
                .set_arc_capacity(a, self.capacities[a])
                .expect("arc in range");
            problem
                .set_arc_unit_cost(a, self.costs[a])
                .expect("arc in range");
        }
        let mut solver = NetworkSimplex::new(&problem);
        let status = solver.solve();
        if status == Status::Optimal {
            let solution = solver.solution().expect("optimal status");
            self.solved = Some((solution.flows().to_vec(), solution.total_cost()));
        }
        status
    }

    /// Optimal cost of the last successful solve.
    pub fn optimal_cost(&self) -> Option<CostValue> {
        self.solved.as_ref().map(|(_, cost)| *cost)
    }

    /// Flow on an arc in the last successful solve.
    pub fn flow(&self, arc: ArcIndex) -> Option<FlowQuantity> {
        self.solved.as_ref().map(|(flows, _)| flows[arc])
    }

    /// Number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.graph.num_nodes()
    }

    /// Number of arcs.
    pub fn num_arcs(&self) -> usize {
        self.graph.num_arcs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn solves_a_balanced_instance() {
        let mut solver = SimpleMinCostFlow::new(3);
        solver.add_arc_with_capacity_and_unit_cost(0, 1, 10, 2);
        solver.add_arc_with_capacity_and_unit_cost(1, 2, 10, 3);
        solver.set_node_supply(0, 7);
        solver.set_node_supply(2, -7);

        assert_eq!(solver.solve(), Status::Optimal);
        assert_eq!(solver.optimal_cost(), Some(35));
        assert_eq!(solver.flow(0), Some(7));
        assert_eq!(solver.flow(1), Some(7));
    }

    #[test]
    fn unbalanced_supplies_are_rejected() {
        let mut solver = SimpleMinCostFlow::new(2);
        solver.add_arc_with_capacity_and_unit_cost(0, 1, 10, 1);
        solver.set_node_supply(0, 5);
        solver.set_node_supply(1, -3);

        assert_eq!(solver.solve(), Status::Unbalanced);
        assert_eq!(solver.optimal_cost(), None);
    }

    #[test]
    fn editing_clears_the_cached_solution() {
        let mut solver = SimpleMinCostFlow::new(2);
        solver.add_arc_with_capacity_and_unit_cost(0, 1, 10, 1);
        solver.set_node_supply(0, 5);
        solver.set_node_supply(1, -5);
        assert_eq!(solver.solve(), Status::Optimal);
        assert!(solver.optimal_cost().is_some());

        solver.set_node_supply(0, 6);
        assert_eq!(solver.optimal_cost(), None);
    }
}
