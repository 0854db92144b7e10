//! Independent certification of a solved flow.
//!
//! Checks the four solution properties from first principles, without
//! trusting any engine internals: bounds, conservation modulo supply type,
//! complementary slackness against the reported potentials, and agreement
//! of the reported objective with a recomputation.

use crate::graph::{ArcIndex, CostValue, FlowQuantity, NodeIndex, INFINITE};
use crate::problem::{FlowProblem, SupplyType};
use crate::solution::Solution;

/// First property violation found, with enough context to debug it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("arc {arc}: flow {flow} outside [{lower}, {upper}]")]
    FlowOutOfBounds {
        arc: ArcIndex,
        flow: FlowQuantity,
        lower: FlowQuantity,
        upper: FlowQuantity,
    },

    #[error("node {node}: net outflow {net_outflow} does not satisfy supply {supply}")]
    ConservationViolated {
        node: NodeIndex,
        net_outflow: FlowQuantity,
        supply: FlowQuantity,
    },

    #[error("arc {arc}: flow {flow} and reduced cost {reduced_cost} violate complementary slackness")]
    SlacknessViolated {
        arc: ArcIndex,
        flow: FlowQuantity,
        reduced_cost: CostValue,
    },

    #[error("reported cost {reported} disagrees with recomputed cost {recomputed}")]
    CostMismatch {
        reported: CostValue,
        recomputed: CostValue,
    },
}

/// Certifies an `Optimal` solution against its problem.
pub fn validate(
    problem: &FlowProblem<'_>,
    solution: &Solution<'_>,
) -> Result<(), ValidationError> {
    let graph = problem.graph();

    // Flow bounds.
    for a in graph.arcs() {
        let flow = solution.flow(a);
        let lower = problem.lower(a);
        let upper = problem.upper(a);
        if flow < lower || (upper < INFINITE && flow > upper) {
            return Err(ValidationError::FlowOutOfBounds {
                arc: a,
                flow,
                lower,
                upper,
            });
        }
    }

    // Conservation. With balanced supplies both inequality forms collapse
    // to equality, since the per-node slacks must sum to zero.
    let mut net_outflow = vec![0 as FlowQuantity; graph.num_nodes()];
    for (a, tail, head) in graph.arcs_with_endpoints() {
        net_outflow[tail] += solution.flow(a);
        net_outflow[head] -= solution.flow(a);
    }
    for u in 0..graph.num_nodes() {
        let supply = problem.supply(u);
        let holds = match problem.supply_type() {
            SupplyType::Geq => net_outflow[u] >= supply,
            SupplyType::Leq => net_outflow[u] <= supply,
        };
        let balanced = problem.sum_supply() == 0;
        if !holds || (balanced && net_outflow[u] != supply) {
            return Err(ValidationError::ConservationViolated {
                node: u,
                net_outflow: net_outflow[u],
                supply,
            });
        }
    }

    // Complementary slackness. Fixed arcs (lower == upper) are exempt: both
    // capacity constraints bind and the reduced cost is unconstrained.
    for (a, tail, head) in graph.arcs_with_endpoints() {
        let lower = problem.lower(a);
        let upper = problem.upper(a);
        if lower == upper {
            continue;
        }
        let flow = solution.flow(a);
        let reduced_cost =
            problem.cost(a) + solution.potential(tail) - solution.potential(head);
        let ok = if flow == lower {
            reduced_cost >= 0
        } else if upper < INFINITE && flow == upper {
            reduced_cost <= 0
        } else {
            reduced_cost == 0
        };
        if !ok {
            return Err(ValidationError::SlacknessViolated {
                arc: a,
                flow,
                reduced_cost,
            });
        }
    }

    // Cost agreement, recomputed in a separate pass.
    let recomputed: i128 = graph
        .arcs()
        .map(|a| solution.flow(a) as i128 * problem.cost(a) as i128)
        .sum();
    let reported = solution.total_cost() as i128;
    if recomputed != reported {
        return Err(ValidationError::CostMismatch {
            reported: reported as CostValue,
            recomputed: recomputed.clamp(CostValue::MIN as i128, CostValue::MAX as i128)
                as CostValue,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::DiGraph;
    use crate::NetworkSimplex;

    fn transport() -> (DiGraph, [(usize, i64); 4], [(usize, i64); 4]) {
        let mut graph = DiGraph::new(4);
        graph.add_arc(0, 2);
        graph.add_arc(0, 3);
        graph.add_arc(1, 2);
        graph.add_arc(1, 3);
        (
            graph,
            [(0, 10), (1, 15), (2, -12), (3, -13)],
            [(0, 3), (1, 5), (2, 4), (3, 2)],
        )
    }

    #[test]
    fn accepts_an_engine_solution() {
        let (graph, supplies, costs) = transport();
        let mut problem = FlowProblem::new(&graph);
        for (u, s) in supplies {
            problem.set_node_supply(u, s).unwrap();
        }
        for (a, c) in costs {
            problem.set_arc_unit_cost(a, c).unwrap();
        }
        let mut solver = NetworkSimplex::new(&problem);
        solver.solve();
        validate(&problem, &solver.solution().unwrap()).unwrap();
    }

    #[test]
    fn rejects_bound_and_conservation_violations() {
        let mut graph = DiGraph::new(2);
        graph.add_arc(0, 1);
        let mut problem = FlowProblem::new(&graph);
        problem.set_node_supply(0, 5).unwrap();
        problem.set_node_supply(1, -5).unwrap();
        problem.set_arc_bounds(0, 0, 4).unwrap();

        let potentials = [0, 0];
        let costs = [0];

        let flows = [9];
        let overfull = Solution::new(&graph, &flows, &potentials, &costs);
        assert!(matches!(
            validate(&problem, &overfull),
            Err(ValidationError::FlowOutOfBounds { arc: 0, flow: 9, .. })
        ));

        problem.set_arc_capacity(0, 20).unwrap();
        let flows = [3];
        let short = Solution::new(&graph, &flows, &potentials, &costs);
        assert!(matches!(
            validate(&problem, &short),
            Err(ValidationError::ConservationViolated { node: 0, .. })
        ));
    }

    #[test]
    fn rejects_a_slackness_violation() {
        let mut graph = DiGraph::new(2);
        graph.add_arc(0, 1);
        let mut problem = FlowProblem::new(&graph);
        problem.set_node_supply(0, 5).unwrap();
        problem.set_node_supply(1, -5).unwrap();
        problem.set_arc_capacity(0, 10).unwrap();
        problem.set_arc_unit_cost(0, 2).unwrap();

        // Flow strictly between bounds needs zero reduced cost; these
        // potentials leave it at +2.
        let flows = [5];
        let potentials = [0, 0];
        let costs = [2];
        let solution = Solution::new(&graph, &flows, &potentials, &costs);
        assert!(matches!(
            validate(&problem, &solution),
            Err(ValidationError::SlacknessViolated { arc: 0, .. })
        ));
    }

    #[test]
    fn fixed_arcs_are_exempt_from_slackness() {
        let mut graph = DiGraph::new(2);
        graph.add_arc(0, 1);
        let mut problem = FlowProblem::new(&graph);
        problem.set_node_supply(0, 5).unwrap();
        problem.set_node_supply(1, -5).unwrap();
        problem.set_arc_bounds(0, 5, 5).unwrap();
        problem.set_arc_unit_cost(0, 7).unwrap();

        let flows = [5];
        let potentials = [0, 0];
        let costs = [7];
        let solution = Solution::new(&graph, &flows, &potentials, &costs);
        validate(&problem, &solution).unwrap();
    }
}
