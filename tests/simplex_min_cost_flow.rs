use itertools::Itertools;
use pretty_assertions::assert_eq;

use minflow::{
    DiGraph, FlowProblem, NetworkSimplex, PivotRule, SolverConfig, Status, SupplyType, INFINITE,
};

/// Builds a problem from `(tail, head, lower, capacity, cost)` tuples and
/// `(node, supply)` pairs.
fn build_problem<'g>(
    graph: &'g DiGraph,
    arcs: &[(usize, usize, i64, i64, i64)],
    supplies: &[(usize, i64)],
) -> FlowProblem<'g> {
    let mut problem = FlowProblem::new(graph);
    for (arc, &(_, _, lower, capacity, cost)) in arcs.iter().enumerate() {
        problem.set_arc_bounds(arc, lower, capacity).unwrap();
        problem.set_arc_unit_cost(arc, cost).unwrap();
    }
    for &(node, supply) in supplies {
        problem.set_node_supply(node, supply).unwrap();
    }
    problem
}

fn build_graph(num_nodes: usize, arcs: &[(usize, usize, i64, i64, i64)]) -> DiGraph {
    let mut graph = DiGraph::with_capacity(num_nodes, arcs.len());
    let _ = arcs
        .iter()
        .map(|&(tail, head, _, _, _)| graph.add_arc(tail, head))
        .collect_vec();
    graph
}

#[test]
fn simple_transport() {
    let arcs = &[
        (0, 2, 0, INFINITE, 3),
        (0, 3, 0, INFINITE, 5),
        (1, 2, 0, INFINITE, 4),
        (1, 3, 0, INFINITE, 2),
    ];
    let supplies = &[(0, 10), (1, 15), (2, -12), (3, -13)];
    let graph = build_graph(4, arcs);
    let problem = build_problem(&graph, arcs, supplies);

    let mut solver = NetworkSimplex::new(&problem);
    assert_eq!(solver.solve(), Status::Optimal);
    let solution = solver.solution().unwrap();
    assert_eq!(solution.total_cost(), 64);
    assert_eq!(solution.flows(), &[10, 0, 2, 13]);
    minflow::validate::validate(&problem, &solution).unwrap();
}

#[test]
fn negative_cost_circulation() {
    let arcs = &[
        (0, 1, 0, 10, 2),
        (1, 2, 0, 10, 3),
        (2, 0, 0, 10, -6),
    ];
    let graph = build_graph(3, arcs);
    let problem = build_problem(&graph, arcs, &[]);

    let mut solver = NetworkSimplex::new(&problem);
    assert_eq!(solver.solve(), Status::Optimal);
    let solution = solver.solution().unwrap();
    assert_eq!(solution.total_cost(), -10);
    assert_eq!(solution.flows(), &[10, 10, 10]);
    minflow::validate::validate(&problem, &solution).unwrap();
}

#[test]
fn lower_bound_respected() {
    let arcs = &[(0, 1, 5, 15, 1)];
    let graph = build_graph(2, arcs);
    let problem = build_problem(&graph, arcs, &[(0, 10), (1, -10)]);

    let mut solver = NetworkSimplex::new(&problem);
    assert_eq!(solver.solve(), Status::Optimal);
    let solution = solver.solution().unwrap();
    assert_eq!(solution.flow(0), 10);
    assert_eq!(solution.total_cost(), 10);
}

#[test]
fn infeasible_by_supply() {
    let arcs = &[(0, 1, 0, 5, 0)];
    let graph = build_graph(2, arcs);
    let problem = build_problem(&graph, arcs, &[(0, 10), (1, -10)]);

    let mut solver = NetworkSimplex::new(&problem);
    assert_eq!(solver.solve(), Status::Infeasible);
    assert!(solver.solution().is_err());
}

#[test]
fn unbounded_cycle() {
    let arcs = &[
        (0, 1, 0, INFINITE, 2),
        (1, 2, 0, INFINITE, 3),
        (2, 0, 0, INFINITE, -6),
    ];
    let graph = build_graph(3, arcs);
    let problem = build_problem(&graph, arcs, &[]);

    let mut solver = NetworkSimplex::new(&problem);
    assert_eq!(solver.solve(), Status::Unbounded);
}

#[test]
fn path_of_length_five() {
    let arcs = &[
        (0, 1, 0, INFINITE, 1),
        (1, 2, 0, INFINITE, 1),
        (2, 3, 0, INFINITE, 1),
        (3, 4, 0, INFINITE, 1),
    ];
    let graph = build_graph(5, arcs);
    let problem = build_problem(&graph, arcs, &[(0, 100), (4, -100)]);

    let mut solver = NetworkSimplex::new(&problem);
    assert_eq!(solver.solve(), Status::Optimal);
    assert_eq!(solver.solution().unwrap().total_cost(), 400);
}

#[test]
fn every_pivot_rule_reaches_the_same_cost() {
    let arcs = &[
        (0, 2, 0, 14, 4),
        (0, 3, 0, 9, 1),
        (1, 2, 0, 11, 2),
        (1, 3, 0, 8, 6),
        (2, 4, 0, 13, 3),
        (3, 4, 0, 12, 5),
        (2, 3, 0, 6, 1),
        (3, 2, 0, 6, 1),
    ];
    let supplies = &[(0, 12), (1, 8), (4, -20)];
    let graph = build_graph(5, arcs);
    let problem = build_problem(&graph, arcs, supplies);

    let costs = [
        PivotRule::BlockSearch,
        PivotRule::FirstEligible,
        PivotRule::BestEligible,
    ]
    .into_iter()
    .map(|pivot_rule| {
        let config = SolverConfig {
            pivot_rule,
            ..SolverConfig::default()
        };
        let mut solver = NetworkSimplex::with_config(&problem, config);
        assert_eq!(solver.solve(), Status::Optimal, "{pivot_rule:?}");
        solver.solution().unwrap().total_cost()
    })
    .collect_vec();
    assert_eq!(costs.iter().unique().count(), 1, "{costs:?}");
}

#[test]
fn adaptive_block_and_cache_do_not_change_the_result() {
    let arcs = &[
        (0, 1, 0, 30, 1),
        (0, 2, 0, 30, 4),
        (1, 3, 0, 30, 2),
        (2, 3, 0, 30, 1),
        (1, 2, 0, 30, 1),
        (3, 4, 0, 60, 3),
    ];
    let supplies = &[(0, 25), (4, -25)];
    let graph = build_graph(5, arcs);
    let problem = build_problem(&graph, arcs, supplies);

    let mut reference = NetworkSimplex::new(&problem);
    assert_eq!(reference.solve(), Status::Optimal);
    let expected = reference.solution().unwrap().total_cost();

    for (adaptive, cache) in [(true, Some(false)), (false, Some(true)), (true, Some(true))] {
        let config = SolverConfig {
            adaptive_block_size: adaptive,
            reduced_cost_cache: cache,
            ..SolverConfig::default()
        };
        let mut solver = NetworkSimplex::with_config(&problem, config);
        assert_eq!(solver.solve(), Status::Optimal);
        assert_eq!(solver.solution().unwrap().total_cost(), expected);
    }
}

#[test]
fn geq_and_leq_relaxations() {
    // More demand than supply: fine under Geq, infeasible under Leq.
    let arcs = &[(0, 1, 0, INFINITE, 2)];
    let graph = build_graph(2, arcs);
    let mut problem = build_problem(&graph, arcs, &[(0, 5), (1, -10)]);

    let mut solver = NetworkSimplex::new(&problem);
    assert_eq!(solver.solve(), Status::Optimal);
    assert_eq!(solver.solution().unwrap().total_cost(), 10);

    problem.set_supply_type(SupplyType::Leq);
    let mut solver = NetworkSimplex::new(&problem);
    assert_eq!(solver.solve(), Status::Infeasible);

    // More supply than demand: the mirror case.
    let mut problem = build_problem(&graph, arcs, &[(0, 10), (1, -5)]);
    problem.set_supply_type(SupplyType::Leq);
    let mut solver = NetworkSimplex::new(&problem);
    assert_eq!(solver.solve(), Status::Optimal);
    assert_eq!(solver.solution().unwrap().total_cost(), 10);
}

#[test]
fn fixed_charge_like_instance_with_parallel_arcs() {
    // Parallel arcs between the same endpoints with different costs; the
    // cheap one must fill first.
    let arcs = &[
        (0, 1, 0, 6, 1),
        (0, 1, 0, 10, 3),
    ];
    let graph = build_graph(2, arcs);
    let problem = build_problem(&graph, arcs, &[(0, 10), (1, -10)]);

    let mut solver = NetworkSimplex::new(&problem);
    assert_eq!(solver.solve(), Status::Optimal);
    let solution = solver.solution().unwrap();
    assert_eq!(solution.flows(), &[6, 4]);
    assert_eq!(solution.total_cost(), 18);
}
