use std::io::BufReader;

use pretty_assertions::assert_eq;

use minflow::io::{read_dimacs_min, read_solution, write_solution};
use minflow::{CostScaling, NetworkSimplex, Status};

const TRANSPORT: &str = "\
c 2x2 transportation instance
p min 4 4
n 1 10
n 2 15
n 3 -12
n 4 -13
a 1 3 0 30 3
a 1 4 0 30 5
a 2 3 0 30 4
a 2 4 0 30 2
";

#[test]
fn parse_solve_write_read_round_trip() {
    let instance = read_dimacs_min(BufReader::new(TRANSPORT.as_bytes())).unwrap();
    let problem = instance.problem();

    let mut solver = NetworkSimplex::new(&problem);
    assert_eq!(solver.solve(), Status::Optimal);
    let solution = solver.solution().unwrap();
    assert_eq!(solution.total_cost(), 64);

    let mut buffer = Vec::new();
    write_solution(&mut buffer, &solution, true).unwrap();
    let parsed = read_solution(buffer.as_slice()).unwrap();
    assert_eq!(parsed.cost, 64);

    // Every non-zero flow line must match the in-memory solution, with
    // 1-based endpoints translated back.
    for &(tail, head, flow) in &parsed.flows_by_endpoints {
        let arc = instance
            .graph
            .arcs_with_endpoints()
            .find(|&(_, t, h)| t == tail && h == head)
            .map(|(a, _, _)| a)
            .unwrap();
        assert_eq!(solution.flow(arc), flow);
    }
    assert_eq!(
        parsed.flows_by_endpoints.len(),
        solution.nonzero_flows().count()
    );
    assert_eq!(parsed.potentials.len(), instance.graph.num_nodes());
}

#[test]
fn both_engines_solve_the_parsed_instance_identically() {
    let instance = read_dimacs_min(BufReader::new(TRANSPORT.as_bytes())).unwrap();
    let problem = instance.problem();

    let mut simplex = NetworkSimplex::new(&problem);
    assert_eq!(simplex.solve(), Status::Optimal);
    let mut scaling = CostScaling::new(&problem);
    assert_eq!(scaling.solve(), Status::Optimal);
    assert_eq!(
        simplex.solution().unwrap().total_cost(),
        scaling.solution().unwrap().total_cost()
    );
}

#[test]
fn infeasible_instance_reports_infeasible() {
    let text = "p min 2 1\nn 1 10\nn 2 -10\na 1 2 0 5 1\n";
    let instance = read_dimacs_min(BufReader::new(text.as_bytes())).unwrap();
    let problem = instance.problem();
    let mut solver = NetworkSimplex::new(&problem);
    assert_eq!(solver.solve(), Status::Infeasible);
}

#[test]
fn negative_lower_bounds_parse_and_solve() {
    // A reversible arc modeled with a negative lower bound.
    let text = "p min 2 2\nn 1 4\nn 2 -4\na 1 2 -3 10 2\na 2 1 0 10 1\n";
    let instance = read_dimacs_min(BufReader::new(text.as_bytes())).unwrap();
    assert_eq!(instance.lowers, vec![-3, 0]);
    let problem = instance.problem();
    let mut solver = NetworkSimplex::new(&problem);
    assert_eq!(solver.solve(), Status::Optimal);
    let solution = solver.solution().unwrap();
    minflow::validate::validate(&problem, &solution).unwrap();
    assert_eq!(solution.total_cost(), 8);
}
