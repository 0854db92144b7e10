//! DIMACS `.min` reader.
//!
//! Line-oriented, whitespace-separated. `c` lines are comments, the single
//! `p min NODES ARCS` line must precede every `n` and `a` line, `n` lines
//! carry 1-based node supplies (omitted nodes default to zero), `a` lines
//! carry `FROM TO LO HI COST` with 1-based endpoints. Unknown line types
//! are ignored. Arcs receive dense 0-based indices in file order.

use std::io::BufRead;
use std::path::Path;

use crate::graph::{CostValue, DiGraph, FlowQuantity, NodeIndex};
use crate::io::DimacsError;
use crate::problem::FlowProblem;

/// A parsed `.min` instance. The graph and the attribute vectors are kept
/// side by side so a [`FlowProblem`] view can be borrowed from it.
#[derive(Debug, Clone)]
pub struct DimacsInstance {
    pub graph: DiGraph,
    pub supplies: Vec<FlowQuantity>,
    pub lowers: Vec<FlowQuantity>,
    pub uppers: Vec<FlowQuantity>,
    pub costs: Vec<CostValue>,
}

impl DimacsInstance {
    /// Builds the problem view over the parsed data.
    pub fn problem(&self) -> FlowProblem<'_> {
        let mut problem = FlowProblem::new(&self.graph);
        for (u, &s) in self.supplies.iter().enumerate() {
            problem.set_node_supply(u, s).expect("node parsed in range");
        }
        for a in self.graph.arcs() {
            // Bounds were range-checked during parsing.
            problem
                .set_arc_lower_bound(a, self.lowers[a])
                .expect("arc parsed in range");
            problem
                .set_arc_capacity(a, self.uppers[a])
                .expect("arc parsed in range");
            problem
                .set_arc_unit_cost(a, self.costs[a])
                .expect("arc parsed in range");
        }
        problem
    }
}

fn field<T: std::str::FromStr>(
    tokens: &[&str],
    index: usize,
    line: usize,
    what: &str,
) -> Result<T, DimacsError> {
    tokens
        .get(index)
        .ok_or_else(|| DimacsError::parse(line, format!("missing {what}")))?
        .parse()
        .map_err(|_| DimacsError::parse(line, format!("malformed {what}: {:?}", tokens[index])))
}

fn node_1based(
    tokens: &[&str],
    index: usize,
    line: usize,
    num_nodes: usize,
    what: &str,
) -> Result<NodeIndex, DimacsError> {
    let raw: usize = field(tokens, index, line, what)?;
    if raw == 0 || raw > num_nodes {
        return Err(DimacsError::parse(
            line,
            format!("{what} {raw} outside 1..={num_nodes}"),
        ));
    }
    Ok(raw - 1)
}

/// Reads a DIMACS `.min` instance from a buffered reader.
pub fn read_dimacs_min<R: BufRead>(reader: R) -> Result<DimacsInstance, DimacsError> {
    let mut instance: Option<DimacsInstance> = None;
    let mut declared_arcs = 0usize;

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.first() {
            None | Some(&"c") => {}
            Some(&"p") => {
                if instance.is_some() {
                    return Err(DimacsError::parse(line_no, "duplicate problem line"));
                }
                if tokens.get(1) != Some(&"min") {
                    return Err(DimacsError::parse(
                        line_no,
                        format!("expected 'p min', found {:?}", line.trim()),
                    ));
                }
                let nodes: usize = field(&tokens, 2, line_no, "node count")?;
                declared_arcs = field(&tokens, 3, line_no, "arc count")?;
                instance = Some(DimacsInstance {
                    graph: DiGraph::with_capacity(nodes, declared_arcs),
                    supplies: vec![0; nodes],
                    lowers: Vec::with_capacity(declared_arcs),
                    uppers: Vec::with_capacity(declared_arcs),
                    costs: Vec::with_capacity(declared_arcs),
                });
            }
            Some(&"n") => {
                let inst = instance
                    .as_mut()
                    .ok_or_else(|| DimacsError::parse(line_no, "'n' before the problem line"))?;
                let node = node_1based(&tokens, 1, line_no, inst.graph.num_nodes(), "node")?;
                inst.supplies[node] = field(&tokens, 2, line_no, "supply")?;
            }
            Some(&"a") => {
                let inst = instance
                    .as_mut()
                    .ok_or_else(|| DimacsError::parse(line_no, "'a' before the problem line"))?;
                if inst.graph.num_arcs() == declared_arcs {
                    return Err(DimacsError::parse(
                        line_no,
                        format!("more than the declared {declared_arcs} arcs"),
                    ));
                }
                let from = node_1based(&tokens, 1, line_no, inst.graph.num_nodes(), "arc tail")?;
                let to = node_1based(&tokens, 2, line_no, inst.graph.num_nodes(), "arc head")?;
                let lower: FlowQuantity = field(&tokens, 3, line_no, "lower bound")?;
                let upper: FlowQuantity = field(&tokens, 4, line_no, "capacity")?;
                let cost: CostValue = field(&tokens, 5, line_no, "cost")?;
                if cost.checked_abs().map_or(true, |c| c >= crate::graph::INFINITE) {
                    return Err(DimacsError::parse(
                        line_no,
                        format!("cost {cost} exceeds the representable range"),
                    ));
                }
                inst.graph.add_arc(from, to);
                inst.lowers.push(lower);
                inst.uppers.push(upper);
                inst.costs.push(cost);
            }
            // Unknown line types are ignored, per the format.
            Some(_) => {}
        }
    }

    instance.ok_or_else(|| DimacsError::parse(0, "no problem line found"))
}

/// Reads a DIMACS `.min` instance from a file.
pub fn read_dimacs_min_file(path: impl AsRef<Path>) -> Result<DimacsInstance, DimacsError> {
    let file = std::fs::File::open(path)?;
    read_dimacs_min(std::io::BufReader::new(file))
}
