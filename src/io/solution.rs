//! Solution (`.sol`) files.
//!
//! ```text
//! c  <comment>
//! s <OPTIMAL_COST>
//! f <FROM_1BASED> <TO_1BASED> <FLOW>
//! f <ARC_INDEX> <FLOW>
//! p <NODE_1BASED> <POTENTIAL>
//! ```
//!
//! Only non-zero flows are emitted; both `f` forms are accepted on read.

use std::io::{BufRead, Write};

use crate::graph::{ArcIndex, CostValue, FlowQuantity, NodeIndex};
use crate::io::DimacsError;
use crate::solution::Solution;

/// Contents of a parsed `.sol` file, kept in file terms (0-based indices
/// after translation, flows as written).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolutionFile {
    pub cost: CostValue,
    /// 3-token `f` lines: `(tail, head, flow)`.
    pub flows_by_endpoints: Vec<(NodeIndex, NodeIndex, FlowQuantity)>,
    /// 2-token `f` lines: `(arc, flow)`.
    pub flows_by_arc: Vec<(ArcIndex, FlowQuantity)>,
    /// Optional `p` lines: `(node, potential)`.
    pub potentials: Vec<(NodeIndex, CostValue)>,
}

/// Writes a solution in the 3-token `f` form, with potentials on request.
pub fn write_solution<W: Write>(
    mut writer: W,
    solution: &Solution<'_>,
    include_potentials: bool,
) -> std::io::Result<()> {
    writeln!(writer, "s {}", solution.total_cost())?;
    let graph = solution.graph();
    for (arc, flow) in solution.nonzero_flows() {
        writeln!(
            writer,
            "f {} {} {}",
            graph.tail(arc) + 1,
            graph.head(arc) + 1,
            flow
        )?;
    }
    if include_potentials {
        for u in 0..graph.num_nodes() {
            writeln!(writer, "p {} {}", u + 1, solution.potential(u))?;
        }
    }
    Ok(())
}

/// Reads a `.sol` file.
pub fn read_solution<R: BufRead>(reader: R) -> Result<SolutionFile, DimacsError> {
    let mut file = SolutionFile::default();
    let mut saw_cost = false;

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        match tokens.first() {
            None | Some(&"c") => {}
            Some(&"s") => {
                file.cost = parse(&tokens, 1, line_no, "cost")?;
                saw_cost = true;
            }
            Some(&"f") => match tokens.len() {
                4 => {
                    let tail: usize = parse(&tokens, 1, line_no, "arc tail")?;
                    let head: usize = parse(&tokens, 2, line_no, "arc head")?;
                    if tail == 0 || head == 0 {
                        return Err(DimacsError::parse(line_no, "node indices are 1-based"));
                    }
                    let flow = parse(&tokens, 3, line_no, "flow")?;
                    file.flows_by_endpoints.push((tail - 1, head - 1, flow));
                }
                3 => {
                    let arc = parse(&tokens, 1, line_no, "arc index")?;
                    let flow = parse(&tokens, 2, line_no, "flow")?;
                    file.flows_by_arc.push((arc, flow));
                }
                _ => {
                    return Err(DimacsError::parse(
                        line_no,
                        format!("flow line with {} tokens", tokens.len()),
                    ))
                }
            },
            Some(&"p") => {
                let node: usize = parse(&tokens, 1, line_no, "node")?;
                if node == 0 {
                    return Err(DimacsError::parse(line_no, "node indices are 1-based"));
                }
                let potential = parse(&tokens, 2, line_no, "potential")?;
                file.potentials.push((node - 1, potential));
            }
            Some(_) => {}
        }
    }

    if !saw_cost {
        return Err(DimacsError::parse(0, "no cost line found"));
    }
    Ok(file)
}

fn parse<T: std::str::FromStr>(
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
