//! Read-only directed graph view shared by the solvers.

/// Dense 0-based node identifier.
pub type NodeIndex = usize;
/// Dense 0-based arc identifier.
pub type ArcIndex = usize;
/// Flow amounts, capacities and supplies.
pub type FlowQuantity = i64;
/// Per-unit arc costs and node potentials.
pub type CostValue = i64;

/// Capacities at or above this value are treated as unbounded. Keeping the
/// effective infinity at half the representable range leaves headroom for
/// residual arithmetic without overflow checks in the inner loops.
pub const INFINITE: FlowQuantity = i64::MAX / 2;

/// A compact directed multigraph stored as parallel tail/head arrays.
///
/// The node count is fixed at construction; arcs are appended with
/// [`DiGraph::add_arc`] and keep their insertion order as dense indices.
/// For a given pair `(tail, head)` adding an arc does not overwrite an
/// already-existing arc between tail and head: another arc is created
/// instead. This makes it possible to handle multigraphs.
#[derive(Debug, Clone, Default)]
pub struct DiGraph {
    num_nodes: usize,
    tail: Vec<NodeIndex>,
    head: Vec<NodeIndex>,
}

impl DiGraph {
    /// Creates a graph with `num_nodes` nodes and no arcs.
    pub fn new(num_nodes: usize) -> Self {
        Self {
            num_nodes,
            tail: Vec::new(),
            head: Vec::new(),
        }
    }

    /// Creates a graph with `num_nodes` nodes and room for `num_arcs` arcs.
    pub fn with_capacity(num_nodes: usize, num_arcs: usize) -> Self {
        Self {
            num_nodes,
            tail: Vec::with_capacity(num_arcs),
            head: Vec::with_capacity(num_arcs),
        }
    }

    /// Adds an arc to the graph and returns its index.
    ///
    /// # Panics
    ///
    /// Panics if either endpoint is out of range.
    pub fn add_arc(&mut self, tail: NodeIndex, head: NodeIndex) -> ArcIndex {
        assert!(
            tail < self.num_nodes && head < self.num_nodes,
            "arc ({tail}, {head}) out of range for {} nodes",
            self.num_nodes
        );
        let arc = self.tail.len();
        self.tail.push(tail);
        self.head.push(head);
        arc
    }

    /// Returns the tail node of the given arc.
    pub fn tail(&self, arc: ArcIndex) -> NodeIndex {
        self.tail[arc]
    }

    /// Returns the head node of the given arc.
    pub fn head(&self, arc: ArcIndex) -> NodeIndex {
        self.head[arc]
    }

    /// Returns the number of nodes in the graph.
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Returns the number of arcs in the graph.
    pub fn num_arcs(&self) -> usize {
        self.tail.len()
    }

    /// Iterates over all arc indices in insertion order.
    pub fn arcs(&self) -> impl Iterator<Item = ArcIndex> {
        0..self.tail.len()
    }

    /// Iterates over `(arc, tail, head)` triples in insertion order.
    pub fn arcs_with_endpoints(&self) -> impl Iterator<Item = (ArcIndex, NodeIndex, NodeIndex)> + '_ {
        self.tail
            .iter()
            .zip(&self.head)
            .enumerate()
            .map(|(a, (&u, &v))| (a, u, v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arcs_keep_insertion_order() {
        let mut graph = DiGraph::new(3);
        let a = graph.add_arc(0, 1);
        let b = graph.add_arc(1, 2);
        let c = graph.add_arc(0, 1); // parallel arc
        assert_eq!((a, b, c), (0, 1, 2));
        assert_eq!(graph.num_nodes(), 3);
        assert_eq!(graph.num_arcs(), 3);
        assert_eq!((graph.tail(2), graph.head(2)), (0, 1));
        let triples: Vec<_> = graph.arcs_with_endpoints().collect();
        assert_eq!(triples, vec![(0, 0, 1), (1, 1, 2), (2, 0, 1)]);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn add_arc_rejects_bad_endpoint() {
        let mut graph = DiGraph::new(2);
        graph.add_arc(0, 2);
    }
}
