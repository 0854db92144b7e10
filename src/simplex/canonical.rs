//! Canonicalizer: lower-bound shift, artificial arcs and the initial basis.
//!
//! The canonical form owns shifted copies of the arc arrays, extended with
//! the artificial arcs that connect every real node to an auxiliary root.
//! The construction yields a spanning tree that is primal feasible from the
//! first pivot and makes infeasibility detection a single linear scan over
//! the high-cost artificial block at termination.

use crate::graph::{ArcIndex, CostValue, FlowQuantity, NodeIndex, INFINITE};
use crate::problem::{FlowProblem, SupplyType};
use crate::simplex::tree::{SpanningTree, DIR_DOWN, DIR_UP, NONE, STATE_LOWER, STATE_TREE};

/// Canonical arc/node arrays owned by an engine for the duration of one
/// solve call. Arc slots: `[0, m)` real arcs, `[m, m + n)` the first
/// artificial block (one arc per node, searched by the pivot rules),
/// `[m + n, all_arc_num)` the high-cost block whose flow must vanish for the
/// problem to be feasible.
#[derive(Debug, Clone)]
pub(crate) struct CanonicalForm {
    pub node_num: usize,
    pub arc_num: usize,
    /// Arcs visible to the entering-arc search: `arc_num + node_num`.
    pub search_arc_num: usize,
    /// Total arc slots in use, `<= arc_num + 2 * node_num`.
    pub all_arc_num: usize,
    /// Index of the artificial root node, `== node_num`.
    pub root: NodeIndex,
    pub source: Vec<NodeIndex>,
    pub target: Vec<NodeIndex>,
    /// Shifted capacities (`upper - lower`); `INFINITE` when uncapacitated.
    pub cap: Vec<FlowQuantity>,
    pub cost: Vec<CostValue>,
    pub flow: Vec<FlowQuantity>,
    pub state: Vec<i8>,
    pub pi: Vec<CostValue>,
    /// Pre-shift lower bound of each real arc.
    pub orig_lower: Vec<FlowQuantity>,
    /// Shifted supplies, root slot included.
    pub supply: Vec<FlowQuantity>,
    pub sum_supply: FlowQuantity,
    /// Artificial cost `M = (max |cost| + 1) * n`.
    pub art_cost: CostValue,
}

/// Bounds were inverted on some arc; the solve reports `Infeasible`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct InvertedBounds(pub ArcIndex);

impl CanonicalForm {
    /// Reduced cost of an arc under the current potentials, signed by state
    /// so that any eligible arc shows up as strictly negative.
    #[inline]
    pub fn signed_reduced_cost(&self, arc: ArcIndex) -> CostValue {
        self.state[arc] as CostValue
            * (self.cost[arc] + self.pi[self.source[arc]] - self.pi[self.target[arc]])
    }
}

/// Builds the canonical arrays and the initial feasible basis.
pub(crate) fn canonicalize(
    problem: &FlowProblem<'_>,
) -> Result<(CanonicalForm, SpanningTree), InvertedBounds> {
    let graph = problem.graph();
    let n = graph.num_nodes();
    let m = graph.num_arcs();
    let root = n;
    let max_arcs = m + 2 * n;

    let mut c = CanonicalForm {
        node_num: n,
        arc_num: m,
        search_arc_num: m + n,
        all_arc_num: m + n,
        root,
        source: vec![0; max_arcs],
        target: vec![0; max_arcs],
        cap: vec![0; max_arcs],
        cost: vec![0; max_arcs],
        flow: vec![0; max_arcs],
        state: vec![STATE_LOWER; max_arcs],
        pi: vec![0; n + 1],
        orig_lower: vec![0; m],
        supply: vec![0; n + 1],
        sum_supply: 0,
        art_cost: 0,
    };

    // Shift every arc by its lower bound; supplies absorb the shift.
    let mut max_abs_cost: CostValue = 0;
    for u in 0..n {
        c.supply[u] = problem.supply(u);
    }
    for (a, tail, head) in graph.arcs_with_endpoints() {
        let lower = problem.lower(a);
        let upper = problem.upper(a);
        if upper < lower {
            return Err(InvertedBounds(a));
        }
        c.source[a] = tail;
        c.target[a] = head;
        c.cap[a] = if upper >= INFINITE {
            INFINITE
        } else {
            upper - lower
        };
        c.cost[a] = problem.cost(a);
        c.orig_lower[a] = lower;
        if lower != 0 {
            c.supply[tail] -= lower;
            c.supply[head] += lower;
        }
        max_abs_cost = max_abs_cost.max(c.cost[a].abs());
    }
    c.sum_supply = c.supply[..n].iter().sum();
    c.supply[root] = -c.sum_supply;
    c.art_cost = ((max_abs_cost + 1).saturating_mul(n as CostValue)).min(INFINITE);

    let mut tree = SpanningTree::with_nodes(n + 1);
    init_basis(&mut c, &mut tree, problem.supply_type());
    Ok((c, tree))
}

/// Fills in the artificial arcs and the initial spanning tree. Every real
/// node hangs directly off the root; the thread visits `root, 0, 1, ..`.
fn init_basis(c: &mut CanonicalForm, tree: &mut SpanningTree, supply_type: SupplyType) {
    let n = c.node_num;
    let m = c.arc_num;
    let root = c.root;

    tree.parent[root] = NONE;
    tree.pred[root] = NONE;
    tree.pred_dir[root] = 0;
    tree.thread[root] = if n > 0 { 0 } else { root };
    tree.rev_thread[if n > 0 { 0 } else { root }] = root;
    tree.succ_num[root] = n + 1;
    tree.last_succ[root] = if n > 0 { n - 1 } else { root };
    c.pi[root] = 0;

    let mut f = m + n;
    for u in 0..n {
        tree.parent[u] = root;
        tree.thread[u] = u + 1; // node n is the root, closing the cycle
        tree.rev_thread[u + 1] = u;
        tree.succ_num[u] = 1;
        tree.last_succ[u] = u;

        let e = m + u;
        match supply_type {
            SupplyType::Geq => {
                if c.supply[u] <= 0 {
                    // Unmet demand may remain parked here at zero cost.
                    tree.pred_dir[u] = DIR_DOWN;
                    tree.pred[u] = e;
                    c.pi[u] = 0;
                    c.source[e] = root;
                    c.target[e] = u;
                    c.cap[e] = INFINITE;
                    c.flow[e] = -c.supply[u];
                    c.cost[e] = 0;
                    c.state[e] = STATE_TREE;
                } else {
                    // Supply must be shipped: price its escape at art_cost.
                    tree.pred_dir[u] = DIR_UP;
                    tree.pred[u] = f;
                    c.pi[u] = -c.art_cost;
                    c.source[f] = u;
                    c.target[f] = root;
                    c.cap[f] = INFINITE;
                    c.flow[f] = c.supply[u];
                    c.cost[f] = c.art_cost;
                    c.state[f] = STATE_TREE;
                    c.source[e] = root;
                    c.target[e] = u;
                    c.cap[e] = INFINITE;
                    c.flow[e] = 0;
                    c.cost[e] = 0;
                    c.state[e] = STATE_LOWER;
                    f += 1;
                }
            }
            SupplyType::Leq => {
                if c.supply[u] >= 0 {
                    // Unused supply may remain parked here at zero cost.
                    tree.pred_dir[u] = DIR_UP;
                    tree.pred[u] = e;
                    c.pi[u] = 0;
                    c.source[e] = u;
                    c.target[e] = root;
                    c.cap[e] = INFINITE;
                    c.flow[e] = c.supply[u];
                    c.cost[e] = 0;
                    c.state[e] = STATE_TREE;
                } else {
                    // Demand must be met: price its shortfall at art_cost.
                    tree.pred_dir[u] = DIR_DOWN;
                    tree.pred[u] = f;
                    c.pi[u] = c.art_cost;
                    c.source[f] = root;
                    c.target[f] = u;
                    c.cap[f] = INFINITE;
                    c.flow[f] = -c.supply[u];
                    c.cost[f] = c.art_cost;
                    c.state[f] = STATE_TREE;
                    c.source[e] = u;
                    c.target[e] = root;
                    c.cap[e] = INFINITE;
                    c.flow[e] = 0;
                    c.cost[e] = 0;
                    c.state[e] = STATE_LOWER;
                    f += 1;
                }
            }
        }
    }
    c.all_arc_num = f;
}
